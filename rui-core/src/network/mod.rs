pub mod connection;

pub use connection::{Connection, ConnectionInfo, ConnectionReceiver, ConnectionSender, WriterTask};
