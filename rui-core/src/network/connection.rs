use std::fmt;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::codec::Framed;
use tracing::{debug, warn};

use crate::codec::RuiCodec;
use crate::error::RuiError;
use crate::packet::Packet;

/// Sending half of a connection. Unbounded so the UI thread never blocks
/// or needs a runtime handle to publish.
pub type ConnectionSender = mpsc::UnboundedSender<Packet>;

/// Depth of the network -> user queue.
const INBOUND_QUEUE: usize = 256;

/// A framed TCP connection to the render server.
///
/// Two background tasks own the socket: a writer draining the outbound
/// queue and a reader pushing validated packets to the inbound queue.
#[derive(Debug)]
pub struct Connection {
    tx: ConnectionSender,
    rx: ConnectionReceiver,
    writer: WriterTask,
}

/// The writer task. It ends once every [`ConnectionSender`] is dropped and
/// the queued packets have been written, or when the socket fails.
#[derive(Debug)]
pub struct WriterTask {
    handle: JoinHandle<()>,
}

/// Receiving half of a connection. Dropping it stops the reader task.
#[derive(Debug)]
pub struct ConnectionReceiver {
    rx: mpsc::Receiver<Packet>,
    reader: JoinHandle<()>,
}

impl Connection {
    pub fn new(stream: TcpStream) -> Self {
        if let Err(e) = stream.set_nodelay(true) {
            debug!("set_nodelay failed: {e}");
        }
        let (mut net_writer, mut net_reader) = Framed::new(stream, RuiCodec).split();

        // User -> Network
        let (user_tx, mut network_rx) = mpsc::unbounded_channel::<Packet>();

        // Network -> User
        let (network_tx, user_rx) = mpsc::channel(INBOUND_QUEUE);

        // Writer task: ends once every sender is dropped or the socket fails.
        let writer = tokio::spawn(async move {
            while let Some(packet) = network_rx.recv().await {
                if let Err(e) = net_writer.send(packet).await {
                    warn!("network write error: {e}");
                    return;
                }
            }
            if let Err(e) = net_writer.close().await {
                debug!("closing write half: {e}");
            }
        });

        // Reader task: corrupt payloads are dropped, framing errors end the stream.
        let reader = tokio::spawn(async move {
            while let Some(result) = net_reader.next().await {
                match result {
                    Ok(packet) if !packet.validate() => {
                        warn!(channel = packet.channel(), "dropping packet with bad checksum");
                    }
                    Ok(packet) => {
                        if network_tx.send(packet).await.is_err() {
                            // receiver was dropped, stop reading
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("network read error: {e}");
                        break;
                    }
                }
            }
            debug!("reader task finished");
        });

        Self {
            tx: user_tx,
            rx: ConnectionReceiver {
                rx: user_rx,
                reader,
            },
            writer: WriterTask { handle: writer },
        }
    }

    /// Connect to `info`, failing with [`RuiError::Timeout`] after `timeout`.
    pub async fn connect(info: &ConnectionInfo, timeout: Duration) -> Result<Self, RuiError> {
        let stream = tokio::time::timeout(timeout, TcpStream::connect(info.to_string()))
            .await
            .map_err(|_| RuiError::Timeout(timeout))??;
        Ok(Self::new(stream))
    }

    pub fn send(&self, packet: Packet) -> Result<(), RuiError> {
        self.tx.send(packet).map_err(RuiError::from)
    }

    pub async fn recv(&mut self) -> Option<Packet> {
        self.rx.recv().await
    }

    pub fn sender(&self) -> ConnectionSender {
        self.tx.clone()
    }

    pub fn into_split(self) -> (ConnectionSender, ConnectionReceiver, WriterTask) {
        (self.tx, self.rx, self.writer)
    }
}

impl WriterTask {
    /// Wait for the outbound queue to drain. Returns `false` if the task
    /// is still running after `timeout` or did not finish cleanly.
    pub async fn flushed(self, timeout: Duration) -> bool {
        match tokio::time::timeout(timeout, self.handle).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!("writer task failed: {e}");
                false
            }
            Err(_) => false,
        }
    }
}

impl ConnectionReceiver {
    pub async fn recv(&mut self) -> Option<Packet> {
        self.rx.recv().await
    }
}

impl Drop for ConnectionReceiver {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    host: String,
    port: u16,
}

impl ConnectionInfo {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for ConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
