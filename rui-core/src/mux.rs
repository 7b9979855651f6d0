//! Outbound side: named payloads handed to the transport.

use crate::error::RuiError;
use crate::network::ConnectionSender;
use crate::packet::Packet;
use crate::value::ChannelValue;

/// Anything that can push a named payload toward the server.
///
/// Fire-and-forget: `Ok` means the payload was queued, not delivered.
pub trait Publish: Send {
    fn publish(&self, channel: &str, payload: Vec<u8>) -> Result<(), RuiError>;

    /// Encode `value` and publish it.
    fn publish_value<T: ChannelValue>(&self, channel: &str, value: &T) -> Result<(), RuiError>
    where
        Self: Sized,
    {
        self.publish(channel, value.encode())
    }
}

/// Publishes onto a [`Connection`](crate::network::Connection)'s outbound queue.
///
/// Safe to use from the UI thread while the reception task runs; the
/// queue is unbounded so `publish` never blocks.
#[derive(Debug, Clone)]
pub struct Muxer {
    tx: ConnectionSender,
}

impl Muxer {
    pub fn new(tx: ConnectionSender) -> Self {
        Self { tx }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl Publish for Muxer {
    fn publish(&self, channel: &str, payload: Vec<u8>) -> Result<(), RuiError> {
        let packet = Packet::new(channel, payload)?;
        self.tx.send(packet)?;
        Ok(())
    }
}
