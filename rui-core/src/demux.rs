//! Inbound side: dispatch of named payloads to registered callbacks.
//!
//! Subscriptions are registered during setup, before reception starts;
//! afterwards the registry is moved into the reception task and only
//! read. Callbacks run on the reception task, so they must be quick and
//! hand any real work off (see [`crate::controls`] for the UI handoff).

use std::collections::HashMap;

use tracing::{info, trace, warn};

use crate::error::RuiError;
use crate::network::ConnectionReceiver;
use crate::packet::Packet;

/// Boxed subscriber. Errors are logged by the dispatcher and contained to
/// the message that caused them.
pub type Callback = Box<dyn Fn(&[u8]) -> Result<(), RuiError> + Send + Sync + 'static>;

/// Identifies one registration. There is no unsubscribe; the handle is
/// kept by the subscribing component for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    channel: String,
    index: usize,
}

impl SubscriptionHandle {
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Position in the channel's dispatch order.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Outcome of dispatching one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dispatch {
    pub delivered: usize,
    pub failed: usize,
}

#[derive(Default)]
pub struct Demuxer {
    subscribers: HashMap<String, Vec<Callback>>,
}

impl Demuxer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, channel: &str, callback: F) -> SubscriptionHandle
    where
        F: Fn(&[u8]) -> Result<(), RuiError> + Send + Sync + 'static,
    {
        let subs = self.subscribers.entry(channel.to_string()).or_default();
        subs.push(Box::new(callback));
        SubscriptionHandle {
            channel: channel.to_string(),
            index: subs.len() - 1,
        }
    }

    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.subscribers.get(channel).map_or(0, Vec::len)
    }

    /// Invoke every subscriber of `channel` in registration order.
    ///
    /// Unknown channels are silently discarded. A failing subscriber is
    /// logged and does not stop the others.
    pub fn dispatch(&self, channel: &str, payload: &[u8]) -> Dispatch {
        let mut outcome = Dispatch::default();
        let Some(subs) = self.subscribers.get(channel) else {
            trace!(channel, "no subscribers; discarding");
            return outcome;
        };
        for callback in subs {
            match callback(payload) {
                Ok(()) => outcome.delivered += 1,
                Err(e) => {
                    warn!(channel, "dropping inbound message: {e}");
                    outcome.failed += 1;
                }
            }
        }
        outcome
    }

    pub fn dispatch_packet(&self, packet: &Packet) -> Dispatch {
        self.dispatch(packet.channel(), packet.payload())
    }

    /// Reception loop: dispatch until the connection closes.
    pub async fn run(self, mut rx: ConnectionReceiver) {
        while let Some(packet) = rx.recv().await {
            self.dispatch_packet(&packet);
        }
        info!("inbound stream closed");
    }
}

impl std::fmt::Debug for Demuxer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut channels: Vec<(&String, usize)> =
            self.subscribers.iter().map(|(k, v)| (k, v.len())).collect();
        channels.sort();
        f.debug_struct("Demuxer").field("channels", &channels).finish()
    }
}
