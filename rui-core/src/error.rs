//! Domain-specific error types for the remote UI protocol.
//!
//! All fallible operations return `Result<T, RuiError>`.
//! Inbound failures are contained per message by the demultiplexer;
//! nothing here is meant to unwind past the reception boundary.

use std::time::Duration;
use thiserror::Error;

/// The canonical error type for the remote UI protocol.
#[derive(Debug, Error)]
pub enum RuiError {
    // ── Wire Errors ──────────────────────────────────────────────
    /// Received bytes that do not start with the `RUI0` magic sequence.
    #[error("invalid magic bytes: expected RUI0")]
    InvalidMagic,

    /// A channel name was empty, too long or not valid UTF-8.
    #[error("invalid channel name: {0}")]
    InvalidChannelName(&'static str),

    /// The payload exceeds the configured maximum size.
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The received bytes are shorter or longer than the header announces.
    #[error("invalid packet length: expected {expected}, got {actual}")]
    InvalidPacketLength { expected: usize, actual: usize },

    /// Frame size exceeded the codec limit.
    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    // ── Connection Errors ────────────────────────────────────────
    /// The TCP/IO layer reported an error.
    #[error("connection error: {0}")]
    Connection(#[from] std::io::Error),

    /// Connecting did not complete in time.
    #[error("connection timed out after {0:?}")]
    Timeout(Duration),

    /// The outbound channel was closed (transport torn down).
    #[error("channel closed")]
    ChannelClosed,

    // ── Payload Errors ───────────────────────────────────────────
    /// A payload could not be decoded as the channel's agreed type.
    #[error("cannot decode payload on channel '{channel}': {reason}")]
    Decode { channel: String, reason: String },

    // ── Frame Errors ─────────────────────────────────────────────
    /// Sample count does not match `width * height * 3`.
    #[error("frame size mismatch: header needs {expected} samples, got {actual}")]
    FrameSizeMismatch { expected: usize, actual: usize },

    /// A frame header described something other than 3 interleaved channels.
    #[error("unsupported channel count {0} (expected 3)")]
    UnsupportedChannelCount(u32),

    /// A frame header described more samples than the sink accepts.
    #[error("frame {width}x{height} exceeds {max} samples")]
    FrameDimensions { width: u32, height: u32, max: usize },

    /// A frame chunk arrived with no header to attach it to.
    #[error("frame chunk received without a preceding header")]
    UnexpectedChunk,

    /// Writing a frame file failed.
    #[error("i/o error writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ── Application Errors ───────────────────────────────────────
    /// No control is bound to the given channel.
    #[error("unknown control: {0}")]
    UnknownControl(String),

    /// Catch-all for errors that do not fit another variant.
    #[error("{0}")]
    Other(String),
}

impl RuiError {
    /// Build a [`RuiError::Decode`] for `channel`.
    pub fn decode(channel: &str, reason: impl ToString) -> Self {
        RuiError::Decode {
            channel: channel.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error means the connection is gone for good.
    pub fn is_closed(&self) -> bool {
        matches!(self, RuiError::ChannelClosed)
    }
}

// ── Convenient From implementations ──────────────────────────────

impl From<String> for RuiError {
    fn from(s: String) -> Self {
        RuiError::Other(s)
    }
}

impl From<&str> for RuiError {
    fn from(s: &str) -> Self {
        RuiError::Other(s.to_string())
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for RuiError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        RuiError::ChannelClosed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let e = RuiError::InvalidMagic;
        assert!(e.to_string().contains("magic"));

        let e = RuiError::PayloadTooLarge {
            size: 1000,
            max: 500,
        };
        assert!(e.to_string().contains("1000"));
        assert!(e.to_string().contains("500"));

        let e = RuiError::decode("fov", "expected 4 bytes");
        assert!(e.to_string().contains("fov"));
        assert!(e.to_string().contains("expected 4 bytes"));
    }

    #[test]
    fn from_string() {
        let e: RuiError = "something broke".into();
        assert!(matches!(e, RuiError::Other(_)));
    }

    #[test]
    fn from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let e: RuiError = io_err.into();
        assert!(matches!(e, RuiError::Connection(_)));
    }

    #[test]
    fn send_error_is_channel_closed() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<u8>();
        drop(rx);
        let e: RuiError = tx.send(1).unwrap_err().into();
        assert!(e.is_closed());
    }
}
