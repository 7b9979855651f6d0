use std::fmt::Debug;

use crate::error::RuiError;
use crate::header::{HEADER_SIZE, PacketHeader, PacketHeaderBytes};

/// Largest payload a single packet may carry (16 MiB).
pub const MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;
/// Longest channel name accepted on the wire.
pub const MAX_CHANNEL_NAME: usize = 255;
/// Largest complete frame the codec will buffer.
pub const MAX_FRAME_SIZE: usize = HEADER_SIZE + MAX_CHANNEL_NAME + MAX_PAYLOAD_SIZE;

/// A payload tagged with the name of the channel it travels on.
#[derive(Clone, PartialEq, Eq)]
pub struct Packet {
    header: PacketHeader,
    channel: String,
    payload: Vec<u8>,
}

fn checksum_of(payload: &[u8]) -> u32 {
    if payload.is_empty() {
        return 0;
    }
    let hash = blake3::hash(payload);
    let b = hash.as_bytes();
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

fn validate_channel(channel: &str) -> Result<(), RuiError> {
    if channel.is_empty() {
        return Err(RuiError::InvalidChannelName("empty"));
    }
    if channel.len() > MAX_CHANNEL_NAME {
        return Err(RuiError::InvalidChannelName("longer than 255 bytes"));
    }
    Ok(())
}

impl Packet {
    pub fn new(channel: impl Into<String>, payload: Vec<u8>) -> Result<Self, RuiError> {
        let channel = channel.into();
        validate_channel(&channel)?;
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(RuiError::PayloadTooLarge {
                size: payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }

        let header = PacketHeader::new(
            checksum_of(&payload),
            channel.len() as u16,
            payload.len() as u32,
        );
        Ok(Self {
            header,
            channel,
            payload,
        })
    }

    pub fn header(&self) -> &PacketHeader {
        &self.header
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.header.frame_length());
        bytes.extend_from_slice(&self.header.to_bytes());
        bytes.extend_from_slice(self.channel.as_bytes());
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    /// Parse one complete frame. `bytes` must hold exactly one packet.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RuiError> {
        if bytes.len() < HEADER_SIZE {
            return Err(RuiError::InvalidPacketLength {
                expected: HEADER_SIZE,
                actual: bytes.len(),
            });
        }
        let mut header_bytes: PacketHeaderBytes = [0; HEADER_SIZE];
        header_bytes.copy_from_slice(&bytes[..HEADER_SIZE]);
        let header = PacketHeader::from_bytes(&header_bytes)?;

        if bytes.len() != header.frame_length() {
            return Err(RuiError::InvalidPacketLength {
                expected: header.frame_length(),
                actual: bytes.len(),
            });
        }
        if header.payload_length() > MAX_PAYLOAD_SIZE {
            return Err(RuiError::PayloadTooLarge {
                size: header.payload_length(),
                max: MAX_PAYLOAD_SIZE,
            });
        }

        let name_end = HEADER_SIZE + header.name_length();
        let channel = std::str::from_utf8(&bytes[HEADER_SIZE..name_end])
            .map_err(|_| RuiError::InvalidChannelName("not valid utf-8"))?
            .to_string();
        validate_channel(&channel)?;

        Ok(Self {
            header,
            channel,
            payload: bytes[name_end..].to_vec(),
        })
    }

    /// Whether the payload matches the checksum carried in the header.
    pub fn validate(&self) -> bool {
        self.header.checksum() == checksum_of(&self.payload)
    }
}

impl Debug for Packet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Packet")
            .field("channel", &self.channel)
            .field("payload_length", &self.payload.len())
            .field("checksum", &self.header.checksum())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_and_from_bytes() {
        let pkt = Packet::new("fov", vec![0, 0, 180, 66]).unwrap();
        let bytes = pkt.to_bytes();
        assert_eq!(bytes.len(), HEADER_SIZE + 3 + 4);
        let parsed = Packet::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.channel(), "fov");
        assert_eq!(parsed.payload(), &[0, 0, 180, 66]);
        assert!(parsed.validate());
    }

    #[test]
    fn empty_payload_has_zero_checksum() {
        let pkt = Packet::new("stop", Vec::new()).unwrap();
        assert_eq!(pkt.header().checksum(), 0);
        assert!(pkt.validate());
    }

    #[test]
    fn tampered_payload_fails_validation() {
        let mut bytes = Packet::new("gamma", vec![1, 2, 3, 4]).unwrap().to_bytes();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        let parsed = Packet::from_bytes(&bytes).unwrap();
        assert!(!parsed.validate());
    }

    #[test]
    fn rejects_bad_channel_names() {
        assert!(Packet::new("", vec![]).is_err());
        assert!(Packet::new("x".repeat(256), vec![]).is_err());
    }

    #[test]
    fn rejects_truncated_frame() {
        let bytes = Packet::new("X", vec![9; 8]).unwrap().to_bytes();
        assert!(matches!(
            Packet::from_bytes(&bytes[..bytes.len() - 1]),
            Err(RuiError::InvalidPacketLength { .. })
        ));
    }
}
