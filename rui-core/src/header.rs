//! Fixed-size packet header preceding every named-channel message.
//!
//! ```text
//! magic:          [u8; 4]  "RUI0"
//! checksum:       u32      first 4 bytes of blake3(payload), 0 if empty
//! name_length:    u16      bytes of UTF-8 channel name
//! payload_length: u32      bytes of payload
//! ```
//!
//! All integers are little-endian.

use crate::error::RuiError;

pub const MAGIC: [u8; 4] = *b"RUI0";
pub const HEADER_SIZE: usize = 14;

pub type PacketHeaderBytes = [u8; HEADER_SIZE];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    checksum: u32,
    name_length: u16,
    payload_length: u32,
}

impl PacketHeader {
    pub fn new(checksum: u32, name_length: u16, payload_length: u32) -> Self {
        Self {
            checksum,
            name_length,
            payload_length,
        }
    }

    pub fn to_bytes(&self) -> PacketHeaderBytes {
        let mut buf: PacketHeaderBytes = [0; HEADER_SIZE];
        buf[0..4].copy_from_slice(&MAGIC);
        buf[4..8].copy_from_slice(&self.checksum.to_le_bytes());
        buf[8..10].copy_from_slice(&self.name_length.to_le_bytes());
        buf[10..14].copy_from_slice(&self.payload_length.to_le_bytes());
        buf
    }

    pub fn from_bytes(bytes: &PacketHeaderBytes) -> Result<Self, RuiError> {
        if bytes[0..4] != MAGIC {
            return Err(RuiError::InvalidMagic);
        }
        Ok(Self {
            checksum: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            name_length: u16::from_le_bytes([bytes[8], bytes[9]]),
            payload_length: u32::from_le_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]),
        })
    }

    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    pub fn name_length(&self) -> usize {
        self.name_length as usize
    }

    pub fn payload_length(&self) -> usize {
        self.payload_length as usize
    }

    /// Header plus name plus payload.
    pub fn frame_length(&self) -> usize {
        HEADER_SIZE + self.name_length() + self.payload_length()
    }
}
