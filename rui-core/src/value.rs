//! Typed channel values to and from opaque payload bytes.
//!
//! Payloads are not self-describing: both ends agree on each channel's
//! type out of band. Encoding is bincode with fixed-width little-endian
//! integers, so an `f32` is exactly 4 bytes, a `bool` 1 byte, and strings
//! and sequences carry a `u64` length prefix. Decoding is strict: short
//! payloads, trailing bytes and invalid bool/UTF-8 content all fail.

use bincode::Options;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::RuiError;

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
}

/// A value type that can travel on a named channel.
///
/// Implemented for `bool`, `f32`, `String`, `Vec<u32>`, `Vec<f32>` and the
/// frame header; anything else should be agreed with the server first.
pub trait ChannelValue: Sized {
    fn encode(&self) -> Vec<u8>;
    fn decode(channel: &str, bytes: &[u8]) -> Result<Self, RuiError>;
}

fn encode_with<T: Serialize>(value: &T) -> Vec<u8> {
    // Plain in-memory values with no size limit cannot fail to serialize.
    options()
        .serialize(value)
        .expect("serializing a plain value into memory")
}

fn decode_with<T: DeserializeOwned>(channel: &str, bytes: &[u8]) -> Result<T, RuiError> {
    options()
        .deserialize(bytes)
        .map_err(|e| RuiError::decode(channel, e))
}

macro_rules! channel_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ChannelValue for $ty {
                fn encode(&self) -> Vec<u8> {
                    encode_with(self)
                }

                fn decode(channel: &str, bytes: &[u8]) -> Result<Self, RuiError> {
                    decode_with(channel, bytes)
                }
            }
        )*
    };
}

channel_value!(bool, f32, String, Vec<u32>, Vec<f32>, crate::frame::HdrHeader);

/// Shorthand for [`ChannelValue::encode`].
pub fn encode<T: ChannelValue>(value: &T) -> Vec<u8> {
    value.encode()
}

/// Shorthand for [`ChannelValue::decode`].
pub fn decode<T: ChannelValue>(channel: &str, bytes: &[u8]) -> Result<T, RuiError> {
    T::decode(channel, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_is_four_le_bytes() {
        assert_eq!(encode(&90.0f32), 90.0f32.to_le_bytes().to_vec());
        assert_eq!(decode::<f32>("fov", &(-2.0f32).to_le_bytes()).unwrap(), -2.0);
    }

    #[test]
    fn bool_is_one_byte() {
        assert_eq!(encode(&true), vec![1]);
        assert!(!decode::<bool>("stop", &[0]).unwrap());
        assert!(decode::<bool>("stop", &[2]).is_err());
    }

    #[test]
    fn boundary_values_survive() {
        assert_eq!(decode::<String>("device", &encode(&String::new())).unwrap(), "");
        assert_eq!(
            decode::<String>("device", &encode(&"ipu".to_string())).unwrap(),
            "ipu"
        );
        let empty: Vec<u32> = Vec::new();
        assert_eq!(decode::<Vec<u32>>("h", &encode(&empty)).unwrap(), empty);
        let extremes = vec![0u32, u32::MAX];
        assert_eq!(decode::<Vec<u32>>("h", &encode(&extremes)).unwrap(), extremes);
        assert_eq!(decode::<f32>("exposure", &encode(&-1.5f32)).unwrap(), -1.5);
    }

    #[test]
    fn wrong_size_is_decode_error() {
        let err = decode::<f32>("fov", &[0, 0, 0]).unwrap_err();
        assert!(matches!(err, RuiError::Decode { ref channel, .. } if channel == "fov"));

        // Trailing bytes are rejected too.
        assert!(decode::<f32>("fov", &[0, 0, 0, 0, 0]).is_err());

        // A sequence whose length prefix promises more than is present.
        let mut bytes = encode(&vec![1u32, 2, 3]);
        bytes.truncate(bytes.len() - 2);
        assert!(decode::<Vec<u32>>("tile_histogram", &bytes).is_err());
    }

    #[test]
    fn invalid_utf8_string_rejected() {
        let mut bytes = 2u64.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0xC3, 0x28]);
        assert!(decode::<String>("device", &bytes).is_err());
    }
}
