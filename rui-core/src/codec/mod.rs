//! `tokio_util` framing for [`Packet`]s on a byte stream.

use bytes::BytesMut;

use crate::error::RuiError;
use crate::header::{HEADER_SIZE, PacketHeader, PacketHeaderBytes};
use crate::packet::{MAX_FRAME_SIZE, Packet};

#[derive(Debug, Default)]
pub struct RuiCodec;

impl tokio_util::codec::Decoder for RuiCodec {
    type Item = Packet;
    type Error = RuiError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < HEADER_SIZE {
            return Ok(None);
        }

        let mut header_bytes: PacketHeaderBytes = [0; HEADER_SIZE];
        header_bytes.copy_from_slice(&src[..HEADER_SIZE]);
        let header = PacketHeader::from_bytes(&header_bytes)?;

        let frame_len = header.frame_length();
        if frame_len > MAX_FRAME_SIZE {
            return Err(RuiError::FrameTooLarge {
                size: frame_len,
                max: MAX_FRAME_SIZE,
            });
        }
        if src.len() < frame_len {
            src.reserve(frame_len - src.len());
            return Ok(None);
        }

        let frame = src.split_to(frame_len);
        // Checksums are verified by the reader so one corrupt payload does not end the stream.
        Packet::from_bytes(&frame).map(Some)
    }
}

impl tokio_util::codec::Encoder<Packet> for RuiCodec {
    type Error = RuiError;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(&item.to_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_util::codec::{Decoder, Encoder};

    #[test]
    fn decodes_across_partial_reads() {
        let mut codec = RuiCodec;
        let mut wire = BytesMut::new();
        codec
            .encode(Packet::new("exposure", vec![1, 2, 3, 4]).unwrap(), &mut wire)
            .unwrap();
        codec
            .encode(Packet::new("gamma", vec![5, 6, 7, 8]).unwrap(), &mut wire)
            .unwrap();

        let mut src = BytesMut::new();
        src.extend_from_slice(&wire[..10]);
        assert!(codec.decode(&mut src).unwrap().is_none());

        src.extend_from_slice(&wire[10..]);
        let first = codec.decode(&mut src).unwrap().unwrap();
        assert_eq!(first.channel(), "exposure");
        let second = codec.decode(&mut src).unwrap().unwrap();
        assert_eq!(second.channel(), "gamma");
        assert_eq!(second.payload(), &[5, 6, 7, 8]);
        assert!(codec.decode(&mut src).unwrap().is_none());
    }

    #[test]
    fn corrupt_payload_still_frames() {
        let mut codec = RuiCodec;
        let mut src = BytesMut::from(&Packet::new("X", vec![1; 4]).unwrap().to_bytes()[..]);
        let last = src.len() - 1;
        src[last] = 0;
        let pkt = codec.decode(&mut src).unwrap().unwrap();
        assert!(!pkt.validate());
        assert!(src.is_empty());
    }

    #[test]
    fn rejects_bad_magic() {
        let mut codec = RuiCodec;
        let mut src = BytesMut::from(&b"NOPE0000000000"[..]);
        assert!(matches!(codec.decode(&mut src), Err(RuiError::InvalidMagic)));
    }
}
