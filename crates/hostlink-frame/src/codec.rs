use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Frame header: payload length (4 bytes).
pub const HEADER_SIZE: usize = 4;

/// Default maximum payload size: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// Encode a payload into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────┬──────────────────┐
/// │ Length       │ Payload           │
/// │ (4B LE)      │ (Length bytes of  │
/// │              │  UTF-8 JSON)      │
/// └──────────────┴──────────────────┘
/// ```
///
/// The length is always little-endian, regardless of the endianness of the
/// machine doing the encoding. Sending `{"a":1}` puts `07 00 00 00` followed
/// by the 7 ASCII bytes on the wire.
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > u32::MAX as usize {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: u32::MAX as usize,
        });
    }
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_u32_le(payload.len() as u32);
    dst.put_slice(payload);
    Ok(())
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer; any trailing bytes
/// belonging to later frames are left in place.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Bytes>> {
    if src.len() < HEADER_SIZE {
        return Ok(None); // Need more data
    }

    let payload_len = u32::from_le_bytes(src[0..4].try_into().expect("4-byte slice")) as usize;

    if payload_len > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }

    if src.len() < HEADER_SIZE + payload_len {
        return Ok(None); // Need more data
    }

    src.advance(HEADER_SIZE);
    Ok(Some(src.split_to(payload_len).freeze()))
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 16 MiB.
    pub max_payload_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_roundtrip() {
        let mut buf = BytesMut::new();
        let payload = br#"{"hello":"hostlink"}"#;

        encode_frame(payload, &mut buf).unwrap();

        assert_eq!(buf.len(), HEADER_SIZE + payload.len());

        let frame = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();

        assert_eq!(frame.as_ref(), payload);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_wire_bytes_are_little_endian() {
        let mut buf = BytesMut::new();
        encode_frame(br#"{"a":1}"#, &mut buf).unwrap();

        assert_eq!(&buf[0..4], &[0x07, 0x00, 0x00, 0x00]);
        assert_eq!(&buf[4..], br#"{"a":1}"#);
    }

    #[test]
    fn test_decode_incomplete_header() {
        let mut buf = BytesMut::from(&[0x07, 0x00][..]);
        let result = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap();
        assert!(result.is_none());
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn test_decode_incomplete_payload() {
        let mut buf = BytesMut::new();
        encode_frame(br#"{"a":1}"#, &mut buf).unwrap();
        buf.truncate(HEADER_SIZE + 3); // Truncate payload

        let result = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap();
        assert!(result.is_none());
        // Partial bytes must stay buffered, not be consumed.
        assert_eq!(buf.len(), HEADER_SIZE + 3);
    }

    #[test]
    fn test_decode_payload_too_large() {
        let mut buf = BytesMut::new();
        buf.put_u32_le(1024 * 1024 * 32); // 32 MiB

        let result = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD);
        assert!(matches!(result, Err(FrameError::PayloadTooLarge { .. })));
    }

    #[test]
    fn test_multiple_frames() {
        let mut buf = BytesMut::new();
        encode_frame(br#"{"n":1}"#, &mut buf).unwrap();
        encode_frame(br#"{"n":2}"#, &mut buf).unwrap();

        let f1 = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();
        assert_eq!(f1.as_ref(), br#"{"n":1}"#);

        let f2 = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();
        assert_eq!(f2.as_ref(), br#"{"n":2}"#);

        assert!(buf.is_empty());
    }

    #[test]
    fn test_empty_payload() {
        let mut buf = BytesMut::new();
        encode_frame(b"", &mut buf).unwrap();

        let frame = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn test_decode_at_every_split_offset() {
        let mut wire = BytesMut::new();
        encode_frame(br#"{"first":true}"#, &mut wire).unwrap();
        encode_frame(br#"{"second":[1,2,3]}"#, &mut wire).unwrap();
        let wire = wire.freeze();

        for split in 0..=wire.len() {
            let mut buf = BytesMut::new();
            let mut frames = Vec::new();

            buf.extend_from_slice(&wire[..split]);
            while let Some(frame) = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap() {
                frames.push(frame);
            }

            buf.extend_from_slice(&wire[split..]);
            while let Some(frame) = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap() {
                frames.push(frame);
            }

            assert_eq!(frames.len(), 2, "split at {split}");
            assert_eq!(frames[0].as_ref(), br#"{"first":true}"#);
            assert_eq!(frames[1].as_ref(), br#"{"second":[1,2,3]}"#);
            assert!(buf.is_empty());
        }
    }

    #[test]
    fn test_decode_byte_at_a_time() {
        let mut wire = BytesMut::new();
        encode_frame(br#"{"slow":"drip"}"#, &mut wire).unwrap();

        let mut buf = BytesMut::new();
        let mut decoded = None;
        for (i, byte) in wire.iter().enumerate() {
            buf.extend_from_slice(&[*byte]);
            if let Some(frame) = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap() {
                assert_eq!(i, wire.len() - 1, "frame completed before last byte");
                decoded = Some(frame);
            }
        }

        assert_eq!(decoded.unwrap().as_ref(), br#"{"slow":"drip"}"#);
    }
}
