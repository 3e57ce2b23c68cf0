//! BER length encoding and decoding.
//!
//! - Short form: single byte, high bit clear, value 0-127
//! - Long form: `0x80 | n` followed by `n` big-endian length bytes
//! - Indefinite form (0x80) is rejected

use crate::error::{DecodeErrorKind, Error, Result};

/// Most length octets accepted in long form.
pub const MAX_LENGTH_OCTETS: usize = 4;

/// Encode a length, returning the bytes in wire order and how many are valid.
///
/// Uses short form below 128, otherwise long form with the minimal number of
/// big-endian length bytes.
pub fn encode_length(len: usize) -> ([u8; 9], usize) {
    let mut buf = [0u8; 9];

    if len < 0x80 {
        buf[0] = len as u8;
        return (buf, 1);
    }

    let bytes = (len as u64).to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    let count = bytes.len() - skip;

    buf[0] = 0x80 | count as u8;
    buf[1..=count].copy_from_slice(&bytes[skip..]);
    (buf, count + 1)
}

/// Number of bytes [`encode_length`] produces for `len`.
pub fn length_size(len: usize) -> usize {
    encode_length(len).1
}

/// Decode a length from bytes, returning (length, bytes_consumed).
///
/// `data` must end at the current read bound. The low 4 bits of a long-form
/// first byte give the count of length bytes that follow. `base_offset` is
/// only used to report error offsets.
pub fn decode_length(data: &[u8], base_offset: usize) -> Result<(usize, usize)> {
    let Some(&first) = data.first() else {
        return Err(Error::decode(base_offset, DecodeErrorKind::TruncatedData));
    };

    if first & 0x80 == 0 {
        return Ok((first as usize, 1));
    }

    if first == 0x80 {
        return Err(Error::decode(
            base_offset,
            DecodeErrorKind::IndefiniteLength,
        ));
    }

    let num_octets = (first & 0x0F) as usize;
    if num_octets > MAX_LENGTH_OCTETS {
        return Err(Error::decode(
            base_offset,
            DecodeErrorKind::LengthTooLong { octets: num_octets },
        ));
    }

    if data.len() < 1 + num_octets {
        return Err(Error::decode(
            base_offset,
            DecodeErrorKind::InsufficientData {
                needed: num_octets,
                available: data.len() - 1,
            },
        ));
    }

    let len = data[1..=num_octets]
        .iter()
        .fold(0usize, |acc, &b| (acc << 8) | b as usize);

    Ok((len, 1 + num_octets))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(len: usize) -> Vec<u8> {
        let (buf, n) = encode_length(len);
        buf[..n].to_vec()
    }

    #[test]
    fn test_short_form() {
        assert_eq!(encoded(0), vec![0x00]);
        assert_eq!(encoded(1), vec![0x01]);
        assert_eq!(encoded(127), vec![0x7F]);
    }

    #[test]
    fn test_long_form() {
        assert_eq!(encoded(128), vec![0x81, 0x80]);
        assert_eq!(encoded(255), vec![0x81, 0xFF]);
        assert_eq!(encoded(256), vec![0x82, 0x01, 0x00]);
        assert_eq!(encoded(65535), vec![0x82, 0xFF, 0xFF]);
        assert_eq!(encoded(65536), vec![0x83, 0x01, 0x00, 0x00]);
        assert_eq!(length_size(0x0100_0000), 5);
    }

    #[test]
    fn test_decode_roundtrip() {
        for len in [0, 1, 127, 128, 200, 255, 256, 1000, 65535, 65536, 0x00FF_FFFF] {
            let bytes = encoded(len);
            assert_eq!(decode_length(&bytes, 0).unwrap(), (len, bytes.len()));
        }
    }

    #[test]
    fn test_decode_uses_low_four_bits() {
        // 0xF1: high bit set, low nibble 1
        assert_eq!(decode_length(&[0xF1, 0x05], 0).unwrap(), (5, 2));
    }

    #[test]
    fn test_decode_indefinite_rejected() {
        let err = decode_length(&[0x80], 3).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                offset: 3,
                kind: DecodeErrorKind::IndefiniteLength
            }
        ));
    }

    #[test]
    fn test_decode_truncated() {
        assert!(decode_length(&[], 0).is_err());
        assert!(decode_length(&[0x82, 0x01], 0).is_err());
        assert!(decode_length(&[0x85, 1, 2, 3, 4, 5], 0).is_err());
    }
}
