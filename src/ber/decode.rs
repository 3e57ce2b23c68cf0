//! BER decoding.
//!
//! The decoder is a cursor over a shared `Bytes` buffer with a read bound.
//! Nested structures narrow the bound for the duration of a continuation
//! (see [`Decoder::read_sequence_with`]), so offsets reported in errors are
//! always absolute positions in the original datagram.

use super::length::decode_length;
use super::tag;
use crate::error::{DecodeErrorKind, Error, Field, FirstError, Result};
use crate::oid::Oid;
use bytes::Bytes;

/// BER decoder that reads from a byte buffer.
pub struct Decoder {
    data: Bytes,
    offset: usize,
    limit: usize,
    first_error: FirstError<(usize, DecodeErrorKind)>,
}

impl Decoder {
    /// Create a new decoder from bytes.
    pub fn new(data: Bytes) -> Self {
        let limit = data.len();
        Self {
            data,
            offset: 0,
            limit,
            first_error: FirstError::new(),
        }
    }

    /// Create a decoder from a byte slice (copies the data).
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    /// Get the current offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Current read bound.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Bytes left before the read bound.
    pub fn remaining(&self) -> usize {
        self.limit - self.offset
    }

    /// Check if we've reached the read bound.
    pub fn is_empty(&self) -> bool {
        self.offset >= self.limit
    }

    /// Peek at the next tag without consuming it.
    pub fn peek_tag(&self) -> Option<u8> {
        if self.offset < self.limit {
            Some(self.data[self.offset])
        } else {
            None
        }
    }

    /// Read a single byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        if self.offset >= self.limit {
            return Err(self.error(self.offset, DecodeErrorKind::TruncatedData));
        }
        let byte = self.data[self.offset];
        self.offset += 1;
        Ok(byte)
    }

    /// Read a tag byte.
    pub fn read_tag(&mut self) -> Result<u8> {
        self.read_byte()
    }

    /// Read a BER length.
    pub fn read_length(&mut self) -> Result<usize> {
        let (len, consumed) = decode_length(&self.data[self.offset..self.limit], self.offset)
            .inspect_err(|e| {
                tracing::debug!(target: "tiny_snmp_agent::ber", { snmp.offset = self.offset, error = %e }, "bad length");
            })?;
        self.offset += consumed;
        Ok(len)
    }

    /// Read raw bytes without copying.
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        // saturating_add keeps a huge length from wrapping past the check
        if self.offset.saturating_add(len) > self.limit {
            return Err(self.error(
                self.offset,
                DecodeErrorKind::InsufficientData {
                    needed: len,
                    available: self.remaining(),
                },
            ));
        }
        let bytes = self.data.slice(self.offset..self.offset + len);
        self.offset += len;
        Ok(bytes)
    }

    /// Read and expect a specific tag, returning the content length.
    pub fn expect_tag(&mut self, expected: u8) -> Result<usize> {
        let tag = self.read_tag()?;
        if tag != expected {
            return Err(self.error(
                self.offset - 1,
                DecodeErrorKind::UnexpectedTag {
                    expected,
                    actual: tag,
                },
            ));
        }
        self.read_length()
    }

    /// Read a BER INTEGER.
    pub fn read_integer(&mut self) -> Result<i32> {
        let len = self.expect_tag(tag::universal::INTEGER)?;
        self.read_integer_value(len)
    }

    /// Read 32-bit integer content of the given length.
    ///
    /// Bytes are accumulated big-endian with `acc << 8 | byte`. No sign
    /// extension is applied, so a short encoding with the high bit set reads
    /// back as a positive number, and bytes beyond the fourth push the
    /// earliest ones out.
    pub fn read_integer_value(&mut self, len: usize) -> Result<i32> {
        let bytes = self.read_bytes(len)?;
        Ok(bytes.iter().fold(0i32, |acc, &b| (acc << 8) | b as i32))
    }

    /// Read 64-bit integer content of the given length.
    ///
    /// Same accumulation rule as [`read_integer_value`](Self::read_integer_value).
    pub fn read_integer64_value(&mut self, len: usize) -> Result<i64> {
        let bytes = self.read_bytes(len)?;
        Ok(bytes.iter().fold(0i64, |acc, &b| (acc << 8) | b as i64))
    }

    /// Read an OCTET STRING.
    pub fn read_octet_string(&mut self) -> Result<Bytes> {
        let len = self.expect_tag(tag::universal::OCTET_STRING)?;
        self.read_bytes(len)
    }

    /// Read an OBJECT IDENTIFIER.
    pub fn read_oid(&mut self) -> Result<Oid> {
        let len = self.expect_tag(tag::universal::OBJECT_IDENTIFIER)?;
        self.read_oid_value(len)
    }

    /// Read an OID given a pre-read length.
    pub fn read_oid_value(&mut self, len: usize) -> Result<Oid> {
        let start = self.offset;
        let bytes = self.read_bytes(len)?;
        Oid::from_ber(&bytes).map_err(|e| match e {
            Error::Decode { offset, kind } => self.error(start + offset, kind),
            other => other,
        })
    }

    /// Read an INTEGER that fills a named message field.
    ///
    /// A wrong or missing tag is reported as `Expected(field)` and bad content
    /// as `Bad(field)`, both at the position of the tag.
    pub fn read_integer_field(&mut self, field: Field) -> Result<i32> {
        let pos = self.offset;
        if self.peek_tag() != Some(tag::universal::INTEGER) {
            return Err(self.fail(pos, DecodeErrorKind::Expected(field)));
        }
        self.read_integer()
            .map_err(|_| self.fail(pos, DecodeErrorKind::Bad(field)))
    }

    /// Read an OCTET STRING that fills a named message field.
    pub fn read_octet_string_field(&mut self, field: Field) -> Result<Bytes> {
        let pos = self.offset;
        if self.peek_tag() != Some(tag::universal::OCTET_STRING) {
            return Err(self.fail(pos, DecodeErrorKind::Expected(field)));
        }
        self.read_octet_string()
            .map_err(|_| self.fail(pos, DecodeErrorKind::Bad(field)))
    }

    /// Skip `len` content bytes.
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    /// Read a tag and length, then run `f` with the read bound narrowed to the
    /// content.
    ///
    /// `f` receives the tag byte so callers can branch on command or type.
    /// The content must be consumed exactly; afterwards the outer bound is
    /// restored. On failure the first error recorded on this decoder wins.
    pub fn read_sequence_with<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(u8, &mut Decoder) -> Result<T>,
    {
        let tag = self.read_tag().map_err(|e| self.settle(e))?;
        let len = self.read_length().map_err(|e| self.settle(e))?;

        let end = match self.offset.checked_add(len) {
            Some(end) if end <= self.limit => end,
            _ => return Err(self.fail(self.offset, DecodeErrorKind::TlvOverflow)),
        };

        let outer = self.limit;
        self.limit = end;
        let result = f(tag, self);
        self.limit = outer;

        match result {
            Ok(value) if self.offset == end => Ok(value),
            Ok(_) => Err(self.fail(
                self.offset,
                DecodeErrorKind::SequenceUnderrun {
                    end,
                    position: self.offset,
                },
            )),
            Err(e) => Err(self.settle(e)),
        }
    }

    /// Record a failure at `offset` and return the first error this decoder saw.
    pub fn fail(&mut self, offset: usize, kind: DecodeErrorKind) -> Error {
        self.settle(Error::decode(offset, kind))
    }

    /// Record `err` if nothing is recorded yet, returning the first error.
    ///
    /// Errors that are not decode errors pass through untouched.
    pub fn settle(&mut self, err: Error) -> Error {
        match err {
            Error::Decode { offset, kind } => {
                let (offset, kind) = self.first_error.resolve((offset, kind));
                Error::decode(offset, kind)
            }
            other => other,
        }
    }

    /// The first error recorded on this decoder.
    pub fn first_error(&self) -> Option<Error> {
        self.first_error
            .get()
            .map(|&(offset, kind)| Error::decode(offset, kind))
    }

    /// Get the underlying bytes for the entire buffer.
    pub fn as_bytes(&self) -> &Bytes {
        &self.data
    }

    fn error(&self, offset: usize, kind: DecodeErrorKind) -> Error {
        tracing::debug!(target: "tiny_snmp_agent::ber", { snmp.offset = offset, kind = %kind }, "decode error");
        Error::decode(offset, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Field;

    #[test]
    fn test_decode_integer() {
        let mut dec = Decoder::from_slice(&[0x02, 0x01, 0x00]);
        assert_eq!(dec.read_integer().unwrap(), 0);

        let mut dec = Decoder::from_slice(&[0x02, 0x01, 0x7F]);
        assert_eq!(dec.read_integer().unwrap(), 127);

        let mut dec = Decoder::from_slice(&[0x02, 0x02, 0x01, 0x00]);
        assert_eq!(dec.read_integer().unwrap(), 256);

        let mut dec = Decoder::from_slice(&[0x02, 0x04, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(dec.read_integer().unwrap(), -1);
    }

    #[test]
    fn test_decode_integer_no_sign_extension() {
        // A one-byte 0xFF is 255 here, not -1.
        let mut dec = Decoder::from_slice(&[0x02, 0x01, 0xFF]);
        assert_eq!(dec.read_integer().unwrap(), 255);

        let mut dec = Decoder::from_slice(&[0x02, 0x01, 0x80]);
        assert_eq!(dec.read_integer().unwrap(), 128);
    }

    #[test]
    fn test_decode_integer_zero_length() {
        let mut dec = Decoder::from_slice(&[0x02, 0x00]);
        assert_eq!(dec.read_integer().unwrap(), 0);
    }

    #[test]
    fn test_decode_integer64() {
        let mut dec = Decoder::from_slice(&[0x01, 0x00, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!(dec.read_integer64_value(6).unwrap(), 0x0100_0000_0000);
    }

    #[test]
    fn test_decode_integer_truncated() {
        let mut dec = Decoder::from_slice(&[0x02, 0x04, 0x01, 0x02]);
        let err = dec.read_integer().unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                offset: 2,
                kind: DecodeErrorKind::InsufficientData { needed: 4, available: 2 }
            }
        ));
    }

    #[test]
    fn test_decode_octet_string() {
        let mut dec = Decoder::from_slice(&[0x04, 0x03, b'a', b'b', b'c']);
        assert_eq!(&dec.read_octet_string().unwrap()[..], b"abc");

        let mut dec = Decoder::from_slice(&[0x04, 0x00]);
        assert!(dec.read_octet_string().unwrap().is_empty());
    }

    #[test]
    fn test_decode_oid() {
        let mut dec = Decoder::from_slice(&[0x06, 0x03, 0x2B, 0x06, 0x01]);
        assert_eq!(dec.read_oid().unwrap().arcs(), &[1, 3, 6, 1]);

        let mut dec = Decoder::from_slice(&[0x06, 0x00]);
        assert!(dec.read_oid().unwrap().is_empty());
    }

    #[test]
    fn test_unexpected_tag() {
        let mut dec = Decoder::from_slice(&[0x04, 0x01, 0x00]);
        let err = dec.read_integer().unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                offset: 0,
                kind: DecodeErrorKind::UnexpectedTag {
                    expected: 0x02,
                    actual: 0x04
                }
            }
        ));
    }

    #[test]
    fn test_sequence_bounds_content() {
        // SEQUENCE { INTEGER 1 } INTEGER 2
        let mut dec = Decoder::from_slice(&[0x30, 0x03, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02]);
        let inner = dec
            .read_sequence_with(|tag, d| {
                assert_eq!(tag, 0x30);
                assert_eq!(d.limit(), 5);
                let v = d.read_integer()?;
                assert!(d.is_empty());
                Ok(v)
            })
            .unwrap();
        assert_eq!(inner, 1);
        assert_eq!(dec.limit(), 8);
        assert_eq!(dec.read_integer().unwrap(), 2);
    }

    #[test]
    fn test_sequence_overflowing_length() {
        let mut dec = Decoder::from_slice(&[0x30, 0x05, 0x02, 0x01, 0x01]);
        let err = dec.read_sequence_with(|_, d| d.read_integer()).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                kind: DecodeErrorKind::TlvOverflow,
                ..
            }
        ));
    }

    #[test]
    fn test_sequence_content_not_consumed() {
        let mut dec = Decoder::from_slice(&[0x30, 0x04, 0x05, 0x00, 0x05, 0x00]);
        let err = dec
            .read_sequence_with(|_, d| {
                d.expect_tag(0x05)?;
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                offset: 4,
                kind: DecodeErrorKind::SequenceUnderrun { end: 6, position: 4 }
            }
        ));
    }

    #[test]
    fn test_named_fields() {
        let mut dec = Decoder::from_slice(&[0x04, 0x01, 0x00]);
        let err = dec.read_integer_field(Field::RequestId).unwrap_err();
        assert_eq!(err.to_string(), "decode error at offset 0: request id expected");

        let mut dec = Decoder::from_slice(&[0x02, 0x05, 0x01]);
        let err = dec.read_integer_field(Field::ErrorStatus).unwrap_err();
        assert_eq!(err.to_string(), "decode error at offset 0: bad error status");

        let mut dec = Decoder::from_slice(&[0x04, 0x06, b'p', b'u', b'b', b'l', b'i', b'c']);
        assert_eq!(
            &dec.read_octet_string_field(Field::Community).unwrap()[..],
            b"public"
        );
    }

    #[test]
    fn test_inner_error_wins() {
        // The continuation records a specific failure; the sequence layer
        // must hand that back rather than a generic one.
        let mut dec = Decoder::from_slice(&[0x30, 0x02, 0x04, 0x00]);
        let err = dec
            .read_sequence_with(|_, d| -> Result<i32> {
                let pos = d.offset();
                d.read_integer()
                    .map_err(|_| d.fail(pos, DecodeErrorKind::Expected(Field::RequestId)))
            })
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                offset: 2,
                kind: DecodeErrorKind::Expected(Field::RequestId)
            }
        ));

        let later = dec.fail(99, DecodeErrorKind::TrailingData);
        assert!(matches!(
            later,
            Error::Decode {
                offset: 2,
                kind: DecodeErrorKind::Expected(Field::RequestId)
            }
        ));
        assert!(dec.first_error().is_some());
    }
}
