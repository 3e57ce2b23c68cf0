//! BER encoding.
//!
//! Writes front to back into a growable buffer. Constructed types write their
//! content first, then shift it forward to make room for the tag and length
//! once the content length is known.

use super::length::encode_length;
use super::tag;
use crate::error::{EncodeErrorKind, Error, FirstError, Result};
use crate::oid::Oid;
use bytes::Bytes;

/// Capacity the buffer grows to from `current`.
///
/// Starts at 20 bytes, doubles below 1000, then grows by a quarter.
pub const fn next_capacity(current: usize) -> usize {
    if current == 0 {
        20
    } else if current < 1000 {
        current * 2
    } else {
        current + current / 4
    }
}

/// Number of content bytes used to encode a 32-bit integer.
///
/// One byte plus one per further non-zero octet of the value read as
/// unsigned, so negative numbers always take all four.
pub const fn integer_width(value: i32) -> usize {
    let mut n = 1;
    let mut q = (value as u32) >> 8;
    while q != 0 {
        n += 1;
        q >>= 8;
    }
    n
}

/// Number of content bytes used to encode a 64-bit integer.
pub const fn integer64_width(value: i64) -> usize {
    let mut n = 1;
    let mut q = (value as u64) >> 8;
    while q != 0 {
        n += 1;
        q >>= 8;
    }
    n
}

/// Buffer for BER encoding.
pub struct EncodeBuf {
    buf: Vec<u8>,
    first_error: FirstError<(Option<usize>, EncodeErrorKind)>,
}

impl EncodeBuf {
    /// Create an empty encode buffer; it allocates on first write.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a new encode buffer with specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            first_error: FirstError::new(),
        }
    }

    /// Get the current length of encoded data.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Current buffer capacity.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Encoded bytes so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Make room for `additional` more bytes using the growth policy.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let needed = self.buf.len().saturating_add(additional);
        if needed <= self.buf.capacity() {
            return Ok(());
        }

        let mut cap = self.buf.capacity();
        while cap < needed {
            cap = next_capacity(cap);
        }

        if self.buf.try_reserve_exact(cap - self.buf.len()).is_err() {
            return Err(self.fail(None, EncodeErrorKind::AllocationFailed));
        }
        Ok(())
    }

    /// Append raw bytes.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.reserve(bytes.len())?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Append a tag and a BER length.
    pub fn push_header(&mut self, tag: u8, len: usize) -> Result<()> {
        let (bytes, n) = encode_length(len);
        self.reserve(1 + n)?;
        self.buf.push(tag);
        self.buf.extend_from_slice(&bytes[..n]);
        Ok(())
    }

    /// Encode a constructed type (SEQUENCE, PDU, etc).
    ///
    /// Calls the closure to encode contents at the current position, then
    /// inserts the tag and length in front of them.
    pub fn push_constructed<F>(&mut self, tag: u8, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let start = self.buf.len();
        f(self).map_err(|e| self.settle(e))?;

        let end = self.buf.len();
        let (len_bytes, n) = encode_length(end - start);
        let header = 1 + n;

        self.reserve(header)?;
        self.buf.resize(end + header, 0);
        self.buf.copy_within(start..end, start + header);
        self.buf[start] = tag;
        self.buf[start + 1..start + header].copy_from_slice(&len_bytes[..n]);
        Ok(())
    }

    /// Encode a SEQUENCE.
    pub fn push_sequence<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.push_constructed(tag::universal::SEQUENCE, f)
    }

    /// Encode an INTEGER.
    pub fn push_integer(&mut self, value: i32) -> Result<()> {
        self.push_tagged_integer(tag::universal::INTEGER, value)
    }

    /// Encode a 32-bit integer under `tag`, using the minimal width.
    pub fn push_tagged_integer(&mut self, tag: u8, value: i32) -> Result<()> {
        let width = integer_width(value);
        self.push_header(tag, width)?;
        self.push_bytes(&value.to_be_bytes()[4 - width..])
    }

    /// Encode a 64-bit integer under `tag`, using the minimal width.
    pub fn push_tagged_integer64(&mut self, tag: u8, value: i64) -> Result<()> {
        let width = integer64_width(value);
        self.push_header(tag, width)?;
        self.push_bytes(&value.to_be_bytes()[8 - width..])
    }

    /// Encode an OCTET STRING.
    pub fn push_octet_string(&mut self, data: &[u8]) -> Result<()> {
        self.push_tagged_octets(tag::universal::OCTET_STRING, data)
    }

    /// Encode string-like content under `tag`.
    pub fn push_tagged_octets(&mut self, tag: u8, data: &[u8]) -> Result<()> {
        self.push_header(tag, data.len())?;
        self.push_bytes(data)
    }

    /// Encode a NULL.
    pub fn push_null(&mut self) -> Result<()> {
        self.push_header(tag::universal::NULL, 0)
    }

    /// Encode an empty value under `tag` (NULL and the exception values).
    pub fn push_tagged_null(&mut self, tag: u8) -> Result<()> {
        self.push_header(tag, 0)
    }

    /// Encode an OBJECT IDENTIFIER.
    pub fn push_oid(&mut self, oid: &Oid) -> Result<()> {
        let ber = match oid.to_ber() {
            Ok(ber) => ber,
            Err(Error::InvalidOid { kind, .. }) => {
                return Err(self.fail(Some(self.buf.len()), EncodeErrorKind::InvalidOid(kind)));
            }
            Err(other) => return Err(other),
        };
        self.push_header(tag::universal::OBJECT_IDENTIFIER, ber.len())?;
        self.push_bytes(&ber)
    }

    /// Record a failure and return the first error this buffer saw.
    pub fn fail(&mut self, offset: Option<usize>, kind: EncodeErrorKind) -> Error {
        self.settle(Error::Encode { offset, kind })
    }

    /// Record `err` if nothing is recorded yet, returning the first error.
    pub fn settle(&mut self, err: Error) -> Error {
        match err {
            Error::Encode { offset, kind } => {
                if !self.first_error.is_set() {
                    tracing::debug!(target: "tiny_snmp_agent::ber", { snmp.offset = ?offset, kind = %kind }, "encode error");
                }
                let (offset, kind) = self.first_error.resolve((offset, kind));
                Error::Encode { offset, kind }
            }
            other => other,
        }
    }

    /// Finalize and return the encoded bytes.
    pub fn finish(self) -> Bytes {
        Bytes::from(self.buf)
    }

    /// Finalize and return as `Vec<u8>`.
    pub fn finish_vec(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for EncodeBuf {
    fn default() -> Self {
        Self::new()
    }
}
