//! Variable binding (VarBind) type.
//!
//! A VarBind pairs an OID with a value.

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeErrorKind, Field, Result};
use crate::oid::Oid;
use crate::value::Value;

/// Variable binding - an OID-value pair.
#[derive(Debug, Clone, PartialEq)]
pub struct VarBind {
    /// The object identifier.
    pub oid: Oid,
    /// The value.
    pub value: Value,
}

impl VarBind {
    /// Create a new VarBind.
    pub fn new(oid: Oid, value: Value) -> Self {
        Self { oid, value }
    }

    /// Create a VarBind with a NULL value (for GET requests).
    pub fn null(oid: Oid) -> Self {
        Self {
            oid,
            value: Value::Null,
        }
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) -> Result<()> {
        buf.push_sequence(|buf| {
            buf.push_oid(&self.oid)?;
            self.value.encode(buf)
        })
    }

    /// Decode from BER.
    ///
    /// The sequence tag itself is not checked, only its length.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.read_sequence_with(|_, d| {
            let pos = d.offset();
            if d.peek_tag() != Some(tag::universal::OBJECT_IDENTIFIER) {
                return Err(d.fail(pos, DecodeErrorKind::Expected(Field::Oid)));
            }
            let oid = d
                .read_oid()
                .map_err(|_| d.fail(pos, DecodeErrorKind::Bad(Field::Oid)))?;

            let pos = d.offset();
            let value =
                Value::decode(d).map_err(|_| d.fail(pos, DecodeErrorKind::Bad(Field::Value)))?;

            Ok(VarBind { oid, value })
        })
    }
}

impl std::fmt::Display for VarBind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.oid, self.value)
    }
}

/// Encode a list of VarBinds.
pub fn encode_varbind_list(buf: &mut EncodeBuf, varbinds: &[VarBind]) -> Result<()> {
    buf.push_sequence(|buf| {
        for vb in varbinds {
            vb.encode(buf)?;
        }
        Ok(())
    })
}

/// Decode a list of VarBinds.
pub fn decode_varbind_list(decoder: &mut Decoder) -> Result<Vec<VarBind>> {
    decoder.read_sequence_with(|_, d| {
        let mut varbinds = Vec::new();
        while !d.is_empty() {
            varbinds.push(VarBind::decode(d)?);
        }
        Ok(varbinds)
    })
}
