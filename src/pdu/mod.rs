//! SNMP Protocol Data Units (PDUs).
//!
//! All commands share one layout: `[tag] { request-id, a, b, bindings }`.
//! The meaning of the `(a, b)` pair depends on the command. GETBULK carries
//! `(non-repeaters, max-repetitions)`; every other command carries
//! `(error-status, error-index)`.

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeErrorKind, ErrorStatus, Field, Result};
use crate::oid::Oid;
use crate::value::Value;
use crate::varbind::{VarBind, decode_varbind_list, encode_varbind_list};
use bytes::Bytes;

/// PDU type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PduType {
    GetRequest = tag::pdu::GET_REQUEST,
    GetNextRequest = tag::pdu::GET_NEXT_REQUEST,
    Response = tag::pdu::RESPONSE,
    SetRequest = tag::pdu::SET_REQUEST,
    Trap = tag::pdu::TRAP,
    GetBulkRequest = tag::pdu::GET_BULK_REQUEST,
}

impl PduType {
    /// Create from tag byte.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            tag::pdu::GET_REQUEST => Some(Self::GetRequest),
            tag::pdu::GET_NEXT_REQUEST => Some(Self::GetNextRequest),
            tag::pdu::RESPONSE => Some(Self::Response),
            tag::pdu::SET_REQUEST => Some(Self::SetRequest),
            tag::pdu::TRAP => Some(Self::Trap),
            tag::pdu::GET_BULK_REQUEST => Some(Self::GetBulkRequest),
            _ => None,
        }
    }

    /// Get the tag byte.
    pub fn tag(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for PduType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GetRequest => write!(f, "GetRequest"),
            Self::GetNextRequest => write!(f, "GetNextRequest"),
            Self::Response => write!(f, "Response"),
            Self::SetRequest => write!(f, "SetRequest"),
            Self::Trap => write!(f, "Trap"),
            Self::GetBulkRequest => write!(f, "GetBulkRequest"),
        }
    }
}

/// Generic PDU structure.
///
/// Only the header pair selected by `pdu_type` is encoded; the other pair is
/// ignored on the wire and left at zero by the decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct Pdu {
    /// PDU type
    pub pdu_type: PduType,
    /// Request ID for correlating requests and responses
    pub request_id: i32,
    /// Error status (0 for requests, error code for responses)
    pub error_status: i32,
    /// Error index (position of the binding the error refers to)
    pub error_index: i32,
    /// GETBULK only: bindings answered once rather than repeated
    pub non_repeaters: i32,
    /// GETBULK only: upper bound on the number of bindings walked
    pub max_repetitions: i32,
    /// Variable bindings
    pub varbinds: Vec<VarBind>,
}

impl Pdu {
    /// Create a PDU of the given type with an all-zero header.
    pub fn new(pdu_type: PduType, request_id: i32, varbinds: Vec<VarBind>) -> Self {
        Self {
            pdu_type,
            request_id,
            error_status: 0,
            error_index: 0,
            non_repeaters: 0,
            max_repetitions: 0,
            varbinds,
        }
    }

    /// Create a new GET request PDU.
    pub fn get_request(request_id: i32, oids: &[Oid]) -> Self {
        Self::new(PduType::GetRequest, request_id, null_varbinds(oids))
    }

    /// Create a new GETNEXT request PDU.
    pub fn get_next_request(request_id: i32, oids: &[Oid]) -> Self {
        Self::new(PduType::GetNextRequest, request_id, null_varbinds(oids))
    }

    /// Create a GETBULK request PDU.
    pub fn get_bulk(
        request_id: i32,
        non_repeaters: i32,
        max_repetitions: i32,
        oids: &[Oid],
    ) -> Self {
        Self {
            non_repeaters,
            max_repetitions,
            ..Self::new(PduType::GetBulkRequest, request_id, null_varbinds(oids))
        }
    }

    /// Whether the header carries the GETBULK pair.
    pub fn is_bulk(&self) -> bool {
        self.pdu_type == PduType::GetBulkRequest
    }

    /// Check if this is an error response.
    pub fn is_error(&self) -> bool {
        self.error_status != 0
    }

    /// Get the error status as an enum.
    pub fn error_status_enum(&self) -> ErrorStatus {
        ErrorStatus::from_i32(self.error_status)
    }

    /// Set error status and index unless an error is already set.
    ///
    /// Returns `false` if an earlier error was kept.
    pub fn set_error(&mut self, status: ErrorStatus, index: i32) -> bool {
        if self.error_status != 0 {
            return false;
        }
        self.error_status = status.as_i32();
        self.error_index = index;
        true
    }

    /// Set error status and append a diagnostic binding, unless an error is
    /// already set.
    ///
    /// The error index points at the appended binding, which carries an empty
    /// OID and `message` as an OCTET STRING.
    pub fn add_error(&mut self, status: ErrorStatus, message: &str) -> bool {
        let index = self.varbinds.len() as i32;
        if !self.set_error(status, index) {
            return false;
        }
        self.varbinds.push(VarBind::new(
            Oid::empty(),
            Value::OctetString(Bytes::copy_from_slice(message.as_bytes())),
        ));
        true
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) -> Result<()> {
        buf.push_constructed(self.pdu_type.tag(), |buf| {
            buf.push_integer(self.request_id)?;
            if self.is_bulk() {
                buf.push_integer(self.non_repeaters)?;
                buf.push_integer(self.max_repetitions)?;
            } else {
                buf.push_integer(self.error_status)?;
                buf.push_integer(self.error_index)?;
            }
            encode_varbind_list(buf, &self.varbinds)
        })
    }

    /// Decode from BER.
    ///
    /// The tag byte selects both the command and which header pair follows
    /// the request id.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let start = decoder.offset();
        decoder.read_sequence_with(|tag, d| {
            let Some(pdu_type) = PduType::from_tag(tag) else {
                return Err(d.fail(start, DecodeErrorKind::UnknownPduType(tag)));
            };

            let request_id = d.read_integer_field(Field::RequestId)?;
            let mut pdu = Pdu::new(pdu_type, request_id, Vec::new());

            if pdu.is_bulk() {
                pdu.non_repeaters = d.read_integer_field(Field::NonRepeaters)?;
                pdu.max_repetitions = d.read_integer_field(Field::MaxRepetitions)?;
            } else {
                pdu.error_status = d.read_integer_field(Field::ErrorStatus)?;
                pdu.error_index = d.read_integer_field(Field::ErrorIndex)?;
            }

            pdu.varbinds = decode_varbind_list(d)?;
            Ok(pdu)
        })
    }
}

impl std::fmt::Display for Pdu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} request-id={}", self.pdu_type, self.request_id)?;
        if self.is_bulk() {
            write!(
                f,
                " non-repeaters={} max-repetitions={}",
                self.non_repeaters, self.max_repetitions
            )?;
        } else {
            write!(
                f,
                " error-status={} error-index={}",
                self.error_status_enum(),
                self.error_index
            )?;
        }
        for vb in &self.varbinds {
            write!(f, "\n  {}", vb)?;
        }
        Ok(())
    }
}

fn null_varbinds(oids: &[Oid]) -> Vec<VarBind> {
    oids.iter().map(|oid| VarBind::null(oid.clone())).collect()
}
