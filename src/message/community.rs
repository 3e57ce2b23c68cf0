//! Community-based SNMP message format (v1/v2c).
//!
//! V1 and V2c messages share the same structure:
//! `SEQUENCE { version INTEGER, community OCTET STRING, pdu PDU }`
//!
//! The only difference is the version number (0 for v1, 1 for v2c).

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeErrorKind, Field, Result};
use crate::pdu::{Pdu, PduType};
use crate::version::Version;
use bytes::Bytes;

/// Community-based SNMP message (v1/v2c).
#[derive(Debug, Clone, PartialEq)]
pub struct CommunityMessage {
    /// SNMP version (V1 or V2c)
    pub version: Version,
    /// Community string for authentication
    pub community: Bytes,
    /// Protocol data unit
    pub pdu: Pdu,
}

impl CommunityMessage {
    /// Create a new community message.
    pub fn new(version: Version, community: impl Into<Bytes>, pdu: Pdu) -> Self {
        Self {
            version,
            community: community.into(),
            pdu,
        }
    }

    /// Create a V2c message (convenience constructor).
    pub fn v2c(community: impl Into<Bytes>, pdu: Pdu) -> Self {
        Self::new(Version::V2c, community, pdu)
    }

    /// Create a V1 message (convenience constructor).
    pub fn v1(community: impl Into<Bytes>, pdu: Pdu) -> Self {
        Self::new(Version::V1, community, pdu)
    }

    /// Encode to BER.
    pub fn encode(&self) -> Result<Bytes> {
        let mut buf = EncodeBuf::new();
        self.encode_into(&mut buf)?;
        Ok(buf.finish())
    }

    /// Encode into an existing buffer.
    pub fn encode_into(&self, buf: &mut EncodeBuf) -> Result<()> {
        buf.push_sequence(|buf| {
            buf.push_integer(self.version.as_i32())?;
            buf.push_octet_string(&self.community)?;
            self.pdu.encode(buf)
        })
    }

    /// Decode a whole datagram.
    ///
    /// The datagram must hold exactly one message; anything left after it is
    /// an error.
    pub fn decode(data: Bytes) -> Result<Self> {
        let mut decoder = Decoder::new(data);
        if decoder.is_empty() {
            return Err(decoder.fail(0, DecodeErrorKind::EmptyMessage));
        }

        let message = Self::decode_from(&mut decoder)?;

        if !decoder.is_empty() {
            return Err(decoder.fail(decoder.offset(), DecodeErrorKind::TrailingData));
        }
        Ok(message)
    }

    /// Decode one message from an existing decoder.
    pub fn decode_from(decoder: &mut Decoder) -> Result<Self> {
        decoder.read_sequence_with(|_, d| {
            if d.is_empty() {
                return Err(d.fail(d.offset(), DecodeErrorKind::EmptyMessage));
            }

            let pos = d.offset();
            let version_num = d.read_integer_field(Field::Version)?;
            let Some(version) = Version::from_i32(version_num) else {
                return Err(d.fail(pos, DecodeErrorKind::UnknownVersion(version_num)));
            };

            let community = d.read_octet_string_field(Field::Community)?;
            let pdu = Pdu::decode(d)?;

            Ok(CommunityMessage {
                version,
                community,
                pdu,
            })
        })
    }

    /// Consume and return the PDU.
    pub fn into_pdu(self) -> Pdu {
        self.pdu
    }
}

/// The leading fields of a message, recovered without validating the rest.
///
/// Used to address an error reply to a request that failed to decode.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageHeader {
    pub version: Version,
    pub community: Bytes,
    /// Command tag, if it names a known command
    pub pdu_type: Option<PduType>,
    pub request_id: i32,
}

impl MessageHeader {
    /// Read version, community and request id from the front of a datagram.
    ///
    /// Declared lengths of the enclosing sequences are not checked, so a
    /// message truncated after the request id still yields a header.
    pub fn peek(data: &Bytes) -> Option<Self> {
        let mut d = Decoder::new(data.clone());

        d.read_tag().ok()?;
        d.read_length().ok()?;

        let version = Version::from_i32(d.read_integer().ok()?)?;
        let community = d.read_octet_string().ok()?;

        let pdu_tag = d.read_tag().ok()?;
        if pdu_tag & tag::class::CONTEXT_SPECIFIC == 0 {
            return None;
        }
        d.read_length().ok()?;
        let request_id = d.read_integer().ok()?;

        Some(MessageHeader {
            version,
            community,
            pdu_type: PduType::from_tag(pdu_tag),
            request_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::oid;
    use crate::value::Value;
    use crate::varbind::VarBind;

    fn sample() -> CommunityMessage {
        let mut pdu = Pdu::get_request(1, &[]);
        pdu.pdu_type = PduType::Response;
        pdu.varbinds
            .push(VarBind::new(oid!(1, 2, 3, 4), Value::from("string value")));
        CommunityMessage::v2c(Bytes::from_static(b"public"), pdu)
    }

    #[test]
    fn test_roundtrip() {
        let msg = sample();
        let bytes = msg.encode().unwrap();
        assert_eq!(CommunityMessage::decode(bytes).unwrap(), msg);
    }

    #[test]
    fn test_v1_get_wire_bytes() {
        let msg = CommunityMessage::v1(
            Bytes::from_static(b"public"),
            Pdu::get_request(1, &[oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)]),
        );
        let bytes = msg.encode().unwrap();
        let expected: &[u8] = &[
            0x30, 0x26, // message
            0x02, 0x01, 0x00, // version 0
            0x04, 0x06, b'p', b'u', b'b', b'l', b'i', b'c', // community
            0xA0, 0x19, // GetRequest
            0x02, 0x01, 0x01, // request id
            0x02, 0x01, 0x00, // error status
            0x02, 0x01, 0x00, // error index
            0x30, 0x0E, // bindings
            0x30, 0x0C, // binding
            0x06, 0x08, 0x2B, 0x06, 0x01, 0x02, 0x01, 0x01, 0x01, 0x00, // oid
            0x05, 0x00, // NULL
        ];
        assert_eq!(&bytes[..], expected);
    }

    #[test]
    fn test_empty_datagram() {
        let err = CommunityMessage::decode(Bytes::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                offset: 0,
                kind: DecodeErrorKind::EmptyMessage
            }
        ));
        assert_eq!(err.to_string(), "decode error at offset 0: empty stream");
    }

    #[test]
    fn test_empty_outer_sequence() {
        let err = CommunityMessage::decode(Bytes::from_static(&[0x30, 0x00])).unwrap_err();
        assert!(err.to_string().ends_with("empty stream"));
    }

    #[test]
    fn test_trailing_data() {
        let mut bytes = sample().encode().unwrap().to_vec();
        let end = bytes.len();
        bytes.push(0x00);
        let err = CommunityMessage::decode(Bytes::from(bytes)).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                kind: DecodeErrorKind::TrailingData,
                ..
            }
        ));
        assert_eq!(err.position(), end as i64);
    }

    #[test]
    fn test_unsupported_version() {
        // SEQUENCE { INTEGER 3, ... }
        let err = CommunityMessage::decode(Bytes::from_static(&[0x30, 0x03, 0x02, 0x01, 0x03]))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                offset: 2,
                kind: DecodeErrorKind::UnknownVersion(3)
            }
        ));
    }

    #[test]
    fn test_missing_community() {
        let err = CommunityMessage::decode(Bytes::from_static(&[
            0x30, 0x05, 0x02, 0x01, 0x01, 0x02, 0x00,
        ]))
        .unwrap_err();
        assert!(err.to_string().ends_with("community expected"));
    }

    #[test]
    fn test_peek_header_of_broken_message() {
        let mut bytes = sample().encode().unwrap().to_vec();
        // Corrupt the last binding's value length so full decode fails.
        let n = bytes.len();
        bytes.truncate(n - 3);
        let bytes = Bytes::from(bytes);
        assert!(CommunityMessage::decode(bytes.clone()).is_err());

        let header = MessageHeader::peek(&bytes).unwrap();
        assert_eq!(header.version, Version::V2c);
        assert_eq!(&header.community[..], b"public");
        assert_eq!(header.pdu_type, Some(PduType::Response));
        assert_eq!(header.request_id, 1);
    }

    #[test]
    fn test_peek_garbage() {
        assert!(MessageHeader::peek(&Bytes::from_static(&[0xFF, 0x01])).is_none());
        assert!(MessageHeader::peek(&Bytes::new()).is_none());
    }
}
