//! SNMP value types.
//!
//! [`ValueType`] is the fixed enumeration of type tags a variable binding can
//! carry; [`Value`] is a value tagged with one of them.

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeErrorKind, EncodeErrorKind, Result};
use crate::oid::Oid;
use crate::util::hex;
use bytes::Bytes;

/// Type tag of a variable binding.
///
/// The discriminant is the BER tag byte used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ValueType {
    Boolean = tag::universal::BOOLEAN,
    Integer = tag::universal::INTEGER,
    BitString = tag::universal::BIT_STRING,
    OctetString = tag::universal::OCTET_STRING,
    Null = tag::universal::NULL,
    ObjectIdentifier = tag::universal::OBJECT_IDENTIFIER,
    IpAddress = tag::application::IP_ADDRESS,
    Counter32 = tag::application::COUNTER32,
    Gauge32 = tag::application::GAUGE32,
    TimeTicks = tag::application::TIMETICKS,
    Counter64 = tag::application::COUNTER64,
    Integer64 = tag::application::INTEGER64,
    Unsigned64 = tag::application::UNSIGNED64,
    NoSuchObject = tag::context::NO_SUCH_OBJECT,
    NoSuchInstance = tag::context::NO_SUCH_INSTANCE,
    EndOfMibView = tag::context::END_OF_MIB_VIEW,
}

impl ValueType {
    /// Create from tag byte.
    pub fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            tag::universal::BOOLEAN => Self::Boolean,
            tag::universal::INTEGER => Self::Integer,
            tag::universal::BIT_STRING => Self::BitString,
            tag::universal::OCTET_STRING => Self::OctetString,
            tag::universal::NULL => Self::Null,
            tag::universal::OBJECT_IDENTIFIER => Self::ObjectIdentifier,
            tag::application::IP_ADDRESS => Self::IpAddress,
            tag::application::COUNTER32 => Self::Counter32,
            tag::application::GAUGE32 => Self::Gauge32,
            tag::application::TIMETICKS => Self::TimeTicks,
            tag::application::COUNTER64 => Self::Counter64,
            tag::application::INTEGER64 => Self::Integer64,
            tag::application::UNSIGNED64 => Self::Unsigned64,
            tag::context::NO_SUCH_OBJECT => Self::NoSuchObject,
            tag::context::NO_SUCH_INSTANCE => Self::NoSuchInstance,
            tag::context::END_OF_MIB_VIEW => Self::EndOfMibView,
            _ => return None,
        })
    }

    /// Get the tag byte.
    pub fn tag(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Boolean => "BOOLEAN",
            Self::Integer => "INTEGER",
            Self::BitString => "BIT STRING",
            Self::OctetString => "OCTET STRING",
            Self::Null => "NULL",
            Self::ObjectIdentifier => "OBJECT IDENTIFIER",
            Self::IpAddress => "IpAddress",
            Self::Counter32 => "Counter32",
            Self::Gauge32 => "Gauge32",
            Self::TimeTicks => "TimeTicks",
            Self::Counter64 => "Counter64",
            Self::Integer64 => "Integer64",
            Self::Unsigned64 => "Unsigned64",
            Self::NoSuchObject => "noSuchObject",
            Self::NoSuchInstance => "noSuchInstance",
            Self::EndOfMibView => "endOfMibView",
        };
        f.write_str(name)
    }
}

/// SNMP value.
///
/// 32-bit kinds (boolean, integer, counter, gauge) use the 32-bit integer
/// codec; Counter64, Integer64, Unsigned64 and TimeTicks use the 64-bit one.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Value {
    /// BOOLEAN, carried as an integer (non-zero is true)
    Boolean(bool),

    /// INTEGER (signed 32-bit)
    Integer(i32),

    /// Counter32 (unsigned 32-bit, wrapping)
    Counter32(u32),

    /// Gauge32 / Unsigned32
    Gauge32(u32),

    /// TimeTicks (hundredths of seconds)
    TimeTicks(u32),

    /// Counter64 (unsigned 64-bit, wrapping)
    Counter64(u64),

    /// Integer64 (signed 64-bit)
    Integer64(i64),

    /// Unsigned64
    Unsigned64(u64),

    /// BIT STRING, kept as raw content bytes
    BitString(Bytes),

    /// OCTET STRING (arbitrary bytes)
    OctetString(Bytes),

    /// IpAddress (4 bytes, big-endian)
    IpAddress([u8; 4]),

    /// OBJECT IDENTIFIER
    ObjectIdentifier(Oid),

    /// NULL
    Null,

    /// noSuchObject exception
    NoSuchObject,

    /// noSuchInstance exception
    NoSuchInstance,

    /// endOfMibView exception
    EndOfMibView,

    /// Value whose tag is not in [`ValueType`]. Decodes, but cannot be encoded.
    Unknown { tag: u8, data: Bytes },
}

impl Value {
    /// The type tag of this value, `None` for [`Value::Unknown`].
    pub fn value_type(&self) -> Option<ValueType> {
        Some(match self {
            Value::Boolean(_) => ValueType::Boolean,
            Value::Integer(_) => ValueType::Integer,
            Value::Counter32(_) => ValueType::Counter32,
            Value::Gauge32(_) => ValueType::Gauge32,
            Value::TimeTicks(_) => ValueType::TimeTicks,
            Value::Counter64(_) => ValueType::Counter64,
            Value::Integer64(_) => ValueType::Integer64,
            Value::Unsigned64(_) => ValueType::Unsigned64,
            Value::BitString(_) => ValueType::BitString,
            Value::OctetString(_) => ValueType::OctetString,
            Value::IpAddress(_) => ValueType::IpAddress,
            Value::ObjectIdentifier(_) => ValueType::ObjectIdentifier,
            Value::Null => ValueType::Null,
            Value::NoSuchObject => ValueType::NoSuchObject,
            Value::NoSuchInstance => ValueType::NoSuchInstance,
            Value::EndOfMibView => ValueType::EndOfMibView,
            Value::Unknown { .. } => return None,
        })
    }

    /// Try to get as i32.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::OctetString(v) | Value::BitString(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as string (UTF-8).
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Check if this is an exception value.
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView
        )
    }

    /// Encode to BER (tag, length, content).
    pub fn encode(&self, buf: &mut EncodeBuf) -> Result<()> {
        match self {
            Value::Boolean(v) => buf.push_tagged_integer(tag::universal::BOOLEAN, *v as i32),
            Value::Integer(v) => buf.push_integer(*v),
            Value::Counter32(v) => buf.push_tagged_integer(tag::application::COUNTER32, *v as i32),
            Value::Gauge32(v) => buf.push_tagged_integer(tag::application::GAUGE32, *v as i32),
            Value::TimeTicks(v) => {
                buf.push_tagged_integer64(tag::application::TIMETICKS, i64::from(*v))
            }
            Value::Counter64(v) => {
                buf.push_tagged_integer64(tag::application::COUNTER64, *v as i64)
            }
            Value::Integer64(v) => buf.push_tagged_integer64(tag::application::INTEGER64, *v),
            Value::Unsigned64(v) => {
                buf.push_tagged_integer64(tag::application::UNSIGNED64, *v as i64)
            }
            Value::BitString(data) => buf.push_tagged_octets(tag::universal::BIT_STRING, data),
            Value::OctetString(data) => buf.push_octet_string(data),
            Value::IpAddress(addr) => buf.push_tagged_octets(tag::application::IP_ADDRESS, addr),
            Value::ObjectIdentifier(oid) => buf.push_oid(oid),
            Value::Null => buf.push_null(),
            Value::NoSuchObject => buf.push_tagged_null(tag::context::NO_SUCH_OBJECT),
            Value::NoSuchInstance => buf.push_tagged_null(tag::context::NO_SUCH_INSTANCE),
            Value::EndOfMibView => buf.push_tagged_null(tag::context::END_OF_MIB_VIEW),
            Value::Unknown { tag, .. } => Err(buf.fail(
                Some(buf.len()),
                EncodeErrorKind::UndefinedType { tag: *tag },
            )),
        }
    }

    /// Decode from BER (tag, length, content).
    ///
    /// NULL and the exception values ignore whatever content they carry.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let tag = decoder.read_tag()?;
        let len = decoder.read_length()?;

        let Some(value_type) = ValueType::from_tag(tag) else {
            let data = decoder.read_bytes(len)?;
            return Ok(Value::Unknown { tag, data });
        };

        let value = match value_type {
            ValueType::Boolean => Value::Boolean(decoder.read_integer_value(len)? != 0),
            ValueType::Integer => Value::Integer(decoder.read_integer_value(len)?),
            ValueType::Counter32 => Value::Counter32(decoder.read_integer_value(len)? as u32),
            ValueType::Gauge32 => Value::Gauge32(decoder.read_integer_value(len)? as u32),
            ValueType::TimeTicks => Value::TimeTicks(decoder.read_integer64_value(len)? as u32),
            ValueType::Counter64 => Value::Counter64(decoder.read_integer64_value(len)? as u64),
            ValueType::Integer64 => Value::Integer64(decoder.read_integer64_value(len)?),
            ValueType::Unsigned64 => Value::Unsigned64(decoder.read_integer64_value(len)? as u64),
            ValueType::BitString => Value::BitString(decoder.read_bytes(len)?),
            ValueType::OctetString => Value::OctetString(decoder.read_bytes(len)?),
            ValueType::IpAddress => {
                if len != 4 {
                    return Err(decoder.fail(
                        decoder.offset(),
                        DecodeErrorKind::InvalidIpAddressLength { length: len },
                    ));
                }
                let data = decoder.read_bytes(4)?;
                Value::IpAddress([data[0], data[1], data[2], data[3]])
            }
            ValueType::ObjectIdentifier => Value::ObjectIdentifier(decoder.read_oid_value(len)?),
            ValueType::Null => {
                decoder.skip(len)?;
                Value::Null
            }
            ValueType::NoSuchObject => {
                decoder.skip(len)?;
                Value::NoSuchObject
            }
            ValueType::NoSuchInstance => {
                decoder.skip(len)?;
                Value::NoSuchInstance
            }
            ValueType::EndOfMibView => {
                decoder.skip(len)?;
                Value::EndOfMibView
            }
        };

        Ok(value)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Counter32(v) | Value::Gauge32(v) => write!(f, "{}", v),
            Value::TimeTicks(v) => {
                let secs = v / 100;
                let days = secs / 86400;
                let hours = (secs % 86400) / 3600;
                let mins = (secs % 3600) / 60;
                let s = secs % 60;
                write!(f, "{}d {}h {}m {}s", days, hours, mins, s)
            }
            Value::Counter64(v) | Value::Unsigned64(v) => write!(f, "{}", v),
            Value::Integer64(v) => write!(f, "{}", v),
            Value::BitString(data) => write!(f, "0x{}", hex::encode(data)),
            Value::OctetString(data) => {
                if let Ok(s) = std::str::from_utf8(data) {
                    write!(f, "{}", s)
                } else {
                    write!(f, "0x{}", hex::encode(data))
                }
            }
            Value::IpAddress(addr) => {
                write!(f, "{}.{}.{}.{}", addr[0], addr[1], addr[2], addr[3])
            }
            Value::ObjectIdentifier(oid) => write!(f, "{}", oid),
            Value::Null => write!(f, "NULL"),
            Value::NoSuchObject => write!(f, "noSuchObject"),
            Value::NoSuchInstance => write!(f, "noSuchInstance"),
            Value::EndOfMibView => write!(f, "endOfMibView"),
            Value::Unknown { tag, data } => {
                write!(
                    f,
                    "Unknown(tag=0x{:02X}, data=0x{})",
                    tag,
                    hex::encode(data)
                )
            }
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::OctetString(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::OctetString(Bytes::from(s))
    }
}

impl From<Oid> for Value {
    fn from(oid: Oid) -> Self {
        Value::ObjectIdentifier(oid)
    }
}

impl From<std::net::Ipv4Addr> for Value {
    fn from(addr: std::net::Ipv4Addr) -> Self {
        Value::IpAddress(addr.octets())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::oid;

    fn roundtrip(value: Value) -> Value {
        let mut buf = EncodeBuf::new();
        value.encode(&mut buf).unwrap();
        let mut dec = Decoder::new(buf.finish());
        let decoded = Value::decode(&mut dec).unwrap();
        assert!(dec.is_empty());
        decoded
    }

    #[test]
    fn test_roundtrip_every_type() {
        let values = [
            Value::Boolean(true),
            Value::Boolean(false),
            Value::Integer(0),
            Value::Integer(-1),
            Value::Integer(i32::MIN),
            Value::Integer(i32::MAX),
            Value::Counter32(u32::MAX),
            Value::Gauge32(128),
            Value::TimeTicks(123_456),
            Value::Counter64(u64::MAX),
            Value::Integer64(-5),
            Value::Unsigned64(1 << 63),
            Value::BitString(Bytes::from_static(&[0x00, 0xF0])),
            Value::OctetString(Bytes::new()),
            Value::OctetString(Bytes::from_static(b"Device name")),
            Value::IpAddress([192, 168, 1, 1]),
            Value::ObjectIdentifier(oid!(1, 3, 6, 1, 4, 1, 2097152)),
            Value::ObjectIdentifier(Oid::empty()),
            Value::Null,
            Value::NoSuchObject,
            Value::NoSuchInstance,
            Value::EndOfMibView,
        ];

        for value in values {
            assert_eq!(roundtrip(value.clone()), value);
        }
    }

    #[test]
    fn test_counter_wire_bytes() {
        let mut buf = EncodeBuf::new();
        Value::Counter32(300).encode(&mut buf).unwrap();
        assert_eq!(buf.as_slice(), &[0x41, 0x02, 0x01, 0x2C]);
    }

    #[test]
    fn test_timeticks_uses_long_codec() {
        let mut buf = EncodeBuf::new();
        Value::TimeTicks(0x0102_0304).encode(&mut buf).unwrap();
        assert_eq!(buf.as_slice(), &[0x43, 0x04, 0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_exception_content_skipped() {
        let mut dec = Decoder::from_slice(&[0x80, 0x02, 0xAA, 0xBB]);
        assert_eq!(Value::decode(&mut dec).unwrap(), Value::NoSuchObject);
        assert!(dec.is_empty());

        let mut dec = Decoder::from_slice(&[0x05, 0x01, 0x00]);
        assert_eq!(Value::decode(&mut dec).unwrap(), Value::Null);
    }

    #[test]
    fn test_unknown_tag_decodes_but_does_not_encode() {
        let mut dec = Decoder::from_slice(&[0x44, 0x02, 0x01, 0x02]);
        let value = Value::decode(&mut dec).unwrap();
        assert!(matches!(value, Value::Unknown { tag: 0x44, .. }));
        assert_eq!(value.value_type(), None);

        let mut buf = EncodeBuf::new();
        let err = value.encode(&mut buf).unwrap_err();
        assert!(matches!(
            err,
            Error::Encode {
                kind: EncodeErrorKind::UndefinedType { tag: 0x44 },
                ..
            }
        ));
    }

    #[test]
    fn test_ip_address_length_checked() {
        let mut dec = Decoder::from_slice(&[0x40, 0x03, 10, 0, 0]);
        assert!(Value::decode(&mut dec).is_err());
    }

    #[test]
    fn test_value_type_tags() {
        for tag in 0u8..=0xFF {
            if let Some(vt) = ValueType::from_tag(tag) {
                assert_eq!(vt.tag(), tag);
            }
        }
        assert_eq!(ValueType::Integer64.tag(), 0x50);
        assert_eq!(Value::from("x").value_type(), Some(ValueType::OctetString));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::TimeTicks(8_640_000).to_string(), "1d 0h 0m 0s");
        assert_eq!(Value::from("hello").to_string(), "hello");
        assert_eq!(Value::IpAddress([10, 0, 0, 1]).to_string(), "10.0.0.1");
    }
}
