//! Error types for tiny-snmp-agent.
//!
//! All errors are `#[non_exhaustive]` to allow adding new variants without breaking changes.

use std::net::SocketAddr;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// A field of the SNMP message grammar, used to say which one was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Version,
    Community,
    RequestId,
    NonRepeaters,
    MaxRepetitions,
    ErrorStatus,
    ErrorIndex,
    Oid,
    Value,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Version => write!(f, "version"),
            Self::Community => write!(f, "community"),
            Self::RequestId => write!(f, "request id"),
            Self::NonRepeaters => write!(f, "max repeaters"),
            Self::MaxRepetitions => write!(f, "max repetitions"),
            Self::ErrorStatus => write!(f, "error status"),
            Self::ErrorIndex => write!(f, "error index"),
            Self::Oid => write!(f, "oid"),
            Self::Value => write!(f, "var value"),
        }
    }
}

/// BER decode error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// Datagram has no bytes at all.
    EmptyMessage,
    /// A required field is absent or carries the wrong tag.
    Expected(Field),
    /// A field is present but its content could not be decoded.
    Bad(Field),
    /// Expected different tag.
    UnexpectedTag { expected: u8, actual: u8 },
    /// Data truncated unexpectedly.
    TruncatedData,
    /// Indefinite length not supported.
    IndefiniteLength,
    /// Length field too long.
    LengthTooLong { octets: usize },
    /// TLV extends past the enclosing bound.
    TlvOverflow,
    /// Insufficient data for read.
    InsufficientData { needed: usize, available: usize },
    /// Constructed content did not end exactly at its declared length.
    SequenceUnderrun { end: usize, position: usize },
    /// Bytes left after the outer message sequence.
    TrailingData,
    /// OID arc does not fit in 32 bits.
    SubidentifierOverflow,
    /// OID ends in the middle of an arc.
    InvalidOidEncoding,
    /// Invalid IP address length.
    InvalidIpAddressLength { length: usize },
    /// Unknown SNMP version.
    UnknownVersion(i32),
    /// Unknown PDU type.
    UnknownPduType(u8),
}

impl std::fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "empty stream"),
            Self::Expected(Field::Oid) => write!(f, "expected oid"),
            Self::Expected(field) => write!(f, "{} expected", field),
            Self::Bad(field) => write!(f, "bad {}", field),
            Self::UnexpectedTag { expected, actual } => {
                write!(f, "expected tag 0x{:02X}, got 0x{:02X}", expected, actual)
            }
            Self::TruncatedData => write!(f, "unexpected end of data"),
            Self::IndefiniteLength => write!(f, "indefinite length encoding not supported"),
            Self::LengthTooLong { octets } => {
                write!(f, "length encoding too long ({} octets)", octets)
            }
            Self::TlvOverflow => write!(f, "TLV extends past end of data"),
            Self::InsufficientData { needed, available } => {
                write!(f, "need {} bytes but only {} remaining", needed, available)
            }
            Self::SequenceUnderrun { end, position } => {
                write!(
                    f,
                    "unexpected end of stream (content ends at {}, stopped at {})",
                    end, position
                )
            }
            Self::TrailingData => write!(f, "unused data at the end of pdu"),
            Self::SubidentifierOverflow => write!(f, "subidentifier overflow"),
            Self::InvalidOidEncoding => write!(f, "invalid OID encoding"),
            Self::InvalidIpAddressLength { length } => {
                write!(f, "IP address must be 4 bytes, got {}", length)
            }
            Self::UnknownVersion(v) => write!(f, "unsupported version: {}", v),
            Self::UnknownPduType(t) => write!(f, "unknown PDU type: 0x{:02X}", t),
        }
    }
}

/// BER encode error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeErrorKind {
    /// OID cannot be expressed with the first-byte packing scheme.
    InvalidOid(OidErrorKind),
    /// Value has no wire type (unknown tag).
    UndefinedType { tag: u8 },
    /// Buffer growth failed.
    AllocationFailed,
}

impl std::fmt::Display for EncodeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidOid(kind) => write!(f, "encode var oid: {}", kind),
            Self::UndefinedType { tag } => write!(f, "undefined var type 0x{:02X}", tag),
            Self::AllocationFailed => write!(f, "alloc encode buffer"),
        }
    }
}

/// OID validation error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OidErrorKind {
    /// Invalid arc value.
    InvalidArc,
    /// First arc must be 0, 1, or 2.
    InvalidFirstArc(u32),
    /// Second arc must be below 40.
    InvalidSecondArc { first: u32, second: u32 },
}

impl std::fmt::Display for OidErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArc => write!(f, "invalid arc value"),
            Self::InvalidFirstArc(v) => write!(f, "first arc must be 0, 1, or 2, got {}", v),
            Self::InvalidSecondArc { first, second } => {
                write!(f, "second arc {} too large for first arc {}", second, first)
            }
        }
    }
}

/// SNMP error status codes (RFC 3416).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorStatus {
    NoError,
    TooBig,
    NoSuchName,
    BadValue,
    ReadOnly,
    GenErr,
    NoAccess,
    WrongType,
    WrongLength,
    WrongEncoding,
    WrongValue,
    NoCreation,
    InconsistentValue,
    ResourceUnavailable,
    CommitFailed,
    UndoFailed,
    AuthorizationError,
    NotWritable,
    InconsistentName,
    /// Walk ran past the last registered object.
    ///
    /// There is no dedicated status code for this in v1/v2c, so it goes
    /// out on the wire as `noSuchName` (2).
    EndOfMibView,
    /// Unknown/future error status code.
    Unknown(i32),
}

impl ErrorStatus {
    /// Create from raw status code.
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => Self::NoError,
            1 => Self::TooBig,
            2 => Self::NoSuchName,
            3 => Self::BadValue,
            4 => Self::ReadOnly,
            5 => Self::GenErr,
            6 => Self::NoAccess,
            7 => Self::WrongType,
            8 => Self::WrongLength,
            9 => Self::WrongEncoding,
            10 => Self::WrongValue,
            11 => Self::NoCreation,
            12 => Self::InconsistentValue,
            13 => Self::ResourceUnavailable,
            14 => Self::CommitFailed,
            15 => Self::UndoFailed,
            16 => Self::AuthorizationError,
            17 => Self::NotWritable,
            18 => Self::InconsistentName,
            other => Self::Unknown(other),
        }
    }

    /// Convert to raw status code.
    pub fn as_i32(&self) -> i32 {
        match self {
            Self::NoError => 0,
            Self::TooBig => 1,
            Self::NoSuchName | Self::EndOfMibView => 2,
            Self::BadValue => 3,
            Self::ReadOnly => 4,
            Self::GenErr => 5,
            Self::NoAccess => 6,
            Self::WrongType => 7,
            Self::WrongLength => 8,
            Self::WrongEncoding => 9,
            Self::WrongValue => 10,
            Self::NoCreation => 11,
            Self::InconsistentValue => 12,
            Self::ResourceUnavailable => 13,
            Self::CommitFailed => 14,
            Self::UndoFailed => 15,
            Self::AuthorizationError => 16,
            Self::NotWritable => 17,
            Self::InconsistentName => 18,
            Self::Unknown(code) => *code,
        }
    }
}

impl std::fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoError => write!(f, "noError"),
            Self::TooBig => write!(f, "tooBig"),
            Self::NoSuchName => write!(f, "noSuchName"),
            Self::BadValue => write!(f, "badValue"),
            Self::ReadOnly => write!(f, "readOnly"),
            Self::GenErr => write!(f, "genErr"),
            Self::NoAccess => write!(f, "noAccess"),
            Self::WrongType => write!(f, "wrongType"),
            Self::WrongLength => write!(f, "wrongLength"),
            Self::WrongEncoding => write!(f, "wrongEncoding"),
            Self::WrongValue => write!(f, "wrongValue"),
            Self::NoCreation => write!(f, "noCreation"),
            Self::InconsistentValue => write!(f, "inconsistentValue"),
            Self::ResourceUnavailable => write!(f, "resourceUnavailable"),
            Self::CommitFailed => write!(f, "commitFailed"),
            Self::UndoFailed => write!(f, "undoFailed"),
            Self::AuthorizationError => write!(f, "authorizationError"),
            Self::NotWritable => write!(f, "notWritable"),
            Self::InconsistentName => write!(f, "inconsistentName"),
            Self::EndOfMibView => write!(f, "endOfMibView"),
            Self::Unknown(code) => write!(f, "unknown({})", code),
        }
    }
}

/// Library error type.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error on the agent socket.
    #[error("I/O error{}: {source}", target.map(|t| format!(" communicating with {}", t)).unwrap_or_default())]
    Io {
        target: Option<SocketAddr>,
        #[source]
        source: std::io::Error,
    },

    /// Invalid OID format.
    #[error("invalid OID: {kind}")]
    InvalidOid {
        kind: OidErrorKind,
        input: Option<Box<str>>, // Only allocated when parsing string input
    },

    /// BER decoding error.
    #[error("decode error at offset {offset}: {kind}")]
    Decode {
        offset: usize,
        kind: DecodeErrorKind,
    },

    /// BER encoding error.
    #[error("encode error at offset {}: {kind}", offset.map(|o| o as i64).unwrap_or(-1))]
    Encode {
        offset: Option<usize>,
        kind: EncodeErrorKind,
    },

    /// Invalid agent configuration.
    #[error("configuration error: {0}")]
    Config(Box<str>),
}

impl Error {
    /// Create a decode error.
    pub fn decode(offset: usize, kind: DecodeErrorKind) -> Self {
        Self::Decode { offset, kind }
    }

    /// Create an encode error at a buffer position.
    pub fn encode(offset: usize, kind: EncodeErrorKind) -> Self {
        Self::Encode {
            offset: Some(offset),
            kind,
        }
    }

    /// Create an encode error that has no meaningful position (resource failures).
    pub fn resource(kind: EncodeErrorKind) -> Self {
        Self::Encode { offset: None, kind }
    }

    /// Create an invalid OID error from a kind (no input string).
    pub fn invalid_oid(kind: OidErrorKind) -> Self {
        Self::InvalidOid { kind, input: None }
    }

    /// Create an invalid OID error with the input string that failed.
    pub fn invalid_oid_with_input(kind: OidErrorKind, input: impl Into<Box<str>>) -> Self {
        Self::InvalidOid {
            kind,
            input: Some(input.into()),
        }
    }

    /// Byte position the error refers to, `-1` when there is none.
    pub fn position(&self) -> i64 {
        match self {
            Self::Decode { offset, .. } => *offset as i64,
            Self::Encode {
                offset: Some(offset),
                ..
            } => *offset as i64,
            _ => -1,
        }
    }

    /// Get the target address if this error has one.
    pub fn target(&self) -> Option<SocketAddr> {
        match self {
            Self::Io { target, .. } => *target,
            _ => None,
        }
    }
}

/// First-error-wins slot.
///
/// Once a value is recorded, later calls to [`record`](Self::record) are
/// ignored. Codec cursors keep one so that the cause reported for a failed
/// nested decode or encode is the innermost one, not whatever the outer
/// layers say on the way out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstError<T> {
    slot: Option<T>,
}

impl<T: Clone> FirstError<T> {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self { slot: None }
    }

    /// Record `err` unless something is already recorded.
    ///
    /// Returns `true` if `err` was stored.
    pub fn record(&mut self, err: T) -> bool {
        if self.slot.is_some() {
            return false;
        }
        self.slot = Some(err);
        true
    }

    /// Record `err` if the slot is empty, then return whatever the slot holds.
    pub fn resolve(&mut self, err: T) -> T {
        match &self.slot {
            Some(first) => first.clone(),
            None => {
                self.slot = Some(err.clone());
                err
            }
        }
    }

    /// The recorded error, if any.
    pub fn get(&self) -> Option<&T> {
        self.slot.as_ref()
    }

    /// Whether an error has been recorded.
    pub fn is_set(&self) -> bool {
        self.slot.is_some()
    }

    /// Remove and return the recorded error.
    pub fn take(&mut self) -> Option<T> {
        self.slot.take()
    }
}

impl<T: Clone> Default for FirstError<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_error_keeps_first() {
        let mut slot = FirstError::new();
        assert!(slot.record((3usize, DecodeErrorKind::TruncatedData)));
        assert!(!slot.record((9usize, DecodeErrorKind::TrailingData)));
        assert_eq!(slot.get(), Some(&(3, DecodeErrorKind::TruncatedData)));
    }

    #[test]
    fn first_error_resolve_returns_recorded() {
        let mut slot = FirstError::new();
        assert_eq!(
            slot.resolve((1usize, DecodeErrorKind::Expected(Field::Oid))),
            (1, DecodeErrorKind::Expected(Field::Oid))
        );
        assert_eq!(
            slot.resolve((7usize, DecodeErrorKind::Bad(Field::Value))),
            (1, DecodeErrorKind::Expected(Field::Oid))
        );
        assert!(slot.take().is_some());
        assert!(!slot.is_set());
    }

    #[test]
    fn decode_messages() {
        assert_eq!(DecodeErrorKind::EmptyMessage.to_string(), "empty stream");
        assert_eq!(
            DecodeErrorKind::Expected(Field::Version).to_string(),
            "version expected"
        );
        assert_eq!(
            DecodeErrorKind::Expected(Field::Oid).to_string(),
            "expected oid"
        );
        assert_eq!(DecodeErrorKind::Bad(Field::Value).to_string(), "bad var value");
        assert_eq!(
            DecodeErrorKind::Expected(Field::NonRepeaters).to_string(),
            "max repeaters expected"
        );
        assert_eq!(
            DecodeErrorKind::TrailingData.to_string(),
            "unused data at the end of pdu"
        );
    }

    #[test]
    fn resource_error_has_no_position() {
        let err = Error::resource(EncodeErrorKind::AllocationFailed);
        assert_eq!(err.position(), -1);
        assert!(err.to_string().contains("-1"));

        let err = Error::decode(12, DecodeErrorKind::TruncatedData);
        assert_eq!(err.position(), 12);
    }

    #[test]
    fn end_of_mib_view_status_code() {
        assert_eq!(ErrorStatus::EndOfMibView.as_i32(), 2);
        assert_eq!(ErrorStatus::from_i32(2), ErrorStatus::NoSuchName);
        assert_eq!(ErrorStatus::from_i32(5), ErrorStatus::GenErr);
        assert_eq!(ErrorStatus::from_i32(99), ErrorStatus::Unknown(99));
    }
}
