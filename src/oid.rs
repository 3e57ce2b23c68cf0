//! Object Identifier (OID) type.
//!
//! OIDs are stored as `SmallVec<[u32; 16]>` to avoid heap allocation for common OIDs.

use crate::error::{DecodeErrorKind, Error, OidErrorKind, Result};
use smallvec::SmallVec;
use std::fmt;

/// Object Identifier.
///
/// Stored as a sequence of arc values (u32). Ordering is lexicographic by
/// arc, and an OID that is a strict prefix of another sorts first:
/// `1.3.6` < `1.3.6.1` < `1.3.7`. Cloning copies the arcs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Oid {
    arcs: SmallVec<[u32; 16]>,
}

impl Oid {
    /// Create an empty OID.
    pub fn empty() -> Self {
        Self {
            arcs: SmallVec::new(),
        }
    }

    /// Create an OID from arc values.
    ///
    /// ```
    /// use tiny_snmp_agent::oid::Oid;
    ///
    /// let oid = Oid::new([1, 3, 6, 1]);
    /// assert_eq!(oid.len(), 4);
    /// ```
    pub fn new(arcs: impl IntoIterator<Item = u32>) -> Self {
        Self {
            arcs: arcs.into_iter().collect(),
        }
    }

    /// Create an OID from a slice of arcs.
    pub fn from_slice(arcs: &[u32]) -> Self {
        Self {
            arcs: SmallVec::from_slice(arcs),
        }
    }

    /// Parse an OID from dotted string notation (e.g., "1.3.6.1.2.1.1.1.0").
    ///
    /// A leading dot is accepted. Arc constraints are not checked here; they
    /// are enforced when the OID is encoded.
    ///
    /// ```
    /// use tiny_snmp_agent::oid::Oid;
    ///
    /// let oid = Oid::parse(".1.3.6.1.2.1.1.5.0").unwrap();
    /// assert_eq!(oid.to_string(), "1.3.6.1.2.1.1.5.0");
    /// assert!(Oid::parse("1.3.x").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let mut arcs = SmallVec::new();

        for part in s.split('.') {
            if part.is_empty() {
                continue;
            }

            let arc: u32 = part.parse().map_err(|_| {
                Error::invalid_oid_with_input(OidErrorKind::InvalidArc, s.to_string())
            })?;

            arcs.push(arc);
        }

        Ok(Self { arcs })
    }

    /// Get the arc values.
    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    /// Get the number of arcs.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// Check if the OID is empty.
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Check if this OID starts with another OID.
    pub fn starts_with(&self, other: &Oid) -> bool {
        self.arcs.len() >= other.arcs.len() && self.arcs[..other.arcs.len()] == other.arcs[..]
    }

    /// Create a child OID by appending an arc.
    pub fn child(&self, arc: u32) -> Oid {
        let mut arcs = self.arcs.clone();
        arcs.push(arc);
        Oid { arcs }
    }

    /// Check that the OID can be encoded.
    ///
    /// The first two arcs share one content byte (`first * 40 + second`), so
    /// the first arc must be 0, 1 or 2 and the second below 40. A single-arc
    /// OID is encoded as if its second arc were 0.
    pub fn validate(&self) -> Result<()> {
        let Some(&first) = self.arcs.first() else {
            return Ok(());
        };

        if first > 2 {
            return Err(Error::invalid_oid(OidErrorKind::InvalidFirstArc(first)));
        }

        if let Some(&second) = self.arcs.get(1)
            && second >= 40
        {
            return Err(Error::invalid_oid(OidErrorKind::InvalidSecondArc {
                first,
                second,
            }));
        }

        Ok(())
    }

    /// Size in bytes of the BER content for this OID (no tag or length).
    pub fn encoded_len(&self) -> usize {
        match self.arcs.len() {
            0 => 0,
            1 | 2 => 1,
            _ => 1 + self.arcs[2..].iter().map(|&a| arc_width(a)).sum::<usize>(),
        }
    }

    /// Encode to BER content bytes.
    ///
    /// An empty OID encodes as zero bytes.
    pub fn to_ber(&self) -> Result<SmallVec<[u8; 64]>> {
        self.validate()?;

        let mut bytes = SmallVec::with_capacity(self.encoded_len());

        match self.arcs.as_slice() {
            [] => {}
            [first] => bytes.push((first * 40) as u8),
            [first, second, rest @ ..] => {
                bytes.push((first * 40 + second) as u8);
                for &arc in rest {
                    encode_subidentifier(&mut bytes, arc);
                }
            }
        }

        Ok(bytes)
    }

    /// Decode from BER content bytes.
    ///
    /// The first byte splits into two arcs as `(b / 40, b % 40)`; every
    /// later arc is base-128 with the high bit marking continuation.
    /// Offsets in errors are relative to `data`.
    pub fn from_ber(data: &[u8]) -> Result<Self> {
        let Some((&first, rest)) = data.split_first() else {
            return Ok(Self::empty());
        };

        let mut arcs = SmallVec::new();
        arcs.push(u32::from(first / 40));
        arcs.push(u32::from(first % 40));

        let mut i = 0;
        while i < rest.len() {
            let (arc, consumed) = decode_subidentifier(&rest[i..], 1 + i)?;
            arcs.push(arc);
            i += consumed;
        }

        Ok(Self { arcs })
    }
}

/// Bytes needed to encode one arc in base-128 (1 to 5).
pub const fn arc_width(arc: u32) -> usize {
    match arc {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        0x20_0000..=0x0FFF_FFFF => 4,
        _ => 5,
    }
}

#[inline]
fn encode_subidentifier(bytes: &mut SmallVec<[u8; 64]>, value: u32) {
    let width = arc_width(value);

    // Most significant group first
    for i in (0..width).rev() {
        let mut byte = ((value >> (i * 7)) & 0x7F) as u8;
        if i > 0 {
            byte |= 0x80; // Continuation bit
        }
        bytes.push(byte);
    }
}

/// Decode one arc, returning (value, bytes_consumed).
///
/// `base` is the position of `data[0]` within the OID content.
fn decode_subidentifier(data: &[u8], base: usize) -> Result<(u32, usize)> {
    let mut value: u32 = 0;

    for (i, &byte) in data.iter().enumerate() {
        if value > (u32::MAX >> 7) {
            return Err(Error::decode(
                base + i,
                DecodeErrorKind::SubidentifierOverflow,
            ));
        }

        value = (value << 7) | u32::from(byte & 0x7F);

        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }

    Err(Error::decode(
        base + data.len(),
        DecodeErrorKind::InvalidOidEncoding,
    ))
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for arc in &self.arcs {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", arc)?;
            first = false;
        }
        Ok(())
    }
}

impl std::str::FromStr for Oid {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<&[u32]> for Oid {
    fn from(arcs: &[u32]) -> Self {
        Self::from_slice(arcs)
    }
}

impl<const N: usize> From<[u32; N]> for Oid {
    fn from(arcs: [u32; N]) -> Self {
        Self::new(arcs)
    }
}

impl PartialOrd for Oid {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Oid {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.arcs.cmp(&other.arcs)
    }
}

/// Macro to create an OID from literal arcs.
///
/// ```
/// use tiny_snmp_agent::oid;
///
/// let sys_name = oid!(1, 3, 6, 1, 2, 1, 1, 5, 0);
/// assert_eq!(sys_name.to_string(), "1.3.6.1.2.1.1.5.0");
/// ```
#[macro_export]
macro_rules! oid {
    ($($arc:expr),* $(,)?) => {
        $crate::oid::Oid::from_slice(&[$($arc),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let oid = Oid::parse("1.3.6.1.2.1.1.1.0").unwrap();
        assert_eq!(oid.arcs(), &[1, 3, 6, 1, 2, 1, 1, 1, 0]);
        assert!(Oid::parse("").unwrap().is_empty());
        assert!(Oid::parse("1.3.99999999999").is_err());
    }

    #[test]
    fn test_display() {
        let oid = Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 1, 0]);
        assert_eq!(oid.to_string(), "1.3.6.1.2.1.1.1.0");
        assert_eq!(Oid::empty().to_string(), "");
    }

    #[test]
    fn test_ordering() {
        let a = oid!(1, 3, 6);
        let b = oid!(1, 3, 6, 1);
        let c = oid!(1, 3, 7);
        assert!(a < b);
        assert!(b < c);
        assert!(a < c);
        assert_ne!(a, b);
        assert_eq!(b, Oid::parse("1.3.6.1").unwrap());
    }

    #[test]
    fn test_ber_encoding() {
        // 1.3.6.1 encodes as: (1*40+3)=43, 6, 1
        let oid = oid!(1, 3, 6, 1);
        assert_eq!(oid.to_ber().unwrap().as_slice(), &[0x2B, 0x06, 0x01]);
    }

    #[test]
    fn test_ber_arc_widths() {
        let cases: [(u32, &[u8]); 6] = [
            (127, &[0x7F]),
            (128, &[0x81, 0x00]),
            (16383, &[0xFF, 0x7F]),
            (16384, &[0x81, 0x80, 0x00]),
            (2097151, &[0xFF, 0xFF, 0x7F]),
            (2097152, &[0x81, 0x80, 0x80, 0x00]),
        ];

        for (arc, expected) in cases {
            let oid = oid!(1, 3, arc);
            let ber = oid.to_ber().unwrap();
            assert_eq!(&ber[1..], expected, "arc {}", arc);
            assert_eq!(oid.encoded_len(), ber.len());
            assert_eq!(Oid::from_ber(&ber).unwrap(), oid);
        }

        assert_eq!(arc_width(u32::MAX), 5);
        let oid = oid!(1, 3, u32::MAX);
        assert_eq!(Oid::from_ber(&oid.to_ber().unwrap()).unwrap(), oid);
    }

    #[test]
    fn test_single_arc_encoding() {
        assert_eq!(oid!(1).to_ber().unwrap().as_slice(), &[40]);
        assert_eq!(oid!(2).to_ber().unwrap().as_slice(), &[80]);
        assert_eq!(Oid::from_ber(&[40]).unwrap(), oid!(1, 0));
    }

    #[test]
    fn test_empty_oid() {
        assert!(Oid::empty().to_ber().unwrap().is_empty());
        assert!(Oid::from_ber(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_encoding_constraints() {
        assert!(matches!(
            oid!(3, 1).to_ber(),
            Err(Error::InvalidOid {
                kind: OidErrorKind::InvalidFirstArc(3),
                ..
            })
        ));
        assert!(oid!(5).to_ber().is_err());
        assert!(matches!(
            oid!(1, 40).to_ber(),
            Err(Error::InvalidOid {
                kind: OidErrorKind::InvalidSecondArc { first: 1, second: 40 },
                ..
            })
        ));
        assert!(oid!(2, 40, 1).to_ber().is_err());
        assert!(oid!(2, 39).to_ber().is_ok());
    }

    #[test]
    fn test_decode_truncated_arc() {
        let err = Oid::from_ber(&[0x2B, 0x86]).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                offset: 2,
                kind: DecodeErrorKind::InvalidOidEncoding
            }
        ));
    }

    #[test]
    fn test_decode_overflow() {
        let err = Oid::from_ber(&[0x2B, 0x90, 0x80, 0x80, 0x80, 0x80, 0x00]).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                kind: DecodeErrorKind::SubidentifierOverflow,
                ..
            }
        ));
    }

    #[test]
    fn test_non_minimal_subidentifier() {
        assert_eq!(Oid::from_ber(&[0x2B, 0x80, 0x01]).unwrap().arcs(), &[1, 3, 1]);
    }

    #[test]
    fn test_starts_with_and_child() {
        let system = oid!(1, 3, 6, 1, 2, 1, 1);
        let sys_name = system.child(5).child(0);
        assert!(sys_name.starts_with(&system));
        assert!(!system.starts_with(&sys_name));
        assert_eq!(sys_name, oid!(1, 3, 6, 1, 2, 1, 1, 5, 0));
    }
}
