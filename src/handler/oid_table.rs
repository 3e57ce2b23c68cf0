//! OID-ordered table backing the MIB.

use crate::oid::Oid;

/// Entries kept sorted by OID.
///
/// Lookups are binary searches, so exact match, strict successor and
/// inclusive lower bound are all `O(log n)`. Walking forward from a bound is
/// a slice iteration.
///
/// # Example
///
/// ```rust
/// use tiny_snmp_agent::handler::OidTable;
/// use tiny_snmp_agent::oid;
///
/// let mut table = OidTable::new();
/// table.insert(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), "Device name");
/// table.insert(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), "Router");
///
/// let (next, _) = table.get_next(&oid!(1, 3, 6, 1, 2, 1, 1, 4, 0)).unwrap();
/// assert_eq!(next, &oid!(1, 3, 6, 1, 2, 1, 1, 5, 0));
/// ```
#[derive(Debug, Clone)]
pub struct OidTable<V> {
    entries: Vec<(Oid, V)>,
}

impl<V> OidTable<V> {
    /// Create a new empty OID table.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Create an OID table with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert an OID-value pair, maintaining sorted order.
    ///
    /// If the OID already exists, its value is replaced and the old one
    /// returned.
    pub fn insert(&mut self, oid: Oid, value: V) -> Option<V> {
        match self.entries.binary_search_by(|(o, _)| o.cmp(&oid)) {
            Ok(idx) => Some(std::mem::replace(&mut self.entries[idx].1, value)),
            Err(idx) => {
                self.entries.insert(idx, (oid, value));
                None
            }
        }
    }

    /// Remove an OID from the table.
    pub fn remove(&mut self, oid: &Oid) -> Option<V> {
        match self.entries.binary_search_by(|(o, _)| o.cmp(oid)) {
            Ok(idx) => Some(self.entries.remove(idx).1),
            Err(_) => None,
        }
    }

    /// Get the value for an exact OID match.
    pub fn get(&self, oid: &Oid) -> Option<&V> {
        self.entries
            .binary_search_by(|(o, _)| o.cmp(oid))
            .ok()
            .map(|idx| &self.entries[idx].1)
    }

    /// Smallest entry strictly greater than `oid`.
    pub fn get_next(&self, oid: &Oid) -> Option<(&Oid, &V)> {
        self.range_after(oid).next()
    }

    /// Smallest entry greater than or equal to `oid`.
    pub fn get_at_or_after(&self, oid: &Oid) -> Option<(&Oid, &V)> {
        self.range_from(oid).next()
    }

    /// Entries from `oid` (inclusive) to the end, in order.
    pub fn range_from(&self, oid: &Oid) -> impl Iterator<Item = (&Oid, &V)> {
        let start = self.entries.partition_point(|(o, _)| o < oid);
        self.entries[start..].iter().map(|(o, v)| (o, v))
    }

    /// Entries after `oid` (exclusive) to the end, in order.
    pub fn range_after(&self, oid: &Oid) -> impl Iterator<Item = (&Oid, &V)> {
        let start = self.entries.partition_point(|(o, _)| o <= oid);
        self.entries[start..].iter().map(|(o, v)| (o, v))
    }

    /// Get the number of entries in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all OID-value pairs in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = (&Oid, &V)> {
        self.entries.iter().map(|(o, v)| (o, v))
    }
}

impl<V> Default for OidTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FromIterator<(Oid, V)> for OidTable<V> {
    fn from_iter<I: IntoIterator<Item = (Oid, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (oid, value) in iter {
            table.insert(oid, value);
        }
        table
    }
}
