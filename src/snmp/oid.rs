use std::fmt;
use std::str::FromStr;

use crate::MalformedOid;

/// Hierarchical numeric identifier addressing one piece of device state.
///
/// Immutable once constructed; comparison is lexicographic over the
/// components. Construction never performs I/O.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Oid {
    parts: Vec<u32>,
}

impl Oid {
    /// The empty identifier, ancestor of everything.
    pub fn root() -> Self {
        Oid { parts: Vec::new() }
    }

    pub fn from_parts(parts: Vec<u32>) -> Self {
        Oid { parts }
    }

    pub fn from_slice(parts: &[u32]) -> Self {
        Oid {
            parts: parts.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<u32> {
        self.parts.get(index).copied()
    }

    pub fn back(&self) -> Option<u32> {
        self.parts.last().copied()
    }

    pub fn components(&self) -> &[u32] {
        &self.parts
    }

    /// Identifier with the last component removed. The root is its own
    /// parent.
    pub fn parent(&self) -> Oid {
        let mut parts = self.parts.clone();
        parts.pop();
        Oid { parts }
    }

    /// Identifier extended by one component.
    pub fn child(&self, sub_id: u32) -> Oid {
        let mut parts = self.parts.clone();
        parts.push(sub_id);
        Oid { parts }
    }

    /// True iff every component of `self` equals the corresponding prefix
    /// component of `other`. An identifier is an ancestor of itself.
    pub fn is_ancestor_of(&self, other: &Oid) -> bool {
        if self.len() > other.len() {
            return false;
        }
        self.parts.iter().zip(other.parts.iter()).all(|(a, b)| a == b)
    }

    pub fn is_parent_of(&self, other: &Oid) -> bool {
        other.len() == self.len() + 1 && self.is_ancestor_of(other)
    }

    /// Components of `self` past `prefix`, or `None` when `prefix` is not
    /// an ancestor. Used to derive table row keys from cell identifiers.
    pub fn strip_prefix(&self, prefix: &Oid) -> Option<&[u32]> {
        if prefix.is_ancestor_of(self) {
            Some(&self.parts[prefix.len()..])
        } else {
            None
        }
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            write!(f, ".{}", part)?;
        }
        Ok(())
    }
}

impl FromStr for Oid {
    type Err = MalformedOid;

    /// Parses dotted-integer text. A leading dot is optional and the
    /// `iso` label is accepted as alias for the first component `1`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim().trim_start_matches('.');
        if trimmed.is_empty() {
            return Ok(Oid::root());
        }

        let mut parts = Vec::new();
        for (index, piece) in trimmed.split('.').enumerate() {
            if index == 0 && piece == "iso" {
                parts.push(1);
                continue;
            }
            let value: u32 = piece
                .parse()
                .map_err(|_| MalformedOid(raw.to_string()))?;
            parts.push(value);
        }

        Ok(Oid { parts })
    }
}

impl From<&[u32]> for Oid {
    fn from(parts: &[u32]) -> Self {
        Oid::from_slice(parts)
    }
}
