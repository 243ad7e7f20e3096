//! Normalized expense records.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Payer name used when the payer cell is missing.
pub const UNKNOWN_PAYER: &str = "Unknown";

/// One accepted expense row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRecord {
    /// 0-based position of the source row
    pub id: usize,
    /// Date cell text, empty when missing
    pub date: String,
    /// Description cell text, empty when missing
    pub description: String,
    /// Total amount of the expense
    pub amount: f64,
    /// Trimmed payer name, or [`UNKNOWN_PAYER`]
    pub paid_by: String,
    /// Per-participant share of the amount
    pub shares: Shares,
}

/// Ordered participant → share mapping.
///
/// Entries keep column order, both in memory and when serialized as a JSON
/// object. Shares are not required to add up to the record's amount.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shares {
    entries: Vec<(String, f64)>,
}

impl Shares {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a participant's share, keeping the position of an existing entry.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Get a participant's share.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Iterate entries in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    /// Participant names in column order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Number of participants.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no participants.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all shares.
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v).sum()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for Shares {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut shares = Shares::new();
        for (name, value) in iter {
            shares.insert(name, value);
        }
        shares
    }
}

impl Serialize for Shares {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Shares {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SharesVisitor;

        impl<'de> Visitor<'de> for SharesVisitor {
            type Value = Shares;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of participant names to numbers")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Shares, A::Error> {
                let mut shares = Shares::new();
                while let Some((name, value)) = access.next_entry::<String, f64>()? {
                    shares.insert(name, value);
                }
                Ok(shares)
            }
        }

        deserializer.deserialize_map(SharesVisitor)
    }
}
