// 🔍 Identity Resolver - composite identity keys + surrogate id allocation
//
// Two athlete records denote the same person when their identity keys match:
// (key-form name, birth date, NOC). Same name with a different birth date or
// country is a different person and is never collapsed.

use crate::dates;
use crate::normalize::{key_name, normalize_country_code, stored_key_name};
use crate::table::{cell, Table};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Largest cell value read as an id. Anything above it is treated as a
/// non-id value so the allocator always has room to count upward.
pub const MAX_ID: u64 = i64::MAX as u64;

// ============================================================================
// IDENTITY KEY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityKey {
    /// Lower-cased `"surname middle first"`
    pub name: String,

    /// Canonical `DD-Mon-YYYY`, empty when unknown
    pub born: String,

    /// Upper-cased NOC
    pub noc: String,
}

impl IdentityKey {
    /// Build a key from raw field values; each part is normalized
    pub fn new(name: &str, born: &str, noc: &str) -> Self {
        Self::from_key_form(&key_name(name), born, noc)
    }

    /// Build a key from a bio table row, whose name is already in key form
    pub fn from_stored(name: &str, born: &str, noc: &str) -> Self {
        Self::from_key_form(&stored_key_name(name), born, noc)
    }

    fn from_key_form(name: &str, born: &str, noc: &str) -> Self {
        IdentityKey {
            name: name.to_lowercase(),
            born: dates::render(dates::parse_date(born)),
            noc: normalize_country_code(noc),
        }
    }
}

// ============================================================================
// IDENTITY INDEX
// ============================================================================

/// Set of identity keys already present in a bio table
#[derive(Debug, Clone, Default)]
pub struct IdentityIndex {
    keys: HashSet<IdentityKey>,
}

impl IdentityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every row of a bio table. A table without `name`, `born` and
    /// `country_noc` columns yields an empty index.
    pub fn from_bio_table(table: &Table) -> Self {
        let mut index = IdentityIndex::new();
        let (Some(name), Some(born), Some(noc)) = (
            table.column("name"),
            table.column("born"),
            table.column("country_noc"),
        ) else {
            return index;
        };

        for row in &table.rows {
            index.insert(IdentityKey::from_stored(cell(row, name), cell(row, born), cell(row, noc)));
        }
        index
    }

    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.keys.contains(key)
    }

    /// Register a key; false when it was already present
    pub fn insert(&mut self, key: IdentityKey) -> bool {
        self.keys.insert(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

// ============================================================================
// SURROGATE IDS
// ============================================================================

/// Hands out consecutive integer ids above the current maximum.
///
/// Ids are never reused within a run, even if the record that received one
/// is discarded later.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Start after the largest numeric id (0 when there are none)
    pub fn after_max<'a, I>(ids: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self::with_floor(ids, 0)
    }

    /// Start after `max(largest numeric id, floor)`, the floor capped at `MAX_ID`
    pub fn with_floor<'a, I>(ids: I, floor: u64) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let max = ids.into_iter().filter_map(parse_id).max().unwrap_or(0);
        IdAllocator {
            next: max.max(floor.min(MAX_ID)) + 1,
        }
    }

    /// The id the next call to `allocate` will return
    pub fn peek(&self) -> u64 {
        self.next
    }

    pub fn allocate(&mut self) -> u64 {
        let id = self.next;
        self.next = self.next.saturating_add(1);
        id
    }
}

/// Only all-digit cells up to `MAX_ID` count as ids
fn parse_id(value: &str) -> Option<u64> {
    let value = value.trim();
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    value.parse().ok().filter(|&id| id <= MAX_ID)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_normalizes_parts() {
        let a = IdentityKey::new("jane q public", "1995-05-10", "usa");
        let b = IdentityKey::new("Public, Jane Q", "10-May-1995", "USA");

        assert_eq!(a, b);
        assert_eq!(a.name, "public q jane");
        assert_eq!(a.born, "10-May-1995");
        assert_eq!(a.noc, "USA");

        let stored = IdentityKey::from_stored("Public Q Jane", "10-May-1995", "USA");
        assert_eq!(stored, a);
    }

    #[test]
    fn test_name_only_collision_is_distinct() {
        let a = IdentityKey::new("John Smith", "01-Jan-1980", "GBR");
        let b = IdentityKey::new("John Smith", "02-Feb-1985", "GBR");
        let c = IdentityKey::new("John Smith", "01-Jan-1980", "AUS");

        let mut index = IdentityIndex::new();
        assert!(index.insert(a.clone()));
        assert!(!index.contains(&b));
        assert!(!index.contains(&c));
        assert!(!index.insert(a));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_index_from_bio_table() {
        let bio = Table::with_header(["athlete_id", "name", "born", "country_noc"])
            .with_row(["1", "Bolt Usain", "21-Aug-1986", "JAM"])
            .with_row(["2", "Public Q Jane", "", "USA"])
            .with_row(["3", "Smith, John", "", "GBR"]);

        let index = IdentityIndex::from_bio_table(&bio);
        assert_eq!(index.len(), 3);
        assert!(index.contains(&IdentityKey::new("usain bolt", "21 August 1986", "jam")));
        assert!(index.contains(&IdentityKey::new("jane q public", "", "usa")));
        assert!(index.contains(&IdentityKey::new("John Smith", "", "GBR")));
        assert!(!index.contains(&IdentityKey::new("Bolt Usain", "21 August 1986", "jam")));

        let no_born = Table::with_header(["athlete_id", "name"]).with_row(["1", "x"]);
        assert!(IdentityIndex::from_bio_table(&no_born).is_empty());
    }

    #[test]
    fn test_allocator_starts_after_max() {
        let mut ids = IdAllocator::after_max(["3", "17", "", "abc", "9"]);
        assert_eq!(ids.allocate(), 18);
        assert_eq!(ids.allocate(), 19);
        assert_eq!(ids.peek(), 20);

        let mut empty = IdAllocator::after_max(std::iter::empty::<&str>());
        assert_eq!(empty.allocate(), 1);
    }

    #[test]
    fn test_allocator_floor() {
        let mut low = IdAllocator::with_floor(["12", "400"], 1_000_000);
        assert_eq!(low.allocate(), 1_000_001);

        let mut high = IdAllocator::with_floor(["1200000"], 1_000_000);
        assert_eq!(high.allocate(), 1_200_001);
    }

    #[test]
    fn test_allocator_ignores_out_of_range_ids() {
        let mut ids = IdAllocator::after_max(["18446744073709551615", "5"]);
        assert_eq!(ids.allocate(), 6);

        let mut ids = IdAllocator::after_max(["99999999999999999999999", "7"]);
        assert_eq!(ids.allocate(), 8);

        let mut top = IdAllocator::after_max(["9223372036854775807"]);
        assert_eq!(top.allocate(), MAX_ID + 1);
        assert_eq!(top.peek(), MAX_ID + 2);

        let mut floored = IdAllocator::with_floor(std::iter::empty::<&str>(), u64::MAX);
        assert_eq!(floored.allocate(), MAX_ID + 1);
    }
}
