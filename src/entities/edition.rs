// 🏟️ Editions - start/end dates per Games edition
//
// Editions are keyed by lower-cased name. A handful of editions have
// authoritative dates that override whatever the games table says.

use crate::dates::{self, RANGE_SEPARATOR};
use crate::table::{cell, Table};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditionDates {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl EditionDates {
    /// `DD-Mon-YYYY to DD-Mon-YYYY`
    pub fn range(&self) -> String {
        format!(
            "{}{}{}",
            dates::format_date(self.start),
            RANGE_SEPARATOR,
            dates::format_date(self.end)
        )
    }
}

// ============================================================================
// KNOWN EDITIONS
// ============================================================================

/// An edition whose dates are fixed regardless of the source data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownEdition {
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl KnownEdition {
    pub fn new(name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        KnownEdition {
            name: name.into(),
            start,
            end,
        }
    }

    pub fn key(&self) -> String {
        self.name.trim().to_lowercase()
    }

    pub fn dates(&self) -> EditionDates {
        EditionDates {
            start: self.start,
            end: self.end,
        }
    }
}

/// Paris 2024 and Milano Cortina 2026
pub fn default_known_editions() -> Vec<KnownEdition> {
    [
        ("2024 Summer Olympics", (2024, 7, 26), (2024, 8, 11)),
        ("2026 Winter Olympics", (2026, 2, 6), (2026, 2, 22)),
    ]
    .into_iter()
    .filter_map(|(name, (sy, sm, sd), (ey, em, ed))| {
        Some(KnownEdition::new(
            name,
            NaiveDate::from_ymd_opt(sy, sm, sd)?,
            NaiveDate::from_ymd_opt(ey, em, ed)?,
        ))
    })
    .collect()
}

/// Label and id stamped on every incoming result row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEdition {
    pub name: String,
    pub id: String,
}

impl Default for NewEdition {
    fn default() -> Self {
        NewEdition {
            name: "2024 Summer Olympics".to_string(),
            id: "63".to_string(),
        }
    }
}

// ============================================================================
// EDITION REGISTRY
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct EditionRegistry {
    dates: HashMap<String, EditionDates>,
}

impl EditionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a merged games table. Only rows with both endpoints parsed are kept.
    pub fn from_games_table(games: &Table) -> Self {
        let mut registry = EditionRegistry::new();
        let (Some(edition_idx), Some(start_idx), Some(end_idx)) = (
            games.column("edition"),
            games.column("start_date"),
            games.column("end_date"),
        ) else {
            return registry;
        };

        for row in &games.rows {
            let start = dates::parse_date(cell(row, start_idx));
            let end = dates::parse_date(cell(row, end_idx));
            if let (Some(start), Some(end)) = (start, end) {
                registry.insert(cell(row, edition_idx), EditionDates { start, end });
            }
        }
        registry
    }

    /// Overlay authoritative dates
    pub fn with_known(mut self, known: &[KnownEdition]) -> Self {
        for edition in known {
            self.insert(&edition.name, edition.dates());
        }
        self
    }

    pub fn insert(&mut self, edition: &str, dates: EditionDates) {
        let key = edition.trim().to_lowercase();
        if !key.is_empty() {
            self.dates.insert(key, dates);
        }
    }

    pub fn get(&self, edition: &str) -> Option<EditionDates> {
        self.dates.get(&edition.trim().to_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_default_known_editions() {
        let known = default_known_editions();
        assert_eq!(known.len(), 2);
        assert_eq!(known[0].key(), "2024 summer olympics");
        assert_eq!(known[0].dates().range(), "26-Jul-2024 to 11-Aug-2024");
        assert_eq!(known[1].dates().range(), "06-Feb-2026 to 22-Feb-2026");
    }

    #[test]
    fn test_registry_from_games() {
        let games = Table::with_header(["edition", "edition_id", "start_date", "end_date"])
            .with_row(["1896 summer olympics", "1", "06-Apr-1896", "15-Apr-1896"])
            .with_row(["1916 summer olympics", "6", "", ""]);
        let registry = EditionRegistry::from_games_table(&games);

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get("1896 Summer Olympics"),
            Some(EditionDates { start: d(1896, 4, 6), end: d(1896, 4, 15) })
        );
        assert_eq!(registry.get("1916 summer olympics"), None);
    }

    #[test]
    fn test_known_overlay_wins() {
        let games = Table::with_header(["edition", "start_date", "end_date"])
            .with_row(["2024 summer olympics", "01-Jan-2024", "02-Jan-2024"]);
        let registry = EditionRegistry::from_games_table(&games).with_known(&default_known_editions());

        assert_eq!(registry.get("2024 summer olympics").map(|e| e.start), Some(d(2024, 7, 26)));
        assert!(registry.get("2026 winter olympics").is_some());
    }

    #[test]
    fn test_new_edition_default() {
        let edition = NewEdition::default();
        assert_eq!(edition.name, "2024 Summer Olympics");
        assert_eq!(edition.id, "63");
    }
}
