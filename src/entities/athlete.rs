// 🏃 Athlete Registry - lookups over the merged bio table
//
// Names are matched in key form ("surname middle first", lower-cased). The bio
// table already stores that form; result files carry raw or display names,
// which are converted before lookup.

use crate::dates;
use crate::normalize::{key_name, normalize_country_code, stored_key_name};
use crate::table::{cell, Table};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Bio columns that may carry the athlete's NOC, in priority order
pub const BIO_NOC_ALIASES: [&str; 3] = ["country_noc", "noc", "country_code"];

#[derive(Debug, Clone, Default)]
pub struct AthleteRegistry {
    by_name: HashMap<String, String>,
    births: HashMap<String, NaiveDate>,
    nocs: HashMap<String, String>,
}

impl AthleteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a bio table. Rows without an `athlete_id` are ignored; a table
    /// without the column yields an empty registry.
    pub fn from_bio_table(bio: &Table) -> Self {
        let mut registry = AthleteRegistry::new();
        let Some(id_idx) = bio.column("athlete_id") else {
            return registry;
        };
        let name_idx = bio.column("name");
        let born_idx = bio.column("born");
        let noc_idx = bio.find_column(&BIO_NOC_ALIASES);

        for row in &bio.rows {
            let id = cell(row, id_idx);
            if id.is_empty() {
                continue;
            }
            if let Some(idx) = name_idx {
                registry.insert_key(stored_key_name(cell(row, idx)).to_lowercase(), id);
            }
            if let Some(born) = born_idx.and_then(|idx| dates::parse_date(cell(row, idx))) {
                registry.births.insert(id.to_string(), born);
            }
            if let Some(idx) = noc_idx {
                let noc = normalize_country_code(cell(row, idx));
                if !noc.is_empty() {
                    registry.nocs.insert(id.to_string(), noc);
                }
            }
        }
        registry
    }

    /// Map a raw or display name to an id. Later registrations of the same
    /// key win.
    pub fn register_name(&mut self, name: &str, athlete_id: &str) {
        self.insert_key(name_key(name), athlete_id);
    }

    fn insert_key(&mut self, key: String, athlete_id: &str) {
        if !key.is_empty() && !athlete_id.is_empty() {
            self.by_name.insert(key, athlete_id.to_string());
        }
    }

    /// Look up a raw (`"Usain Bolt"`) or display (`"Bolt, Usain"`) name
    pub fn id_for_name(&self, name: &str) -> Option<&str> {
        self.by_name.get(&name_key(name)).map(String::as_str)
    }

    pub fn birth_date(&self, athlete_id: &str) -> Option<NaiveDate> {
        self.births.get(athlete_id.trim()).copied()
    }

    pub fn noc(&self, athlete_id: &str) -> Option<&str> {
        self.nocs.get(athlete_id.trim()).map(String::as_str)
    }

    /// Number of distinct names indexed
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

fn name_key(name: &str) -> String {
    key_name(name).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bio() -> Table {
        Table::with_header(["athlete_id", "name", "sex", "born", "country_noc"])
            .with_row(["1", "Bolt Usain", "Male", "21-Aug-1986", "JAM"])
            .with_row(["2", "Public Q Jane", "Female", "", "usa"])
            .with_row(["", "Nobody Anon", "", "01-Jan-1990", "FRA"])
    }

    #[test]
    fn test_name_lookup_accepts_either_form() {
        let registry = AthleteRegistry::from_bio_table(&bio());

        assert_eq!(registry.id_for_name("usain bolt"), Some("1"));
        assert_eq!(registry.id_for_name("BOLT, Usain"), Some("1"));
        assert_eq!(registry.id_for_name("Jane Q Public"), Some("2"));
        assert_eq!(registry.id_for_name("Anon Nobody"), None);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_stored_names_are_not_reordered() {
        let bio = Table::with_header(["athlete_id", "name"])
            .with_row(["1", "Marchand Léon"])
            .with_row(["2", "Smith, John"]);
        let registry = AthleteRegistry::from_bio_table(&bio);

        assert_eq!(registry.id_for_name("Marchand, Léon"), Some("1"));
        assert_eq!(registry.id_for_name("Léon Marchand"), Some("1"));
        assert_eq!(registry.id_for_name("john smith"), Some("2"));
    }

    #[test]
    fn test_birth_and_noc() {
        let registry = AthleteRegistry::from_bio_table(&bio());

        assert_eq!(registry.birth_date("1"), NaiveDate::from_ymd_opt(1986, 8, 21));
        assert_eq!(registry.birth_date("2"), None);
        assert_eq!(registry.noc("2"), Some("USA"));
        assert_eq!(registry.noc("99"), None);
    }

    #[test]
    fn test_noc_alias_column() {
        let bio = Table::with_header(["athlete_id", "name", "noc"]).with_row(["5", "Ana Silva", "bra"]);
        let registry = AthleteRegistry::from_bio_table(&bio);
        assert_eq!(registry.noc("5"), Some("BRA"));
    }

    #[test]
    fn test_register_name() {
        let mut registry = AthleteRegistry::new();
        assert!(registry.is_empty());

        registry.register_name("Jean-Claude Killy", "40");
        assert_eq!(registry.id_for_name("killy, jean-claude"), Some("40"));

        registry.register_name("", "41");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_missing_id_column() {
        let bio = Table::with_header(["name"]).with_row(["Usain Bolt"]);
        assert!(AthleteRegistry::from_bio_table(&bio).is_empty());
    }
}
