// 🌍 Country Registry - NOC → country name

use crate::normalize::normalize_country_code;
use crate::table::{cell, Table};
use std::collections::HashMap;

/// Columns carrying the NOC, in priority order
pub const NOC_ALIASES: [&str; 2] = ["noc", "code"];

/// Columns carrying the country name in an incoming country table
pub const SOURCE_COUNTRY_ALIASES: [&str; 3] = ["country", "country_name", "country_long"];

/// Columns carrying the country name in the merged country table
pub const TARGET_COUNTRY_ALIASES: [&str; 2] = ["country", "country_name"];

#[derive(Debug, Clone, Default)]
pub struct CountryRegistry {
    names: HashMap<String, String>,
}

impl CountryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a merged country table; rows with an empty NOC or name are skipped
    pub fn from_table(table: &Table) -> Self {
        let mut registry = CountryRegistry::new();
        let (Some(noc_idx), Some(name_idx)) = (
            table.find_column(&NOC_ALIASES),
            table.find_column(&TARGET_COUNTRY_ALIASES),
        ) else {
            return registry;
        };

        for row in &table.rows {
            registry.insert(cell(row, noc_idx), cell(row, name_idx));
        }
        registry
    }

    pub fn insert(&mut self, noc: &str, name: &str) {
        let noc = normalize_country_code(noc);
        let name = name.trim();
        if !noc.is_empty() && !name.is_empty() {
            self.names.insert(noc, name.to_string());
        }
    }

    pub fn name(&self, noc: &str) -> Option<&str> {
        self.names.get(&normalize_country_code(noc)).map(String::as_str)
    }

    /// Country name for display, falling back to the code itself
    pub fn name_or_code<'a>(&'a self, noc: &'a str) -> &'a str {
        self.name(noc).unwrap_or(noc)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let table = Table::with_header(["noc", "country"])
            .with_row(["FRA", "France"])
            .with_row(["usa", "United States"])
            .with_row(["XXX", ""]);
        let registry = CountryRegistry::from_table(&table);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.name("fra"), Some("France"));
        assert_eq!(registry.name("USA"), Some("United States"));
        assert_eq!(registry.name("XXX"), None);
        assert_eq!(registry.name_or_code("ROC"), "ROC");
    }

    #[test]
    fn test_alias_columns() {
        let table = Table::with_header(["Code", "Country_Name"]).with_row(["JPN", "Japan"]);
        assert_eq!(CountryRegistry::from_table(&table).name("JPN"), Some("Japan"));

        let unusable = Table::with_header(["tag"]).with_row(["x"]);
        assert!(CountryRegistry::from_table(&unusable).is_empty());
    }
}
