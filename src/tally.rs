// 🏅 Medal Tally - medals per (edition, country), team medals counted once
//
// Rebuilt from scratch on every run. A team gold shared by twelve rowers is
// one gold for the country, not twelve.

use crate::classify::Medal;
use crate::entities::{AthleteRegistry, CountryRegistry};
use crate::error::MergeError;
use crate::table::{cell, Table};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::info;

pub const TALLY_HEADER: [&str; 9] = [
    "edition",
    "edition_id",
    "Country",
    "NOC",
    "number_of_athletes",
    "gold_medal_count",
    "silver_medal_count",
    "bronze_medal_count",
    "total_medals",
];

const TABLE: &str = "results";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedalTallyEntry {
    pub edition: String,
    pub edition_id: String,
    pub country: String,
    pub noc: String,
    pub athletes: usize,
    pub gold: u32,
    pub silver: u32,
    pub bronze: u32,
}

impl MedalTallyEntry {
    pub fn total(&self) -> u32 {
        self.gold + self.silver + self.bronze
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.edition.clone(),
            self.edition_id.clone(),
            self.country.clone(),
            self.noc.clone(),
            self.athletes.to_string(),
            self.gold.to_string(),
            self.silver.to_string(),
            self.bronze.to_string(),
            self.total().to_string(),
        ]
    }
}

/// Running totals for one (edition, edition id, country, NOC) group
struct Group {
    entry: MedalTallyEntry,
    athletes: HashSet<String>,
    team_medals: HashSet<(String, Medal)>,
}

impl Group {
    fn new(edition: &str, edition_id: &str, country: &str, noc: &str) -> Self {
        Group {
            entry: MedalTallyEntry {
                edition: edition.to_string(),
                edition_id: edition_id.to_string(),
                country: country.to_string(),
                noc: noc.to_string(),
                athletes: 0,
                gold: 0,
                silver: 0,
                bronze: 0,
            },
            athletes: HashSet::new(),
            team_medals: HashSet::new(),
        }
    }

    fn record(&mut self, athlete_id: &str, medal: Medal, team_event: Option<&str>) {
        self.athletes.insert(athlete_id.to_string());
        if let Some(event) = team_event {
            if !self.team_medals.insert((event.trim().to_lowercase(), medal)) {
                return;
            }
        }
        match medal {
            Medal::Gold => self.entry.gold += 1,
            Medal::Silver => self.entry.silver += 1,
            Medal::Bronze => self.entry.bronze += 1,
        }
    }

    fn finish(self) -> MedalTallyEntry {
        MedalTallyEntry {
            athletes: self.athletes.len(),
            ..self.entry
        }
    }
}

/// Aggregate medals from the merged results.
///
/// Rows need an athlete id, a recognised medal and an athlete whose bio
/// record has a NOC. Groups are emitted in first-seen order; groups without
/// medals are not emitted.
pub fn medal_tally(
    results: &Table,
    athletes: &AthleteRegistry,
    countries: &CountryRegistry,
) -> Result<Vec<MedalTallyEntry>, MergeError> {
    if results.is_blank() {
        return Err(MergeError::MissingHeader { table: TABLE });
    }
    let athlete_idx = results
        .column("athlete_id")
        .ok_or_else(|| MergeError::missing_column(TABLE, "athlete_id"))?;
    let medal_idx = results
        .column("medal")
        .ok_or_else(|| MergeError::missing_column(TABLE, "medal"))?;
    let edition_idx = results.column("edition");
    let edition_id_idx = results.column("edition_id");
    let event_idx = results.column("event");
    let team_idx = results.column("isTeamSport");

    let field = |row: &[String], idx: Option<usize>| idx.map(|i| cell(row, i).to_string()).unwrap_or_default();

    let mut groups: Vec<Group> = Vec::new();
    let mut positions: HashMap<(String, String, String, String), usize> = HashMap::new();
    let mut skipped_no_noc = 0usize;

    for row in &results.rows {
        let athlete_id = cell(row, athlete_idx);
        let Some(medal) = Medal::from_text(cell(row, medal_idx)) else {
            continue;
        };
        if athlete_id.is_empty() {
            continue;
        }
        let Some(noc) = athletes.noc(athlete_id) else {
            skipped_no_noc += 1;
            continue;
        };

        let edition = field(row, edition_idx);
        let edition_id = field(row, edition_id_idx);
        let country = countries.name_or_code(noc).to_string();
        let key = (edition, edition_id, country, noc.to_string());

        let pos = match positions.get(&key) {
            Some(&pos) => pos,
            None => {
                groups.push(Group::new(&key.0, &key.1, &key.2, &key.3));
                positions.insert(key, groups.len() - 1);
                groups.len() - 1
            }
        };

        let is_team = team_idx
            .map(|i| cell(row, i).eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let event = event_idx.map(|i| cell(row, i)).unwrap_or("");
        groups[pos].record(athlete_id, medal, is_team.then_some(event));
    }

    let entries: Vec<MedalTallyEntry> = groups
        .into_iter()
        .map(Group::finish)
        .filter(|entry| entry.athletes > 0 && entry.total() > 0)
        .collect();

    info!(groups = entries.len(), skipped_no_noc, "built medal tally");
    Ok(entries)
}

/// Render tally entries with the fixed output header
pub fn tally_table(entries: &[MedalTallyEntry]) -> Table {
    Table {
        header: TALLY_HEADER.iter().map(|h| h.to_string()).collect(),
        rows: entries.iter().map(MedalTallyEntry::to_row).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bio() -> AthleteRegistry {
        let table = Table::with_header(["athlete_id", "name", "country_noc"])
            .with_row(["1", "A, One", "USA"])
            .with_row(["2", "B, Two", "USA"])
            .with_row(["3", "C, Three", "FRA"])
            .with_row(["4", "D, Four", ""]);
        AthleteRegistry::from_bio_table(&table)
    }

    fn countries() -> CountryRegistry {
        CountryRegistry::from_table(&Table::with_header(["noc", "country"]).with_row(["USA", "United States"]))
    }

    fn results() -> Table {
        Table::with_header(["edition", "edition_id", "event", "athlete_id", "medal", "isTeamSport"])
            .with_row(["2024 Summer Olympics", "63", "Swimming, 4 X 100M Relay, Women", "1", "gold", "True"])
            .with_row(["2024 Summer Olympics", "63", "swimming, 4 x 100m relay, women", "2", "gold", "True"])
            .with_row(["2024 Summer Olympics", "63", "Athletics, 100M, Men", "1", "silver", "False"])
            .with_row(["2024 Summer Olympics", "63", "Athletics, 200M, Men", "2", "silver", "false"])
            .with_row(["2024 Summer Olympics", "63", "Judo, -60 Kg, Men", "3", "bronze", "False"])
            .with_row(["2024 Summer Olympics", "63", "Judo, -66 Kg, Men", "3", "", "False"])
            .with_row(["2024 Summer Olympics", "63", "Judo, -73 Kg, Men", "4", "gold", "False"])
            .with_row(["2024 Summer Olympics", "63", "Judo, -81 Kg, Men", "", "gold", "False"])
            .with_row(["1896 summer olympics", "1", "athletics, 100 metres, men", "1", "na", "false"])
    }

    #[test]
    fn test_team_medal_counted_once() {
        let entries = medal_tally(&results(), &bio(), &countries()).unwrap();

        let usa = &entries[0];
        assert_eq!(usa.country, "United States");
        assert_eq!(usa.noc, "USA");
        assert_eq!(usa.athletes, 2);
        assert_eq!(usa.gold, 1);
        assert_eq!(usa.silver, 2);
        assert_eq!(usa.bronze, 0);
    }

    #[test]
    fn test_groups_and_fallbacks() {
        let entries = medal_tally(&results(), &bio(), &countries()).unwrap();

        // athlete 4 has no NOC, the empty-id row and the medal-less rows are ignored
        assert_eq!(entries.len(), 2);
        let fra = &entries[1];
        assert_eq!(fra.country, "FRA");
        assert_eq!((fra.gold, fra.silver, fra.bronze), (0, 0, 1));
    }

    #[test]
    fn test_totals_and_no_zero_rows() {
        let entries = medal_tally(&results(), &bio(), &countries()).unwrap();
        let table = tally_table(&entries);

        assert_eq!(table.header, TALLY_HEADER.to_vec());
        for row in &table.rows {
            let counts: Vec<u32> = row[4..].iter().map(|v| v.parse().unwrap()).collect();
            assert!(counts[0] > 0);
            assert_eq!(counts[1] + counts[2] + counts[3], counts[4]);
            assert!(counts[4] > 0);
        }
    }

    #[test]
    fn test_missing_columns() {
        let table = Table::with_header(["edition", "athlete_id"]);
        assert_eq!(
            medal_tally(&table, &bio(), &countries()),
            Err(MergeError::missing_column(TABLE, "medal"))
        );
    }
}
