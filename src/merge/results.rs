// 🥇 Result merge - append incoming medallist rows to the event results
//
// Every incoming row becomes one result for the new edition: fresh result id,
// normalized event label, medal and position for medallists, athlete id when
// the name is already in the bio table.
//
// Incoming names are read raw (`"Léon Marchand"`) and written in display form
// (`"Marchand, Léon"`).

use crate::classify::{classify_event, is_medallist_flag, is_team_entry, medal_for};
use crate::entities::{AthleteRegistry, NewEdition};
use crate::error::MergeError;
use crate::identity::IdAllocator;
use crate::normalize::{display_name, normalize_country_code};
use crate::table::{cell, Table};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const TABLE: &str = "results";
const SOURCE_TABLE: &str = "medallists";

pub const NAME_ALIASES: [&str; 1] = ["name"];
pub const NOC_ALIASES: [&str; 2] = ["country_code", "noc"];
pub const DISCIPLINE_ALIASES: [&str; 2] = ["discipline", "sport"];
pub const EVENT_ALIASES: [&str; 1] = ["event"];
pub const MEDAL_ALIASES: [&str; 2] = ["medal_type", "medal"];
pub const TEAM_ALIASES: [&str; 1] = ["team"];
pub const MEDALLIST_ALIASES: [&str; 1] = ["is_medallist"];

/// Result ids for new rows start above this, even when existing ids are lower
pub const DEFAULT_RESULT_ID_FLOOR: u64 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultMergeOptions {
    /// Edition label and id stamped on every new row
    pub edition: NewEdition,

    pub result_id_floor: u64,
}

impl Default for ResultMergeOptions {
    fn default() -> Self {
        ResultMergeOptions {
            edition: NewEdition::default(),
            result_id_floor: DEFAULT_RESULT_ID_FLOOR,
        }
    }
}

/// Incoming columns, resolved once per merge
struct SourceColumns {
    name: usize,
    noc: usize,
    discipline: usize,
    event: Option<usize>,
    medal: Option<usize>,
    team: Option<usize>,
    medallist: Option<usize>,
}

impl SourceColumns {
    fn resolve(incoming: &Table) -> Result<Self, MergeError> {
        let required = |field: &'static str, aliases: &[&str]| {
            incoming
                .find_column(aliases)
                .ok_or_else(|| MergeError::unmapped(SOURCE_TABLE, field, aliases))
        };
        Ok(SourceColumns {
            name: required("name", &NAME_ALIASES)?,
            noc: required("country_code", &NOC_ALIASES)?,
            discipline: required("discipline", &DISCIPLINE_ALIASES)?,
            event: incoming.find_column(&EVENT_ALIASES),
            medal: incoming.find_column(&MEDAL_ALIASES),
            team: incoming.find_column(&TEAM_ALIASES),
            medallist: incoming.find_column(&MEDALLIST_ALIASES),
        })
    }
}

fn team_flag(is_team: bool) -> &'static str {
    if is_team {
        "True"
    } else {
        "False"
    }
}

fn optional<'a>(row: &'a [String], idx: Option<usize>) -> &'a str {
    idx.map(|i| cell(row, i)).unwrap_or("")
}

/// Merge incoming medallist rows into the results table.
///
/// The target gains an `age` column when it has none; new rows leave it
/// empty for the enrichment step. Rows without an athlete name are dropped.
pub fn merge_results(
    incoming: &Table,
    target: &Table,
    athletes: &AthleteRegistry,
    options: &ResultMergeOptions,
) -> Result<Table, MergeError> {
    if target.is_blank() {
        return Err(MergeError::MissingHeader { table: TABLE });
    }

    let mut merged = target.clone();
    merged.ensure_column("age");
    if incoming.is_blank() {
        debug!("no incoming result rows");
        return Ok(merged);
    }
    let source = SourceColumns::resolve(incoming)?;

    let mut ids = match merged.column("result_id") {
        Some(idx) => IdAllocator::with_floor(merged.column_values(idx), options.result_id_floor),
        None => IdAllocator::with_floor(std::iter::empty::<&str>(), options.result_id_floor),
    };

    let header: Vec<String> = merged.header.iter().map(|h| h.trim().to_string()).collect();
    let mut dropped = 0usize;
    let mut unresolved = 0usize;

    for row in &incoming.rows {
        let athlete = display_name(cell(row, source.name));
        if athlete.is_empty() {
            dropped += 1;
            continue;
        }

        let discipline = cell(row, source.discipline);
        let event = optional(row, source.event);
        let medal = medal_for(
            optional(row, source.medal),
            is_medallist_flag(optional(row, source.medallist)),
        );
        let team = source.team.and_then(|idx| row.get(idx)).map(String::as_str);
        let athlete_id = athletes.id_for_name(&athlete).unwrap_or("");
        if athlete_id.is_empty() {
            unresolved += 1;
        }

        let new_row: Vec<String> = header
            .iter()
            .map(|column| match column.as_str() {
                "edition" => options.edition.name.clone(),
                "edition_id" => options.edition.id.clone(),
                "result_id" => ids.allocate().to_string(),
                "pos" => medal.map(|m| m.position().to_string()).unwrap_or_default(),
                "medal" => medal.map(|m| m.as_str().to_string()).unwrap_or_default(),
                "athlete_id" => athlete_id.to_string(),
                "athlete" => athlete.clone(),
                "country_noc" => normalize_country_code(cell(row, source.noc)),
                "sport" => discipline.to_lowercase(),
                "event" => classify_event(discipline, event),
                "isTeamSport" => team_flag(is_team_entry(team)).to_string(),
                _ => String::new(),
            })
            .collect();
        merged.rows.push(new_row);
    }

    info!(
        added = merged.len() - target.len(),
        dropped,
        unresolved,
        next_result_id = ids.peek(),
        "merged event results"
    );
    Ok(merged)
}
