// 🏟️ Games merge - one row per edition, known editions carry fixed dates

use crate::dates;
use crate::entities::KnownEdition;
use crate::error::MergeError;
use crate::normalize::title_case;
use crate::table::{cell, set_cell, Table};
use std::collections::HashSet;
use tracing::{debug, info};

const TABLE: &str = "games";

/// Apply the known-edition overrides to a cleaned games table.
///
/// Rows are de-duplicated by lower-cased edition (first wins). Known editions
/// get their start, end and range overwritten; those missing from the table
/// are appended.
pub fn merge_games(games: &Table, known: &[KnownEdition]) -> Result<Table, MergeError> {
    if games.is_blank() {
        return Err(MergeError::MissingHeader { table: TABLE });
    }
    let column = |name: &'static str| {
        games
            .column(name)
            .ok_or_else(|| MergeError::missing_column(TABLE, name))
    };
    let edition_idx = column("edition")?;
    let start_idx = column("start_date")?;
    let end_idx = column("end_date")?;
    let range_idx = column("competition_date")?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(games.len() + known.len());
    for row in &games.rows {
        let edition = cell(row, edition_idx).to_lowercase();
        if !edition.is_empty() && !seen.insert(edition.clone()) {
            debug!(edition = %edition, "dropping duplicate edition row");
            continue;
        }
        rows.push(row.clone());
    }

    for edition in known {
        let key = edition.key();
        let span = edition.dates();
        let start = dates::format_date(span.start);
        let end = dates::format_date(span.end);
        let range = span.range();

        let position = rows
            .iter()
            .position(|row| cell(row, edition_idx).to_lowercase() == key);
        let position = match position {
            Some(position) => position,
            None => {
                debug!(edition = %edition.name, "appending known edition");
                let mut row = vec![String::new(); games.header.len()];
                row[edition_idx] = title_case(&edition.name);
                rows.push(row);
                rows.len() - 1
            }
        };
        let row = &mut rows[position];
        set_cell(row, start_idx, start);
        set_cell(row, end_idx, end);
        set_cell(row, range_idx, range);
    }

    info!(before = games.len(), after = rows.len(), "merged games");
    Ok(Table {
        header: games.header.clone(),
        rows,
    })
}
