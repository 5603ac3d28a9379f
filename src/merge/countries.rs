// 🌍 Country merge - NOC → name table, one row per NOC, sorted by name

use crate::entities::country::{NOC_ALIASES, SOURCE_COUNTRY_ALIASES, TARGET_COUNTRY_ALIASES};
use crate::error::MergeError;
use crate::normalize::{normalize_country_code, title_case};
use crate::table::{cell, Table};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

const TABLE: &str = "country";

/// Merge incoming NOCs into the country table.
///
/// Unseen NOCs are appended with a title-cased name. Duplicate NOCs keep the
/// longest name that is not just the code. Output is sorted by name,
/// case-insensitively; merging the result again changes nothing.
pub fn merge_countries(incoming: &Table, target: &Table) -> Result<Table, MergeError> {
    if target.is_blank() {
        return Err(MergeError::MissingHeader { table: TABLE });
    }
    let noc_idx = target
        .find_column(&NOC_ALIASES)
        .ok_or_else(|| MergeError::missing_column(TABLE, "noc"))?;
    let name_idx = target
        .find_column(&TARGET_COUNTRY_ALIASES)
        .ok_or_else(|| MergeError::missing_column(TABLE, "country"))?;

    let mut entries: Vec<(String, String)> = target
        .rows
        .iter()
        .map(|row| (normalize_country_code(cell(row, noc_idx)), cell(row, name_idx).to_string()))
        .filter(|(noc, _)| !noc.is_empty())
        .collect();

    let source_columns = (
        incoming.find_column(&NOC_ALIASES),
        incoming.find_column(&SOURCE_COUNTRY_ALIASES),
    );
    if let (Some(src_noc), Some(src_name)) = source_columns {
        let mut seen: HashSet<String> = entries.iter().map(|(noc, _)| noc.clone()).collect();
        for row in &incoming.rows {
            let noc = normalize_country_code(cell(row, src_noc));
            if noc.is_empty() || seen.contains(&noc) {
                continue;
            }
            debug!(noc = %noc, "new country");
            entries.push((noc.clone(), title_case(cell(row, src_name))));
            seen.insert(noc);
        }
    } else if !incoming.is_blank() {
        debug!("incoming country table has no usable noc/country columns");
    }

    let mut deduped: Vec<(String, String)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for (noc, name) in entries {
        match positions.get(&noc) {
            None => {
                positions.insert(noc.clone(), deduped.len());
                deduped.push((noc, name));
            }
            Some(&pos) => {
                let current = &deduped[pos].1;
                if is_better_name(&name, current, &noc) {
                    deduped[pos].1 = name;
                }
            }
        }
    }

    deduped.sort_by_key(|(_, name)| name.to_lowercase());

    let width = target.header.len();
    let rows = deduped
        .into_iter()
        .map(|(noc, name)| {
            let mut row = vec![String::new(); width];
            row[noc_idx] = noc;
            row[name_idx] = name;
            row
        })
        .collect::<Vec<_>>();

    info!(before = target.len(), after = rows.len(), "merged countries");
    Ok(Table {
        header: target.header.clone(),
        rows,
    })
}

/// A longer name wins unless it is just the code
fn is_better_name(candidate: &str, current: &str, noc: &str) -> bool {
    !candidate.eq_ignore_ascii_case(noc) && candidate.chars().count() > current.chars().count()
}
