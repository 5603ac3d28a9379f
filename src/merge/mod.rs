// 🔀 Table Merger - folds an incoming table into a target table
//
// Every merge is a pure `(incoming, target) -> Result<Table, MergeError>`:
// the target is never mutated in place, so a failed step leaves the caller
// holding the unchanged original.
//
// Incoming files name their columns differently from the target
// ("gender" vs "sex", "birth_date" vs "born"). Each target field carries an
// ordered alias list; the first alias with a non-empty value wins.

pub mod bio;
pub mod countries;
pub mod games;
pub mod results;

pub use bio::merge_bio;
pub use countries::merge_countries;
pub use games::merge_games;
pub use results::{merge_results, ResultMergeOptions};

use crate::table::{cell, Table};

/// Values an alias lookup treats as absent
const MISSING_VALUES: [&str; 3] = ["", "nan", "null"];

/// Columns of `table` matching each alias, in alias order
pub(crate) fn alias_columns(table: &Table, aliases: &[&str]) -> Vec<usize> {
    aliases.iter().filter_map(|alias| table.column_ci(alias)).collect()
}

/// First usable value among the given columns of a row
pub(crate) fn first_value<'a>(row: &'a [String], columns: &[usize]) -> Option<&'a str> {
    columns
        .iter()
        .map(|&idx| cell(row, idx))
        .find(|value| !MISSING_VALUES.contains(&value.to_lowercase().as_str()))
}
