// ⚠️ Structural merge errors
//
// Data-quality gaps are never errors (they become empty cells). These are the
// cases where a merge step cannot run at all; the pipeline keeps the target
// table unchanged for that step and moves on.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// The table has no header row (missing or empty input file)
    #[error("{table} table has no header row")]
    MissingHeader { table: &'static str },

    /// A column the step cannot work without is absent
    #[error("{table} table has no `{column}` column")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },

    /// None of the known aliases for a required field are present in the incoming table
    #[error("incoming {table} table has no column for `{field}` (tried: {tried})")]
    UnmappedField {
        table: &'static str,
        field: &'static str,
        tried: String,
    },
}

impl MergeError {
    pub fn missing_column(table: &'static str, column: &'static str) -> Self {
        MergeError::MissingColumn { table, column }
    }

    pub fn unmapped(table: &'static str, field: &'static str, aliases: &[&str]) -> Self {
        MergeError::UnmappedField {
            table,
            field,
            tried: aliases.join(", "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MergeError::missing_column("athlete bio", "athlete_id");
        assert_eq!(err.to_string(), "athlete bio table has no `athlete_id` column");

        let err = MergeError::unmapped("medallists", "discipline", &["discipline", "sport"]);
        assert_eq!(
            err.to_string(),
            "incoming medallists table has no column for `discipline` (tried: discipline, sport)"
        );
    }
}
