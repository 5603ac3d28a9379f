// 🧑 Bio merge - append incoming athletes that are not already known
//
// Match on identity key (name, birth date, NOC). A new key gets the next
// surrogate id; a known key is skipped. Nothing already in the target is
// rewritten.
//
// Incoming rows are read raw: every copied field is normalized here, and the
// name is stored in key form ("Surname Middle First").

use super::{alias_columns, first_value};
use crate::dates;
use crate::error::MergeError;
use crate::identity::{IdAllocator, IdentityIndex, IdentityKey};
use crate::normalize::{is_empty_token, key_name, normalize_country_code, normalize_gender, title_case};
use crate::table::Table;
use tracing::{debug, info};

const TABLE: &str = "athlete bio";

pub const NAME_ALIASES: [&str; 3] = ["name", "full_name", "name_short"];
pub const SEX_ALIASES: [&str; 2] = ["sex", "gender"];
pub const BORN_ALIASES: [&str; 3] = ["born", "birth_date", "dob"];
pub const HEIGHT_ALIASES: [&str; 1] = ["height"];
pub const WEIGHT_ALIASES: [&str; 1] = ["weight"];
pub const COUNTRY_ALIASES: [&str; 6] = [
    "country",
    "nationality",
    "birth_country",
    "residence_country",
    "country_long",
    "nationality_long",
];
pub const NOC_ALIASES: [&str; 3] = ["country_noc", "country_code", "nationality_code"];

/// Target bio field → incoming aliases, first non-empty wins
const FIELD_ALIASES: [(&str, &[&str]); 7] = [
    ("name", &NAME_ALIASES),
    ("sex", &SEX_ALIASES),
    ("born", &BORN_ALIASES),
    ("height", &HEIGHT_ALIASES),
    ("weight", &WEIGHT_ALIASES),
    ("country", &COUNTRY_ALIASES),
    ("country_noc", &NOC_ALIASES),
];

/// How a target column is filled for a new athlete
enum Fill {
    Id,
    Field(&'static str, Vec<usize>),
    Blank,
}

/// Merge incoming athlete bios into the target bio table.
///
/// The target needs an `athlete_id` column; it may have no rows.
pub fn merge_bio(incoming: &Table, target: &Table) -> Result<Table, MergeError> {
    if target.is_blank() {
        return Err(MergeError::MissingHeader { table: TABLE });
    }
    let id_idx = target
        .column("athlete_id")
        .ok_or_else(|| MergeError::missing_column(TABLE, "athlete_id"))?;

    let mut merged = target.clone();
    if incoming.is_blank() {
        debug!("no incoming bio rows");
        return Ok(merged);
    }

    let name_cols = alias_columns(incoming, &NAME_ALIASES);
    let born_cols = alias_columns(incoming, &BORN_ALIASES);
    let noc_cols = alias_columns(incoming, &NOC_ALIASES);

    let fills: Vec<Fill> = target
        .header
        .iter()
        .map(|column| {
            let column = column.trim();
            if column == "athlete_id" {
                return Fill::Id;
            }
            FIELD_ALIASES
                .iter()
                .find(|(field, _)| *field == column)
                .map(|&(field, aliases)| Fill::Field(field, alias_columns(incoming, aliases)))
                .unwrap_or(Fill::Blank)
        })
        .collect();

    let mut index = IdentityIndex::from_bio_table(target);
    let mut ids = IdAllocator::after_max(target.column_values(id_idx));
    let mut skipped_unnamed = 0usize;
    let mut skipped_known = 0usize;

    for row in &incoming.rows {
        let Some(name) = first_value(row, &name_cols) else {
            skipped_unnamed += 1;
            continue;
        };
        let born = first_value(row, &born_cols).unwrap_or("");
        let noc = first_value(row, &noc_cols).unwrap_or("");

        let key = IdentityKey::new(name, born, noc);
        if index.contains(&key) {
            skipped_known += 1;
            continue;
        }

        let new_row: Vec<String> = fills
            .iter()
            .map(|fill| match fill {
                Fill::Id => ids.allocate().to_string(),
                Fill::Field(field, columns) => first_value(row, columns)
                    .map(|value| normalize_field(field, value))
                    .unwrap_or_default(),
                Fill::Blank => String::new(),
            })
            .collect();

        merged.rows.push(new_row);
        index.insert(key);
    }

    info!(
        added = merged.len() - target.len(),
        known = skipped_known,
        unnamed = skipped_unnamed,
        "merged athlete bios"
    );
    Ok(merged)
}

fn normalize_field(field: &str, value: &str) -> String {
    if is_empty_token(value) {
        return String::new();
    }
    match field {
        "name" => key_name(value),
        "sex" => normalize_gender(value)
            .map(|sex| sex.as_str().to_string())
            .unwrap_or_default(),
        "born" => dates::render(dates::parse_date(value)),
        "country_noc" => normalize_country_code(value),
        "country" => title_case(value),
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn empty_target() -> Table {
        Table::with_header(["athlete_id", "name", "sex", "born", "country", "country_noc"])
    }

    #[test]
    fn test_single_row_into_empty_target() {
        let incoming = Table::with_header(["name", "born", "country_code"])
            .with_row(["jane q public", "1995-05-10", "usa"]);

        let merged = merge_bio(&incoming, &empty_target()).unwrap();

        assert_eq!(merged.len(), 1);
        assert_eq!(
            merged.rows[0],
            vec!["1", "Public Q Jane", "", "10-May-1995", "", "USA"]
        );
    }

    #[test]
    fn test_aliases_fill_fields() {
        let incoming = Table::with_header([
            "code", "name", "gender", "birth_date", "country_long", "nationality_code",
        ])
        .with_row(["1532872", "Usain Bolt", "M", "21 August 1986", "jamaica", "jam"]);

        let merged = merge_bio(&incoming, &empty_target()).unwrap();
        assert_eq!(
            merged.rows[0],
            vec!["1", "Bolt Usain", "Male", "21-Aug-1986", "Jamaica", "JAM"]
        );
    }

    #[test]
    fn test_known_athlete_is_skipped() {
        let target = empty_target().with_row(["41", "Bolt Usain", "Male", "21-Aug-1986", "Jamaica", "JAM"]);
        let incoming = Table::with_header(["name", "birth_date", "country_code"])
            .with_row(["usain bolt", "1986-08-21", "JAM"])
            .with_row(["usain bolt", "1990-01-01", "JAM"]);

        let merged = merge_bio(&incoming, &target).unwrap();

        assert_eq!(merged.len(), 2);
        assert_eq!(merged.rows[0], target.rows[0]);
        assert_eq!(merged.rows[1][0], "42");
        assert_eq!(merged.rows[1][3], "01-Jan-1990");
    }

    #[test]
    fn test_intra_batch_duplicates_and_unnamed_rows() {
        let incoming = Table::with_header(["name", "birth_date", "country_code"])
            .with_row(["Ana Silva", "2001-03-04", "BRA"])
            .with_row(["ana silva", "04/03/2001", "bra"])
            .with_row(["", "2001-03-04", "BRA"])
            .with_row(["nan", "2001-03-04", "BRA"])
            .with_row(["Ana Silva", "2001-03-04", "POR"]);

        let merged = merge_bio(&incoming, &empty_target()).unwrap();

        assert_eq!(merged.len(), 2);
        let keys: HashSet<IdentityKey> = merged
            .rows
            .iter()
            .map(|r| IdentityKey::from_stored(&r[1], &r[3], &r[5]))
            .collect();
        assert_eq!(keys.len(), merged.len());
    }

    #[test]
    fn test_ids_increase_above_prior_max() {
        let target = empty_target()
            .with_row(["7", "A B", "", "", "", "FRA"])
            .with_row(["93", "C D", "", "", "", "FRA"]);
        let incoming = Table::with_header(["name", "country_code"])
            .with_row(["Eve One", "GBR"])
            .with_row(["Finn Two", "GBR"])
            .with_row(["Gil Three", "GBR"]);

        let merged = merge_bio(&incoming, &target).unwrap();
        let new_ids: Vec<u64> = merged.rows[2..].iter().map(|r| r[0].parse().unwrap()).collect();
        assert_eq!(new_ids, vec![94, 95, 96]);
    }

    #[test]
    fn test_names_stored_in_key_form() {
        let target = Table::with_header(["athlete_id", "name", "height", "country_noc"]);
        let incoming = Table::with_header(["name", "height", "country_code"])
            .with_row(["léon marchand", "NA", "fra"])
            .with_row(["Smith, John", "185", "gbr"]);

        let merged = merge_bio(&incoming, &target).unwrap();
        assert_eq!(merged.rows[0], vec!["1", "Marchand Léon", "", "FRA"]);
        assert_eq!(merged.rows[1], vec!["2", "Smith John", "185", "GBR"]);

        // a second batch with the same people matches the stored key-form names
        let again = merge_bio(&incoming, &merged).unwrap();
        assert_eq!(again, merged);
    }

    #[test]
    fn test_structural_errors() {
        let incoming = Table::with_header(["name"]).with_row(["Ana Silva"]);

        let no_id = Table::with_header(["name", "born"]);
        assert_eq!(
            merge_bio(&incoming, &no_id),
            Err(MergeError::missing_column(TABLE, "athlete_id"))
        );
        assert_eq!(
            merge_bio(&incoming, &Table::default()),
            Err(MergeError::MissingHeader { table: TABLE })
        );
    }

    #[test]
    fn test_blank_incoming_keeps_target() {
        let target = empty_target().with_row(["1", "A B", "", "", "", ""]);
        assert_eq!(merge_bio(&Table::default(), &target).unwrap(), target);
    }
}
