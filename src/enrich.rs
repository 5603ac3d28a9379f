// 🧩 Enrichment - runs after the merges, over the merged tables
//
// 1. back-fill: every result row gets an athlete id; athletes seen only in
//    the results get a minimal bio record
// 2. ages: empty `age` cells are computed from birth date and edition dates

use crate::age;
use crate::dates;
use crate::entities::{AthleteRegistry, CountryRegistry, EditionRegistry};
use crate::error::MergeError;
use crate::identity::IdAllocator;
use crate::normalize::{key_name, normalize_country_code, normalize_gender};
use crate::table::{cell, set_cell, Table};
use tracing::{debug, info};

const RESULTS: &str = "results";
const BIO: &str = "athlete bio";

/// Merged tables after the back-fill
#[derive(Debug, Clone, PartialEq)]
pub struct Backfill {
    pub results: Table,
    pub bio: Table,

    /// Result rows linked to an existing athlete by name
    pub linked: usize,

    /// Bio records created for athletes found only in the results
    pub created: usize,
}

/// Give every named result row an athlete id.
///
/// Names resolve through the bio table in key form, which is also the form
/// written to created bio records. An unknown name gets the
/// next bio id and a bio record carrying what the result row knows (name,
/// sex and birth date when present, NOC and the country name for it); later
/// rows with the same name reuse that id.
pub fn backfill_athletes(
    results: &Table,
    bio: &Table,
    countries: &CountryRegistry,
) -> Result<Backfill, MergeError> {
    let required = |table: &Table, name: &'static str, column: &'static str| {
        table
            .column(column)
            .ok_or_else(|| MergeError::missing_column(name, column))
    };
    let id_idx = required(results, RESULTS, "athlete_id")?;
    let athlete_idx = required(results, RESULTS, "athlete")?;
    let noc_idx = required(results, RESULTS, "country_noc")?;
    let bio_id_idx = required(bio, BIO, "athlete_id")?;
    required(bio, BIO, "name")?;
    let sex_idx = results.column("sex");
    let born_idx = results.column("born");

    let mut registry = AthleteRegistry::from_bio_table(bio);
    let mut ids = IdAllocator::after_max(bio.column_values(bio_id_idx));
    let mut out = Backfill {
        results: results.clone(),
        bio: bio.clone(),
        linked: 0,
        created: 0,
    };

    for row in &mut out.results.rows {
        if !cell(row, id_idx).is_empty() {
            continue;
        }
        let name = cell(row, athlete_idx).to_string();
        if name.is_empty() {
            continue;
        }
        if let Some(id) = registry.id_for_name(&name) {
            set_cell(row, id_idx, id);
            out.linked += 1;
            continue;
        }

        let id = ids.allocate().to_string();
        let noc = normalize_country_code(cell(row, noc_idx));
        let sex = sex_idx
            .and_then(|idx| normalize_gender(cell(row, idx)))
            .map(|s| s.as_str().to_string())
            .unwrap_or_default();
        let born = born_idx
            .map(|idx| dates::render(dates::parse_date(cell(row, idx))))
            .unwrap_or_default();

        let bio_row: Vec<String> = bio
            .header
            .iter()
            .map(|column| match column.trim() {
                "athlete_id" => id.clone(),
                "name" => key_name(&name),
                "sex" | "gender" => sex.clone(),
                "born" | "birth_date" | "dob" => born.clone(),
                "country" => countries.name(&noc).unwrap_or("").to_string(),
                "country_noc" | "noc" | "country_code" => noc.clone(),
                _ => String::new(),
            })
            .collect();

        debug!(athlete_id = %id, name = %name, "created bio record from results");
        out.bio.rows.push(bio_row);
        registry.register_name(&name, &id);
        set_cell(row, id_idx, id);
        out.created += 1;
    }

    info!(linked = out.linked, created = out.created, "back-filled athlete ids");
    Ok(out)
}

/// Fill empty `age` cells from the athlete's birth date and the edition's
/// dates. Rows already carrying an age are left alone.
pub fn assign_ages(
    results: &Table,
    athletes: &AthleteRegistry,
    editions: &EditionRegistry,
) -> Result<Table, MergeError> {
    let column = |name: &'static str| {
        results
            .column(name)
            .ok_or_else(|| MergeError::missing_column(RESULTS, name))
    };
    let age_idx = column("age")?;
    let edition_idx = column("edition")?;
    let id_idx = column("athlete_id")?;

    let mut out = results.clone();
    let mut assigned = 0usize;
    for row in &mut out.rows {
        if !cell(row, age_idx).is_empty() {
            continue;
        }
        let birth = athletes.birth_date(cell(row, id_idx));
        let edition = editions.get(cell(row, edition_idx));
        let value = age::compute_age(birth, edition)
            .map(|age| age.to_string())
            .unwrap_or_default();
        if !value.is_empty() {
            assigned += 1;
        }
        set_cell(row, age_idx, value);
    }

    info!(assigned, rows = out.len(), "assigned ages");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::default_known_editions;

    fn results() -> Table {
        Table::with_header(["edition", "athlete", "athlete_id", "country_noc", "medal", "age"])
            .with_row(["2024 Summer Olympics", "Marchand, Léon", "", "FRA", "gold", ""])
            .with_row(["2024 Summer Olympics", "Doe, Jane", "", "USA", "silver", ""])
            .with_row(["2024 Summer Olympics", "Doe, Jane", "", "USA", "bronze", ""])
            .with_row(["2024 Summer Olympics", "", "", "GBR", "gold", ""])
            .with_row(["1896 summer olympics", "Burke, Tom", "64710", "USA", "gold", "21"])
    }

    fn bio() -> Table {
        Table::with_header(["athlete_id", "name", "sex", "born", "country", "country_noc"])
            .with_row(["64710", "Burke Tom", "Male", "15-Jan-1875", "United States", "USA"])
            .with_row(["150000", "Marchand Léon", "Male", "17-May-2002", "France", "FRA"])
    }

    fn countries() -> CountryRegistry {
        CountryRegistry::from_table(&Table::with_header(["noc", "country"]).with_row(["USA", "United States"]))
    }

    #[test]
    fn test_backfill_links_and_creates() {
        let out = backfill_athletes(&results(), &bio(), &countries()).unwrap();

        assert_eq!(out.linked, 2);
        assert_eq!(out.created, 1);
        assert_eq!(out.results.rows[0][2], "150000");
        assert_eq!(out.results.rows[1][2], "150001");
        assert_eq!(out.results.rows[2][2], "150001");
        assert_eq!(out.results.rows[3][2], "");

        assert_eq!(out.bio.len(), 3);
        assert_eq!(
            out.bio.rows[2],
            vec!["150001", "Doe Jane", "", "", "United States", "USA"]
        );

        // created records resolve like any other bio row
        let athletes = AthleteRegistry::from_bio_table(&out.bio);
        assert_eq!(athletes.id_for_name("Doe, Jane"), Some("150001"));
    }

    #[test]
    fn test_backfill_requires_columns() {
        let results = Table::with_header(["athlete", "athlete_id"]);
        assert_eq!(
            backfill_athletes(&results, &bio(), &countries()),
            Err(MergeError::missing_column(RESULTS, "country_noc"))
        );
    }

    #[test]
    fn test_assign_ages() {
        let out = backfill_athletes(&results(), &bio(), &countries()).unwrap();
        let athletes = AthleteRegistry::from_bio_table(&out.bio);
        let editions = EditionRegistry::new().with_known(&default_known_editions());

        let aged = assign_ages(&out.results, &athletes, &editions).unwrap();

        assert_eq!(aged.rows[0][5], "22");
        // no birth date on the created record
        assert_eq!(aged.rows[1][5], "");
        // existing ages are kept
        assert_eq!(aged.rows[4][5], "21");
    }
}
