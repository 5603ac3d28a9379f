// 🧹 Field Normalizer - canonical names, gender, country codes
// Plus the cleaning pass that runs over every raw table before merging

use crate::dates::{self, Endpoint, RowContext};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Tokens that mean "no value" in the source files
pub const EMPTY_TOKENS: [&str; 8] = ["", " ", "null", "NULL", "0", "0.0", "NA", "NaN"];

/// Columns whose literal placeholder tokens are left for the date parser
const ENDPOINT_COLUMNS: [&str; 2] = ["start_date", "end_date"];

const GENDER_COLUMNS: [&str; 2] = ["gender", "sex"];
const CODE_COLUMNS: [&str; 3] = ["noc", "country_code", "country_noc"];
const TITLE_COLUMNS: [&str; 2] = ["city", "country"];
const KEY_NAME_COLUMNS: [&str; 1] = ["name"];
const DISPLAY_NAME_COLUMNS: [&str; 1] = ["athlete"];

pub fn is_empty_token(value: &str) -> bool {
    EMPTY_TOKENS.contains(&value)
}

// ============================================================================
// SEX
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
    Other,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
            Sex::Other => "Other",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a raw gender token; `None` for an empty value
pub fn normalize_gender(raw: &str) -> Option<Sex> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    let sex = match value.to_uppercase().as_str() {
        "M" | "MALE" | "MEN" => Sex::Male,
        "F" | "FEMALE" | "WOMEN" => Sex::Female,
        _ => Sex::Other,
    };
    Some(sex)
}

pub fn normalize_country_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

// ============================================================================
// CASING
// ============================================================================

/// Title case where every letter following a non-letter is upper-cased:
/// `o'brien` → `O'Brien`, `100m freestyle` → `100M Freestyle`
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_is_letter = false;
    for ch in value.chars() {
        if prev_is_letter {
            out.extend(ch.to_lowercase());
        } else {
            out.extend(ch.to_uppercase());
        }
        prev_is_letter = ch.is_alphabetic();
    }
    out
}

fn capitalize_words(part: &str) -> String {
    part.split_whitespace()
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// NAMES
// ============================================================================

/// Name used for identity keys: `"Surname Middle First"`, no punctuation.
///
/// A name already in `"Surname, First Middle"` form yields the same key as
/// the plain `"First Middle Surname"` form.
pub fn key_name(raw: &str) -> String {
    let name = raw.trim();
    if name.is_empty() {
        return String::new();
    }

    if let Some((last, rest)) = name.split_once(',') {
        let given: Vec<&str> = rest.split(',').flat_map(str::split_whitespace).collect();
        let mut parts: Vec<String> = last.split_whitespace().map(title_case).collect();
        if let Some((first, middle)) = given.split_first() {
            parts.extend(middle.iter().map(|m| title_case(m)));
            parts.push(title_case(first));
        }
        return parts.join(" ");
    }

    let tokens: Vec<&str> = name.split_whitespace().collect();
    match tokens.as_slice() {
        [] => String::new(),
        [single] => title_case(single),
        [first, middle @ .., last] => {
            let mut parts = vec![title_case(last)];
            parts.extend(middle.iter().map(|m| title_case(m)));
            parts.push(title_case(first));
            parts.join(" ")
        }
    }
}

/// Key form of a name read back from a bio table, where names are already
/// stored as `"Surname Middle First"`. Only a comma form is reordered.
pub fn stored_key_name(stored: &str) -> String {
    if stored.contains(',') {
        return key_name(stored);
    }
    capitalize_words(stored)
}

/// Name used for display: `"Surname, First Middle"`
pub fn display_name(raw: &str) -> String {
    let name = raw.trim();
    if name.is_empty() {
        return String::new();
    }

    if name.contains(',') {
        let mut parts = name.split(',').map(str::trim);
        let last = capitalize_words(parts.next().unwrap_or(""));
        let first = capitalize_words(parts.next().unwrap_or(""));
        return format!("{}, {}", last, first);
    }

    let tokens: Vec<&str> = name.split_whitespace().collect();
    match tokens.as_slice() {
        [first, middle @ .., last] => {
            let mut out = format!("{}, {}", title_case(last), title_case(first));
            for m in middle {
                out.push(' ');
                out.push_str(&title_case(m));
            }
            out
        }
        _ => title_case(name),
    }
}

/// `"12"`, `"65.5"` - anything that is digits with at most one dot
pub fn is_numeric_literal(value: &str) -> bool {
    let stripped = value.replacen('.', "", 1);
    !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_digit())
}

// ============================================================================
// CLEANING PASS
// ============================================================================

/// Normalize every cell of a raw table according to its column name.
///
/// Date-bearing columns are parsed to `DD-Mon-YYYY`; the row's raw values act
/// as context for range/endpoint columns (edition id, year, competition date).
pub fn clean_table(table: &Table) -> Table {
    if table.is_blank() {
        return table.clone();
    }

    let columns: Vec<String> = table.header.iter().map(|h| h.trim().to_lowercase()).collect();
    let lookup: HashMap<&str, usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i))
        .collect();

    let rows = table
        .rows
        .iter()
        .map(|row| {
            let ctx = RowContext::from_lookup(&lookup, row);
            columns
                .iter()
                .enumerate()
                .map(|(i, col)| {
                    let value = row.get(i).map(|v| v.trim()).unwrap_or("");
                    clean_cell(col, value, &ctx)
                })
                .collect()
        })
        .collect();

    Table {
        header: table.header.clone(),
        rows,
    }
}

fn clean_cell(col: &str, value: &str, ctx: &RowContext<'_>) -> String {
    if is_empty_token(value) && !ENDPOINT_COLUMNS.contains(&col) {
        return String::new();
    }
    if GENDER_COLUMNS.contains(&col) {
        return normalize_gender(value)
            .map(|s| s.as_str().to_string())
            .unwrap_or_default();
    }
    if CODE_COLUMNS.contains(&col) {
        return normalize_country_code(value);
    }
    if KEY_NAME_COLUMNS.contains(&col) {
        return key_name(value);
    }
    if DISPLAY_NAME_COLUMNS.contains(&col) {
        return display_name(value);
    }
    if TITLE_COLUMNS.contains(&col) {
        return title_case(value);
    }
    match col {
        "competition_date" => return dates::parse_competition_range(value, ctx).render(),
        "start_date" => return dates::render(dates::parse_endpoint(value, ctx, Endpoint::Start)),
        "end_date" => return dates::render(dates::parse_endpoint(value, ctx, Endpoint::End)),
        _ => {}
    }
    if col.contains("date") || col.contains("birth") || col.contains("born") {
        return dates::render(dates::parse_date(value));
    }
    if !value.is_empty() && !is_numeric_literal(value) && col != "team" && !col.contains("name") {
        return value.to_lowercase();
    }
    value.to_string()
}

// ============================================================================
// TESTS
// ============================================================================
