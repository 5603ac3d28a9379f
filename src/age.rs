// 🎂 Age Calculator - competitor age at the start of an edition

use crate::entities::EditionDates;
use chrono::{Datelike, NaiveDate};

/// Ages above this are treated as a two-digit-year century misparse
const AGE_CENTURY_CUTOFF: i32 = 100;

/// Age at the edition's start year, counting a birthday only if it falls on
/// or before the edition's last day.
///
/// Feb 29 birthdays use Feb 28 in non-leap years. Negative ages are unknown.
pub fn age_at(birth: NaiveDate, edition: EditionDates) -> Option<u32> {
    let start_year = edition.start.year();
    let anniversary = birth
        .with_year(start_year)
        .or_else(|| NaiveDate::from_ymd_opt(start_year, birth.month(), 28))?;

    let mut age = start_year - birth.year();
    if anniversary > edition.end {
        age -= 1;
    }
    if age > AGE_CENTURY_CUTOFF {
        age -= AGE_CENTURY_CUTOFF;
    }

    u32::try_from(age).ok()
}

/// `age_at` over possibly-missing inputs
pub fn compute_age(birth: Option<NaiveDate>, edition: Option<EditionDates>) -> Option<u32> {
    age_at(birth?, edition?)
}
