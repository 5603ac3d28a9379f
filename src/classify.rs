// 🏷️ Event/Medal Classifier
// Turns free-text discipline/event/medal fields into normalized labels
//
// "Swimming" + "Men's 100m Freestyle" → "Swimming, 100M Freestyle, Men"

use crate::normalize::title_case;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Gender suffixes, checked in order before the prefixes
const GENDER_SUFFIXES: [(&str, &str); 10] = [
    (" men's team", "Men"),
    (" women's team", "Women"),
    (" mixed team", "Mixed"),
    (" men's", "Men"),
    (" women's", "Women"),
    (" men", "Men"),
    (" women", "Women"),
    (" mixed", "Mixed"),
    (" male", "Men"),
    (" female", "Women"),
];

const GENDER_PREFIXES: [(&str, &str); 5] = [
    ("men's ", "Men"),
    ("women's ", "Women"),
    ("mixed ", "Mixed"),
    ("men ", "Men"),
    ("women ", "Women"),
];

/// Disciplines whose event names carry a leading qualifier worth splitting out
const STAGED_DISCIPLINES: [&str; 2] = ["cycling", "cycling road"];

/// Team-cell values that mean "not a team"
const NON_TEAM_TOKENS: [&str; 3] = ["NAN", "NULL", "NONE"];

// ============================================================================
// MEDALS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

impl Medal {
    /// Case-insensitive substring match: "Gold Medal" → Gold
    pub fn from_text(text: &str) -> Option<Medal> {
        let lower = text.to_lowercase();
        if lower.contains("gold") {
            Some(Medal::Gold)
        } else if lower.contains("silver") {
            Some(Medal::Silver)
        } else if lower.contains("bronze") {
            Some(Medal::Bronze)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Medal::Gold => "gold",
            Medal::Silver => "silver",
            Medal::Bronze => "bronze",
        }
    }

    /// Finishing position implied by the medal
    pub fn position(&self) -> u8 {
        match self {
            Medal::Gold => 1,
            Medal::Silver => 2,
            Medal::Bronze => 3,
        }
    }
}

impl fmt::Display for Medal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `true` / `1` (any case) marks a medallist row
pub fn is_medallist_flag(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "true" | "1")
}

/// Medal awarded on a result row; only medallist rows carry one
pub fn medal_for(medal_text: &str, is_medallist: bool) -> Option<Medal> {
    if !is_medallist {
        return None;
    }
    Medal::from_text(medal_text.trim())
}

/// A team cell marks a team event when it holds a real value
pub fn is_team_entry(team: Option<&str>) -> bool {
    match team.map(|t| t.trim().to_uppercase()) {
        Some(value) => !value.is_empty() && !NON_TEAM_TOKENS.contains(&value.as_str()),
        None => false,
    }
}

// ============================================================================
// EVENT LABELS
// ============================================================================

fn strip_prefix_ci<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    if head.to_lowercase() == prefix.to_lowercase() {
        value.get(prefix.len()..)
    } else {
        None
    }
}

fn strip_suffix_ci<'a>(value: &'a str, suffix: &str) -> Option<&'a str> {
    let cut = value.len().checked_sub(suffix.len())?;
    let tail = value.get(cut..)?;
    if tail.to_lowercase() == suffix {
        value.get(..cut)
    } else {
        None
    }
}

/// Map a bare gender word to its label
fn gender_word(value: &str) -> Option<&'static str> {
    match value.to_lowercase().as_str() {
        "men" | "male" => Some("Men"),
        "women" | "female" => Some("Women"),
        "mixed" => Some("Mixed"),
        _ => None,
    }
}

/// Split a gender marker off the event text: suffixes first, then prefixes
fn split_gender(event: &str) -> (&str, Option<&'static str>) {
    for (pattern, gender) in GENDER_SUFFIXES {
        if let Some(rest) = strip_suffix_ci(event, pattern) {
            return (rest.trim(), Some(gender));
        }
    }
    for (pattern, gender) in GENDER_PREFIXES {
        if let Some(rest) = strip_prefix_ci(event, pattern) {
            return (rest.trim(), Some(gender));
        }
    }
    (event, None)
}

/// Build the normalized event label `Discipline, Event[, Team], Gender`,
/// omitting empty segments.
pub fn classify_event(discipline: &str, event: &str) -> String {
    let discipline = discipline.trim();
    let event = event.trim();
    let discipline_label = title_case(discipline);

    if event.is_empty() {
        return discipline_label;
    }

    if let Some(gender) = gender_word(event) {
        return join_segments(&[discipline_label.as_str(), gender]);
    }

    let event = if discipline.is_empty() {
        event
    } else {
        strip_prefix_ci(event, discipline).map(str::trim).unwrap_or(event)
    };

    let (residual, gender) = split_gender(event);
    let gender = gender.unwrap_or("");
    let mut label = title_case(residual);

    if label.to_lowercase().contains("team") {
        label = label.replace(" Team", "").trim().to_string();
        return join_segments(&[discipline_label.as_str(), label.as_str(), "Team", gender]);
    }

    if STAGED_DISCIPLINES.contains(&discipline.to_lowercase().as_str()) {
        if let Some((first, rest)) = label.split_once(' ') {
            label = format!("{}, {}", first, rest.trim());
        }
    }

    join_segments(&[discipline_label.as_str(), label.as_str(), gender])
}

fn join_segments(segments: &[&str]) -> String {
    segments
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_prefix() {
        assert_eq!(
            classify_event("Swimming", "Men's 100m Freestyle"),
            "Swimming, 100M Freestyle, Men"
        );
        assert_eq!(
            classify_event("swimming", "women 200m backstroke"),
            "Swimming, 200M Backstroke, Women"
        );
    }

    #[test]
    fn test_gender_only_event() {
        assert_eq!(classify_event("Athletics", "Women"), "Athletics, Women");
        assert_eq!(classify_event("judo", "male"), "Judo, Men");
        assert_eq!(classify_event("Sailing", "Mixed"), "Sailing, Mixed");
    }

    #[test]
    fn test_empty_event_is_discipline() {
        assert_eq!(classify_event("beach volleyball", ""), "Beach Volleyball");
    }

    #[test]
    fn test_gender_suffix_and_discipline_prefix() {
        assert_eq!(
            classify_event("Rowing", "Rowing Single Sculls Women"),
            "Rowing, Single Sculls, Women"
        );
        assert_eq!(classify_event("Boxing", "Flyweight men's"), "Boxing, Flyweight, Men");
    }

    #[test]
    fn test_team_events() {
        // the suffix carries the team marker away with the gender
        assert_eq!(classify_event("Fencing", "Sabre Men's Team"), "Fencing, Sabre, Men");
        assert_eq!(
            classify_event("Archery", "Recurve Team Mixed"),
            "Archery, Recurve, Team, Mixed"
        );
        assert_eq!(
            classify_event("Gymnastics", "artistic team all-around"),
            "Gymnastics, Artistic All-Around, Team"
        );
    }

    #[test]
    fn test_cycling_splits_qualifier() {
        assert_eq!(
            classify_event("Cycling Road", "Road Race Men"),
            "Cycling Road, Road, Race, Men"
        );
        assert_eq!(classify_event("Cycling", "Sprint"), "Cycling, Sprint");
    }

    #[test]
    fn test_event_without_gender_keeps_event() {
        assert_eq!(classify_event("Equestrian", "Dressage Individual"), "Equestrian, Dressage Individual");
    }

    #[test]
    fn test_medal_mapping() {
        assert_eq!(medal_for("Gold Medal", true), Some(Medal::Gold));
        assert_eq!(medal_for("SILVER", true), Some(Medal::Silver));
        assert_eq!(medal_for("bronze medal", false), None);
        assert_eq!(medal_for("", true), None);
        assert_eq!(Medal::Bronze.position(), 3);
        assert_eq!(Medal::Gold.to_string(), "gold");
    }

    #[test]
    fn test_flags() {
        assert!(is_medallist_flag("True"));
        assert!(is_medallist_flag("1"));
        assert!(!is_medallist_flag("false"));
        assert!(!is_medallist_flag(""));

        assert!(is_team_entry(Some("France")));
        assert!(!is_team_entry(Some("nan")));
        assert!(!is_team_entry(Some("  ")));
        assert!(!is_team_entry(None));
    }
}
