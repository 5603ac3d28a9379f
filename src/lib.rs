// Olympic Merge - Core Library
// Exposes the merge pipeline for the CLI and tests

pub mod table;
pub mod error;
pub mod normalize;
pub mod dates;
pub mod identity;
pub mod classify;
pub mod age;
pub mod entities;
pub mod merge;
pub mod enrich;
pub mod tally;
pub mod config;
pub mod pipeline;

// Re-export commonly used types
pub use table::{load_csv, load_csv_or_empty, write_csv, Table};
pub use error::MergeError;
pub use normalize::{
    clean_table, display_name, key_name, normalize_country_code, normalize_gender, stored_key_name,
    title_case, Sex,
};
pub use dates::{
    parse_competition_range, parse_date, parse_endpoint, CompetitionRange, Endpoint, RowContext,
};
pub use identity::{IdAllocator, IdentityIndex, IdentityKey};
pub use classify::{classify_event, Medal};
pub use age::{age_at, compute_age};
pub use entities::{
    AthleteRegistry, CountryRegistry, EditionDates, EditionRegistry, KnownEdition, NewEdition,
};
pub use merge::{merge_bio, merge_countries, merge_games, merge_results, ResultMergeOptions};
pub use enrich::{assign_ages, backfill_athletes, Backfill};
pub use tally::{medal_tally, tally_table, MedalTallyEntry, TALLY_HEADER};
pub use config::PipelineConfig;
pub use pipeline::{run_stages, Inputs, Outputs, Pipeline, RunSummary, StageStatus, StageSummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
