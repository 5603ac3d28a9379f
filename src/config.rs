// ⚙️ Pipeline configuration
//
// Defaults reproduce the standard Paris 2024 run. A JSON file can override
// any subset of fields:
//
// {
//   "incoming_dir": "milano",
//   "new_edition": { "name": "2026 Winter Olympics", "id": "64" }
// }

use crate::entities::{default_known_editions, KnownEdition, NewEdition};
use crate::merge::ResultMergeOptions;
use crate::merge::results::DEFAULT_RESULT_ID_FLOOR;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Base dataset file names, relative to the data directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseFiles {
    pub bio: String,
    pub results: String,
    pub games: String,
    pub countries: String,
}

impl Default for BaseFiles {
    fn default() -> Self {
        BaseFiles {
            bio: "olympic_athlete_bio.csv".to_string(),
            results: "olympic_athlete_event_results.csv".to_string(),
            games: "olympics_games.csv".to_string(),
            countries: "olympics_country.csv".to_string(),
        }
    }
}

/// Incoming edition file names, relative to the incoming directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncomingFiles {
    pub athletes: String,
    pub medallists: String,
    pub nocs: String,
}

impl Default for IncomingFiles {
    fn default() -> Self {
        IncomingFiles {
            athletes: "athletes.csv".to_string(),
            medallists: "medallists.csv".to_string(),
            nocs: "nocs.csv".to_string(),
        }
    }
}

/// Output file names, relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputFiles {
    pub bio: String,
    pub results: String,
    pub games: String,
    pub countries: String,
    pub tally: String,
}

impl Default for OutputFiles {
    fn default() -> Self {
        OutputFiles {
            bio: "new_olympic_athlete_bio.csv".to_string(),
            results: "new_olympic_athlete_event_results.csv".to_string(),
            games: "new_olympics_games.csv".to_string(),
            countries: "new_olympics_country.csv".to_string(),
            tally: "new_medal_tally.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub base: BaseFiles,

    /// Sub-directory of the data directory holding the incoming edition
    pub incoming_dir: String,

    pub incoming: IncomingFiles,
    pub outputs: OutputFiles,

    /// Label and id stamped on incoming result rows
    pub new_edition: NewEdition,

    /// New result ids start above this
    pub result_id_floor: u64,

    /// Editions whose dates override the games table
    pub known_editions: Vec<KnownEdition>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            base: BaseFiles::default(),
            incoming_dir: "paris".to_string(),
            incoming: IncomingFiles::default(),
            outputs: OutputFiles::default(),
            new_edition: NewEdition::default(),
            result_id_floor: DEFAULT_RESULT_ID_FLOOR,
            known_editions: default_known_editions(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file; missing fields keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize config")
    }

    pub fn result_options(&self) -> ResultMergeOptions {
        ResultMergeOptions {
            edition: self.new_edition.clone(),
            result_id_floor: self.result_id_floor,
        }
    }
}
