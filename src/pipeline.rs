// 🚀 Pipeline - load, clean, merge, enrich, tally, write
//
// Stage order is fixed by data dependencies:
//   bio → games → countries → results → back-fill → ages → tally
// Every stage receives the tables it needs as parameters; nothing is re-read
// from disk between stages.
//
// A structural error in one stage (`MergeError`) is logged and that stage's
// target table passes through unchanged. I/O failures abort the run.
//
// Incoming athletes and medallists go to their merges uncleaned: those merges
// normalize every field they read, and key-form name reordering must run
// exactly once.

use crate::config::PipelineConfig;
use crate::enrich::{assign_ages, backfill_athletes};
use crate::entities::{AthleteRegistry, CountryRegistry, EditionRegistry};
use crate::error::MergeError;
use crate::merge::{merge_bio, merge_countries, merge_games, merge_results};
use crate::normalize::clean_table;
use crate::table::{load_csv_or_empty, write_csv, Table};
use crate::tally::{medal_tally, tally_table, TALLY_HEADER};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

// ============================================================================
// TABLE SETS
// ============================================================================

/// Raw input tables, exactly as loaded
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    pub bio: Table,
    pub results: Table,
    pub games: Table,
    pub countries: Table,
    pub athletes: Table,
    pub medallists: Table,
    pub nocs: Table,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outputs {
    pub bio: Table,
    pub results: Table,
    pub games: Table,
    pub countries: Table,
    pub tally: Table,
}

// ============================================================================
// SUMMARY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum StageStatus {
    Merged,
    /// Structural error; the stage's target table was kept as-is
    Kept { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSummary {
    pub stage: String,
    pub rows: usize,
    #[serde(flatten)]
    pub status: StageStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub rows: usize,
    pub sha256: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub stages: Vec<StageSummary>,
    pub files: Vec<WrittenFile>,
}

impl RunSummary {
    /// Stages that kept their target because of a structural error
    pub fn kept_stages(&self) -> impl Iterator<Item = &StageSummary> {
        self.stages
            .iter()
            .filter(|s| matches!(s.status, StageStatus::Kept { .. }))
    }
}

/// Collects per-stage outcomes while the stages run
#[derive(Debug, Default)]
struct StageLog {
    stages: Vec<StageSummary>,
}

impl StageLog {
    /// Take a stage's output, or the fallback table when it failed
    fn settle(&mut self, stage: &str, result: Result<Table, MergeError>, fallback: &Table) -> Table {
        let (table, status) = match result {
            Ok(table) => (table, StageStatus::Merged),
            Err(e) => {
                warn!(stage, error = %e, "stage failed, keeping target unchanged");
                (fallback.clone(), StageStatus::Kept { error: e.to_string() })
            }
        };
        info!(stage, rows = table.len(), "stage done");
        self.record(stage, table.len(), status);
        table
    }

    fn record(&mut self, stage: &str, rows: usize, status: StageStatus) {
        self.stages.push(StageSummary {
            stage: stage.to_string(),
            rows,
            status,
        });
    }
}

// ============================================================================
// STAGES
// ============================================================================

/// Run every stage over in-memory tables
pub fn run_stages(inputs: &Inputs, config: &PipelineConfig) -> (Outputs, Vec<StageSummary>) {
    let mut log = StageLog::default();

    let base_bio = clean_table(&inputs.bio);
    let base_games = clean_table(&inputs.games);
    let base_countries = clean_table(&inputs.countries);
    let nocs = clean_table(&inputs.nocs);

    let mut base_results = inputs.results.clone();
    if !base_results.is_blank() {
        base_results.ensure_column("age");
    }
    let base_results = clean_table(&base_results);

    // 1. bio
    let bio = log.settle("bio", merge_bio(&inputs.athletes, &base_bio), &base_bio);

    // 2. games
    let games = log.settle(
        "games",
        merge_games(&base_games, &config.known_editions),
        &base_games,
    );

    // 3. countries
    let countries = log.settle(
        "countries",
        merge_countries(&nocs, &base_countries),
        &base_countries,
    );
    let country_registry = CountryRegistry::from_table(&countries);

    // 4. results
    let results = log.settle(
        "results",
        merge_results(
            &inputs.medallists,
            &base_results,
            &AthleteRegistry::from_bio_table(&bio),
            &config.result_options(),
        ),
        &base_results,
    );

    // 5. back-fill athlete ids, extending the bio table
    let (results, bio) = match backfill_athletes(&results, &bio, &country_registry) {
        Ok(backfill) => {
            log.record("backfill", backfill.created, StageStatus::Merged);
            (backfill.results, backfill.bio)
        }
        Err(e) => {
            warn!(stage = "backfill", error = %e, "stage failed, keeping target unchanged");
            log.record("backfill", 0, StageStatus::Kept { error: e.to_string() });
            (results, bio)
        }
    };
    let athlete_registry = AthleteRegistry::from_bio_table(&bio);

    // 6. ages, known editions resolve even when the games stage was kept
    let editions = EditionRegistry::from_games_table(&games).with_known(&config.known_editions);
    let results = log.settle(
        "ages",
        assign_ages(&results, &athlete_registry, &editions),
        &results,
    );

    // 7. tally
    let tally = match medal_tally(&results, &athlete_registry, &country_registry) {
        Ok(entries) => {
            log.record("tally", entries.len(), StageStatus::Merged);
            tally_table(&entries)
        }
        Err(e) => {
            warn!(stage = "tally", error = %e, "stage failed, writing an empty tally");
            log.record("tally", 0, StageStatus::Kept { error: e.to_string() });
            Table::with_header(TALLY_HEADER)
        }
    };

    let outputs = Outputs {
        bio,
        results,
        games,
        countries,
        tally,
    };
    (outputs, log.stages)
}

// ============================================================================
// PIPELINE
// ============================================================================

/// File-level driver around `run_stages`
#[derive(Debug, Clone)]
pub struct Pipeline {
    data_dir: PathBuf,
    incoming_dir: PathBuf,
    out_dir: PathBuf,
    config: PipelineConfig,
}

impl Pipeline {
    /// Read from and write to `data_dir`; incoming files come from
    /// `data_dir/<config.incoming_dir>`
    pub fn new(data_dir: impl Into<PathBuf>, config: PipelineConfig) -> Self {
        let data_dir = data_dir.into();
        Pipeline {
            incoming_dir: data_dir.join(&config.incoming_dir),
            out_dir: data_dir.clone(),
            data_dir,
            config,
        }
    }

    pub fn with_incoming_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.incoming_dir = dir.into();
        self
    }

    pub fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = dir.into();
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load every input; missing files become empty tables
    pub fn load(&self) -> Result<Inputs> {
        let base = &self.config.base;
        let incoming = &self.config.incoming;
        let from_data = |name: &str| load_csv_or_empty(&self.data_dir.join(name));
        let from_incoming = |name: &str| load_csv_or_empty(&self.incoming_dir.join(name));

        Ok(Inputs {
            bio: from_data(&base.bio)?,
            results: from_data(&base.results)?,
            games: from_data(&base.games)?,
            countries: from_data(&base.countries)?,
            athletes: from_incoming(&incoming.athletes)?,
            medallists: from_incoming(&incoming.medallists)?,
            nocs: from_incoming(&incoming.nocs)?,
        })
    }

    /// Write all output tables, returning what was written
    pub fn write(&self, outputs: &Outputs) -> Result<Vec<WrittenFile>> {
        let names = &self.config.outputs;
        let targets: [(&str, &Table); 5] = [
            (names.bio.as_str(), &outputs.bio),
            (names.games.as_str(), &outputs.games),
            (names.countries.as_str(), &outputs.countries),
            (names.results.as_str(), &outputs.results),
            (names.tally.as_str(), &outputs.tally),
        ];

        targets
            .into_iter()
            .map(|(name, table)| write_output(&self.out_dir.join(name), table))
            .collect()
    }

    /// Load, run every stage, write outputs
    pub fn run(&self) -> Result<RunSummary> {
        info!(
            data_dir = %self.data_dir.display(),
            incoming_dir = %self.incoming_dir.display(),
            "starting merge run"
        );
        let inputs = self.load()?;
        let (outputs, stages) = run_stages(&inputs, &self.config);
        let files = self.write(&outputs)?;
        info!(out_dir = %self.out_dir.display(), files = files.len(), "merge run complete");
        Ok(RunSummary { stages, files })
    }
}

fn write_output(path: &Path, table: &Table) -> Result<WrittenFile> {
    let sha256 = write_csv(path, table)?;
    Ok(WrittenFile {
        path: path.to_path_buf(),
        rows: table.len(),
        sha256,
    })
}

// ============================================================================
// TESTS
// ============================================================================
