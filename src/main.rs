// Olympic Merge CLI
// Thin wrapper over the library pipeline: parse args, set up logging, run

use anyhow::Result;
use clap::{Parser, Subcommand};
use olympic_merge::{Pipeline, PipelineConfig, RunSummary, StageStatus, VERSION};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "olympic-merge",
    version,
    about = "Merge a new Olympic edition into the historical athlete/results dataset"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// More log output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Merge the incoming edition and write the new_* output files
    Run(RunArgs),

    /// Print the default configuration as JSON
    Config,
}

#[derive(Parser)]
struct RunArgs {
    /// Directory holding the base dataset
    #[arg(long = "data-dir", value_name = "DIR", default_value = ".")]
    data_dir: PathBuf,

    /// Directory holding the incoming edition (default: <DATA_DIR>/paris)
    #[arg(long = "incoming-dir", value_name = "DIR")]
    incoming_dir: Option<PathBuf>,

    /// Where to write outputs (default: <DATA_DIR>)
    #[arg(long = "out-dir", value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the run summary as JSON instead of text
    #[arg(long = "json")]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(log_level(cli.verbose, cli.quiet));

    match cli.command {
        Command::Run(args) => run(args),
        Command::Config => {
            println!("{}", PipelineConfig::default().to_json()?);
            Ok(())
        }
    }
}

fn log_level(verbose: u8, quiet: bool) -> Level {
    match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    }
}

/// `RUST_LOG` wins over the flags when set
fn init_logging(level: Level) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,olympic_merge={level}",
            level = level.as_str().to_lowercase()
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: RunArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };

    let mut pipeline = Pipeline::new(&args.data_dir, config);
    if let Some(dir) = args.incoming_dir {
        pipeline = pipeline.with_incoming_dir(dir);
    }
    if let Some(dir) = args.out_dir {
        pipeline = pipeline.with_out_dir(dir);
    }

    if !args.json {
        println!("🏅 Olympic Merge v{}", VERSION);
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    let summary = pipeline.run()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!("\n📊 Stages:");
    for stage in &summary.stages {
        match &stage.status {
            StageStatus::Merged => println!("  ✓ {:<10} {} rows", stage.stage, stage.rows),
            StageStatus::Kept { error } => {
                println!("  ⚠️  {:<10} kept unchanged: {}", stage.stage, error)
            }
        }
    }

    println!("\n💾 Written:");
    for file in &summary.files {
        let short_hash = file.sha256.get(..12).unwrap_or(&file.sha256);
        println!("  {} ({} rows, sha256 {})", file.path.display(), file.rows, short_hash);
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    let kept = summary.kept_stages().count();
    if kept == 0 {
        println!("🎉 Merge complete!");
    } else {
        println!("✅ Merge complete with {} stage(s) kept unchanged", kept);
    }
}
