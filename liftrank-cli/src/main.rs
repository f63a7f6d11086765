//! liftrank CLI: normalize, rank and options commands.
//!
//! Commands:
//! - `normalize`: clean a raw competition export into a canonical snapshot
//! - `rank`: rank squat/bench/deadlift against a filtered group of athletes
//! - `options`: list the values an attribute takes in the snapshot

mod labels;
mod render;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use labels::{Labels, Locale};
use liftrank_core::data::{DataIngestor, Normalizer, SnapshotStore};
use liftrank_core::domain::{Attribute, FilterCriteria, UserInput};
use liftrank_core::export::ExportRecord;
use liftrank_core::{Assessment, LiftrankConfig, RankingService};

#[derive(Parser)]
#[command(
    name = "liftrank",
    version,
    about = "liftrank CLI: how strong are you compared to other powerlifters?"
)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean a raw CSV or Parquet export into a canonical Parquet snapshot.
    Normalize {
        /// Raw export (.csv or .parquet).
        raw: PathBuf,

        /// Snapshot to write.
        #[arg(long)]
        out: PathBuf,
    },
    /// Rank your lifts against the athletes matching the filters.
    Rank(RankArgs),
    /// List the values an attribute takes, most frequent first.
    Options {
        /// sex, weight_class, equipment, division, federation or country.
        attribute: Attribute,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Snapshot to read. Defaults to the configured path.
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Show at most this many values.
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Args)]
struct RankArgs {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Snapshot to read. Defaults to the configured path.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    #[arg(long)]
    sex: Option<String>,

    #[arg(long)]
    weight_class: Option<String>,

    /// Modality (Raw, Wraps, Single-ply, ...).
    #[arg(long, alias = "modality")]
    equipment: Option<String>,

    #[arg(long)]
    division: Option<String>,

    #[arg(long)]
    federation: Option<String>,

    #[arg(long)]
    country: Option<String>,

    /// Best squat in kg.
    #[arg(long)]
    squat: f64,

    /// Best bench press in kg.
    #[arg(long)]
    bench: f64,

    /// Best deadlift in kg.
    #[arg(long)]
    deadlift: f64,

    /// Histogram buckets. Defaults to the configured count.
    #[arg(long)]
    buckets: Option<usize>,

    #[arg(long, value_enum, default_value_t = Locale::En)]
    lang: Locale,

    /// Print the assessment as JSON instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Also write your entry to this CSV file.
    #[arg(long)]
    export: Option<PathBuf>,
}

impl RankArgs {
    fn criteria(&self) -> FilterCriteria {
        let mut criteria = FilterCriteria::new();
        for (attribute, value) in [
            (Attribute::Sex, &self.sex),
            (Attribute::WeightClass, &self.weight_class),
            (Attribute::Equipment, &self.equipment),
            (Attribute::Division, &self.division),
            (Attribute::Federation, &self.federation),
            (Attribute::Country, &self.country),
        ] {
            criteria.set(attribute, value.clone());
        }
        criteria
    }

    fn input(&self) -> UserInput {
        UserInput::new(self.squat, self.bench, self.deadlift)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    match cli.command {
        Commands::Normalize { raw, out } => run_normalize(&raw, &out),
        Commands::Rank(args) => run_rank(&args),
        Commands::Options {
            attribute,
            config,
            snapshot,
            limit,
        } => run_options(attribute, config.as_deref(), snapshot, limit),
    }
}

/// Config from `path`, or defaults when no file was given.
fn load_config(path: Option<&Path>, snapshot: Option<PathBuf>) -> Result<LiftrankConfig> {
    let mut config = match path {
        Some(path) => LiftrankConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => LiftrankConfig::default(),
    };
    if let Some(snapshot) = snapshot {
        config.snapshot.path = snapshot;
    }
    Ok(config)
}

fn run_normalize(raw: &Path, out: &Path) -> Result<()> {
    let frame = DataIngestor::new()
        .ingest(raw)
        .with_context(|| format!("failed to read {}", raw.display()))?;
    let normalized = Normalizer::normalize(frame).context("failed to normalize records")?;

    let store = SnapshotStore::new(out);
    let meta = store
        .write(&normalized.table, Some(raw), Some(&normalized.report))
        .with_context(|| format!("failed to write snapshot {}", out.display()))?;

    let report = &normalized.report;
    println!();
    println!("=== Normalized ===");
    println!("Input rows:       {}", report.input_rows);
    println!("Invalid sex:      {}", report.dropped_invalid_sex);
    println!("Duplicates:       {}", report.dropped_duplicates);
    println!("Missing total:    {}", report.dropped_missing_total);
    println!("4th attempts:     {}", report.dropped_fourth_attempt);
    println!("Output rows:      {}", report.output_rows);
    for (column, dtype) in &report.shrunk_columns {
        println!("  {column} -> {dtype}");
    }
    println!("Snapshot:         {}", out.display());
    println!("Version:          {}", meta.data_hash);
    Ok(())
}

fn run_rank(args: &RankArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref(), args.snapshot.clone())?;
    if let Some(buckets) = args.buckets {
        config.engine.bucket_count = buckets;
    }

    let criteria = args.criteria();
    let input = args.input();
    let mut service = RankingService::new(config).context("invalid configuration")?;
    let assessment = service
        .assess(&criteria, &input)
        .context("failed to rank lifts")?;

    let labels = Labels::new(args.lang);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
    } else {
        let mut text = String::new();
        render::write_assessment(&mut text, &assessment, &labels)?;
        print!("{text}");
    }

    if let (Some(path), Assessment::Ranked(_)) = (&args.export, &assessment) {
        ExportRecord::new(&criteria, &input)
            .write_csv(path)
            .with_context(|| format!("failed to export to {}", path.display()))?;
        if !args.json {
            println!(
                "{}",
                labels.format("exported", &[("path", &path.display().to_string())])
            );
        }
    }

    if let Assessment::IncompleteInput { .. } = assessment {
        std::process::exit(2);
    }
    Ok(())
}

fn run_options(
    attribute: Attribute,
    config: Option<&Path>,
    snapshot: Option<PathBuf>,
    limit: Option<usize>,
) -> Result<()> {
    let config = load_config(config, snapshot)?;
    let mut service = RankingService::new(config).context("invalid configuration")?;
    let values = service
        .distinct_values(attribute)
        .with_context(|| format!("failed to list values of {attribute}"))?;

    let shown = limit.unwrap_or(values.len());
    for (value, count) in values.iter().take(shown) {
        println!("{value:<30}{count:>10}");
    }
    if values.len() > shown {
        println!("... {} more", values.len() - shown);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn rank_args_build_criteria() {
        let cli = Cli::try_parse_from([
            "liftrank",
            "rank",
            "--sex",
            "F",
            "--modality",
            "Raw",
            "--weight-class",
            "63",
            "--squat",
            "120",
            "--bench",
            "70",
            "--deadlift",
            "150",
            "--lang",
            "pt",
        ])
        .unwrap();

        let Commands::Rank(args) = cli.command else {
            panic!("expected rank");
        };
        let criteria = args.criteria();
        assert_eq!(criteria.len(), 3);
        assert_eq!(criteria.get(Attribute::Equipment), Some("Raw"));
        assert_eq!(criteria.get(Attribute::WeightClass), Some("63"));
        assert_eq!(args.input().total(), 340.0);
        assert_eq!(args.lang, Locale::Pt);
    }

    #[test]
    fn options_parses_attribute_alias() {
        let cli = Cli::try_parse_from(["liftrank", "options", "modality", "--limit", "5"]).unwrap();
        let Commands::Options { attribute, limit, .. } = cli.command else {
            panic!("expected options");
        };
        assert_eq!(attribute, Attribute::Equipment);
        assert_eq!(limit, Some(5));
    }

    #[test]
    fn config_flag_overrides_snapshot_path() {
        let config = load_config(None, Some(PathBuf::from("other.parquet"))).unwrap();
        assert_eq!(config.snapshot.path, PathBuf::from("other.parquet"));
    }
}
