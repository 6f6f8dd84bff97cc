//! Command-line driver: locate one scan against a reference point backup.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use fingerprint_positioning::{
    ConfidenceLevel, ConfigurationManager, Exporter, FingerprintStore, FixFormatter, OutputFormat, PositionEstimator,
    PositionFix, SystemConfig, WifiReading,
};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Estimate an indoor position from a Wi-Fi scan and recorded reference points
#[derive(Parser, Debug)]
#[command(name = "fingerprint-positioning", version)]
struct Args {
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format of the position fix
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write the loaded reference points back out in the interchange format
    #[arg(long)]
    export: Option<PathBuf>,

    /// Reference point backup in the interchange format
    reference: PathBuf,

    /// Live scan: JSON array of readings
    scan: PathBuf,

    /// Neighbor count, defaults to the configured k
    k: Option<usize>,
}

fn load_config(path: Option<&Path>) -> Result<ConfigurationManager> {
    match path {
        Some(path) => ConfigurationManager::from_file(path)
            .with_context(|| format!("failed to load configuration from '{}'", path.display())),
        None => Ok(ConfigurationManager::new()),
    }
}

fn log_filter(system: &SystemConfig) -> &'static str {
    if system.debug_logging {
        "debug"
    } else {
        "info"
    }
}

fn run(args: &Args, system: &SystemConfig) -> Result<PositionFix> {
    let store = FingerprintStore::new();
    let reference_data = fs::read_to_string(&args.reference)
        .with_context(|| format!("failed to read reference points from '{}'", args.reference.display()))?;
    let loaded = store
        .import_snapshot(&reference_data)
        .with_context(|| format!("invalid reference data in '{}'", args.reference.display()))?;
    info!("loaded {} reference points from '{}'", loaded, args.reference.display());

    if let Some(path) = &args.export {
        let exporter = if system.pretty_export {
            Exporter::pretty()
        } else {
            Exporter::new()
        };
        fs::write(path, store.export_with(&exporter)?)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        info!("exported {} reference points to '{}'", loaded, path.display());
    }

    let scan_data = fs::read_to_string(&args.scan)
        .with_context(|| format!("failed to read scan from '{}'", args.scan.display()))?;
    let scan: Vec<WifiReading> = serde_json::from_str(&scan_data)
        .with_context(|| format!("invalid scan in '{}'", args.scan.display()))?;

    let estimator = PositionEstimator::with_config(system.estimator.clone());
    let k = args.k.unwrap_or(system.estimator.k);
    let snapshot = store.list_points();
    let position = estimator.estimate(&scan, &snapshot, k)?;

    Ok(PositionFix {
        confidence: ConfidenceLevel::from_accuracy(position.accuracy),
        position,
        map: None,
        timestamp: Utc::now(),
        reference_count: snapshot.len(),
    })
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let system = config.get_system_config();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(system))).init();

    let fix = run(&args, system)?;

    let formatter = FixFormatter::new().with_format(args.format);
    if args.format == OutputFormat::Csv {
        println!("{}", FixFormatter::csv_header());
    }
    println!("{}", formatter.format(&fix)?);
    Ok(())
}
