//! polymend - audit, repair and clean polygon layers
//!
//! Usage:
//!   polymend check <layer.geojson>                 Report invalid polygons
//!   polymend repair <layer.geojson> -o out.geojson Repair (prompting if needed)
//!   polymend repair - --decision repair-clean      Read stdin, write stdout

mod cli;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use chrono::Local;
use clap::{Parser, Subcommand};
use polymend::Decision;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::config::{load_or_default, ConfigMerger};
use cli::{cmd_check, cmd_repair, RepairOptions};

#[derive(Debug, Parser)]
#[command(
    name = "polymend",
    version,
    about = "Find, repair and clean invalid polygons in GeoJSON layers."
)]
struct Cli {
    /// Log at debug level (overrides RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scan a layer and report invalid polygons (exit 2 if any).
    Check(CheckArgs),
    /// Scan a layer, then repair and optionally clean it.
    Repair(RepairArgs),
}

#[derive(Debug, Parser)]
struct CheckArgs {
    /// GeoJSON FeatureCollection, or `-` for stdin.
    layer: String,

    /// Print a JSON report instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Debug, Parser)]
struct RepairArgs {
    /// GeoJSON FeatureCollection, or `-` for stdin.
    layer: String,

    /// Where to write the modified layer (default: stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite the input file.
    #[arg(long, default_value_t = false, conflicts_with = "output")]
    in_place: bool,

    /// Answer to the repair question: cancel, repair or repair-clean.
    #[arg(short, long)]
    decision: Option<Decision>,

    /// Decimal digits used to decide vertex equality.
    #[arg(long)]
    precision: Option<u32>,

    /// Minimum point count of a closed ring.
    #[arg(long)]
    min_ring_points: Option<usize>,

    /// Write compact instead of pretty-printed GeoJSON.
    #[arg(long, default_value_t = false)]
    compact: bool,

    /// Print the run report as JSON on stdout.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Config file (default: ./polymend.yaml if present).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    match real_main() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn real_main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let started = Instant::now();
    info!(
        "polymend {} started at {}",
        env!("CARGO_PKG_VERSION"),
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    let code = match cli.cmd {
        Command::Check(args) => cmd_check(&args.layer, args.json)?,
        Command::Repair(args) => {
            let file_config = load_or_default(args.config.as_deref(), Path::new("."))?;
            let settings = ConfigMerger::new(file_config).merge_repair_args(
                args.precision,
                args.min_ring_points,
                args.decision,
                args.compact,
            )?;
            cmd_repair(&RepairOptions {
                layer: args.layer,
                output: args.output,
                in_place: args.in_place,
                json: args.json,
                settings,
            })?
        }
    };

    info!(
        "finished at {} ({:.3} sec.)",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        started.elapsed().as_secs_f64()
    );
    Ok(code)
}
