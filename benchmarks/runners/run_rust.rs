//! Command-line runner: track growth lines from a scenario file or a
//! synthetic seed and print the active-hypothesis counts.
//!
//! Usage:
//!     track_scenario --scenario <path> [--config <path>] [--output <path>] [--json]
//!     track_scenario --synthetic <seed> [--lines N] [--frames N] [--channel-length N]
//!     track_scenario ... --lp-dir <dir>    (also write every built model in LP format)
//!
//! Output:
//!     CSV (`growth_line,time,active_hypotheses`) or JSON on stdout or in
//!     the output file. Exit 0 if every growth line was solved.

use std::error::Error;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming};

use growthline_tracking::export::{active_count_rows, to_json, write_csv};
use growthline_tracking::scenario::load_scenario;
use growthline_tracking::synthetic::{generate_growth_lines, SyntheticConfig};
use growthline_tracking::{track_all, BranchAndBoundEnv, GrowthLine, TrackingConfig};

// =============================================================================
// CLI Arguments
// =============================================================================

#[derive(Parser)]
#[command(name = "track_scenario")]
#[command(about = "Track cells in mother-machine growth lines")]
#[command(long_about = "Track cells in mother-machine growth lines.\n\n\
Branch and bound is exact, so solve time grows exponentially with the number of \
candidate segments. The synthetic defaults (3 frames, 40 px channel) keep models \
small; 5 frames over an 80 px channel take about 15 s in a release build. Use \
--node-limit to cap the search on large inputs.")]
struct Args {
    /// Path to scenario JSON file
    #[arg(long, conflicts_with = "synthetic", required_unless_present = "synthetic")]
    scenario: Option<PathBuf>,

    /// Generate synthetic growth lines with this seed
    #[arg(long)]
    synthetic: Option<u64>,

    /// Number of synthetic growth lines
    #[arg(long, default_value_t = 1)]
    lines: usize,

    /// Frames per synthetic growth line
    #[arg(long, default_value_t = 3)]
    frames: usize,

    /// Channel length of synthetic growth lines, in pixels
    #[arg(long, default_value_t = 40)]
    channel_length: usize,

    /// Cap on branch-and-bound nodes per growth line (overrides the config)
    #[arg(long)]
    node_limit: Option<u64>,

    /// Tracking config JSON (defaults if omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the export here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Export JSON instead of CSV
    #[arg(long)]
    json: bool,

    /// Log model snapshots after building
    #[arg(long)]
    snapshot: bool,

    /// Write each built model as `growth_line_<i>.lp` into this directory
    #[arg(long)]
    lp_dir: Option<PathBuf>,

    /// Log level specification (e.g. "info", "debug, growthline_tracking=trace")
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Also log to rotating files in this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn setup_logging(level: &str, log_dir: Option<&Path>) -> Result<LoggerHandle, FlexiLoggerError> {
    let logger = Logger::try_with_str(level)?;
    let logger = match log_dir {
        Some(dir) => logger
            .log_to_file(FileSpec::default().directory(dir))
            .duplicate_to_stderr(Duplicate::Warn)
            .rotate(
                Criterion::Size(1024 * 1024),
                Naming::Timestamps,
                Cleanup::KeepLogFiles(5),
            ),
        None => logger.log_to_stderr(),
    };
    logger.start()
}

fn load_lines(args: &Args) -> Result<Vec<GrowthLine>, Box<dyn Error>> {
    if let Some(path) = &args.scenario {
        log::info!("Loading scenario {}", path.display());
        return Ok(load_scenario(path)?.to_growth_lines()?);
    }
    let synthetic = SyntheticConfig {
        growth_lines: args.lines,
        frames: args.frames,
        channel_length: args.channel_length,
        seed: args.synthetic.unwrap_or_default(),
        ..SyntheticConfig::default()
    };
    log::info!(
        "Generating {} synthetic growth lines (seed {})",
        synthetic.growth_lines,
        synthetic.seed
    );
    Ok(generate_growth_lines(&synthetic)?)
}

fn run(args: &Args) -> Result<bool, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => TrackingConfig::from_json_file(path)?,
        None => TrackingConfig::default(),
    };
    if let Some(limit) = args.node_limit {
        config = config.with_node_limit(Some(limit));
    }
    let mut lines = load_lines(args)?;

    let env = BranchAndBoundEnv::open(config.solver.clone());
    let start = Instant::now();
    let results = track_all(&mut lines, &env, &config);
    log::info!(
        "Tracked {} growth lines in {:.1} ms",
        lines.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    let mut all_solved = true;
    for (i, result) in results.iter().enumerate() {
        match result {
            Ok(status) if status.has_solution() => log::info!("Growth line {}: {}", i, status),
            Ok(status) => {
                log::warn!("Growth line {}: {}", i, status);
                all_solved = false;
            }
            Err(e) => {
                log::error!("Growth line {}: {}", i, e);
                all_solved = false;
            }
        }
    }

    if args.snapshot {
        for (i, line) in lines.iter().enumerate() {
            if let Some(ilp) = line.ilp() {
                log::info!("Growth line {} model: {}", i, ilp.snapshot().to_json()?);
            }
        }
    }

    if let Some(dir) = &args.lp_dir {
        fs::create_dir_all(dir)?;
        for (i, line) in lines.iter().enumerate() {
            if let Some(ilp) = line.ilp() {
                ilp.write_lp_file(dir.join(format!("growth_line_{}.lp", i)))?;
            }
        }
        log::info!("Wrote LP models to {}", dir.display());
    }

    let rows = active_count_rows(&lines);
    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };
    if args.json {
        writeln!(writer, "{}", to_json(&rows)?)?;
        writer.flush()?;
    } else {
        write_csv(&rows, writer)?;
    }

    env.close();
    Ok(all_solved)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let _logger = match setup_logging(&args.log_level, args.log_dir.as_deref()) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Logger initialization failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
