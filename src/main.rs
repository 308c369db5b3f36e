//! # flapwatch
//!
//! Replays a metric observation log through the flap detector and reports
//! every transition notification.

use clap::{Parser, Subcommand};
use flapwatch_core::{DetectorConfig, FlapError};
use flapwatch_monitor::{replay, FlapDetector, FlapEvent, TracingListener};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "flapwatch")]
#[command(about = "Threshold flap detection over sampled metrics", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed an observation log (`name,low,high` per line) through the detector
    Replay {
        /// Detector configuration (TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// Observation log; stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Emit one JSON object per event instead of text
        #[arg(long)]
        json: bool,
    },

    /// Validate a configuration file and print the effective settings
    Check {
        /// Detector configuration (TOML)
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();

    let result = match cli.command {
        Commands::Replay { config, input, json } => run_replay(&config, input.as_deref(), json),
        Commands::Check { config } => run_check(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("flapwatch: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_replay(config_path: &Path, input: Option<&Path>, json: bool) -> Result<(), FlapError> {
    let config = DetectorConfig::load(config_path)?;
    let mut detector = FlapDetector::from_config(config)?;

    let reader: Box<dyn BufRead> = match input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut console = TracingListener;
    let mut write_error: Option<io::Error> = None;

    let summary = replay(reader, &mut detector, |event: &FlapEvent| {
        event.dispatch(&mut console);
        if write_error.is_none() {
            if let Err(e) = write_event(&mut out, event, json) {
                write_error = Some(e);
            }
        }
    })?;

    if let Some(e) = write_error {
        return Err(e.into());
    }

    if !json {
        writeln!(
            out,
            "{} ticks, {} resets, {} events",
            summary.ticks,
            summary.resets,
            summary.total_events()
        )?;
        for snapshot in detector.snapshots() {
            writeln!(
                out,
                "  {:<24} score={:.3} flapping={} ticks={}",
                snapshot.name, snapshot.score, snapshot.flapping, snapshot.ticks
            )?;
        }
    }
    Ok(())
}

fn write_event(out: &mut impl Write, event: &FlapEvent, json: bool) -> io::Result<()> {
    if json {
        serde_json::to_writer(&mut *out, event)?;
        writeln!(out)
    } else {
        writeln!(
            out,
            "tick {:>5}  {:<24} {:<34} high={} score={:.3}",
            event.tick,
            event.observation.name(),
            event.kind.as_str(),
            event.observation.high(),
            event.score
        )
    }
}

fn run_check(config_path: &Path) -> Result<(), FlapError> {
    let config = DetectorConfig::load(config_path)?;
    let flap = &config.flap;
    println!(
        "defaults: interval={} start={} stop={} weights={}..{} threshold={}",
        flap.interval,
        flap.start_threshold,
        flap.stop_threshold,
        flap.low_weight,
        flap.high_weight,
        config
            .default_threshold
            .map(|t| t.to_string())
            .unwrap_or_else(|| "<none>".to_string())
    );
    for (name, metric) in &config.metrics {
        let s = metric.resolve(flap);
        println!(
            "{}: interval={} start={} stop={} weights={}..{} threshold={}",
            name,
            s.interval,
            s.start_threshold,
            s.stop_threshold,
            s.low_weight,
            s.high_weight,
            config
                .threshold_for(name)
                .map(|t| t.to_string())
                .unwrap_or_else(|_| "<none>".to_string())
        );
    }
    Ok(())
}
