//! imgops-bench: CLI tool for running operation chains on images.
//!
//! Loads an image, converts it to a luminance buffer, runs an operation
//! chain over it and prints per-operation diagnostics. Useful for:
//!
//! - Tuning Gaussian and Canny parameters
//! - Measuring per-operation durations to identify bottlenecks
//! - Dumping intermediate results as PPM for inspection
//!
//! Errors and progress go through `env_logger`. Errors are shown by
//! default; set `RUST_LOG=info` for the chain listing and PPM output, or
//! `RUST_LOG=debug` for chain execution details.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin imgops-bench -- [OPTIONS] <IMAGE_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use imgops_core::{
    Buffer2d, CannyConfig, ChainDiagnostics, Clock, FilterConfig, OpConfig, OperationChain,
};

/// Operation chain experimentation and diagnostics for imgops.
///
/// Without `--chain` or `--chain-json`, runs a Gaussian blur followed by
/// Canny edge detection configured from the individual flags.
#[derive(Parser)]
#[command(name = "imgops-bench", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Gaussian sigma for the default chain (both axes).
    #[arg(long, default_value_t = 1.4)]
    sigma: f32,

    /// Gaussian kernel radius for the default chain (both axes).
    #[arg(long, default_value_t = 3)]
    radius: usize,

    /// Canny low threshold for the default chain.
    #[arg(long, default_value_t = CannyConfig::default().lo_thresh)]
    canny_low: f32,

    /// Canny high threshold for the default chain.
    #[arg(long, default_value_t = CannyConfig::default().hi_thresh)]
    canny_high: f32,

    /// Read the chain from a JSON file: a list of `{"id", "config"}`
    /// entries.
    #[arg(long, conflicts_with = "chain_json")]
    chain: Option<PathBuf>,

    /// Chain as a JSON string, same format as `--chain`.
    #[arg(long)]
    chain_json: Option<String>,

    /// Write the chain output as a plain-text PPM file.
    #[arg(long)]
    ppm: Option<PathBuf>,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output diagnostics as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,
}

/// Build the [`OperationChain`] from CLI arguments and validate every
/// entry.
fn chain_from_cli(cli: &Cli) -> Result<OperationChain, String> {
    let chain = if let Some(ref path) = cli.chain {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
        serde_json::from_str(&text)
            .map_err(|e| format!("Error parsing {}: {e}", path.display()))?
    } else if let Some(ref json) = cli.chain_json {
        serde_json::from_str(json).map_err(|e| format!("Error parsing --chain-json: {e}"))?
    } else {
        let mut chain = OperationChain::new();
        chain.add_operation(
            1,
            OpConfig::Filter(FilterConfig {
                kernel_radius_x: cli.radius,
                kernel_radius_y: cli.radius,
                sigma_x: cli.sigma,
                sigma_y: cli.sigma,
            }),
        );
        chain.add_operation(
            2,
            OpConfig::Canny(CannyConfig {
                lo_thresh: cli.canny_low,
                hi_thresh: cli.canny_high,
            }),
        );
        chain
    };

    for (id, op) in chain.iter() {
        op.config()
            .validate()
            .map_err(|e| format!("Operation {id}: {e}"))?;
    }
    Ok(chain)
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let chain = match chain_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            log::error!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let image_bytes = match std::fs::read(&cli.image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::error!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    let input = match imgops_core::decode_luminance(&image_bytes) {
        Ok(buf) => buf,
        Err(e) => {
            log::error!("Error decoding {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    eprintln!(
        "Image: {} ({} bytes, {}x{})",
        cli.image_path.display(),
        image_bytes.len(),
        input.width(),
        input.height(),
    );
    eprintln!("Chain: {} operations", chain.len());
    for (id, op) in chain.iter() {
        log::info!("operation {id}: {:?}", op.config());
    }
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    let mut all_diagnostics = Vec::with_capacity(cli.runs);
    let mut output = Buffer2d::default();

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        let diagnostics = chain.execute_chain_with_diagnostics(&input, &mut output, &StdClock);
        if cli.json {
            match serde_json::to_string_pretty(&diagnostics) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    log::error!("Error serializing diagnostics: {e}");
                    return ExitCode::FAILURE;
                }
            }
        } else {
            println!("{}", diagnostics.report());
        }
        all_diagnostics.push(diagnostics);

        if cli.runs > 1 {
            eprintln!();
        }
    }

    if let Some(ref ppm_path) = cli.ppm {
        let ppm = imgops_export::to_ppm(&output);
        match std::fs::write(ppm_path, &ppm) {
            Ok(()) => {
                log::info!("PPM written to {} ({} bytes)", ppm_path.display(), ppm.len());
            }
            Err(e) => {
                log::error!("Error writing PPM to {}: {e}", ppm_path.display());
                return ExitCode::FAILURE;
            }
        }
    }

    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    ExitCode::SUCCESS
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[ChainDiagnostics]) {
    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    let Some(first) = all_diagnostics.first() else {
        println!("Warning: no diagnostics to summarize");
        return;
    };

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    println!();
    println!("{:<8} {:<12} {:>12}", "Id", "Operation", "Mean (ms)");
    println!("{}", "-".repeat(34));

    // Every run executes the same chain, so entries line up by position.
    for (index, op) in first.operations.iter().enumerate() {
        let op_durations: Vec<f64> = all_diagnostics
            .iter()
            .filter_map(|d| d.operations.get(index))
            .map(|o| o.duration.as_secs_f64() * 1000.0)
            .collect();
        let op_mean = op_durations.iter().sum::<f64>() / op_durations.len() as f64;
        println!(
            "{:<8} {:<12} {op_mean:>10.3}ms",
            op.id,
            op.kind.to_string()
        );
    }
}
