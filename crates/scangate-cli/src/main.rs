// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scangate — Document photo quality gate and deskew
//
// Entry point. Initialises logging, resolves the gate configuration, and
// dispatches to the `check`, `process`, and `profiles` subcommands. Results
// go to stdout as JSON; logs go to stderr.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use scangate_core::config::STRICTNESS_ENV;
use scangate_core::{GateConfig, ScangateError, Strictness, ThresholdProfile, describe_error};
use scangate_document::{ImageProcessor, OrderedCorners, Pipeline, QualityGate};

#[derive(Parser, Debug)]
#[command(
    name = "scangate",
    version,
    about = "Reject unusable document photos and deskew the rest"
)]
struct Cli {
    /// Threshold preset: lenient, standard, strict (easy/medium/hard also accepted).
    #[arg(long, global = true, env = STRICTNESS_ENV)]
    strictness: Option<String>,

    /// JSON file with gate settings; `--strictness` overrides it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the quality gate only and print the verdict.
    Check {
        /// Photo to evaluate.
        image: PathBuf,
    },
    /// Gate, locate, and deskew a photo.
    Process {
        /// Photo to process.
        image: PathBuf,
        /// Where to write the rectified JPEG.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the JPEG as a base64 data URL.
        #[arg(long)]
        data_url: bool,
    },
    /// Print the threshold presets.
    Profiles,
}

/// Summary printed after a successful `process`.
#[derive(Serialize)]
struct ProcessSummary<'a> {
    width: u32,
    height: u32,
    bytes: usize,
    corners: [(f32, f32); 4],
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<&'a Path>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_url: Option<String>,
}

#[derive(Serialize)]
struct ProfileEntry {
    strictness: Strictness,
    profile: ThresholdProfile,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_filter(cli.verbose))),
        )
        .with_writer(io::stderr)
        .init();

    let config = resolve_config(&cli)?;
    tracing::info!(strictness = %config.strictness, "Scangate starting");

    match &cli.command {
        Command::Check { image } => check(&config, image),
        Command::Process {
            image,
            output,
            data_url,
        } => process(&config, image, output.as_deref(), *data_url),
        Command::Profiles => profiles(),
    }
}

/// Log level used when `RUST_LOG` is unset.
fn default_log_filter(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

/// File settings first, then the flag or environment value on top.
fn resolve_config(cli: &Cli) -> Result<GateConfig> {
    match (&cli.config, cli.strictness.as_deref()) {
        (_, Some(value)) => Ok(GateConfig::from_env_value(Some(value))),
        (Some(path), None) => GateConfig::from_json_file(path)
            .with_context(|| format!("loading config from {}", path.display())),
        (None, None) => Ok(GateConfig::default()),
    }
}

fn check(config: &GateConfig, path: &Path) -> Result<ExitCode> {
    let processor = match ImageProcessor::open(path) {
        Ok(processor) => processor,
        Err(err) => return report_failure(&err),
    };
    let verdict = QualityGate::new(config.profile()).evaluate(processor.as_dynamic());
    print_json(&verdict)?;
    Ok(if verdict.is_pass() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn process(
    config: &GateConfig,
    path: &Path,
    output: Option<&Path>,
    data_url: bool,
) -> Result<ExitCode> {
    let doc = match Pipeline::new(config.profile()).run_path(path) {
        Ok(doc) => doc,
        Err(err) => return report_failure(&err),
    };

    if let Some(out) = output {
        std::fs::write(out, &doc.jpeg)
            .with_context(|| format!("writing {}", out.display()))?;
    }

    let corners: OrderedCorners = doc.corners;
    print_json(&ProcessSummary {
        width: doc.width,
        height: doc.height,
        bytes: doc.jpeg.len(),
        corners: corners.as_array(),
        output,
        data_url: data_url.then(|| doc.data_url()),
    })?;
    Ok(ExitCode::SUCCESS)
}

fn profiles() -> Result<ExitCode> {
    let entries: Vec<ProfileEntry> = Strictness::ALL
        .into_iter()
        .map(|strictness| ProfileEntry {
            strictness,
            profile: *strictness.profile(),
        })
        .collect();
    print_json(&entries)?;
    Ok(ExitCode::SUCCESS)
}

/// Print the user-facing descriptor for a pipeline error and pick the exit code.
fn report_failure(err: &ScangateError) -> Result<ExitCode> {
    tracing::warn!(error = %err, "Document rejected");
    print_json(&describe_error(err))?;
    Ok(ExitCode::FAILURE)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
