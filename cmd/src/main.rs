use std::fs::File;
use std::io::{stderr, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Repair corrupted relative scan counters in a recorded GOES GVAR downlink file.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Input GVAR recording.
    #[arg(short, long)]
    input: PathBuf,

    /// Output path for the corrected recording.
    #[arg(short, long, default_value = "goes_gvar_corrected.gvar")]
    output: PathBuf,

    /// Enable debug-level logging. Overridden by GVAR_REPAIR_LOG if set.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(stderr)
        .with_ansi(false)
        .without_time()
        .with_env_filter(
            EnvFilter::try_from_env("GVAR_REPAIR_LOG")
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    info!(
        "{} {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let input = File::open(&cli.input)
        .with_context(|| format!("failed to open input {:?}", cli.input))?;
    let output = File::create(&cli.output)
        .with_context(|| format!("failed to create output {:?}", cli.output))?;

    info!(input = ?cli.input, output = ?cli.output, "repairing GVAR recording");

    let mut writer = BufWriter::new(output);
    let summary = gvar_repair::repair(BufReader::new(input), &mut writer)
        .with_context(|| format!("failed to repair {:?}", cli.input))?;
    writer
        .flush()
        .with_context(|| format!("failed to flush output {:?}", cli.output))?;

    info!(
        frames_read = summary.frames_read,
        frames_emitted = summary.frames_emitted,
        "done"
    );

    Ok(())
}
