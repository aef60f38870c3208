mod config;
mod logging;
mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::bail;
use clap::Parser;
use log::LevelFilter;
use omnivore_engine::{ConvertJob, EngineEvent, EngineHandle};

use crate::config::AppConfig;

/// Convert an Omnivore export into a Markdown archive with local images.
#[derive(Debug, Parser)]
#[command(name = "omnivore-md", version)]
struct Args {
    /// Omnivore export zip (HTML documents plus metadata JSON).
    input: PathBuf,

    /// Output archive; defaults to `<input stem>-markdown.zip` next to the input.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// RON settings file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Per-attempt image request timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Leave `manifest.json` out of the archive.
    #[arg(long)]
    no_manifest: bool,

    /// Also write the process log to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Show debug output and per-image progress.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<ExitCode> {
    let mut app_config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(timeout) = args.timeout {
        app_config.timeout_secs = timeout;
    }
    if args.no_manifest {
        app_config.include_manifest = false;
    }
    if args.log_file.is_some() {
        app_config.log_file = args.log_file.clone();
    }

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    logging::initialize(level, app_config.log_file.as_deref());

    if !args.input.is_file() {
        bail!("input {} is not a file", args.input.display());
    }
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));
    log::info!(
        "Converting {} into {}",
        args.input.display(),
        output.display()
    );

    let handle = EngineHandle::start(ConvertJob {
        input: args.input,
        output,
        config: app_config.to_engine_config(),
    });

    while let Some(event) = handle.recv() {
        match event {
            EngineEvent::Progress(update) => {
                if args.verbose || update.current_image.is_none() {
                    println!("{}", report::progress_line(&update));
                }
            }
            EngineEvent::ArticleSkipped { file } => println!("Skipped {file} (no metadata)"),
            EngineEvent::ImageSettled { file, progress } => {
                log::debug!(
                    "{}: {}/{} image(s) settled",
                    file,
                    progress.completed,
                    progress.total
                );
            }
            EngineEvent::Log(_) => {}
            EngineEvent::Finished(Ok(summary)) => {
                println!("{}", report::summary(&summary));
                return Ok(ExitCode::SUCCESS);
            }
            EngineEvent::Finished(Err(err)) => bail!("conversion failed: {err}"),
        }
    }
    bail!("conversion stopped unexpectedly")
}

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "omnivore".to_string());
    input.with_file_name(format!("{stem}-markdown.zip"))
}
