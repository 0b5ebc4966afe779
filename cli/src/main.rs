//! Quill CLI: replay a prompt panel script against an in-memory page.
//!
//! ```text
//! quill [--no-delay] [SCRIPT]
//! ```
//!
//! Reads JSON-lines steps from `SCRIPT` (or stdin when omitted or `-`) and
//! prints whatever `show` and `submit` steps produce. Logs never go to stdout;
//! they are written to `~/.quill/logs/quill.log` when that file can be opened.

mod script;

use anyhow::{Context, Result};
use clap::Parser;
use std::{
    fs::{self, File, OpenOptions},
    io::{self, Read},
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use quill_config::{ConfigError, QuillConfig};
use quill_types::Settings;

use crate::script::{Runner, parse_script};

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_quill_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // Stdout carries script output; no logs is better than mixed output.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_quill_log_file() -> (Option<(PathBuf, File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in quill_log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn quill_log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.quill/logs/quill.log
    if let Some(config_path) = QuillConfig::path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("quill.log"));
    }

    // Fallback: ./.quill/logs/quill.log
    candidates.push(PathBuf::from(".quill").join("logs").join("quill.log"));

    candidates
}

#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(about = "Replay a prompt panel script against an in-memory page")]
struct Args {
    /// Skip the startup wait for the host editor
    #[arg(long)]
    no_delay: bool,
    /// JSON-lines script; stdin when omitted or `-`
    script: Option<PathBuf>,
}

impl Args {
    fn script_path(&self) -> Option<&PathBuf> {
        self.script.as_ref().filter(|path| path.as_os_str() != "-")
    }
}

fn load_settings() -> (Settings, Option<ConfigError>) {
    match QuillConfig::load() {
        Ok(Some(config)) => (config.resolve(), None),
        Ok(None) => (QuillConfig::default().resolve(), None),
        Err(err) => (QuillConfig::default().resolve(), Some(err)),
    }
}

fn read_script(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display())),
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("failed to read script from stdin")?;
            Ok(input)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (mut settings, config_error) = load_settings();
    init_tracing(settings.debug);
    if let Some(err) = config_error {
        tracing::warn!(path = %err.path().display(), "Using default settings: {err}");
    }
    if args.no_delay {
        settings.timings.startup_delay = Duration::ZERO;
    }

    let input = read_script(args.script_path())?;
    let steps = parse_script(&input)?;
    tracing::info!(steps = steps.len(), "running script");

    let mut runner = Runner::new(settings);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    runner.run(&steps, &mut out).await?;
    Ok(())
}
