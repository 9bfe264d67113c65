mod runner;
mod script;

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use formhist_config::{resolve_config_path, AppConfig};
use formhist_history::{Form, FormSession, RecordingSink};

/// Edits a form from a command script with undo/redo history.
#[derive(Parser, Debug)]
#[command(name = "formhist", version, about)]
struct Cli {
    /// Command script to run. Reads commands from stdin when omitted.
    script: Option<PathBuf>,

    /// Config file (defaults to `formhist.json` next to the executable,
    /// or `FORMHIST_CONFIG`).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    tracing::info!("Starting formhist");

    let config_path = cli.config.unwrap_or_else(resolve_config_path);
    let config = AppConfig::load_or_create(&config_path);
    let form = Form::new(config.schema()?);
    let mut session = FormSession::new(form, config.history.clone(), RecordingSink::new());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = match &cli.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open script {}", path.display()))?;
            runner::run(&mut session, BufReader::new(file), &mut out)?
        }
        None => runner::run(&mut session, io::stdin().lock(), &mut out)?,
    };

    tracing::info!(
        commands = summary.commands,
        errors = summary.errors,
        "Script finished"
    );
    Ok(())
}
