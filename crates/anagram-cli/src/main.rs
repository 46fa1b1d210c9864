use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anagram_core::Token;
use anagram_engine::{
    CancelToken, Coordinator, FileCheckpointStore, FileSink, RunConfig, RunMode, RunStatus, Sink,
};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "anagrams", about = "Enumerate every distinct anagram of a word")]
struct Cli {
    /// Word whose anagrams are enumerated.
    word: Option<String>,
    /// Continue a cancelled run from its checkpoints and existing output.
    #[arg(short, long)]
    resume: bool,
    /// Output file, one anagram per line (overrides the configuration).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Directory holding the per-worker checkpoint files (overrides the configuration).
    #[arg(long)]
    state_dir: Option<PathBuf>,
    /// Optional YAML run configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write the final run report as JSON.
    #[arg(long)]
    summary: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    if let Some(out) = cli.out {
        config.output.sink = out;
    }
    if let Some(dir) = cli.state_dir {
        config.output.state_dir = dir;
    }

    let token = Token::new(cli.word.unwrap_or_default())?;
    let coordinator = Coordinator::new(token, config.clone());
    let plan = coordinator.plan()?;
    info!(
        "Searching for all {} possible anagrams in '{}'...",
        plan.total_anagrams,
        coordinator.token().as_str()
    );

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        warn!("Canceling...");
        handler_token.cancel();
    })?;

    let mode = if cli.resume {
        RunMode::Resume
    } else {
        RunMode::Fresh
    };
    let mut sink = match mode {
        RunMode::Resume => {
            let sink = FileSink::append(&config.output.sink)?;
            info!("Resuming at {} anagrams...", sink.existing_lines()?);
            sink
        }
        RunMode::Fresh => FileSink::create(&config.output.sink)?,
    };
    let store = FileCheckpointStore::new(
        &config.output.state_dir,
        config.output.state_prefix.as_str(),
    );

    let report = coordinator.run(&mut sink, &store, &cancel, mode)?;
    match report.status {
        RunStatus::Cancelled => {
            info!("Canceled successfully");
            info!(
                "Current progress: {} / {} ({:.2}%) anagrams found",
                report.found,
                report.plan.total_anagrams,
                report.found_percent()
            );
        }
        RunStatus::Completed => {
            info!(found = report.found, path = %sink.path().display(), "Done!");
        }
    }

    if let Some(path) = cli.summary {
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
    }
    Ok(())
}
