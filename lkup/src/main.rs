mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, USAGE_HINT};
use lkup_core::config::LkupConfig;
use lkup_core::coordination::CancelSignal;
use lkup_core::enrichment::{LookupStages, process};
use lkup_core::error::ConfigError;
use lkup_core::logging::{default_color_mode, init_logging};
use lkup_core::logs::LogParser;
use lkup_core::progress::{LookupProgress, ProgressReporter};
use lkup_core::render::render_report;
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

/// Blocking reverse lookups that outlived their timeout are abandoned, not awaited.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(100);
const PROGRESS_INTERVAL: Duration = Duration::from_millis(250);
const NO_ENTRIES: &str = "No log entries to process, exiting";

/// How a run ended, short of a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// No log was chosen; the usage hint was printed.
    NoSelection,
    /// The log held nothing to look up.
    NoEntries,
    Reported,
}

impl Outcome {
    fn code(self) -> u8 {
        match self {
            Outcome::NoSelection | Outcome::Reported => 0,
            Outcome::NoEntries => 1,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.selection().is_some() {
        init_logging();
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("lkup: failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let outcome = runtime.block_on(run(cli));
    runtime.shutdown_timeout(SHUTDOWN_GRACE);

    match outcome {
        Ok(outcome) => ExitCode::from(outcome.code()),
        Err(e) => {
            eprintln!("lkup: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<LkupConfig> {
    match LkupConfig::load(cli.config.as_deref()) {
        Ok(cfg) => Ok(cfg),
        // Only an explicitly named config file has to exist.
        Err(ConfigError::Missing { path }) if cli.config.is_none() => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(LkupConfig::default())
        }
        Err(e) => Err(e).context("failed to load config"),
    }
}

async fn run(cli: Cli) -> Result<Outcome> {
    let Some(selection) = cli.selection() else {
        println!("{USAGE_HINT}");
        return Ok(Outcome::NoSelection);
    };

    let cfg = load_config(&cli)?;

    let client = reqwest::Client::builder()
        .timeout(cfg.remote_timeout())
        .build()
        .context("failed to build http client")?;

    let source = cli.source(&selection, &cfg.server);
    let text = source.read_to_string(&client).await?;

    let parser = LogParser::new(selection.format, cfg.exclude());
    let entries = parser.parse_lines(text.lines());
    if entries.is_empty() {
        println!("{NO_ENTRIES}");
        return Ok(Outcome::NoEntries);
    }

    let progress = Arc::new(LookupProgress::new());
    let stages = LookupStages::from_config(&cfg.lookup)?.with_progress(progress.clone());

    let cancel = CancelSignal::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let mut reporter = cli
        .show_progress(io::stderr().is_terminal())
        .then(|| ProgressReporter::new(PROGRESS_INTERVAL));
    if let Some(reporter) = reporter.as_mut() {
        reporter.start(progress.clone());
    }

    let batch = process(entries, &stages, &cancel).await;

    if let Some(reporter) = reporter {
        reporter.finish(&progress).await;
    }

    let batch = batch?;
    if !batch.complete {
        tracing::warn!(
            enriched = batch.hosts.len(),
            addresses = batch.perps.len(),
            "lookup interrupted, report is partial"
        );
    }

    let order = batch.presentation_order();
    print!(
        "{}",
        render_report(&order, &batch.hosts, &batch.perps, default_color_mode())
    );

    Ok(Outcome::Reported)
}
