//! CLI entrypoint for superposition
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use superposition_application::{
    CompositeEventSink, EventSink, HypothesisExplorer, ModelGateway, NoProgress,
    ProgressNotifier, RunSuperpositionUseCase,
};
use superposition_domain::ContextBus;
use superposition_infrastructure::{
    ConfigLoader, FileConfig, JsonlEventSink, TracingEventSink, build_provider,
};
use superposition_presentation::{
    Cli, ConsoleFormatter, OutputFormatter, ProgressReporter,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration before logging so [logging] can take effect
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    if cli.show_config {
        println!("Configuration sources (in priority order):");
        for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("{}", line);
        }
        println!();
        println!("Effective configuration:");
        println!(
            "{}",
            toml::to_string_pretty(&config).context("Failed to render configuration")?
        );
        return Ok(ExitCode::SUCCESS);
    }

    let _log_guard = init_tracing(cli.verbose, &config);
    info!("Starting superposition");

    let warnings = config.check()?;
    for issue in &warnings {
        warn!("{}", issue);
        if !cli.quiet {
            eprintln!("{}", issue);
        }
    }

    let registry = Arc::new(config.registry());
    if cli.list_capabilities {
        println!("{}", ConsoleFormatter::format_capabilities(&registry.list_all()));
        return Ok(ExitCode::SUCCESS);
    }

    let Some(query) = cli.to_query()? else {
        bail!("A query is required. Run with --help for usage.");
    };

    // === Dependency Injection ===
    let events = build_event_sink(&cli, &config);
    let provider = build_provider(&config.provider_settings());
    let gateway = Arc::new(
        ModelGateway::new(provider, config.gateway_policy()).with_event_sink(events.clone()),
    );

    let mut params = config.explorer_params();
    if cli.share_context {
        params = params.with_share_context(true);
    }

    let cancellation = CancellationToken::new();
    tokio::spawn({
        let cancellation = cancellation.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancellation.cancel();
            }
        }
    });

    let explorer = HypothesisExplorer::new(gateway, registry, Arc::new(ContextBus::new()), params)
        .with_event_sink(events.clone())
        .with_cancellation(cancellation);
    let use_case = RunSuperpositionUseCase::new(explorer, config.aggregator())
        .with_event_sink(events);

    let progress: Box<dyn ProgressNotifier> = if cli.quiet {
        Box::new(NoProgress)
    } else {
        Box::new(ProgressReporter::new())
    };

    match use_case
        .execute_with_progress(query.clone(), progress.as_ref())
        .await
    {
        Ok(output) => {
            println!("{}", ConsoleFormatter.render(cli.output, &query, &output));
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprint!("{}", ConsoleFormatter::format_failure(&e));
            let code = if e.is_caller_error() { 2 } else { 1 };
            Ok(ExitCode::from(code))
        }
    }
}

/// Initialize logging from the verbosity level, `RUST_LOG` and `[logging]`.
///
/// The returned guard flushes the log file on drop and must be held until exit.
fn init_tracing(verbose: u8, config: &FileConfig) -> Option<WorkerGuard> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let (file_layer, guard) = match config.logging.log_dir_path() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "superposition.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    guard
}

/// Tracing events always; JSONL events when a file is configured.
fn build_event_sink(cli: &Cli, config: &FileConfig) -> Arc<dyn EventSink> {
    let tracing_sink: Arc<dyn EventSink> = Arc::new(TracingEventSink::new());
    let mut sink = CompositeEventSink::new(vec![tracing_sink]);

    let events_path = cli
        .events_file
        .clone()
        .or_else(|| config.logging.events_path());
    if let Some(path) = events_path {
        match JsonlEventSink::new(&path) {
            Some(jsonl) => {
                info!(path = %jsonl.path().display(), "Writing events");
                sink.push(Arc::new(jsonl));
            }
            None => warn!(path = %path.display(), "Event log disabled"),
        }
    }

    Arc::new(sink)
}
