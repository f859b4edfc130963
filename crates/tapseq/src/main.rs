use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio::signal;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use seqmap::MappingStore;
use tapseq_engine::{
    Engine, EngineConfig, EnigoInjector, Injector, OverlaySink, StatusSink, SystemClipboard,
};

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Parser, Debug)]
#[command(name = "tapseq")]
#[command(about = "Key-sequence macro engine", long_about = None)]
struct Args {
    /// Path to the mapping document
    #[arg(short, long, default_value = "mappings.json")]
    config: PathBuf,

    /// Set the log level
    #[arg(short, long, value_enum)]
    log_level: Option<LogLevel>,
}

/// Overlay stand-in that mirrors the typed trail to the log
struct LogOverlay;

impl OverlaySink for LogOverlay {
    fn display(&self, text: &str) -> tapseq_engine::Result<()> {
        if text.is_empty() {
            debug!("trail cleared");
        } else {
            info!("trail: {text}");
        }
        Ok(())
    }
}

/// Status stand-in that logs capture transitions
struct LogStatus;

impl StatusSink for LogStatus {
    fn active_changed(&self, active: bool) -> tapseq_engine::Result<()> {
        if active {
            info!("capture enabled - press ctrl+shift+f12 to suspend");
        } else {
            info!("capture suspended - press ctrl+shift+f12 to resume");
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Only initialize tracing if RUST_LOG is set or log level is explicitly provided
    if std::env::var("RUST_LOG").is_ok() || args.log_level.is_some() {
        let log_level = match args.log_level.clone().unwrap_or(LogLevel::Info) {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };

        // Initialize tracing with custom format (no timestamps)
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .without_time()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            )
            .with(
                EnvFilter::from_default_env()
                    .add_directive(format!("tapseq_engine={log_level}").parse()?)
                    .add_directive(format!("seqmap={log_level}").parse()?)
                    .add_directive(format!("tapseq={log_level}").parse()?),
            )
            .init();
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    runtime.block_on(run(args))
}

async fn run(args: Args) -> Result<()> {
    info!("Loading mappings from: {:?}", args.config);
    let store = Arc::new(Mutex::new(MappingStore::load_or_default(&args.config)));

    let injector: Arc<Mutex<dyn Injector>> = Arc::new(Mutex::new(
        EnigoInjector::new().context("Failed to initialize the input backend")?,
    ));

    let engine = Engine::builder(store, injector)
        .with_config(EngineConfig::default())
        .with_overlay(Arc::new(LogOverlay))
        .with_status(Arc::new(LogStatus))
        .with_clipboard(Arc::new(SystemClipboard))
        .build(tokio::runtime::Handle::current());

    engine.start();
    info!("Listening for key sequences - press ctrl+shift+f12 to toggle capture");

    signal::ctrl_c()
        .await
        .context("Failed to install Ctrl+C handler")?;
    info!("Received Ctrl+C, shutting down...");
    Ok(())
}
