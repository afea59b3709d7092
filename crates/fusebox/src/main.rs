use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use fusebox::config::LoggingConfig;
use fusebox::Config;
use fusebox::Engine;
use fusebox::SceneActuator;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::oneshot;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;

/// House power budget daemon
#[derive(Debug, Parser)]
#[command(name = "fuseboxd", version)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "fusebox.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    init_tracing(&config.logging);

    info!("fuseboxd starting");
    info!("Loaded config from: {}", args.config.display());

    let scene = Arc::new(SceneActuator::from_config(&config.fixtures));
    info!("Scene has {} fixtures", scene.len());

    let engine = Arc::new(Engine::new(&config.power, scene));

    // Stand-in for the presentation clients: log every broadcast
    let mut events = engine.subscribe();
    let event_task = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => info!("[{}] {:?}", event, event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event logger lagged, skipped {} events", skipped)
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let drain_task = config.power.drain.clone().map(|drain| {
        let engine = engine.clone();
        info!(
            "Ambient drain: {} every {}ms",
            drain.amount, drain.interval_ms
        );
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(drain.interval_ms));
            loop {
                interval.tick().await;
                if !engine.consume_power(drain.amount) {
                    debug!("Ambient drain idle: no power left");
                }
            }
        })
    });

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let api_task = config.api.clone().map(|api| {
        let engine = engine.clone();
        tokio::spawn(async move {
            if let Err(e) = fusebox::api::serve(api.listen, api.port, engine, shutdown_rx).await {
                error!("HTTP API server failed: {}", e);
            }
        })
    });
    if api_task.is_none() {
        info!("No [api] section configured, HTTP API disabled");
    }

    info!("Press Ctrl+C to exit");

    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal");
        }
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
        }
    }

    if let Some(task) = api_task {
        let _ = shutdown_tx.send(());
        if let Err(e) = task.await {
            error!("HTTP API task failed: {}", e);
        }
    }
    if let Some(task) = drain_task {
        task.abort();
    }
    event_task.abort();

    info!("fuseboxd shutdown complete (power={})", engine.power());

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = Targets::new()
        .with_default(LevelFilter::from(logging.level))
        .with_targets(
            logging
                .overrides
                .iter()
                .map(|(target, level)| (target.clone(), LevelFilter::from(*level))),
        );

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();
}
