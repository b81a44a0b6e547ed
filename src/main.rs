//! TrackTail - walk-tracking session engine
//!
//! Runs the session engine against a replayed GPS fix stream and persists
//! completed walks to the JSON walk store. Recording runs until Ctrl+C:
//! the engine then stops, commits the walk, and the process exits.
//!
//! Module structure:
//! - `domain/` - Core business types (Walk, WalkPoint, RawFix, Pet)
//! - `io/` - External interfaces (fix source, walk/pet stores)
//! - `services/` - Business logic (session engine, validator, route buffer)
//! - `infra/` - Infrastructure (Config, Metrics)

use clap::Parser;
use std::sync::Arc;
use tracktail::infra::{Config, Metrics};
use tracktail::io::{JsonWalkStore, ReplayFixSource, WalkStore};
use tracktail::services::start_session_engine;
use tracing::{error, info};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// TrackTail - GPS walk recording engine
#[derive(Parser, Debug)]
#[command(name = "tracktail", version, about)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "config/dev.toml")]
    config: String,

    /// Pet id to attach to the recorded walk
    #[arg(long)]
    pet: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with configurable level via RUST_LOG env var
    // Default: INFO, use RUST_LOG=debug for per-fix visibility
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .init();

    info!("tracktail starting");

    let args = Args::parse();
    let config = Config::load_from_path(&args.config);

    info!(
        config_file = %config.config_file(),
        walks_file = %config.walks_file(),
        replay_file = %config.replay_file(),
        replay_interval_ms = %config.replay_interval_ms(),
        tick_interval_ms = %config.tick_interval_ms(),
        "config_loaded"
    );

    let source = Arc::new(ReplayFixSource::new(config.replay_file(), config.replay_interval_ms()));
    let store = Arc::new(JsonWalkStore::new(config.walks_file()));
    let metrics = Arc::new(Metrics::new());

    // Start metrics reporter
    let metrics_clone = metrics.clone();
    let metrics_interval = config.metrics_interval_secs();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(metrics_interval));
        loop {
            interval.tick().await;
            metrics_clone.report().log();
        }
    });

    // Start the session engine (main event processing loop)
    let (session, _engine_task) =
        start_session_engine(&config, source, store.clone(), metrics.clone());
    info!("session_engine_started");

    // Log live session snapshots as they change
    let mut snapshots = session.subscribe();
    tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let snap = snapshots.borrow().clone();
            info!(
                state = %snap.state,
                distance_m = format_args!("{:.1}", snap.distance_m),
                duration_ms = %snap.duration_ms,
                route_len = %snap.route_len,
                "session_snapshot"
            );
        }
    });

    session.start(args.pet).await?;
    info!("walk_recording_started");

    // Record until Ctrl+C, then commit the walk
    tokio::signal::ctrl_c().await.ok();
    info!("shutdown_signal_received");

    match session.stop().await? {
        Some(outcome) => {
            let started_at = chrono::DateTime::from_timestamp_millis(outcome.walk.start_time)
                .map(|dt| dt.to_rfc3339())
                .unwrap_or_else(|| outcome.walk.start_time.to_string());

            match outcome.persisted {
                Ok(()) => info!(
                    walk_id = %outcome.walk.id,
                    started_at = %started_at,
                    distance_m = format_args!("{:.1}", outcome.walk.distance_meters),
                    duration_ms = %outcome.walk.duration_ms,
                    route_len = %outcome.walk.route.len(),
                    "walk_committed"
                ),
                Err(e) => error!(
                    walk_id = %outcome.walk.id,
                    error = %e,
                    "walk_persist_failed"
                ),
            }

            let total_walks = store.list_all().map(|walks| walks.len()).unwrap_or(0);
            info!(total_walks = %total_walks, "walk_history");
        }
        None => info!("no_active_walk"),
    }

    info!("tracktail shutdown complete");
    Ok(())
}
