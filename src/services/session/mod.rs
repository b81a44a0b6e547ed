//! Walk session engine - lifecycle orchestration and fix ingestion
//!
//! The engine is the central event processor for one walk session. It is a
//! single-writer actor: control commands, the duration tick and the fix
//! stream are all serialized through one bounded channel plus a
//! `tokio::select!` loop, so no partial update of distance/route/state is
//! ever observable.
//!
//! Coordinates:
//! - Session state machine (Idle / Tracking / Paused)
//! - Fix validation and distance/route accumulation
//! - Walk record assembly and handoff to the walk store
//! - Live snapshot publication for observers

mod handlers;

use crate::domain::types::{RawFix, SessionState};
use crate::domain::walk::Walk;
use crate::infra::config::Config;
use crate::infra::metrics::Metrics;
use crate::io::fix_source::{FixSource, FixStream, LocationError};
use crate::io::store::{StoreError, WalkStore};
use crate::services::route::RouteBuffer;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tracing::warn;

/// Errors returned by session control operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location services unavailable")]
    LocationUnavailable,
    #[error("session engine is not running")]
    EngineClosed,
}

impl From<LocationError> for SessionError {
    fn from(e: LocationError) -> Self {
        match e {
            LocationError::PermissionDenied => SessionError::PermissionDenied,
            LocationError::Unavailable => SessionError::LocationUnavailable,
        }
    }
}

/// Result of a Stop: the committed walk plus the persistence outcome.
///
/// The walk is returned even when `persisted` failed so the caller can
/// retry `WalkStore::save` with the same record; the session itself has
/// already reset to Idle either way.
#[derive(Debug)]
pub struct StopOutcome {
    pub walk: Walk,
    pub persisted: Result<(), StoreError>,
}

/// Live view of the session, published on every mutation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub distance_m: f64,
    /// Tracked duration, paused intervals excluded
    pub duration_ms: i64,
    pub route_len: usize,
    pub started_at_ms: Option<i64>,
}

/// Control commands with oneshot replies
pub(crate) enum Command {
    Start { pet_id: Option<String>, reply: oneshot::Sender<Result<(), SessionError>> },
    Pause { reply: oneshot::Sender<()> },
    Resume { reply: oneshot::Sender<Result<(), SessionError>> },
    Stop { reply: oneshot::Sender<Option<StopOutcome>> },
}

/// Everything the engine consumes, serialized on one channel.
///
/// Fixes carry the subscription generation they came from; a fix from a
/// stale generation (anything before the latest Pause/Stop) is discarded
/// even if it was already queued when the subscription was cancelled.
pub(crate) enum Msg {
    Control(Command),
    Fix { generation: u64, fix: RawFix },
}

/// Single-writer actor owning all mutable session state
pub struct SessionEngine {
    pub(crate) state: SessionState,
    pub(crate) pet_id: Option<String>,
    pub(crate) started_at_ms: i64,
    pub(crate) distance_m: f64,
    /// Completed tracked milliseconds from earlier Tracking segments
    pub(crate) tracked_ms: i64,
    /// Start of the current Tracking segment, None while Idle/Paused
    pub(crate) segment_started: Option<Instant>,
    pub(crate) route: RouteBuffer,
    /// Bumped on every subscribe/cancel; stale fixes fail the check
    pub(crate) generation: u64,
    pub(crate) fix_task: Option<JoinHandle<()>>,
    /// Sender side of the engine channel, handed to forward tasks
    pub(crate) msg_tx: mpsc::Sender<Msg>,
    pub(crate) source: Arc<dyn FixSource>,
    pub(crate) store: Arc<dyn WalkStore>,
    pub(crate) metrics: Arc<Metrics>,
    pub(crate) snapshot_tx: watch::Sender<SessionSnapshot>,
    tick_interval: Duration,
}

/// Cheap cloneable handle for controlling and observing the engine
#[derive(Clone)]
pub struct SessionHandle {
    msg_tx: mpsc::Sender<Msg>,
    snapshot_rx: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    /// Start a new walk session. Idempotent while a session is active.
    pub async fn start(&self, pet_id: Option<String>) -> Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        self.msg_tx
            .send(Msg::Control(Command::Start { pet_id, reply }))
            .await
            .map_err(|_| SessionError::EngineClosed)?;
        rx.await.map_err(|_| SessionError::EngineClosed)?
    }

    /// Pause tracking: halts fix intake and freezes duration. No-op
    /// outside Tracking.
    pub async fn pause(&self) -> Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        self.msg_tx
            .send(Msg::Control(Command::Pause { reply }))
            .await
            .map_err(|_| SessionError::EngineClosed)?;
        rx.await.map_err(|_| SessionError::EngineClosed)
    }

    /// Resume a paused session. No-op outside Paused.
    pub async fn resume(&self) -> Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        self.msg_tx
            .send(Msg::Control(Command::Resume { reply }))
            .await
            .map_err(|_| SessionError::EngineClosed)?;
        rx.await.map_err(|_| SessionError::EngineClosed)?
    }

    /// Stop the session, committing a walk record. Returns `None` when no
    /// session was active.
    pub async fn stop(&self) -> Result<Option<StopOutcome>, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.msg_tx
            .send(Msg::Control(Command::Stop { reply }))
            .await
            .map_err(|_| SessionError::EngineClosed)?;
        rx.await.map_err(|_| SessionError::EngineClosed)
    }

    /// Current published snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Subscribe to snapshot updates (observer interface)
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_rx.clone()
    }
}

/// Create the engine and spawn its actor task.
///
/// The task runs until the process exits; abort the returned handle for an
/// immediate teardown.
pub fn start_session_engine(
    config: &Config,
    source: Arc<dyn FixSource>,
    store: Arc<dyn WalkStore>,
    metrics: Arc<Metrics>,
) -> (SessionHandle, JoinHandle<()>) {
    let (msg_tx, msg_rx) = mpsc::channel(config.fix_channel_capacity());
    let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::default());

    let engine = SessionEngine {
        state: SessionState::Idle,
        pet_id: None,
        started_at_ms: 0,
        distance_m: 0.0,
        tracked_ms: 0,
        segment_started: None,
        route: RouteBuffer::new(),
        generation: 0,
        fix_task: None,
        msg_tx: msg_tx.clone(),
        source,
        store,
        metrics,
        snapshot_tx,
        tick_interval: Duration::from_millis(config.tick_interval_ms()),
    };

    let handle = SessionHandle { msg_tx, snapshot_rx };
    let task = tokio::spawn(engine.run(msg_rx));
    (handle, task)
}

impl SessionEngine {
    /// Consume messages until the channel closes. The tick branch is
    /// enabled only while Tracking, so duration is never advanced (and no
    /// snapshot churn happens) while Idle or Paused.
    pub(crate) async fn run(mut self, mut msg_rx: mpsc::Receiver<Msg>) {
        let mut tick = interval(self.tick_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let tracking = self.state.is_tracking();
            tokio::select! {
                msg = msg_rx.recv() => {
                    match msg {
                        Some(Msg::Control(cmd)) => self.handle_command(cmd).await,
                        Some(Msg::Fix { generation, fix }) => self.handle_fix(generation, fix),
                        None => break, // Channel closed
                    }
                }
                _ = tick.tick(), if tracking => {
                    self.handle_tick();
                }
            }
        }

        self.cancel_subscription();
    }
}

/// Pump fixes from one subscription into the engine channel.
///
/// `try_send` keeps the source decoupled from engine backpressure; a full
/// queue drops the fix (it is only one GPS sample) and counts it.
pub(crate) async fn forward_fixes(
    mut stream: FixStream,
    generation: u64,
    msg_tx: mpsc::Sender<Msg>,
    metrics: Arc<Metrics>,
) {
    while let Some(fix) = stream.recv().await {
        match msg_tx.try_send(Msg::Fix { generation, fix }) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                metrics.record_fix_dropped();
                warn!("fix_dropped_queue_full");
            }
            Err(TrySendError::Closed(_)) => break,
        }
    }
}
