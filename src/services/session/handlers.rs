//! Event handlers for the session engine
//!
//! Each handler applies one command or fix to the session state. All of
//! them run on the engine's single task, so every mutation of
//! distance/route/state is atomic with respect to the others.

use super::{forward_fixes, Command, SessionEngine, SessionError, SessionSnapshot, StopOutcome};
use crate::domain::geo;
use crate::domain::types::{epoch_ms, RawFix, SessionState};
use crate::domain::walk::{generate_walk_id, Walk};
use crate::services::validator;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

impl SessionEngine {
    /// Dispatch a control command and send its reply
    pub(crate) async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Start { pet_id, reply } => {
                let result = self.handle_start(pet_id).await;
                let _ = reply.send(result);
            }
            Command::Pause { reply } => {
                self.handle_pause();
                let _ = reply.send(());
            }
            Command::Resume { reply } => {
                let result = self.handle_resume().await;
                let _ = reply.send(result);
            }
            Command::Stop { reply } => {
                let _ = reply.send(self.handle_stop());
            }
        }
    }

    /// Idle -> Tracking. A failed subscription (permission denied, no
    /// location service) leaves the session Idle; starting over an active
    /// session is an idempotent no-op that keeps the in-progress route.
    async fn handle_start(&mut self, pet_id: Option<String>) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            debug!(state = %self.state, "start_ignored_session_active");
            return Ok(());
        }

        self.open_subscription().await?;

        self.state = SessionState::Tracking;
        self.pet_id = pet_id;
        self.started_at_ms = epoch_ms();
        self.distance_m = 0.0;
        self.tracked_ms = 0;
        self.segment_started = Some(Instant::now());
        self.route.reset();
        self.metrics.record_session_started();

        info!(
            started_at_ms = %self.started_at_ms,
            pet_id = ?self.pet_id,
            "walk_started"
        );
        self.publish();
        Ok(())
    }

    /// Tracking -> Paused: cancel the fix subscription and freeze duration
    fn handle_pause(&mut self) {
        if self.state != SessionState::Tracking {
            debug!(state = %self.state, "pause_ignored");
            return;
        }

        self.cancel_subscription();
        if let Some(segment) = self.segment_started.take() {
            self.tracked_ms += segment.elapsed().as_millis() as i64;
        }
        self.state = SessionState::Paused;

        info!(
            duration_ms = %self.tracked_ms,
            distance_m = format_args!("{:.1}", self.distance_m),
            route_len = %self.route.len(),
            "walk_paused"
        );
        self.publish();
    }

    /// Paused -> Tracking. Fixes delivered while paused were dropped, not
    /// queued; a failed re-subscription keeps the session Paused so Resume
    /// can be retried.
    async fn handle_resume(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Paused {
            debug!(state = %self.state, "resume_ignored");
            return Ok(());
        }

        self.open_subscription().await?;

        self.segment_started = Some(Instant::now());
        self.state = SessionState::Tracking;

        info!(duration_ms = %self.tracked_ms, "walk_resumed");
        self.publish();
        Ok(())
    }

    /// Tracking/Paused -> Idle: assemble the walk record, hand it to the
    /// store, and reset. Stop from Idle is a no-op.
    fn handle_stop(&mut self) -> Option<StopOutcome> {
        if self.state == SessionState::Idle {
            debug!("stop_ignored_idle");
            return None;
        }

        self.cancel_subscription();
        if let Some(segment) = self.segment_started.take() {
            self.tracked_ms += segment.elapsed().as_millis() as i64;
        }

        let walk = Walk {
            id: generate_walk_id(),
            pet_id: self.pet_id.take(),
            start_time: self.started_at_ms,
            end_time: Some(epoch_ms()),
            distance_meters: self.distance_m as f32,
            duration_ms: self.tracked_ms,
            route: self.route.snapshot(),
        };

        let persisted = self.store.save(&walk);
        match &persisted {
            Ok(()) => {
                self.metrics.record_walk_saved();
                info!(
                    walk_id = %walk.id,
                    distance_m = format_args!("{:.1}", walk.distance_meters),
                    duration_ms = %walk.duration_ms,
                    route_len = %walk.route.len(),
                    "walk_saved"
                );
            }
            Err(e) => {
                self.metrics.record_walk_save_failure();
                error!(walk_id = %walk.id, error = %e, "walk_save_failed");
            }
        }

        // The recording session is over regardless of the save outcome
        self.reset();
        self.publish();
        Some(StopOutcome { walk, persisted })
    }

    /// Apply one fix: validate, then grow route and distance
    pub(crate) fn handle_fix(&mut self, generation: u64, fix: RawFix) {
        if generation != self.generation || !self.state.is_tracking() {
            debug!(generation = %generation, state = %self.state, "fix_discarded_stale");
            return;
        }

        let process_start = Instant::now();
        match validator::validate(&fix, self.route.last(), self.started_at_ms) {
            Ok(point) => {
                if let Some(last) = self.route.last() {
                    self.distance_m += geo::haversine_m(last, &point);
                }
                self.route.append(point);
                self.metrics.record_fix_accepted(process_start.elapsed().as_micros() as u64);

                debug!(
                    route_len = %self.route.len(),
                    distance_m = format_args!("{:.1}", self.distance_m),
                    "fix_accepted"
                );
                self.publish();
            }
            Err(rejection) => {
                // Noisy GPS is normal; count it and move on
                self.metrics.record_fix_rejected();
                debug!(reason = %rejection.as_str(), "fix_rejected");
            }
        }
    }

    /// Periodic tick while Tracking: republish the live duration
    pub(crate) fn handle_tick(&mut self) {
        self.publish();
    }

    /// Open a fix subscription and spawn its forward task
    async fn open_subscription(&mut self) -> Result<(), SessionError> {
        let stream = self.source.subscribe().await.map_err(|e| {
            warn!(error = %e, "fix_subscription_failed");
            SessionError::from(e)
        })?;

        self.generation += 1;
        let task =
            forward_fixes(stream, self.generation, self.msg_tx.clone(), self.metrics.clone());
        self.fix_task = Some(tokio::spawn(task));
        Ok(())
    }

    /// Abort the forward task and invalidate anything it already queued
    pub(crate) fn cancel_subscription(&mut self) {
        if let Some(task) = self.fix_task.take() {
            task.abort();
        }
        self.generation += 1;
    }

    /// Back to a pristine Idle session
    fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.pet_id = None;
        self.started_at_ms = 0;
        self.distance_m = 0.0;
        self.tracked_ms = 0;
        self.segment_started = None;
        self.route.reset();
    }

    fn current_duration_ms(&self) -> i64 {
        let live = self.segment_started.map(|s| s.elapsed().as_millis() as i64).unwrap_or(0);
        self.tracked_ms + live
    }

    /// Publish the current snapshot to observers
    fn publish(&self) {
        let started_at_ms =
            if self.state == SessionState::Idle { None } else { Some(self.started_at_ms) };
        self.snapshot_tx.send_replace(SessionSnapshot {
            state: self.state,
            distance_m: self.distance_m,
            duration_ms: self.current_duration_ms(),
            route_len: self.route.len(),
            started_at_ms,
        });
    }
}
