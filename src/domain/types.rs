//! Shared types for the walk-tracking engine

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Get current epoch milliseconds
#[inline]
pub fn epoch_ms() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as i64
}

/// Raw location sample as delivered by a platform location service.
///
/// This is the untrusted input shape; it becomes a `WalkPoint` only after
/// passing the fix validator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFix {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp_ms: i64,
    /// Estimated horizontal accuracy in meters, when the platform reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f32>,
}

/// Walk session lifecycle state.
///
/// Stopping is transient: a Stop always lands back in `Idle` after the
/// walk record is emitted, so it is not represented as a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Tracking,
    Paused,
}

impl SessionState {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Tracking => "tracking",
            SessionState::Paused => "paused",
        }
    }

    #[inline]
    pub fn is_tracking(&self) -> bool {
        matches!(self, SessionState::Tracking)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
