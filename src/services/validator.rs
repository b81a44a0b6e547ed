//! Fix validation - filters raw location samples before they touch session state
//!
//! Pure function of (fix, last-accepted-point, session start): no side
//! effects, so it is trivially testable and the engine decides what to do
//! with rejections (count them and move on - noisy GPS is a normal
//! operating condition, not an error).

use crate::domain::types::RawFix;
use crate::domain::walk::WalkPoint;
use thiserror::Error;

/// Why a raw fix was not accepted into the route
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum FixRejection {
    #[error("latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    /// Fix is older than the last accepted point (clock skew / out-of-order
    /// delivery)
    #[error("timestamp {timestamp_ms} before last accepted {last_timestamp_ms}")]
    OutOfOrder { timestamp_ms: i64, last_timestamp_ms: i64 },
    /// First fix of a session predates the session start
    #[error("timestamp {timestamp_ms} before session start {session_start_ms}")]
    BeforeSessionStart { timestamp_ms: i64, session_start_ms: i64 },
}

impl FixRejection {
    /// Short label for metrics/log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            FixRejection::LatitudeOutOfRange(_) => "latitude_out_of_range",
            FixRejection::LongitudeOutOfRange(_) => "longitude_out_of_range",
            FixRejection::OutOfOrder { .. } => "out_of_order",
            FixRejection::BeforeSessionStart { .. } => "before_session_start",
        }
    }
}

/// Validate a raw fix against the last accepted point.
///
/// Range checks use `RangeInclusive::contains`, which also rejects NaN.
/// With no accepted point yet, `session_start_ms` is the ordering floor so
/// a committed route always starts at or after the walk's start time.
/// Equal timestamps are accepted (monotonically non-decreasing).
pub fn validate(
    fix: &RawFix,
    last_accepted: Option<&WalkPoint>,
    session_start_ms: i64,
) -> Result<WalkPoint, FixRejection> {
    if !(-90.0..=90.0).contains(&fix.latitude) {
        return Err(FixRejection::LatitudeOutOfRange(fix.latitude));
    }
    if !(-180.0..=180.0).contains(&fix.longitude) {
        return Err(FixRejection::LongitudeOutOfRange(fix.longitude));
    }

    match last_accepted {
        Some(last) if fix.timestamp_ms < last.timestamp_ms => Err(FixRejection::OutOfOrder {
            timestamp_ms: fix.timestamp_ms,
            last_timestamp_ms: last.timestamp_ms,
        }),
        None if fix.timestamp_ms < session_start_ms => Err(FixRejection::BeforeSessionStart {
            timestamp_ms: fix.timestamp_ms,
            session_start_ms,
        }),
        _ => Ok(WalkPoint {
            latitude: fix.latitude,
            longitude: fix.longitude,
            timestamp_ms: fix.timestamp_ms,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix(latitude: f64, longitude: f64, timestamp_ms: i64) -> RawFix {
        RawFix { latitude, longitude, timestamp_ms, accuracy: None }
    }

    fn accepted(timestamp_ms: i64) -> WalkPoint {
        WalkPoint { latitude: 52.0, longitude: 21.0, timestamp_ms }
    }

    #[test]
    fn test_accepts_valid_first_fix() {
        let point = validate(&fix(52.0, 21.0, 1000), None, 1000).unwrap();
        assert_eq!(point.latitude, 52.0);
        assert_eq!(point.longitude, 21.0);
        assert_eq!(point.timestamp_ms, 1000);
    }

    #[test]
    fn test_rejects_latitude_out_of_range() {
        assert_eq!(
            validate(&fix(90.1, 21.0, 1000), None, 0),
            Err(FixRejection::LatitudeOutOfRange(90.1))
        );
        assert_eq!(
            validate(&fix(-91.0, 21.0, 1000), None, 0),
            Err(FixRejection::LatitudeOutOfRange(-91.0))
        );
    }

    #[test]
    fn test_rejects_longitude_out_of_range() {
        assert_eq!(
            validate(&fix(52.0, 180.5, 1000), None, 0),
            Err(FixRejection::LongitudeOutOfRange(180.5))
        );
    }

    #[test]
    fn test_rejects_nan_coordinates() {
        assert!(validate(&fix(f64::NAN, 21.0, 1000), None, 0).is_err());
        assert!(validate(&fix(52.0, f64::NAN, 1000), None, 0).is_err());
    }

    #[test]
    fn test_accepts_boundary_coordinates() {
        assert!(validate(&fix(90.0, 180.0, 1000), None, 0).is_ok());
        assert!(validate(&fix(-90.0, -180.0, 1000), None, 0).is_ok());
    }

    #[test]
    fn test_rejects_out_of_order() {
        let last = accepted(5000);
        assert_eq!(
            validate(&fix(52.0, 21.0, 4999), Some(&last), 0),
            Err(FixRejection::OutOfOrder { timestamp_ms: 4999, last_timestamp_ms: 5000 })
        );
    }

    #[test]
    fn test_accepts_equal_timestamp() {
        // Monotonically non-decreasing, not strictly increasing
        let last = accepted(5000);
        assert!(validate(&fix(52.0, 21.0, 5000), Some(&last), 0).is_ok());
    }

    #[test]
    fn test_rejects_fix_before_session_start() {
        assert_eq!(
            validate(&fix(52.0, 21.0, 999), None, 1000),
            Err(FixRejection::BeforeSessionStart { timestamp_ms: 999, session_start_ms: 1000 })
        );
    }

    #[test]
    fn test_start_floor_only_applies_to_first_fix() {
        // Once a point is accepted, ordering is relative to it, not the start
        let last = accepted(500);
        assert!(validate(&fix(52.0, 21.0, 600), Some(&last), 1000).is_ok());
    }

    #[test]
    fn test_rejection_labels() {
        assert_eq!(FixRejection::LatitudeOutOfRange(91.0).as_str(), "latitude_out_of_range");
        assert_eq!(
            FixRejection::OutOfOrder { timestamp_ms: 1, last_timestamp_ms: 2 }.as_str(),
            "out_of_order"
        );
    }
}
