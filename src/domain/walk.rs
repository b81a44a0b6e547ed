//! Walk data model: the immutable record of one completed walk

use crate::domain::types::epoch_ms;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Generate a walk id: `walk_<epochMillis>_<4-digit-random>`.
///
/// Uniqueness is best-effort; a collision needs two walks committed in the
/// same millisecond with the same random suffix, which single-device use
/// makes astronomically unlikely.
pub fn generate_walk_id() -> String {
    format!("walk_{}_{}", epoch_ms(), rand::thread_rng().gen_range(1000..=9999))
}

/// A single accepted GPS point on a walk route.
///
/// Immutable once created; timestamps are monotonically non-decreasing
/// within one route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WalkPoint {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "timestamp")]
    pub timestamp_ms: i64,
}

/// Completed walk record.
///
/// Created only by the session engine on a Stop transition, then owned by
/// the walk store. Wire shape: `{id, petId, startTime, endTime, distance,
/// duration, route}` with `petId`/`endTime` omitted when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Walk {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pet_id: Option<String>,
    pub start_time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    /// Accumulated distance in meters
    #[serde(rename = "distance")]
    pub distance_meters: f32,
    /// Tracked duration in milliseconds (paused intervals excluded)
    #[serde(rename = "duration")]
    pub duration_ms: i64,
    #[serde(default)]
    pub route: Vec<WalkPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn sample_walk() -> Walk {
        Walk {
            id: "walk_1736012345678_4242".to_string(),
            pet_id: Some("pet_1736000000000_1111".to_string()),
            start_time: 1736012345678,
            end_time: Some(1736012945678),
            distance_meters: 1234.5,
            duration_ms: 600_000,
            route: vec![
                WalkPoint { latitude: 52.0, longitude: 21.0, timestamp_ms: 1736012345700 },
                WalkPoint { latitude: 52.0009, longitude: 21.0, timestamp_ms: 1736012347700 },
            ],
        }
    }

    #[test]
    fn test_walk_id_format() {
        let id = generate_walk_id();
        let parts: Vec<&str> = id.split('_').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "walk");
        assert!(parts[1].parse::<i64>().unwrap() > 0);
        let suffix: u32 = parts[2].parse().unwrap();
        assert!((1000..=9999).contains(&suffix));
    }

    #[test]
    fn test_walk_id_mostly_distinct() {
        // Uniqueness is best-effort, not guaranteed: within one millisecond
        // there are only 9000 suffixes, so allow a rare collision.
        let ids: HashSet<String> = (0..50).map(|_| generate_walk_id()).collect();
        assert!(ids.len() >= 45);
    }

    #[test]
    fn test_walk_wire_field_names() {
        let json = serde_json::to_value(sample_walk()).unwrap();

        assert_eq!(json["id"], "walk_1736012345678_4242");
        assert_eq!(json["petId"], "pet_1736000000000_1111");
        assert_eq!(json["startTime"], 1736012345678_i64);
        assert_eq!(json["endTime"], 1736012945678_i64);
        assert_eq!(json["distance"], 1234.5);
        assert_eq!(json["duration"], 600_000);
        assert_eq!(json["route"][0]["latitude"], 52.0);
        assert_eq!(json["route"][0]["timestamp"], 1736012345700_i64);
    }

    #[test]
    fn test_walk_optional_fields_omitted() {
        let mut walk = sample_walk();
        walk.pet_id = None;
        walk.end_time = None;

        let json = serde_json::to_string(&walk).unwrap();
        assert!(!json.contains("petId"));
        assert!(!json.contains("endTime"));

        let back: Walk = serde_json::from_str(&json).unwrap();
        assert_eq!(back, walk);
    }

    #[test]
    fn test_walk_round_trip() {
        let walk = sample_walk();
        let json = serde_json::to_string(&walk).unwrap();
        let back: Walk = serde_json::from_str(&json).unwrap();
        assert_eq!(back, walk);
    }

    #[test]
    fn test_walk_tolerates_unknown_fields() {
        let json = r#"{"id":"walk_1_1000","startTime":1,"distance":0.0,"duration":0,"route":[],"futureField":true}"#;
        let walk: Walk = serde_json::from_str(json).unwrap();
        assert_eq!(walk.id, "walk_1_1000");
        assert!(walk.pet_id.is_none());
        assert!(walk.route.is_empty());
    }
}
