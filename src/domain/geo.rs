//! Great-circle distance between GPS points

use crate::domain::walk::WalkPoint;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in meters between two points on a spherical Earth.
///
/// Good to well under 1% for walk-length segments, and O(1) per pair,
/// which is all the distance accumulator needs.
pub fn haversine_m(a: &WalkPoint, b: &WalkPoint) -> f64 {
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();
    let h = (dlat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}
