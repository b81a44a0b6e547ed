//! Domain models - core walk-tracking types
//!
//! This module contains the canonical data types used throughout the engine:
//! - `Walk` / `WalkPoint` - the immutable record of a completed walk
//! - `RawFix` - raw location sample from a fix source
//! - `SessionState` - walk session lifecycle state
//! - `Pet` - pet profile referenced by walks
//! - `geo` - haversine distance used by the distance accumulator

pub mod geo;
pub mod pet;
pub mod types;
pub mod walk;

// Re-export commonly used types at module level
pub use pet::Pet;
pub use types::{epoch_ms, RawFix, SessionState};
pub use walk::{generate_walk_id, Walk, WalkPoint};
