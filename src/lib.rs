//! TrackTail walk-tracking engine
//!
//! Records dog walks from a stream of GPS fixes: a single-writer session
//! actor validates fixes, accumulates haversine distance, buffers the
//! route, and commits each finished walk to a JSON-backed store.
//!
//! Module structure:
//! - `domain/` - Core business types (Walk, WalkPoint, RawFix, Pet)
//! - `io/` - External interfaces (fix source, walk/pet stores)
//! - `services/` - Business logic (session engine, validator, route buffer)
//! - `infra/` - Infrastructure (Config, Metrics)

pub mod domain;
pub mod infra;
pub mod io;
pub mod services;
