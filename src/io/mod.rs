//! IO modules - external system interfaces
//!
//! This module contains all external IO boundaries:
//! - `fix_source` - Injected asynchronous source of raw GPS fixes
//! - `store` - Walk persistence (single JSON document)
//! - `pets` - Pet profile persistence

pub mod fix_source;
pub mod pets;
pub mod store;

// Re-export commonly used types
pub use fix_source::{FixSource, FixStream, LocationError, ReplayFixSource};
pub use pets::JsonPetStore;
pub use store::{JsonWalkStore, StoreError, WalkStore};
