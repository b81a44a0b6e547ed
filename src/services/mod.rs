//! Services - business logic and state management
//!
//! This module contains the core walk-tracking logic:
//! - `session` - Single-writer session engine (state machine + accumulators)
//! - `validator` - Pure fix validation
//! - `route` - Append-only route buffer

pub mod route;
pub mod session;
pub mod validator;

// Re-export commonly used types
pub use route::RouteBuffer;
pub use session::{
    start_session_engine, SessionError, SessionHandle, SessionSnapshot, StopOutcome,
};
pub use validator::{validate, FixRejection};
