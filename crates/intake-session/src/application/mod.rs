//! Application layer
//!
//! Sequences field loading, validation, booking creation and notification.

pub mod error;
pub mod session;

pub use error::{IntakeError, IntakeResult, LOAD_FAILURE};
pub use session::IntakeSession;
