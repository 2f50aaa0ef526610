//! Error types for intake sessions

use intake_schema::ValidationErrors;
use thiserror::Error;

use crate::domain::{BookingId, Phase};
use crate::ports::StoreError;

/// Message a session shows when its field list cannot be loaded
pub const LOAD_FAILURE: &str = "Failed to load form configuration";

/// Intake error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntakeError {
    /// Field store failed; the session is now terminal
    #[error("failed to load form configuration: {0}")]
    ConfigLoad(StoreError),

    /// Input rejected; the form stays editable
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// Booking store failed; carries the user-facing message
    #[error("{0}")]
    BookingCreation(String),

    #[error("form is not accepting submissions while {0}")]
    NotReady(Phase),

    #[error("form already loaded ({0})")]
    AlreadyLoaded(Phase),

    #[error("a submission is already in flight")]
    SubmissionInFlight,

    /// The session was torn down before the result could be applied
    #[error("session closed")]
    SessionClosed { booking_id: Option<BookingId> },
}

impl IntakeError {
    /// Whether the user can fix the input and submit again
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result type for intake sessions
pub type IntakeResult<T> = Result<T, IntakeError>;
