//! Domain module
//!
//! Submission state and the values it carries.

pub mod defaults;
pub mod state;

pub use defaults::{default_fields, DefaultField, DEFAULT_FIELDS};
pub use state::{
    BookingId, Confirmation, NotificationStatus, Phase, SubmissionState, TransitionError,
};
