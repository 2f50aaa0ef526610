//! Reservation Intake - Submission Sessions
//!
//! Drives one rendered booking form from field loading through booking
//! creation and best-effort confirmation.
//!
//! ## Architecture
//!
//! - **Domain Layer**: submission state, phases, booking identifiers, default fields
//! - **Ports Layer**: field store, booking store, notifier, and the use cases exposed to hosts
//! - **Application Layer**: the [`IntakeSession`] state machine
//! - **Infrastructure Layer**: in-memory adapters for development and tests
//!
//! ## Failure isolation
//!
//! Booking creation and confirmation delivery fail independently. Only
//! creation decides whether a session reaches [`Phase::Confirmed`]; a failed
//! notification downgrades the status line shown to the user and nothing
//! more.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ports;

// Re-exports for convenience
pub use application::{IntakeError, IntakeResult, IntakeSession};
pub use config::{ConfigError, IntakeConfig};
pub use domain::{
    default_fields, BookingId, Confirmation, NotificationStatus, Phase, SubmissionState,
    TransitionError, DEFAULT_FIELDS,
};
pub use infrastructure::{InMemoryBookingStore, InMemoryFieldStore, OutboxNotifier};
pub use ports::inbound::IntakeUseCases;
pub use ports::outbound::{BookingStore, FieldStore, Notifier, NotifyError, StoreError};
