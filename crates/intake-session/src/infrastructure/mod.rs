//! Infrastructure layer
//!
//! Concrete port implementations.

pub mod memory;

pub use memory::{InMemoryBookingStore, InMemoryFieldStore, OutboxNotifier, SentConfirmation, StoredBooking};
