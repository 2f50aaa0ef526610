//! Outbound ports
//!
//! Hexagonal architecture: these are the interfaces that infrastructure must implement.

use async_trait::async_trait;
use intake_schema::{FieldDefinition, Record};

use crate::domain::BookingId;

/// Shown when the store gives no usable message
pub const GENERIC_BOOKING_FAILURE: &str = "Failed to create booking. Please try again.";

/// Source of admin-authored field definitions
#[async_trait]
pub trait FieldStore: Send + Sync {
    /// `Ok(None)` means no configuration exists, which is not an error
    async fn field_definitions(&self) -> Result<Option<Vec<FieldDefinition>>, StoreError>;
}

/// Booking persistence port
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn create_booking(&self, record: &Record) -> Result<BookingId, StoreError>;
}

/// Confirmation delivery port. Failures are never fatal to the caller.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_confirmation(
        &self,
        recipient: &str,
        record: &Record,
        booking_id: &BookingId,
    ) -> Result<(), NotifyError>;
}

/// Store error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Infrastructure failure: connection refused, store down
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store refused the operation with a reason meant for the user
    #[error("{0}")]
    Rejected(String),

    #[error("store call exceeded its deadline")]
    Timeout,

    #[error("unknown store error")]
    Unknown,
}

impl StoreError {
    /// Message suitable for the user, falling back to a generic one
    pub fn user_message(&self) -> String {
        match self {
            Self::Unavailable(message) | Self::Rejected(message) if !message.trim().is_empty() => {
                message.clone()
            }
            _ => GENERIC_BOOKING_FAILURE.to_string(),
        }
    }
}

/// Notifier error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("notification exceeded its deadline")]
    Timeout,
}
