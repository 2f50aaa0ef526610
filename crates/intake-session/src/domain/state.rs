//! Submission State Aggregate
//!
//! One instance per mounted form. Every transition method checks the current
//! phase before touching anything, so a refused transition leaves the state
//! exactly as it was.

use intake_schema::{FieldDefinition, ValidationErrors};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Submission state aggregate
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SubmissionState {
    phase: Phase,
    fields: Vec<FieldDefinition>,
    validation_errors: ValidationErrors,
    booking_id: Option<BookingId>,
    notification_status: Option<NotificationStatus>,
    last_error: Option<String>,
}

impl SubmissionState {
    /// Fresh state for a newly mounted form
    pub fn new() -> Self {
        Self {
            phase: Phase::Loading,
            fields: vec![],
            validation_errors: ValidationErrors::default(),
            booking_id: None,
            notification_status: None,
            last_error: None,
        }
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub fn phase(&self) -> Phase { self.phase }
    pub fn fields(&self) -> &[FieldDefinition] { &self.fields }
    pub fn validation_errors(&self) -> &ValidationErrors { &self.validation_errors }
    pub fn booking_id(&self) -> Option<&BookingId> { self.booking_id.as_ref() }
    pub fn notification_status(&self) -> Option<NotificationStatus> { self.notification_status }
    pub fn last_error(&self) -> Option<&str> { self.last_error.as_deref() }
    pub fn is_terminal(&self) -> bool { self.phase.is_terminal() }

    /// Confirmation details, present only once confirmed
    pub fn confirmation(&self) -> Option<Confirmation> {
        match (&self.booking_id, self.notification_status) {
            (Some(booking_id), Some(notification)) if self.phase == Phase::Confirmed => {
                Some(Confirmation {
                    booking_id: booking_id.clone(),
                    notification,
                })
            }
            _ => None,
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Field definitions resolved, from the store or the defaults
    pub fn fields_resolved(&mut self, fields: Vec<FieldDefinition>) -> Result<(), TransitionError> {
        self.require(Phase::Loading, "resolve fields")?;
        self.fields = fields;
        self.phase = Phase::Ready;
        Ok(())
    }

    pub fn load_failed(&mut self, message: impl Into<String>) -> Result<(), TransitionError> {
        self.require(Phase::Loading, "fail loading")?;
        self.fail(message);
        Ok(())
    }

    /// Record a failed validation; the form stays editable
    pub fn reject(&mut self, errors: ValidationErrors) -> Result<(), TransitionError> {
        self.require(Phase::Ready, "reject input")?;
        self.validation_errors = errors;
        Ok(())
    }

    pub fn begin_submit(&mut self) -> Result<(), TransitionError> {
        self.require(Phase::Ready, "submit")?;
        self.validation_errors = ValidationErrors::default();
        self.phase = Phase::Submitting;
        Ok(())
    }

    pub fn booking_failed(&mut self, message: impl Into<String>) -> Result<(), TransitionError> {
        self.require(Phase::Submitting, "fail booking")?;
        self.fail(message);
        Ok(())
    }

    pub fn confirm(
        &mut self,
        booking_id: BookingId,
        notification: NotificationStatus,
    ) -> Result<(), TransitionError> {
        self.require(Phase::Submitting, "confirm")?;
        self.booking_id = Some(booking_id);
        self.notification_status = Some(notification);
        self.phase = Phase::Confirmed;
        Ok(())
    }

    // =========================================================================
    // Private
    // =========================================================================

    fn require(&self, phase: Phase, action: &'static str) -> Result<(), TransitionError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(TransitionError { phase: self.phase, action })
        }
    }

    fn fail(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
        self.phase = Phase::Failed;
    }
}

impl Default for SubmissionState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Supporting Types
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Loading,
    Ready,
    Submitting,
    Confirmed,
    Failed,
}

impl Phase {
    /// Confirmed and Failed end the session; a new one needs a remount
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Submitting => "submitting",
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of the confirmation email
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Sent,
    /// No recipient address was submitted
    Skipped,
    DeliveryFailed,
}

impl NotificationStatus {
    /// Line shown under the QR code
    pub fn status_line(&self) -> &'static str {
        match self {
            Self::Sent => "Your booking is confirmed. A confirmation email is on its way.",
            Self::Skipped => "Your booking is confirmed.",
            Self::DeliveryFailed => {
                "Your booking is confirmed, but we could not send the confirmation email."
            }
        }
    }
}

/// Opaque identifier returned by the booking store
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(String);

impl BookingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for BookingId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// What the confirmation screen shows
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub booking_id: BookingId,
    pub notification: NotificationStatus,
}

impl Confirmation {
    pub fn status_line(&self) -> &'static str {
        self.notification.status_line()
    }

    /// String handed to the QR renderer
    pub fn qr_payload(&self) -> &str {
        self.booking_id.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot {action} while {phase}")]
pub struct TransitionError {
    pub phase: Phase,
    pub action: &'static str,
}
