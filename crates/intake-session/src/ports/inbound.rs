//! Inbound ports (Use case traits)
//!
//! Hexagonal architecture: what a rendering host can ask of a session.

use async_trait::async_trait;
use intake_schema::{FieldDefinition, Record};

use crate::application::IntakeResult;
use crate::domain::{Confirmation, SubmissionState};

/// Intake form use cases
#[async_trait]
pub trait IntakeUseCases: Send + Sync {
    /// Resolve the field list and compile its validator
    async fn load(&self) -> IntakeResult<()>;

    /// Validate, create the booking, then attempt the confirmation
    async fn submit(&self, record: Record) -> IntakeResult<Confirmation>;

    /// Fields in display order
    fn field_list(&self) -> Vec<FieldDefinition>;

    /// Snapshot of the current state
    fn state(&self) -> SubmissionState;
}
