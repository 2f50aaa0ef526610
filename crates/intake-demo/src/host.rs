//! Demo host
//!
//! Plays the part of the rendering layer: wires adapters, mounts a session,
//! logs its transitions, and presents the outcome.

use intake_schema::{FieldDefinition, Record};
use intake_session::{
    Confirmation, InMemoryBookingStore, InMemoryFieldStore, IntakeConfig, IntakeError,
    IntakeSession, IntakeUseCases, OutboxNotifier, SubmissionState,
};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// What the host shows after a run
#[derive(Debug)]
pub struct Report {
    pub state: SubmissionState,
    pub confirmation: Option<Confirmation>,
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Intake(#[from] IntakeError),
}

/// Load config, or fall back to defaults with a warning
pub fn load_config(path: Option<&Path>) -> IntakeConfig {
    let Some(path) = path else {
        return IntakeConfig::default();
    };
    IntakeConfig::load(path).unwrap_or_else(|err| {
        tracing::warn!(path = %path.display(), error = %err, "Config not loaded, using defaults");
        IntakeConfig::default()
    })
}

pub fn read_fields(path: &Path) -> Result<Vec<FieldDefinition>, HostError> {
    read_json(path)
}

pub fn read_record(path: &Path) -> Result<Record, HostError> {
    read_json(path)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, HostError> {
    let content = std::fs::read_to_string(path).map_err(|source| HostError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| HostError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Mount a session, submit `record` once, and report the final state.
///
/// Validation and booking failures are part of the report, not errors.
pub async fn run(
    config: IntakeConfig,
    fields: Option<Vec<FieldDefinition>>,
    record: Record,
) -> Result<Report, HostError> {
    let field_store = match fields {
        Some(fields) => InMemoryFieldStore::with_fields(fields),
        None => InMemoryFieldStore::new(),
    };
    let session = Arc::new(IntakeSession::new(
        config,
        Arc::new(field_store),
        Arc::new(InMemoryBookingStore::new()),
        Arc::new(OutboxNotifier::new()),
    ));

    let mut states = session.subscribe();
    let watcher = tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let phase = states.borrow_and_update().phase();
            tracing::info!(%phase, "session transition");
        }
    });

    session.load().await?;
    if let Some(validator) = session.validator() {
        for name in validator.shadowed_names() {
            tracing::warn!(field = %name, "duplicate field name, last definition applies");
        }
    }
    for field in session.field_list() {
        if !field.field_type.is_recognized() {
            tracing::warn!(
                field = %field.name,
                field_type = field.field_type.as_str(),
                "unrecognized field type, validated as text"
            );
        }
    }

    let confirmation = match session.submit(record).await {
        Ok(confirmation) => Some(confirmation),
        Err(IntakeError::Validation(errors)) => {
            for (field, violation) in errors.iter() {
                tracing::warn!(%field, kind = ?violation.kind, "{}", violation.message);
            }
            None
        }
        Err(err) => {
            tracing::error!(error = %err, "submission failed");
            None
        }
    };

    let state = session.state();
    // Dropping the session closes the channel and ends the watcher
    drop(session);
    if let Err(err) = watcher.await {
        tracing::warn!(error = %err, "transition watcher ended abnormally");
    }

    Ok(Report { state, confirmation })
}
