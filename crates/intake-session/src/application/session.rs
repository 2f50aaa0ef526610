//! Intake Session
//!
//! State machine for one mounted booking form:
//!
//! ```text
//! Loading --fields--> Ready --valid submit--> Submitting --created--> Confirmed
//!    |                  ^  |                      |
//!    |                  +--+ invalid submit       +--create failed--> Failed
//!    +--store error-------------------------------------------------> Failed
//! ```
//!
//! Creation and notification run strictly one after the other. The
//! notification outcome only selects the [`NotificationStatus`] of the
//! confirmed state; it can never move a session to `Failed`.
//!
//! Results that arrive after [`IntakeSession::close`] are discarded.

use async_trait::async_trait;
use intake_schema::{CompiledValidator, FieldDefinition, FieldType, Record};
use parking_lot::RwLock;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use crate::application::error::{IntakeError, IntakeResult, LOAD_FAILURE};
use crate::config::IntakeConfig;
use crate::domain::{
    BookingId, Confirmation, NotificationStatus, Phase, SubmissionState, TransitionError,
};
use crate::ports::inbound::IntakeUseCases;
use crate::ports::outbound::{BookingStore, FieldStore, Notifier, NotifyError, StoreError};

/// Record key checked for a recipient when the form has no `email` field
const FALLBACK_RECIPIENT_FIELD: &str = "email";

/// One form session
pub struct IntakeSession {
    config: IntakeConfig,
    field_store: Arc<dyn FieldStore>,
    booking_store: Arc<dyn BookingStore>,
    notifier: Arc<dyn Notifier>,
    state: watch::Sender<SubmissionState>,
    validator: RwLock<Option<Arc<CompiledValidator>>>,
    alive: AtomicBool,
}

impl IntakeSession {
    pub fn new(
        config: IntakeConfig,
        field_store: Arc<dyn FieldStore>,
        booking_store: Arc<dyn BookingStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (state, _) = watch::channel(SubmissionState::new());
        Self {
            config,
            field_store,
            booking_store,
            notifier,
            state,
            validator: RwLock::new(None),
            alive: AtomicBool::new(true),
        }
    }

    /// Receiver that observes every applied transition
    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    pub fn phase(&self) -> Phase {
        self.state.borrow().phase()
    }

    /// Validator compiled from the loaded field list, for per-input feedback
    pub fn validator(&self) -> Option<Arc<CompiledValidator>> {
        self.validator.read().clone()
    }

    /// Tear the session down. In-flight results will not be applied.
    pub fn close(&self) {
        self.alive.store(false, Ordering::Release);
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    // =========================================================================
    // Private
    // =========================================================================

    /// Apply a transition unless the session has been closed.
    ///
    /// Runs under the channel's write lock, so the phase check and the
    /// mutation are one atomic step.
    fn transition<F>(&self, apply: F) -> Result<(), Refusal>
    where
        F: FnOnce(&mut SubmissionState) -> Result<(), TransitionError>,
    {
        let mut outcome = Err(Refusal::Closed);
        self.state.send_if_modified(|state| {
            if !self.is_alive() {
                return false;
            }
            outcome = apply(state).map_err(Refusal::Phase);
            outcome.is_ok()
        });
        outcome
    }

    async fn bounded<T, E>(&self, call: impl Future<Output = Result<T, E>>, expired: E) -> Result<T, E> {
        match self.config.deadline() {
            Some(limit) => tokio::time::timeout(limit, call).await.unwrap_or(Err(expired)),
            None => call.await,
        }
    }

    fn recipient_field(&self) -> String {
        if let Some(name) = &self.config.recipient_field {
            return name.clone();
        }
        self.state
            .borrow()
            .fields()
            .iter()
            .find(|field| field.field_type == FieldType::Email)
            .map(|field| field.name.clone())
            .unwrap_or_else(|| FALLBACK_RECIPIENT_FIELD.to_string())
    }

    async fn notify(&self, record: &Record, booking_id: &BookingId) -> NotificationStatus {
        let field = self.recipient_field();
        let Some(recipient) = record.text(&field) else {
            return NotificationStatus::Skipped;
        };

        let sent = self
            .bounded(
                self.notifier.send_confirmation(recipient, record, booking_id),
                NotifyError::Timeout,
            )
            .await;
        match sent {
            Ok(()) => NotificationStatus::Sent,
            Err(_) => NotificationStatus::DeliveryFailed,
        }
    }
}

#[async_trait]
impl IntakeUseCases for IntakeSession {
    async fn load(&self) -> IntakeResult<()> {
        let phase = self.phase();
        if phase != Phase::Loading {
            return Err(IntakeError::AlreadyLoaded(phase));
        }

        let fetched = self
            .bounded(self.field_store.field_definitions(), StoreError::Timeout)
            .await;

        match fetched {
            Ok(stored) => {
                let fields = stored.unwrap_or_else(|| self.config.default_fields.clone());
                let validator = Arc::new(CompiledValidator::compile(&fields));
                self.transition(|state| {
                    state.fields_resolved(fields)?;
                    // Same critical section as the field list, so the two never diverge
                    *self.validator.write() = Some(validator);
                    Ok(())
                })
                .map_err(|refusal| refusal.into_error(None, IntakeError::AlreadyLoaded))
            }
            Err(err) => {
                self.transition(|state| state.load_failed(LOAD_FAILURE))
                    .map_err(|refusal| refusal.into_error(None, IntakeError::AlreadyLoaded))?;
                Err(IntakeError::ConfigLoad(err))
            }
        }
    }

    async fn submit(&self, record: Record) -> IntakeResult<Confirmation> {
        let mut rejected = None;

        self.transition(|state| {
            if state.phase() != Phase::Ready {
                return Err(TransitionError {
                    phase: state.phase(),
                    action: "submit",
                });
            }
            let checked = match self.validator() {
                Some(validator) => validator.validate(&record),
                None => Ok(()),
            };
            match checked {
                Ok(()) => state.begin_submit(),
                Err(errors) => {
                    rejected = Some(errors.clone());
                    state.reject(errors)
                }
            }
        })
        .map_err(|refusal| {
            refusal.into_error(None, |phase| match phase {
                Phase::Submitting => IntakeError::SubmissionInFlight,
                other => IntakeError::NotReady(other),
            })
        })?;

        if let Some(errors) = rejected {
            return Err(IntakeError::Validation(errors));
        }

        let created = self
            .bounded(self.booking_store.create_booking(&record), StoreError::Timeout)
            .await;
        let booking_id = match created {
            Ok(booking_id) => booking_id,
            Err(err) => {
                let message = err.user_message();
                self.transition(|state| state.booking_failed(message.as_str()))
                    .map_err(|refusal| refusal.into_error(None, IntakeError::NotReady))?;
                return Err(IntakeError::BookingCreation(message));
            }
        };

        // The booking exists from here on, so delivery is attempted even if
        // the session was closed meanwhile.
        let notification = self.notify(&record, &booking_id).await;

        self.transition(|state| state.confirm(booking_id.clone(), notification))
            .map_err(|refusal| refusal.into_error(Some(booking_id.clone()), IntakeError::NotReady))?;

        Ok(Confirmation {
            booking_id,
            notification,
        })
    }

    fn field_list(&self) -> Vec<FieldDefinition> {
        let mut fields = self.state.borrow().fields().to_vec();
        fields.sort_by(|a, b| a.id.cmp(&b.id));
        fields
    }

    fn state(&self) -> SubmissionState {
        self.state.borrow().clone()
    }
}

/// Why a transition was not applied
enum Refusal {
    Closed,
    Phase(TransitionError),
}

impl Refusal {
    fn into_error(
        self,
        booking_id: Option<BookingId>,
        wrong_phase: impl FnOnce(Phase) -> IntakeError,
    ) -> IntakeError {
        match self {
            Self::Closed => IntakeError::SessionClosed { booking_id },
            Self::Phase(err) => wrong_phase(err.phase),
        }
    }
}
