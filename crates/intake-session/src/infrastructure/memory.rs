//! In-memory adapters for development and testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use intake_schema::{FieldDefinition, Record};
use parking_lot::{Mutex, RwLock};

use crate::domain::BookingId;
use crate::ports::outbound::{BookingStore, FieldStore, Notifier, NotifyError, StoreError};

/// In-memory field configuration
#[derive(Default)]
pub struct InMemoryFieldStore {
    fields: RwLock<Option<Vec<FieldDefinition>>>,
}

impl InMemoryFieldStore {
    /// Store with no configuration; sessions fall back to their defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fields(fields: Vec<FieldDefinition>) -> Self {
        Self {
            fields: RwLock::new(Some(fields)),
        }
    }

    /// Replace the configuration; sessions mounted afterwards see it
    pub fn set_fields(&self, fields: Vec<FieldDefinition>) {
        *self.fields.write() = Some(fields);
    }

    pub fn clear(&self) {
        *self.fields.write() = None;
    }
}

#[async_trait]
impl FieldStore for InMemoryFieldStore {
    async fn field_definitions(&self) -> Result<Option<Vec<FieldDefinition>>, StoreError> {
        let fields = self.fields.read().clone();
        match &fields {
            Some(list) => tracing::debug!(count = list.len(), "serving configured fields"),
            None => tracing::debug!("no field configuration stored"),
        }
        Ok(fields)
    }
}

/// A persisted booking
#[derive(Clone, Debug)]
pub struct StoredBooking {
    pub id: BookingId,
    pub record: Record,
    pub created_at: DateTime<Utc>,
}

/// In-memory booking store
#[derive(Default)]
pub struct InMemoryBookingStore {
    bookings: DashMap<BookingId, StoredBooking>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &BookingId) -> Option<StoredBooking> {
        self.bookings.get(id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn create_booking(&self, record: &Record) -> Result<BookingId, StoreError> {
        let booking = StoredBooking {
            id: BookingId::generate(),
            record: record.clone(),
            created_at: Utc::now(),
        };
        let id = booking.id.clone();
        self.bookings.insert(id.clone(), booking);

        tracing::info!(booking_id = %id, fields = record.len(), "booking created");
        Ok(id)
    }
}

/// A confirmation accepted by [`OutboxNotifier`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentConfirmation {
    pub recipient: String,
    pub booking_id: BookingId,
    pub sent_at: DateTime<Utc>,
}

/// Notifier that records confirmations instead of delivering them
#[derive(Default)]
pub struct OutboxNotifier {
    sent: Mutex<Vec<SentConfirmation>>,
}

impl OutboxNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentConfirmation> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Notifier for OutboxNotifier {
    async fn send_confirmation(
        &self,
        recipient: &str,
        _record: &Record,
        booking_id: &BookingId,
    ) -> Result<(), NotifyError> {
        tracing::info!(%recipient, %booking_id, "confirmation queued");
        self.sent.lock().push(SentConfirmation {
            recipient: recipient.to_string(),
            booking_id: booking_id.clone(),
            sent_at: Utc::now(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_schema::FieldType;

    #[tokio::test]
    async fn test_field_store_absence_and_replacement() {
        let store = InMemoryFieldStore::new();
        assert_eq!(store.field_definitions().await.unwrap(), None);

        let fields = vec![FieldDefinition::new("1", "name", "Name", FieldType::Text)];
        store.set_fields(fields.clone());
        assert_eq!(store.field_definitions().await.unwrap(), Some(fields));

        store.clear();
        assert_eq!(store.field_definitions().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_booking_store_assigns_unique_ids() {
        let store = InMemoryBookingStore::new();
        let record = Record::new().with("name", "Ada");

        let first = store.create_booking(&record).await.unwrap();
        let second = store.create_booking(&record).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&first).unwrap().record, record);
    }

    #[tokio::test]
    async fn test_outbox_records_confirmations() {
        let notifier = OutboxNotifier::new();
        let id = BookingId::new("B7");
        notifier
            .send_confirmation("ada@example.com", &Record::new(), &id)
            .await
            .unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, "ada@example.com");
        assert_eq!(sent[0].booking_id, id);
    }
}
