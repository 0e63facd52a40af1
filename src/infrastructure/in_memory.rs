use crate::domain::payment::{PaymentRecord, PaymentStatus, StatusUpdate};
use crate::domain::ports::{PaymentStore, RoomDirectory};
use crate::domain::room::Room;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for payment records.
///
/// Uses `Arc<RwLock<HashMap<String, PaymentRecord>>>` keyed by payment id.
/// Ideal for testing or single-run usage where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<String, PaymentRecord>>>,
}

impl InMemoryPaymentStore {
    /// Creates a new, empty in-memory payment store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn create(&self, record: PaymentRecord) -> Result<()> {
        let mut payments = self.payments.write().await;
        if payments.contains_key(&record.payment_id) {
            return Err(PaymentError::DuplicatePayment(record.payment_id));
        }
        payments.insert(record.payment_id.clone(), record);
        Ok(())
    }

    async fn get(&self, payment_id: &str) -> Result<Option<PaymentRecord>> {
        let payments = self.payments.read().await;
        Ok(payments.get(payment_id).cloned())
    }

    async fn update_status(
        &self,
        payment_id: &str,
        update: StatusUpdate,
        now: DateTime<Utc>,
    ) -> Result<PaymentRecord> {
        let mut payments = self.payments.write().await;
        let record = payments
            .get_mut(payment_id)
            .ok_or_else(|| PaymentError::PaymentNotFound(payment_id.to_string()))?;
        record.apply_update(update, now)?;
        Ok(record.clone())
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<PaymentRecord>> {
        let payments = self.payments.read().await;
        Ok(payments
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_pending(&self) -> Result<Vec<PaymentRecord>> {
        let payments = self.payments.read().await;
        Ok(payments
            .values()
            .filter(|p| p.status == PaymentStatus::Pending)
            .cloned()
            .collect())
    }
}

/// Room lookup backed by a fixed set of rooms, usually loaded from a CSV file.
#[derive(Default, Clone)]
pub struct InMemoryRoomDirectory {
    rooms: Arc<HashMap<String, Room>>,
}

impl InMemoryRoomDirectory {
    pub fn new(rooms: impl IntoIterator<Item = Room>) -> Self {
        Self {
            rooms: Arc::new(rooms.into_iter().map(|r| (r.slug.clone(), r)).collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[async_trait]
impl RoomDirectory for InMemoryRoomDirectory {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Room>> {
        Ok(self.rooms.get(slug).cloned())
    }
}
