use crate::domain::payment::{PaymentRecord, PaymentStatus, StatusUpdate};
use crate::domain::ports::PaymentStore;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rocksdb::{ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing payment records, keyed by payment id.
pub const CF_PAYMENTS: &str = "payments";

/// A persistent payment store using RocksDB.
///
/// Records are stored as JSON in the `payments` column family. Status updates
/// are read-modify-write without coordination, so concurrent writers to the
/// same payment resolve as last-writer-wins.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbPaymentStore {
    db: Arc<DB>,
}

impl RocksDbPaymentStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_payments = ColumnFamilyDescriptor::new(CF_PAYMENTS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_payments])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(CF_PAYMENTS).ok_or_else(|| {
            PaymentError::PersistenceError("payments column family not found".to_string())
        })
    }

    fn put(&self, record: &PaymentRecord) -> Result<()> {
        let value = serde_json::to_vec(record)?;
        self.db.put_cf(self.cf()?, record.payment_id.as_bytes(), value)?;
        Ok(())
    }

    fn scan(&self, mut keep: impl FnMut(&PaymentRecord) -> bool) -> Result<Vec<PaymentRecord>> {
        let mut records = Vec::new();
        for item in self.db.iterator_cf(self.cf()?, IteratorMode::Start) {
            let (_key, value) = item?;
            let record: PaymentRecord = serde_json::from_slice(&value)?;
            if keep(&record) {
                records.push(record);
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl PaymentStore for RocksDbPaymentStore {
    async fn create(&self, record: PaymentRecord) -> Result<()> {
        let cf = self.cf()?;
        if self
            .db
            .get_pinned_cf(cf, record.payment_id.as_bytes())?
            .is_some()
        {
            return Err(PaymentError::DuplicatePayment(record.payment_id));
        }
        self.put(&record)
    }

    async fn get(&self, payment_id: &str) -> Result<Option<PaymentRecord>> {
        match self.db.get_cf(self.cf()?, payment_id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn update_status(
        &self,
        payment_id: &str,
        update: StatusUpdate,
        now: DateTime<Utc>,
    ) -> Result<PaymentRecord> {
        let mut record = self
            .get(payment_id)
            .await?
            .ok_or_else(|| PaymentError::PaymentNotFound(payment_id.to_string()))?;
        record.apply_update(update, now)?;
        self.put(&record)?;
        Ok(record)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<PaymentRecord>> {
        self.scan(|r| r.user_id == user_id)
    }

    async fn list_pending(&self) -> Result<Vec<PaymentRecord>> {
        self.scan(|r| r.status == PaymentStatus::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fees::FeeBreakdown;
    use crate::domain::method::PaymentMethodId;
    use crate::domain::money::Money;
    use crate::domain::payment::{NewPayment, PaymentRequest};
    use crate::domain::reference::generate_reference;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn record() -> PaymentRecord {
        let request = PaymentRequest {
            checkin_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            checkout_date: NaiveDate::from_ymd_opt(2025, 6, 4).unwrap(),
            adults: 2,
            children: 0,
            number_of_days: 3,
            hotel_room_slug: "ocean-suite".to_string(),
            payment_method: "premier_bank".to_string(),
            phone_number: None,
            account_number: Some("0012345".to_string()),
            language: None,
        };
        PaymentRecord::new(NewPayment {
            reference: generate_reference(),
            user_id: "user-1",
            room_id: "room-1",
            amounts: FeeBreakdown {
                base: Money::new(dec!(300)),
                fee: Money::ZERO,
                total: Money::new(dec!(300)),
            },
            currency: "USD",
            method: PaymentMethodId::PremierBank,
            request: &request,
            phone_number: None,
            created_at: Utc::now(),
        })
    }

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDbPaymentStore::open(dir.path()).expect("Failed to open RocksDB");
        assert!(store.db.cf_handle(CF_PAYMENTS).is_some());
    }

    #[tokio::test]
    async fn test_rocksdb_payment_store() {
        let dir = tempdir().unwrap();
        let store = RocksDbPaymentStore::open(dir.path()).unwrap();
        let payment = record();

        store.create(payment.clone()).await.unwrap();
        let retrieved = store.get(&payment.payment_id).await.unwrap().unwrap();
        assert_eq!(retrieved, payment);
        assert!(matches!(
            store.create(payment.clone()).await,
            Err(PaymentError::DuplicatePayment(_))
        ));

        let updated = store
            .update_status(
                &payment.payment_id,
                StatusUpdate::new(PaymentStatus::Confirmed).with_transaction_id("TXN-9"),
                Utc::now(),
            )
            .await
            .unwrap();
        assert_eq!(updated.status, PaymentStatus::Confirmed);
        assert_eq!(store.list_by_user("user-1").await.unwrap().len(), 1);
        assert!(store.list_pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rocksdb_survives_reopen() {
        let dir = tempdir().unwrap();
        let payment = record();
        {
            let store = RocksDbPaymentStore::open(dir.path()).unwrap();
            store.create(payment.clone()).await.unwrap();
        }
        let store = RocksDbPaymentStore::open(dir.path()).unwrap();
        assert_eq!(store.get(&payment.payment_id).await.unwrap(), Some(payment));
    }
}
