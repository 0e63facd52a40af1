use super::method::PaymentMethod;
use super::money::Money;
use super::payment::{PaymentRecord, StatusUpdate};
use super::room::Room;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Persistence collaborator for payment records.
///
/// Concurrent updates to the same record are last-writer-wins.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Inserts a new record; fails with `DuplicatePayment` if the id is taken.
    async fn create(&self, record: PaymentRecord) -> Result<()>;
    async fn get(&self, payment_id: &str) -> Result<Option<PaymentRecord>>;
    /// Applies `update` as of `now` and returns the updated record.
    async fn update_status(
        &self,
        payment_id: &str,
        update: StatusUpdate,
        now: DateTime<Utc>,
    ) -> Result<PaymentRecord>;
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<PaymentRecord>>;
    async fn list_pending(&self) -> Result<Vec<PaymentRecord>>;
}

/// Read-only room lookup used to price a booking.
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Room>>;
}

/// Which execution path a gateway represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayMode {
    Demo,
    Production,
}

/// One attempt to collect a payment through a provider.
#[derive(Debug, Clone)]
pub struct PaymentAttempt<'a> {
    pub method: &'a PaymentMethod,
    pub payment_id: &'a str,
    pub reference: &'a str,
    pub amount: Money,
    pub currency: &'a str,
    pub phone_number: Option<&'a str>,
    pub account_number: Option<&'a str>,
    pub description: String,
}

/// Normalized result of a payment attempt, whichever gateway produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayOutcome {
    pub success: bool,
    pub reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub provider_response: Option<serde_json::Value>,
}

impl GatewayOutcome {
    pub fn failure(reference: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            reference: reference.into(),
            transaction_id: None,
            message: message.into(),
            expires_at: None,
            provider_response: None,
        }
    }
}

/// Executes payment attempts. Implementations never return errors: every
/// failure is reported as an unsuccessful `GatewayOutcome`.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn mode(&self) -> GatewayMode;
    async fn execute(&self, attempt: &PaymentAttempt<'_>) -> GatewayOutcome;
}

pub type PaymentStoreBox = Box<dyn PaymentStore>;
pub type RoomDirectoryBox = Box<dyn RoomDirectory>;
pub type PaymentGatewayBox = Box<dyn PaymentGateway>;
