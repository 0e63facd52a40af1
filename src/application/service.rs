use crate::domain::catalog::{MethodCatalog, MethodSummary};
use crate::domain::fees::{compute_total, validate_bounds, validate_required_fields};
use crate::domain::method::{Language, PaymentMethodId};
use crate::domain::money::Money;
use crate::domain::payment::{
    NewPayment, PaymentRecord, PaymentRequest, PaymentStatus, PaymentSummary, StatusUpdate,
};
use crate::domain::phone::format_somali_phone_number;
use crate::domain::ports::{
    GatewayMode, GatewayOutcome, PaymentAttempt, PaymentGatewayBox, PaymentStoreBox,
    RoomDirectoryBox,
};
use crate::domain::reference::generate_reference;
use crate::error::{PaymentError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// How many fresh references are tried when the store reports a taken id.
pub const MAX_REFERENCE_ATTEMPTS: u32 = 3;

/// What the payer gets back after opening a payment session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub success: bool,
    pub payment_id: String,
    pub amount: Money,
    pub base_amount: Money,
    pub fee_amount: Money,
    pub currency: String,
    pub payment_method: PaymentMethodId,
    pub instructions: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions_ar: Option<String>,
    pub reference_number: String,
    pub expires_at: DateTime<Utc>,
    pub provider: String,
}

/// Result of one payment attempt against the gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    pub payment_id: String,
    pub mode: GatewayMode,
    /// Status the attempt moved the payment to.
    pub status: PaymentStatus,
    /// False when the status change could not be stored.
    pub recorded: bool,
    #[serde(flatten)]
    pub outcome: GatewayOutcome,
}

/// A freshly opened payment: the payer's response plus the record behind it.
///
/// The record is returned even when the store rejected it, so the caller can
/// still settle the session with `PaymentService::settle_record`.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSession {
    pub response: PaymentResponse,
    pub record: PaymentRecord,
    /// False when the record could not be stored.
    pub stored: bool,
}

/// Orchestrates booking payments.
///
/// `PaymentService` validates a request against the method catalog, prices the
/// stay, opens a pending payment record and hands attempts to whichever gateway
/// the process was configured with. It holds no mutable state of its own, so a
/// single instance can serve concurrent requests.
pub struct PaymentService {
    catalog: Arc<MethodCatalog>,
    rooms: RoomDirectoryBox,
    store: PaymentStoreBox,
    gateway: PaymentGatewayBox,
}

impl PaymentService {
    /// # Arguments
    ///
    /// * `catalog` - The methods available to payers.
    /// * `rooms` - Room lookup used for pricing.
    /// * `store` - Where payment records are kept.
    /// * `gateway` - Demo or production dispatcher.
    pub fn new(
        catalog: Arc<MethodCatalog>,
        rooms: RoomDirectoryBox,
        store: PaymentStoreBox,
        gateway: PaymentGatewayBox,
    ) -> Self {
        Self {
            catalog,
            rooms,
            store,
            gateway,
        }
    }

    pub fn mode(&self) -> GatewayMode {
        self.gateway.mode()
    }

    pub fn available_methods(&self) -> Vec<MethodSummary> {
        self.catalog.list_active_methods()
    }

    /// Validates `request`, prices the stay and opens a pending payment.
    pub async fn initiate(&self, user_id: &str, request: &PaymentRequest) -> Result<PaymentResponse> {
        self.open(user_id, request).await.map(|session| session.response)
    }

    /// Same as `initiate`, but also hands back the opened record.
    ///
    /// Validation failures are returned before anything is stored. A store that
    /// fails for any reason other than a taken id does not fail the request:
    /// the session is still returned and the failure is logged.
    pub async fn open(&self, user_id: &str, request: &PaymentRequest) -> Result<PaymentSession> {
        request.validate()?;
        let method = self.catalog.lookup(&request.payment_method)?;
        validate_required_fields(
            method,
            request.phone_number.as_deref(),
            request.account_number.as_deref(),
        )?;

        let room = self
            .rooms
            .find_by_slug(request.hotel_room_slug.trim())
            .await?
            .ok_or_else(|| PaymentError::RoomNotFound(request.hotel_room_slug.clone()))?;
        let amounts = compute_total(room.stay_cost(request.number_of_days)?, method);
        validate_bounds(amounts.total, method)?;

        let phone_number = request
            .phone_number
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(format_somali_phone_number);

        let mut opened = None;
        for attempt in 1..=MAX_REFERENCE_ATTEMPTS {
            let record = PaymentRecord::new(NewPayment {
                reference: generate_reference(),
                user_id,
                room_id: &room.id,
                amounts,
                currency: method.currency,
                method: method.id,
                request,
                phone_number: phone_number.clone(),
                created_at: Utc::now(),
            });
            match self.store.create(record.clone()).await {
                Ok(()) => {
                    opened = Some((record, true));
                    break;
                }
                Err(PaymentError::DuplicatePayment(id)) => {
                    tracing::warn!(payment_id = %id, attempt, "payment id already taken, regenerating");
                }
                Err(e) => {
                    tracing::error!(
                        payment_id = %record.payment_id,
                        error = %e,
                        "failed to store payment record; continuing with unsaved session"
                    );
                    opened = Some((record, false));
                    break;
                }
            }
        }
        let (record, stored) = opened.ok_or_else(|| {
            PaymentError::PersistenceError(format!(
                "no free payment id after {MAX_REFERENCE_ATTEMPTS} attempts"
            ))
        })?;

        let language = request
            .language
            .as_deref()
            .map(Language::from_code)
            .unwrap_or_default();
        let instructions = method.format_instructions(&record.reference_number, language);
        let instructions_ar = (language == Language::En)
            .then(|| method.format_instructions(&record.reference_number, Language::Ar));

        tracing::info!(
            payment_id = %record.payment_id,
            method = %method.id,
            total = %record.amount,
            "payment session opened"
        );

        let response = PaymentResponse {
            success: true,
            payment_id: record.payment_id.clone(),
            amount: record.amount,
            base_amount: record.base_amount,
            fee_amount: record.fee_amount,
            currency: record.currency.clone(),
            payment_method: method.id,
            instructions,
            instructions_ar,
            reference_number: record.reference_number.clone(),
            expires_at: record.expires_at,
            provider: method.provider.to_string(),
        };
        Ok(PaymentSession {
            response,
            record,
            stored,
        })
    }

    /// Runs the payment attempt for a stored, pending and unexpired payment.
    pub async fn settle(&self, payment_id: &str) -> Result<PaymentResult> {
        let record = self
            .store
            .get(payment_id)
            .await?
            .ok_or_else(|| PaymentError::PaymentNotFound(payment_id.to_string()))?;
        self.settle_record(&record).await
    }

    /// Dispatches `record` through the gateway and records the outcome.
    ///
    /// Works from the caller's copy, so it also covers sessions whose record
    /// never reached the store. The record must be pending and unexpired. A
    /// failed status write is logged and reported through `recorded`.
    pub async fn settle_record(&self, record: &PaymentRecord) -> Result<PaymentResult> {
        if record.status != PaymentStatus::Pending {
            return Err(PaymentError::InvalidTransition {
                payment_id: record.payment_id.clone(),
                from: record.status.to_string(),
                to: PaymentStatus::Confirmed.to_string(),
            });
        }
        if record.is_expired_at(Utc::now()) {
            return Err(PaymentError::PaymentExpired(record.payment_id.clone()));
        }

        let method = self
            .catalog
            .get(record.payment_method)
            .ok_or_else(|| PaymentError::InvalidMethod(record.payment_method.to_string()))?;

        let attempt = PaymentAttempt {
            method,
            payment_id: &record.payment_id,
            reference: &record.reference_number,
            amount: record.amount,
            currency: &record.currency,
            phone_number: record.phone_number.as_deref(),
            account_number: record.account_number.as_deref(),
            description: format!("Hotel booking {}", record.reference_number),
        };
        let outcome = self.gateway.execute(&attempt).await;

        let (status, mut update) = match (outcome.success, &outcome.transaction_id) {
            (true, Some(transaction_id)) => (
                PaymentStatus::Confirmed,
                StatusUpdate::new(PaymentStatus::Confirmed).with_transaction_id(transaction_id),
            ),
            (true, None) => (
                PaymentStatus::Confirmed,
                StatusUpdate::new(PaymentStatus::Confirmed),
            ),
            (false, _) => (
                PaymentStatus::Failed,
                StatusUpdate::new(PaymentStatus::Failed).with_notes(&outcome.message),
            ),
        };
        if let Some(response) = &outcome.provider_response {
            update = update.with_provider_response(response.clone());
        }

        let (status, recorded) = match self
            .store
            .update_status(&record.payment_id, update, Utc::now())
            .await
        {
            Ok(updated) => (updated.status, true),
            Err(e) => {
                tracing::warn!(
                    payment_id = %record.payment_id,
                    status = %status,
                    error = %e,
                    "failed to record payment outcome"
                );
                (status, false)
            }
        };

        Ok(PaymentResult {
            payment_id: record.payment_id.clone(),
            mode: self.gateway.mode(),
            status,
            recorded,
            outcome,
        })
    }

    /// Applies a status change reported from outside, e.g. a provider callback.
    pub async fn update_status(&self, payment_id: &str, update: StatusUpdate) -> Result<PaymentRecord> {
        self.store.update_status(payment_id, update, Utc::now()).await
    }

    /// Moves every pending payment whose expiry is at or before `now` to `expired`.
    ///
    /// Returns how many payments were expired.
    pub async fn expire_overdue(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut expired = 0;
        for record in self.store.list_pending().await? {
            if !record.is_expired_at(now) {
                continue;
            }
            match self
                .store
                .update_status(
                    &record.payment_id,
                    StatusUpdate::new(PaymentStatus::Expired),
                    now,
                )
                .await
            {
                Ok(_) => expired += 1,
                // Settled concurrently since the listing.
                Err(PaymentError::InvalidTransition { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        if expired > 0 {
            tracing::info!(expired, "expired overdue payments");
        }
        Ok(expired)
    }

    /// All payments of `user_id`, newest first.
    pub async fn user_payments(&self, user_id: &str) -> Result<Vec<PaymentRecord>> {
        let mut records = self.store.list_by_user(user_id).await?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    pub async fn summary(&self, user_id: &str) -> Result<PaymentSummary> {
        let records = self.store.list_by_user(user_id).await?;
        Ok(PaymentSummary::from_records(&records))
    }
}
