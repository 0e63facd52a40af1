use crate::domain::fees::FeeBreakdown;
use crate::domain::method::PaymentMethodId;
use crate::domain::money::Money;
use crate::domain::reference::PaymentReference;
use crate::error::{PaymentError, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// How long a payer has to complete a payment once the session is created.
pub const PAYMENT_VALIDITY_HOURS: i64 = 24;

/// A booking payment as submitted by the payer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    #[serde(deserialize_with = "deserialize_date")]
    pub checkin_date: NaiveDate,
    #[serde(deserialize_with = "deserialize_date")]
    pub checkout_date: NaiveDate,
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    pub number_of_days: u32,
    pub hotel_room_slug: String,
    /// Method id as sent by the client; resolved against the catalog.
    pub payment_method: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// Accepts `YYYY-MM-DD` or a full ISO timestamp, keeping only the date part.
fn deserialize_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let date_part = raw.split('T').next().unwrap_or_default().trim();
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(serde::de::Error::custom)
}

impl PaymentRequest {
    /// Structural checks that do not depend on the catalog or the room.
    pub fn validate(&self) -> Result<()> {
        if self.hotel_room_slug.trim().is_empty() {
            return Err(PaymentError::InvalidRequest(
                "hotelRoomSlug is required".to_string(),
            ));
        }
        if self.payment_method.trim().is_empty() {
            return Err(PaymentError::InvalidRequest(
                "paymentMethod is required".to_string(),
            ));
        }
        if self.adults == 0 {
            return Err(PaymentError::InvalidRequest(
                "at least one adult is required".to_string(),
            ));
        }
        if self.number_of_days == 0 {
            return Err(PaymentError::InvalidRequest(
                "numberOfDays must be positive".to_string(),
            ));
        }
        if self.checkout_date <= self.checkin_date {
            return Err(PaymentError::InvalidRequest(
                "checkoutDate must be after checkinDate".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Confirmed,
    Failed,
    Expired,
    Cancelled,
}

impl PaymentStatus {
    /// Only pending payments may change status; every other state is final.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        *self == PaymentStatus::Pending && next != PaymentStatus::Pending
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Confirmed => "confirmed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Expired => "expired",
            PaymentStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// A status change requested by the dispatcher, a provider callback or a sweep.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: Option<PaymentStatus>,
    pub transaction_id: Option<String>,
    pub provider_response: Option<serde_json::Value>,
    pub notes: Option<String>,
}

impl StatusUpdate {
    pub fn new(status: PaymentStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn with_transaction_id(mut self, transaction_id: impl Into<String>) -> Self {
        self.transaction_id = Some(transaction_id.into());
        self
    }

    pub fn with_provider_response(mut self, response: serde_json::Value) -> Self {
        self.provider_response = Some(response);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// The persisted state of one payment session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub payment_id: String,
    pub reference_number: String,
    pub user_id: String,
    pub room_id: String,
    /// Total payable, base plus fee.
    pub amount: Money,
    pub base_amount: Money,
    pub fee_amount: Money,
    pub currency: String,
    pub payment_method: PaymentMethodId,
    pub status: PaymentStatus,
    pub checkin_date: NaiveDate,
    pub checkout_date: NaiveDate,
    pub adults: u32,
    pub children: u32,
    pub number_of_days: u32,
    pub phone_number: Option<String>,
    pub account_number: Option<String>,
    pub transaction_id: Option<String>,
    pub provider_response: Option<serde_json::Value>,
    pub notes: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to open a pending payment record.
#[derive(Debug, Clone)]
pub struct NewPayment<'a> {
    pub reference: PaymentReference,
    pub user_id: &'a str,
    pub room_id: &'a str,
    pub amounts: FeeBreakdown,
    pub currency: &'a str,
    pub method: PaymentMethodId,
    pub request: &'a PaymentRequest,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PaymentRecord {
    pub fn new(payment: NewPayment<'_>) -> Self {
        let NewPayment {
            reference,
            user_id,
            room_id,
            amounts,
            currency,
            method,
            request,
            phone_number,
            created_at,
        } = payment;

        Self {
            payment_id: reference.payment_id,
            reference_number: reference.reference_number,
            user_id: user_id.to_string(),
            room_id: room_id.to_string(),
            amount: amounts.total,
            base_amount: amounts.base,
            fee_amount: amounts.fee,
            currency: currency.to_string(),
            payment_method: method,
            status: PaymentStatus::Pending,
            checkin_date: request.checkin_date,
            checkout_date: request.checkout_date,
            adults: request.adults,
            children: request.children,
            number_of_days: request.number_of_days,
            phone_number,
            account_number: request
                .account_number
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            transaction_id: None,
            provider_response: None,
            notes: None,
            expires_at: created_at + Duration::hours(PAYMENT_VALIDITY_HOURS),
            confirmed_at: None,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Applies a status update as of `now`.
    ///
    /// Status changes are only allowed out of `pending`, and a payment cannot be
    /// confirmed once its expiry has passed. Updates without a status only
    /// annotate the record.
    pub fn apply_update(&mut self, update: StatusUpdate, now: DateTime<Utc>) -> Result<()> {
        if let Some(next) = update.status {
            if !self.status.can_transition_to(next) {
                return Err(PaymentError::InvalidTransition {
                    payment_id: self.payment_id.clone(),
                    from: self.status.to_string(),
                    to: next.to_string(),
                });
            }
            if next == PaymentStatus::Confirmed && self.is_expired_at(now) {
                return Err(PaymentError::PaymentExpired(self.payment_id.clone()));
            }
            self.status = next;
            if next == PaymentStatus::Confirmed {
                self.confirmed_at = Some(now);
            }
        }

        if let Some(transaction_id) = update.transaction_id {
            self.transaction_id = Some(transaction_id);
        }
        if let Some(response) = update.provider_response {
            self.provider_response = Some(response);
        }
        if let Some(notes) = update.notes {
            self.notes = Some(notes);
        }
        self.updated_at = now;
        Ok(())
    }

    /// Countdown text shown next to the instructions, e.g. `23h 59m remaining`.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> String {
        let remaining = self.expires_at - now;
        if remaining <= Duration::zero() {
            return "Expired".to_string();
        }
        format!(
            "{}h {}m remaining",
            remaining.num_hours(),
            remaining.num_minutes() % 60
        )
    }
}

/// Aggregate view of a user's payments.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub total_payments: usize,
    pub pending_payments: usize,
    pub confirmed_payments: usize,
    /// Sum of confirmed payment totals.
    pub total_amount: Money,
}

impl PaymentSummary {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a PaymentRecord>) -> Self {
        records
            .into_iter()
            .fold(Self::default(), |mut summary, record| {
                summary.total_payments += 1;
                match record.status {
                    PaymentStatus::Pending => summary.pending_payments += 1,
                    PaymentStatus::Confirmed => {
                        summary.confirmed_payments += 1;
                        summary.total_amount += record.amount;
                    }
                    _ => {}
                }
                summary
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn request() -> PaymentRequest {
        serde_json::from_str(
            r#"{
                "checkinDate": "2025-03-01T12:00:00.000Z",
                "checkoutDate": "2025-03-03",
                "adults": 2,
                "children": 1,
                "numberOfDays": 2,
                "hotelRoomSlug": "ocean-suite",
                "paymentMethod": "evc",
                "phoneNumber": "615551234"
            }"#,
        )
        .unwrap()
    }

    fn record(created_at: DateTime<Utc>) -> PaymentRecord {
        let request = request();
        PaymentRecord::new(NewPayment {
            reference: PaymentReference {
                payment_id: "SOM-1-abc".to_string(),
                reference_number: "REF-1-ABC".to_string(),
            },
            user_id: "user-1",
            room_id: "room-1",
            amounts: FeeBreakdown {
                base: Money::new(dec!(50)),
                fee: Money::new(dec!(0.25)),
                total: Money::new(dec!(50.25)),
            },
            currency: "USD",
            method: PaymentMethodId::Evc,
            request: &request,
            phone_number: Some("252615551234".to_string()),
            created_at,
        })
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_request_dates_accept_timestamps() {
        let request = request();
        assert_eq!(
            request.checkin_date,
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
        assert_eq!(
            request.checkout_date,
            NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
        );
        assert_eq!(request.account_number, None);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_request_rejects_bad_date() {
        let result: std::result::Result<PaymentRequest, _> = serde_json::from_str(
            r#"{"checkinDate":"soon","checkoutDate":"2025-03-03","adults":1,
                "numberOfDays":1,"hotelRoomSlug":"x","paymentMethod":"evc"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_request_validation() {
        let mut req = request();
        req.adults = 0;
        assert!(matches!(req.validate(), Err(PaymentError::InvalidRequest(_))));

        let mut req = request();
        req.number_of_days = 0;
        assert!(matches!(req.validate(), Err(PaymentError::InvalidRequest(_))));

        let mut req = request();
        req.checkout_date = req.checkin_date;
        assert!(matches!(req.validate(), Err(PaymentError::InvalidRequest(_))));
    }

    #[test]
    fn test_new_record_is_pending_and_expires_in_24_hours() {
        let record = record(t0());
        assert_eq!(record.status, PaymentStatus::Pending);
        assert_eq!(record.expires_at - record.created_at, Duration::hours(24));
        assert_eq!(record.amount, Money::new(dec!(50.25)));
        assert_eq!(record.number_of_days, 2);
    }

    #[test]
    fn test_confirm_sets_confirmed_at() {
        let mut record = record(t0());
        let now = t0() + Duration::hours(1);
        record
            .apply_update(
                StatusUpdate::new(PaymentStatus::Confirmed).with_transaction_id("TXN-1"),
                now,
            )
            .unwrap();
        assert_eq!(record.status, PaymentStatus::Confirmed);
        assert_eq!(record.confirmed_at, Some(now));
        assert_eq!(record.transaction_id.as_deref(), Some("TXN-1"));
        assert_eq!(record.updated_at, now);
    }

    #[test]
    fn test_terminal_statuses_reject_changes() {
        let mut record = record(t0());
        record
            .apply_update(StatusUpdate::new(PaymentStatus::Failed), t0())
            .unwrap();
        let err = record
            .apply_update(StatusUpdate::new(PaymentStatus::Confirmed), t0())
            .unwrap_err();
        assert!(matches!(err, PaymentError::InvalidTransition { .. }));
        assert_eq!(record.status, PaymentStatus::Failed);
    }

    #[test]
    fn test_cannot_confirm_after_expiry() {
        let mut record = record(t0());
        let late = t0() + Duration::hours(24);
        let err = record
            .apply_update(StatusUpdate::new(PaymentStatus::Confirmed), late)
            .unwrap_err();
        assert!(matches!(err, PaymentError::PaymentExpired(_)));

        record
            .apply_update(StatusUpdate::new(PaymentStatus::Expired), late)
            .unwrap();
        assert_eq!(record.status, PaymentStatus::Expired);
    }

    #[test]
    fn test_notes_only_update_keeps_status() {
        let mut record = record(t0());
        record
            .apply_update(StatusUpdate::default().with_notes("called support"), t0())
            .unwrap();
        assert_eq!(record.status, PaymentStatus::Pending);
        assert_eq!(record.notes.as_deref(), Some("called support"));
    }

    #[test]
    fn test_time_remaining() {
        let record = record(t0());
        assert_eq!(
            record.time_remaining(t0() + Duration::minutes(90)),
            "22h 30m remaining"
        );
        assert_eq!(record.time_remaining(t0() + Duration::hours(25)), "Expired");
    }

    #[test]
    fn test_summary_counts() {
        let pending = record(t0());
        let mut confirmed = record(t0());
        confirmed
            .apply_update(StatusUpdate::new(PaymentStatus::Confirmed), t0())
            .unwrap();
        let mut failed = record(t0());
        failed
            .apply_update(StatusUpdate::new(PaymentStatus::Failed), t0())
            .unwrap();

        let summary = PaymentSummary::from_records([&pending, &confirmed, &failed]);
        assert_eq!(summary.total_payments, 3);
        assert_eq!(summary.pending_payments, 1);
        assert_eq!(summary.confirmed_payments, 1);
        assert_eq!(summary.total_amount, Money::new(dec!(50.25)));
    }
}
