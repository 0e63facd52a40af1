use crate::domain::method::PaymentMethodId;
use chrono::Utc;
use rand::Rng;
use serde::Serialize;

const BASE36_LOWER: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const BASE36_UPPER: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Identifiers issued for one payment request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReference {
    /// Internal identifier, `SOM-<millis>-<suffix>`.
    pub payment_id: String,
    /// Identifier the payer quotes to their provider, `REF-<millis>-<SUFFIX>`.
    pub reference_number: String,
}

/// Generates a fresh payment id and reference number.
///
/// Uniqueness comes from the millisecond timestamp plus a random suffix and is
/// probabilistic only; stores that enforce a unique key remain authoritative.
pub fn generate_reference() -> PaymentReference {
    let timestamp = Utc::now().timestamp_millis();
    let mut rng = rand::thread_rng();
    PaymentReference {
        payment_id: format!("SOM-{timestamp}-{}", random_string(&mut rng, BASE36_LOWER, 9)),
        reference_number: format!("REF-{timestamp}-{}", random_string(&mut rng, BASE36_UPPER, 8)),
    }
}

/// Generates a provider-branded reference such as `EVC12345678K3ZQ`.
///
/// Used only for simulated payments.
pub fn generate_demo_reference(method: PaymentMethodId) -> String {
    let timestamp = Utc::now().timestamp_millis().to_string();
    let tail = &timestamp[timestamp.len().saturating_sub(8)..];
    let suffix = random_string(&mut rand::thread_rng(), BASE36_UPPER, 4);
    format!("{}{tail}{suffix}", method.demo_prefix())
}

/// Transaction id handed out by the simulated gateway.
pub fn generate_transaction_id() -> String {
    let timestamp = Utc::now().timestamp_millis();
    format!(
        "TXN-{timestamp}-{}",
        random_string(&mut rand::thread_rng(), BASE36_UPPER, 8)
    )
}

fn random_string<R: Rng + ?Sized>(rng: &mut R, alphabet: &[u8], len: usize) -> String {
    (0..len)
        .map(|_| {
            let idx = rng.gen_range(0..alphabet.len());
            alphabet.get(idx).copied().map(char::from).unwrap_or('0')
        })
        .collect()
}
