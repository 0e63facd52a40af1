use crate::config::PaymentConfig;
use crate::domain::payment::PAYMENT_VALIDITY_HOURS;
use crate::domain::ports::{GatewayMode, GatewayOutcome, PaymentAttempt, PaymentGateway};
use crate::domain::reference::{generate_demo_reference, generate_transaction_id};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;

/// Reasons a simulated payment may fail.
pub const DEMO_FAILURE_REASONS: [&str; 4] = [
    "Insufficient balance",
    "Network timeout",
    "Invalid PIN",
    "Service temporarily unavailable",
];

pub const DEMO_SUCCESS_MESSAGE: &str = "Payment completed successfully";

/// Gateway used in demo mode: waits for a fixed processing time and then
/// draws a weighted random outcome.
pub struct SimulatedGateway {
    success_rate: f64,
    processing_time: Duration,
    rng: Mutex<StdRng>,
}

impl SimulatedGateway {
    /// # Arguments
    ///
    /// * `success_rate` - Probability of success, clamped to `[0, 1]`.
    /// * `processing_time` - Simulated provider latency.
    pub fn new(success_rate: f64, processing_time: Duration) -> Self {
        Self::with_rng(success_rate, processing_time, StdRng::from_entropy())
    }

    /// Same as `new` but with a deterministic random source.
    pub fn seeded(success_rate: f64, processing_time: Duration, seed: u64) -> Self {
        Self::with_rng(success_rate, processing_time, StdRng::seed_from_u64(seed))
    }

    pub fn from_config(config: &PaymentConfig) -> Self {
        Self::new(config.demo_success_rate, config.demo_processing_time)
    }

    fn with_rng(success_rate: f64, processing_time: Duration, rng: StdRng) -> Self {
        Self {
            success_rate: success_rate.clamp(0.0, 1.0),
            processing_time,
            rng: Mutex::new(rng),
        }
    }

    /// Draws an outcome; `None` means success, otherwise the failure reason.
    fn draw(&self) -> Option<&'static str> {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if rng.gen_bool(self.success_rate) {
            None
        } else {
            DEMO_FAILURE_REASONS.choose(&mut *rng).copied()
        }
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    fn mode(&self) -> GatewayMode {
        GatewayMode::Demo
    }

    async fn execute(&self, attempt: &PaymentAttempt<'_>) -> GatewayOutcome {
        if !self.processing_time.is_zero() {
            tokio::time::sleep(self.processing_time).await;
        }

        let reference = generate_demo_reference(attempt.method.id);
        match self.draw() {
            None => {
                tracing::info!(
                    payment_id = attempt.payment_id,
                    method = %attempt.method.id,
                    "simulated payment succeeded"
                );
                GatewayOutcome {
                    success: true,
                    reference,
                    transaction_id: Some(generate_transaction_id()),
                    message: DEMO_SUCCESS_MESSAGE.to_string(),
                    expires_at: Some(Utc::now() + ChronoDuration::hours(PAYMENT_VALIDITY_HOURS)),
                    provider_response: None,
                }
            }
            Some(reason) => {
                tracing::info!(
                    payment_id = attempt.payment_id,
                    method = %attempt.method.id,
                    reason,
                    "simulated payment failed"
                );
                GatewayOutcome::failure(reference, reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::MethodCatalog;
    use crate::domain::method::PaymentMethodId;
    use crate::domain::money::Money;
    use rust_decimal_macros::dec;

    fn attempt(catalog: &MethodCatalog) -> PaymentAttempt<'_> {
        PaymentAttempt {
            method: catalog.get(PaymentMethodId::Evc).unwrap(),
            payment_id: "SOM-1-abc",
            reference: "REF-1-ABC",
            amount: Money::new(dec!(50.25)),
            currency: "USD",
            phone_number: Some("252615551234"),
            account_number: None,
            description: "Hotel booking".to_string(),
        }
    }

    #[tokio::test]
    async fn test_always_succeeds_at_full_rate() {
        let catalog = MethodCatalog::standard();
        let gateway = SimulatedGateway::seeded(1.0, Duration::ZERO, 7);
        let outcome = gateway.execute(&attempt(&catalog)).await;

        assert!(outcome.success);
        assert!(outcome.reference.starts_with("EVC"));
        assert!(outcome.transaction_id.unwrap().starts_with("TXN-"));
        assert_eq!(outcome.message, DEMO_SUCCESS_MESSAGE);
        assert!(outcome.expires_at.is_some());
        assert_eq!(gateway.mode(), GatewayMode::Demo);
    }

    #[tokio::test]
    async fn test_failures_use_known_reasons() {
        let catalog = MethodCatalog::standard();
        let gateway = SimulatedGateway::seeded(0.0, Duration::ZERO, 7);
        for _ in 0..50 {
            let outcome = gateway.execute(&attempt(&catalog)).await;
            assert!(!outcome.success);
            assert!(outcome.transaction_id.is_none());
            assert!(DEMO_FAILURE_REASONS.contains(&outcome.message.as_str()));
        }
    }

    #[tokio::test]
    async fn test_success_ratio_near_default_rate() {
        let catalog = MethodCatalog::standard();
        let gateway = SimulatedGateway::seeded(0.95, Duration::ZERO, 2024);
        let attempt = attempt(&catalog);

        let mut successes = 0u32;
        for _ in 0..10_000 {
            if gateway.execute(&attempt).await.success {
                successes += 1;
            }
        }
        let ratio = f64::from(successes) / 10_000.0;
        assert!((0.93..=0.97).contains(&ratio), "ratio was {ratio}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_processing_time() {
        let catalog = MethodCatalog::standard();
        let gateway = SimulatedGateway::seeded(1.0, Duration::from_secs(5), 1);
        let started = tokio::time::Instant::now();
        gateway.execute(&attempt(&catalog)).await;
        assert!(started.elapsed() >= Duration::from_secs(5));
    }
}
