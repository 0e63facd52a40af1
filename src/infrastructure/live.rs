use crate::config::{GatewayCredentials, PartnerIdentity, PaymentConfig};
use crate::domain::method::{MethodCategory, PaymentMethodId};
use crate::domain::money::Money;
use crate::domain::ports::{GatewayMode, GatewayOutcome, PaymentAttempt, PaymentGateway};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// JSON body posted to a provider gateway.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GatewayRequest<'a> {
    #[serde(flatten)]
    identity: &'a PartnerIdentity,
    amount: Money,
    currency: &'a str,
    reference: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    callback_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone_number: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    account_number: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    short_code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    beneficiary_account: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    swift_code: Option<&'a str>,
}

/// Gateway used in production: forwards each attempt to the provider's API.
///
/// Requests carry bearer authentication with the provider key and are bounded
/// by the configured timeout. Transport failures, timeouts and non-2xx replies
/// all become unsuccessful outcomes.
pub struct LiveGateway {
    client: reqwest::Client,
    credentials: HashMap<PaymentMethodId, GatewayCredentials>,
    callback_url: Option<String>,
}

impl LiveGateway {
    pub fn from_config(config: &PaymentConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.gateway_timeout)
            .build()
            .map_err(|e| PaymentError::ConfigError(format!("HTTP client: {e}")))?;
        let credentials = PaymentMethodId::ALL
            .into_iter()
            .map(|id| (id, config.gateway(id).clone()))
            .collect();
        Ok(Self {
            client,
            credentials,
            callback_url: config.webhook_url.clone(),
        })
    }

    fn credentials(&self, method: PaymentMethodId) -> Result<&GatewayCredentials> {
        self.credentials
            .get(&method)
            .ok_or_else(|| PaymentError::GatewayError(format!("no credentials for {method}")))
    }

    async fn mobile_money(&self, attempt: &PaymentAttempt<'_>) -> Result<Value> {
        let creds = self.credentials(attempt.method.id)?;
        let body = GatewayRequest {
            phone_number: attempt.phone_number,
            short_code: creds.short_code,
            ..self.base_request(attempt, creds)
        };
        self.post(attempt, creds, "payments", &body).await
    }

    async fn mobile_app(&self, attempt: &PaymentAttempt<'_>) -> Result<Value> {
        let creds = self.credentials(attempt.method.id)?;
        let body = GatewayRequest {
            phone_number: attempt.phone_number,
            ..self.base_request(attempt, creds)
        };
        self.post(attempt, creds, "payment-requests", &body).await
    }

    async fn bank_transfer(&self, attempt: &PaymentAttempt<'_>) -> Result<Value> {
        let creds = self.credentials(attempt.method.id)?;
        let body = GatewayRequest {
            account_number: attempt.account_number,
            beneficiary_account: creds.account_number.as_deref(),
            swift_code: creds.swift_code.as_deref(),
            ..self.base_request(attempt, creds)
        };
        self.post(attempt, creds, "transfers", &body).await
    }

    async fn remittance(&self, attempt: &PaymentAttempt<'_>) -> Result<Value> {
        let creds = self.credentials(attempt.method.id)?;
        let body = GatewayRequest {
            phone_number: attempt.phone_number,
            ..self.base_request(attempt, creds)
        };
        self.post(attempt, creds, "remittances", &body).await
    }

    fn base_request<'a>(
        &'a self,
        attempt: &'a PaymentAttempt<'_>,
        creds: &'a GatewayCredentials,
    ) -> GatewayRequest<'a> {
        GatewayRequest {
            identity: &creds.identity,
            amount: attempt.amount,
            currency: attempt.currency,
            reference: attempt.reference,
            description: &attempt.description,
            callback_url: self.callback_url.as_deref(),
            phone_number: None,
            account_number: None,
            short_code: None,
            beneficiary_account: None,
            swift_code: None,
        }
    }

    async fn post(
        &self,
        attempt: &PaymentAttempt<'_>,
        creds: &GatewayCredentials,
        path: &str,
        body: &GatewayRequest<'_>,
    ) -> Result<Value> {
        let base = creds.api_url.as_deref().ok_or_else(|| {
            PaymentError::GatewayError(format!(
                "no gateway endpoint configured for {}",
                attempt.method.name
            ))
        })?;
        let url = format!("{}/{path}", base.trim_end_matches('/'));

        let mut request = self.client.post(&url).json(body);
        if let Some(key) = creds.api_key.as_deref() {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                PaymentError::GatewayError(format!("{} gateway timed out", attempt.method.provider))
            } else {
                PaymentError::GatewayError(format!(
                    "{} gateway unreachable: {e}",
                    attempt.method.provider
                ))
            }
        })?;

        let status = response.status();
        let payload = response.json::<Value>().await.unwrap_or(Value::Null);
        if !status.is_success() {
            return Err(PaymentError::GatewayError(format!(
                "{} gateway returned HTTP {}",
                attempt.method.provider,
                status.as_u16()
            )));
        }
        Ok(payload)
    }
}

/// Reads the provider's transaction id from a gateway reply.
fn extract_transaction_id(payload: &Value) -> Option<String> {
    ["transactionId", "transaction_id", "id"]
        .iter()
        .filter_map(|key| payload.get(*key))
        .find_map(|value| match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

#[async_trait]
impl PaymentGateway for LiveGateway {
    fn mode(&self) -> GatewayMode {
        GatewayMode::Production
    }

    async fn execute(&self, attempt: &PaymentAttempt<'_>) -> GatewayOutcome {
        let result = match attempt.method.category {
            MethodCategory::MobileMoney => self.mobile_money(attempt).await,
            MethodCategory::MobileApp => self.mobile_app(attempt).await,
            MethodCategory::BankTransfer => self.bank_transfer(attempt).await,
            MethodCategory::Remittance => self.remittance(attempt).await,
        };

        let payload = match result {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(payment_id = attempt.payment_id, error = %e, "gateway call failed");
                return GatewayOutcome::failure(attempt.reference, e.to_string());
            }
        };

        match extract_transaction_id(&payload) {
            Some(transaction_id) => {
                tracing::info!(
                    payment_id = attempt.payment_id,
                    transaction_id = %transaction_id,
                    "gateway accepted payment"
                );
                GatewayOutcome {
                    success: true,
                    reference: attempt.reference.to_string(),
                    transaction_id: Some(transaction_id),
                    message: format!("Payment submitted to {}", attempt.method.provider),
                    expires_at: None,
                    provider_response: Some(payload),
                }
            }
            None => {
                tracing::warn!(
                    payment_id = attempt.payment_id,
                    "gateway reply carried no transaction id"
                );
                GatewayOutcome {
                    provider_response: Some(payload),
                    ..GatewayOutcome::failure(
                        attempt.reference,
                        "Gateway response did not include a transaction id",
                    )
                }
            }
        }
    }
}
