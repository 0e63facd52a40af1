use crate::domain::method::PaymentMethodId;
use crate::error::{PaymentError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_DEMO_SUCCESS_RATE: f64 = 0.95;
pub const DEFAULT_DEMO_PROCESSING_MS: u64 = 5000;
pub const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 30;

/// Variables that must all be set before production payments are fully usable.
pub const REQUIRED_PRODUCTION_VARS: [&str; 15] = [
    "PAYMENT_WEBHOOK_URL",
    "PAYMENT_API_KEY",
    "EVC_MERCHANT_ID",
    "EVC_API_KEY",
    "ZAAD_MERCHANT_ID",
    "ZAAD_API_KEY",
    "SAHAL_MERCHANT_ID",
    "SAHAL_API_KEY",
    "EDAHAB_MERCHANT_ID",
    "EDAHAB_API_KEY",
    "PREMIER_ACCOUNT_NUMBER",
    "DAHABSHIIL_AGENT_CODE",
    "DAHABSHIIL_API_KEY",
    "WORLDREMIT_PARTNER_ID",
    "WORLDREMIT_API_KEY",
];

/// How this business identifies itself to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PartnerIdentity {
    MerchantId(String),
    AgentCode(String),
    PartnerId(String),
    BankCode(String),
}

/// Credentials and endpoint for one provider gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayCredentials {
    pub identity: PartnerIdentity,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    /// USSD short code for mobile money operators.
    pub short_code: Option<&'static str>,
    /// Receiving account for bank transfers.
    pub account_number: Option<String>,
    pub swift_code: Option<String>,
}

impl GatewayCredentials {
    /// Whether the provider can take production traffic.
    pub fn is_configured(&self) -> bool {
        match self.identity {
            PartnerIdentity::BankCode(_) => self.account_number.is_some(),
            _ => self.api_key.is_some(),
        }
    }
}

/// Process-wide payment configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Simulate payments instead of calling provider gateways.
    pub demo_mode: bool,
    pub demo_success_rate: f64,
    pub demo_processing_time: Duration,
    pub gateway_timeout: Duration,
    /// Callback URL handed to providers for asynchronous notifications.
    pub webhook_url: Option<String>,
    pub api_key: Option<String>,
    gateways: HashMap<PaymentMethodId, GatewayCredentials>,
    missing: Vec<&'static str>,
}

impl PaymentConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup (environment, map, ...).
    ///
    /// Empty values are treated as unset. Demo mode is selected when
    /// `PAYMENT_DEMO_MODE` is true or when no `PAYMENT_API_KEY` is present.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("PAYMENT_API_KEY");
        let demo_flag = get("PAYMENT_DEMO_MODE")
            .map(|v| parse_bool("PAYMENT_DEMO_MODE", &v))
            .transpose()?
            .unwrap_or(false);
        let demo_mode = demo_flag || api_key.is_none();

        let demo_success_rate = get("PAYMENT_DEMO_SUCCESS_RATE")
            .map(|v| parse_number::<f64>("PAYMENT_DEMO_SUCCESS_RATE", &v))
            .transpose()?
            .unwrap_or(DEFAULT_DEMO_SUCCESS_RATE);
        if !(0.0..=1.0).contains(&demo_success_rate) {
            return Err(PaymentError::ConfigError(format!(
                "PAYMENT_DEMO_SUCCESS_RATE must be between 0 and 1, got {demo_success_rate}"
            )));
        }

        let demo_processing_ms = get("PAYMENT_DEMO_PROCESSING_MS")
            .map(|v| parse_number::<u64>("PAYMENT_DEMO_PROCESSING_MS", &v))
            .transpose()?
            .unwrap_or(DEFAULT_DEMO_PROCESSING_MS);
        let gateway_timeout_secs = get("PAYMENT_GATEWAY_TIMEOUT_SECS")
            .map(|v| parse_number::<u64>("PAYMENT_GATEWAY_TIMEOUT_SECS", &v))
            .transpose()?
            .unwrap_or(DEFAULT_GATEWAY_TIMEOUT_SECS);

        let gateways = if demo_mode {
            demo_gateways()
        } else {
            production_gateways(&get)
        };
        let missing = if demo_mode {
            Vec::new()
        } else {
            REQUIRED_PRODUCTION_VARS
                .into_iter()
                .filter(|key| get(key).is_none())
                .collect()
        };

        Ok(Self {
            demo_mode,
            demo_success_rate,
            demo_processing_time: Duration::from_millis(demo_processing_ms),
            gateway_timeout: Duration::from_secs(gateway_timeout_secs),
            webhook_url: get("PAYMENT_WEBHOOK_URL"),
            api_key,
            gateways,
            missing,
        })
    }

    /// Demo configuration with the default simulation parameters.
    pub fn demo() -> Self {
        Self {
            demo_mode: true,
            demo_success_rate: DEFAULT_DEMO_SUCCESS_RATE,
            demo_processing_time: Duration::from_millis(DEFAULT_DEMO_PROCESSING_MS),
            gateway_timeout: Duration::from_secs(DEFAULT_GATEWAY_TIMEOUT_SECS),
            webhook_url: None,
            api_key: None,
            gateways: demo_gateways(),
            missing: Vec::new(),
        }
    }

    pub fn gateway(&self, method: PaymentMethodId) -> &GatewayCredentials {
        // Both constructors populate every method.
        &self.gateways[&method]
    }

    /// Required production variables that are unset. Always empty in demo mode.
    pub fn missing_production_vars(&self) -> &[&'static str] {
        &self.missing
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(PaymentError::ConfigError(format!(
            "{key} must be a boolean, got '{other}'"
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| PaymentError::ConfigError(format!("{key} must be a number, got '{value}'")))
}

fn short_code(method: PaymentMethodId) -> Option<&'static str> {
    match method {
        PaymentMethodId::Evc => Some("*712*"),
        PaymentMethodId::Zaad => Some("*770*"),
        PaymentMethodId::Sahal => Some("*747*"),
        _ => None,
    }
}

fn demo_gateways() -> HashMap<PaymentMethodId, GatewayCredentials> {
    let demo = |method: PaymentMethodId, identity: PartnerIdentity, url: &str, key: &str| {
        (
            method,
            GatewayCredentials {
                identity,
                api_url: Some(url.to_string()),
                api_key: Some(key.to_string()),
                short_code: short_code(method),
                account_number: None,
                swift_code: None,
            },
        )
    };

    HashMap::from([
        demo(
            PaymentMethodId::Evc,
            PartnerIdentity::MerchantId("DEMO_EVC_MERCHANT".to_string()),
            "https://demo-api.hormuud.com/evc",
            "demo_evc_key_123",
        ),
        demo(
            PaymentMethodId::Zaad,
            PartnerIdentity::MerchantId("DEMO_ZAAD_MERCHANT".to_string()),
            "https://demo-api.telesom.com/zaad",
            "demo_zaad_key_456",
        ),
        demo(
            PaymentMethodId::Sahal,
            PartnerIdentity::MerchantId("DEMO_SAHAL_MERCHANT".to_string()),
            "https://demo-api.golis.com/sahal",
            "demo_sahal_key_789",
        ),
        demo(
            PaymentMethodId::Edahab,
            PartnerIdentity::MerchantId("DEMO_EDAHAB_MERCHANT".to_string()),
            "https://demo-api.hormuud.com/edahab",
            "demo_edahab_key_012",
        ),
        (
            PaymentMethodId::PremierBank,
            GatewayCredentials {
                identity: PartnerIdentity::BankCode("DEMO_PREMIER".to_string()),
                api_url: None,
                api_key: None,
                short_code: None,
                account_number: Some("1234567890".to_string()),
                swift_code: Some("PREMSOMA".to_string()),
            },
        ),
        demo(
            PaymentMethodId::Dahabshiil,
            PartnerIdentity::AgentCode("DEMO_DAHABSHIIL".to_string()),
            "https://demo-api.dahabshiil.com",
            "demo_dahabshiil_key_345",
        ),
        demo(
            PaymentMethodId::WorldRemit,
            PartnerIdentity::PartnerId("DEMO_WORLDREMIT".to_string()),
            "https://demo-api.worldremit.com",
            "demo_worldremit_key_678",
        ),
    ])
}

fn production_gateways<G>(get: &G) -> HashMap<PaymentMethodId, GatewayCredentials>
where
    G: Fn(&str) -> Option<String>,
{
    let api = |method: PaymentMethodId, prefix: &str, identity: PartnerIdentity, default_url: &str| {
        (
            method,
            GatewayCredentials {
                identity,
                api_url: Some(
                    get(&format!("{prefix}_API_URL")).unwrap_or_else(|| default_url.to_string()),
                ),
                api_key: get(&format!("{prefix}_API_KEY")),
                short_code: short_code(method),
                account_number: None,
                swift_code: None,
            },
        )
    };
    let id = |key: &str| get(key).unwrap_or_default();

    HashMap::from([
        api(
            PaymentMethodId::Evc,
            "EVC",
            PartnerIdentity::MerchantId(id("EVC_MERCHANT_ID")),
            "https://api.hormuud.com/evc",
        ),
        api(
            PaymentMethodId::Zaad,
            "ZAAD",
            PartnerIdentity::MerchantId(id("ZAAD_MERCHANT_ID")),
            "https://api.telesom.com/zaad",
        ),
        api(
            PaymentMethodId::Sahal,
            "SAHAL",
            PartnerIdentity::MerchantId(id("SAHAL_MERCHANT_ID")),
            "https://api.golis.com/sahal",
        ),
        api(
            PaymentMethodId::Edahab,
            "EDAHAB",
            PartnerIdentity::MerchantId(id("EDAHAB_MERCHANT_ID")),
            "https://api.hormuud.com/edahab",
        ),
        (
            PaymentMethodId::PremierBank,
            GatewayCredentials {
                identity: PartnerIdentity::BankCode(id("PREMIER_BANK_CODE")),
                api_url: get("PREMIER_API_URL"),
                api_key: get("PREMIER_API_KEY"),
                short_code: None,
                account_number: get("PREMIER_ACCOUNT_NUMBER"),
                swift_code: get("PREMIER_SWIFT_CODE"),
            },
        ),
        api(
            PaymentMethodId::Dahabshiil,
            "DAHABSHIIL",
            PartnerIdentity::AgentCode(id("DAHABSHIIL_AGENT_CODE")),
            "https://api.dahabshiil.com",
        ),
        api(
            PaymentMethodId::WorldRemit,
            "WORLDREMIT",
            PartnerIdentity::PartnerId(id("WORLDREMIT_PARTNER_ID")),
            "https://api.worldremit.com",
        ),
    ])
}
