use crate::config::PaymentConfig;
use crate::domain::method::{
    InstructionTemplates, Language, MethodCategory, PaymentMethod, PaymentMethodId,
};
use crate::domain::money::Money;
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Public view of an active method, as listed to payers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodSummary {
    pub id: PaymentMethodId,
    pub name: &'static str,
    pub provider: &'static str,
    pub min_amount: Money,
    pub max_amount: Money,
    pub fee: Decimal,
    pub currency: &'static str,
    #[serde(rename = "type")]
    pub category: MethodCategory,
}

impl From<&PaymentMethod> for MethodSummary {
    fn from(method: &PaymentMethod) -> Self {
        Self {
            id: method.id,
            name: method.name,
            provider: method.provider,
            min_amount: method.min_amount,
            max_amount: method.max_amount,
            fee: method.fee_percent,
            currency: method.currency,
            category: method.category,
        }
    }
}

/// The set of payment methods configured for this process.
///
/// Built once at startup and shared read-only (typically behind an `Arc`).
/// Entries keep their declaration order, which is also the listing order.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCatalog {
    methods: Vec<PaymentMethod>,
}

impl MethodCatalog {
    pub fn new(methods: Vec<PaymentMethod>) -> Self {
        Self { methods }
    }

    /// The built-in Somali method table with every method active.
    pub fn standard() -> Self {
        Self::new(PaymentMethodId::ALL.into_iter().map(standard_method).collect())
    }

    /// Builds the catalog for `config`.
    ///
    /// In demo mode every method is available. In production a method is only
    /// active when its gateway credentials are present.
    pub fn from_config(config: &PaymentConfig) -> Self {
        let mut catalog = Self::standard();
        if !config.demo_mode {
            for method in &mut catalog.methods {
                method.is_active = config.gateway(method.id).is_configured();
            }
        }
        catalog
    }

    pub fn get(&self, id: PaymentMethodId) -> Option<&PaymentMethod> {
        self.methods.iter().find(|m| m.id == id)
    }

    /// Resolves a method id as supplied by a caller.
    ///
    /// Unknown ids and inactive methods are both reported as `InvalidMethod`.
    pub fn lookup(&self, id: &str) -> Result<&PaymentMethod> {
        let parsed: PaymentMethodId = id.parse()?;
        self.get(parsed)
            .filter(|m| m.is_active)
            .ok_or_else(|| PaymentError::InvalidMethod(id.to_string()))
    }

    pub fn list_active_methods(&self) -> Vec<MethodSummary> {
        self.methods
            .iter()
            .filter(|m| m.is_active)
            .map(MethodSummary::from)
            .collect()
    }

    /// Instructions for `id`, or an empty string when the method is unknown or inactive.
    pub fn instructions(&self, id: PaymentMethodId, reference: &str, language: Language) -> String {
        match self.get(id) {
            Some(method) if method.is_active => method.format_instructions(reference, language),
            _ => String::new(),
        }
    }
}

impl Default for MethodCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn standard_method(id: PaymentMethodId) -> PaymentMethod {
    let (name, provider, category, min, max, fee, instructions) = match id {
        PaymentMethodId::Evc => (
            "EVC Plus",
            "Hormuud",
            MethodCategory::MobileMoney,
            dec!(1),
            dec!(10000),
            dec!(0.5),
            InstructionTemplates {
                en: "Dial: *712*{reference}# or Send to: 252-61-XXXXXXX",
                ar: "وجه الدفع إلى: *712*{reference}#\nأو إرسال إلى: 252-61-XXXXXXX",
            },
        ),
        PaymentMethodId::Zaad => (
            "Zaad Service",
            "Telesom",
            MethodCategory::MobileMoney,
            dec!(1),
            dec!(5000),
            dec!(0.3),
            InstructionTemplates {
                en: "Dial: *770*{reference}# or Send to: 252-63-XXXXXXX",
                ar: "وجه الدفع إلى: *770*{reference}#\nأو إرسال إلى: 252-63-XXXXXXX",
            },
        ),
        PaymentMethodId::Sahal => (
            "Sahal",
            "Golis",
            MethodCategory::MobileMoney,
            dec!(1),
            dec!(3000),
            dec!(0.4),
            InstructionTemplates {
                en: "Dial: *747*{reference}# or Send to: 252-90-XXXXXXX",
                ar: "وجه الدفع إلى: *747*{reference}#\nأو إرسال إلى: 252-90-XXXXXXX",
            },
        ),
        PaymentMethodId::Edahab => (
            "eDahab",
            "Hormuud",
            MethodCategory::MobileApp,
            dec!(1),
            dec!(15000),
            dec!(0.25),
            InstructionTemplates {
                en: "Open eDahab app, go to Pay\nReference: {reference}",
                ar: "افتح تطبيق eDahab واذهب للدفع\nالرقم المرجعي: {reference}",
            },
        ),
        PaymentMethodId::PremierBank => (
            "Premier Bank",
            "Premier Bank",
            MethodCategory::BankTransfer,
            dec!(10),
            dec!(50000),
            dec!(0),
            InstructionTemplates {
                en: "Bank Transfer to:\nAccount: 1234567890\nReference: {reference}",
                ar: "تحويل بنكي إلى:\nرقم الحساب: 1234567890\nالرقم المرجعي: {reference}",
            },
        ),
        PaymentMethodId::Dahabshiil => (
            "Dahabshiil",
            "Dahabshiil",
            MethodCategory::Remittance,
            dec!(5),
            dec!(25000),
            dec!(0.2),
            InstructionTemplates {
                en: "Visit nearest Dahabshiil branch\nReference: {reference}",
                ar: "زيارة أقرب فرع داهب شيل\nالرقم المرجعي: {reference}",
            },
        ),
        PaymentMethodId::WorldRemit => (
            "WorldRemit",
            "WorldRemit",
            MethodCategory::Remittance,
            dec!(10),
            dec!(20000),
            dec!(1.0),
            InstructionTemplates {
                en: "Send via WorldRemit app\nReference: {reference}",
                ar: "إرسال عبر تطبيق WorldRemit\nالرقم المرجعي: {reference}",
            },
        ),
    };

    PaymentMethod {
        id,
        name,
        provider,
        category,
        min_amount: Money::new(min),
        max_amount: Money::new(max),
        fee_percent: fee,
        currency: "USD",
        is_active: true,
        instructions,
    }
}
