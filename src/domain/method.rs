use crate::domain::money::Money;
use crate::error::PaymentError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder substituted with the payment reference in instruction templates.
pub const REFERENCE_PLACEHOLDER: &str = "{reference}";

/// The closed set of payment methods the engine knows how to price and route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodId {
    Evc,
    Zaad,
    Sahal,
    Edahab,
    PremierBank,
    Dahabshiil,
    WorldRemit,
}

impl PaymentMethodId {
    pub const ALL: [PaymentMethodId; 7] = [
        PaymentMethodId::Evc,
        PaymentMethodId::Zaad,
        PaymentMethodId::Sahal,
        PaymentMethodId::Edahab,
        PaymentMethodId::PremierBank,
        PaymentMethodId::Dahabshiil,
        PaymentMethodId::WorldRemit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethodId::Evc => "evc",
            PaymentMethodId::Zaad => "zaad",
            PaymentMethodId::Sahal => "sahal",
            PaymentMethodId::Edahab => "edahab",
            PaymentMethodId::PremierBank => "premier_bank",
            PaymentMethodId::Dahabshiil => "dahabshiil",
            PaymentMethodId::WorldRemit => "world_remit",
        }
    }

    /// Brand prefix used for provider-style demo references.
    pub fn demo_prefix(&self) -> &'static str {
        match self {
            PaymentMethodId::Evc => "EVC",
            PaymentMethodId::Zaad => "ZAD",
            PaymentMethodId::Sahal => "SHL",
            PaymentMethodId::Edahab => "EDH",
            PaymentMethodId::PremierBank => "PBK",
            PaymentMethodId::Dahabshiil => "DBS",
            PaymentMethodId::WorldRemit => "WRM",
        }
    }
}

impl fmt::Display for PaymentMethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethodId {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == needle)
            .ok_or_else(|| PaymentError::InvalidMethod(s.to_string()))
    }
}

/// Classification of a method; decides which contact field the payer must supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodCategory {
    MobileMoney,
    MobileApp,
    BankTransfer,
    Remittance,
}

/// Contact detail that must accompany a request for a given category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredContact {
    PhoneNumber,
    AccountNumber,
    Nothing,
}

impl MethodCategory {
    pub fn required_contact(&self) -> RequiredContact {
        match self {
            MethodCategory::MobileMoney | MethodCategory::MobileApp => RequiredContact::PhoneNumber,
            MethodCategory::BankTransfer => RequiredContact::AccountNumber,
            MethodCategory::Remittance => RequiredContact::Nothing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Language {
    /// Parses a language code, falling back to English for anything unsupported.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "ar" => Language::Ar,
            _ => Language::En,
        }
    }
}

/// Instruction templates for each supported language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionTemplates {
    pub en: &'static str,
    pub ar: &'static str,
}

impl InstructionTemplates {
    pub fn get(&self, language: Language) -> &'static str {
        match language {
            Language::En => self.en,
            Language::Ar => self.ar,
        }
    }
}

/// An immutable catalog entry describing one payment method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub name: &'static str,
    pub provider: &'static str,
    pub category: MethodCategory,
    pub min_amount: Money,
    pub max_amount: Money,
    /// Fee as a percentage of the base amount (0.5 means 0.5%).
    pub fee_percent: Decimal,
    pub currency: &'static str,
    pub is_active: bool,
    pub instructions: InstructionTemplates,
}

impl PaymentMethod {
    /// Renders the payer instructions for `reference` in `language`.
    ///
    /// Every occurrence of the `{reference}` placeholder is replaced.
    pub fn format_instructions(&self, reference: &str, language: Language) -> String {
        self.instructions
            .get(language)
            .replace(REFERENCE_PLACEHOLDER, reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_id_parsing() {
        assert_eq!("evc".parse::<PaymentMethodId>().unwrap(), PaymentMethodId::Evc);
        assert_eq!(
            " Premier_Bank ".parse::<PaymentMethodId>().unwrap(),
            PaymentMethodId::PremierBank
        );
        assert!(matches!(
            "amtel".parse::<PaymentMethodId>(),
            Err(PaymentError::InvalidMethod(_))
        ));
    }

    #[test]
    fn test_method_id_serde_matches_as_str() {
        for id in PaymentMethodId::ALL {
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.as_str()));
        }
    }

    #[test]
    fn test_required_contact_by_category() {
        assert_eq!(
            MethodCategory::MobileMoney.required_contact(),
            RequiredContact::PhoneNumber
        );
        assert_eq!(
            MethodCategory::MobileApp.required_contact(),
            RequiredContact::PhoneNumber
        );
        assert_eq!(
            MethodCategory::BankTransfer.required_contact(),
            RequiredContact::AccountNumber
        );
        assert_eq!(
            MethodCategory::Remittance.required_contact(),
            RequiredContact::Nothing
        );
    }

    #[test]
    fn test_language_fallback() {
        assert_eq!(Language::from_code("ar"), Language::Ar);
        assert_eq!(Language::from_code("AR"), Language::Ar);
        assert_eq!(Language::from_code("so"), Language::En);
        assert_eq!(Language::from_code(""), Language::En);
    }
}
