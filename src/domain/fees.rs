//! Fee and bounds rules applied to a payment before any record is created.

use crate::domain::method::{PaymentMethod, RequiredContact};
use crate::domain::money::Money;
use crate::error::{AmountBound, PaymentError, Result};
use serde::Serialize;

/// The amounts owed for a payment through a specific method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeBreakdown {
    pub base: Money,
    pub fee: Money,
    pub total: Money,
}

/// Computes the payable total: `base + base * fee / 100`, at currency precision.
pub fn compute_total(base: Money, method: &PaymentMethod) -> FeeBreakdown {
    let fee = base.percentage(method.fee_percent);
    FeeBreakdown {
        base,
        fee,
        total: base + fee,
    }
}

/// Rejects totals outside the method's configured `[min, max]` range.
pub fn validate_bounds(total: Money, method: &PaymentMethod) -> Result<()> {
    let bound = if total < method.min_amount {
        AmountBound::Minimum
    } else if total > method.max_amount {
        AmountBound::Maximum
    } else {
        return Ok(());
    };

    let limit = match bound {
        AmountBound::Minimum => method.min_amount,
        AmountBound::Maximum => method.max_amount,
    };
    Err(PaymentError::AmountOutOfRange {
        method: method.name.to_string(),
        bound,
        limit,
        total,
        min: method.min_amount,
        max: method.max_amount,
    })
}

/// Checks that the contact detail required by the method's category is present.
///
/// Blank values are treated as missing.
pub fn validate_required_fields(
    method: &PaymentMethod,
    phone_number: Option<&str>,
    account_number: Option<&str>,
) -> Result<()> {
    let present = |value: Option<&str>| value.is_some_and(|v| !v.trim().is_empty());

    match method.category.required_contact() {
        RequiredContact::PhoneNumber if !present(phone_number) => {
            Err(PaymentError::MissingContactInfo {
                method: method.name.to_string(),
            })
        }
        RequiredContact::AccountNumber if !present(account_number) => {
            Err(PaymentError::MissingAccountInfo {
                method: method.name.to_string(),
            })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::MethodCatalog;
    use crate::domain::method::PaymentMethodId;
    use rust_decimal_macros::dec;

    fn method(id: PaymentMethodId) -> PaymentMethod {
        MethodCatalog::standard().get(id).unwrap().clone()
    }

    #[test]
    fn test_total_matches_fee_formula_for_every_method() {
        let catalog = MethodCatalog::standard();
        for base in [dec!(1), dec!(2.5), dec!(99.99), dec!(1234.56)] {
            for summary in catalog.list_active_methods() {
                let m = catalog.get(summary.id).unwrap();
                let breakdown = compute_total(Money::new(base), m);
                let expected = Money::new(base * (dec!(1) + m.fee_percent / dec!(100)));
                assert_eq!(breakdown.total, expected, "{} at {}", m.name, base);
                assert_eq!(breakdown.base + breakdown.fee, breakdown.total);
            }
        }
    }

    #[test]
    fn test_premier_bank_scenario() {
        let m = method(PaymentMethodId::PremierBank);
        let breakdown = compute_total(Money::new(dec!(100)), &m);
        assert_eq!(breakdown.total, Money::new(dec!(100.00)));
        assert_eq!(breakdown.fee, Money::ZERO);
        assert!(validate_bounds(breakdown.total, &m).is_ok());
        assert!(matches!(
            validate_required_fields(&m, Some("252611234567"), None),
            Err(PaymentError::MissingAccountInfo { .. })
        ));
        assert!(validate_required_fields(&m, None, Some("0012345")).is_ok());
    }

    #[test]
    fn test_evc_scenario() {
        let m = method(PaymentMethodId::Evc);
        let breakdown = compute_total(Money::new(dec!(50)), &m);
        assert_eq!(breakdown.fee, Money::new(dec!(0.25)));
        assert_eq!(breakdown.total, Money::new(dec!(50.25)));
        assert!(validate_bounds(breakdown.total, &m).is_ok());
        assert!(matches!(
            validate_required_fields(&m, None, None),
            Err(PaymentError::MissingContactInfo { .. })
        ));
    }

    #[test]
    fn test_sahal_small_amount_passes() {
        let m = method(PaymentMethodId::Sahal);
        let breakdown = compute_total(Money::new(dec!(2)), &m);
        assert_eq!(breakdown.total, Money::new(dec!(2.01)));
        assert!(validate_bounds(breakdown.total, &m).is_ok());
    }

    #[test]
    fn test_zaad_total_over_maximum() {
        let m = method(PaymentMethodId::Zaad);
        let breakdown = compute_total(Money::new(dec!(5000)), &m);
        assert_eq!(breakdown.total, Money::new(dec!(5015.00)));

        let err = validate_bounds(breakdown.total, &m).unwrap_err();
        match &err {
            PaymentError::AmountOutOfRange {
                bound, limit, min, max, ..
            } => {
                assert_eq!(*bound, AmountBound::Maximum);
                assert_eq!(*limit, Money::new(dec!(5000)));
                assert_eq!(*min, Money::new(dec!(1)));
                assert_eq!(*max, Money::new(dec!(5000)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().starts_with("Maximum amount for Zaad Service is $5000.00"));
    }

    #[test]
    fn test_total_below_minimum() {
        let m = method(PaymentMethodId::WorldRemit);
        let breakdown = compute_total(Money::new(dec!(5)), &m);
        let err = validate_bounds(breakdown.total, &m).unwrap_err();
        assert!(err.to_string().starts_with("Minimum amount for WorldRemit is $10.00"));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let m = method(PaymentMethodId::PremierBank);
        assert!(validate_bounds(Money::new(dec!(10)), &m).is_ok());
        assert!(validate_bounds(Money::new(dec!(50000)), &m).is_ok());
        assert!(validate_bounds(Money::new(dec!(9.99)), &m).is_err());
        assert!(validate_bounds(Money::new(dec!(50000.01)), &m).is_err());
    }

    #[test]
    fn test_mobile_methods_require_phone() {
        for id in [
            PaymentMethodId::Evc,
            PaymentMethodId::Zaad,
            PaymentMethodId::Sahal,
            PaymentMethodId::Edahab,
        ] {
            let m = method(id);
            assert!(matches!(
                validate_required_fields(&m, None, Some("123")),
                Err(PaymentError::MissingContactInfo { .. })
            ));
            assert!(matches!(
                validate_required_fields(&m, Some("   "), None),
                Err(PaymentError::MissingContactInfo { .. })
            ));
            assert!(validate_required_fields(&m, Some("615551234"), None).is_ok());
        }
    }

    #[test]
    fn test_remittance_requires_nothing() {
        let m = method(PaymentMethodId::Dahabshiil);
        assert!(validate_required_fields(&m, None, None).is_ok());
    }
}
