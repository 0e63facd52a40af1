use crate::domain::money::Money;
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The room details the payment engine needs to price a stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub slug: String,
    pub name: String,
    /// Nightly list price.
    pub price: Decimal,
    /// Discount as a percentage of the list price.
    #[serde(default)]
    pub discount: Decimal,
}

impl Room {
    /// List price less the room's percentage discount, or `None` on overflow.
    pub fn nightly_rate(&self) -> Option<Money> {
        let discount = (self.price / Decimal::ONE_HUNDRED).checked_mul(self.discount)?;
        self.price.checked_sub(discount).map(Money::new)
    }

    /// Base amount for a stay of `nights` nights.
    pub fn stay_cost(&self, nights: u32) -> Result<Money> {
        self.nightly_rate()
            .and_then(|rate| rate.checked_mul(nights))
            .ok_or_else(|| {
                PaymentError::InvalidRequest(format!(
                    "stay of {nights} nights in {} cannot be priced",
                    self.slug
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn room(price: Decimal, discount: Decimal) -> Room {
        Room {
            id: "room-1".to_string(),
            slug: "ocean-suite".to_string(),
            name: "Ocean Suite".to_string(),
            price,
            discount,
        }
    }

    #[test]
    fn test_nightly_rate_applies_discount() {
        assert_eq!(room(dec!(120), dec!(25)).nightly_rate(), Some(Money::new(dec!(90))));
        assert_eq!(room(dec!(99.99), dec!(0)).nightly_rate(), Some(Money::new(dec!(99.99))));
    }

    #[test]
    fn test_stay_cost() {
        assert_eq!(room(dec!(50), dec!(10)).stay_cost(3).unwrap(), Money::new(dec!(135)));
    }

    #[test]
    fn test_stay_cost_overflow_is_rejected() {
        let penthouse = room(Decimal::MAX, dec!(0));
        assert!(matches!(
            penthouse.stay_cost(u32::MAX),
            Err(PaymentError::InvalidRequest(_))
        ));
        assert!(matches!(
            room(Decimal::MAX, dec!(-500)).stay_cost(1),
            Err(PaymentError::InvalidRequest(_))
        ));
    }
}
