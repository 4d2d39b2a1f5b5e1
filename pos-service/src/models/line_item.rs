//! Line item model for pos-service.

use crate::error::PosError;
use rust_decimal::Decimal;
use serde::Serialize;

/// One cart entry. `amount` is always `qty * rate - discount`; the fields are
/// private so it cannot drift from its inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    id: u32,
    name: String,
    rate: Decimal,
    qty: Decimal,
    discount: Decimal,
    amount: Decimal,
}

impl LineItem {
    /// Price a line. Fails when `qty * rate - discount` does not fit in a
    /// `Decimal`.
    pub(crate) fn new(
        id: u32,
        name: String,
        rate: Decimal,
        qty: Decimal,
        discount: Decimal,
    ) -> Result<Self, PosError> {
        let amount = qty
            .checked_mul(rate)
            .and_then(|gross| gross.checked_sub(discount))
            .ok_or_else(|| {
                PosError::validation(format!(
                    "Line amount out of range for rate {} and quantity {}",
                    rate, qty
                ))
            })?;

        Ok(Self {
            id,
            name,
            rate,
            qty,
            discount,
            amount,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }

    pub fn qty(&self) -> Decimal {
        self.qty
    }

    pub fn discount(&self) -> Decimal {
        self.discount
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_is_qty_times_rate_less_discount() {
        let line = LineItem::new(
            1,
            "Tea".into(),
            Decimal::new(100, 0),
            Decimal::new(2, 0),
            Decimal::new(10, 0),
        )
        .unwrap();

        assert_eq!(line.amount(), Decimal::new(190, 0));
        assert_eq!(line.name(), "Tea");
        assert_eq!(line.id(), 1);
    }

    #[test]
    fn overflowing_amount_is_rejected() {
        let result = LineItem::new(1, "Gold".into(), Decimal::MAX, Decimal::TWO, Decimal::ZERO);
        assert!(matches!(result, Err(PosError::Validation(_))));

        let result = LineItem::new(1, "Gold".into(), Decimal::MAX, Decimal::ONE, Decimal::MAX);
        assert!(result.is_ok());
    }
}
