//! Parsing and display of operator-entered amounts.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Parse operator input as a decimal. Accepts plain (`12.50`) and scientific
/// (`1.25e1`) notation; surrounding whitespace is ignored.
pub fn parse(input: &str) -> Option<Decimal> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Round half away from zero to two places.
pub fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Two-decimal rendering, e.g. `190.00`.
pub fn display(value: Decimal) -> String {
    format!("{:.2}", round(value))
}
