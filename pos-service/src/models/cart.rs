//! The in-progress invoice.

use super::{money, DraftLine, LineItem};
use crate::error::PosError;
use rust_decimal::Decimal;
use serde::Serialize;

/// Line items for the invoice currently being built.
///
/// Line ids start at 1 and are never reused for the life of the cart, even
/// after deletions.
#[derive(Debug, Clone, Serialize)]
pub struct Cart {
    invoice_no: u64,
    next_line_id: u32,
    lines: Vec<LineItem>,
}

impl Cart {
    pub fn new(invoice_no: u64) -> Self {
        Self {
            invoice_no,
            next_line_id: 1,
            lines: Vec::new(),
        }
    }

    /// Validate the staged fields and append a new line.
    pub fn add_line(&mut self, draft: &DraftLine) -> Result<LineItem, PosError> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(PosError::validation("Product name is required"));
        }
        let rate = parse_rate(&draft.rate)?;
        let qty = parse_qty(&draft.qty)?;
        let discount = parse_discount(&draft.discount)?;

        let next_line_id = self
            .next_line_id
            .checked_add(1)
            .ok_or_else(|| PosError::validation("Cart has no line ids left"))?;
        let line = LineItem::new(self.next_line_id, name.to_string(), rate, qty, discount)?;

        let mut lines = self.lines.clone();
        lines.push(line.clone());
        ensure_totals_fit(&lines)?;

        self.lines = lines;
        self.next_line_id = next_line_id;
        Ok(line)
    }

    /// Change rate, quantity and discount of an existing line. Its id and name
    /// are kept.
    pub fn edit_line(
        &mut self,
        id: u32,
        rate: &str,
        qty: &str,
        discount: &str,
    ) -> Result<LineItem, PosError> {
        let position = self
            .lines
            .iter()
            .position(|line| line.id() == id)
            .ok_or_else(|| PosError::not_found(format!("Line {} not found", id)))?;

        let rate = parse_rate(rate)?;
        let qty = parse_qty(qty)?;
        let discount = parse_discount(discount)?;

        let current = &self.lines[position];
        let line = LineItem::new(id, current.name().to_string(), rate, qty, discount)?;

        let mut lines = self.lines.clone();
        lines[position] = line.clone();
        ensure_totals_fit(&lines)?;

        self.lines = lines;
        Ok(line)
    }

    /// Remove a line. Returns whether a line was removed; an unknown id is not
    /// an error.
    pub fn delete_line(&mut self, id: u32) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.id() != id);
        self.lines.len() != before
    }

    pub fn invoice_no(&self) -> u64 {
        self.invoice_no
    }

    pub fn next_line_id(&self) -> u32 {
        self.next_line_id
    }

    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn line(&self, id: u32) -> Option<&LineItem> {
        self.lines.iter().find(|line| line.id() == id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_count(&self) -> u32 {
        // Never more lines than ids handed out, and ids are u32.
        u32::try_from(self.lines.len()).unwrap_or(u32::MAX)
    }

    // The sums below cannot overflow: every mutation goes through
    // `ensure_totals_fit`, and it holds for any subset of the lines.
    pub fn total_price(&self) -> Decimal {
        self.lines.iter().map(LineItem::amount).sum()
    }

    pub fn total_discount(&self) -> Decimal {
        self.lines.iter().map(LineItem::discount).sum()
    }

    /// Change owed to the customer (negative while underpaid).
    pub fn balance(&self, paid_amount: Decimal) -> Result<Decimal, PosError> {
        paid_amount
            .checked_sub(self.total_price())
            .ok_or_else(|| PosError::validation("Balance out of range for paid amount"))
    }
}

/// Reject a set of lines whose totals would not fit in a `Decimal`.
///
/// Bounding the sum of absolute amounts (and of discounts, which are never
/// negative) also bounds every partial sum, so totals stay in range after
/// lines are deleted or reordered.
fn ensure_totals_fit(lines: &[LineItem]) -> Result<(), PosError> {
    let amounts = lines
        .iter()
        .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line.amount().abs()));
    let discounts = lines
        .iter()
        .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line.discount()));

    match (amounts, discounts) {
        (Some(_), Some(_)) => Ok(()),
        _ => Err(PosError::validation("Cart total out of range")),
    }
}

fn parse_rate(input: &str) -> Result<Decimal, PosError> {
    match money::parse(input) {
        Some(rate) if rate >= Decimal::ZERO => Ok(rate),
        _ => Err(PosError::validation(format!(
            "Rate must be a non-negative number, got '{}'",
            input
        ))),
    }
}

fn parse_qty(input: &str) -> Result<Decimal, PosError> {
    match money::parse(input) {
        Some(qty) if qty > Decimal::ZERO => Ok(qty),
        _ => Err(PosError::validation(format!(
            "Quantity must be greater than zero, got '{}'",
            input
        ))),
    }
}

// Blank or non-numeric discounts count as no discount.
fn parse_discount(input: &str) -> Result<Decimal, PosError> {
    match money::parse(input) {
        Some(discount) if discount < Decimal::ZERO => Err(PosError::validation(format!(
            "Discount cannot be negative, got '{}'",
            input
        ))),
        Some(discount) => Ok(discount),
        None => Ok(Decimal::ZERO),
    }
}
