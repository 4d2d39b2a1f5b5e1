use serde::{Deserialize, Serialize};

/// Staging fields for the line the operator is typing, before it is added to
/// the cart. Values stay raw text until the cart parses them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftLine {
    pub name: String,
    pub rate: String,
    pub qty: String,
    pub discount: String,
}

impl DraftLine {
    pub fn new(
        name: impl Into<String>,
        rate: impl Into<String>,
        qty: impl Into<String>,
        discount: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            rate: rate.into(),
            qty: qty.into(),
            discount: discount.into(),
        }
    }

    /// Reset to an empty name and rate, quantity 1 and no discount.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl Default for DraftLine {
    fn default() -> Self {
        Self::new("", "", "1", "0")
    }
}
