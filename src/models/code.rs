//! Payment-code record models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// A payment code from `payment_codes`.
///
/// A code carries a face value (`code_amount`) split across an unspent
/// balance (`code_remaining_amount`) and a spent balance
/// (`code_used_amount`). A free code has no monetary value and all three
/// amounts forced to zero.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CodeRecord {
    pub name: String,
    pub code: String,
    pub student: Option<String>,
    pub free_code: bool,
    #[serde(with = "rust_decimal::serde::str")]
    pub code_amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub code_remaining_amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub code_used_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl CodeRecord {
    /// Whether the code's whole value has been redeemed
    pub fn is_spent(&self) -> bool {
        self.code_remaining_amount.is_zero() && !self.code_used_amount.is_zero()
    }
}

/// One row of the student lookup candidate set
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StudentOption {
    pub id: String,
    pub label: String,
}
