//! In-memory form state for a payment-code edit session.
//!
//! Field values are held as raw `serde_json::Value`s exactly as submitted, so
//! malformed numeric input never fails a handler; numeric reads coerce
//! permissively and treat missing or unparseable values as zero.

use std::collections::BTreeMap;

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::models::CodeRecord;

/// Field names of the payment-code record, the fixed contract surface
/// shared with form clients.
pub mod fields {
    pub const CODE: &str = "code";
    pub const STUDENT: &str = "student";
    pub const FREE_CODE: &str = "free_code";
    pub const CODE_AMOUNT: &str = "code_amount";
    pub const CODE_REMAINING_AMOUNT: &str = "code_remaining_amount";
    pub const CODE_USED_AMOUNT: &str = "code_used_amount";
}

/// A payment-code form: the in-memory document of one edit session
#[derive(Debug, Clone, Default)]
pub struct CodeForm {
    /// Persisted identity; `None` while the record is unsaved
    name: Option<String>,
    values: BTreeMap<String, Value>,
    /// Lookup query paths bound to link fields
    queries: BTreeMap<String, String>,
}

impl CodeForm {
    /// Blank form for a new, unsaved record
    pub fn new() -> Self {
        Self::default()
    }

    /// Form over an already persisted record
    pub fn from_record(record: &CodeRecord) -> Self {
        let mut values = BTreeMap::new();
        values.insert(fields::CODE.to_string(), Value::from(record.code.clone()));
        if let Some(student) = &record.student {
            values.insert(fields::STUDENT.to_string(), Value::from(student.clone()));
        }
        values.insert(fields::FREE_CODE.to_string(), Value::from(record.free_code));
        values.insert(
            fields::CODE_AMOUNT.to_string(),
            Value::from(record.code_amount.to_string()),
        );
        values.insert(
            fields::CODE_REMAINING_AMOUNT.to_string(),
            Value::from(record.code_remaining_amount.to_string()),
        );
        values.insert(
            fields::CODE_USED_AMOUNT.to_string(),
            Value::from(record.code_used_amount.to_string()),
        );

        Self {
            name: Some(record.name.clone()),
            values,
            queries: BTreeMap::new(),
        }
    }

    /// Whether the record has no persisted identity yet
    pub fn is_new(&self) -> bool {
        self.name.is_none()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn value(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn set_value(&mut self, field: &str, value: Value) {
        self.values.insert(field.to_string(), value);
    }

    /// Bind a link field's candidate lookup to a logical query path
    pub fn set_query(&mut self, field: &str, query_path: &str) {
        self.queries.insert(field.to_string(), query_path.to_string());
    }

    pub fn query(&self, field: &str) -> Option<&str> {
        self.queries.get(field).map(String::as_str)
    }

    /// Read a field as a decimal, coercing permissively
    pub fn decimal(&self, field: &str) -> Decimal {
        coerce_decimal(self.value(field))
    }

    /// Whether a field holds a truthy value
    pub fn truthy(&self, field: &str) -> bool {
        is_truthy(self.value(field))
    }

    /// Read a field as a trimmed string, empty when absent
    pub fn text(&self, field: &str) -> String {
        match self.value(field) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// Materialize the form into a record for the save pipeline.
    ///
    /// The update path does not write `created_at` back, so stamping it here
    /// only matters on insert.
    pub fn into_record(self, name: String) -> CodeRecord {
        let student = {
            let s = self.text(fields::STUDENT);
            if s.is_empty() { None } else { Some(s) }
        };

        CodeRecord {
            name,
            code: self.text(fields::CODE),
            student,
            free_code: self.truthy(fields::FREE_CODE),
            code_amount: self.decimal(fields::CODE_AMOUNT),
            code_remaining_amount: self.decimal(fields::CODE_REMAINING_AMOUNT),
            code_used_amount: self.decimal(fields::CODE_USED_AMOUNT),
            created_at: Utc::now(),
        }
    }
}

/// Coerce a raw form value to a decimal; missing, null, and unparseable
/// values all read as zero.
pub fn coerce_decimal(value: Option<&Value>) -> Decimal {
    match value {
        Some(Value::Number(n)) => n.to_string().parse().unwrap_or(Decimal::ZERO),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(Decimal::ZERO),
        Some(Value::Bool(true)) => Decimal::ONE,
        _ => Decimal::ZERO,
    }
}

/// Truthiness of a raw form value: absent, null, `false`, numeric zero and
/// the empty string are falsy, everything else is truthy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
