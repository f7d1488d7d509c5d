//! Form controller for the payment-code record.
//!
//! Three field-level behaviors: the `student` lookup is bound to the
//! configured candidate query at load, editing `code_amount` initializes the
//! remaining/used balances, and switching on `free_code` zeroes every
//! monetary field.

use serde_json::{json, Value};

use super::doc::{fields, CodeForm};

/// Record-type key the payment-code controller registers under
pub const CODE_RECORD_TYPE: &str = "Code Payment Gateways";

/// A controller attached to one record type's edit forms.
///
/// Handlers run synchronously on the session that owns the form and mutate
/// its in-memory state only; they never touch storage and never fail.
pub trait FormController: Send + Sync {
    /// Record-type key this controller is registered under
    fn record_type(&self) -> &str;

    /// Called once when a form opens
    fn on_load(&self, form: &mut CodeForm);

    /// Called after a field edit has been applied to the form
    fn on_field_changed(&self, form: &mut CodeForm, field: &str);
}

/// Controller for `Code Payment Gateways` forms
pub struct CodeFormController {
    student_query_path: String,
}

impl CodeFormController {
    pub fn new(student_query_path: impl Into<String>) -> Self {
        Self {
            student_query_path: student_query_path.into(),
        }
    }

    /// Initialize the balance fields from a freshly edited `code_amount`.
    ///
    /// Skipped entirely for free codes and empty amounts. On a persisted
    /// record the assignment additionally requires both balances to read as
    /// exactly zero: once redemption has touched either one, later edits to
    /// `code_amount` must leave the balances alone. Re-entering the same
    /// amount on an initialized record is therefore a no-op, while adjusting
    /// a partially used code goes through the redemption path instead.
    fn code_amount_changed(&self, form: &mut CodeForm) {
        if !form.truthy(fields::CODE_AMOUNT) || form.truthy(fields::FREE_CODE) {
            return;
        }

        if !form.is_new() {
            let remaining = form.decimal(fields::CODE_REMAINING_AMOUNT);
            let used = form.decimal(fields::CODE_USED_AMOUNT);
            if !remaining.is_zero() || !used.is_zero() {
                return;
            }
        }

        let amount = form.value(fields::CODE_AMOUNT).cloned().unwrap_or(Value::Null);
        form.set_value(fields::CODE_REMAINING_AMOUNT, amount);
        form.set_value(fields::CODE_USED_AMOUNT, json!(0));
    }

    /// Zero every monetary field when the free-code flag switches on.
    ///
    /// Un-checking the flag restores nothing; the previous amount is gone.
    fn free_code_changed(&self, form: &mut CodeForm) {
        if form.truthy(fields::FREE_CODE) {
            form.set_value(fields::CODE_AMOUNT, json!(0));
            form.set_value(fields::CODE_REMAINING_AMOUNT, json!(0));
            form.set_value(fields::CODE_USED_AMOUNT, json!(0));
        }
    }
}

impl FormController for CodeFormController {
    fn record_type(&self) -> &str {
        CODE_RECORD_TYPE
    }

    fn on_load(&self, form: &mut CodeForm) {
        form.set_query(fields::STUDENT, &self.student_query_path);
    }

    fn on_field_changed(&self, form: &mut CodeForm, field: &str) {
        match field {
            fields::CODE_AMOUNT => self.code_amount_changed(form),
            fields::FREE_CODE => self.free_code_changed(form),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::models::CodeRecord;

    fn controller() -> CodeFormController {
        CodeFormController::new("payments.get_students")
    }

    fn edit(form: &mut CodeForm, field: &str, value: Value) {
        form.set_value(field, value);
        controller().on_field_changed(form, field);
    }

    fn persisted_form(amount: Decimal, remaining: Decimal, used: Decimal) -> CodeForm {
        CodeForm::from_record(&CodeRecord {
            name: "PC-1".to_string(),
            code: "WELCOME10".to_string(),
            student: Some("student@example.com".to_string()),
            free_code: false,
            code_amount: amount,
            code_remaining_amount: remaining,
            code_used_amount: used,
            created_at: Utc::now(),
        })
    }

    // ==================== on_load tests ====================

    #[test]
    fn test_on_load_binds_student_query() {
        let mut form = CodeForm::new();
        controller().on_load(&mut form);
        assert_eq!(form.query(fields::STUDENT), Some("payments.get_students"));
    }

    #[test]
    fn test_on_load_leaves_values_untouched() {
        let mut form = CodeForm::new();
        controller().on_load(&mut form);
        assert_eq!(form.value(fields::CODE_AMOUNT), None);
        assert_eq!(form.value(fields::CODE_REMAINING_AMOUNT), None);
    }

    // ==================== code_amount tests ====================

    #[test]
    fn test_new_record_amount_initializes_balances() {
        let mut form = CodeForm::new();
        edit(&mut form, fields::CODE_AMOUNT, json!(100));

        assert_eq!(form.decimal(fields::CODE_REMAINING_AMOUNT), dec!(100));
        assert_eq!(form.decimal(fields::CODE_USED_AMOUNT), Decimal::ZERO);
    }

    #[test]
    fn test_new_record_amount_overwrites_prior_edit() {
        let mut form = CodeForm::new();
        edit(&mut form, fields::CODE_AMOUNT, json!(100));
        edit(&mut form, fields::CODE_AMOUNT, json!(150));

        assert_eq!(form.decimal(fields::CODE_REMAINING_AMOUNT), dec!(150));
        assert_eq!(form.decimal(fields::CODE_USED_AMOUNT), Decimal::ZERO);
    }

    #[test]
    fn test_zero_amount_does_nothing() {
        let mut form = CodeForm::new();
        edit(&mut form, fields::CODE_AMOUNT, json!(0));
        assert_eq!(form.value(fields::CODE_REMAINING_AMOUNT), None);
    }

    #[test]
    fn test_empty_amount_does_nothing() {
        let mut form = CodeForm::new();
        edit(&mut form, fields::CODE_AMOUNT, json!(""));
        assert_eq!(form.value(fields::CODE_REMAINING_AMOUNT), None);
    }

    #[test]
    fn test_free_code_blocks_amount_initialization() {
        let mut form = CodeForm::new();
        form.set_value(fields::FREE_CODE, json!(true));
        edit(&mut form, fields::CODE_AMOUNT, json!(100));
        assert_eq!(form.value(fields::CODE_REMAINING_AMOUNT), None);
    }

    #[test]
    fn test_persisted_untouched_balances_reinitialize() {
        let mut form = persisted_form(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
        edit(&mut form, fields::CODE_AMOUNT, json!(80));

        assert_eq!(form.decimal(fields::CODE_REMAINING_AMOUNT), dec!(80));
        assert_eq!(form.decimal(fields::CODE_USED_AMOUNT), Decimal::ZERO);
    }

    #[test]
    fn test_persisted_used_code_keeps_balances() {
        // 100 split 30/70 by redemption; raising the face value must not
        // reset the balances
        let mut form = persisted_form(dec!(100), dec!(30), dec!(70));
        edit(&mut form, fields::CODE_AMOUNT, json!(150));

        assert_eq!(form.decimal(fields::CODE_REMAINING_AMOUNT), dec!(30));
        assert_eq!(form.decimal(fields::CODE_USED_AMOUNT), dec!(70));
    }

    #[test]
    fn test_persisted_partially_remaining_keeps_balances() {
        // remaining nonzero with used zero also counts as touched
        let mut form = persisted_form(dec!(100), dec!(100), Decimal::ZERO);
        edit(&mut form, fields::CODE_AMOUNT, json!(150));

        assert_eq!(form.decimal(fields::CODE_REMAINING_AMOUNT), dec!(100));
        assert_eq!(form.decimal(fields::CODE_USED_AMOUNT), Decimal::ZERO);
    }

    #[test]
    fn test_persisted_fully_used_keeps_balances() {
        let mut form = persisted_form(dec!(100), Decimal::ZERO, dec!(100));
        edit(&mut form, fields::CODE_AMOUNT, json!(200));

        assert_eq!(form.decimal(fields::CODE_REMAINING_AMOUNT), Decimal::ZERO);
        assert_eq!(form.decimal(fields::CODE_USED_AMOUNT), dec!(100));
    }

    #[test]
    fn test_amount_as_string_initializes_balances() {
        let mut form = CodeForm::new();
        edit(&mut form, fields::CODE_AMOUNT, json!("42.50"));

        assert_eq!(form.decimal(fields::CODE_REMAINING_AMOUNT), dec!(42.50));
        assert_eq!(form.decimal(fields::CODE_USED_AMOUNT), Decimal::ZERO);
    }

    // ==================== free_code tests ====================

    #[test]
    fn test_free_code_zeroes_everything() {
        let mut form = CodeForm::new();
        edit(&mut form, fields::CODE_AMOUNT, json!(100));
        edit(&mut form, fields::FREE_CODE, json!(true));

        assert_eq!(form.decimal(fields::CODE_AMOUNT), Decimal::ZERO);
        assert_eq!(form.decimal(fields::CODE_REMAINING_AMOUNT), Decimal::ZERO);
        assert_eq!(form.decimal(fields::CODE_USED_AMOUNT), Decimal::ZERO);
    }

    #[test]
    fn test_free_code_zeroes_used_balances_too() {
        let mut form = persisted_form(dec!(100), dec!(30), dec!(70));
        edit(&mut form, fields::FREE_CODE, json!(true));

        assert_eq!(form.decimal(fields::CODE_AMOUNT), Decimal::ZERO);
        assert_eq!(form.decimal(fields::CODE_REMAINING_AMOUNT), Decimal::ZERO);
        assert_eq!(form.decimal(fields::CODE_USED_AMOUNT), Decimal::ZERO);
    }

    #[test]
    fn test_unchecking_free_code_restores_nothing() {
        let mut form = CodeForm::new();
        edit(&mut form, fields::CODE_AMOUNT, json!(100));
        edit(&mut form, fields::FREE_CODE, json!(true));
        edit(&mut form, fields::FREE_CODE, json!(false));

        assert_eq!(form.decimal(fields::CODE_AMOUNT), Decimal::ZERO);
        assert_eq!(form.decimal(fields::CODE_REMAINING_AMOUNT), Decimal::ZERO);
        assert_eq!(form.decimal(fields::CODE_USED_AMOUNT), Decimal::ZERO);
    }

    #[test]
    fn test_amount_edit_after_free_code_is_inert() {
        let mut form = CodeForm::new();
        edit(&mut form, fields::FREE_CODE, json!(true));
        edit(&mut form, fields::CODE_AMOUNT, json!(100));

        // The raw edit lands on the form but the balances stay zero
        assert_eq!(form.decimal(fields::CODE_REMAINING_AMOUNT), Decimal::ZERO);
        assert_eq!(form.decimal(fields::CODE_USED_AMOUNT), Decimal::ZERO);
    }

    // ==================== dispatch tests ====================

    #[test]
    fn test_unrelated_field_edit_is_ignored() {
        let mut form = CodeForm::new();
        edit(&mut form, fields::STUDENT, json!("student@example.com"));
        assert_eq!(form.value(fields::CODE_REMAINING_AMOUNT), None);
    }
}
