//! Controller registry and form sessions.
//!
//! Controllers register under a record-type key; opening a form attaches the
//! matching controller for the lifetime of one [`FormSession`]. Sessions are
//! synchronous and single-threaded: every edit runs its handler to completion
//! before the next one is applied.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use super::controller::FormController;
use super::doc::CodeForm;

/// Registry of form controllers keyed by record type
#[derive(Default)]
pub struct FormRegistry {
    controllers: HashMap<String, Arc<dyn FormController>>,
}

impl FormRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller under its record-type key. A later registration
    /// for the same key replaces the earlier one.
    pub fn register(&mut self, controller: Arc<dyn FormController>) {
        self.controllers
            .insert(controller.record_type().to_string(), controller);
    }

    /// Open an edit session over `form`, running the controller's `on_load`.
    /// Returns `None` when no controller is registered for the record type.
    pub fn open(&self, record_type: &str, mut form: CodeForm) -> Option<FormSession> {
        let controller = self.controllers.get(record_type)?.clone();
        controller.on_load(&mut form);
        Some(FormSession { form, controller })
    }
}

/// One form instance with its controller attached
pub struct FormSession {
    form: CodeForm,
    controller: Arc<dyn FormController>,
}

impl FormSession {
    /// Apply a field edit and dispatch the controller's change handler
    pub fn set_field(&mut self, field: &str, value: Value) {
        self.form.set_value(field, value);
        self.controller.on_field_changed(&mut self.form, field);
    }

    pub fn form(&self) -> &CodeForm {
        &self.form
    }

    /// Detach the controller and hand the final form state back
    pub fn close(self) -> CodeForm {
        self.form
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use crate::form::controller::{CodeFormController, CODE_RECORD_TYPE};
    use crate::form::doc::fields;

    fn registry() -> FormRegistry {
        let mut registry = FormRegistry::new();
        registry.register(Arc::new(CodeFormController::new("payments.get_students")));
        registry
    }

    #[test]
    fn test_open_runs_on_load() {
        let session = registry()
            .open(CODE_RECORD_TYPE, CodeForm::new())
            .expect("controller registered");
        assert_eq!(
            session.form().query(fields::STUDENT),
            Some("payments.get_students")
        );
    }

    #[test]
    fn test_open_unknown_record_type() {
        assert!(registry().open("Sales Invoice", CodeForm::new()).is_none());
    }

    #[test]
    fn test_set_field_dispatches_to_controller() {
        let mut session = registry().open(CODE_RECORD_TYPE, CodeForm::new()).unwrap();
        session.set_field(fields::CODE_AMOUNT, json!(100));

        assert_eq!(session.form().decimal(fields::CODE_REMAINING_AMOUNT), dec!(100));
        assert_eq!(session.form().decimal(fields::CODE_USED_AMOUNT), Decimal::ZERO);
    }

    #[test]
    fn test_edit_order_amount_then_free_code() {
        let mut session = registry().open(CODE_RECORD_TYPE, CodeForm::new()).unwrap();
        session.set_field(fields::CODE_AMOUNT, json!(100));
        session.set_field(fields::FREE_CODE, json!(true));

        let form = session.close();
        assert_eq!(form.decimal(fields::CODE_AMOUNT), Decimal::ZERO);
        assert_eq!(form.decimal(fields::CODE_REMAINING_AMOUNT), Decimal::ZERO);
        assert_eq!(form.decimal(fields::CODE_USED_AMOUNT), Decimal::ZERO);
    }

    #[test]
    fn test_close_returns_final_state() {
        let mut session = registry().open(CODE_RECORD_TYPE, CodeForm::new()).unwrap();
        session.set_field(fields::CODE, json!("WELCOME10"));
        session.set_field(fields::CODE_AMOUNT, json!(50));

        let record = session.close().into_record("PC-2".to_string());
        assert_eq!(record.code, "WELCOME10");
        assert_eq!(record.code_amount, dec!(50));
        assert_eq!(record.code_remaining_amount, dec!(50));
    }

    #[test]
    fn test_replacing_registration_wins() {
        let mut registry = registry();
        registry.register(Arc::new(CodeFormController::new("payments.other_query")));

        let session = registry.open(CODE_RECORD_TYPE, CodeForm::new()).unwrap();
        assert_eq!(
            session.form().query(fields::STUDENT),
            Some("payments.other_query")
        );
    }
}
