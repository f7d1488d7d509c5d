//! Form edit sessions for the payment-code record.
//!
//! Field-change behavior runs through an explicit seam: a [`FormController`]
//! registered against a record-type key in a [`FormRegistry`], attached when
//! a form opens and detached when the session closes. Handlers mutate in-memory form state only; persistence stays with
//! the save pipeline in `routes`.

pub mod controller;
pub mod doc;
pub mod registry;

pub use controller::{CodeFormController, FormController, CODE_RECORD_TYPE};
pub use doc::{fields, CodeForm};
pub use registry::{FormRegistry, FormSession};
