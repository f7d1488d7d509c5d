//! Application configuration from environment variables

use anyhow::Context;

/// Canonical logical path of the student candidate query.
///
/// The form binds the `student` field's lookup to this path; the lookup
/// endpoint only answers for it. Override with `STUDENT_QUERY_PATH`.
pub const DEFAULT_STUDENT_QUERY_PATH: &str =
    "payments.payment_gateways.doctype.code_payment_gateways.code_payment_gateways.get_students";

/// Runtime configuration, loaded once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    /// Origin used when building manual-payment links
    pub base_url: String,
    pub student_query_path: String,
}

impl AppConfig {
    /// Load configuration from the environment (after `dotenvy::dotenv`)
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let base_url =
            std::env::var("BASE_URL").unwrap_or_else(|_| format!("http://{}", bind_addr));
        let student_query_path = std::env::var("STUDENT_QUERY_PATH")
            .unwrap_or_else(|_| DEFAULT_STUDENT_QUERY_PATH.to_string());

        Ok(Self {
            database_url,
            bind_addr,
            base_url,
            student_query_path,
        })
    }
}
