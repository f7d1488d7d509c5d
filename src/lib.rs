//! Student payment-code gateway service.
//!
//! Owns the "Code Payment Gateways" record shape: a discount/gift code with a
//! monetary face value, optionally assigned to a student, redeemable against
//! manual payments. Form edit sessions run through an explicit controller
//! registry instead of a host framework's global form dispatch.

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod form;
pub mod gateway;
pub mod models;
pub mod routes;

use std::sync::Arc;

use sqlx::PgPool;

use crate::cache::AppCache;
use crate::config::AppConfig;
use crate::form::FormRegistry;

/// Shared application state for route handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AppCache,
    pub config: Arc<AppConfig>,
    pub registry: Arc<FormRegistry>,
}
