//! Database models

pub mod code;
pub mod gateway;

pub use code::{CodeRecord, StudentOption};
pub use gateway::{request_status, GatewaySettings, IntegrationRequest};
