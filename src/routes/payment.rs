//! Manual payment page and confirmation handlers

use askama::Template;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Html,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::cache;
use crate::db;
use crate::error::Result;
use crate::gateway::{self, ConfirmResult, PaymentArgs};
use crate::AppState;

/// Header carrying the authenticated user's identity; authentication itself
/// is handled upstream of this service
const USER_HEADER: &str = "x-user";

fn current_user(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Query parameters echoed onto the payment page
#[derive(Debug, Deserialize)]
pub struct PaymentPageQuery {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// A code the current user can still redeem
struct AvailableCode {
    code: String,
    amount: String,
}

/// Manual payment page template
#[derive(Template)]
#[template(path = "manual_payment.html")]
struct ManualPaymentTemplate {
    title: String,
    amount: String,
    currency: String,
    token: String,
    code: String,
    logged_in: bool,
    gateway_enabled: bool,
    user_codes: Vec<AvailableCode>,
    has_user_codes: bool,
}

/// Manual payment page
pub async fn manual_payment_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<PaymentPageQuery>,
) -> Result<Html<String>> {
    let user = current_user(&headers);

    let gateway_enabled = if state.cache.settings.get(cache::SETTINGS_KEY).await.is_some() {
        true
    } else {
        match db::get_gateway_settings(&state.db).await? {
            Some(settings) => {
                state
                    .cache
                    .settings
                    .insert(cache::SETTINGS_KEY.to_string(), Arc::new(settings))
                    .await;
                true
            }
            None => false,
        }
    };

    let user_codes: Vec<AvailableCode> = match (&user, gateway_enabled) {
        (Some(user), true) => db::list_available_codes(&state.db, user)
            .await?
            .into_iter()
            .map(|record| AvailableCode {
                code: record.code,
                amount: record.code_remaining_amount.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    };

    let template = ManualPaymentTemplate {
        title: params.title.unwrap_or_else(|| "Payment".to_string()),
        amount: params.amount.unwrap_or_default(),
        currency: params.currency.unwrap_or_default(),
        token: params.token.unwrap_or_default(),
        code: params.code.unwrap_or_default(),
        logged_in: user.is_some(),
        gateway_enabled,
        has_user_codes: !user_codes.is_empty(),
        user_codes,
    };

    Ok(Html(template.render()?))
}

/// Request body for issuing a manual-payment link
#[derive(Debug, Deserialize)]
pub struct PaymentRequestPayload {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub redirect_to: Option<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Serialize)]
pub struct PaymentRequestResponse {
    pub url: String,
}

/// Issue a manual-payment link
pub async fn request_payment(
    State(state): State<AppState>,
    Json(payload): Json<PaymentRequestPayload>,
) -> Result<Json<PaymentRequestResponse>> {
    let args = PaymentArgs {
        amount: payload.amount,
        currency: payload.currency,
        title: payload.title,
        code: payload.code,
        redirect_to: payload.redirect_to,
    };
    let url = gateway::payment_url(&state.db, &state.config.base_url, &args).await?;

    Ok(Json(PaymentRequestResponse { url }))
}

/// Request body for confirming a payment with a code
#[derive(Debug, Deserialize)]
pub struct ConfirmPayload {
    pub token: String,
    pub code: String,
}

/// Confirm a manual payment against one of the user's codes
pub async fn confirm(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ConfirmPayload>,
) -> Result<Json<ConfirmResult>> {
    let user = current_user(&headers).unwrap_or_default();
    let result =
        gateway::confirm_manual_payment(&state.db, &payload.token, &payload.code, &user).await?;

    Ok(Json(result))
}
