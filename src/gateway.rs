//! Manual payment gateway operations.
//!
//! Issues manual-payment links backed by an integration-request log and
//! confirms payments against a student's code. Confirmation is the explicit
//! balance-adjustment path: it is the only place that moves value from
//! `code_remaining_amount` to `code_used_amount`.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::{AppError, Result};
use crate::form::doc::coerce_decimal;
use crate::models::{request_status, CodeRecord};

/// Service name stamped on integration requests
pub const SERVICE_NAME: &str = "Manual Payment";

/// Currencies the gateway accepts
pub const SUPPORTED_CURRENCIES: &[&str] = &["USD", "EUR", "GBP", "INR", "AED", "SAR", "EGP"];

/// Reject transaction currencies outside the supported set
pub fn validate_transaction_currency(currency: &str) -> Result<()> {
    if SUPPORTED_CURRENCIES.contains(&currency) {
        Ok(())
    } else {
        Err(AppError::UnsupportedCurrency(currency.to_string()))
    }
}

/// Parameters of a requested manual payment
#[derive(Debug, Clone)]
pub struct PaymentArgs {
    pub amount: Decimal,
    pub currency: String,
    pub title: Option<String>,
    /// Pre-selected code, carried through to the payment page
    pub code: Option<String>,
    pub redirect_to: Option<String>,
}

/// Create a manual-payment link.
///
/// Validates the currency, logs an integration request whose id becomes the
/// link's token, and returns the page URL.
pub async fn payment_url(pool: &PgPool, base_url: &str, args: &PaymentArgs) -> Result<String> {
    validate_transaction_currency(&args.currency)?;

    let token = Uuid::new_v4();
    let data = serde_json::json!({
        "amount": args.amount.to_string(),
        "currency": args.currency,
        "title": args.title.as_deref().unwrap_or("Payment"),
        "code": args.code,
        "redirect_to": args.redirect_to,
    });
    db::insert_integration_request(pool, token, SERVICE_NAME, &data).await?;

    Ok(build_payment_link(base_url, token, args))
}

/// Build the manual-payment page URL for an issued token
fn build_payment_link(base_url: &str, token: Uuid, args: &PaymentArgs) -> String {
    let title = args.title.as_deref().unwrap_or("Payment");
    let mut query = format!(
        "token={}&amount={}&currency={}&title={}",
        token,
        urlencoding::encode(&args.amount.to_string()),
        urlencoding::encode(&args.currency),
        urlencoding::encode(title),
    );
    if let Some(code) = &args.code {
        query.push_str("&code=");
        query.push_str(&urlencoding::encode(code));
    }

    format!("{}/manual_payment?{}", base_url.trim_end_matches('/'), query)
}

/// Outcome of a confirmation attempt, reported to the page as-is
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl ConfirmResult {
    fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            redirect: None,
        }
    }
}

/// Confirm a manual payment by redeeming a student's code.
///
/// Every business rejection is a `ConfirmResult` with `success == false`;
/// `Err` is reserved for storage failures.
pub async fn confirm_manual_payment(
    pool: &PgPool,
    token: &str,
    code: &str,
    user: &str,
) -> Result<ConfirmResult> {
    if user.is_empty() || user == "Guest" {
        return Ok(ConfirmResult::rejected("Please login to confirm payment"));
    }

    let token = match Uuid::parse_str(token) {
        Ok(token) => token,
        Err(_) => return Ok(ConfirmResult::rejected("Invalid payment token")),
    };
    let request = match db::get_integration_request(pool, token).await? {
        Some(request) => request,
        None => return Ok(ConfirmResult::rejected("Invalid payment token")),
    };

    if db::get_gateway_settings(pool).await?.is_none() {
        return Ok(ConfirmResult::rejected(
            "Code payment gateway is not enabled",
        ));
    }

    let payment_amount = coerce_decimal(request.data.get("amount"));

    let record = match db::find_code_by_code(pool, code.trim()).await? {
        Some(record) => record,
        None => return Ok(ConfirmResult::rejected("Invalid authorization code")),
    };

    if let Err(message) = redeem_check(&record, user, payment_amount) {
        return Ok(ConfirmResult::rejected(message));
    }

    let (remaining, used) = redeemed_balances(&record, payment_amount);
    db::apply_redemption(pool, &record.name, remaining, used).await?;
    db::set_integration_request_status(pool, token, request_status::COMPLETED).await?;

    let redirect = request
        .data
        .get("redirect_to")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("/payment-success")
        .to_string();

    tracing::info!(
        "Payment of {} confirmed against code {} for {}",
        payment_amount,
        record.name,
        user
    );

    Ok(ConfirmResult {
        success: true,
        message: "Payment confirmed successfully".to_string(),
        redirect: Some(redirect),
    })
}

/// Check a code against the confirming user and the payment amount
fn redeem_check(record: &CodeRecord, user: &str, payment_amount: Decimal) -> std::result::Result<(), String> {
    if record.student.as_deref() != Some(user) {
        return Err("This code is not assigned to you".to_string());
    }
    if record.is_spent() {
        return Err("This code has already been used".to_string());
    }
    if payment_amount > record.code_remaining_amount {
        return Err(format!(
            "Payment amount ({}) exceeds code limit ({})",
            payment_amount, record.code_remaining_amount
        ));
    }
    Ok(())
}

/// Balances after redeeming `payment_amount` from a code
fn redeemed_balances(record: &CodeRecord, payment_amount: Decimal) -> (Decimal, Decimal) {
    (
        record.code_remaining_amount - payment_amount,
        record.code_used_amount + payment_amount,
    )
}
