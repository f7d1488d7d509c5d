//! Database queries for payment codes, students and the request log

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{request_status, CodeRecord, GatewaySettings, IntegrationRequest, StudentOption};

/// Get the student candidate set for code assignment.
///
/// Eligibility is whatever this query says it is; the form layer only
/// delegates to it.
pub async fn list_eligible_students(pool: &PgPool) -> Result<Vec<StudentOption>> {
    let students = sqlx::query_as::<_, StudentOption>(
        r#"
        SELECT
            id,
            full_name AS label
        FROM students
        WHERE enabled
        ORDER BY full_name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(students)
}

/// Get a payment code by its persisted name
pub async fn get_code_record(pool: &PgPool, name: &str) -> Result<CodeRecord> {
    let record = sqlx::query_as::<_, CodeRecord>(
        r#"
        SELECT
            name,
            code,
            student,
            free_code,
            code_amount,
            code_remaining_amount,
            code_used_amount,
            created_at
        FROM payment_codes
        WHERE name = $1
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)?;

    Ok(record)
}

/// Find a payment code by its redeemable code string, case-insensitively
pub async fn find_code_by_code(pool: &PgPool, code: &str) -> Result<Option<CodeRecord>> {
    let record = sqlx::query_as::<_, CodeRecord>(
        r#"
        SELECT
            name,
            code,
            student,
            free_code,
            code_amount,
            code_remaining_amount,
            code_used_amount,
            created_at
        FROM payment_codes
        WHERE UPPER(code) = UPPER($1)
        "#,
    )
    .bind(code)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Codes a student can still redeem against a payment
pub async fn list_available_codes(pool: &PgPool, student: &str) -> Result<Vec<CodeRecord>> {
    let codes = sqlx::query_as::<_, CodeRecord>(
        r#"
        SELECT
            name,
            code,
            student,
            free_code,
            code_amount,
            code_remaining_amount,
            code_used_amount,
            created_at
        FROM payment_codes
        WHERE student = $1
          AND NOT free_code
          AND code_remaining_amount > 0
        ORDER BY created_at DESC
        "#,
    )
    .bind(student)
    .fetch_all(pool)
    .await?;

    Ok(codes)
}

/// Insert a new payment code
pub async fn insert_code_record(pool: &PgPool, record: &CodeRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO payment_codes (
            name, code, student, free_code,
            code_amount, code_remaining_amount, code_used_amount, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(&record.name)
    .bind(&record.code)
    .bind(&record.student)
    .bind(record.free_code)
    .bind(record.code_amount)
    .bind(record.code_remaining_amount)
    .bind(record.code_used_amount)
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Update a persisted payment code; `created_at` is never rewritten
pub async fn update_code_record(pool: &PgPool, record: &CodeRecord) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE payment_codes
        SET code = $2,
            student = $3,
            free_code = $4,
            code_amount = $5,
            code_remaining_amount = $6,
            code_used_amount = $7
        WHERE name = $1
        "#,
    )
    .bind(&record.name)
    .bind(&record.code)
    .bind(&record.student)
    .bind(record.free_code)
    .bind(record.code_amount)
    .bind(record.code_remaining_amount)
    .bind(record.code_used_amount)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(())
}

/// Write redeemed balances back to a code
pub async fn apply_redemption(
    pool: &PgPool,
    name: &str,
    remaining: Decimal,
    used: Decimal,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE payment_codes
        SET code_remaining_amount = $2,
            code_used_amount = $3
        WHERE name = $1
        "#,
    )
    .bind(name)
    .bind(remaining)
    .bind(used)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(())
}

/// Get the most recent enabled gateway settings row, if any
pub async fn get_gateway_settings(pool: &PgPool) -> Result<Option<GatewaySettings>> {
    let settings = sqlx::query_as::<_, GatewaySettings>(
        r#"
        SELECT
            enabled,
            title,
            created_at
        FROM gateway_settings
        WHERE enabled
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    Ok(settings)
}

/// Log a new integration request backing a payment link
pub async fn insert_integration_request(
    pool: &PgPool,
    id: Uuid,
    service: &str,
    data: &serde_json::Value,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO integration_requests (id, service, status, data, created_at, updated_at)
        VALUES ($1, $2, $3, $4, NOW(), NOW())
        "#,
    )
    .bind(id)
    .bind(service)
    .bind(request_status::QUEUED)
    .bind(data)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get an integration request by token
pub async fn get_integration_request(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<IntegrationRequest>> {
    let request = sqlx::query_as::<_, IntegrationRequest>(
        r#"
        SELECT
            id,
            service,
            status,
            data,
            created_at,
            updated_at
        FROM integration_requests
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(request)
}

/// Mark an integration request with a terminal status
pub async fn set_integration_request_status(
    pool: &PgPool,
    id: Uuid,
    status: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE integration_requests
        SET status = $2,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(status)
    .execute(pool)
    .await?;

    Ok(())
}
