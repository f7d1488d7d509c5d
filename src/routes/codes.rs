//! Payment-code form route handlers.
//!
//! These endpoints stand in for the host form engine: submitted field edits
//! are applied in order through a [`FormSession`] so the controller's rules
//! run exactly as they would on interactive edits, then the resulting record
//! goes through the save pipeline.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::cache;
use crate::db;
use crate::error::{AppError, Result};
use crate::form::{CodeForm, FormSession, CODE_RECORD_TYPE};
use crate::models::{CodeRecord, StudentOption};
use crate::AppState;

/// One ordered field edit
#[derive(Debug, Deserialize)]
pub struct FieldEdit {
    pub field: String,
    pub value: Value,
}

/// Form submission: edits are applied in the order given
#[derive(Debug, Deserialize)]
pub struct CodeFormPayload {
    #[serde(default)]
    pub edits: Vec<FieldEdit>,
}

/// Create a payment code through a new form session
pub async fn create_code(
    State(state): State<AppState>,
    Json(payload): Json<CodeFormPayload>,
) -> Result<Json<CodeRecord>> {
    let form = run_session(&state, CodeForm::new(), &payload)?;
    let record = form.into_record(new_name());
    db::insert_code_record(&state.db, &record).await?;

    tracing::info!("Created payment code {}", record.name);
    Ok(Json(record))
}

/// Edit a persisted payment code through a form session
pub async fn update_code(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(payload): Json<CodeFormPayload>,
) -> Result<Json<CodeRecord>> {
    let existing = db::get_code_record(&state.db, &name).await?;
    let form = run_session(&state, CodeForm::from_record(&existing), &payload)?;
    let record = form.into_record(name);
    db::update_code_record(&state.db, &record).await?;

    Ok(Json(record))
}

fn run_session(state: &AppState, form: CodeForm, payload: &CodeFormPayload) -> Result<CodeForm> {
    let mut session: FormSession = state
        .registry
        .open(CODE_RECORD_TYPE, form)
        .ok_or_else(|| {
            AppError::Internal("No controller registered for payment codes".to_string())
        })?;

    for edit in &payload.edits {
        session.set_field(&edit.field, edit.value.clone());
    }

    Ok(session.close())
}

fn new_name() -> String {
    format!("PC-{}", Uuid::new_v4().simple())
}

/// Query parameters for the student lookup
#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    /// Logical query path the form bound to the field
    #[serde(default)]
    pub query: Option<String>,
}

/// Candidate students for the `student` link field.
///
/// Only the configured query path is answered; any other path logs a warning
/// and degrades to an empty candidate list.
pub async fn student_lookup(
    State(state): State<AppState>,
    Query(params): Query<LookupQuery>,
) -> Result<Json<Vec<StudentOption>>> {
    let path = params
        .query
        .unwrap_or_else(|| state.config.student_query_path.clone());
    if path != state.config.student_query_path {
        tracing::warn!("Unknown student query path: {}", path);
        return Ok(Json(Vec::new()));
    }

    if let Some(cached) = state.cache.students.get(cache::STUDENTS_KEY).await {
        tracing::debug!("Cache HIT for student candidates");
        return Ok(Json((*cached).clone()));
    }

    tracing::debug!("Cache MISS for student candidates");
    let students = db::list_eligible_students(&state.db).await?;
    state
        .cache
        .students
        .insert(cache::STUDENTS_KEY.to_string(), Arc::new(students.clone()))
        .await;

    Ok(Json(students))
}
