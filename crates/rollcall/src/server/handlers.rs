//! Route handlers. Each one validates transport-level input, delegates to
//! the [`Tracker`](crate::service::Tracker), and serializes the result.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use super::AppState;
use crate::error::{Error, Result};
use crate::filter::AttendanceQuery;
use crate::record::{AttendanceRecord, Record, Student};
use crate::service::{AttendanceInput, MutationResponse, StudentInput};
use crate::stats::DashboardStats;

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| Error::invalid_field("body", e.body_text()))
}

fn path_id(id: std::result::Result<Path<u64>, PathRejection>) -> Result<u64> {
    id.map(|Path(id)| id)
        .map_err(|e| Error::invalid_field("id", e.body_text()))
}

fn attachment(file_name: &str, bytes: Vec<u8>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
}

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

/// `GET /api/students`
pub async fn list_students(State(state): State<AppState>) -> Result<Json<Vec<Student>>> {
    state.run(|t| t.list_students()).await.map(Json)
}

/// `POST /api/students`
pub async fn create_student(
    State(state): State<AppState>,
    payload: std::result::Result<Json<StudentInput>, JsonRejection>,
) -> Result<(StatusCode, Json<MutationResponse>)> {
    let input = body(payload)?;
    let response = state.run(move |t| t.create_student(input)).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// `PUT /api/students/:id`
pub async fn update_student(
    State(state): State<AppState>,
    id: std::result::Result<Path<u64>, PathRejection>,
    payload: std::result::Result<Json<StudentInput>, JsonRejection>,
) -> Result<Json<MutationResponse>> {
    let id = path_id(id)?;
    let input = body(payload)?;
    state
        .run(move |t| t.update_student(id, input))
        .await
        .map(Json)
}

/// `DELETE /api/students/:id`
pub async fn delete_student(
    State(state): State<AppState>,
    id: std::result::Result<Path<u64>, PathRejection>,
) -> Result<Json<MutationResponse>> {
    let id = path_id(id)?;
    state.run(move |t| t.delete_student(id)).await.map(Json)
}

/// `GET /api/attendance`
pub async fn list_attendance(
    State(state): State<AppState>,
    query: std::result::Result<Query<AttendanceQuery>, QueryRejection>,
) -> Result<Json<Vec<AttendanceRecord>>> {
    let Query(query) = query.map_err(|e| Error::invalid_field("query", e.body_text()))?;
    state
        .run(move |t| t.list_attendance(&query))
        .await
        .map(Json)
}

/// `POST /api/attendance`
pub async fn mark_attendance(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AttendanceInput>, JsonRejection>,
) -> Result<(StatusCode, Json<MutationResponse>)> {
    let input = body(payload)?;
    let response = state.run(move |t| t.mark_attendance(input)).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// `DELETE /api/attendance/:id`
pub async fn delete_attendance(
    State(state): State<AppState>,
    id: std::result::Result<Path<u64>, PathRejection>,
) -> Result<Json<MutationResponse>> {
    let id = path_id(id)?;
    state.run(move |t| t.delete_attendance(id)).await.map(Json)
}

/// `GET /api/dashboard/stats`
pub async fn dashboard_stats(State(state): State<AppState>) -> Result<Json<DashboardStats>> {
    state.run(|t| t.dashboard_stats()).await.map(Json)
}

/// `GET /api/export/students`
pub async fn export_students(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let bytes = state.run(|t| t.export_students()).await?;
    Ok(attachment(Student::EXPORT_FILE_NAME, bytes))
}

/// `GET /api/export/attendance`
pub async fn export_attendance(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let bytes = state.run(|t| t.export_attendance()).await?;
    Ok(attachment(AttendanceRecord::EXPORT_FILE_NAME, bytes))
}
