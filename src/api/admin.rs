//! Admin dashboard handlers

use axum::{extract::State, response::IntoResponse, Json};

use super::routes::ApiResponse;
use super::server::SharedState;
use crate::error::Result;
use crate::students::analytics;

pub async fn dashboard(State(state): State<SharedState>) -> Result<impl IntoResponse> {
    let students = state.stores.students.all().await?;
    let admissions = state.stores.admissions.all().await?;

    Ok(Json(ApiResponse::ok(analytics::dashboard(
        &students,
        &admissions,
    ))))
}

pub async fn student_analytics(State(state): State<SharedState>) -> Result<impl IntoResponse> {
    let students = state.stores.students.all().await?;
    Ok(Json(ApiResponse::ok(analytics::student_analytics(&students))))
}
