//! Admission application handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use super::extract::{ApiJson, ApiQuery};
use super::routes::ApiResponse;
use super::server::SharedState;
use crate::admissions::{AdmissionStatus, ApplicationForm, StatusChange};
use crate::error::Result;
use crate::store::{admission_not_found, PageQuery};

#[derive(Debug, Default, Deserialize)]
pub struct ApplicationFilter {
    pub status: Option<String>,
}

impl ApplicationFilter {
    fn status(&self) -> Result<Option<AdmissionStatus>> {
        self.status
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<AdmissionStatus>())
            .transpose()
    }
}

pub async fn apply(
    State(state): State<SharedState>,
    ApiJson(form): ApiJson<ApplicationForm>,
) -> Result<impl IntoResponse> {
    let admission = state
        .stores
        .admissions
        .insert(form.into_admission()?)
        .await?;

    tracing::info!(application = %admission.id, course = %admission.course, "Application submitted");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            admission,
            "Application submitted successfully",
        )),
    ))
}

pub async fn list_applications(
    State(state): State<SharedState>,
    ApiQuery(filter): ApiQuery<ApplicationFilter>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> Result<impl IntoResponse> {
    let (admissions, total) = state
        .stores
        .admissions
        .list(filter.status()?, page)
        .await?;
    Ok(Json(ApiResponse::paged(admissions, page.pagination(total))))
}

pub async fn get_application(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let admission = state
        .stores
        .admissions
        .find_by_id(&id)
        .await?
        .ok_or_else(admission_not_found)?;
    Ok(Json(ApiResponse::ok(admission)))
}

pub async fn update_status(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(change): ApiJson<StatusChange>,
) -> Result<impl IntoResponse> {
    let status = change.parse()?;
    let admission = state.stores.admissions.update_status(&id, status).await?;

    tracing::info!(application = %admission.id, status = %status, "Application status changed");
    Ok(Json(ApiResponse::with_message(
        admission,
        "Application status updated successfully",
    )))
}

pub async fn delete_application(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    state.stores.admissions.delete(&id).await?;

    tracing::info!(application = %id, "Application deleted");
    Ok(Json(ApiResponse::message("Application deleted successfully")))
}
