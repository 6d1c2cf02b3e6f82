//! Student self-service and directory handlers

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use super::extract::{ApiJson, ApiQuery};
use super::routes::ApiResponse;
use super::server::SharedState;
use crate::auth::AuthUser;
use crate::error::Result;
use crate::store::{student_not_found, PageQuery};
use crate::students::{
    AttendanceSummary, PlacementSummary, PlacementUpdate, ProfileUpdate, Student, StudentFilter,
    StudentUpdate,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    #[serde(default)]
    pub payment_amount: f64,
}

async fn own_record(state: &SharedState, user: &AuthUser) -> Result<Student> {
    state
        .stores
        .students
        .find_by_id(&user.0.id)
        .await?
        .ok_or_else(student_not_found)
}

pub async fn get_profile(
    State(state): State<SharedState>,
    user: AuthUser,
) -> Result<impl IntoResponse> {
    let student = own_record(&state, &user).await?;
    Ok(Json(ApiResponse::ok(student)))
}

pub async fn update_profile(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> Result<impl IntoResponse> {
    update.validate()?;
    let student = state
        .stores
        .students
        .update_by_id(&user.id, StudentUpdate::Profile(update))
        .await?;

    tracing::info!(student = %student.id, "Profile updated");
    Ok(Json(ApiResponse::with_message(
        student,
        "Profile updated successfully",
    )))
}

pub async fn get_attendance(
    State(state): State<SharedState>,
    user: AuthUser,
) -> Result<impl IntoResponse> {
    let student = own_record(&state, &user).await?;
    Ok(Json(ApiResponse::ok(AttendanceSummary::from(&student))))
}

pub async fn get_fees(
    State(state): State<SharedState>,
    user: AuthUser,
) -> Result<impl IntoResponse> {
    let student = own_record(&state, &user).await?;
    Ok(Json(ApiResponse::ok(student.fees())))
}

pub async fn pay_fees(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    ApiJson(payment): ApiJson<PaymentRequest>,
) -> Result<impl IntoResponse> {
    let student = state
        .stores
        .students
        .update_by_id(&user.id, StudentUpdate::Payment(payment.payment_amount))
        .await?;

    tracing::info!(
        student = %student.id,
        amount = payment.payment_amount,
        "Fee payment recorded"
    );
    Ok(Json(ApiResponse::with_message(
        student.fees(),
        "Payment recorded successfully",
    )))
}

pub async fn get_placement(
    State(state): State<SharedState>,
    user: AuthUser,
) -> Result<impl IntoResponse> {
    let student = own_record(&state, &user).await?;
    Ok(Json(ApiResponse::ok(PlacementSummary::from(&student))))
}

pub async fn update_placement(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    ApiJson(update): ApiJson<PlacementUpdate>,
) -> Result<impl IntoResponse> {
    let student = state
        .stores
        .students
        .update_by_id(&user.id, StudentUpdate::Placement(update))
        .await?;

    tracing::info!(
        student = %student.id,
        status = %student.placement_status,
        "Placement updated"
    );
    Ok(Json(ApiResponse::with_message(
        PlacementSummary::from(&student),
        "Placement status updated successfully",
    )))
}

// Admin directory

pub async fn list_students(
    State(state): State<SharedState>,
    ApiQuery(filter): ApiQuery<StudentFilter>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> Result<impl IntoResponse> {
    let (students, total) = state.stores.students.list(&filter, page).await?;
    Ok(Json(ApiResponse::paged(students, page.pagination(total))))
}

pub async fn get_student(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let student = state
        .stores
        .students
        .find_by_id(&id)
        .await?
        .ok_or_else(student_not_found)?;
    Ok(Json(ApiResponse::ok(student)))
}
