//! Registration, login and current-user handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use super::extract::ApiJson;
use super::routes::ApiResponse;
use super::server::{AppState, SharedState};
use crate::auth::models::{AuthResponse, LoginRequest, RegisterRequest, UserInfo};
use crate::auth::{AuthKeys, AuthUser, Identity};
use crate::error::{Error, Result};
use crate::store::{student_not_found, DUPLICATE_EMAIL};
use crate::students::Student;

fn keys(state: &AppState) -> Result<&AuthKeys> {
    state
        .keys
        .as_ref()
        .ok_or_else(|| Error::ServerMisconfigured("JWT secret is not configured".to_string()))
}

pub async fn register(
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let registration = req.validate()?;
    let keys = keys(&state)?;
    if state.is_admin_email(&registration.email) {
        return Err(Error::DuplicateKey(DUPLICATE_EMAIL.to_string()));
    }

    let password_hash = state
        .hasher
        .hash_blocking(registration.password.clone())
        .await?;
    let student = state
        .stores
        .students
        .insert(Student::new(registration, password_hash))
        .await?;

    let token = keys.issuer.issue(&Identity::from(&student))?;
    tracing::info!(student = %student.id, roll_no = %student.roll_no, "Registered student");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            token,
            user: UserInfo::from(&student),
            message: "Registration successful".to_string(),
        }),
    ))
}

pub async fn login(
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse> {
    req.validate()?;
    let keys = keys(&state)?;

    if let Some(student) = state.stores.students.find_by_email_or_id(&req.email).await? {
        let matches = state
            .hasher
            .verify_blocking(req.password, student.password_hash.clone())
            .await?;
        if !matches {
            tracing::info!(student = %student.id, "Password mismatch");
            return Err(Error::InvalidCredentials);
        }

        let token = keys.issuer.issue(&Identity::from(&student))?;
        tracing::info!(student = %student.id, "Student logged in");
        return Ok(Json(AuthResponse {
            success: true,
            token,
            user: UserInfo::from(&student),
            message: "Login successful".to_string(),
        }));
    }

    let Some(admin) = state
        .config
        .auth
        .admins
        .iter()
        .find(|admin| admin.email.eq_ignore_ascii_case(req.email.trim()))
    else {
        state
            .hasher
            .verify_blocking(req.password, state.dummy_hash.clone())
            .await?;
        return Err(Error::InvalidCredentials);
    };
    let matches = state
        .hasher
        .verify_blocking(req.password, admin.password_hash.clone())
        .await?;
    if !matches {
        tracing::info!(admin = %admin.email, "Password mismatch");
        return Err(Error::InvalidCredentials);
    }

    let identity = Identity::from(admin);
    let token = keys.issuer.issue(&identity)?;
    tracing::info!(admin = %identity.id, "Admin logged in");
    Ok(Json(AuthResponse {
        success: true,
        token,
        user: UserInfo::from(identity),
        message: "Login successful".to_string(),
    }))
}

/// The caller's own record, or their identity for accounts without one
pub async fn me(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse> {
    if user.is_admin() {
        return Ok(Json(ApiResponse::ok(serde_json::to_value(UserInfo::from(user))?)));
    }

    let student = state
        .stores
        .students
        .find_by_id(&user.id)
        .await?
        .ok_or_else(student_not_found)?;
    Ok(Json(ApiResponse::ok(serde_json::to_value(student)?)))
}
