//! Authentication middleware and extractors

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::api::SharedState;
use crate::auth::jwt::{Claims, TokenVerifier};
use crate::auth::models::Identity;
use crate::error::{AuthError, Error, Result};

const BEARER_PREFIX: &str = "Bearer ";

/// Pull the bearer token out of the `Authorization` header
pub fn bearer_token(headers: &HeaderMap) -> std::result::Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::Unauthenticated)?;
    let value = value.to_str().map_err(|_| AuthError::MalformedCredential)?;
    let token = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::MalformedCredential)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::MalformedCredential);
    }
    Ok(token)
}

/// Resolve the caller's claims from request headers.
///
/// `verifier` is `None` when the server has no signing secret; that is an
/// operational fault, reported separately from client-caused failures.
pub fn authenticate(headers: &HeaderMap, verifier: Option<&TokenVerifier>) -> Result<Claims> {
    let token = bearer_token(headers)?;
    let verifier = verifier.ok_or_else(|| {
        Error::ServerMisconfigured("JWT secret is not configured".to_string())
    })?;
    Ok(verifier.verify(token)?)
}

/// Middleware for requiring authentication
pub async fn require_auth(
    State(state): State<SharedState>,
    mut req: Request,
    next: Next,
) -> std::result::Result<Response, Error> {
    let claims = authenticate(req.headers(), state.verifier())?;
    tracing::debug!(user = %claims.user.id, role = %claims.user.role, "Authenticated request");

    req.extensions_mut().insert(claims.user);
    Ok(next.run(req).await)
}

/// Middleware for routes restricted to administrators.
///
/// Must run after `require_auth`.
pub async fn require_admin(
    AuthUser(user): AuthUser,
    req: Request,
    next: Next,
) -> std::result::Result<Response, Error> {
    if !user.is_admin() {
        return Err(Error::Forbidden("Admin access required".to_string()));
    }
    Ok(next.run(req).await)
}

/// The identity attached by `require_auth`
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(AuthUser)
            .ok_or(Error::Auth(AuthError::Unauthenticated))
    }
}
