//! Body and query extractors that reject with the crate's JSON error body

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::Error;

/// `axum::Json` whose rejection is a 400 `{ "message" }`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query` whose rejection is a 400 `{ "message" }`
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct ApiQuery<T>(pub T);
