//! Campus portal - university records API with token authentication
//!
//! This is the library interface for the portal: password hashing, token
//! issuance and verification, the request gate, record stores and the axum
//! router that ties them together.

pub mod admissions;
pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod store;
pub mod students;
pub mod validation;

pub use config::Config;
pub use error::{AuthError, Error};
