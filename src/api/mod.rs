//! HTTP API

pub mod admin;
pub mod admissions;
pub mod auth;
pub mod extract;
pub mod routes;
pub mod server;
pub mod students;

pub use server::*;
