//! Input field checks shared by request bodies

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{Error, Result};

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .expect("Invalid regex pattern - this is a bug in the codebase")
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

/// Require a trimmed string of at least `min` characters
pub fn min_len(field: &str, value: &str, min: usize) -> Result<()> {
    if value.trim().chars().count() < min {
        return Err(Error::Validation(format!(
            "{} must be at least {} characters",
            field, min
        )));
    }
    Ok(())
}

pub fn email(field: &str, value: &str) -> Result<()> {
    if !is_valid_email(value.trim()) {
        return Err(Error::Validation(format!("{} must be a valid email", field)));
    }
    Ok(())
}

/// Require `value` to lie within `[min, max]`
pub fn in_range(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(Error::Validation(format!(
            "{} must be between {} and {}",
            field, min, max
        )));
    }
    Ok(())
}
