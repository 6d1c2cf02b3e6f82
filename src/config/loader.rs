//! Configuration loading and environment variable interpolation

use crate::error::{Error, Result};
use regex::Regex;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::Config;

pub const CONFIG_FILENAME: &str = "campus.toml";

/// Load configuration from campus.toml
pub fn load_config() -> Result<Config> {
    let config_path = find_config_file()?;
    load_config_from_path(&config_path)
}

/// Load configuration from a specific path
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|_| Error::ConfigNotFound)?;
    let content = interpolate_env_vars(&content);
    let config: Config = toml::from_str(&content)?;
    tracing::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Find the configuration file, searching upward from current directory
fn find_config_file() -> Result<PathBuf> {
    let mut current = env::current_dir().map_err(|e| Error::Config(e.to_string()))?;

    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Ok(config_path);
        }

        if !current.pop() {
            return Err(Error::ConfigNotFound);
        }
    }
}

/// Interpolate environment variables in the format ${VAR_NAME} or ${VAR_NAME:-default}
fn interpolate_env_vars(content: &str) -> String {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
            .expect("Invalid regex pattern - this is a bug in the codebase")
    });

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        env::var(var_name).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}

/// Generate a default configuration file content
pub fn default_config_content() -> &'static str {
    r#"# Campus portal configuration

[server]
host = "0.0.0.0"
port = 5000
# Leave empty to allow any origin
cors_origins = ["http://localhost:3000", "http://localhost:5173"]

[auth]
# Signing secret for bearer tokens. Requests needing a token fail with a
# server configuration error while this is empty.
jwt_secret = "${JWT_SECRET}"
token_ttl_secs = 604800  # 7 days
issuer = "university-system"
audience = "university-students"
bcrypt_cost = 10

# Administrator accounts. Generate hashes with `campus-portal hash-password`.
# [[auth.admins]]
# email = "admin@university.edu"
# name = "Portal Admin"
# password_hash = "$2b$10$..."

[database]
# PostgreSQL connection string. Records are kept in memory when empty.
url = "${DATABASE_URL:-}"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_env_interpolation() {
        env::set_var("CAMPUS_TEST_VAR", "hello");
        let content = "value = \"${CAMPUS_TEST_VAR}\"";
        let result = interpolate_env_vars(content);
        assert_eq!(result, "value = \"hello\"");
        env::remove_var("CAMPUS_TEST_VAR");
    }

    #[test]
    fn test_env_interpolation_with_default() {
        let content = "value = \"${NONEXISTENT_VAR:-default_value}\"";
        let result = interpolate_env_vars(content);
        assert_eq!(result, "value = \"default_value\"");
    }

    #[test]
    fn test_default_config_parses() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, default_config_content()).unwrap();

        let config = load_config_from_path(&path).unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.cors_origins.len(), 2);
        assert_eq!(config.auth.token_ttl_secs, 604_800);
        assert!(config.database.url().is_none());
    }

    #[test]
    fn test_missing_file_is_config_not_found() {
        let dir = TempDir::new().unwrap();
        let result = load_config_from_path(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(Error::ConfigNotFound)));
    }
}
