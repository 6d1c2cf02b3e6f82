//! Configuration schema definitions

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Server configuration for the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; empty means any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

/// Token signing and password hashing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Symmetric signing secret. Empty is treated as unset.
    #[serde(default)]
    pub jwt_secret: Option<String>,

    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,

    #[serde(default = "default_issuer")]
    pub issuer: String,

    #[serde(default = "default_audience")]
    pub audience: String,

    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,

    #[serde(default)]
    pub admins: Vec<AdminAccount>,
}

fn default_token_ttl_secs() -> u64 {
    7 * 24 * 60 * 60
}

fn default_issuer() -> String {
    "university-system".to_string()
}

fn default_audience() -> String {
    "university-students".to_string()
}

fn default_bcrypt_cost() -> u32 {
    crate::auth::password::DEFAULT_COST
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_secs: default_token_ttl_secs(),
            issuer: default_issuer(),
            audience: default_audience(),
            bcrypt_cost: default_bcrypt_cost(),
            admins: Vec::new(),
        }
    }
}

impl AuthConfig {
    /// The signing secret, if one is actually configured. Returned exactly as
    /// written; surrounding whitespace is part of the key.
    pub fn secret(&self) -> Option<&str> {
        self.jwt_secret
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }
}

/// Administrator login configured out of band
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminAccount {
    /// Identity id carried in tokens; defaults to the email
    #[serde(default)]
    pub id: Option<String>,
    pub email: String,
    pub name: String,
    /// bcrypt hash, see `campus-portal hash-password`
    pub password_hash: String,
}

impl AdminAccount {
    pub fn identity_id(&self) -> &str {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(&self.email)
    }
}

/// Persistence backend settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string; records are kept in memory when unset
    #[serde(default)]
    pub url: Option<String>,
}

impl DatabaseConfig {
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_token_policy() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.auth.token_ttl_secs, 604_800);
        assert_eq!(config.auth.issuer, "university-system");
        assert_eq!(config.auth.audience, "university-students");
        assert_eq!(config.auth.bcrypt_cost, 10);
        assert!(config.auth.secret().is_none());
        assert!(config.database.url().is_none());
    }

    #[test]
    fn test_blank_secret_is_unset() {
        let mut auth = AuthConfig::default();
        auth.jwt_secret = Some("   ".to_string());
        assert!(auth.secret().is_none());

        auth.jwt_secret = Some("s3cret".to_string());
        assert_eq!(auth.secret(), Some("s3cret"));
    }

    #[test]
    fn test_secret_keeps_surrounding_whitespace() {
        let mut auth = AuthConfig::default();
        auth.jwt_secret = Some(" padded secret ".to_string());
        assert_eq!(auth.secret(), Some(" padded secret "));
    }

    #[test]
    fn test_admin_identity_falls_back_to_email() {
        let admin = AdminAccount {
            id: None,
            email: "dean@campus.edu".to_string(),
            name: "Dean".to_string(),
            password_hash: String::new(),
        };
        assert_eq!(admin.identity_id(), "dean@campus.edu");
    }
}
