//! CLI command implementations

use anyhow::{bail, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::auth::{AuthKeys, PasswordHasher};
use crate::cli::{error, info, print_claims, success, warn};
use crate::config::{self, Config, CONFIG_FILENAME};

/// Initialize a new campus.toml configuration file
pub async fn init() -> Result<()> {
    let config_path = Path::new(CONFIG_FILENAME);

    if config_path.exists() {
        warn(&format!("{} already exists", CONFIG_FILENAME));
        return Ok(());
    }

    let content = config::loader::default_config_content();
    fs::write(config_path, content)?;

    success(&format!("Created {}", CONFIG_FILENAME));
    info("Set JWT_SECRET (or auth.jwt_secret) and run 'campus-portal serve' to start the API");

    Ok(())
}

/// Start the API server
pub async fn serve(host: Option<String>, port: Option<u16>, path: Option<PathBuf>) -> Result<()> {
    let config = load_config(path.as_deref())?;
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    if config.auth.secret().is_none() {
        warn("auth.jwt_secret is empty; login and protected routes will answer 500");
    }
    info(&format!("Starting server at http://{}:{}", host, port));

    crate::api::run_server(config, &host, port).await?;
    Ok(())
}

/// Print a bcrypt hash suitable for an admin account entry
pub async fn hash_password(password: String, cost: Option<u32>) -> Result<()> {
    let cost = match cost {
        Some(cost) => cost,
        None => config::load_config()
            .map(|config| config.auth.bcrypt_cost)
            .unwrap_or(crate::auth::password::DEFAULT_COST),
    };

    let hasher = PasswordHasher::new(cost)?;
    let hash = hasher.hash_blocking(password).await?;
    println!("{}", hash);
    Ok(())
}

/// Verify a token with the configured secret and show its claims
pub async fn verify_token(token: &str, path: Option<PathBuf>) -> Result<()> {
    let config = load_config(path.as_deref())?;
    let Some(keys) = AuthKeys::from_config(&config.auth) else {
        error("auth.jwt_secret is not configured");
        bail!("cannot verify tokens without a signing secret");
    };

    match keys.verifier.verify(token.trim()) {
        Ok(claims) => {
            success("Token is valid");
            println!();
            print_claims(&claims);
            Ok(())
        }
        Err(e) => {
            error(&format!("Token rejected: {} ({})", e, e.kind()));
            Err(e.into())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => config::load_config_from_path(path),
        None => config::load_config(),
    };
    config.map_err(|e| anyhow::anyhow!("{}", e))
}
