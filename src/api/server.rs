//! HTTP API server

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{require_admin, require_auth, AuthKeys, PasswordHasher, TokenVerifier};
use crate::config::Config;
use crate::error::Result;
use crate::store::Stores;

use super::{admin, admissions, auth, routes, students};

const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    /// `None` when no signing secret is configured
    pub keys: Option<AuthKeys>,
    pub hasher: PasswordHasher,
    /// Verified against when no account matches, so unknown logins cost one bcrypt
    pub dummy_hash: String,
    pub stores: Stores,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: Config, stores: Stores) -> Result<Self> {
        let keys = AuthKeys::from_config(&config.auth);
        if keys.is_none() {
            tracing::error!(
                alarm = "server_misconfigured",
                "auth.jwt_secret is not set; every authenticated request will fail"
            );
        }
        let hasher = PasswordHasher::new(config.auth.bcrypt_cost)?;
        let dummy_hash = hasher.hash(&uuid::Uuid::new_v4().to_string())?;

        Ok(Self {
            config,
            keys,
            hasher,
            dummy_hash,
            stores,
        })
    }

    pub fn verifier(&self) -> Option<&TokenVerifier> {
        self.keys.as_ref().map(|keys| &keys.verifier)
    }

    /// Whether an email belongs to a configured admin account
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.config
            .auth
            .admins
            .iter()
            .any(|admin| admin.email.eq_ignore_ascii_case(email.trim()))
    }
}

/// Run the HTTP API server
pub async fn run_server(config: Config, host: &str, port: u16) -> Result<()> {
    let stores = Stores::connect(&config.database).await?;
    let state = Arc::new(AppState::new(config, stores)?);

    let app = create_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the router with all routes
pub fn create_router(state: SharedState) -> Router {
    let authenticated = from_fn_with_state(state.clone(), require_auth);

    let student_routes = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route(
            "/api/students/profile",
            get(students::get_profile).put(students::update_profile),
        )
        .route("/api/students/attendance", get(students::get_attendance))
        .route(
            "/api/students/fees",
            get(students::get_fees).put(students::pay_fees),
        )
        .route(
            "/api/students/placement",
            get(students::get_placement).put(students::update_placement),
        )
        .route_layer(authenticated.clone());

    // Layers run outermost-last: authentication happens before the role check
    let admin_routes = Router::new()
        .route("/api/students", get(students::list_students))
        .route("/api/students/{id}", get(students::get_student))
        .route("/api/admissions", get(admissions::list_applications))
        .route(
            "/api/admissions/{id}",
            get(admissions::get_application).delete(admissions::delete_application),
        )
        .route(
            "/api/admissions/{id}/status",
            put(admissions::update_status),
        )
        .route("/api/admin/dashboard", get(admin::dashboard))
        .route("/api/admin/students/analytics", get(admin::student_analytics))
        .route_layer(from_fn(require_admin))
        .route_layer(authenticated);

    let cors = cors_layer(&state.config.server.cors_origins);

    Router::new()
        .route("/", get(routes::index))
        .route("/api/health", get(routes::health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/admissions/apply", post(admissions::apply))
        .merge(student_routes)
        .merge(admin_routes)
        .fallback(routes::not_found)
        // Middleware
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdminAccount;

    fn state() -> AppState {
        let mut config = Config::default();
        config.auth.bcrypt_cost = 4;
        config.auth.admins.push(AdminAccount {
            id: None,
            email: "Admin@University.edu".to_string(),
            name: "Admin".to_string(),
            password_hash: String::new(),
        });
        AppState::new(config, Stores::memory()).unwrap()
    }

    #[tokio::test]
    async fn test_dummy_hash_is_a_real_bcrypt_hash() {
        let state = state();
        assert!(state.dummy_hash.starts_with("$2b$04$"));
        let matches = state
            .hasher
            .verify_blocking("password123".to_string(), state.dummy_hash.clone())
            .await
            .unwrap();
        assert!(!matches);
    }

    #[test]
    fn test_admin_email_match_ignores_case() {
        let state = state();
        assert!(state.is_admin_email(" admin@university.edu "));
        assert!(!state.is_admin_email("student@university.edu"));
    }
}
