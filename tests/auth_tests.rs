//! Authentication flow tests against the public library API

use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderValue};
use campus_portal::auth::{authenticate, AuthKeys, Identity, PasswordHasher, UserRole};
use campus_portal::config::{AuthConfig, Config};
use campus_portal::{AuthError, Error};
use chrono::{Duration, Utc};

fn auth_config(secret: &str) -> AuthConfig {
    AuthConfig {
        jwt_secret: Some(secret.to_string()),
        bcrypt_cost: 4,
        ..Default::default()
    }
}

fn student() -> Identity {
    Identity {
        id: "5f0c6a43-2a57-4d7e-9b3c-0c6f1f0d8a11".to_string(),
        email: "student@campus.edu".to_string(),
        name: "Student One".to_string(),
        roll_no: Some("CS2024001".to_string()),
        department: Some("Computer Science".to_string()),
        role: UserRole::Student,
    }
}

fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
    headers
}

#[test]
fn test_password_properties() {
    let hasher = PasswordHasher::new(4).unwrap();

    let first = hasher.hash("correct horse").unwrap();
    let second = hasher.hash("correct horse").unwrap();
    assert_ne!(first, second);

    assert!(hasher.verify("correct horse", &first));
    assert!(hasher.verify("correct horse", &second));
    assert!(!hasher.verify("battery staple", &first));
    assert!(!hasher.verify("correct horse", "not-a-bcrypt-hash"));
}

#[test]
fn test_hash_from_one_cost_verifies_with_another() {
    let stored = PasswordHasher::new(5).unwrap().hash("pw123456").unwrap();
    assert!(PasswordHasher::new(4).unwrap().verify("pw123456", &stored));
}

#[test]
fn test_token_valid_for_seven_days() {
    let keys = AuthKeys::from_config(&auth_config("flow-secret")).unwrap();
    let issued_at = Utc::now();
    let token = keys.issuer.issue_at(&student(), issued_at).unwrap();

    let claims = keys.verifier.verify_at(&token, issued_at).unwrap();
    assert_eq!(claims.user, student());
    assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    assert_eq!(claims.iss, "university-system");
    assert_eq!(claims.aud, "university-students");

    let six_days = issued_at + Duration::days(6);
    assert!(keys.verifier.verify_at(&token, six_days).is_ok());

    let eight_days = issued_at + Duration::days(8);
    assert_eq!(
        keys.verifier.verify_at(&token, eight_days),
        Err(AuthError::Expired)
    );
}

#[test]
fn test_tokens_do_not_cross_secrets() {
    let ours = AuthKeys::from_config(&auth_config("ours")).unwrap();
    let theirs = AuthKeys::from_config(&auth_config("theirs")).unwrap();

    let token = theirs.issuer.issue(&student()).unwrap();
    assert_eq!(ours.verifier.verify(&token), Err(AuthError::InvalidSignature));
}

#[test]
fn test_no_secret_means_no_keys() {
    assert!(AuthKeys::from_config(&Config::default().auth).is_none());
    assert!(AuthKeys::from_config(&auth_config("")).is_none());
}

#[test]
fn test_authenticate_headers() {
    let keys = AuthKeys::from_config(&auth_config("gate")).unwrap();
    let token = keys.issuer.issue(&student()).unwrap();

    let claims = authenticate(&bearer(&token), Some(&keys.verifier)).unwrap();
    assert_eq!(claims.user.roll_no.as_deref(), Some("CS2024001"));

    let err = authenticate(&HeaderMap::new(), Some(&keys.verifier)).unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::Unauthenticated)));

    let mut scheme = HeaderMap::new();
    scheme.insert(AUTHORIZATION, HeaderValue::from_static("Token abc"));
    let err = authenticate(&scheme, Some(&keys.verifier)).unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::MalformedCredential)));

    let err = authenticate(&bearer(&token), None).unwrap_err();
    assert!(matches!(err, Error::ServerMisconfigured(_)));
}
