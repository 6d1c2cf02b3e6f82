//! Authentication and authorization

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;

pub use jwt::{AuthKeys, Claims, TokenIssuer, TokenVerifier};
pub use middleware::{authenticate, bearer_token, require_admin, require_auth, AuthUser};
pub use models::{Identity, UserRole};
pub use password::PasswordHasher;
