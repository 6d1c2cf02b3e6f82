//! Password hashing

use crate::error::{Error, Result};

/// Work factor used unless configuration says otherwise
pub const DEFAULT_COST: u32 = 10;

const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

/// One-way salted password hashing with bcrypt.
///
/// Every `hash` call draws a fresh salt, so hashing the same password twice
/// gives two different strings that both verify. The output is the
/// self-describing `$2b$<cost>$...` form, which carries everything `verify`
/// needs.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Create a hasher with a fixed cost
    pub fn new(cost: u32) -> Result<Self> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(Error::Config(format!(
                "bcrypt cost must be between {} and {}, got {}",
                MIN_COST, MAX_COST, cost
            )));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        Ok(bcrypt::hash(plaintext, self.cost)?)
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// A malformed hash is a mismatch, not an error.
    pub fn verify(&self, plaintext: &str, hashed: &str) -> bool {
        match bcrypt::verify(plaintext, hashed) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::debug!("Stored password hash rejected: {}", e);
                false
            }
        }
    }

    /// `hash` on the blocking pool
    pub async fn hash_blocking(&self, plaintext: String) -> Result<String> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext)).await?
    }

    /// `verify` on the blocking pool
    pub async fn verify_blocking(&self, plaintext: String, hashed: String) -> Result<bool> {
        let hasher = *self;
        Ok(tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &hashed)).await?)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}
