//! Credential checks against the configured users.

use crate::config::{CredentialsConfig, UserConfig};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

/// Authentication error
#[derive(Debug, Error)]
pub enum AuthError {
    /// Hashing failed
    #[error("Password hashing failed: {0}")]
    Hash(String),
}

/// Result of a login attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Credentials verified
    Success,
    /// Unknown user or wrong password
    Failure,
    /// Nothing submitted yet
    Pending,
}

/// Login outcome plus who logged in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResult {
    /// Display name, set on success
    pub name: Option<String>,

    /// What happened
    pub outcome: AuthOutcome,

    /// Login name as submitted
    pub username: String,
}

/// Verifies submitted credentials
#[derive(Debug, Clone)]
pub struct Authenticator {
    users: HashMap<String, UserConfig>,
}

impl Authenticator {
    /// Build from the credentials table
    pub fn new(credentials: &CredentialsConfig) -> Self {
        Self {
            users: credentials.usernames.clone(),
        }
    }

    /// Check a username/password pair
    pub fn login(&self, username: &str, password: &str) -> LoginResult {
        let username = username.trim();
        let pending = LoginResult {
            name: None,
            outcome: AuthOutcome::Pending,
            username: username.to_string(),
        };

        if username.is_empty() || password.is_empty() {
            return pending;
        }

        let Some(user) = self.users.get(username) else {
            warn!(username, "Login rejected: unknown user");
            return LoginResult {
                outcome: AuthOutcome::Failure,
                ..pending
            };
        };

        if !verify_password(password, &user.password) {
            warn!(username, "Login rejected: wrong password");
            return LoginResult {
                outcome: AuthOutcome::Failure,
                ..pending
            };
        }

        LoginResult {
            name: Some(user.name.clone()),
            outcome: AuthOutcome::Success,
            ..pending
        }
    }
}

fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("Stored password hash is not a valid PHC string: {}", e);
            false
        }
    }
}

/// Hash a password into the PHC string stored in the config file
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}
