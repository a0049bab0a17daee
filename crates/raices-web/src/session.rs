//! Session tokens and per-session state.
//!
//! A successful login yields a signed token carried in an HTTP-only cookie.
//! The token names a session id; everything a visitor accumulates (the
//! current reading, the circle, the last exported report) lives in the
//! [`SessionStore`] under that id and is never shared between sessions.

use jsonwebtoken::{decode, encode, get_current_timestamp, DecodingKey, EncodingKey, Header, Validation};
use raices_domain::{Circle, Reading};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use uuid::Uuid;

/// Session management error
#[derive(Debug, Error)]
pub enum SessionError {
    /// JWT encoding failed
    #[error("Failed to encode JWT: {0}")]
    JwtEncode(#[from] jsonwebtoken::errors::Error),

    /// Token expired
    #[error("Session token expired")]
    TokenExpired,

    /// Invalid token
    #[error("Invalid session token")]
    InvalidToken,
}

/// JWT claims for session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Login name
    pub sub: String,

    /// Display name
    pub name: String,

    /// Session id keying the server-side state
    pub sid: String,

    /// Token expiration timestamp (Unix epoch)
    pub exp: u64,

    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
}

/// Session manager handles JWT token generation and validation
pub struct SessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_secs: u64,
}

impl SessionManager {
    /// Create a new session manager with the given secret and expiry
    pub fn new(secret: &str, token_expiry_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_expiry_secs,
        }
    }

    /// Issue a token for a fresh session; returns the token and its claims
    pub fn generate_token(&self, username: &str, name: &str) -> Result<(String, SessionClaims), SessionError> {
        let now = get_current_timestamp();

        let claims = SessionClaims {
            sub: username.to_string(),
            name: name.to_string(),
            sid: Uuid::new_v4().simple().to_string(),
            exp: now + self.token_expiry_secs,
            iat: now,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok((token, claims))
    }

    /// Validate a session token and extract claims
    pub fn validate_token(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let validation = Validation::default();
        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::TokenExpired,
                _ => SessionError::InvalidToken,
            })?;

        Ok(token_data.claims)
    }
}

/// Everything one visitor accumulates
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Current reading; drawn at most once until reset
    pub reading: Option<Reading>,

    /// Participants who joined the circle in this session
    pub circle: Circle,

    /// Most recently exported report
    pub last_report: Option<PathBuf>,
}

impl SessionState {
    /// Forget the current reading so a new one can be drawn
    pub fn reset_reading(&mut self) {
        self.reading = None;
    }
}

#[derive(Debug)]
struct SessionEntry {
    state: SessionState,
    expires_at: u64,
}

impl SessionEntry {
    fn is_live(&self, now: u64) -> bool {
        self.expires_at > now
    }
}

/// In-memory session state keyed by session id
///
/// Each entry lives until logout or until its token expires. Expired
/// entries are invisible immediately and are pruned on the next
/// [`SessionStore::create`] or [`SessionStore::prune_expired`].
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh session that expires at `expires_at` (Unix epoch)
    pub fn create(&self, sid: &str, expires_at: u64) {
        let now = get_current_timestamp();
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions.retain(|_, entry| entry.is_live(now));
        sessions.insert(
            sid.to_string(),
            SessionEntry {
                state: SessionState::default(),
                expires_at,
            },
        );
    }

    /// Drop a session and everything it held
    pub fn remove(&self, sid: &str) -> Option<SessionState> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(sid)
            .map(|entry| entry.state)
    }

    /// Whether a session is live
    pub fn contains(&self, sid: &str) -> bool {
        let now = get_current_timestamp();
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(sid)
            .is_some_and(|entry| entry.is_live(now))
    }

    /// Snapshot of a session's state, empty if the session is unknown or expired
    pub fn snapshot(&self, sid: &str) -> SessionState {
        let now = get_current_timestamp();
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(sid)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.state.clone())
            .unwrap_or_default()
    }

    /// Run `f` against a live session's state
    ///
    /// Returns `None` without calling `f` when the session was closed or
    /// has expired; a removed session is never recreated.
    pub fn update<R>(&self, sid: &str, f: impl FnOnce(&mut SessionState) -> R) -> Option<R> {
        let now = get_current_timestamp();
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions
            .get_mut(sid)
            .filter(|entry| entry.is_live(now))
            .map(|entry| f(&mut entry.state))
    }

    /// Drop every session whose token expired at or before `now`; returns
    /// how many were dropped
    pub fn prune_expired(&self, now: u64) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, entry| entry.is_live(now));
        before - sessions.len()
    }

    /// Number of stored sessions, including expired ones not yet pruned
    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no session is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_and_validate_token() {
        let manager = SessionManager::new("test-secret", 3600);
        let (token, issued) = manager.generate_token("ana", "Ana").unwrap();

        let claims = manager.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "ana");
        assert_eq!(claims.name, "Ana");
        assert_eq!(claims.sid, issued.sid);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_each_login_gets_its_own_session() {
        let manager = SessionManager::new("test-secret", 3600);
        let (_, first) = manager.generate_token("ana", "Ana").unwrap();
        let (_, second) = manager.generate_token("ana", "Ana").unwrap();
        assert_ne!(first.sid, second.sid);
    }

    #[test]
    fn test_expired_token() {
        let manager = SessionManager::new("test-secret", 3600);

        let now = get_current_timestamp();
        let claims = SessionClaims {
            sub: "ana".to_string(),
            name: "Ana".to_string(),
            sid: "s1".to_string(),
            exp: now - 100, // Expired 100 seconds ago
            iat: now - 200,
        };

        let token = encode(&Header::default(), &claims, &manager.encoding_key).unwrap();

        let result = manager.validate_token(&token);
        assert!(matches!(result, Err(SessionError::TokenExpired)));
    }

    #[test]
    fn test_invalid_token() {
        let manager = SessionManager::new("test-secret", 3600);
        let result = manager.validate_token("invalid-token");
        assert!(matches!(result, Err(SessionError::InvalidToken)));
    }

    #[test]
    fn test_wrong_secret() {
        let manager1 = SessionManager::new("secret1", 3600);
        let manager2 = SessionManager::new("secret2", 3600);

        let (token, _) = manager1.generate_token("ana", "Ana").unwrap();
        let result = manager2.validate_token(&token);
        assert!(matches!(result, Err(SessionError::InvalidToken)));
    }

    fn in_an_hour() -> u64 {
        get_current_timestamp() + 3600
    }

    #[test]
    fn test_store_isolates_sessions() {
        let store = SessionStore::new();
        store.create("a", in_an_hour());
        store.create("b", in_an_hour());

        store.update("a", |state| state.circle.join("Ana", "El Río")).unwrap();

        assert_eq!(store.snapshot("a").circle.len(), 1);
        assert!(store.snapshot("b").circle.is_empty());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_remove_drops_state() {
        let store = SessionStore::new();
        store.create("a", in_an_hour());
        store
            .update("a", |state| state.last_report = Some(PathBuf::from("x.pdf")))
            .unwrap();

        let removed = store.remove("a").unwrap();
        assert_eq!(removed.last_report, Some(PathBuf::from("x.pdf")));
        assert!(store.is_empty());
        assert!(!store.contains("a"));
        assert!(store.snapshot("a").last_report.is_none());
    }

    #[test]
    fn test_update_never_recreates_closed_session() {
        let store = SessionStore::new();
        store.create("a", in_an_hour());
        store.remove("a");

        let result = store.update("a", |state| state.circle.join("Ana", "El Río"));
        assert!(result.is_none());
        assert!(store.is_empty());
        assert!(!store.contains("a"));
    }

    #[test]
    fn test_expired_sessions_are_hidden_and_pruned() {
        let store = SessionStore::new();
        let past = get_current_timestamp() - 10;
        for i in 0..1000 {
            store.create(&format!("old-{}", i), past);
        }

        assert!(!store.contains("old-0"));
        assert!(store.update("old-0", |_| ()).is_none());
        assert!(store.snapshot("old-0").reading.is_none());

        // The next login sweeps every expired entry
        store.create("fresh", in_an_hour());
        assert_eq!(store.len(), 1);
        assert!(store.contains("fresh"));
    }

    #[test]
    fn test_prune_expired() {
        let store = SessionStore::new();
        store.create("a", 100);
        store.create("b", in_an_hour());
        // "a" was already swept by the second create
        assert_eq!(store.len(), 1);

        let now = get_current_timestamp();
        assert_eq!(store.prune_expired(now), 0);
        assert_eq!(store.prune_expired(now + 7200), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_reset_reading() {
        let mut state = SessionState {
            reading: Some(Reading::new(vec!["La Casa".to_string()])),
            ..SessionState::default()
        };
        state.circle.join("Ana", "La Casa");

        state.reset_reading();
        assert!(state.reading.is_none());
        assert_eq!(state.circle.len(), 1);
    }
}
