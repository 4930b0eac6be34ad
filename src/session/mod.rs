/// Bearer-token session lifecycle.
///
/// The session is nothing more than a token persisted under a fixed
/// storage key. Validity is recomputed on every read:
///
/// - a stored value without the three-segment shape is deleted on read
/// - a token whose `exp` claim is not strictly in the future is deleted
///   when authentication is checked
/// - a token whose payload cannot be decoded counts as not authenticated
///
/// Every check resolves to a boolean; nothing here returns an error for a
/// bad token. One [`SessionManager`] is built at startup and shared as an
/// `Arc` by the data client and the app.
pub mod claims;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::events::{EventKind, EventLog};
use crate::storage::{KeyValueStore, TOKEN_KEY};

pub use claims::{Claims, ClaimsError, decode_claims, encode_claims, has_token_shape};

/// A live, validated session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub subject_id: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Owns the stored token and answers "is the user signed in?".
pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    events: EventLog,
}

impl SessionManager {
    pub fn new(store: Arc<dyn KeyValueStore>, events: EventLog) -> Self {
        Self { store, events }
    }

    /// Store `raw` as the session token.
    ///
    /// Returns `false` and stores nothing when the value does not have the
    /// three-segment shape.
    pub fn set_token(&self, raw: &str) -> bool {
        let token = raw.trim();
        if !has_token_shape(token) {
            self.events.record(EventKind::TokenRejected);
            return false;
        }
        match self.store.set(TOKEN_KEY, token) {
            Ok(()) => true,
            Err(e) => {
                self.events
                    .record_with(EventKind::TokenRejected, format!("could not persist token: {e}"));
                false
            }
        }
    }

    /// The stored token, if it is structurally valid.
    ///
    /// A malformed stored value is deleted.
    pub fn token(&self) -> Option<String> {
        let token = self.store.get(TOKEN_KEY)?;
        if has_token_shape(&token) {
            Some(token)
        } else {
            self.clear();
            None
        }
    }

    /// Whether a structurally valid, unexpired token is stored.
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(Utc::now().timestamp())
    }

    /// [`is_authenticated`](Self::is_authenticated) against an explicit clock.
    pub fn is_authenticated_at(&self, now: i64) -> bool {
        self.current_at(now).is_some()
    }

    /// The current session, or `None` if not authenticated.
    pub fn current(&self) -> Option<Session> {
        self.current_at(Utc::now().timestamp())
    }

    /// [`current`](Self::current) against an explicit clock.
    pub fn current_at(&self, now: i64) -> Option<Session> {
        let token = self.token()?;
        let claims = match decode_claims(&token) {
            Ok(claims) => claims,
            Err(e) => {
                self.events.record_with(EventKind::TokenRejected, e.to_string());
                return None;
            }
        };
        if !claims.is_live_at(now) {
            self.events.record_with(EventKind::SessionExpired, "token expired");
            self.clear();
            return None;
        }
        Some(Session {
            subject_id: claims.subject(),
            expires_at: claims.expires_at(),
            token,
        })
    }

    /// Token of the current session, if authenticated.
    pub fn valid_token(&self) -> Option<String> {
        self.current().map(|s| s.token)
    }

    /// Delete the stored token.
    pub fn logout(&self) {
        self.events.record(EventKind::Logout);
        self.clear();
    }

    /// Delete the stored token because the platform rejected it.
    pub fn invalidate(&self, reason: &str) {
        self.events.record_with(EventKind::SessionExpired, reason);
        self.clear();
    }

    fn clear(&self) {
        let _ = self.store.remove(TOKEN_KEY);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::storage::MemoryStore;

    fn manager() -> (SessionManager, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let manager = SessionManager::new(store.clone(), EventLog::disabled());
        (manager, store)
    }

    fn token_with(claims: serde_json::Value) -> String {
        encode_claims(claims.as_object().unwrap())
    }

    #[test]
    fn set_token_rejects_malformed() {
        let (session, store) = manager();
        assert!(!session.set_token("not-a-token"));
        assert!(!session.set_token("a.b"));
        assert_eq!(store.get(TOKEN_KEY), None);
        assert!(session.set_token("a.b.c"));
        assert_eq!(store.get(TOKEN_KEY).as_deref(), Some("a.b.c"));
    }

    #[test]
    fn malformed_stored_token_self_heals() {
        let (session, store) = manager();
        store.set(TOKEN_KEY, "garbage").unwrap();
        assert_eq!(session.token(), None);
        assert_eq!(store.get(TOKEN_KEY), None);
    }

    #[test]
    fn undecodable_payload_is_not_authenticated() {
        let (session, _) = manager();
        assert!(session.set_token("x.%%%.y"));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn current_exposes_subject_and_expiry() {
        let (session, _) = manager();
        assert!(session.set_token(&token_with(json!({ "sub": "1337", "exp": 2_000 }))));
        let current = session.current_at(1_000).unwrap();
        assert_eq!(current.subject_id.as_deref(), Some("1337"));
        assert_eq!(current.expires_at.unwrap().timestamp(), 2_000);
    }

    #[test]
    fn expired_token_is_deleted() {
        let (session, store) = manager();
        assert!(session.set_token(&token_with(json!({ "sub": "1", "exp": 500 }))));
        assert!(!session.is_authenticated_at(500));
        assert_eq!(store.get(TOKEN_KEY), None);
    }

    #[test]
    fn logout_clears_token() {
        let (session, _) = manager();
        assert!(session.set_token(&token_with(json!({ "sub": "1" }))));
        assert!(session.is_authenticated());
        session.logout();
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
    }
}
