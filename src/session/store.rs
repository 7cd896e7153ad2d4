use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::session::{Claims, Role, Session};
use crate::session::token::decode_claims;
use crate::storage::kv::KeyValueStore;

pub const TOKEN_KEY: &str = "authToken";
pub const ROLE_KEY: &str = "userRole";
pub const USERNAME_KEY: &str = "username";

const SESSION_KEYS: [&str; 3] = [TOKEN_KEY, ROLE_KEY, USERNAME_KEY];

/// Holds the current session and mirrors it into persistent storage.
pub struct SessionStore {
    session: Session,
    backend: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    /// Rehydrates the session persisted in `backend`.
    ///
    /// A stored token without a usable role and username is treated as no
    /// session, and the stale keys are removed.
    pub fn load(backend: Arc<dyn KeyValueStore>) -> Self {
        let mut store = Self {
            session: Session::default(),
            backend,
        };

        let Some(token) = store.backend.get(TOKEN_KEY) else {
            return store;
        };

        let role = store.backend.get(ROLE_KEY).and_then(|r| r.parse::<Role>().ok());
        let username = store.backend.get(USERNAME_KEY).filter(|u| !u.is_empty());

        let restored = match (role, username) {
            (Some(role), Some(username)) => Some((role, username)),
            _ => decode_claims(&token).map(|c| (c.role, c.username)),
        };

        match restored {
            Some((role, username)) => {
                tracing::info!("✅ Session restored for {}", username);
                store.session = Session {
                    token: Some(token),
                    role: Some(role),
                    username: Some(username),
                };
            }
            None => {
                tracing::warn!("⚠️ Discarding persisted session that cannot be decoded");
                for key in SESSION_KEYS {
                    if let Err(e) = store.backend.remove(key) {
                        e.log("session.load");
                    }
                }
            }
        }

        store
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Starts a session from a freshly issued token.
    ///
    /// Nothing is written unless the token payload decodes. If a write fails,
    /// the keys are put back the way they were.
    pub fn login(&mut self, token: &str) -> Result<Claims> {
        let claims = decode_claims(token).ok_or(AppError::Decode)?;

        let previous: Vec<(&str, Option<String>)> = SESSION_KEYS
            .into_iter()
            .map(|key| (key, self.backend.get(key)))
            .collect();
        if let Err(e) = self.write(token, &claims) {
            self.restore(previous);
            return Err(e);
        }

        self.session = Session {
            token: Some(token.to_string()),
            role: Some(claims.role),
            username: Some(claims.username.clone()),
        };
        tracing::info!("🔐 Session started for {} ({})", claims.username, claims.role);
        Ok(claims)
    }

    fn write(&self, token: &str, claims: &Claims) -> Result<()> {
        self.backend.set(TOKEN_KEY, token)?;
        self.backend.set(ROLE_KEY, claims.role.as_str())?;
        self.backend.set(USERNAME_KEY, &claims.username)
    }

    fn restore(&self, previous: Vec<(&str, Option<String>)>) {
        tracing::warn!("⚠️ Rolling back partially written session");
        for (key, value) in previous {
            let result = match value {
                Some(value) => self.backend.set(key, &value),
                None => self.backend.remove(key),
            };
            if let Err(e) = result {
                e.log("session rollback");
            }
        }
    }

    /// Wipes persistent storage, then ends the session.
    ///
    /// The session stays intact when storage cannot be cleared.
    pub fn logout(&mut self) -> Result<()> {
        self.backend.clear()?;
        self.session = Session::default();
        tracing::info!("👋 Session cleared");
        Ok(())
    }

    /// Ends the in-memory session without touching storage.
    pub fn forget(&mut self) {
        self.session = Session::default();
    }
}
