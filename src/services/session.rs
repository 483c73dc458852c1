// SPDX-License-Identifier: MIT
// Copyright 2026 Fabula Authors

//! Durable session persistence.
//!
//! The session is stored as two keys (`token`, `user`) that are always
//! written and cleared together. A half-present or unparsable record is
//! dropped on load rather than surfaced as a partial session.

use crate::error::Result;
use crate::models::Session;
use crate::store::{keys, LocalStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// User identity record persisted under the `user` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredUser {
    user_id: String,
    display_name: String,
    email: Option<String>,
    issued_at: DateTime<Utc>,
}

/// Typed session persistence over the local store.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<LocalStore>,
}

impl SessionStore {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }

    /// Load the persisted session, if a complete one exists.
    ///
    /// A corrupt record (unparsable fields, or a token without a user or
    /// vice versa) is cleared and reported as absence; a partially-parsed
    /// session is never returned.
    pub fn load(&self) -> Option<Session> {
        let token = self.store.get::<String>(keys::TOKEN);
        let user = self.store.get::<StoredUser>(keys::USER);

        match (token, user) {
            (Ok(Some(token)), Ok(Some(user))) if !token.is_empty() => Some(Session {
                user_id: user.user_id,
                display_name: user.display_name,
                email: user.email,
                token,
                issued_at: user.issued_at,
            }),
            (Ok(None), Ok(None)) => None,
            _ => {
                tracing::warn!("Corrupt or partial session record, clearing");
                if let Err(e) = self.clear() {
                    tracing::error!(error = %e, "Failed to clear corrupt session record");
                }
                None
            }
        }
    }

    /// Persist a session, overwriting any prior value.
    ///
    /// The user and token keys are written in a single store update.
    pub fn save(&self, session: &Session) -> Result<()> {
        let user = StoredUser {
            user_id: session.user_id.clone(),
            display_name: session.display_name.clone(),
            email: session.email.clone(),
            issued_at: session.issued_at,
        };
        self.store.set_many(&[
            (keys::TOKEN, serde_json::Value::String(session.token.clone())),
            (
                keys::USER,
                serde_json::to_value(&user)
                    .map_err(|e| crate::error::CoreError::Storage(e.to_string()))?,
            ),
        ])
    }

    /// Remove the session pair. Idempotent.
    pub fn clear(&self) -> Result<()> {
        self.store.remove_many(&[keys::TOKEN, keys::USER])
    }

    /// Read just the bearer token, for the fetch path.
    ///
    /// A corrupt token is reported as absence; the next `load()` cleans it
    /// up.
    pub fn token(&self) -> Option<String> {
        self.store
            .get::<String>(keys::TOKEN)
            .ok()
            .flatten()
            .filter(|t| !t.is_empty())
    }
}
