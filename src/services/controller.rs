// SPDX-License-Identifier: MIT
// Copyright 2026 Fabula Authors

//! Session lifecycle: login, logout, readiness, and expiry.
//!
//! The controller is the dependency root for the UI layer and the sole
//! writer of the session store, with one sanctioned exception: the
//! [`SessionInvalidator`] capability it hands to the sync engine, whose
//! only power is the session-and-cache wipe on authentication failure.

use crate::api::ApiClient;
use crate::error::{CoreError, Result};
use crate::models::Session;
use crate::services::push::PushRegistrar;
use crate::services::session::SessionStore;
use crate::store::{keys, LocalStore};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use validator::Validate;

/// Settled view of the session, published to the UI layer.
#[derive(Debug, Clone)]
pub enum SessionState {
    /// The initial load attempt has not completed yet
    Unknown,
    SignedOut,
    SignedIn(Session),
}

/// Login credentials, validated locally before the authenticator runs.
#[derive(Debug, Clone, Validate)]
pub struct LoginCredentials {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// What an authenticator yields on success.
#[derive(Debug, Clone)]
pub struct AuthGrant {
    pub user_id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub token: String,
}

/// External authentication collaborator.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<AuthGrant>;
}

/// Authenticator backed by the backend's login endpoint.
pub struct HttpAuthenticator {
    api: Arc<ApiClient>,
}

impl HttpAuthenticator {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Authenticator for HttpAuthenticator {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<AuthGrant> {
        let response = self
            .api
            .login(&credentials.email, &credentials.password)
            .await?;
        Ok(AuthGrant {
            user_id: response.user_id,
            display_name: response.display_name,
            email: response.email,
            token: response.token,
        })
    }
}

struct ControllerInner {
    store: Arc<LocalStore>,
    sessions: SessionStore,
    registrar: PushRegistrar,
    authenticator: Arc<dyn Authenticator>,
    api: Arc<ApiClient>,
    state_tx: watch::Sender<SessionState>,
    ready: AtomicBool,
}

impl ControllerInner {
    /// Clear every durable auth artifact as one set and publish the
    /// signed-out state. Idempotent.
    fn wipe(&self, reason: &str) {
        if let Err(e) = self.store.remove_many(&keys::AUTH_SCOPE) {
            tracing::error!(error = %e, reason, "Failed to clear session keys");
        }
        self.state_tx.send_replace(SessionState::SignedOut);
        tracing::info!(reason, "Session cleared");
    }
}

/// Public-facing session entry point.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<ControllerInner>,
}

impl SessionController {
    pub fn new(
        store: Arc<LocalStore>,
        api: Arc<ApiClient>,
        authenticator: Arc<dyn Authenticator>,
        registrar: PushRegistrar,
    ) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                sessions: SessionStore::new(store.clone()),
                store,
                registrar,
                authenticator,
                api,
                state_tx: watch::Sender::new(SessionState::Unknown),
                ready: AtomicBool::new(false),
            }),
        }
    }

    /// Perform the initial session load.
    ///
    /// Readiness flips once the load attempt completes, successfully or
    /// not; push registration for a recovered session is best-effort and
    /// happens after the state is published.
    pub async fn bootstrap(&self) {
        let session = self.inner.sessions.load();

        match session {
            Some(session) => {
                tracing::info!(user_id = %session.user_id, "Recovered persisted session");
                self.inner
                    .state_tx
                    .send_replace(SessionState::SignedIn(session.clone()));
                self.inner.ready.store(true, Ordering::SeqCst);
                self.inner.registrar.activate_for(&session).await;
            }
            None => {
                self.inner.state_tx.send_replace(SessionState::SignedOut);
                self.inner.ready.store(true, Ordering::SeqCst);
            }
        }
    }

    /// Log in: validate credentials, obtain a grant, persist the session,
    /// then register for push best-effort.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<Session> {
        credentials
            .validate()
            .map_err(|e| CoreError::InvalidCredentials(e.to_string()))?;

        let grant = self.inner.authenticator.authenticate(credentials).await?;

        let session = Session {
            user_id: grant.user_id,
            display_name: grant.display_name,
            email: grant.email,
            token: grant.token,
            issued_at: Utc::now(),
        };
        self.inner.sessions.save(&session)?;
        self.inner
            .state_tx
            .send_replace(SessionState::SignedIn(session.clone()));
        self.inner.ready.store(true, Ordering::SeqCst);

        tracing::info!(user_id = %session.user_id, "Logged in");

        // Registration failure is logged inside and never fails the login.
        self.inner.registrar.activate_for(&session).await;

        Ok(session)
    }

    /// Log out: notify the backend best-effort, then clear all local
    /// session and cache state. Local logout succeeds even when the
    /// network call fails.
    pub async fn logout(&self) -> Result<()> {
        if let Some(token) = self.inner.sessions.token() {
            if let Err(e) = self.inner.api.logout(&token).await {
                tracing::warn!(error = %e, "Backend logout failed, clearing local session anyway");
            }
        }

        self.inner.store.remove_many(&keys::AUTH_SCOPE)?;
        self.inner.state_tx.send_replace(SessionState::SignedOut);
        tracing::info!("Logged out");
        Ok(())
    }

    /// Whether the initial load attempt has completed.
    pub fn is_ready(&self) -> bool {
        self.inner.ready.load(Ordering::SeqCst)
    }

    /// The current session, if signed in.
    pub fn current_session(&self) -> Option<Session> {
        match &*self.inner.state_tx.borrow() {
            SessionState::SignedIn(session) => Some(session.clone()),
            _ => None,
        }
    }

    /// Subscribe to session state changes. Dropping the receiver is the
    /// disposer.
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.inner.state_tx.subscribe()
    }

    /// The capability handed to the sync engine for the one sanctioned
    /// cross-boundary write.
    pub fn invalidator(&self) -> SessionInvalidator {
        SessionInvalidator {
            inner: self.inner.clone(),
        }
    }
}

/// Narrow capability to tear down the session on authentication failure.
///
/// Injected into the sync engine so session expiry is an explicit
/// dependency rather than ambient global mutation.
#[derive(Clone)]
pub struct SessionInvalidator {
    inner: Arc<ControllerInner>,
}

impl SessionInvalidator {
    /// Wipe all durable auth artifacts (token, user, cached events, sync
    /// timestamp) as one set and force the UI back to an unauthenticated
    /// state. Completes before returning; idempotent.
    pub fn expire(&self) {
        self.inner.wipe("auth_expired");
    }
}
