// SPDX-License-Identifier: MIT
// Copyright 2026 Fabula Authors

//! Shared fixtures for the integration tests.

use chrono::{DateTime, Utc};
use fabula_client::api::ApiClient;
use fabula_client::models::{CachedEvent, Session};
use fabula_client::services::{
    AuthGrant, Authenticator, DeviceHandleSource, EventCache, LoginCredentials, PushRegistrar,
    SessionController, SessionStore, SyncEngine, UnsupportedPlatform,
};
use fabula_client::store::{keys, LocalStore};
use fabula_client::Result;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::MockServer;

/// A fully wired core against a mock backend and a temp store.
#[allow(dead_code)]
pub struct TestHarness {
    /// Keeps the store directory alive for the test's duration
    pub dir: TempDir,
    pub store: Arc<LocalStore>,
    pub api: Arc<ApiClient>,
    pub controller: SessionController,
    pub engine: Arc<SyncEngine>,
    pub server: MockServer,
}

/// Build a harness with explicit push and auth collaborators.
#[allow(dead_code)]
pub async fn harness_with(
    source: Arc<dyn DeviceHandleSource>,
    authenticator: Arc<dyn Authenticator>,
) -> TestHarness {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("temp dir");
    let store = Arc::new(LocalStore::open(dir.path()));
    let api = Arc::new(ApiClient::new(server.uri()));

    let registrar = PushRegistrar::new(api.clone(), source);
    let controller = SessionController::new(store.clone(), api.clone(), authenticator, registrar);
    let engine = Arc::new(SyncEngine::new(
        api.clone(),
        SessionStore::new(store.clone()),
        EventCache::new(store.clone()),
        controller.invalidator(),
    ));

    TestHarness {
        dir,
        store,
        api,
        controller,
        engine,
        server,
    }
}

/// Default harness: no push capability, static authenticator.
#[allow(dead_code)]
pub async fn harness() -> TestHarness {
    harness_with(Arc::new(UnsupportedPlatform), static_auth("tok-static")).await
}

/// Authenticator returning a fixed grant.
pub struct StaticAuthenticator {
    grant: AuthGrant,
}

#[async_trait::async_trait]
impl Authenticator for StaticAuthenticator {
    async fn authenticate(&self, _credentials: &LoginCredentials) -> Result<AuthGrant> {
        Ok(self.grant.clone())
    }
}

#[allow(dead_code)]
pub fn static_auth(token: &str) -> Arc<StaticAuthenticator> {
    Arc::new(StaticAuthenticator {
        grant: AuthGrant {
            user_id: "user-1".to_string(),
            display_name: "Test User".to_string(),
            email: Some("test@example.com".to_string()),
            token: token.to_string(),
        },
    })
}

/// Persist a session directly, as if a previous run had signed in.
#[allow(dead_code)]
pub fn seed_session(store: &Arc<LocalStore>, token: &str) -> Session {
    let session = Session {
        user_id: "user-1".to_string(),
        display_name: "Test User".to_string(),
        email: Some("test@example.com".to_string()),
        token: token.to_string(),
        issued_at: Utc::now(),
    };
    SessionStore::new(store.clone())
        .save(&session)
        .expect("seed session");
    session
}

/// Seed the event cache with a controlled last-sync timestamp.
#[allow(dead_code)]
pub fn seed_cache(store: &Arc<LocalStore>, events: &[CachedEvent], last_sync: DateTime<Utc>) {
    store
        .set_many(&[
            (
                keys::CALENDAR_EVENTS,
                serde_json::to_value(events).expect("events"),
            ),
            (
                keys::CALENDAR_LAST_SYNC,
                serde_json::to_value(last_sync).expect("timestamp"),
            ),
        ])
        .expect("seed cache");
}

#[allow(dead_code)]
pub fn event(id: &str, start_time: DateTime<Utc>, active: bool) -> CachedEvent {
    CachedEvent {
        id: id.to_string(),
        summary: format!("event {id}"),
        description: None,
        start_time,
        active,
    }
}

/// Wire-format body for `GET /calendar/events`.
#[allow(dead_code)]
pub fn events_body(events: &[CachedEvent]) -> serde_json::Value {
    serde_json::json!({ "events": events })
}

/// Wire-format body for the toggle endpoint.
#[allow(dead_code)]
pub fn toggle_body(event: &CachedEvent) -> serde_json::Value {
    serde_json::json!({ "event": event })
}
