// SPDX-License-Identifier: MIT
// Copyright 2026 Fabula Authors

//! The event synchronization engine.
//!
//! Read-through-then-revalidate: cached events are published immediately
//! on load regardless of age, then a reconcile fetch always runs.
//! Staleness controls only whether the pre-fetch snapshot is flagged
//! stale, never whether the network call happens.
//!
//! Failure policy:
//! - 401 / 400+`invalid_grant` → session and cache wiped once, UI forced
//!   back to sign-in;
//! - malformed body → empty collection published with an error state
//!   (stale data is not silently displayed as valid);
//! - anything else → error published, cached collection retained, retry
//!   left to an explicit trigger.

use crate::api::ApiClient;
use crate::error::{CoreError, Result};
use crate::models::{partition_events, CachedEvent};
use crate::services::cache::{default_ttl, is_valid, EventCache};
use crate::services::controller::SessionInvalidator;
use crate::services::session::SessionStore;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

/// Where the engine is in its cycle, as seen by subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    /// Nothing has happened yet
    Idle,
    /// A reconcile fetch is in flight; any events shown come from cache
    Fetching,
    /// Events reflect the latest successful server response
    Synced,
    /// The session was torn down; the UI must return to sign-in
    AuthExpired,
    /// The last fetch failed
    Error(SyncErrorKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncErrorKind {
    Network,
    MalformedResponse,
}

/// What subscribers receive on every publish.
#[derive(Debug, Clone)]
pub struct EventsSnapshot {
    /// Events at or after the history cutoff, ascending
    pub current: Vec<CachedEvent>,
    /// Events before the cutoff, ascending
    pub past: Vec<CachedEvent>,
    /// True when the shown events come from a cache older than the TTL
    pub stale: bool,
    pub state: SyncState,
}

impl Default for EventsSnapshot {
    fn default() -> Self {
        Self {
            current: Vec::new(),
            past: Vec::new(),
            stale: false,
            state: SyncState::Idle,
        }
    }
}

/// Orchestrates cache reads, server fetches, and auth-failure teardown.
///
/// The engine is the only writer of the event cache. At most one fetch is
/// in flight at a time; triggers arriving during a fetch coalesce into it.
pub struct SyncEngine {
    api: Arc<ApiClient>,
    sessions: SessionStore,
    cache: EventCache,
    invalidator: SessionInvalidator,
    fetch_gate: Mutex<()>,
    tx: watch::Sender<EventsSnapshot>,
}

impl SyncEngine {
    pub fn new(
        api: Arc<ApiClient>,
        sessions: SessionStore,
        cache: EventCache,
        invalidator: SessionInvalidator,
    ) -> Self {
        Self {
            api,
            sessions,
            cache,
            invalidator,
            fetch_gate: Mutex::new(()),
            tx: watch::Sender::new(EventsSnapshot::default()),
        }
    }

    /// Subscribe to published snapshots. Dropping the receiver is the
    /// disposer.
    pub fn subscribe(&self) -> watch::Receiver<EventsSnapshot> {
        self.tx.subscribe()
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> EventsSnapshot {
        self.tx.borrow().clone()
    }

    /// Initial-load / focus-regain trigger.
    ///
    /// Publishes the cached collection immediately (regardless of TTL) so
    /// the UI never blocks on the network, then reconciles with the
    /// server unconditionally.
    pub async fn load(&self) -> Result<()> {
        match self.cache.read() {
            Some((events, meta)) => {
                let stale = !is_valid(&meta, Utc::now(), default_ttl());
                self.publish(&events, stale, SyncState::Fetching);
            }
            None => {
                self.publish(&[], false, SyncState::Fetching);
            }
        }

        self.fetch().await
    }

    /// Explicit-refresh trigger (pull-to-refresh, forced cache-bust).
    ///
    /// Clears the cache first, then fetches unconditionally. The publish
    /// buffer keeps showing the previous events while the fetch runs.
    pub async fn refresh(&self) -> Result<()> {
        self.cache.invalidate()?;
        self.tx
            .send_modify(|snapshot| snapshot.state = SyncState::Fetching);
        self.fetch().await
    }

    /// Toggle a single event's `active` flag.
    ///
    /// An independent, narrower write path: one authenticated PATCH, then
    /// a cache patch plus a publish-buffer update. Never triggers a full
    /// collection refresh; a failed PATCH mutates nothing.
    pub async fn toggle_event(&self, event_id: &str) -> Result<CachedEvent> {
        let Some(token) = self.sessions.token() else {
            self.expire_session();
            return Err(CoreError::AuthMissing);
        };

        match self.api.toggle_event(&token, event_id).await {
            Ok(event) => {
                self.cache.patch_active(event_id, event.active)?;
                if let Some((events, meta)) = self.cache.read() {
                    let stale = !is_valid(&meta, Utc::now(), default_ttl());
                    let state = self.tx.borrow().state.clone();
                    self.publish(&events, stale, state);
                }
                tracing::debug!(event_id, active = event.active, "Event toggled");
                Ok(event)
            }
            Err(CoreError::AuthExpired) => {
                self.expire_session();
                Err(CoreError::AuthExpired)
            }
            Err(e) => Err(e),
        }
    }

    /// The FETCHING path shared by load and refresh.
    async fn fetch(&self) -> Result<()> {
        // Coalesce: a trigger arriving while a fetch is in flight relies
        // on that fetch's eventual publish instead of racing a second
        // network call and cache write.
        let Ok(_guard) = self.fetch_gate.try_lock() else {
            tracing::debug!("Fetch already in flight, coalescing trigger");
            return Ok(());
        };

        // A missing token fails fast, without a network round-trip.
        let Some(token) = self.sessions.token() else {
            self.expire_session();
            return Err(CoreError::AuthMissing);
        };

        match self.api.events(&token).await {
            Ok(events) => {
                self.cache.write(&events)?;
                self.publish(&events, false, SyncState::Synced);
                tracing::info!(count = events.len(), "Event collection synced");
                Ok(())
            }
            Err(CoreError::AuthExpired) => {
                // The wipe completes while we still hold the fetch gate,
                // so no later fetch can start against the stale token.
                self.expire_session();
                Err(CoreError::AuthExpired)
            }
            Err(CoreError::MalformedResponse(msg)) => {
                tracing::warn!(error = %msg, "Event fetch returned malformed body");
                self.publish(
                    &[],
                    false,
                    SyncState::Error(SyncErrorKind::MalformedResponse),
                );
                Err(CoreError::MalformedResponse(msg))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Event fetch failed, retaining cached collection");
                match self.cache.read() {
                    Some((events, meta)) => {
                        let stale = !is_valid(&meta, Utc::now(), default_ttl());
                        self.publish(&events, stale, SyncState::Error(SyncErrorKind::Network));
                    }
                    None => {
                        self.publish(&[], false, SyncState::Error(SyncErrorKind::Network));
                    }
                }
                Err(e)
            }
        }
    }

    /// Session teardown on authentication failure: one wipe of all four
    /// durable keys, then an unauthenticated publish.
    fn expire_session(&self) {
        self.invalidator.expire();
        self.publish(&[], false, SyncState::AuthExpired);
    }

    /// Recompute the presentation partition and publish.
    fn publish(&self, events: &[CachedEvent], stale: bool, state: SyncState) {
        let parts = partition_events(events, Utc::now());
        self.tx.send_replace(EventsSnapshot {
            current: parts.current,
            past: parts.past,
            stale,
            state,
        });
    }
}
