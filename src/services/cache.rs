// SPDX-License-Identifier: MIT
// Copyright 2026 Fabula Authors

//! Durable cache of the remote event collection.
//!
//! The collection and its last-sync timestamp are written together on
//! every successful fetch and cleared together on invalidation. A single
//! event's `active` flag can be patched independently without touching
//! the timestamp.

use crate::error::{CoreError, Result};
use crate::models::{CacheMeta, CachedEvent};
use crate::store::{keys, LocalStore};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Cache time-to-live: 7 days.
pub const CACHE_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// The default TTL as a chrono duration.
pub fn default_ttl() -> Duration {
    Duration::seconds(CACHE_TTL_SECS)
}

/// Whether cached data is still fresh for display-before-revalidation.
///
/// Pure function of the metadata and the clock; staleness never gates
/// whether a revalidating fetch happens.
pub fn is_valid(meta: &CacheMeta, now: DateTime<Utc>, ttl: Duration) -> bool {
    now - meta.last_sync < ttl
}

/// Typed event-collection persistence over the local store.
#[derive(Clone)]
pub struct EventCache {
    store: Arc<LocalStore>,
}

impl EventCache {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }

    /// Read the cached collection and its metadata.
    ///
    /// Returns `None` unless both the collection and the sync timestamp
    /// are present and parse; a corrupt cache is cleared and treated as
    /// absent.
    pub fn read(&self) -> Option<(Vec<CachedEvent>, CacheMeta)> {
        let events = self.store.get::<Vec<CachedEvent>>(keys::CALENDAR_EVENTS);
        let last_sync = self.store.get::<DateTime<Utc>>(keys::CALENDAR_LAST_SYNC);

        match (events, last_sync) {
            (Ok(Some(events)), Ok(Some(last_sync))) => Some((events, CacheMeta { last_sync })),
            (Ok(None), Ok(None)) => None,
            _ => {
                tracing::warn!("Corrupt or partial event cache, clearing");
                if let Err(e) = self.invalidate() {
                    tracing::error!(error = %e, "Failed to clear corrupt event cache");
                }
                None
            }
        }
    }

    /// Replace the full collection and stamp the sync timestamp.
    pub fn write(&self, events: &[CachedEvent]) -> Result<CacheMeta> {
        let meta = CacheMeta {
            last_sync: Utc::now(),
        };
        self.store.set_many(&[
            (
                keys::CALENDAR_EVENTS,
                serde_json::to_value(events).map_err(|e| CoreError::Storage(e.to_string()))?,
            ),
            (
                keys::CALENDAR_LAST_SYNC,
                serde_json::to_value(meta.last_sync)
                    .map_err(|e| CoreError::Storage(e.to_string()))?,
            ),
        ])?;
        Ok(meta)
    }

    /// Patch a single event's `active` flag in place.
    ///
    /// A missing id is a silent no-op; the sync timestamp is never
    /// touched by this path.
    pub fn patch_active(&self, event_id: &str, active: bool) -> Result<()> {
        let Some((mut events, _meta)) = self.read() else {
            return Ok(());
        };
        let Some(event) = events.iter_mut().find(|e| e.id == event_id) else {
            return Ok(());
        };
        event.active = active;
        self.store.set(keys::CALENDAR_EVENTS, &events)
    }

    /// Clear the collection and metadata together. Idempotent.
    pub fn invalidate(&self) -> Result<()> {
        self.store
            .remove_many(&[keys::CALENDAR_EVENTS, keys::CALENDAR_LAST_SYNC])
    }
}
