//! Cached calendar event model and the presentation partition.

use crate::time_utils::history_cutoff;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A calendar event as served by the backend and cached locally.
///
/// Field names mirror the wire format (camelCase). `active` is the only
/// field a client mutates locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedEvent {
    /// Backend event ID, unique within a collection
    pub id: String,
    /// One-line summary
    pub summary: String,
    /// Optional longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Scheduled start time
    pub start_time: DateTime<Utc>,
    /// Whether the event is enabled on this account
    pub active: bool,
}

/// Cache metadata persisted alongside the event collection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheMeta {
    /// When the collection was last written from a server response
    pub last_sync: DateTime<Utc>,
}

/// Events split for presentation into "current" and "past".
///
/// Derived on every publish, never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartitionedEvents {
    /// Events starting at or after the history cutoff, ascending
    pub current: Vec<CachedEvent>,
    /// Events before the cutoff, ascending
    pub past: Vec<CachedEvent>,
}

/// Partition a collection around `midnight(now) - 1 day`.
///
/// Every event lands in exactly one partition; each partition is sorted
/// by start time ascending.
pub fn partition_events(events: &[CachedEvent], now: DateTime<Utc>) -> PartitionedEvents {
    let cutoff = history_cutoff(now);
    let mut parts = PartitionedEvents::default();
    for event in events {
        if event.start_time >= cutoff {
            parts.current.push(event.clone());
        } else {
            parts.past.push(event.clone());
        }
    }
    parts.current.sort_by_key(|e| e.start_time);
    parts.past.sort_by_key(|e| e.start_time);
    parts
}
