//! Session model: the authenticated user identity plus bearer token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated session.
///
/// A non-empty `token` always comes with a user identity; the two are
/// persisted and cleared together as a pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Backend user ID
    pub user_id: String,
    /// Display name shown in the UI
    pub display_name: String,
    /// Email address (may be withheld by the backend)
    pub email: Option<String>,
    /// Bearer token for authenticated API calls
    pub token: String,
    /// When this session was established
    pub issued_at: DateTime<Utc>,
}

/// Push registration derived from an active session.
///
/// Never persisted; re-derived each time the session becomes active.
#[derive(Debug, Clone, PartialEq)]
pub struct PushRegistration {
    /// Platform push handle reported to the backend
    pub device_handle: String,
    /// When the backend acknowledged the handle
    pub registered_at: DateTime<Utc>,
}
