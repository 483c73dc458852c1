//! Durable local storage layer.

pub mod local;

pub use local::LocalStore;

/// Durable key names as constants.
pub mod keys {
    /// Bearer token for the current session
    pub const TOKEN: &str = "token";
    /// Persisted user identity record
    pub const USER: &str = "user";
    /// Cached calendar event collection
    pub const CALENDAR_EVENTS: &str = "calendar_events";
    /// Timestamp of the last successful event sync
    pub const CALENDAR_LAST_SYNC: &str = "calendar_last_sync";

    /// Everything a sign-out or session expiry clears, as one set.
    pub const AUTH_SCOPE: [&str; 4] = [TOKEN, USER, CALENDAR_EVENTS, CALENDAR_LAST_SYNC];
}
