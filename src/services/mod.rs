// SPDX-License-Identifier: MIT
// Copyright 2026 Fabula Authors

//! Services module - the sync core's business logic.

pub mod cache;
pub mod controller;
pub mod push;
pub mod session;
pub mod sync;

pub use cache::{default_ttl, is_valid, EventCache, CACHE_TTL_SECS};
pub use controller::{
    AuthGrant, Authenticator, HttpAuthenticator, LoginCredentials, SessionController,
    SessionInvalidator, SessionState,
};
pub use push::{DeviceHandleSource, EnvHandleSource, PushRegistrar, UnsupportedPlatform};
pub use session::SessionStore;
pub use sync::{EventsSnapshot, SyncEngine, SyncErrorKind, SyncState};
