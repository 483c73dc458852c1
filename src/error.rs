// SPDX-License-Identifier: MIT
// Copyright 2026 Fabula Authors

//! Application error types shared across the sync core.

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The backend rejected our bearer token (401, or 400 with an
    /// `invalid_grant` body). Fatal to the current session, not the app.
    #[error("session expired")]
    AuthExpired,

    /// An authenticated call was attempted with no token present.
    /// Handled like [`CoreError::AuthExpired`] without a network round-trip.
    #[error("no session present")]
    AuthMissing,

    /// Connectivity failure, timeout, or a non-2xx status other than the
    /// authentication cases. Recoverable via explicit retry.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered 2xx but the body did not match the expected
    /// schema. Never trusted into the cache.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Local durable storage failure (I/O or serialization).
    #[error("storage error: {0}")]
    Storage(String),

    /// Push registration failure. Logged by the registrar, never fatal.
    #[error("push registration failed: {0}")]
    Registration(String),

    /// Login credentials failed local validation.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl CoreError {
    /// True for the failures that tear down the current session.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, CoreError::AuthExpired | CoreError::AuthMissing)
    }

    /// True for failures that leave cached data intact and are retried
    /// only by an explicit refresh trigger.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CoreError::Network(_) | CoreError::MalformedResponse(_)
        )
    }
}

/// Result type alias for the sync core.
pub type Result<T> = std::result::Result<T, CoreError>;
