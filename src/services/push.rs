// SPDX-License-Identifier: MIT
// Copyright 2026 Fabula Authors

//! Push notification registration.
//!
//! A device handle exists only while a session does, is re-derived each
//! time the session becomes active, and is never persisted durably.
//! Registration failure is logged and never affects session validity.

use crate::api::ApiClient;
use crate::error::{CoreError, Result};
use crate::models::{PushRegistration, Session};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

/// Platform seam for obtaining a push handle.
///
/// Implementations query permission state before requesting a handle so
/// the user is never re-prompted. A platform without push support, or
/// with permission denied, yields `Ok(None)`; only genuinely unexpected
/// platform errors are reported as failures.
#[async_trait]
pub trait DeviceHandleSource: Send + Sync {
    async fn device_handle(&self) -> Result<Option<String>>;
}

/// Handle injected through configuration (the desktop/CI analog of a
/// granted platform permission).
pub struct EnvHandleSource {
    handle: Option<String>,
}

impl EnvHandleSource {
    pub fn new(handle: Option<String>) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl DeviceHandleSource for EnvHandleSource {
    async fn device_handle(&self) -> Result<Option<String>> {
        Ok(self.handle.clone())
    }
}

/// Source for platforms with no push capability at all.
pub struct UnsupportedPlatform;

#[async_trait]
impl DeviceHandleSource for UnsupportedPlatform {
    async fn device_handle(&self) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Registers this device's push handle with the backend.
#[derive(Clone)]
pub struct PushRegistrar {
    api: Arc<ApiClient>,
    source: Arc<dyn DeviceHandleSource>,
}

impl PushRegistrar {
    pub fn new(api: Arc<ApiClient>, source: Arc<dyn DeviceHandleSource>) -> Self {
        Self { api, source }
    }

    /// Obtain the platform push handle, if one is available.
    pub async fn obtain_device_handle(&self) -> Result<Option<String>> {
        self.source.device_handle().await
    }

    /// Report a handle to the backend under the session's bearer token.
    ///
    /// Safe to call repeatedly with the same handle (upsert server-side).
    /// Never touches the session store.
    pub async fn register(&self, handle: &str, session: &Session) -> Result<PushRegistration> {
        self.api
            .register_push_token(&session.token, handle)
            .await
            .map_err(|e| CoreError::Registration(e.to_string()))?;

        Ok(PushRegistration {
            device_handle: handle.to_string(),
            registered_at: Utc::now(),
        })
    }

    /// Best-effort activation for a freshly active session.
    ///
    /// Every failure path is logged and swallowed; the session stays
    /// valid regardless of what happens here.
    pub async fn activate_for(&self, session: &Session) -> Option<PushRegistration> {
        let handle = match self.obtain_device_handle().await {
            Ok(Some(handle)) => handle,
            Ok(None) => {
                tracing::debug!("No push handle available on this platform");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to obtain push handle, continuing anyway");
                return None;
            }
        };

        match self.register(&handle, session).await {
            Ok(registration) => {
                tracing::info!(user_id = %session.user_id, "Push handle registered");
                Some(registration)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Push registration failed, continuing anyway");
                None
            }
        }
    }
}
