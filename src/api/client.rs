// SPDX-License-Identifier: MIT
// Copyright 2026 Fabula Authors

//! Fabula backend API client.
//!
//! Handles:
//! - Event collection fetches
//! - Single-event toggle mutations
//! - Push token registration
//! - Login / logout
//! - Response classification (auth-expired vs transient vs malformed)

use crate::error::{CoreError, Result};
use crate::models::CachedEvent;
use serde::{Deserialize, Serialize};

/// Fabula API client.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client for the given base URL (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetch the full calendar event collection.
    pub async fn events(&self, access_token: &str) -> Result<Vec<CachedEvent>> {
        let url = format!("{}/calendar/events", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| CoreError::Network(e.to_string()))?;

        let body: EventsResponse = self.check_response_json(response).await?;
        Ok(body.events)
    }

    /// Toggle a single event's `active` flag, returning the updated event.
    pub async fn toggle_event(&self, access_token: &str, event_id: &str) -> Result<CachedEvent> {
        let url = format!(
            "{}/calendar/events/{}/toggle",
            self.base_url,
            urlencoding::encode(event_id)
        );
        let response = self
            .http
            .patch(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| CoreError::Network(e.to_string()))?;

        let body: ToggleResponse = self.check_response_json(response).await?;
        Ok(body.event)
    }

    /// Report this device's push handle to the backend.
    ///
    /// Safe to call repeatedly with the same handle (upsert server-side).
    pub async fn register_push_token(&self, access_token: &str, device_handle: &str) -> Result<()> {
        let url = format!("{}/user/fcm-token", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(&PushTokenRequest {
                fcm_token: device_handle,
            })
            .send()
            .await
            .map_err(|e| CoreError::Network(e.to_string()))?;

        self.check_response(response).await?;
        Ok(())
    }

    /// Notify the backend that this session is ending.
    pub async fn logout(&self, access_token: &str) -> Result<()> {
        let url = format!("{}/auth/logout", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| CoreError::Network(e.to_string()))?;

        self.check_response(response).await?;
        Ok(())
    }

    /// Exchange credentials for a user identity and bearer token.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let url = format!("{}/auth/login", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(|e| CoreError::Network(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Check response status, classifying authentication failures.
    async fn check_response(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();

        // Unauthorized - bearer token rejected
        if status.as_u16() == 401 {
            return Err(CoreError::AuthExpired);
        }

        // An expired upstream grant surfaces as 400 with invalid_grant in
        // the body; treated the same as a 401.
        if status.as_u16() == 400 && body.contains("invalid_grant") {
            return Err(CoreError::AuthExpired);
        }

        Err(CoreError::Network(format!("HTTP {}: {}", status, body)))
    }

    /// Check response and parse the JSON body against its schema.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let response = self.check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| CoreError::MalformedResponse(e.to_string()))
    }
}

/// Response schema for `GET /calendar/events`.
#[derive(Debug, Deserialize)]
struct EventsResponse {
    events: Vec<CachedEvent>,
}

/// Response schema for `PATCH /calendar/events/{id}/toggle`.
#[derive(Debug, Deserialize)]
struct ToggleResponse {
    event: CachedEvent,
}

/// Request schema for `POST /user/fcm-token`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PushTokenRequest<'a> {
    fcm_token: &'a str,
}

/// Request schema for `POST /auth/login`.
#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Response schema for `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub token: String,
}
