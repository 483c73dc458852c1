// SPDX-License-Identifier: MIT
// Copyright 2026 Fabula Authors

//! Fabula client sync core.
//!
//! This crate is the session and offline-cache synchronization core of
//! the Fabula story-generation client: session persistence and lifecycle,
//! push-token registration tied to session validity, and a read-through
//! cache of the remote calendar event collection with TTL metadata,
//! optimistic toggles, and authentication-failure recovery.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod time_utils;

pub use error::{CoreError, Result};
