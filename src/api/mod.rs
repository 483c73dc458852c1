//! HTTP boundary to the Fabula backend.

pub mod client;

pub use client::{ApiClient, LoginResponse};
