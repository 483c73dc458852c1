// SPDX-License-Identifier: MIT
// Copyright 2026 Fabula Authors

//! Fabula sync driver
//!
//! A thin command-line stand-in for the UI layer: it wires the sync core
//! together, recovers or establishes a session, runs one sync cycle, and
//! prints the partitioned event list.
//!
//! Commands: `sync` (default), `refresh`, `toggle <event-id>`, `logout`.

use fabula_client::{
    api::ApiClient,
    config::Config,
    services::{
        EnvHandleSource, EventCache, HttpAuthenticator, LoginCredentials, PushRegistrar,
        SessionController, SessionStore, SyncEngine,
    },
    store::LocalStore,
    time_utils::format_utc_rfc3339,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::from_env()?;
    tracing::info!(api = %config.api_base_url, "Starting Fabula sync driver");

    let store = Arc::new(LocalStore::open(&config.data_dir));
    let api = Arc::new(ApiClient::new(config.api_base_url.clone()));

    let registrar = PushRegistrar::new(
        api.clone(),
        Arc::new(EnvHandleSource::new(config.push_handle.clone())),
    );
    let authenticator = Arc::new(HttpAuthenticator::new(api.clone()));
    let controller = SessionController::new(store.clone(), api.clone(), authenticator, registrar);

    let engine = SyncEngine::new(
        api.clone(),
        SessionStore::new(store.clone()),
        EventCache::new(store.clone()),
        controller.invalidator(),
    );

    controller.bootstrap().await;

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_else(|| "sync".to_string());

    if command == "logout" {
        controller.logout().await?;
        println!("Signed out.");
        return Ok(());
    }

    if controller.current_session().is_none() {
        let (Ok(email), Ok(password)) = (
            std::env::var("FABULA_EMAIL"),
            std::env::var("FABULA_PASSWORD"),
        ) else {
            eprintln!("No session. Set FABULA_EMAIL and FABULA_PASSWORD to sign in.");
            std::process::exit(1);
        };
        let session = controller
            .login(&LoginCredentials { email, password })
            .await?;
        println!("Signed in as {}.", session.display_name);
    }

    match command.as_str() {
        "sync" => {
            if let Err(e) = engine.load().await {
                tracing::warn!(error = %e, "Sync finished with an error");
            }
        }
        "refresh" => {
            if let Err(e) = engine.refresh().await {
                tracing::warn!(error = %e, "Refresh finished with an error");
            }
        }
        "toggle" => {
            let id = args.next().ok_or("usage: fabula-client toggle <event-id>")?;
            let event = engine.toggle_event(&id).await?;
            println!(
                "Event {} is now {}.",
                event.id,
                if event.active { "active" } else { "inactive" }
            );
            return Ok(());
        }
        other => {
            eprintln!("Unknown command: {other}");
            std::process::exit(2);
        }
    }

    print_snapshot(&engine);
    Ok(())
}

fn print_snapshot(engine: &SyncEngine) {
    let snapshot = engine.snapshot();

    println!(
        "State: {:?}{}",
        snapshot.state,
        if snapshot.stale { " (stale cache)" } else { "" }
    );
    println!("Current events:");
    for event in &snapshot.current {
        println!(
            "  [{}] {} @ {} ({})",
            if event.active { "x" } else { " " },
            event.summary,
            format_utc_rfc3339(event.start_time),
            event.id
        );
    }
    println!("Past events:");
    for event in &snapshot.past {
        println!(
            "      {} @ {} ({})",
            event.summary,
            format_utc_rfc3339(event.start_time),
            event.id
        );
    }
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fabula_client=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
