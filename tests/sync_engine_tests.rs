// SPDX-License-Identifier: MIT
// Copyright 2026 Fabula Authors

//! Sync engine state-machine tests against a mock backend.

use chrono::{Duration, Utc};
use fabula_client::services::{EventCache, SessionState, SyncErrorKind, SyncState};
use fabula_client::store::keys;
use fabula_client::CoreError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

mod common;
use common::{event, events_body, harness, seed_cache, seed_session};

#[tokio::test]
async fn load_fetches_and_overwrites_cache() {
    let h = harness().await;
    seed_session(&h.store, "tok-1");
    seed_cache(
        &h.store,
        &[event("old", Utc::now() - Duration::days(2), true)],
        Utc::now() - Duration::hours(1),
    );

    let fresh = vec![
        event("a", Utc::now() + Duration::days(1), true),
        event("b", Utc::now() - Duration::days(5), false),
    ];
    Mock::given(method("GET"))
        .and(path("/calendar/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_body(&fresh)))
        .expect(1)
        .mount(&h.server)
        .await;

    h.engine.load().await.unwrap();

    let snapshot = h.engine.snapshot();
    assert_eq!(snapshot.state, SyncState::Synced);
    assert!(!snapshot.stale);
    assert_eq!(snapshot.current.len(), 1);
    assert_eq!(snapshot.current[0].id, "a");
    assert_eq!(snapshot.past.len(), 1);
    assert_eq!(snapshot.past[0].id, "b");

    let (cached, _meta) = EventCache::new(h.store.clone()).read().expect("cache written");
    assert_eq!(cached.len(), 2);
    assert!(cached.iter().all(|e| e.id != "old"));
}

#[tokio::test]
async fn stale_cache_is_published_and_fetch_still_issued() {
    // TTL exceeded by a wide margin: the cached item must still be
    // published before the fetch, and the fetch must still happen.
    let h = harness().await;
    seed_session(&h.store, "tok-1");
    let cached_event = event("stale-1", Utc::now() - Duration::days(3), true);
    seed_cache(&h.store, &[cached_event.clone()], Utc::now() - Duration::days(10));

    // The fetch itself fails, so whatever the snapshot shows afterward
    // can only have come from the cache.
    Mock::given(method("GET"))
        .and(path("/calendar/events"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.engine.load().await.unwrap_err();
    assert!(matches!(err, CoreError::Network(_)));

    let snapshot = h.engine.snapshot();
    assert_eq!(snapshot.state, SyncState::Error(SyncErrorKind::Network));
    assert!(snapshot.stale, "10-day-old cache must be flagged stale");
    assert_eq!(snapshot.past.len(), 1, "cached event must still be shown");
    assert_eq!(snapshot.past[0].id, "stale-1");
}

#[tokio::test]
async fn transient_error_retains_cached_collection() {
    let h = harness().await;
    seed_session(&h.store, "tok-1");
    let cached = vec![event("keep-me", Utc::now(), true)];
    seed_cache(&h.store, &cached, Utc::now() - Duration::hours(2));

    Mock::given(method("GET"))
        .and(path("/calendar/events"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.server)
        .await;

    let _ = h.engine.load().await;

    let (events, _meta) = EventCache::new(h.store.clone())
        .read()
        .expect("cache must survive a transient fetch error");
    assert_eq!(events, cached);
}

#[tokio::test]
async fn auth_expired_wipes_all_four_keys() {
    let h = harness().await;
    seed_session(&h.store, "tok-1");
    seed_cache(&h.store, &[event("a", Utc::now(), true)], Utc::now());
    h.controller.bootstrap().await;
    for key in keys::AUTH_SCOPE {
        assert!(h.store.contains(key), "seed should populate {key}");
    }

    Mock::given(method("GET"))
        .and(path("/calendar/events"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.engine.load().await.unwrap_err();
    assert!(matches!(err, CoreError::AuthExpired));

    for key in keys::AUTH_SCOPE {
        assert!(!h.store.contains(key), "{key} must be cleared on expiry");
    }
    assert_eq!(h.engine.snapshot().state, SyncState::AuthExpired);
    assert!(matches!(
        &*h.controller.watch().borrow(),
        SessionState::SignedOut
    ));
}

#[tokio::test]
async fn invalid_grant_on_400_is_auth_expired() {
    let h = harness().await;
    seed_session(&h.store, "tok-1");
    seed_cache(&h.store, &[event("a", Utc::now(), true)], Utc::now());

    Mock::given(method("GET"))
        .and(path("/calendar/events"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({ "error": "invalid_grant" })),
        )
        .mount(&h.server)
        .await;

    let err = h.engine.load().await.unwrap_err();
    assert!(matches!(err, CoreError::AuthExpired));
    for key in keys::AUTH_SCOPE {
        assert!(!h.store.contains(key));
    }
}

#[tokio::test]
async fn plain_400_is_a_transient_error() {
    let h = harness().await;
    seed_session(&h.store, "tok-1");

    Mock::given(method("GET"))
        .and(path("/calendar/events"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(serde_json::json!({ "error": "bad_request" })),
        )
        .mount(&h.server)
        .await;

    let err = h.engine.load().await.unwrap_err();
    assert!(matches!(err, CoreError::Network(_)));
    assert!(
        h.store.contains(keys::TOKEN),
        "a non-auth 400 must not tear down the session"
    );
}

#[tokio::test]
async fn malformed_body_publishes_empty_with_error_state() {
    let h = harness().await;
    seed_session(&h.store, "tok-1");
    seed_cache(&h.store, &[event("cached", Utc::now(), true)], Utc::now());

    // 2xx with the wrong shape: no `events` array.
    Mock::given(method("GET"))
        .and(path("/calendar/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "items": [] })))
        .mount(&h.server)
        .await;

    let err = h.engine.load().await.unwrap_err();
    assert!(matches!(err, CoreError::MalformedResponse(_)));

    let snapshot = h.engine.snapshot();
    assert_eq!(
        snapshot.state,
        SyncState::Error(SyncErrorKind::MalformedResponse)
    );
    assert!(
        snapshot.current.is_empty() && snapshot.past.is_empty(),
        "stale data must not be displayed as if valid"
    );
}

#[tokio::test]
async fn missing_token_fails_fast_without_network_call() {
    let h = harness().await;
    // No session seeded. The mock would answer, but must never be asked.
    Mock::given(method("GET"))
        .and(path("/calendar/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_body(&[])))
        .expect(0)
        .mount(&h.server)
        .await;

    let err = h.engine.load().await.unwrap_err();
    assert!(matches!(err, CoreError::AuthMissing));
    assert_eq!(h.engine.snapshot().state, SyncState::AuthExpired);
}

#[tokio::test]
async fn refresh_invalidates_before_fetching() {
    let h = harness().await;
    seed_session(&h.store, "tok-1");
    seed_cache(
        &h.store,
        &[event("old", Utc::now(), true)],
        Utc::now() - Duration::days(1),
    );

    let fresh = vec![event("new", Utc::now(), true)];
    Mock::given(method("GET"))
        .and(path("/calendar/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_body(&fresh)))
        .expect(1)
        .mount(&h.server)
        .await;

    h.engine.refresh().await.unwrap();

    let (events, _meta) = EventCache::new(h.store.clone()).read().unwrap();
    assert_eq!(events, fresh);
}

#[tokio::test]
async fn concurrent_triggers_coalesce_into_one_fetch() {
    let h = harness().await;
    seed_session(&h.store, "tok-1");

    Mock::given(method("GET"))
        .and(path("/calendar/events"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(events_body(&[event("a", Utc::now(), true)]))
                .set_delay(std::time::Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let engine = h.engine.clone();
    let first = tokio::spawn(async move { engine.load().await });

    // Give the first fetch time to take the gate, then trigger again.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    h.engine.load().await.unwrap();

    first.await.unwrap().unwrap();

    // expect(1) on the mock verifies a single request on drop.
    assert_eq!(h.engine.snapshot().state, SyncState::Synced);
}
