#![forbid(unsafe_code)]

//! End-to-end delivery worker scenarios: lifecycle, per-class caching
//! disciplines, and the page-facing message channel.

use std::sync::Arc;

use pictor_cache::{
    DeliveryWorker, FetchOutcome, MemoryStore, PartitionStore, WorkerManifest, WorkerMessage,
    WorkerState,
};
use pictor_events::{CacheEvent, EventBus};
use pictor_net::{HttpClient, NetOptions, StaticNet};
use pictor_test_utils::{fixed_routes, TestHttpServer};
use url::Url;

struct Harness {
    net: StaticNet,
    store: Arc<MemoryStore>,
    events: EventBus,
}

impl Harness {
    fn new() -> Self {
        let net = StaticNet::new();
        net.insert_with_type("https://site.example/", &b"<html>"[..], "text/html");
        net.insert_with_type(
            "https://site.example/styles/main.css",
            &b"body{}"[..],
            "text/css",
        );
        net.insert_with_type(
            "https://site.example/api/books",
            &br#"[{"title":"one"}]"#[..],
            "application/json",
        );
        net.insert_with_type(
            "https://img.example/acct/upload/w_300/cover.jpg",
            &b"jpeg-bytes"[..],
            "image/jpeg",
        );
        Self {
            net,
            store: Arc::new(MemoryStore::new()),
            events: EventBus::new(64),
        }
    }

    fn spawn(&self, manifest: WorkerManifest) -> pictor_cache::WorkerHandle {
        DeliveryWorker::spawn(
            manifest,
            self.store.clone(),
            Arc::new(self.net.clone()),
            self.events.clone(),
        )
        .unwrap()
    }
}

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

#[tokio::test]
async fn precached_static_assets_survive_going_offline() {
    let harness = Harness::new();
    let handle = harness.spawn(
        WorkerManifest::new("1").with_static_precache(vec![
            "https://site.example/".to_string(),
            "https://site.example/styles/main.css".to_string(),
        ]),
    );
    handle.wait_for_state(WorkerState::Waiting).await.unwrap();
    handle.activate().await.unwrap();

    harness.net.set_offline(true);
    let resp = handle
        .fetch("GET", url("https://site.example/styles/main.css"))
        .await
        .unwrap()
        .into_handled()
        .unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(&resp.body[..], b"body{}");
}

#[tokio::test]
async fn data_requests_prefer_network_and_fall_back_when_offline() {
    let harness = Harness::new();
    let handle = harness.spawn(WorkerManifest::new("1"));
    handle.activate().await.unwrap();

    let api = url("https://site.example/api/books");
    let fresh = handle
        .fetch("GET", api.clone())
        .await
        .unwrap()
        .into_handled()
        .unwrap();
    assert!(fresh.is_success());

    // The endpoint now answers differently; online requests see the new
    // body, offline requests get the cached fallback.
    harness
        .net
        .insert_with_type("https://site.example/api/books", &b"[]"[..], "application/json");
    let updated = handle
        .fetch("GET", api.clone())
        .await
        .unwrap()
        .into_handled()
        .unwrap();
    assert_eq!(&updated.body[..], b"[]");

    harness.net.set_offline(true);
    let stale = handle
        .fetch("GET", api)
        .await
        .unwrap()
        .into_handled()
        .unwrap();
    assert_eq!(&stale.body[..], b"[]");
}

#[tokio::test]
async fn uncached_request_while_offline_is_service_unavailable() {
    let harness = Harness::new();
    let handle = harness.spawn(WorkerManifest::new("1"));
    handle.activate().await.unwrap();

    harness.net.set_offline(true);
    let resp = handle
        .fetch("GET", url("https://site.example/never-seen.css"))
        .await
        .unwrap()
        .into_handled()
        .unwrap();
    assert_eq!(resp.status, 503);
}

#[tokio::test]
async fn activation_purges_partitions_from_older_generations() {
    let harness = Harness::new();
    // Leftovers from a previous build.
    harness.store.put(
        "static-v1",
        "https://site.example/old.css",
        pictor_cache::CachedResponse {
            status: 200,
            content_type: None,
            body: bytes::Bytes::from_static(b"old"),
        },
    );
    let mut cache_events = harness.events.subscribe_cache();

    let handle = harness.spawn(WorkerManifest::new("2"));
    handle.wait_for_state(WorkerState::Waiting).await.unwrap();
    assert_eq!(harness.store.entry_count("static-v1"), 1);

    handle.activate().await.unwrap();
    assert_eq!(harness.store.entry_count("static-v1"), 0);

    // Both events were published before the activate reply, in order.
    assert_eq!(
        cache_events.recv().await,
        Some(CacheEvent::PartitionPurged {
            partition: "static-v1".to_string()
        })
    );
    assert_eq!(
        cache_events.recv().await,
        Some(CacheEvent::Activated {
            version: "2".to_string()
        })
    );

    // New generation fills its own partition.
    let css = url("https://site.example/styles/main.css");
    handle.fetch("GET", css).await.unwrap();
    assert_eq!(harness.store.entry_count("static-v2"), 1);
}

#[tokio::test]
async fn skip_waiting_message_activates_a_waiting_worker() {
    let harness = Harness::new();
    let handle = harness.spawn(WorkerManifest::new("1"));
    handle.wait_for_state(WorkerState::Waiting).await.unwrap();

    handle
        .post_message_json(r#"{"type":"SKIP_WAITING"}"#)
        .await
        .unwrap();
    handle.wait_for_state(WorkerState::Active).await.unwrap();
}

#[tokio::test]
async fn cache_images_message_warms_the_image_partition() {
    let harness = Harness::new();
    let handle = harness.spawn(WorkerManifest::new("1"));
    handle.activate().await.unwrap();

    handle
        .post_message(WorkerMessage::CacheImages {
            urls: vec![
                "https://img.example/acct/upload/w_300/cover.jpg".to_string(),
                "https://img.example/acct/upload/missing.jpg".to_string(),
            ],
        })
        .await
        .unwrap();
    // Commands are processed in order; once this fetch answers, warming
    // has finished. A failed warm URL is skipped, not fatal.
    handle
        .fetch("GET", url("https://site.example/"))
        .await
        .unwrap();
    assert_eq!(harness.store.entry_count("image-v1"), 1);

    harness.net.set_offline(true);
    let resp = handle
        .fetch("GET", url("https://img.example/acct/upload/w_300/cover.jpg"))
        .await
        .unwrap()
        .into_handled()
        .unwrap();
    assert_eq!(&resp.body[..], b"jpeg-bytes");
}

#[tokio::test]
async fn requests_before_activation_are_not_intercepted() {
    let harness = Harness::new();
    let handle = harness.spawn(WorkerManifest::new("1"));
    handle.wait_for_state(WorkerState::Waiting).await.unwrap();

    let outcome = handle
        .fetch("GET", url("https://site.example/styles/main.css"))
        .await
        .unwrap();
    assert_eq!(outcome, FetchOutcome::NotIntercepted);
    assert_eq!(harness.net.fetch_count(), 0);
    assert_eq!(harness.store.entry_count("static-v1"), 0);
}

#[tokio::test]
async fn non_get_requests_are_not_intercepted() {
    let harness = Harness::new();
    let handle = harness.spawn(WorkerManifest::new("1"));
    handle.activate().await.unwrap();

    // The worker must not re-issue the request as a GET on the caller's
    // behalf; declining hands it back with its method and body intact.
    let outcome = handle
        .fetch("POST", url("https://site.example/api/books"))
        .await
        .unwrap();
    assert_eq!(outcome, FetchOutcome::NotIntercepted);
    assert_eq!(harness.net.fetch_count(), 0);
    assert_eq!(harness.store.entry_count("data-v1"), 0);
}

#[tokio::test]
async fn invalid_manifest_is_rejected_at_spawn() {
    let harness = Harness::new();
    let result = DeliveryWorker::spawn(
        WorkerManifest::new(""),
        harness.store.clone(),
        Arc::new(harness.net.clone()),
        harness.events.clone(),
    );
    assert!(result.is_err());
}

#[tokio::test]
async fn static_requests_over_real_http_are_cached_once() {
    let (router, hits) = fixed_routes(&[("/styles/main.css", "text/css", b"body{}")]);
    let server = TestHttpServer::new(router).await;

    let store = Arc::new(MemoryStore::new());
    let handle = DeliveryWorker::spawn(
        WorkerManifest::new("1"),
        store.clone(),
        Arc::new(HttpClient::new(NetOptions::default())),
        EventBus::new(64),
    )
    .unwrap();
    handle.activate().await.unwrap();

    let css = server.url("/styles/main.css");
    for _ in 0..2 {
        let resp = handle
            .fetch("GET", css.clone())
            .await
            .unwrap()
            .into_handled()
            .unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(&resp.body[..], b"body{}");
    }

    // Cache-first: the second request never reaches the server.
    assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert_eq!(store.entry_count("static-v1"), 1);
}

#[tokio::test]
async fn shutdown_makes_the_handle_report_worker_gone() {
    let harness = Harness::new();
    let handle = harness.spawn(WorkerManifest::new("1"));
    handle.wait_for_state(WorkerState::Waiting).await.unwrap();

    handle.shutdown().await;
    let result = handle.fetch("GET", url("https://site.example/")).await;
    assert!(matches!(result, Err(pictor_cache::CacheError::WorkerGone)));
}
