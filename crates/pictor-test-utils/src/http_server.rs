#![forbid(unsafe_code)]

//! Shared async HTTP test server helpers.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use axum::{http::header, routing::get, Router};
use tokio::net::TcpListener;
use url::Url;

/// Counter shared with a router built by [`fixed_routes`]; increments on
/// every request any fixed route serves.
pub type HitCounter = Arc<AtomicUsize>;

/// Build a router serving fixed bodies, plus a hit counter.
///
/// Each entry is `(path, content_type, body)`. Useful for image/static
/// fixtures where tests only care about bytes served and request counts.
pub fn fixed_routes(entries: &[(&str, &str, &[u8])]) -> (Router, HitCounter) {
    let hits: HitCounter = Arc::new(AtomicUsize::new(0));
    let mut router = Router::new();
    for (path, content_type, body) in entries {
        let content_type = content_type.to_string();
        let body = body.to_vec();
        let hits = Arc::clone(&hits);
        router = router.route(
            path,
            get(move || {
                let content_type = content_type.clone();
                let body = body.clone();
                let hits = Arc::clone(&hits);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    ([(header::CONTENT_TYPE, content_type)], body)
                }
            }),
        );
    }
    (router, hits)
}

/// Lightweight HTTP test server wrapper.
pub struct TestHttpServer {
    base_url: Url,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestHttpServer {
    /// Spawn `router` on a random localhost port.
    ///
    /// # Panics
    ///
    /// Panics if listener bind or URL parsing fails.
    pub async fn new(router: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test HTTP listener");
        let addr = listener
            .local_addr()
            .expect("read test listener local addr");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server = axum::serve(listener, router).with_graceful_shutdown(async {
            shutdown_rx.await.ok();
        });

        tokio::spawn(async move {
            server.await.expect("run test HTTP server");
        });

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        Self {
            base_url: Url::parse(&format!("http://{}", addr)).expect("parse base URL"),
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Join path to server base URL.
    ///
    /// # Panics
    ///
    /// Panics if URL join fails.
    #[must_use]
    pub fn url(&self, path: &str) -> Url {
        self.base_url.join(path).expect("join server URL path")
    }

    /// Base URL of this server.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl Drop for TestHttpServer {
    fn drop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
    }
}
