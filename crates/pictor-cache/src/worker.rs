#![forbid(unsafe_code)]

use std::sync::Arc;

use pictor_events::{CacheEvent, EventBus};
use pictor_net::Net;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    classify::{classify, RequestClass},
    error::{CacheError, CacheResult},
    manifest::WorkerManifest,
    partition::{cache_key, CachedResponse, PartitionStore},
    policy::{CachePolicy, PolicyEngine},
};

/// Lifecycle phase of the delivery worker.
///
/// A freshly spawned worker pre-caches its manifest and then waits; it
/// only starts owning the cache partitions after activation, which is
/// when stale generations are purged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerState {
    Installing,
    Waiting,
    Active,
}

/// Message posted to a running worker from page code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WorkerMessage {
    /// Ask a waiting worker to activate immediately instead of waiting
    /// for the previous generation to wind down.
    #[serde(rename = "SKIP_WAITING")]
    SkipWaiting,
    /// Warm the image partition with the given URLs, best effort.
    #[serde(rename = "CACHE_IMAGES")]
    CacheImages { urls: Vec<String> },
}

/// Outcome of routing a request through the worker.
///
/// `NotIntercepted` means the worker declined the request (wrong method,
/// unknown shape, or not yet active) and the caller must perform it
/// itself, with its original method and body intact.
#[derive(Clone, Debug, PartialEq)]
pub enum FetchOutcome {
    Handled(CachedResponse),
    NotIntercepted,
}

impl FetchOutcome {
    /// The response, if the worker handled the request.
    #[must_use]
    pub fn into_handled(self) -> Option<CachedResponse> {
        match self {
            Self::Handled(response) => Some(response),
            Self::NotIntercepted => None,
        }
    }
}

enum Command {
    Fetch {
        method: String,
        url: Url,
        reply: oneshot::Sender<FetchOutcome>,
    },
    Message(WorkerMessage),
    Activate { reply: oneshot::Sender<()> },
    Shutdown,
}

/// Handle to a spawned [`DeliveryWorker`].
///
/// Cheap to clone; the worker task stops when it receives `Shutdown` or
/// when every handle is dropped.
#[derive(Clone)]
pub struct WorkerHandle {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<WorkerState>,
}

impl WorkerHandle {
    pub fn state(&self) -> WorkerState {
        *self.state.borrow()
    }

    /// Wait until the worker reaches the given state.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::WorkerGone`] if the worker stops first.
    pub async fn wait_for_state(&self, target: WorkerState) -> CacheResult<()> {
        let mut state = self.state.clone();
        state
            .wait_for(|current| *current == target)
            .await
            .map_err(|_| CacheError::WorkerGone)?;
        Ok(())
    }

    /// Offer a request to the worker.
    ///
    /// [`FetchOutcome::NotIntercepted`] means the caller must perform
    /// the request itself; the worker never re-issues non-GET requests
    /// on the caller's behalf.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::WorkerGone`] if the worker has stopped.
    pub async fn fetch(&self, method: &str, url: Url) -> CacheResult<FetchOutcome> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Fetch {
                method: method.to_string(),
                url,
                reply,
            })
            .await
            .map_err(|_| CacheError::WorkerGone)?;
        rx.await.map_err(|_| CacheError::WorkerGone)
    }

    /// # Errors
    ///
    /// Returns [`CacheError::WorkerGone`] if the worker has stopped.
    pub async fn post_message(&self, message: WorkerMessage) -> CacheResult<()> {
        self.commands
            .send(Command::Message(message))
            .await
            .map_err(|_| CacheError::WorkerGone)
    }

    /// Post a message in its JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Json`] for malformed payloads and
    /// [`CacheError::WorkerGone`] if the worker has stopped.
    pub async fn post_message_json(&self, payload: &str) -> CacheResult<()> {
        let message: WorkerMessage = serde_json::from_str(payload)?;
        self.post_message(message).await
    }

    /// Shorthand for posting [`WorkerMessage::SkipWaiting`].
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::WorkerGone`] if the worker has stopped.
    pub async fn skip_waiting(&self) -> CacheResult<()> {
        self.post_message(WorkerMessage::SkipWaiting).await
    }

    /// Activate the worker and wait for the purge of stale partitions to
    /// finish.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::WorkerGone`] if the worker has stopped.
    pub async fn activate(&self) -> CacheResult<()> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Activate { reply })
            .await
            .map_err(|_| CacheError::WorkerGone)?;
        rx.await.map_err(|_| CacheError::WorkerGone)
    }

    pub async fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown).await;
    }
}

/// Delivery cache worker: one task owning the partition store.
///
/// All requests funnel through its command channel, so partition purges
/// never race in-flight lookups.
pub struct DeliveryWorker<S: PartitionStore> {
    manifest: WorkerManifest,
    engine: PolicyEngine<S>,
    state_tx: watch::Sender<WorkerState>,
}

impl<S: PartitionStore> DeliveryWorker<S> {
    /// Spawn a worker for the given manifest.
    ///
    /// Pre-caching happens on the spawned task; the returned handle is
    /// usable immediately (requests before activation go straight to the
    /// network).
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidManifest`] for a bad manifest.
    pub fn spawn(
        manifest: WorkerManifest,
        store: Arc<S>,
        net: Arc<dyn Net>,
        events: EventBus,
    ) -> CacheResult<WorkerHandle> {
        manifest.validate()?;

        let (commands_tx, commands_rx) = mpsc::channel(32);
        let (state_tx, state_rx) = watch::channel(WorkerState::Installing);
        let worker = Self {
            manifest,
            engine: PolicyEngine { store, net, events },
            state_tx,
        };
        tokio::spawn(worker.run(commands_rx));

        Ok(WorkerHandle {
            commands: commands_tx,
            state: state_rx,
        })
    }

    async fn run(self, mut commands: mpsc::Receiver<Command>) {
        self.install().await;
        let _ = self.state_tx.send(WorkerState::Waiting);

        while let Some(command) = commands.recv().await {
            match command {
                Command::Fetch { method, url, reply } => {
                    let outcome = self.handle_fetch(&method, &url).await;
                    let _ = reply.send(outcome);
                }
                Command::Message(WorkerMessage::SkipWaiting) => {
                    self.activate();
                }
                Command::Message(WorkerMessage::CacheImages { urls }) => {
                    self.warm_images(&urls).await;
                }
                Command::Activate { reply } => {
                    self.activate();
                    let _ = reply.send(());
                }
                Command::Shutdown => break,
            }
        }
        debug!(version = %self.manifest.version, "delivery worker stopped");
    }

    /// Fetch every manifest URL into its partition. Failures are logged
    /// and skipped; a cold entry just means a miss on first request.
    async fn install(&self) {
        info!(
            version = %self.manifest.version,
            static_urls = self.manifest.static_precache.len(),
            data_urls = self.manifest.data_precache.len(),
            "installing delivery worker"
        );
        self.precache(&self.manifest.static_precache, RequestClass::Static)
            .await;
        self.precache(&self.manifest.data_precache, RequestClass::Data)
            .await;
    }

    async fn precache(&self, urls: &[String], class: RequestClass) {
        let partition = self.manifest.partition_name(class);
        for raw in urls {
            let Ok(url) = Url::parse(raw) else {
                warn!(url = %raw, "skipping unparseable precache URL");
                continue;
            };
            match self.engine.net.get(url.clone(), None).await {
                Ok(resp) => {
                    self.engine
                        .store
                        .put(&partition, &cache_key(&url), resp.into());
                }
                Err(err) => warn!(%url, %err, "precache fetch failed"),
            }
        }
    }

    /// Purge every partition that does not belong to this manifest's
    /// version, then start serving from the cache.
    fn activate(&self) {
        if *self.state_tx.borrow() == WorkerState::Active {
            return;
        }
        let expected = self.manifest.expected_partitions();
        for partition in self.engine.store.list_partitions() {
            if !expected.contains(&partition) {
                self.engine.store.delete_partition(&partition);
                info!(partition, "purged stale cache partition");
                self.engine
                    .events
                    .publish(CacheEvent::PartitionPurged { partition });
            }
        }
        let _ = self.state_tx.send(WorkerState::Active);
        info!(version = %self.manifest.version, "delivery worker active");
        self.engine.events.publish(CacheEvent::Activated {
            version: self.manifest.version.clone(),
        });
    }

    async fn handle_fetch(&self, method: &str, url: &Url) -> FetchOutcome {
        let Some(class) = classify(method, url) else {
            return FetchOutcome::NotIntercepted;
        };
        // Until activation the previous generation still owns the cache;
        // the caller performs the request itself.
        if *self.state_tx.borrow() != WorkerState::Active {
            return FetchOutcome::NotIntercepted;
        }
        let partition = self.manifest.partition_name(class);
        let policy = match class {
            RequestClass::Static | RequestClass::Image => CachePolicy::CacheFirst,
            RequestClass::Data => CachePolicy::NetworkFirst,
        };
        FetchOutcome::Handled(self.engine.apply(policy, &partition, url).await)
    }

    /// Warm the image partition, best effort: failures are logged, never
    /// surfaced.
    async fn warm_images(&self, urls: &[String]) {
        let partition = self.manifest.partition_name(RequestClass::Image);
        for raw in urls {
            let Ok(url) = Url::parse(raw) else {
                warn!(url = %raw, "skipping unparseable warm URL");
                continue;
            };
            if self
                .engine
                .store
                .get(&partition, &cache_key(&url))
                .is_some()
            {
                continue;
            }
            let _ = self
                .engine
                .apply(CachePolicy::CacheFirst, &partition, &url)
                .await;
        }
    }
}
