use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::warn;
use url::Url;

use crate::config::HubSettings;
use crate::content_store::ContentStore;
use crate::dispatcher;
use crate::error::Result;
use crate::fetcher;
use crate::limiter::ConnectionLimiter;
use crate::subscription::{SubscribeRequest, SubscriptionRegistry};
use crate::verifier;

const FETCH_QUEUE_CAPACITY: usize = 64;
const SUBSCRIBE_QUEUE_CAPACITY: usize = 64;

/// The hub engine: owns every piece of shared state and background task
/// described in the component design, and exposes the handful of async
/// methods the HTTP surface calls into. Analogous in role to a top-level
/// `Mint` struct in the reference stack — a `Clone`-cheap handle (an `Arc`
/// around shared state) that HTTP handlers hold in their `AppState`.
#[derive(Clone)]
pub struct Hub {
    settings: Arc<HubSettings>,
    content_store: Arc<ContentStore>,
    registry: Arc<SubscriptionRegistry>,
    limiter: ConnectionLimiter,
    fetch_tx: mpsc::Sender<String>,
    subscribe_tx: mpsc::Sender<SubscribeRequest>,
}

impl Hub {
    /// Builds the engine and spawns its three background tasks: the fetch
    /// intake loop, the subscribe-verification intake loop, and the
    /// dispatcher. The returned `Hub` is the only handle needed to drive
    /// all of them via channels.
    pub fn spawn(settings: HubSettings) -> Result<Self> {
        let request_timeout = Duration::from_secs(settings.request_timeout_secs);
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| crate::error::HubError::Config(e.to_string()))?;

        let settings = Arc::new(settings);
        let content_store = Arc::new(ContentStore::new());
        let registry = Arc::new(SubscriptionRegistry::new());
        let limiter = ConnectionLimiter::new(settings.max_parallel_outgoing_conns);

        let (fetch_tx, fetch_rx) = mpsc::channel::<String>(FETCH_QUEUE_CAPACITY);
        let (subscribe_tx, subscribe_rx) = mpsc::channel::<SubscribeRequest>(SUBSCRIBE_QUEUE_CAPACITY);
        let (topic_updated_tx, topic_updated_rx) = mpsc::channel::<String>(FETCH_QUEUE_CAPACITY);

        spawn_fetch_intake(
            fetch_rx,
            http.clone(),
            limiter.clone(),
            content_store.clone(),
            request_timeout,
            topic_updated_tx,
        );

        spawn_subscribe_intake(
            subscribe_rx,
            http.clone(),
            limiter.clone(),
            registry.clone(),
            settings.challenge_size,
            request_timeout,
        );

        tokio::spawn(dispatcher::run(
            topic_updated_rx,
            http.clone(),
            limiter.clone(),
            content_store.clone(),
            registry.clone(),
            settings.hub_url.clone(),
            request_timeout,
            settings.max_delivery_attempts,
            Duration::from_secs(60),
        ));

        Ok(Hub {
            settings,
            content_store,
            registry,
            limiter,
            fetch_tx,
            subscribe_tx,
        })
    }

    pub fn settings(&self) -> &HubSettings {
        &self.settings
    }

    /// Whether this topic has ever had content ingested. Exposed for
    /// integration tests driving the engine end to end.
    pub fn has_content(&self, topic: &str) -> bool {
        self.content_store.has_content(topic)
    }

    /// Number of confirmed subscribers of `topic`. Exposed for tests and
    /// for a future metrics endpoint.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.registry.subscribers_of(topic).len()
    }

    /// Free outgoing connection slots, out of
    /// [`HubSettings::max_parallel_outgoing_conns`]. Exposed for a future
    /// metrics endpoint.
    pub fn available_connection_slots(&self) -> usize {
        self.limiter.available_permits()
    }

    /// Enqueues each well-formed URL in `urls` for fetching. A URL that
    /// fails to parse is dropped with a log line rather than failing the
    /// whole publish call — one bad `hub.url` value shouldn't block the
    /// others.
    pub async fn publish(&self, urls: Vec<String>) {
        for raw_url in urls {
            match Url::parse(&raw_url) {
                Ok(parsed) => {
                    if self.fetch_tx.send(parsed.to_string()).await.is_err() {
                        warn!(url = %raw_url, "fetch intake closed, dropping publish notification");
                    }
                }
                Err(e) => {
                    warn!(url = raw_url, error = %e, "bad url in publish notification");
                }
            }
        }
    }

    /// Enqueues a subscribe (or unsubscribe) request for verification.
    pub async fn subscribe(&self, request: SubscribeRequest) {
        if self.subscribe_tx.send(request).await.is_err() {
            warn!("subscribe intake closed, dropping subscribe request");
        }
    }

    /// Exposed for the `/healthz` probe and for tests: whether the engine's
    /// background tasks are still wired up (channels not yet dropped).
    pub fn is_alive(&self) -> bool {
        !self.fetch_tx.is_closed() && !self.subscribe_tx.is_closed()
    }
}

fn spawn_fetch_intake(
    mut fetch_rx: mpsc::Receiver<String>,
    http: reqwest::Client,
    limiter: ConnectionLimiter,
    content_store: Arc<ContentStore>,
    request_timeout: Duration,
    topic_updated_tx: mpsc::Sender<String>,
) {
    tokio::spawn(async move {
        while let Some(topic) = fetch_rx.recv().await {
            let http = http.clone();
            let limiter = limiter.clone();
            let content_store = content_store.clone();
            let topic_updated_tx = topic_updated_tx.clone();
            tokio::spawn(async move {
                fetcher::fetch_and_store(&http, &limiter, &content_store, &topic, request_timeout, &topic_updated_tx).await;
            });
        }
    });
}

fn spawn_subscribe_intake(
    mut subscribe_rx: mpsc::Receiver<SubscribeRequest>,
    http: reqwest::Client,
    limiter: ConnectionLimiter,
    registry: Arc<SubscriptionRegistry>,
    challenge_size: usize,
    request_timeout: Duration,
) {
    tokio::spawn(async move {
        while let Some(request) = subscribe_rx.recv().await {
            let http = http.clone();
            let limiter = limiter.clone();
            let registry = registry.clone();
            tokio::spawn(async move {
                verifier::confirm_subscription(&http, &limiter, &registry, &request, challenge_size, request_timeout).await;
            });
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn spawn_produces_a_live_hub() {
        let hub = Hub::spawn(HubSettings::default()).unwrap();
        assert!(hub.is_alive());
    }

    #[tokio::test]
    async fn publish_with_a_bad_url_does_not_panic() {
        let hub = Hub::spawn(HubSettings::default()).unwrap();
        hub.publish(vec!["not a url".to_string()]).await;
        assert!(hub.is_alive());
    }
}
