use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::content_store::ContentStore;
use crate::distributor;
use crate::limiter::ConnectionLimiter;
use crate::subscription::SubscriptionRegistry;

/// The single long-lived task bridging ingest and fan-out: for every topic
/// announced on `topic_updated`, fan out to that topic's subscribers. This
/// is the synchronous boundary the rest of the system relies on for
/// per-topic ordering — the atom store's ingest has already completed by
/// the time a topic appears here.
pub async fn run(
    mut topic_updated: mpsc::Receiver<String>,
    http: reqwest::Client,
    limiter: ConnectionLimiter,
    content_store: std::sync::Arc<ContentStore>,
    registry: std::sync::Arc<SubscriptionRegistry>,
    hub_url: String,
    request_timeout: Duration,
    max_attempts: u32,
    backoff_base: Duration,
) {
    while let Some(topic) = topic_updated.recv().await {
        debug!(topic, "dispatching topic update");
        distributor::distribute_to_subscribers(
            &http,
            &limiter,
            &content_store,
            &registry,
            &topic,
            &hub_url,
            request_timeout,
            max_attempts,
            backoff_base,
        )
        .await;
    }
}
