use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::content_store::ContentStore;
use crate::limiter::ConnectionLimiter;

/// Fetches one published topic URL, stores its content, and announces the
/// update on `topic_updated` so the dispatcher can fan it out. A missing or
/// unrecognized `Content-Type` is dropped with a log line.
pub async fn fetch_and_store(
    http: &reqwest::Client,
    limiter: &ConnectionLimiter,
    content_store: &ContentStore,
    topic: &str,
    request_timeout: Duration,
    topic_updated: &mpsc::Sender<String>,
) {
    let _permit = limiter.acquire().await;
    let response = http.get(topic).timeout(request_timeout).send().await;
    drop(_permit);

    let response = match response {
        Ok(r) => r,
        Err(e) => {
            warn!(topic, error = %e, "error fetching topic");
            return;
        }
    };

    // A missing Content-Type is treated as an unsupported one rather than
    // guessed at — unlike the reference hub, which sniffs an empty byte
    // string and always "detects" text/plain.
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
        .unwrap_or_default();

    let body = match response.text().await {
        Ok(b) => b,
        Err(e) => {
            warn!(topic, error = %e, "error reading response body");
            return;
        }
    };

    match content_store.process_new_content(topic, &content_type, &body) {
        Ok(_) => {
            info!(topic, "got new content");
            if topic_updated.send(topic.to_string()).await.is_err() {
                warn!(topic, "dispatcher channel closed, dropping topic-updated event");
            }
        }
        Err(e) => {
            warn!(topic, content_type, error = %e, "not parsing content");
        }
    }
}
