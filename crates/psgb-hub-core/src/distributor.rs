use std::time::Duration;

use tracing::{info, warn};

use crate::content_store::ContentStore;
use crate::limiter::ConnectionLimiter;
use crate::subscription::{Subscriber, SubscriptionRegistry};

/// Fans a topic update out to every subscriber currently registered for
/// it. Each subscriber's delivery (including its own retry chain) is
/// awaited here rather than fired off independently, so a successful send
/// and the registry's cursor update can't interleave for that subscriber
/// — see the concurrency note on cursor races.
pub async fn distribute_to_subscribers(
    http: &reqwest::Client,
    limiter: &ConnectionLimiter,
    content_store: &ContentStore,
    registry: &SubscriptionRegistry,
    topic: &str,
    hub_url: &str,
    request_timeout: Duration,
    max_attempts: u32,
    backoff_base: Duration,
) {
    for sub in registry.subscribers_of(topic) {
        deliver_to_one(
            http,
            limiter,
            content_store,
            registry,
            &sub,
            hub_url,
            request_timeout,
            max_attempts,
            backoff_base,
        )
        .await;
    }
}

async fn deliver_to_one(
    http: &reqwest::Client,
    limiter: &ConnectionLimiter,
    content_store: &ContentStore,
    registry: &SubscriptionRegistry,
    sub: &Subscriber,
    hub_url: &str,
    request_timeout: Duration,
    max_attempts: u32,
    backoff_base: Duration,
) {
    let (payload, new_last_id) = content_store.content_after(&sub.topic, &sub.last_notified);

    if !sub.last_notified.is_empty() && sub.last_notified >= new_last_id {
        return;
    }

    let link_header = format!("<{}>; rel=self, <{}>; rel=hub", sub.topic, hub_url);

    for attempt in 0..max_attempts {
        let _permit = limiter.acquire().await;
        let result = http
            .post(&sub.callback)
            .header(reqwest::header::LINK, &link_header)
            .body(payload.clone())
            .timeout(request_timeout)
            .send()
            .await;
        drop(_permit);

        match result {
            Ok(response) if response.status().is_success() => {
                registry.mark_notified(&sub.topic, &sub.callback, &new_last_id);
                info!(topic = %sub.topic, callback = %sub.callback, attempt, "delivered");
                return;
            }
            Ok(response) => {
                warn!(topic = %sub.topic, callback = %sub.callback, status = %response.status(), attempt, "non-2xx from subscriber");
            }
            Err(e) => {
                warn!(topic = %sub.topic, callback = %sub.callback, error = %e, attempt, "delivery error");
            }
        }

        if attempt + 1 < max_attempts {
            let delay = backoff_base * 2u32.pow(attempt);
            tokio::time::sleep(delay).await;
        }
    }

    warn!(
        topic = %sub.topic, callback = %sub.callback, max_attempts,
        "failed to deliver after all attempts, abandoning"
    );
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <updated>2020-01-01T00:00:00Z</updated>
  <entry>
    <id>1</id>
    <updated>2020-01-01T00:00:00Z</updated>
  </entry>
</feed>"#;

    #[tokio::test]
    async fn a_successful_delivery_advances_the_cursor() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(204)).mount(&server).await;

        let registry = SubscriptionRegistry::new();
        let limiter = ConnectionLimiter::new(1);
        let content_store = ContentStore::new();
        let http = reqwest::Client::new();

        content_store.process_new_content("http://example.org/feed", "application/atom+xml", FEED).unwrap();
        registry.confirm("http://example.org/feed", &server.uri(), 600);

        distribute_to_subscribers(
            &http,
            &limiter,
            &content_store,
            &registry,
            "http://example.org/feed",
            "http://localhost:8080",
            Duration::from_secs(5),
            1,
            Duration::from_millis(1),
        )
        .await;

        let subs = registry.subscribers_of("http://example.org/feed");
        assert_eq!(subs[0].last_notified, "2020-01-01T00:00:00Z");
    }

    #[tokio::test]
    async fn a_subscriber_that_is_flaky_once_still_gets_delivered() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(204)).mount(&server).await;

        let registry = SubscriptionRegistry::new();
        let limiter = ConnectionLimiter::new(1);
        let content_store = ContentStore::new();
        let http = reqwest::Client::new();

        content_store.process_new_content("http://example.org/feed", "application/atom+xml", FEED).unwrap();
        registry.confirm("http://example.org/feed", &server.uri(), 600);

        distribute_to_subscribers(
            &http,
            &limiter,
            &content_store,
            &registry,
            "http://example.org/feed",
            "http://localhost:8080",
            Duration::from_secs(5),
            3,
            Duration::from_millis(1),
        )
        .await;

        let subs = registry.subscribers_of("http://example.org/feed");
        assert_eq!(subs[0].last_notified, "2020-01-01T00:00:00Z");
    }

    #[tokio::test]
    async fn skips_a_subscriber_already_at_the_latest_cursor() {
        let registry = SubscriptionRegistry::new();
        let limiter = ConnectionLimiter::new(1);
        let content_store = ContentStore::new();
        let http = reqwest::Client::new();

        let feed = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <updated>2020-01-01T00:00:00Z</updated>
  <entry>
    <id>1</id>
    <updated>2020-01-01T00:00:00Z</updated>
  </entry>
</feed>"#;
        content_store.process_new_content("http://example.org/feed", "application/atom+xml", feed).unwrap();

        registry.confirm("http://example.org/feed", "http://sub/cb", 600);
        registry.mark_notified("http://example.org/feed", "http://sub/cb", "2020-01-01T00:00:00Z");

        // Nothing should attempt a send (and thus nothing should time out
        // trying to reach an unroutable callback) because the subscriber
        // is already at the latest cursor.
        distribute_to_subscribers(
            &http,
            &limiter,
            &content_store,
            &registry,
            "http://example.org/feed",
            "http://localhost:8080",
            Duration::from_millis(50),
            1,
            Duration::from_millis(1),
        )
        .await;

        let subs = registry.subscribers_of("http://example.org/feed");
        assert_eq!(subs[0].last_notified, "2020-01-01T00:00:00Z");
    }

    #[tokio::test]
    async fn abandons_after_max_attempts_against_an_unroutable_callback() {
        let registry = SubscriptionRegistry::new();
        let limiter = ConnectionLimiter::new(1);
        let content_store = ContentStore::new();
        let http = reqwest::Client::new();

        let feed = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <updated>2020-01-01T00:00:00Z</updated>
  <entry>
    <id>1</id>
    <updated>2020-01-01T00:00:00Z</updated>
  </entry>
</feed>"#;
        content_store.process_new_content("http://example.org/feed", "application/atom+xml", feed).unwrap();
        registry.confirm("http://example.org/feed", "http://127.0.0.1:1/cb", 600);

        distribute_to_subscribers(
            &http,
            &limiter,
            &content_store,
            &registry,
            "http://example.org/feed",
            "http://localhost:8080",
            Duration::from_millis(50),
            2,
            Duration::from_millis(1),
        )
        .await;

        let subs = registry.subscribers_of("http://example.org/feed");
        assert_eq!(subs[0].last_notified, "", "cursor must not advance on failed delivery");
    }
}
