use std::time::Duration;

use tracing::{debug, info, warn};
use url::Url;

use crate::limiter::ConnectionLimiter;
use crate::random;
use crate::subscription::{SubscribeRequest, SubscriptionRegistry};

/// Runs the subscribe verification state machine for one request:
/// Pending -> Challenging -> Confirmed | Rejected. On success, writes the
/// subscriber into `registry` with its cursor reset to empty.
pub async fn confirm_subscription(
    http: &reqwest::Client,
    limiter: &ConnectionLimiter,
    registry: &SubscriptionRegistry,
    request: &SubscribeRequest,
    challenge_size: usize,
    request_timeout: Duration,
) {
    let challenge = random::challenge(challenge_size);

    let mut callback_url = match Url::parse(&request.callback) {
        Ok(u) => u,
        Err(e) => {
            warn!(callback = %request.callback, error = %e, "rejecting subscription: bad callback url");
            return;
        }
    };
    callback_url
        .query_pairs_mut()
        .append_pair("hub.mode", &request.mode)
        .append_pair("hub.topic", &request.topic)
        .append_pair("hub.challenge", &challenge)
        .append_pair("hub.lease_seconds", &request.lease_seconds.to_string());

    debug!(url = %callback_url, "confirming subscription");

    let _permit = limiter.acquire().await;
    let response = http.get(callback_url.clone()).timeout(request_timeout).send().await;
    drop(_permit);

    let response = match response {
        Ok(r) => r,
        Err(e) => {
            warn!(callback = %request.callback, error = %e, "verification request failed");
            return;
        }
    };

    if !response.status().is_success() {
        warn!(callback = %request.callback, status = %response.status(), "subscriber rejected verification");
        return;
    }

    let body = match response.text().await {
        Ok(b) => b,
        Err(e) => {
            warn!(callback = %request.callback, error = %e, "couldn't read verification response body");
            return;
        }
    };

    if body != challenge {
        warn!(callback = %request.callback, expected = %challenge, got = %body, "bad challenge echo");
        return;
    }

    registry.confirm(&request.topic, &request.callback, request.lease_seconds);
    info!(topic = %request.topic, callback = %request.callback, "subscription confirmed");
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn rejects_an_unparseable_callback_without_touching_the_registry() {
        let registry = SubscriptionRegistry::new();
        let limiter = ConnectionLimiter::new(1);
        let http = reqwest::Client::new();

        let request = SubscribeRequest {
            callback: "not a url".to_string(),
            mode: "subscribe".to_string(),
            topic: "http://example.org/feed".to_string(),
            lease_seconds: 600,
        };

        confirm_subscription(&http, &limiter, &registry, &request, 20, Duration::from_secs(1)).await;

        assert!(registry.subscribers_of(&request.topic).is_empty());
    }

    #[tokio::test]
    async fn a_subscriber_that_echoes_the_challenge_is_confirmed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("hub.mode", "subscribe"))
            .respond_with(|req: &wiremock::Request| {
                let challenge = req
                    .url
                    .query_pairs()
                    .find(|(k, _)| k == "hub.challenge")
                    .map(|(_, v)| v.to_string())
                    .unwrap_or_default();
                ResponseTemplate::new(200).set_body_string(challenge)
            })
            .mount(&server)
            .await;

        let registry = SubscriptionRegistry::new();
        let limiter = ConnectionLimiter::new(1);
        let http = reqwest::Client::new();

        let request = SubscribeRequest {
            callback: server.uri(),
            mode: "subscribe".to_string(),
            topic: "http://example.org/feed".to_string(),
            lease_seconds: 600,
        };

        confirm_subscription(&http, &limiter, &registry, &request, 20, Duration::from_secs(5)).await;

        let subs = registry.subscribers_of(&request.topic);
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].callback, server.uri());
    }

    #[tokio::test]
    async fn a_subscriber_that_echoes_the_wrong_body_is_not_confirmed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not-the-challenge"))
            .mount(&server)
            .await;

        let registry = SubscriptionRegistry::new();
        let limiter = ConnectionLimiter::new(1);
        let http = reqwest::Client::new();

        let request = SubscribeRequest {
            callback: server.uri(),
            mode: "subscribe".to_string(),
            topic: "http://example.org/feed".to_string(),
            lease_seconds: 600,
        };

        confirm_subscription(&http, &limiter, &registry, &request, 20, Duration::from_secs(5)).await;

        assert!(registry.subscribers_of(&request.topic).is_empty());
    }

    #[tokio::test]
    async fn a_non_2xx_response_is_not_confirmed() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).respond_with(ResponseTemplate::new(404)).mount(&server).await;

        let registry = SubscriptionRegistry::new();
        let limiter = ConnectionLimiter::new(1);
        let http = reqwest::Client::new();

        let request = SubscribeRequest {
            callback: server.uri(),
            mode: "subscribe".to_string(),
            topic: "http://example.org/feed".to_string(),
            lease_seconds: 600,
        };

        confirm_subscription(&http, &limiter, &registry, &request, 20, Duration::from_secs(5)).await;

        assert!(registry.subscribers_of(&request.topic).is_empty());
    }
}
