use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use psgb_hub_core::{Hub, SubscribeRequest};

/// `POST /publish` carries one or more `hub.url` values alongside
/// `hub.mode=publish`, so it's parsed from the raw
/// `application/x-www-form-urlencoded` body rather than through
/// `axum::Form`, which only keeps the last value for a repeated key.
pub async fn publish(State(hub): State<Hub>, headers: HeaderMap, body: axum::body::Bytes) -> StatusCode {
    let content_type = headers.get(axum::http::header::CONTENT_TYPE).and_then(|v| v.to_str().ok()).unwrap_or_default();
    if !content_type.starts_with("application/x-www-form-urlencoded") {
        tracing::warn!(content_type, "bad content-type on publish");
        return StatusCode::BAD_REQUEST;
    }

    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(&body).into_owned().collect();

    let mode = pairs.iter().find(|(k, _)| k == "hub.mode").map(|(_, v)| v.as_str());
    if mode != Some("publish") {
        tracing::warn!(?mode, "bad or missing hub.mode on publish");
        return StatusCode::BAD_REQUEST;
    }

    let urls: Vec<String> = pairs.into_iter().filter(|(k, _)| k == "hub.url").map(|(_, v)| v).collect();
    if urls.is_empty() {
        tracing::warn!("publish request carried no hub.url");
        return StatusCode::BAD_REQUEST;
    }

    hub.publish(urls).await;
    StatusCode::NO_CONTENT
}

/// `POST /subscribe` is parsed the same way as `/publish`: a raw
/// `application/x-www-form-urlencoded` body rather than `axum::Form`, so a
/// missing required field can be reported as `400` with a diagnostic body
/// naming it, instead of `axum::Form`'s blanket `422` on any field it can't
/// deserialize (our non-`Option` fields would otherwise reject an absent
/// field before this handler ever saw the request).
pub async fn subscribe(State(hub): State<Hub>, headers: HeaderMap, body: axum::body::Bytes) -> (StatusCode, String) {
    let content_type = headers.get(axum::http::header::CONTENT_TYPE).and_then(|v| v.to_str().ok()).unwrap_or_default();
    if !content_type.starts_with("application/x-www-form-urlencoded") {
        tracing::warn!(content_type, "bad content-type on subscribe");
        return (StatusCode::BAD_REQUEST, String::new());
    }

    let body = match std::str::from_utf8(&body) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(error = %e, "error parsing subscribe form body");
            return (StatusCode::INTERNAL_SERVER_ERROR, String::new());
        }
    };
    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(body.as_bytes()).into_owned().collect();
    let field = |name: &str| pairs.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone()).filter(|v| !v.is_empty());

    let Some(callback) = field("hub.callback") else {
        tracing::warn!("subscribe request missing hub.callback");
        return (StatusCode::BAD_REQUEST, "Didn't find hub.callback".to_string());
    };
    let Some(mode) = field("hub.mode") else {
        tracing::warn!("subscribe request missing hub.mode");
        return (StatusCode::BAD_REQUEST, "Didn't find hub.mode".to_string());
    };
    let Some(topic) = field("hub.topic") else {
        tracing::warn!("subscribe request missing hub.topic");
        return (StatusCode::BAD_REQUEST, "Didn't find hub.topic".to_string());
    };

    // A missing hub.lease_seconds defaults to 60, distinct from the
    // configured default_lease_seconds used when a present value fails to
    // parse — both fallbacks come straight from the reference hub.
    let lease_seconds = match field("hub.lease_seconds") {
        None => 60,
        Some(raw) => raw.parse().unwrap_or(hub.settings().default_lease_seconds),
    };

    hub.subscribe(SubscribeRequest {
        callback,
        mode,
        topic,
        lease_seconds,
    })
    .await;

    (StatusCode::ACCEPTED, String::new())
}

pub async fn healthz(State(hub): State<Hub>) -> StatusCode {
    if hub.is_alive() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
