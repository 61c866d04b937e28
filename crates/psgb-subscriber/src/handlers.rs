use axum::extract::{Form, Query, State};
use axum::http::{HeaderMap, StatusCode};
use serde::Deserialize;
use tracing::{info, warn};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubscribeToForm {
    feed_uri: String,
}

/// Operator-facing: subscribes this agent to `feed_uri` via the configured
/// hub, then remembers the topic is awaiting verification.
pub async fn subscribe_to(State(state): State<AppState>, Form(form): Form<SubscribeToForm>) -> StatusCode {
    if form.feed_uri.is_empty() {
        return StatusCode::BAD_REQUEST;
    }

    let body = [
        ("hub.callback", state.callback_url()),
        ("hub.topic", form.feed_uri.clone()),
        ("hub.mode", "subscribe".to_string()),
    ];

    let subscribe_url = format!("{}/subscribe", state.hub_url.trim_end_matches('/'));
    match state.http.post(&subscribe_url).form(&body).send().await {
        Ok(response) if response.status() == StatusCode::ACCEPTED => {
            state.add_pending(form.feed_uri);
            StatusCode::ACCEPTED
        }
        Ok(response) => {
            warn!(status = %response.status(), "hub rejected subscription request");
            StatusCode::BAD_GATEWAY
        }
        Err(e) => {
            warn!(error = %e, "error posting subscribe request to hub");
            StatusCode::BAD_GATEWAY
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VerificationParams {
    #[serde(rename = "hub.topic")]
    topic: Option<String>,
    #[serde(rename = "hub.mode")]
    mode: Option<String>,
    #[serde(rename = "hub.challenge")]
    challenge: Option<String>,
    #[serde(rename = "hub.reason")]
    reason: Option<String>,
}

/// The hub's verification callback. Rejects topics we didn't ask for;
/// echoes the challenge back for everything else.
pub async fn handle_verification(State(state): State<AppState>, Query(params): Query<VerificationParams>) -> (StatusCode, String) {
    let Some(topic) = params.topic.filter(|t| !t.is_empty()) else {
        warn!("verification request missing hub.topic");
        return (StatusCode::BAD_REQUEST, String::new());
    };

    if !state.is_pending(&topic) {
        warn!(topic, "rejecting unsolicited verification request");
        return (StatusCode::NOT_FOUND, String::new());
    }

    let Some(mode) = params.mode.filter(|m| !m.is_empty()) else {
        warn!(topic, "verification request missing hub.mode");
        return (StatusCode::BAD_REQUEST, String::new());
    };

    if mode == "denied" {
        state.remove_pending(&topic);
        info!(topic, reason = params.reason.as_deref().unwrap_or(""), "hub denied subscription");
        return (StatusCode::OK, String::new());
    }

    let Some(challenge) = params.challenge.filter(|c| !c.is_empty()) else {
        warn!(topic, "verification request missing hub.challenge");
        return (StatusCode::BAD_REQUEST, String::new());
    };

    state.remove_pending(&topic);
    info!(topic, "confirmed subscription");
    (StatusCode::CREATED, challenge)
}

/// The hub's distribution callback: a new-content notification carrying
/// the updated feed body and `Link` headers identifying the topic and
/// hub. This agent only logs receipt — acting on the payload is the
/// integration point a real subscriber would fill in.
pub async fn handle_new_item(headers: HeaderMap) -> StatusCode {
    let raw_links: Vec<&str> = headers.get_all(axum::http::header::LINK).iter().filter_map(|v| v.to_str().ok()).collect();

    if raw_links.is_empty() {
        warn!("missing Link headers on update");
        return StatusCode::ACCEPTED;
    }

    let mut topic = String::new();
    let mut hub = String::new();
    for raw in raw_links {
        for link in psgb_link::parse(raw) {
            match link.rel.as_str() {
                "self" => topic = link.uri,
                "hub" => hub = link.uri,
                _ => {}
            }
        }
    }

    info!(topic, hub, "new content for subscribed feed");
    StatusCode::ACCEPTED
}
