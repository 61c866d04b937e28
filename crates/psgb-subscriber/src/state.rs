use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

/// Shared state for the subscriber agent: the hub/self URLs it was
/// started with, an HTTP client, and the set of topics currently waiting
/// on a verification callback.
#[derive(Clone)]
pub struct AppState {
    pub hub_url: Arc<String>,
    pub self_url: Arc<String>,
    pub http: reqwest::Client,
    pending: Arc<Mutex<HashSet<String>>>,
}

impl AppState {
    pub fn new(hub_url: String, self_url: String) -> Self {
        AppState {
            hub_url: Arc::new(hub_url),
            self_url: Arc::new(self_url),
            http: reqwest::Client::new(),
            pending: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn callback_url(&self) -> String {
        format!("{}/subscribeCallback", self.self_url.trim_end_matches('/'))
    }

    pub fn add_pending(&self, topic: String) {
        self.pending.lock().insert(topic);
    }

    pub fn is_pending(&self, topic: &str) -> bool {
        self.pending.lock().contains(topic)
    }

    pub fn remove_pending(&self, topic: &str) {
        self.pending.lock().remove(topic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_topic_added_is_pending_until_removed() {
        let state = AppState::new("http://hub".to_string(), "http://self".to_string());
        assert!(!state.is_pending("http://feed"));
        state.add_pending("http://feed".to_string());
        assert!(state.is_pending("http://feed"));
        state.remove_pending("http://feed");
        assert!(!state.is_pending("http://feed"));
    }
}
