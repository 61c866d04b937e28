use std::collections::HashMap;

use parking_lot::RwLock;

/// A subscribe (or unsubscribe) request, as decoded from the wire before
/// verification. Transient: it lives only until the verifier either
/// confirms it into the [`SubscriptionRegistry`] or drops it.
#[derive(Debug, Clone)]
pub struct SubscribeRequest {
    pub callback: String,
    pub mode: String,
    pub topic: String,
    pub lease_seconds: u64,
}

/// A confirmed subscriber: a `(topic, callback)` pair that passed
/// verification, plus the fan-out high-water mark for that pair.
#[derive(Debug, Clone)]
pub struct Subscriber {
    pub callback: String,
    pub topic: String,
    pub lease_seconds: u64,
    /// The cursor already delivered to this subscriber. Empty means
    /// "nothing delivered yet — send everything currently held."
    pub last_notified: String,
}

/// `topic -> callback -> Subscriber`. Reads vastly outnumber writes (every
/// fan-out event reads the whole topic map; writes only happen on
/// subscribe/unsubscribe), so this is one `RwLock` around the whole map
/// rather than one lock per topic.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    by_topic: RwLock<HashMap<String, HashMap<String, Subscriber>>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the subscriber for `(topic, callback)`,
    /// resetting its cursor to empty — a re-subscription starts fan-out
    /// over from "everything currently held".
    pub fn confirm(&self, topic: &str, callback: &str, lease_seconds: u64) {
        let mut by_topic = self.by_topic.write();
        by_topic
            .entry(topic.to_string())
            .or_default()
            .insert(
                callback.to_string(),
                Subscriber {
                    callback: callback.to_string(),
                    topic: topic.to_string(),
                    lease_seconds,
                    last_notified: String::new(),
                },
            );
    }

    pub fn remove(&self, topic: &str, callback: &str) {
        let mut by_topic = self.by_topic.write();
        if let Some(subs) = by_topic.get_mut(topic) {
            subs.remove(callback);
        }
    }

    /// Snapshots every subscriber of `topic` at this instant. Cloned out
    /// from under the lock so the distributor can run each delivery
    /// (including its retry sleeps) without holding the registry lock.
    pub fn subscribers_of(&self, topic: &str) -> Vec<Subscriber> {
        self.by_topic
            .read()
            .get(topic)
            .map(|subs| subs.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Advances a subscriber's cursor after a successful delivery. A
    /// no-op if the subscriber was removed in the meantime.
    pub fn mark_notified(&self, topic: &str, callback: &str, cursor: &str) {
        let mut by_topic = self.by_topic.write();
        if let Some(sub) = by_topic.get_mut(topic).and_then(|subs| subs.get_mut(callback)) {
            sub.last_notified = cursor.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_then_subscribers_of_returns_it() {
        let reg = SubscriptionRegistry::new();
        reg.confirm("topic1", "http://sub/cb", 600);
        let subs = reg.subscribers_of("topic1");
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].callback, "http://sub/cb");
        assert_eq!(subs[0].last_notified, "");
    }

    #[test]
    fn resubscribing_overwrites_and_resets_cursor() {
        let reg = SubscriptionRegistry::new();
        reg.confirm("topic1", "http://sub/cb", 600);
        reg.mark_notified("topic1", "http://sub/cb", "2020-01-01T00:00:00Z");
        reg.confirm("topic1", "http://sub/cb", 900);

        let subs = reg.subscribers_of("topic1");
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].lease_seconds, 900);
        assert_eq!(subs[0].last_notified, "");
    }

    #[test]
    fn remove_drops_the_subscriber() {
        let reg = SubscriptionRegistry::new();
        reg.confirm("topic1", "http://sub/cb", 600);
        reg.remove("topic1", "http://sub/cb");
        assert!(reg.subscribers_of("topic1").is_empty());
    }

    #[test]
    fn unknown_topic_has_no_subscribers() {
        let reg = SubscriptionRegistry::new();
        assert!(reg.subscribers_of("nonexistent").is_empty());
    }
}
