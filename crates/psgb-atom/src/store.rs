//! Per-topic atom feed content, keyed by the PubSubHubbub topic URL.
//!
//! Mirrors the reference hub's merge behaviour: incoming entries are
//! accepted only if their `updated` cursor sorts strictly after whatever
//! was the newest entry already on file *before this call*, a threshold
//! fixed once per call rather than advanced as each new entry is folded
//! in. A header is replaced on every call; a footer is kept from the
//! first call that supplies one.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::entry::{Cursor, Entry};
use crate::error::Result;
use crate::parse::parse_feed;

const ITEMS_IN_MEMORY: usize = 10;

#[derive(Debug, Default)]
struct TopicContent {
    entries: Vec<Entry>,
    header: String,
    footer: String,
    last_updated: Cursor,
}

impl TopicContent {
    fn add_entries(&mut self, mut incoming: Vec<Entry>) {
        incoming.sort_by(|a, b| a.updated.cmp(&b.updated));

        let threshold = self
            .entries
            .last()
            .map(|e| e.updated.clone())
            .unwrap_or_default();

        for e in incoming {
            if e.updated > threshold {
                self.entries.push(e);
            }
        }

        let skip = self.entries.len().saturating_sub(ITEMS_IN_MEMORY);
        if skip > 0 {
            self.entries.drain(..skip);
        }
    }
}

/// Per-topic atom feed store: merges incoming feed documents into a
/// bounded in-memory window of entries per topic, and serves slices of
/// that window back out from a given cursor.
#[derive(Debug, Default)]
pub struct AtomStore {
    topics: RwLock<HashMap<String, TopicContent>>,
}

impl AtomStore {
    pub fn new() -> Self {
        AtomStore {
            topics: RwLock::new(HashMap::new()),
        }
    }

    /// Whether any content has ever been stored for this topic.
    pub fn has_content(&self, topic: &str) -> bool {
        self.topics.read().contains_key(topic)
    }

    /// Merges a freshly-fetched feed document into the topic's store,
    /// returning the feed's own `updated` cursor on success.
    pub fn add_new_content(&self, topic: &str, content: &str) -> Result<Cursor> {
        let parsed = parse_feed(content)?;

        let mut topics = self.topics.write();
        let tc = topics.entry(topic.to_string()).or_default();

        tc.last_updated = parsed.feed_updated.clone();
        tc.add_entries(parsed.entries);
        tc.header = parsed.header;
        if tc.footer.is_empty() {
            tc.footer = parsed.footer;
        }

        Ok(tc.last_updated.clone())
    }

    /// Renders the stored header, every entry whose cursor is `>= after`
    /// (newest first, matching storage order reversed), and the footer,
    /// alongside the topic's current last-updated cursor. Returns `None`
    /// if the topic has no stored content.
    pub fn content_after(&self, topic: &str, after: &str) -> Option<(String, Cursor)> {
        let topics = self.topics.read();
        let tc = topics.get(topic)?;

        let mut out = String::new();
        out.push_str(&tc.header);
        out.push('\n');
        for e in tc.entries.iter().rev() {
            if e.updated.as_str() >= after {
                out.push_str(&e.content);
            }
        }
        out.push_str(&tc.footer);

        Some((out.trim().to_string(), tc.last_updated.clone()))
    }
}
