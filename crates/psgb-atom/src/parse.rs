//! Single-pass event parser that recovers, from one atom document:
//!
//! - the feed-level `<updated>` text (a direct child of `<feed>`),
//! - each `<entry>`'s raw inner XML plus its own `<updated>` text,
//! - the byte ranges needed to slice the document into header/footer
//!   around the contiguous run of `<entry>` elements.
//!
//! This plays the role the reference hub filled with two separate
//! `encoding/xml` unmarshals plus a re-marshal-and-split trick: here a
//! single `quick_xml::Reader` pass tracks tag nesting and byte offsets
//! directly, which is more robust than reconstructing a separator string
//! and splitting on it, while producing the same header/entries/footer
//! partition for any well-formed, conventionally-indented feed.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::entry::{Cursor, Entry};
use crate::error::{AtomError, Result};

pub(crate) struct ParsedFeed {
    pub(crate) feed_updated: Cursor,
    pub(crate) entries: Vec<Entry>,
    pub(crate) header: String,
    pub(crate) footer: String,
}

enum Pending {
    FeedUpdated,
    EntryUpdated,
}

pub(crate) fn parse_feed(xml: &str) -> Result<ParsedFeed> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Vec<u8>> = Vec::new();

    let mut found_feed = false;
    let mut feed_updated: Option<Cursor> = None;
    let mut pending: Option<Pending> = None;

    let mut raw_entries: Vec<(usize, usize, Cursor)> = Vec::new(); // (inner_start, inner_end, updated)
    let mut entry_inner_start: Option<usize> = None;
    let mut current_entry_updated: Option<Cursor> = None;
    let mut first_entry_tag_start: Option<usize> = None;
    let mut last_entry_tag_end: Option<usize> = None;
    let mut feed_close_tag_start: Option<usize> = None;

    loop {
        let pos_before = reader.buffer_position() as usize;
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| AtomError::MalformedFeed(e.to_string()))?;

        match event {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                let depth = stack.len();

                if depth == 0 && name == b"feed" {
                    found_feed = true;
                } else if depth == 1 && stack[0] == b"feed" && name == b"updated" {
                    if feed_updated.is_none() {
                        pending = Some(Pending::FeedUpdated);
                    }
                } else if depth == 1 && stack[0] == b"feed" && name == b"entry" {
                    entry_inner_start = Some(reader.buffer_position() as usize);
                    current_entry_updated = None;
                    if first_entry_tag_start.is_none() {
                        first_entry_tag_start = Some(pos_before);
                    }
                } else if depth == 2
                    && stack[0] == b"feed"
                    && stack[1] == b"entry"
                    && name == b"updated"
                    && current_entry_updated.is_none()
                {
                    pending = Some(Pending::EntryUpdated);
                }

                stack.push(name);
            }
            Event::Text(t) => {
                if let Some(target) = pending.take() {
                    let text = t
                        .unescape()
                        .map_err(|e| AtomError::MalformedFeed(e.to_string()))?
                        .trim()
                        .to_string();
                    match target {
                        Pending::FeedUpdated => feed_updated = Some(text),
                        Pending::EntryUpdated => current_entry_updated = Some(text),
                    }
                }
            }
            Event::End(e) => {
                let name = e.local_name().as_ref().to_vec();
                let depth_before_pop = stack.len();

                if depth_before_pop == 2
                    && stack[0] == b"feed"
                    && stack[1] == b"entry"
                    && name == b"entry"
                {
                    let inner_end = pos_before;
                    if let Some(inner_start) = entry_inner_start.take() {
                        let tag_end = reader.buffer_position() as usize;
                        last_entry_tag_end = Some(tag_end);
                        raw_entries.push((
                            inner_start,
                            inner_end,
                            current_entry_updated.clone().unwrap_or_default(),
                        ));
                    }
                } else if depth_before_pop == 1 && stack[0] == b"feed" && name == b"feed" {
                    feed_close_tag_start = Some(pos_before);
                }

                stack.pop();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !found_feed {
        return Err(AtomError::MalformedFeed("missing <feed> root".into()));
    }
    let feed_updated = feed_updated
        .ok_or_else(|| AtomError::MalformedFeed("missing feed-level <updated>".into()))?;

    let (header, footer) = match (first_entry_tag_start, last_entry_tag_end) {
        (Some(start), Some(end)) => (xml[..start].trim().to_string(), xml[end..].trim().to_string()),
        _ => {
            let close = feed_close_tag_start
                .ok_or_else(|| AtomError::MalformedFeed("unterminated <feed>".into()))?;
            (xml[..close].trim().to_string(), xml[close..].trim().to_string())
        }
    };

    let entries = raw_entries
        .into_iter()
        .map(|(start, end, updated)| Entry::normalize(&xml[start..end], updated))
        .collect();

    Ok(ParsedFeed {
        feed_updated,
        entries,
        header,
        footer,
    })
}
