//! Content store for atom-formatted feed topics.
//!
//! A topic's content accumulates as a bounded, cursor-ordered window of
//! `<entry>` elements sitting between a stored header and footer, so a
//! subscriber can be handed "everything published since cursor X"
//! without the hub re-fetching or re-parsing the origin feed.

mod entry;
mod error;
mod parse;
mod store;

pub use entry::{Cursor, Entry};
pub use error::{AtomError, Result};
pub use store::AtomStore;
