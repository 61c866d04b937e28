/// An ordered cursor over entries: the lexicographic order of an RFC-3339
/// `updated` timestamp. Valid as a total order only when every timestamp in
/// play shares a zone offset and representation width; the store doesn't
/// attempt to normalize this, matching the reference hub it's derived from.
pub type Cursor = String;

/// A single atom `<entry>`, normalized to its canonical stored form:
/// `"  <entry>\n    " + trim(inner) + "\n  </entry>\n"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub(crate) content: String,
    pub(crate) updated: Cursor,
}

impl Entry {
    pub(crate) fn normalize(inner_xml: &str, updated: Cursor) -> Self {
        Entry {
            content: format!("  <entry>\n    {}\n  </entry>\n", inner_xml.trim()),
            updated,
        }
    }

    pub fn updated(&self) -> &str {
        &self.updated
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}
