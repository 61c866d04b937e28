//! A deliberately narrow `Link` HTTP header parser (RFC 5988), covering
//! only the shape PubSubHubbub actually sends:
//!
//! ```text
//! Link: <http://example.org/feed>; rel="self", <http://example.org/hub>; rel="hub"
//! ```
//!
//! Anything outside that shape is tolerated by skipping to the next
//! recognizable link-value rather than by strict grammar validation; a
//! header that never produces a leading `<` yields an empty list instead
//! of an error, since a subscriber or hub is expected to treat "no
//! links found" and "header absent" the same way.

use std::iter::Peekable;
use std::str::Chars;

/// One link-value out of a `Link` header: its target URI and `rel` param.
/// Any other parameter (e.g. `type=`) is parsed but discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub uri: String,
    pub rel: String,
}

/// Parses every link-value out of a raw `Link` header value.
pub fn parse(raw: &str) -> Vec<Link> {
    let mut chars = raw.chars().peekable();
    let mut links = Vec::new();

    loop {
        while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        match parse_one(&mut chars) {
            Some(link) => links.push(link),
            None => {
                tracing::debug!(header = raw, "malformed Link header, stopping parse");
                break;
            }
        }
    }

    links
}

fn parse_one(chars: &mut Peekable<Chars<'_>>) -> Option<Link> {
    if chars.next()? != '<' {
        return None;
    }

    let mut uri = String::new();
    loop {
        match chars.next()? {
            '>' => break,
            c => uri.push(c),
        }
    }

    // Skip up to the ';' introducing the parameter list. A link-value with
    // no params at all (nothing left, or straight into the next ',')
    // still yields a bare link with an empty rel.
    loop {
        match chars.next() {
            Some(';') => break,
            Some(',') => return Some(Link { uri, rel: String::new() }),
            Some(_) => continue,
            None => return Some(Link { uri, rel: String::new() }),
        }
    }

    let mut rel = String::new();
    loop {
        let (key, value, end_of_link) = next_param(chars);
        if key == "rel" {
            rel = value;
        }
        if end_of_link {
            break;
        }
    }

    Some(Link { uri, rel })
}

/// Reads one `key=value` pair, trimming surrounding quotes and whitespace.
/// Returns whether this param ended the whole link-value (a `,` or EOF,
/// rather than a `;` leading into another param).
fn next_param(chars: &mut Peekable<Chars<'_>>) -> (String, String, bool) {
    let mut key = String::new();
    loop {
        match chars.next() {
            Some('=') => break,
            Some(c) => key.push(c),
            None => return (String::new(), String::new(), true),
        }
    }
    let key = key.trim().trim_matches('"').to_string();

    let mut value = String::new();
    let mut end_of_link = false;
    loop {
        match chars.next() {
            Some(';') => break,
            Some(',') => {
                end_of_link = true;
                break;
            }
            Some(c) => value.push(c),
            None => {
                end_of_link = true;
                break;
            }
        }
    }
    let value = value.trim().trim_matches('"').to_string();

    (key, value, end_of_link)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_self_and_hub_links() {
        let links = parse(r#"<http://example.org/feed>; rel="self", <http://example.org/hub>; rel="hub""#);
        assert_eq!(
            links,
            vec![
                Link { uri: "http://example.org/feed".into(), rel: "self".into() },
                Link { uri: "http://example.org/hub".into(), rel: "hub".into() },
            ]
        );
    }

    #[test]
    fn tolerates_extra_params_before_and_after_rel() {
        let links = parse(r#"<http://example.org/feed>; type="application/atom+xml"; rel="self""#);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].rel, "self");
        assert_eq!(links[0].uri, "http://example.org/feed");
    }

    #[test]
    fn malformed_header_yields_an_empty_list() {
        assert_eq!(parse("not a link header at all"), vec![]);
        assert_eq!(parse(""), vec![]);
    }

    #[test]
    fn link_with_no_params_has_empty_rel() {
        let links = parse("<http://example.org/feed>");
        assert_eq!(links, vec![Link { uri: "http://example.org/feed".into(), rel: String::new() }]);
    }

    #[test]
    fn unrecognized_rel_values_are_kept_verbatim() {
        let links = parse(r#"<http://example.org/feed>; rel="alternate""#);
        assert_eq!(links[0].rel, "alternate");
    }
}
