//! HTML merge: full documents replace, fragments splice into the body.

use std::sync::LazyLock;

use regex::Regex;

use crate::concat;

static FULL_DOCUMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<!doctype\s+html|<html[\s>]").expect("valid doctype regex"));

static BODY_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</body\s*>").expect("valid body regex"));

/// Merge an incoming HTML snippet into existing markup.
///
/// If the incoming text looks like a full document (doctype or root `<html>`
/// tag) it replaces the existing content outright, regardless of how much is
/// being thrown away. Otherwise the fragment is spliced in just before the
/// existing `</body>` when one is present, or appended to the end. Pure
/// string splicing; nothing is DOM-aware.
pub fn merge_html(existing: &str, incoming: &str) -> String {
    if incoming.trim().is_empty() {
        return existing.to_string();
    }
    if FULL_DOCUMENT_RE.is_match(incoming) {
        return incoming.to_string();
    }
    if let Some(m) = BODY_CLOSE_RE.find(existing) {
        let mut out = String::with_capacity(existing.len() + incoming.len() + 2);
        out.push_str(existing[..m.start()].trim_end_matches([' ', '\t']));
        out.push_str(incoming.trim_end());
        out.push('\n');
        out.push_str(&existing[m.start()..]);
        return out;
    }
    concat(existing, incoming)
}
