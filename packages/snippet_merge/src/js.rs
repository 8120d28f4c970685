//! JS merge: collision-rename of top-level function declarations, then append.

use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

use regex::Regex;

use crate::concat;

/// Marker emitted ahead of an appended snippet.
const MERGE_MARKER: &str = "// merged snippet";

static FUNCTION_DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*function\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*\(")
        .expect("valid function regex")
});

/// Merge an incoming JS snippet into existing code.
///
/// Top-level `function name(...)` declarations are scanned on both sides.
/// Any incoming function whose name collides with an existing one is renamed
/// with a millisecond-timestamp suffix, applied as a whole-word text
/// substitution across the incoming snippet. The (possibly renamed) snippet
/// is then appended after a comment marker.
///
/// The rename only touches tokens inside the incoming snippet. If two
/// overlapping functions call each other through references that live in the
/// existing buffer, those call sites still point at the old name and may
/// break at runtime.
///
/// No scope analysis is done; variable (non-function) collisions pass
/// through untouched.
pub fn merge_js(existing: &str, incoming: &str) -> String {
    merge_js_with_suffix(existing, incoming, unix_millis())
}

fn merge_js_with_suffix(existing: &str, incoming: &str, suffix: u128) -> String {
    if incoming.trim().is_empty() {
        return existing.to_string();
    }
    if existing.trim().is_empty() {
        return incoming.to_string();
    }

    let existing_names = function_names(existing);
    let mut snippet = incoming.to_string();

    for name in function_names(incoming) {
        if !existing_names.contains(&name) {
            continue;
        }
        let renamed = format!("{}_{}", name, suffix);
        match Regex::new(&format!(r"\b{}\b", regex::escape(&name))) {
            Ok(word) => snippet = word.replace_all(&snippet, renamed.as_str()).into_owned(),
            // A name the word regex cannot express (e.g. `$`-heavy) is left
            // colliding rather than mangled.
            Err(_) => continue,
        }
    }

    concat(existing, &format!("{}\n{}", MERGE_MARKER, snippet.trim_start()))
}

fn function_names(code: &str) -> Vec<String> {
    FUNCTION_DECL_RE
        .captures_iter(code)
        .map(|cap| cap[1].to_string())
        .collect()
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
