//! # Snippet Merge
//!
//! Heuristic text merging of AI-suggested code snippets into an existing
//! source buffer, one heuristic per language:
//!
//! - **CSS**: selector-level merge. Both sides are split into
//!   selector → declaration blocks; incoming declarations win on property
//!   collision, unknown selectors are appended.
//! - **HTML**: a full-document snippet replaces everything; a fragment is
//!   spliced inside `<body>` when one exists, otherwise appended.
//! - **JS**: top-level function declarations that collide by name are
//!   mechanically renamed in the incoming snippet, which is then appended.
//!
//! These are regex-driven text heuristics, not parsers. Nested at-rules,
//! comma-separated selector lists and shadowed scopes are handled only as
//! well as plain block splitting allows. Callers that need precision should
//! swap the implementation behind [`merge`]; the interface is deliberately
//! narrow for that reason.
//!
//! Merging never fails: a snippet the heuristic cannot make sense of
//! degrades to plain concatenation.
//!
//! ## Quick start
//!
//! ```
//! use snippet_merge::{Language, merge};
//!
//! let existing = ".a { color: red; }";
//! let incoming = ".a { color: blue; font-size: 1em; }";
//! let merged = merge(Language::Css, existing, incoming);
//! assert!(merged.contains("color: blue;"));
//! assert!(merged.contains("font-size: 1em;"));
//! ```

mod css;
mod html;
mod js;
mod suggestion;

pub use css::merge_css;
pub use html::merge_html;
pub use js::merge_js;
pub use suggestion::{Suggestion, extract_suggestions};

use serde::{Deserialize, Serialize};

/// Target language of a snippet. Selects the merge heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Html,
    Css,
    #[serde(alias = "javascript")]
    Js,
}

impl Language {
    /// Map a markdown fence info string (`css`, `javascript`, ...) to a language.
    pub fn from_fence(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "html" => Some(Language::Html),
            "css" => Some(Language::Css),
            "js" | "javascript" => Some(Language::Js),
            _ => None,
        }
    }
}

/// Merge an incoming snippet into an existing buffer for the given language.
///
/// Never fails; see the per-language functions for the exact heuristics.
pub fn merge(language: Language, existing: &str, incoming: &str) -> String {
    try_merge(language, existing, incoming).unwrap_or_else(|| concat(existing, incoming))
}

/// Like [`merge`], but reports when the heuristic had nothing to offer:
/// `None` means the caller gets plain concatenation out of [`merge`]. Lets
/// callers distinguish "merged" from "gave up" (e.g. for reporting which
/// rung of the degradation ladder produced the result).
pub fn try_merge(language: Language, existing: &str, incoming: &str) -> Option<String> {
    match language {
        Language::Html => Some(merge_html(existing, incoming)),
        Language::Css => css::try_merge_css(existing, incoming),
        Language::Js => Some(merge_js(existing, incoming)),
    }
}

/// Last-resort combination when no heuristic applies: old text, blank line,
/// new text.
pub(crate) fn concat(existing: &str, incoming: &str) -> String {
    if existing.trim().is_empty() {
        return incoming.to_string();
    }
    if incoming.trim().is_empty() {
        return existing.to_string();
    }
    format!("{}\n\n{}", existing.trim_end(), incoming.trim_start())
}
