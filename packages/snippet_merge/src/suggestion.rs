//! Suggestion extraction from markdown-ish assistant replies.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Language;

/// An AI-suggested code fragment with its target language. Ephemeral:
/// parsed out of one reply, shown to the user, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub title: String,
    pub description: String,
    pub code: String,
    pub language: Language,
}

static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```([A-Za-z]*)[ \t]*\r?\n(.*?)```").expect("valid fence regex")
});

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,6}\s+(.+)$").expect("valid heading regex"));

/// Pull fenced code blocks with a recognized language tag out of a reply.
///
/// The title comes from the nearest markdown heading above the fence (or a
/// per-language default), the description from the prose between that
/// heading and the fence, truncated to its first paragraph. Blocks fenced
/// with an unknown or missing language tag are skipped; a reply with no
/// usable fences yields an empty list, which callers treat as "chat only,
/// nothing to apply".
pub fn extract_suggestions(reply: &str) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    for cap in FENCE_RE.captures_iter(reply) {
        let Some(language) = Language::from_fence(&cap[1]) else {
            continue;
        };
        let code = cap[2].trim_end().to_string();
        if code.trim().is_empty() {
            continue;
        }

        let fence_start = cap.get(0).map(|m| m.start()).unwrap_or(0);
        let preceding = &reply[..fence_start];

        let (title, heading_end) = HEADING_RE
            .captures_iter(preceding)
            .last()
            .and_then(|h| {
                let text = h.get(1)?.as_str().trim().to_string();
                Some((text, h.get(0)?.end()))
            })
            .unwrap_or_else(|| (default_title(language), 0));

        let description = first_paragraph(&preceding[heading_end..]);

        suggestions.push(Suggestion {
            title,
            description,
            code,
            language,
        });
    }

    suggestions
}

fn default_title(language: Language) -> String {
    match language {
        Language::Html => "HTML snippet".to_string(),
        Language::Css => "CSS snippet".to_string(),
        Language::Js => "JavaScript snippet".to_string(),
    }
}

fn first_paragraph(prose: &str) -> String {
    prose
        .split("\n\n")
        .map(str::trim)
        .find(|p| !p.is_empty() && !p.starts_with("```"))
        .unwrap_or("")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_fenced_block_with_language() {
        let reply = "Try this:\n\n```css\nh1 { color: red; }\n```\n";
        let suggestions = extract_suggestions(reply);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].language, Language::Css);
        assert_eq!(suggestions[0].code, "h1 { color: red; }");
        assert_eq!(suggestions[0].description, "Try this:");
    }

    #[test]
    fn test_heading_becomes_title() {
        let reply = "## Center your heading\n\nUse text-align.\n\n```css\nh1 { text-align: center; }\n```";
        let suggestions = extract_suggestions(reply);
        assert_eq!(suggestions[0].title, "Center your heading");
        assert_eq!(suggestions[0].description, "Use text-align.");
    }

    #[test]
    fn test_default_title_without_heading() {
        let reply = "```javascript\nconsole.log(1);\n```";
        let suggestions = extract_suggestions(reply);
        assert_eq!(suggestions[0].title, "JavaScript snippet");
        assert_eq!(suggestions[0].language, Language::Js);
    }

    #[test]
    fn test_unknown_language_skipped() {
        let reply = "```rust\nfn main() {}\n```";
        assert!(extract_suggestions(reply).is_empty());
    }

    #[test]
    fn test_bare_fence_skipped() {
        let reply = "```\nplain text\n```";
        assert!(extract_suggestions(reply).is_empty());
    }

    #[test]
    fn test_multiple_blocks() {
        let reply = "# Button\n\nMarkup:\n\n```html\n<button>Go</button>\n```\n\n# Wire it up\n\nHandler:\n\n```javascript\ndocument.querySelector('button');\n```";
        let suggestions = extract_suggestions(reply);
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].title, "Button");
        assert_eq!(suggestions[0].language, Language::Html);
        assert_eq!(suggestions[1].title, "Wire it up");
        assert_eq!(suggestions[1].description, "Handler:");
    }

    #[test]
    fn test_empty_code_block_skipped() {
        let reply = "```css\n\n```";
        assert!(extract_suggestions(reply).is_empty());
    }

    #[test]
    fn test_no_fences_yields_empty() {
        assert!(extract_suggestions("Just words, no code.").is_empty());
    }

    #[test]
    fn test_crlf_reply_extracts() {
        let reply = "Try this:\r\n\r\n```css\r\nh1 { color: red; }\r\n```\r\n";
        let suggestions = extract_suggestions(reply);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].language, Language::Css);
        assert_eq!(suggestions[0].code, "h1 { color: red; }");
    }
}
