//! Preview Renderer
//!
//! Assembles a standalone HTML document from a session's triplet: CSS
//! inlined in a `<style>` block, HTML in `<body>`, JS in a trailing
//! `<script>`, plus an injected live-reload client.
//!
//! Trust boundary: the injected client re-executes the session's JS via
//! `eval` on every update, with the page's full privileges. That is the
//! product — an unrestricted live-coding sandbox for learners — and it is
//! kept deliberately. Do not harden this path without changing the product;
//! anything rendered here must only ever be served to the author's own
//! browser in a sandboxed learning context.

use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::session::PreviewSession;

/// Render a session into a complete preview document.
///
/// The triplet is inlined verbatim (unescaped): the learner's markup, styles
/// and script must reach the browser exactly as written.
pub fn render_preview(session: &PreviewSession) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Code Cadet Preview" }
                style { (PreEscaped(&session.css_code)) }
                script { (PreEscaped(live_reload_client(&session.id))) }
            }
            body {
                (PreEscaped(&session.html_code))
                script { (PreEscaped(&session.js_code)) }
            }
        }
    }
}

/// The injected live-reload client. Opens the broadcast socket, filters on
/// this page's session id, then swaps body/style in place and re-executes
/// the new JS. Session ids are server-generated base-36, so splicing one
/// into the script source cannot break out of the string literal.
fn live_reload_client(session_id: &str) -> String {
    format!(
        r#"
        const protocol = window.location.protocol === "https:" ? "wss:" : "ws:";
        const socket = new WebSocket(protocol + "//" + window.location.host + "/ws");
        socket.onmessage = function(event) {{
            const data = JSON.parse(event.data);
            if (data.type === 'code-update' && data.sessionId === '{session_id}') {{
                document.body.innerHTML = data.htmlCode;
                const styleElement = document.querySelector('style');
                if (styleElement) {{
                    styleElement.textContent = data.cssCode;
                }}
                if (data.jsCode) {{
                    try {{
                        eval(data.jsCode);
                    }} catch (e) {{
                        console.error('JavaScript execution error:', e);
                    }}
                }}
            }}
        }};
        "#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn session(html: &str, css: &str, js: &str) -> PreviewSession {
        PreviewSession {
            id: "abc123def456".into(),
            html_code: html.into(),
            css_code: css.into(),
            js_code: js.into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_triplet_appears_verbatim() {
        let html_code = r#"<div class="my-box"><p>Hello & welcome!</p></div>"#;
        let css_code = "h1 {\n  color: #FFE55C;\n  text-align: center;\n}";
        let js_code = "document.getElementById('my-button').addEventListener('click', () => {});";

        let doc = render_preview(&session(html_code, css_code, js_code)).into_string();

        // Verbatim: no entity-escaping of the learner's code.
        assert!(doc.contains(html_code));
        assert!(doc.contains(css_code));
        assert!(doc.contains(js_code));
    }

    #[test]
    fn test_document_structure() {
        let doc = render_preview(&session("<p>x</p>", "p {}", "1;")).into_string();

        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<title>Code Cadet Preview</title>"));
        // CSS lands in head's style block, before the body.
        let style_at = doc.find("<style>").unwrap();
        let body_at = doc.find("<body>").unwrap();
        assert!(style_at < body_at);
        // JS lands in a script inside the body.
        let js_at = doc.rfind("1;").unwrap();
        assert!(js_at > body_at);
    }

    #[test]
    fn test_live_reload_client_filters_on_session_id() {
        let doc = render_preview(&session("", "", "")).into_string();
        assert!(doc.contains("data.sessionId === 'abc123def456'"));
        assert!(doc.contains("code-update"));
        assert!(doc.contains("/ws"));
    }

    #[test]
    fn test_empty_triplet_still_renders_document() {
        let doc = render_preview(&session("", "", "")).into_string();
        assert!(doc.contains("<body>"));
        assert!(doc.contains("</html>"));
    }
}
