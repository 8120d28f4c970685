//! CSS merge: selector-level union with incoming-wins declaration conflicts.

use std::sync::LazyLock;

use regex::Regex;

use crate::concat;

/// One `selector { declarations }` block. Declaration order is insertion
/// order, so re-serializing an untouched sheet is semantically equivalent
/// but not guaranteed byte-identical.
#[derive(Debug, Clone, PartialEq)]
struct Rule {
    selector: String,
    declarations: Vec<(String, String)>,
}

static RULE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)([^{}]+)\{([^{}]*)\}").expect("valid rule regex"));

/// Merge incoming CSS into existing CSS.
///
/// Both sides are split into selector → declaration maps. For each incoming
/// selector: if absent, the whole rule is appended; if present, declarations
/// are merged property-by-property with incoming values overriding existing
/// ones. Text neither side parses as `selector { ... }` blocks degrades to
/// concatenation.
pub fn merge_css(existing: &str, incoming: &str) -> String {
    try_merge_css(existing, incoming).unwrap_or_else(|| concat(existing, incoming))
}

/// Selector-level merge, or `None` when either side is not block-shaped and
/// the only honest option left is concatenation.
pub(crate) fn try_merge_css(existing: &str, incoming: &str) -> Option<String> {
    if existing.trim().is_empty() {
        // No sheet to merge into; the snippet passes through untouched.
        return Some(incoming.to_string());
    }

    let incoming_rules = parse_rules(incoming);
    if incoming_rules.is_empty() {
        // Nothing block-shaped to merge; keep whatever text was suggested.
        return None;
    }

    let mut rules = parse_rules(existing);
    if rules.is_empty() {
        // Existing text exists but is not parseable as rules; don't destroy it.
        return None;
    }

    for inc in incoming_rules {
        match rules.iter_mut().find(|r| r.selector == inc.selector) {
            Some(rule) => {
                for (prop, value) in inc.declarations {
                    match rule.declarations.iter_mut().find(|(p, _)| *p == prop) {
                        Some((_, v)) => *v = value,
                        None => rule.declarations.push((prop, value)),
                    }
                }
            }
            None => rules.push(inc),
        }
    }

    Some(serialize_rules(&rules))
}

fn parse_rules(css: &str) -> Vec<Rule> {
    let mut rules: Vec<Rule> = Vec::new();
    for cap in RULE_RE.captures_iter(css) {
        let selector = cap[1].trim().to_string();
        if selector.is_empty() {
            continue;
        }
        let declarations = parse_declarations(&cap[2]);
        // A selector repeated within one sheet folds into the earlier rule,
        // later values winning (cascade order).
        match rules.iter_mut().find(|r| r.selector == selector) {
            Some(rule) => {
                for (prop, value) in declarations {
                    match rule.declarations.iter_mut().find(|(p, _)| *p == prop) {
                        Some((_, v)) => *v = value,
                        None => rule.declarations.push((prop, value)),
                    }
                }
            }
            None => rules.push(Rule {
                selector,
                declarations,
            }),
        }
    }
    rules
}

fn parse_declarations(block: &str) -> Vec<(String, String)> {
    let mut declarations = Vec::new();
    for decl in block.split(';') {
        let Some((prop, value)) = decl.split_once(':') else {
            continue;
        };
        let prop = prop.trim().to_string();
        let value = value.trim().to_string();
        if !prop.is_empty() && !value.is_empty() {
            declarations.push((prop, value));
        }
    }
    declarations
}

fn serialize_rules(rules: &[Rule]) -> String {
    let mut out = String::new();
    for rule in rules {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&rule.selector);
        out.push_str(" {\n");
        for (prop, value) in &rule.declarations {
            out.push_str(&format!("  {}: {};\n", prop, value));
        }
        out.push_str("}\n");
    }
    out
}
