//! Generic text utilities for template composition. Nothing here is specific
//! to Python: placeholders are plain `{name}` markers.

use ahash::{AHashMap, AHashSet};

/// Substitutes every occurrence of `{key}` for every key in `values`.
/// Unmatched placeholders are left untouched; missing keys never error.
pub fn replace_placeholders(template: &str, values: &AHashMap<String, String>) -> String {
    let mut out = template.to_string();
    for (key, value) in values {
        out = out.replace(&format!("{{{}}}", key), value);
    }
    out
}

/// Returns the ordered list of unique `{...}` contents. No validation is
/// performed: empty and whitespace-only names are reported as-is.
pub fn extract_placeholders(template: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut seen: AHashSet<String> = AHashSet::new();
    let mut start: Option<usize> = None;

    for (i, ch) in template.char_indices() {
        match ch {
            '{' => start = Some(i + ch.len_utf8()),
            '}' => {
                if let Some(s) = start.take() {
                    let content = &template[s..i];
                    if seen.insert(content.to_string()) {
                        found.push(content.to_string());
                    }
                }
            }
            _ => {}
        }
    }
    found
}

/// Returns the subset of `required` keys not present as placeholders in the
/// template. An opt-in diagnostic, never an enforced gate.
pub fn validate_template(template: &str, required: &[&str]) -> Vec<String> {
    let present: AHashSet<String> = extract_placeholders(template).into_iter().collect();
    required
        .iter()
        .filter(|key| !present.contains(**key))
        .map(|key| key.to_string())
        .collect()
}

/// Escapes user-supplied text for a double-quoted Python string literal.
pub fn escape_py_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

/// Maps an arbitrary node id onto a Python identifier fragment by replacing
/// every non-alphanumeric character with `_` (a leading digit gets a `_`
/// prefix).
///
/// Known gap: this is not collision-free. Two ids differing only in
/// punctuation ("a-b" and "a.b") map to the same fragment; the original
/// system does not guard against this and neither do we.
pub fn sanitize_identifier(id: &str) -> String {
    let mut out: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}
