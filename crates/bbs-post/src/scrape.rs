//! Hidden input scraping from confirmation pages.
//!
//! Confirmation pages carry server-chosen `<input type="hidden">` fields that
//! must come back with the next submission. Names are not known in advance,
//! so everything hidden is collected in page order.

use bbs_core::entities::FormFields;

/// All hidden inputs on `page`, in order. A repeated name keeps its first
/// position and its last value.
#[must_use]
pub fn hidden_fields(page: &str) -> FormFields {
    let lower = page.to_ascii_lowercase();
    let mut fields = FormFields::new();
    let mut cursor = 0;

    while let Some(found) = lower[cursor..].find("<input") {
        let start = cursor + found + "<input".len();
        let Some(len) = tag_len(&page[start..]) else {
            break;
        };
        let attrs = attributes(&page[start..start + len]);
        cursor = start + len;

        let is_hidden = attrs
            .iter()
            .any(|(k, v)| k == "type" && v.eq_ignore_ascii_case("hidden"));
        if !is_hidden {
            continue;
        }
        if let Some((_, name)) = attrs.iter().find(|(k, _)| k == "name") {
            let value = attrs
                .iter()
                .find(|(k, _)| k == "value")
                .map_or("", |(_, v)| v.as_str());
            fields.insert(unescape(name), unescape(value));
        }
    }
    fields
}

/// Length up to the closing `>`, skipping any inside quoted values.
fn tag_len(s: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in s.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), _) if c == q => quote = None,
            (None, '>') => return Some(i),
            _ => {}
        }
    }
    None
}

/// `name=value` pairs of a tag body. Names are lowercased; values may be
/// double-quoted, single-quoted, or bare.
fn attributes(body: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut rest = body.trim_start();

    while !rest.is_empty() {
        let name_end = rest
            .find(|c: char| c == '=' || c.is_whitespace() || c == '/')
            .unwrap_or(rest.len());
        let name = rest[..name_end].to_ascii_lowercase();
        rest = rest[name_end..].trim_start();

        let value = if let Some(after_eq) = rest.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            match after_eq.chars().next() {
                Some(q @ ('"' | '\'')) => {
                    let inner = &after_eq[1..];
                    let close = inner.find(q).unwrap_or(inner.len());
                    rest = inner.get(close + 1..).unwrap_or_default();
                    inner[..close].to_string()
                }
                _ => {
                    let end = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
                    rest = &after_eq[end..];
                    after_eq[..end].trim_end_matches('/').to_string()
                }
            }
        } else {
            if name.is_empty() {
                // Stray `/` or similar.
                rest = rest.get(1..).unwrap_or_default();
            }
            String::new()
        };

        if !name.is_empty() {
            attrs.push((name, value));
        }
        rest = rest.trim_start();
    }
    attrs
}

/// The handful of entities board CGIs emit in attribute values.
fn unescape(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
