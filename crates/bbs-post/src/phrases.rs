//! Response page classification.
//!
//! Board CGIs answer every submission with an HTML page and a 200. The
//! outcome is only in the text, so the page is matched against a fixed,
//! ordered phrase table and the first hit wins.

use bbs_core::enums::PostStatus;

/// Phrase table in match order.
const PHRASES: &[(&str, PostStatus)] = &[
    ("書きこみました", PostStatus::Accepted),
    ("書き込み確認", PostStatus::NeedsConfirmation),
    ("クッキー", PostStatus::NeedsCookieRetry),
    ("Cookie", PostStatus::NeedsCookieRetry),
    ("どんぐりが壊れ", PostStatus::QuotaBroken),
    ("どんぐりを消費", PostStatus::QuotaConsumed),
    ("連続投稿", PostStatus::RateLimited),
    ("もう少し落ち着いて", PostStatus::RateLimited),
];

const SNIPPET_CHARS: usize = 200;

/// Classify a decoded response page.
#[must_use]
pub fn classify(page: &str) -> PostStatus {
    PHRASES
        .iter()
        .find(|(phrase, _)| page.contains(phrase))
        .map_or(PostStatus::Rejected, |&(_, status)| status)
}

/// Diagnostic text for a page: its `<title>`, else the start of its text.
#[must_use]
pub fn snippet(page: &str) -> String {
    if let Some(title) = title(page).filter(|t| !t.is_empty()) {
        return title;
    }
    strip_tags(page).chars().take(SNIPPET_CHARS).collect()
}

fn title(page: &str) -> Option<String> {
    let lower = page.to_ascii_lowercase();
    let open = lower.find("<title")?;
    let start = open + lower[open..].find('>')? + 1;
    let end = start + lower[start..].find("</title")?;
    Some(collapse_whitespace(&page[start..end]))
}

fn strip_tags(page: &str) -> String {
    let mut text = String::with_capacity(page.len());
    let mut in_tag = false;
    for c in page.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    collapse_whitespace(&text)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
