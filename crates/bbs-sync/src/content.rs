//! Thread content parser.
//!
//! Classic lines carry five fields and take their ordinal from the line
//! position:
//!
//! ```text
//! name<>mail<>date ID:xxx<>body<>title
//! ```
//!
//! Seven-field lines carry an explicit ordinal and a trailing poster id:
//!
//! ```text
//! ordinal<>name<>mail<>date<>body<>title<>id
//! ```
//!
//! Both paths produce the same [`ResponseRecord`] shape. Records are rebuilt
//! from the whole document on every parse.

use bbs_core::BoardVariant;
use bbs_core::entities::{EMPTY_BODY_PLACEHOLDER, ResponseRecord};

use crate::delimit::Delimiting;
use crate::error::SyncError;

const CLASSIC_FIELDS: usize = 5;
const NUMBERED_FIELDS: usize = 7;

/// Parse decoded content for a board variant.
///
/// # Errors
///
/// Returns [`SyncError::Parse`] if the document is non-empty but its first
/// line has no field delimiter at all (an HTML error page served with a
/// success status, for example).
pub fn parse_content(text: &str, variant: BoardVariant) -> Result<Vec<ResponseRecord>, SyncError> {
    let delimiting = Delimiting::detect(text);
    let lines: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();

    if let Some((idx, first)) = lines.iter().enumerate().find(|(_, l)| !l.trim().is_empty())
        && delimiting.split(first).len() < 2
    {
        return Err(SyncError::Parse {
            line: idx + 1,
            reason: format!("no field delimiter in {:?}", truncate(first, 80)),
        });
    }

    Ok(if variant.has_seven_field_content() {
        parse_numbered(&lines, delimiting)
    } else {
        parse_classic(&lines, delimiting)
    })
}

fn parse_classic(lines: &[&str], delimiting: Delimiting) -> Vec<ResponseRecord> {
    let mut records = Vec::with_capacity(lines.len());
    for (idx, line) in lines.iter().enumerate() {
        let number = u32::try_from(idx + 1).unwrap_or(u32::MAX);
        let mut fields = padded(delimiting.split(line), CLASSIC_FIELDS, idx + 1);
        let title = std::mem::take(&mut fields[4]);
        records.push(ResponseRecord {
            number,
            author: std::mem::take(&mut fields[0]),
            contact: std::mem::take(&mut fields[1]),
            posted_at: std::mem::take(&mut fields[2]),
            body: body_or_placeholder(std::mem::take(&mut fields[3])),
            title: (number == 1).then_some(title),
        });
    }
    records
}

fn parse_numbered(lines: &[&str], delimiting: Delimiting) -> Vec<ResponseRecord> {
    let mut records: Vec<ResponseRecord> = Vec::with_capacity(lines.len());
    for (idx, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = padded(delimiting.split(line), NUMBERED_FIELDS, idx + 1);

        let Ok(number) = fields[0].trim().parse::<u32>() else {
            tracing::warn!(line = idx + 1, ordinal = %fields[0], "non-numeric ordinal, line skipped");
            continue;
        };
        if records.last().is_some_and(|prev| number <= prev.number) {
            tracing::warn!(line = idx + 1, number, "ordinal out of order, line skipped");
            continue;
        }

        let id = fields[6].trim().to_string();
        let posted_at = if id.is_empty() {
            std::mem::take(&mut fields[3])
        } else {
            format!("{} ID:{id}", fields[3])
        };
        let title = std::mem::take(&mut fields[5]);
        records.push(ResponseRecord {
            number,
            author: std::mem::take(&mut fields[1]),
            contact: std::mem::take(&mut fields[2]),
            posted_at,
            body: body_or_placeholder(std::mem::take(&mut fields[4])),
            title: (number == 1).then_some(title),
        });
    }
    records
}

fn padded(mut fields: Vec<String>, width: usize, line: usize) -> Vec<String> {
    if fields.len() < width {
        tracing::debug!(line, found = fields.len(), width, "short content line padded");
        fields.resize(width, String::new());
    }
    fields
}

/// The wire format cannot tell an empty body from a missing one, so an
/// empty body is stored as a single placeholder character.
fn body_or_placeholder(body: String) -> String {
    if body.is_empty() {
        EMPTY_BODY_PLACEHOLDER.to_string()
    } else {
        body
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    s.char_indices().nth(max_chars).map_or(s, |(i, _)| &s[..i])
}
