//! Subject listing parser.
//!
//! One row per thread: `file_name<>title (count)`.

use std::collections::HashSet;

use bbs_core::board::thread_key;
use bbs_core::entities::SubjectRecord;

use crate::delimit::Delimiting;
use crate::error::SyncError;

/// Parse a decoded listing into rows, in listing order.
///
/// A repeated file name keeps its first row; later rows are dropped with a
/// warning so file names stay unique per board.
///
/// # Errors
///
/// Returns [`SyncError::Parse`] for the first row that does not parse.
pub fn parse_listing(text: &str) -> Result<Vec<SubjectRecord>, SyncError> {
    let delimiting = Delimiting::detect(text);
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let record = parse_row(delimiting, line).map_err(|reason| SyncError::Parse {
            line: idx + 1,
            reason,
        })?;
        if !seen.insert(record.file_name.clone()) {
            tracing::warn!(line = idx + 1, file_name = %record.file_name, "duplicate listing row skipped");
            continue;
        }
        records.push(record);
    }
    Ok(records)
}

fn parse_row(delimiting: Delimiting, line: &str) -> Result<SubjectRecord, String> {
    let fields = delimiting.split(line);
    let [file_name, title_and_count, ..] = fields.as_slice() else {
        return Err(format!("expected file name and title, got {line:?}"));
    };

    let file_name = file_name.trim();
    thread_key(file_name).map_err(|e| e.to_string())?;
    let (title, response_count) = split_count(title_and_count)?;

    Ok(SubjectRecord {
        file_name: file_name.to_string(),
        title,
        response_count,
    })
}

/// `"Hello (3)"` → `("Hello", 3)`. The count is the last parenthesised group,
/// so titles may contain parentheses of their own.
fn split_count(field: &str) -> Result<(String, u32), String> {
    let trimmed = field.trim_end();
    let inner = trimmed
        .strip_suffix(')')
        .ok_or_else(|| format!("missing response count in {field:?}"))?;
    let open = inner
        .rfind('(')
        .ok_or_else(|| format!("missing response count in {field:?}"))?;
    let count = inner[open + 1..]
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("bad response count in {field:?}: {e}"))?;
    Ok((inner[..open].trim_end().to_string(), count))
}
