//! Board identity and per-variant endpoint derivation.
//!
//! A [`Board`] is immutable: a refreshed board list replaces it wholesale.
//! All endpoint URLs are derived from the server root, the short id, and
//! (for variant B) the directory segment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::codec::Encoding;
use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// BoardVariant
// ---------------------------------------------------------------------------

/// Protocol family a board speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BoardVariant {
    /// 5-field content, 2-field listing, Shift_JIS, byte-ranged `.dat` files.
    #[default]
    Classic,
    /// 7-field content from an `offlaw.cgi` endpoint, Shift_JIS.
    VariantA,
    /// 7-field content from a `rawmode.cgi` endpoint under a directory
    /// segment, EUC-JP, no byte ranges.
    VariantB,
    /// Classic wire format served as UTF-8.
    VariantC,
}

impl BoardVariant {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::VariantA => "variant_a",
            Self::VariantB => "variant_b",
            Self::VariantC => "variant_c",
        }
    }

    /// Encoding the variant declares when a board does not override it.
    #[must_use]
    pub const fn default_encoding(self) -> Encoding {
        match self {
            Self::Classic | Self::VariantA => Encoding::ShiftJis,
            Self::VariantB => Encoding::EucJp,
            Self::VariantC => Encoding::Utf8,
        }
    }

    /// Whether content lines carry an explicit ordinal and trailing poster id.
    #[must_use]
    pub const fn has_seven_field_content(self) -> bool {
        matches!(self, Self::VariantA | Self::VariantB)
    }

    /// Whether the content endpoint honours `Range: bytes=N-`.
    #[must_use]
    pub const fn supports_byte_range(self) -> bool {
        !matches!(self, Self::VariantB)
    }

    /// Whether the board URL carries a directory segment before the id.
    #[must_use]
    pub const fn uses_directory(self) -> bool {
        matches!(self, Self::VariantB)
    }
}

impl fmt::Display for BoardVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoardVariant {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "classic" => Ok(Self::Classic),
            "variant_a" | "a" => Ok(Self::VariantA),
            "variant_b" | "b" => Ok(Self::VariantB),
            "variant_c" | "c" => Ok(Self::VariantC),
            other => Err(CoreError::UnknownTag {
                kind: "board variant",
                value: other.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// Identity of one forum section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub title: String,
    /// Canonical URL, always ending in `/`.
    pub url: String,
    /// Short id, the last path segment of the URL.
    pub id: String,
    /// `scheme://host[:port]` without a trailing slash.
    pub server_root: String,
    pub variant: BoardVariant,
    /// Variant-specific directory segment (variant B only).
    pub directory: Option<String>,
    pub read_encoding: Encoding,
    pub write_encoding: Encoding,
}

impl Board {
    /// Build a board from its URL.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidBoardUrl`] if the URL does not parse, has
    /// no host, or lacks the segments the variant needs.
    pub fn from_url(
        title: impl Into<String>,
        url: &str,
        variant: BoardVariant,
    ) -> Result<Self, CoreError> {
        let invalid = |reason: &str| CoreError::InvalidBoardUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let parsed = url::Url::parse(url).map_err(|e| invalid(&e.to_string()))?;
        if parsed.host_str().is_none() {
            return Err(invalid("missing host"));
        }
        let server_root = parsed.origin().ascii_serialization();

        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        let (directory, id) = match segments.as_slice() {
            [] => return Err(invalid("missing board segment")),
            [id] if variant.uses_directory() => {
                return Err(invalid(&format!(
                    "{variant} boards need a directory segment before '{id}'"
                )));
            }
            [.., dir, id] if variant.uses_directory() => {
                (Some((*dir).to_string()), (*id).to_string())
            }
            [.., id] => (None, (*id).to_string()),
        };

        let canonical = match &directory {
            Some(dir) => format!("{server_root}/{dir}/{id}/"),
            None => format!("{server_root}/{id}/"),
        };

        let encoding = variant.default_encoding();
        Ok(Self {
            title: title.into(),
            url: canonical,
            id,
            server_root,
            variant,
            directory,
            read_encoding: encoding,
            write_encoding: encoding,
        })
    }

    /// Override the declared read and write encodings.
    #[must_use]
    pub const fn with_encodings(mut self, read: Encoding, write: Encoding) -> Self {
        self.read_encoding = read;
        self.write_encoding = write;
        self
    }

    /// Subject listing URL.
    #[must_use]
    pub fn subject_url(&self) -> String {
        format!("{}subject.txt", self.url)
    }

    /// Live-tier content URL for a thread file name.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidFileName`] if `file_name` has no numeric key.
    pub fn content_url(&self, file_name: &str) -> Result<String, CoreError> {
        let key = thread_key(file_name)?;
        Ok(match self.variant {
            BoardVariant::Classic | BoardVariant::VariantC => {
                format!("{}/{}/dat/{key}.dat", self.server_root, self.id)
            }
            BoardVariant::VariantA => {
                format!("{}/bbs/offlaw.cgi/2/{}/{key}/", self.server_root, self.id)
            }
            BoardVariant::VariantB => format!(
                "{}/bbs/rawmode.cgi/{}/{}/{key}/",
                self.server_root,
                self.directory.as_deref().unwrap_or_default(),
                self.id
            ),
        })
    }

    /// Submission endpoint. `thread_key` is `None` for a new thread.
    #[must_use]
    pub fn post_url(&self, thread_key: Option<&str>) -> String {
        match self.variant {
            BoardVariant::Classic | BoardVariant::VariantC => {
                format!("{}/test/bbs.cgi", self.server_root)
            }
            BoardVariant::VariantA => format!("{}/bbs/write.cgi", self.server_root),
            BoardVariant::VariantB => format!(
                "{}/bbs/write.cgi/{}/{}/{}/",
                self.server_root,
                self.directory.as_deref().unwrap_or_default(),
                self.id,
                thread_key.unwrap_or("new")
            ),
        }
    }

    /// File name the board's listing uses for a thread key.
    #[must_use]
    pub fn file_name_for(&self, key: &str) -> String {
        match self.variant {
            BoardVariant::VariantB => format!("{key}.cgi"),
            _ => format!("{key}.dat"),
        }
    }
}

/// Numeric key embedded in a thread file name (`1234567890.dat` → `1234567890`).
///
/// The key doubles as the thread's creation timestamp.
///
/// # Errors
///
/// Returns [`CoreError::InvalidFileName`] if the stem is empty or not all digits.
pub fn thread_key(file_name: &str) -> Result<&str, CoreError> {
    let stem = file_name.split('.').next().unwrap_or_default();
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoreError::InvalidFileName(file_name.to_string()));
    }
    Ok(stem)
}
