//! Byte codec for the legacy 8-bit encodings boards serve.
//!
//! Decoding never fails: malformed sequences become U+FFFD. Encoding never
//! fails either: characters the target cannot represent are written as HTML
//! numeric character references (`&#NNNNN;`), which is how the board CGIs
//! expect form data from browsers. Text made only of representable
//! characters round-trips exactly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

/// Encoding tag declared by a board for reading or writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Windows-31J flavoured Shift_JIS.
    ShiftJis,
    EucJp,
    Utf8,
}

impl Encoding {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ShiftJis => "shift_jis",
            Self::EucJp => "euc_jp",
            Self::Utf8 => "utf_8",
        }
    }

    const fn backing(self) -> &'static encoding_rs::Encoding {
        match self {
            Self::ShiftJis => encoding_rs::SHIFT_JIS,
            Self::EucJp => encoding_rs::EUC_JP,
            Self::Utf8 => encoding_rs::UTF_8,
        }
    }

    /// Decode `bytes`, replacing undecodable sequences.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> String {
        self.decode_checked(bytes).0
    }

    /// Decode `bytes` and report whether any replacement happened.
    #[must_use]
    pub fn decode_checked(self, bytes: &[u8]) -> (String, bool) {
        let (text, had_errors) = self.backing().decode_without_bom_handling(bytes);
        (text.into_owned(), had_errors)
    }

    /// Encode `text`, writing unmappable characters as numeric references.
    #[must_use]
    pub fn encode(self, text: &str) -> Vec<u8> {
        let (bytes, _, _) = self.backing().encode(text);
        bytes.into_owned()
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "shift_jis" | "sjis" | "windows_31j" | "cp932" => Ok(Self::ShiftJis),
            "euc_jp" | "eucjp" => Ok(Self::EucJp),
            "utf_8" | "utf8" => Ok(Self::Utf8),
            other => Err(CoreError::UnknownTag {
                kind: "encoding",
                value: other.to_string(),
            }),
        }
    }
}

/// Decode `bytes` using `encoding`.
#[must_use]
pub fn decode(bytes: &[u8], encoding: Encoding) -> String {
    encoding.decode(bytes)
}

/// Encode `text` using `encoding`.
#[must_use]
pub fn encode(text: &str, encoding: Encoding) -> Vec<u8> {
    encoding.encode(text)
}
