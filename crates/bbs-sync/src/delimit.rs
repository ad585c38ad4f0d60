//! Field splitting shared by listing and content parsers.
//!
//! Current servers separate fields with `<>`. Old servers used commas, with
//! literal commas in text written as the full-width `，`. A document is
//! classified once from its first non-blank line and every line is split the
//! same way.

/// Primary two-character field delimiter.
pub const PRIMARY: &str = "<>";

const ESCAPED_PRIMARY: &str = "&lt;&gt;";
const FULL_WIDTH_COMMA: char = '，';

/// How a document's lines separate their fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiting {
    Primary,
    LegacyComma,
}

impl Delimiting {
    /// Classify a document by its first non-blank line.
    #[must_use]
    pub fn detect(text: &str) -> Self {
        match text.lines().find(|l| !l.trim().is_empty()) {
            Some(line) if !line.contains(PRIMARY) => Self::LegacyComma,
            _ => Self::Primary,
        }
    }

    /// Split one line into its fields.
    #[must_use]
    pub fn split(self, line: &str) -> Vec<String> {
        match self {
            Self::Primary => line.split(PRIMARY).map(str::to_string).collect(),
            Self::LegacyComma => line
                .replace(PRIMARY, ESCAPED_PRIMARY)
                .replace(',', PRIMARY)
                .split(PRIMARY)
                .map(|f| f.replace(FULL_WIDTH_COMMA, ","))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn detects_by_first_non_blank_line() {
        assert_eq!(Delimiting::detect("\n1.dat<>t (1)\n"), Delimiting::Primary);
        assert_eq!(Delimiting::detect("1.cgi,t(1)\n"), Delimiting::LegacyComma);
        assert_eq!(Delimiting::detect(""), Delimiting::Primary);
    }

    #[test]
    fn primary_split_keeps_empty_fields() {
        assert_eq!(
            Delimiting::Primary.split("a<><>c"),
            ["a", "", "c"]
        );
    }

    #[test]
    fn legacy_split_restores_commas_and_escapes_brackets() {
        assert_eq!(
            Delimiting::LegacyComma.split("name,mail,date,1，000 <> yen,"),
            ["name", "mail", "date", "1,000 &lt;&gt; yen", ""]
        );
    }
}
