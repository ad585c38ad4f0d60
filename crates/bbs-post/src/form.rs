//! Form field sets and body encoding.
//!
//! Field names differ per board variant:
//!
//! | Variant         | Fields                                                              |
//! |-----------------|---------------------------------------------------------------------|
//! | Classic, C      | `bbs`, `key`/`subject`, `time`, `FROM`, `mail`, `MESSAGE`, `submit` (+ `sid`) |
//! | A               | `BBS`, `KEY`/`SUBJECT`, `TIME`, `NAME`, `MAIL`, `MESSAGE`, `submit` |
//! | B               | `DIR`, `BBS`, `KEY`/`SUBJECT`, `TIME`, `NAME`, `MAIL`, `MESSAGE`, `submit` |
//!
//! Values are encoded in the board's write encoding, then percent-escaped.
//! Only `0-9 A-Z a-z * - . _` pass through; every other byte, space
//! included, becomes `%XX` with uppercase hex.

use bbs_core::entities::{FormFields, PostAttempt};
use bbs_core::{BoardVariant, Encoding};

const SUBMIT_REPLY: &str = "書き込む";
const SUBMIT_NEW_THREAD: &str = "新規スレッド作成";

/// Caller-supplied fields for an attempt, in wire order.
#[must_use]
pub fn fields_for(attempt: &PostAttempt, token: Option<&str>, time: i64) -> FormFields {
    let board = &attempt.board;
    let time = time.to_string();
    let mut fields = FormFields::new();

    let (key_name, subject_name, time_name, name_name, mail_name) = match board.variant {
        BoardVariant::Classic | BoardVariant::VariantC => ("key", "subject", "time", "FROM", "mail"),
        BoardVariant::VariantA | BoardVariant::VariantB => ("KEY", "SUBJECT", "TIME", "NAME", "MAIL"),
    };

    match board.variant {
        BoardVariant::Classic | BoardVariant::VariantC => fields.insert("bbs", &board.id),
        BoardVariant::VariantA => fields.insert("BBS", &board.id),
        BoardVariant::VariantB => {
            fields.insert("DIR", board.directory.as_deref().unwrap_or_default());
            fields.insert("BBS", &board.id);
        }
    }

    match (&attempt.thread_key, &attempt.subject) {
        (Some(key), _) => fields.insert(key_name, key),
        (None, subject) => fields.insert(subject_name, subject.as_deref().unwrap_or_default()),
    }
    fields.insert(time_name, time);
    fields.insert(name_name, &attempt.author);
    fields.insert(mail_name, &attempt.contact);
    fields.insert("MESSAGE", &attempt.body);
    fields.insert(
        "submit",
        if attempt.is_new_thread() {
            SUBMIT_NEW_THREAD
        } else {
            SUBMIT_REPLY
        },
    );

    if matches!(board.variant, BoardVariant::Classic | BoardVariant::VariantC)
        && let Some(token) = token.filter(|t| !t.is_empty())
    {
        fields.insert("sid", token);
    }
    fields
}

/// `name=value&...` with names and values in `encoding`.
#[must_use]
pub fn encode_form(fields: &FormFields, encoding: Encoding) -> String {
    fields
        .iter()
        .map(|(name, value)| {
            format!(
                "{}={}",
                percent_encode(&encoding.encode(name)),
                percent_encode(&encoding.encode(value))
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Escape every byte outside `0-9 A-Z a-z * - . _`.
#[must_use]
pub fn percent_encode(bytes: &[u8]) -> String {
    // The form serializer leaves exactly that set alone and writes a space
    // as `+`; a literal `+` is already `%2B`, so swapping back is exact.
    url::form_urlencoded::byte_serialize(bytes)
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bbs_core::Board;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn names(fields: &FormFields) -> Vec<&str> {
        fields.iter().map(|(n, _)| n).collect()
    }

    #[rstest]
    #[case(b"AZaz09*-._", "AZaz09*-._")]
    #[case(b"a b", "a%20b")]
    #[case(b"a+b&c=d", "a%2Bb%26c%3Dd")]
    #[case(b"~!/", "%7E%21%2F")]
    #[case(&[0x82, 0xa0, 0x0a], "%82%A0%0A")]
    fn percent_encoding(#[case] input: &[u8], #[case] expected: &str) {
        assert_eq!(percent_encode(input), expected);
    }

    #[test]
    fn classic_reply_fields_with_session() {
        let board =
            Board::from_url("n", "https://news.example.net/newsplus/", BoardVariant::Classic).unwrap();
        let attempt = PostAttempt::reply(board, "1234567890", "body").with_contact("sage");
        let fields = fields_for(&attempt, Some("tok"), 1_700_000_000);
        assert_eq!(
            names(&fields),
            ["bbs", "key", "time", "FROM", "mail", "MESSAGE", "submit", "sid"]
        );
        assert_eq!(fields.get("key"), Some("1234567890"));
        assert_eq!(fields.get("time"), Some("1700000000"));
        assert_eq!(fields.get("mail"), Some("sage"));
    }

    #[test]
    fn variant_a_new_thread_fields() {
        let board =
            Board::from_url("t", "https://town.example.jp/tokyo/", BoardVariant::VariantA).unwrap();
        let attempt = PostAttempt::new_thread(board, "subject", "body");
        let fields = fields_for(&attempt, Some("ignored"), 1);
        assert_eq!(
            names(&fields),
            ["BBS", "SUBJECT", "TIME", "NAME", "MAIL", "MESSAGE", "submit"]
        );
        assert_eq!(fields.get("submit"), Some(SUBMIT_NEW_THREAD));
    }

    #[test]
    fn variant_b_carries_directory() {
        let board =
            Board::from_url("g", "https://jbbs.example.org/game/12345/", BoardVariant::VariantB)
                .unwrap();
        let attempt = PostAttempt::reply(board, "1600000000", "body");
        let fields = fields_for(&attempt, None, 1);
        assert_eq!(
            names(&fields),
            ["DIR", "BBS", "KEY", "TIME", "NAME", "MAIL", "MESSAGE", "submit"]
        );
        assert_eq!(fields.get("DIR"), Some("game"));
        assert_eq!(fields.get("BBS"), Some("12345"));
    }

    #[test]
    fn body_uses_write_encoding() {
        let fields: FormFields = [("MESSAGE", "あ い")].into_iter().collect();
        assert_eq!(encode_form(&fields, Encoding::ShiftJis), "MESSAGE=%82%A0%20%82%A2");
        assert_eq!(encode_form(&fields, Encoding::Utf8), "MESSAGE=%E3%81%82%20%E3%81%84");
    }
}
