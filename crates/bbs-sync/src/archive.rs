//! Archive-tier candidates for threads that left the live tier.
//!
//! Tried in order: the authenticated endpoint (only with a session token),
//! then plain and gzip copies under the board's `kako/` tree. The tree shape
//! depends on the key's digit count:
//!
//! ```text
//! 10 digits  {root}/{id}/kako/{key[..4]}/{key[..5]}/{key}.dat[.gz]
//!  9 digits  {root}/{id}/kako/{key[..3]}/{key}.dat[.gz]
//! ```

use std::io::Read;

use bbs_core::Board;
use flate2::read::GzDecoder;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// One archive URL to try.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub url: String,
    /// `url` with any session token masked, for logs and diagnostics.
    pub display_url: String,
    pub authenticated: bool,
}

impl Candidate {
    fn plain(url: String) -> Self {
        Self {
            display_url: url.clone(),
            url,
            authenticated: false,
        }
    }
}

/// Candidates for `key` in the order they should be tried.
#[must_use]
pub fn candidates(board: &Board, key: &str, token: Option<&str>) -> Vec<Candidate> {
    let root = &board.server_root;
    let id = &board.id;
    let mut out = Vec::with_capacity(5);

    if let Some(token) = token.filter(|t| !t.is_empty()) {
        let base = format!("{root}/test/offlaw2.so?shiro=kuma&bbs={id}&key={key}&sid=");
        out.push(Candidate {
            url: format!("{base}{token}"),
            display_url: format!("{base}***"),
            authenticated: true,
        });
    }

    let stem = match key.len() {
        10 => Some(format!("{root}/{id}/kako/{}/{}/{key}", &key[..4], &key[..5])),
        9 => Some(format!("{root}/{id}/kako/{}/{key}", &key[..3])),
        _ => None,
    };
    if let Some(stem) = stem {
        out.push(Candidate::plain(format!("{stem}.dat")));
        out.push(Candidate::plain(format!("{stem}.dat.gz")));
    }
    out
}

/// Turn a candidate's successful body into raw content bytes.
///
/// # Errors
///
/// Returns a diagnostic if the authenticated endpoint reports an error or a
/// gzip body does not inflate.
pub fn unpack(candidate: &Candidate, body: Vec<u8>) -> Result<Vec<u8>, String> {
    let body = if body.starts_with(&GZIP_MAGIC) {
        inflate(&body)?
    } else {
        body
    };

    if !candidate.authenticated {
        return Ok(body);
    }
    if body.starts_with(b"-ERR") {
        let line_end = body.iter().position(|&b| b == b'\n').unwrap_or(body.len());
        return Err(String::from_utf8_lossy(&body[..line_end]).trim().to_string());
    }
    if body.starts_with(b"+OK") {
        let content_start = body
            .iter()
            .position(|&b| b == b'\n')
            .map_or(body.len(), |i| i + 1);
        return Ok(body[content_start..].to_vec());
    }
    Ok(body)
}

fn inflate(bytes: &[u8]) -> Result<Vec<u8>, String> {
    let mut out = Vec::with_capacity(bytes.len() * 4);
    GzDecoder::new(bytes)
        .read_to_end(&mut out)
        .map_err(|e| format!("gzip: {e}"))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bbs_core::BoardVariant;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn board() -> Board {
        Board::from_url("n", "https://news.example.net/newsplus/", BoardVariant::Classic).unwrap()
    }

    fn urls(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.url.as_str()).collect()
    }

    #[test]
    fn ten_digit_keys_use_two_level_tree() {
        assert_eq!(
            urls(&candidates(&board(), "1234567890", None)),
            [
                "https://news.example.net/newsplus/kako/1234/12345/1234567890.dat",
                "https://news.example.net/newsplus/kako/1234/12345/1234567890.dat.gz",
            ]
        );
    }

    #[test]
    fn nine_digit_keys_use_one_level_tree() {
        assert_eq!(
            urls(&candidates(&board(), "987654321", None)),
            [
                "https://news.example.net/newsplus/kako/987/987654321.dat",
                "https://news.example.net/newsplus/kako/987/987654321.dat.gz",
            ]
        );
    }

    #[test]
    fn token_adds_masked_authenticated_candidate_first() {
        let list = candidates(&board(), "1234567890", Some("SECRET"));
        assert_eq!(list.len(), 3);
        assert!(list[0].authenticated);
        assert_eq!(
            list[0].url,
            "https://news.example.net/test/offlaw2.so?shiro=kuma&bbs=newsplus&key=1234567890&sid=SECRET"
        );
        assert!(!list[0].display_url.contains("SECRET"));
        assert!(candidates(&board(), "1234567890", Some("")).iter().all(|c| !c.authenticated));
    }

    #[test]
    fn other_key_lengths_have_no_derived_shapes() {
        assert!(candidates(&board(), "12345", None).is_empty());
    }

    #[test]
    fn gzip_bodies_are_inflated() {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(b"a<>b<>c<>d<>e\n").unwrap();
        let gz = enc.finish().unwrap();
        let cand = Candidate::plain("u.dat.gz".into());
        assert_eq!(unpack(&cand, gz).unwrap(), b"a<>b<>c<>d<>e\n");
    }

    #[test]
    fn authenticated_status_lines() {
        let cand = &candidates(&board(), "1234567890", Some("t"))[0];
        assert_eq!(
            unpack(cand, b"+OK 123/456K\na<>b<>c<>d<>e\n".to_vec()).unwrap(),
            b"a<>b<>c<>d<>e\n"
        );
        assert_eq!(
            unpack(cand, b"-ERR session expired\n".to_vec()).unwrap_err(),
            "-ERR session expired"
        );
    }
}
