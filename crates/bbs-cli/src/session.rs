//! Session token lookup: configuration (including `BBSYNC_SESSION__TOKEN`)
//! first, then the token file under the user data directory.

use std::fs;
use std::path::{Path, PathBuf};

use bbs_config::SessionConfig;

const SESSION_FILE_NAME: &str = "session";

/// `<data_dir>/bbsync/session`.
pub fn session_file_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("bbsync").join(SESSION_FILE_NAME))
}

/// The configured token, else the trimmed contents of `file`.
pub fn resolve_token(config: &SessionConfig, file: Option<&Path>) -> Option<String> {
    if config.is_configured() {
        return Some(config.token.trim().to_string());
    }
    let path = file?;
    match fs::read_to_string(path) {
        Ok(contents) => {
            let token = contents.trim();
            (!token.is_empty()).then(|| token.to_string())
        }
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => None,
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "failed to read session file");
            None
        }
    }
}
