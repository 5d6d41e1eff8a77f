//! Access-token resolution and storage.
//!
//! Resolution order matches the CLI tooling around this API: the
//! `WEALTHBOX_ACCESS_TOKEN` environment variable, then a `.env` file in the
//! current directory, then `~/.config/wealthbox/credentials.json`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// The environment variable holding the access token.
pub const TOKEN_ENV_VAR: &str = "WEALTHBOX_ACCESS_TOKEN";

#[derive(Debug, Serialize, Deserialize)]
struct Credentials {
    access_token: String,
}

/// Path of the credentials file, `~/.config/wealthbox/credentials.json`.
pub fn credentials_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| {
        home.join(".config")
            .join("wealthbox")
            .join("credentials.json")
    })
}

/// Load the access token, or `None` if no source provides one.
pub fn load_token() -> Option<String> {
    if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
        if !token.is_empty() {
            return Some(token);
        }
    }

    if let Some(token) = token_from_env_file(Path::new(".env")) {
        debug!("loaded access token from .env");
        return Some(token);
    }

    let path = credentials_path()?;
    let token = token_from_credentials_file(&path)?;
    debug!(path = %path.display(), "loaded access token from credentials file");
    Some(token)
}

/// Save the token to the credentials file, creating parent directories.
///
/// On Unix the file is restricted to mode 0600.
pub fn save_token(token: &str) -> io::Result<PathBuf> {
    let path = credentials_path().ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "cannot determine home directory")
    })?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let credentials = Credentials {
        access_token: token.to_string(),
    };
    fs::write(&path, serde_json::to_string(&credentials)?)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(path)
}

fn token_from_env_file(path: &Path) -> Option<String> {
    let vars = dotenv::from_path_iter(path).ok()?;
    for (key, value) in vars.flatten() {
        if key == TOKEN_ENV_VAR && !value.is_empty() {
            return Some(value);
        }
    }
    None
}

fn token_from_credentials_file(path: &Path) -> Option<String> {
    let contents = fs::read_to_string(path).ok()?;
    let credentials: Credentials = serde_json::from_str(&contents).ok()?;
    if credentials.access_token.is_empty() {
        None
    } else {
        Some(credentials.access_token)
    }
}
