//! Default paths for bento components
//!
//! Paths are user-writable by default:
//! - Socket: `$XDG_RUNTIME_DIR/bento/bento.sock` or `/tmp/bento-$USER/bento.sock`
//! - Data: `$XDG_DATA_HOME/bento` or `~/.local/share/bento`
//! - State (session file): `$XDG_STATE_HOME/bento` or `~/.local/state/bento`
//! - Config: `$XDG_CONFIG_HOME/bento/config.toml` or `~/.config/bento/config.toml`

use std::path::PathBuf;

/// Environment variable for overriding the socket path
pub const BENTO_SOCKET_ENV: &str = "BENTO_SOCKET";

/// Environment variable for overriding the data directory
pub const BENTO_DATA_DIR_ENV: &str = "BENTO_DATA_DIR";

/// Environment variable for overriding the config file
pub const BENTO_CONFIG_ENV: &str = "BENTO_CONFIG";

const SOCKET_FILENAME: &str = "bento.sock";
const SESSION_FILENAME: &str = "session";
const CONFIG_FILENAME: &str = "config.toml";

/// Application subdirectory name
const APP_DIR: &str = "bento";

/// Get the default socket path.
///
/// Order of precedence:
/// 1. `$BENTO_SOCKET` environment variable (if set)
/// 2. `$XDG_RUNTIME_DIR/bento/bento.sock` (if XDG_RUNTIME_DIR is set)
/// 3. `/tmp/bento-$USER/bento.sock` (fallback)
pub fn default_socket_path() -> PathBuf {
    if let Ok(path) = std::env::var(BENTO_SOCKET_ENV) {
        return PathBuf::from(path);
    }

    socket_path_without_env()
}

/// Get the socket path without checking BENTO_SOCKET.
/// Used for config defaults where the env var is checked separately.
pub fn socket_path_without_env() -> PathBuf {
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        return PathBuf::from(runtime_dir).join(APP_DIR).join(SOCKET_FILENAME);
    }

    let username = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
    PathBuf::from(format!("/tmp/{}-{}", APP_DIR, username)).join(SOCKET_FILENAME)
}

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$BENTO_DATA_DIR` environment variable (if set)
/// 2. `$XDG_DATA_HOME/bento` (if XDG_DATA_HOME is set)
/// 3. `~/.local/share/bento` (fallback)
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(BENTO_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    data_dir_without_env()
}

/// Get the data directory without checking BENTO_DATA_DIR.
pub fn data_dir_without_env() -> PathBuf {
    xdg_dir("XDG_DATA_HOME", &[".local", "share"], "data")
}

/// Directory for client-side state such as the saved session token
pub fn default_state_dir() -> PathBuf {
    xdg_dir("XDG_STATE_HOME", &[".local", "state"], "state")
}

/// File holding the session token between front-end invocations
pub fn default_session_file() -> PathBuf {
    default_state_dir().join(SESSION_FILENAME)
}

/// Get the default config file path.
///
/// Order of precedence:
/// 1. `$BENTO_CONFIG` environment variable (if set)
/// 2. `$XDG_CONFIG_HOME/bento/config.toml`
/// 3. `~/.config/bento/config.toml`
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(BENTO_CONFIG_ENV) {
        return PathBuf::from(path);
    }

    xdg_dir("XDG_CONFIG_HOME", &[".config"], "config").join(CONFIG_FILENAME)
}

fn xdg_dir(xdg_var: &str, home_fallback: &[&str], last_resort: &str) -> PathBuf {
    if let Ok(dir) = std::env::var(xdg_var) {
        return PathBuf::from(dir).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        let mut path = PathBuf::from(home);
        for part in home_fallback {
            path.push(part);
        }
        return path.join(APP_DIR);
    }

    PathBuf::from("/tmp").join(APP_DIR).join(last_resort)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_path_contains_bento() {
        let path = socket_path_without_env();
        assert!(path.to_string_lossy().contains("bento"));
        assert!(path.to_string_lossy().ends_with(".sock"));
    }

    #[test]
    fn data_dir_contains_bento() {
        let path = data_dir_without_env();
        assert!(path.to_string_lossy().contains("bento"));
    }

    #[test]
    fn session_file_lives_in_state_dir() {
        let file = default_session_file();
        assert_eq!(file.parent().unwrap(), default_state_dir());
    }
}
