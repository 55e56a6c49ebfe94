//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Store service settings (used by bentod)
    #[serde(default)]
    pub service: RawServiceConfig,

    /// Front-end settings (used by bento)
    #[serde(default)]
    pub client: RawClientConfig,
}

/// Service-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawServiceConfig {
    /// IPC socket path (default: $XDG_RUNTIME_DIR/bento/bento.sock)
    pub socket_path: Option<PathBuf>,

    /// Data directory holding bento.db
    pub data_dir: Option<PathBuf>,

    /// Minimum accepted password length at registration
    pub min_password_length: Option<usize>,
}

/// Front-end settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawClientConfig {
    /// "system", "dark", or "light"
    pub theme: Option<String>,

    /// Date given to new tasks: "today" or "selected"
    pub new_task_date: Option<String>,

    /// Where the session token is kept between invocations
    pub session_file: Option<PathBuf>,
}
