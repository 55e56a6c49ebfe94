//! Validated configuration structures

use crate::schema::{RawClientConfig, RawConfig, RawServiceConfig};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default minimum password length for new accounts
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 6;

/// Validated configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub service: ServiceConfig,
    pub client: ClientConfig,
}

impl Config {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            service: ServiceConfig::from_raw(raw.service),
            client: ClientConfig::from_raw(raw.client),
        }
    }
}

/// Store service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub socket_path: PathBuf,
    pub data_dir: PathBuf,
    pub min_password_length: usize,
}

impl ServiceConfig {
    fn from_raw(raw: RawServiceConfig) -> Self {
        Self {
            socket_path: raw
                .socket_path
                .unwrap_or_else(bento_util::socket_path_without_env),
            data_dir: raw
                .data_dir
                .unwrap_or_else(bento_util::data_dir_without_env),
            min_password_length: raw
                .min_password_length
                .unwrap_or(DEFAULT_MIN_PASSWORD_LENGTH),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from_raw(RawServiceConfig::default())
    }
}

/// Front-end configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub theme: ThemePreference,
    pub new_task_date: NewTaskDate,
    pub session_file: PathBuf,
}

impl ClientConfig {
    fn from_raw(raw: RawClientConfig) -> Self {
        // Values were checked by validate_config; fall back to defaults anyway
        Self {
            theme: raw
                .theme
                .and_then(|t| t.parse().ok())
                .unwrap_or_default(),
            new_task_date: raw
                .new_task_date
                .and_then(|d| d.parse().ok())
                .unwrap_or_default(),
            session_file: raw
                .session_file
                .unwrap_or_else(bento_util::default_session_file),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_raw(RawClientConfig::default())
    }
}

/// Initial color scheme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThemePreference {
    /// Follow the host environment's preference
    #[default]
    System,
    Dark,
    Light,
}

impl FromStr for ThemePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(Self::System),
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            other => Err(format!("Unknown theme: {}", other)),
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::System => "system",
            Self::Dark => "dark",
            Self::Light => "light",
        };
        f.write_str(s)
    }
}

/// Which day a newly added task is filed under
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NewTaskDate {
    #[default]
    Today,
    Selected,
}

impl FromStr for NewTaskDate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "today" => Ok(Self::Today),
            "selected" => Ok(Self::Selected),
            other => Err(format!("Unknown new_task_date: {}", other)),
        }
    }
}

impl fmt::Display for NewTaskDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Today => "today",
            Self::Selected => "selected",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_preference_parsing() {
        assert_eq!("Dark".parse::<ThemePreference>().unwrap(), ThemePreference::Dark);
        assert_eq!("system".parse::<ThemePreference>().unwrap(), ThemePreference::System);
        assert!("blue".parse::<ThemePreference>().is_err());
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.client.theme, ThemePreference::System);
        assert_eq!(config.client.new_task_date, NewTaskDate::Today);
        assert_eq!(config.service.min_password_length, DEFAULT_MIN_PASSWORD_LENGTH);
        assert!(config.service.socket_path.to_string_lossy().ends_with("bento.sock"));
    }
}
