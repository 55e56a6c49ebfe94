//! Configuration validation

use crate::schema::RawConfig;
use crate::settings::{NewTaskDate, ThemePreference};
use std::path::Path;
use thiserror::Error;

/// Upper bound for `min_password_length`
pub const MAX_PASSWORD_LENGTH: usize = 1024;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Unknown theme '{0}' (expected system, dark, or light)")]
    UnknownTheme(String),

    #[error("Unknown new_task_date '{0}' (expected today or selected)")]
    UnknownNewTaskDate(String),

    #[error("min_password_length must be between 1 and {max}, got {value}")]
    PasswordLengthOutOfRange { value: usize, max: usize },

    #[error("{field} cannot be empty")]
    EmptyPath { field: &'static str },
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(theme) = &config.client.theme
        && theme.parse::<ThemePreference>().is_err()
    {
        errors.push(ValidationError::UnknownTheme(theme.clone()));
    }

    if let Some(value) = &config.client.new_task_date
        && value.parse::<NewTaskDate>().is_err()
    {
        errors.push(ValidationError::UnknownNewTaskDate(value.clone()));
    }

    if let Some(len) = config.service.min_password_length
        && !(1..=MAX_PASSWORD_LENGTH).contains(&len)
    {
        errors.push(ValidationError::PasswordLengthOutOfRange {
            value: len,
            max: MAX_PASSWORD_LENGTH,
        });
    }

    let paths: [(&'static str, Option<&Path>); 3] = [
        ("service.socket_path", config.service.socket_path.as_deref()),
        ("service.data_dir", config.service.data_dir.as_deref()),
        ("client.session_file", config.client.session_file.as_deref()),
    ];
    for (field, path) in paths {
        if let Some(path) = path
            && path.as_os_str().is_empty()
        {
            errors.push(ValidationError::EmptyPath { field });
        }
    }

    errors
}
