//! Clock utilities for bento
//!
//! "Today" drives the default calendar selection and the date of new tasks,
//! so every component reads the wall clock through [`now`].
//!
//! # Mock Time for Development
//!
//! In debug builds, the `BENTO_MOCK_TIME` environment variable overrides the
//! system time. Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2024-01-01 09:00:00`).
//!
//! ```bash
//! BENTO_MOCK_TIME="2024-01-01 09:00:00" bento show
//! ```

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::sync::OnceLock;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "BENTO_MOCK_TIME";

/// Offset between mock time and real time, captured once per process so
/// mock time advances naturally.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            if let Ok(mock_time_str) = std::env::var(MOCK_TIME_ENV_VAR) {
                return parse_mock_offset(&mock_time_str, Local::now());
            }
            None
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

#[cfg_attr(not(debug_assertions), allow(dead_code))]
fn parse_mock_offset(mock_time_str: &str, real_now: DateTime<Local>) -> Option<chrono::Duration> {
    let Ok(naive_dt) = NaiveDateTime::parse_from_str(mock_time_str, "%Y-%m-%d %H:%M:%S") else {
        tracing::warn!(
            mock_time = %mock_time_str,
            expected_format = "%Y-%m-%d %H:%M:%S",
            "Invalid mock time format"
        );
        return None;
    };

    match Local.from_local_datetime(&naive_dt).single() {
        Some(mock_dt) => {
            let offset = mock_dt.signed_duration_since(real_now);
            tracing::info!(
                mock_time = %mock_time_str,
                offset_secs = offset.num_seconds(),
                "Mock time enabled"
            );
            Some(offset)
        }
        None => {
            tracing::warn!(mock_time = %mock_time_str, "Failed to convert mock time to local timezone");
            None
        }
    }
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Get the current local time, respecting mock time in debug builds.
pub fn now() -> DateTime<Local> {
    let real_now = Local::now();

    match get_mock_time_offset() {
        Some(offset) => real_now + offset,
        None => real_now,
    }
}

/// Format a timestamp for logs and listings
pub fn format_datetime_full(dt: &DateTime<Local>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}
