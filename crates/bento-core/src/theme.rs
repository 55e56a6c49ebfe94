//! Dark/light theme
//!
//! Initialized from the configured preference (falling back to the host's
//! when the preference is `system`) and toggled in memory. Never persisted.

use bento_config::ThemePreference;
use std::fmt;

/// Explicit host override: `dark` or `light`
pub const COLOR_SCHEME_ENV: &str = "BENTO_COLOR_SCHEME";

/// `fg;bg` palette indices exported by many terminals
pub const COLORFGBG_ENV: &str = "COLORFGBG";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    Dark,
    #[default]
    Light,
}

impl Theme {
    /// Resolve a preference; `System` uses `host`, then light
    pub fn from_preference(pref: ThemePreference, host: Option<Theme>) -> Self {
        match pref {
            ThemePreference::Dark => Theme::Dark,
            ThemePreference::Light => Theme::Light,
            ThemePreference::System => host.unwrap_or_default(),
        }
    }

    /// Host preference from the environment
    pub fn detect_host() -> Option<Theme> {
        host_preference(
            std::env::var(COLOR_SCHEME_ENV).ok().as_deref(),
            std::env::var(COLORFGBG_ENV).ok().as_deref(),
        )
    }

    pub fn toggle(&mut self) {
        *self = match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        };
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::Dark)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        })
    }
}

/// Interpret the two host hints. The explicit scheme wins; `COLORFGBG` is
/// dark when its background index is 0-6 or 8.
fn host_preference(color_scheme: Option<&str>, colorfgbg: Option<&str>) -> Option<Theme> {
    match color_scheme.map(|s| s.trim().to_lowercase()).as_deref() {
        Some("dark") => return Some(Theme::Dark),
        Some("light") => return Some(Theme::Light),
        _ => {}
    }

    let bg: u8 = colorfgbg?.rsplit(';').next()?.trim().parse().ok()?;
    Some(if bg <= 6 || bg == 8 { Theme::Dark } else { Theme::Light })
}
