//! Preference and appearance types, and the pure resolution between them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParsePreferenceError;

/// The appearance actually displayed.
///
/// Always derived from a [`Preference`] and the system signal; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Appearance {
    Light,
    Dark,
}

impl Appearance {
    /// Returns the other appearance.
    pub fn opposite(self) -> Self {
        match self {
            Appearance::Light => Appearance::Dark,
            Appearance::Dark => Appearance::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Appearance::Dark)
    }

    /// Maps a "system prefers dark" signal to an appearance.
    pub fn from_signal(prefers_dark: bool) -> Self {
        if prefers_dark {
            Appearance::Dark
        } else {
            Appearance::Light
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Appearance::Light => "light",
            Appearance::Dark => "dark",
        }
    }
}

impl fmt::Display for Appearance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user's stored intent for display appearance.
///
/// `System` follows the host's dark-mode signal; the other two are explicit
/// choices that system changes never override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preference {
    Light,
    Dark,
    #[default]
    System,
}

impl Preference {
    /// All preferences, in picker order.
    pub const ALL: [Self; 3] = [Self::Light, Self::Dark, Self::System];

    /// Resolves this preference against the system signal.
    pub fn resolve(self, system_prefers_dark: bool) -> Appearance {
        resolve(self, system_prefers_dark)
    }

    /// True for `Light` and `Dark`.
    pub fn is_explicit(self) -> bool {
        !matches!(self, Preference::System)
    }

    /// The value written to the preference store.
    pub fn as_str(self) -> &'static str {
        match self {
            Preference::Light => "light",
            Preference::Dark => "dark",
            Preference::System => "system",
        }
    }

    /// Human-readable label for settings pickers.
    pub fn label(self) -> &'static str {
        match self {
            Preference::Light => "Light",
            Preference::Dark => "Dark",
            Preference::System => "System",
        }
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preference {
    type Err = ParsePreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Preference::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParsePreferenceError::new(s))
    }
}

impl From<Appearance> for Preference {
    fn from(appearance: Appearance) -> Self {
        match appearance {
            Appearance::Light => Preference::Light,
            Appearance::Dark => Preference::Dark,
        }
    }
}

/// Resolves a preference against the "system prefers dark" signal.
///
/// Explicit preferences win; `System` maps the signal to an appearance.
///
/// # Example
///
/// ```rust
/// use shade::{resolve, Appearance, Preference};
///
/// assert_eq!(resolve(Preference::Light, true), Appearance::Light);
/// assert_eq!(resolve(Preference::System, true), Appearance::Dark);
/// ```
pub fn resolve(preference: Preference, system_prefers_dark: bool) -> Appearance {
    match preference {
        Preference::Light => Appearance::Light,
        Preference::Dark => Appearance::Dark,
        Preference::System => Appearance::from_signal(system_prefers_dark),
    }
}
