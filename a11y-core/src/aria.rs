//! ARIA vocabulary shared by overlays and the announcer.

use serde::{Deserialize, Serialize};

/// Politeness of an `aria-live` region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Politeness {
    /// Updates are not announced.
    Off,
    /// Announced when the user is idle.
    #[default]
    Polite,
    /// Announced immediately, interrupting current speech.
    Assertive,
}

impl Politeness {
    /// The `aria-live` attribute value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Polite => "polite",
            Self::Assertive => "assertive",
        }
    }
}

impl std::fmt::Display for Politeness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Slider orientation, projected as `aria-orientation`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Left to right.
    #[default]
    Horizontal,
    /// Bottom to top.
    Vertical,
}

impl Orientation {
    /// The `aria-orientation` attribute value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }
}
