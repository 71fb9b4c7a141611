//! Overlay layer configuration.

use serde::{Deserialize, Serialize};

use crate::{A11yResult, Politeness};

/// Transparent 1x1 GIF. An empty `src` renders a broken-image icon in some
/// browsers.
pub const TRANSPARENT_PIXEL: &str =
    "data:image/gif;base64,R0lGODlhAQABAIAAAAAAAP///yH5BAEAAAAALAAAAAABAAEAAAIBRAA7";

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Size {
    /// Create a new size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Configuration shared by every overlay created from one context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Delay between clearing and writing announced text, in milliseconds.
    pub announce_delay_ms: u32,
    /// Extent used when a render node reports no usable local bounds.
    pub fallback_size: Size,
    /// DOM id of the shared live region.
    pub live_region_id: String,
    /// Default politeness of the shared live region.
    pub live_politeness: Politeness,
    /// Image source used by image overlays.
    pub placeholder_src: String,
    /// Render overlays semi-opaque with an outline.
    pub debug_visible: bool,
    /// Progress bar value text. `{percent}` is replaced by the rounded percentage.
    pub progress_template: String,
    /// Streak phrase appended to the progress text. `{streak}` is replaced by the count.
    pub streak_template: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            announce_delay_ms: 100,
            fallback_size: Size::new(100.0, 100.0),
            live_region_id: "a11y-live-announcer".to_string(),
            live_politeness: Politeness::Polite,
            placeholder_src: TRANSPARENT_PIXEL.to_string(),
            debug_visible: false,
            progress_template: "{percent}% complete".to_string(),
            streak_template: "{streak} in a row".to_string(),
        }
    }
}

impl OverlayConfig {
    /// Parse a configuration from JSON. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a field has the wrong type.
    pub fn from_json(json: &str) -> A11yResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Format the progress bar value text.
    #[must_use]
    pub fn progress_text(&self, percent: u8, streak: Option<u32>) -> String {
        let mut text = self
            .progress_template
            .replace("{percent}", &percent.to_string());
        if let Some(streak) = streak.filter(|s| *s > 0) {
            text.push_str(", ");
            text.push_str(&self.streak_template.replace("{streak}", &streak.to_string()));
        }
        text
    }
}
