//! Pause-time state snapshots.

use serde::{Deserialize, Serialize};

/// Overlay state captured when the host scene pauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseSnapshot {
    /// Explicit disabled flag before the pause.
    pub disabled: bool,
    /// Hidden flag before the pause.
    pub hidden: bool,
    /// Whether the element was the active element.
    pub had_focus: bool,
}

/// Single-slot snapshot holder.
///
/// Holds at most one snapshot: a second capture while one is held is
/// ignored, so repeated pause signals never overwrite the pre-pause state
/// with the forced-hidden state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PauseState {
    snapshot: Option<PauseSnapshot>,
}

impl PauseState {
    /// Store `snapshot` unless one is already held. Returns whether it was stored.
    pub fn capture(&mut self, snapshot: PauseSnapshot) -> bool {
        if self.snapshot.is_some() {
            return false;
        }
        self.snapshot = Some(snapshot);
        true
    }

    /// Remove and return the held snapshot.
    pub fn take(&mut self) -> Option<PauseSnapshot> {
        self.snapshot.take()
    }

    /// Whether a snapshot is held.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.snapshot.is_some()
    }

    /// The held snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Option<&PauseSnapshot> {
        self.snapshot.as_ref()
    }

    /// Record an explicit change made while paused, to be applied on resume.
    pub fn defer(&mut self, update: impl FnOnce(&mut PauseSnapshot)) -> bool {
        match self.snapshot.as_mut() {
            Some(snapshot) => {
                update(snapshot);
                true
            }
            None => false,
        }
    }

    /// Drop any held snapshot.
    pub fn clear(&mut self) {
        self.snapshot = None;
    }
}

/// Where an overlay is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayStatus {
    /// Visible to assistive technology and operable.
    Active,
    /// Hidden from assistive technology (and therefore not focusable).
    Hidden,
    /// Visible but not operable.
    Disabled,
    /// Force-hidden while the host scene is paused.
    Paused,
    /// Torn down; terminal.
    Destroyed,
}

#[cfg(test)]
mod tests {
    use super::*;

    const VISIBLE_FOCUSED: PauseSnapshot = PauseSnapshot {
        disabled: false,
        hidden: false,
        had_focus: true,
    };

    #[test]
    fn capture_is_single_slot() {
        let mut state = PauseState::default();
        assert!(state.capture(VISIBLE_FOCUSED));
        assert!(!state.capture(PauseSnapshot {
            disabled: true,
            hidden: true,
            had_focus: false,
        }));
        assert_eq!(state.take(), Some(VISIBLE_FOCUSED));
        assert!(!state.is_paused());
        assert_eq!(state.take(), None);
    }

    #[test]
    fn defer_only_while_paused() {
        let mut state = PauseState::default();
        assert!(!state.defer(|s| s.disabled = true));

        state.capture(VISIBLE_FOCUSED);
        assert!(state.defer(|s| s.disabled = true));
        assert_eq!(state.snapshot().map(|s| s.disabled), Some(true));

        state.clear();
        assert!(state.snapshot().is_none());
    }
}
