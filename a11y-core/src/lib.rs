//! # A11y Overlay Core
//!
//! Screen reader and keyboard access for canvas-rendered scenes.
//! Mirrors interactive canvas objects with invisible, correctly positioned
//! DOM elements. Engine- and browser-agnostic; the browser backend lives in
//! `a11y-web`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 a11y-core                   │
//! ├─────────────────────────────────────────────┤
//! │  Overlays        │  Host Contracts          │
//! │  - Button        │  - RenderNode            │
//! │  - Text / List   │  - SceneHost             │
//! │  - Image         │  - Scheduler             │
//! │  - Progress      │  - Proxy implementations │
//! │  - Slider        │                          │
//! ├─────────────────────────────────────────────┤
//! │  Lifecycle       │  DOM Projection          │
//! │  - Pause/resume  │  - Dom trait, MemoryDom  │
//! │  - Cleanup stack │  - Transform resolver    │
//! │  - Live region   │  - Focus/keyboard bridge │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod announcer;
pub mod aria;
pub mod config;
pub mod context;
pub mod dom;
pub mod error;
pub mod focus;
pub mod host;
pub mod lifecycle;
pub mod overlay;
pub mod pause;
pub mod proxy;
pub mod schedule;
pub mod transform;

pub use announcer::{Announcer, LiveAnnouncer};
pub use aria::{Orientation, Politeness};
pub use config::{OverlayConfig, Size, TRANSPARENT_PIXEL};
pub use context::OverlayContext;
pub use dom::{Cleanup, Dom, DomEvent, DomEventKind, MemoryDom, MemoryNode, Propagation};
pub use error::{A11yError, A11yResult};
pub use focus::{FocusKeyboardBridge, InteractionCallbacks};
pub use host::{LifecycleEvent, LifecycleSource, RenderNode, SceneHost, SubscriptionId};
pub use lifecycle::{CleanupStack, LifecycleBridge};
pub use overlay::{
    AccessibleOverlay, ButtonOverlay, ImageOverlay, OverlayBase, OverlayId, OverlayOptions,
    ProgressBarOverlay, SliderOptions, SliderOverlay, TextOptions, TextOverlay,
};
pub use pause::{OverlayStatus, PauseSnapshot};
pub use proxy::{EventEmitter, ProxyNode, ProxyScene, SceneStatus};
pub use schedule::{ManualScheduler, Scheduler};
pub use transform::{Affine, Bounds, Placement};

/// Overlay core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
