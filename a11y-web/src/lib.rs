//! # A11y Overlay WASM Bindings
//!
//! Browser backend for `a11y-core`: a `web-sys` document, `setTimeout`
//! scheduling, and JS classes for scenes, render nodes and overlays.
//!
//! ## Usage
//!
//! Build for WASM:
//! ```bash
//! wasm-pack build --target web a11y-web
//! ```
//!
//! Then mirror canvas objects from JavaScript:
//! ```javascript
//! import init, { A11yLayer, SceneHandle, NodeHandle } from './pkg/a11y_web.js';
//!
//! await init();
//! const layer = new A11yLayer('canvas-wrapper', null);
//! const scene = new SceneHandle();
//! const node = new NodeHandle(150, 80, 120, 40);
//! const play = layer.createButton(scene, node, 'Play', {
//!     onKeyDown: () => sprite.setPressed(true),
//!     onKeyUp: () => startGame(),
//! });
//!
//! // Each frame, after moving the sprite:
//! node.setTransform(1, 0, 0, 1, sprite.x, sprite.y);
//! play.updatePosition();
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod dom;
pub mod timer;

use std::rc::Rc;

use a11y_core::{
    A11yError, AccessibleOverlay, Affine, Bounds, ButtonOverlay, ImageOverlay,
    InteractionCallbacks, Orientation, OverlayConfig, OverlayContext, OverlayOptions,
    Politeness, ProgressBarOverlay, ProxyNode, ProxyScene, RenderNode, SceneHost, SceneStatus,
    SliderOptions, SliderOverlay, TextOptions, TextOverlay,
};
use js_sys::Function;
use serde::Deserialize;
use tracing::warn;
use wasm_bindgen::prelude::*;

pub use dom::WebDom;
pub use timer::TimeoutScheduler;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init_wasm() {
    console_error_panic_hook::set_once();
    tracing::info!("A11y overlay WASM initialized");
}

fn to_js(err: &A11yError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Look up `name` on a JS callbacks object.
fn js_function(callbacks: &JsValue, name: &str) -> Option<Function> {
    if !callbacks.is_object() {
        return None;
    }
    js_sys::Reflect::get(callbacks, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<Function>()
        .ok()
}

fn call_logged(function: &Function, name: &str, arg: Option<&JsValue>) {
    let result = match arg {
        Some(arg) => function.call1(&JsValue::NULL, arg),
        None => function.call0(&JsValue::NULL),
    };
    if let Err(e) = result {
        warn!("{} callback threw: {:?}", name, e);
    }
}

/// Read `onKeyDown`, `onKeyUp`, `onFocus` and `onBlur` from a JS object.
fn interaction_callbacks(callbacks: &JsValue) -> InteractionCallbacks {
    let mut result = InteractionCallbacks::new();
    if let Some(f) = js_function(callbacks, "onKeyDown") {
        result = result.with_key_down(move || call_logged(&f, "onKeyDown", None));
    }
    if let Some(f) = js_function(callbacks, "onKeyUp") {
        result = result.with_key_up(move || call_logged(&f, "onKeyUp", None));
    }
    if let Some(f) = js_function(callbacks, "onFocus") {
        result = result.with_focus(move || call_logged(&f, "onFocus", None));
    }
    if let Some(f) = js_function(callbacks, "onBlur") {
        result = result.with_blur(move || call_logged(&f, "onBlur", None));
    }
    result
}

/// Slider settings accepted by [`A11yLayer::create_slider`].
#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SliderJson {
    min: f64,
    max: f64,
    step: f64,
    value: Option<f64>,
    orientation: Orientation,
    value_template: Option<String>,
}

impl Default for SliderJson {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
            step: 1.0,
            value: None,
            orientation: Orientation::Horizontal,
            value_template: None,
        }
    }
}

impl From<SliderJson> for SliderOptions {
    fn from(json: SliderJson) -> Self {
        let mut options = SliderOptions::new(json.min, json.max)
            .with_step(json.step)
            .with_orientation(json.orientation);
        if let Some(value) = json.value {
            options = options.with_value(value);
        }
        if let Some(template) = json.value_template {
            options = options.with_value_template(template);
        }
        options
    }
}

// ============================================================================
// Host proxies
// ============================================================================

/// A scene whose lifecycle is driven from JavaScript.
#[wasm_bindgen]
#[derive(Debug, Default)]
pub struct SceneHandle {
    inner: Rc<ProxyScene>,
}

#[wasm_bindgen]
impl SceneHandle {
    /// Create an active scene.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> SceneHandle {
        Self::default()
    }

    /// Pause the scene. Overlays stop forwarding input and hide.
    pub fn pause(&self) {
        self.inner.pause();
    }

    /// Resume the scene. Overlays restore their pre-pause state.
    pub fn resume(&self) {
        self.inner.resume();
    }

    /// Restart a shut-down scene.
    pub fn restart(&self) {
        self.inner.restart();
    }

    /// Shut the scene down. Attached overlays are destroyed.
    pub fn shutdown(&self) {
        self.inner.shutdown();
    }

    /// Destroy the scene. Attached overlays are destroyed.
    pub fn destroy(&self) {
        self.inner.destroy();
    }

    /// Whether the scene is running.
    #[wasm_bindgen(js_name = isActive)]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.inner.is_active()
    }

    /// Current status: `"running"`, `"paused"`, `"shutdown"` or `"destroyed"`.
    #[must_use]
    pub fn status(&self) -> String {
        match self.inner.status() {
            SceneStatus::Running => "running",
            SceneStatus::Paused => "paused",
            SceneStatus::Shutdown => "shutdown",
            SceneStatus::Destroyed => "destroyed",
        }
        .to_string()
    }
}

impl SceneHandle {
    fn host(&self) -> Option<Rc<dyn SceneHost>> {
        let scene: Rc<dyn SceneHost> = self.inner.clone();
        Some(scene)
    }
}

/// A canvas object whose world transform is pushed from JavaScript.
#[wasm_bindgen]
#[derive(Debug)]
pub struct NodeHandle {
    inner: Rc<ProxyNode>,
}

#[wasm_bindgen]
impl NodeHandle {
    /// Create a node centered on `(x, y)` with the given local size.
    ///
    /// A non-positive size makes overlays fall back to the configured size.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> NodeHandle {
        let bounds = Bounds {
            width: (width > 0.0).then_some(width),
            height: (height > 0.0).then_some(height),
            ..Bounds::default()
        };
        Self {
            inner: Rc::new(ProxyNode::new(Affine::translate(x, y), bounds)),
        }
    }

    /// Replace the world transform, in canvas `setTransform` order.
    #[wasm_bindgen(js_name = setTransform)]
    pub fn set_transform(&self, a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) {
        self.inner.set_transform(Affine::new([a, b, c, d, tx, ty]));
    }

    /// Replace the local size and origin fractions.
    #[wasm_bindgen(js_name = setBounds)]
    pub fn set_bounds(&self, width: f64, height: f64, origin_x: f64, origin_y: f64) {
        self.inner
            .set_bounds(Bounds::sized(width, height).with_origin(origin_x, origin_y));
    }

    /// Destroy the node. Attached overlays are destroyed.
    pub fn destroy(&self) {
        self.inner.destroy();
    }
}

impl NodeHandle {
    fn target(&self) -> Rc<dyn RenderNode> {
        self.inner.clone()
    }
}

// ============================================================================
// Overlay handles
// ============================================================================

macro_rules! overlay_handle {
    ($(#[$meta:meta])* $handle:ident => $overlay:ident) => {
        $(#[$meta])*
        #[wasm_bindgen]
        #[derive(Debug)]
        pub struct $handle {
            overlay: $overlay<WebDom>,
        }

        #[wasm_bindgen]
        impl $handle {
            /// The element's DOM id.
            #[wasm_bindgen(js_name = domId)]
            #[must_use]
            pub fn dom_id(&self) -> String {
                self.overlay.base().dom_id()
            }

            /// Replace the accessible label.
            #[wasm_bindgen(js_name = updateLabel)]
            pub fn update_label(&self, text: &str) {
                self.overlay.update_label(text);
            }

            /// Hide or reveal the element for assistive technology.
            #[wasm_bindgen(js_name = setAriaHidden)]
            pub fn set_aria_hidden(&self, hidden: bool) {
                self.overlay.set_aria_hidden(hidden);
            }

            /// Enable or disable the element.
            #[wasm_bindgen(js_name = setDisabled)]
            pub fn set_disabled(&self, disabled: bool) {
                self.overlay.set_disabled(disabled);
            }

            /// Move keyboard focus to the element.
            pub fn focus(&self) {
                self.overlay.focus();
            }

            /// Re-read the render node's transform and move the element.
            #[wasm_bindgen(js_name = updatePosition)]
            pub fn update_position(&self) {
                self.overlay.update_position();
            }

            /// Rebuild the element from the current state.
            pub fn recreate(&self) {
                self.overlay.recreate();
            }

            /// Remove the element and release all listeners.
            pub fn destroy(&self) {
                self.overlay.destroy();
            }

            /// Whether the overlay has been destroyed.
            #[wasm_bindgen(js_name = isDestroyed)]
            #[must_use]
            pub fn is_destroyed(&self) -> bool {
                self.overlay.is_destroyed()
            }
        }
    };
}

overlay_handle!(
    /// JS handle to a [`ButtonOverlay`].
    ButtonHandle => ButtonOverlay
);
overlay_handle!(
    /// JS handle to a [`TextOverlay`].
    TextHandle => TextOverlay
);
overlay_handle!(
    /// JS handle to an [`ImageOverlay`].
    ImageHandle => ImageOverlay
);
overlay_handle!(
    /// JS handle to a [`ProgressBarOverlay`].
    ProgressBarHandle => ProgressBarOverlay
);
overlay_handle!(
    /// JS handle to a [`SliderOverlay`].
    SliderHandle => SliderOverlay
);

#[wasm_bindgen]
impl TextHandle {
    /// Replace the text. Announce-mode overlays re-announce it.
    #[wasm_bindgen(js_name = updateContent)]
    pub fn update_content(&self, text: &str) {
        self.overlay.update_content(text);
    }

    /// Replace the list items.
    #[wasm_bindgen(js_name = updateItems)]
    pub fn update_items(&self, items: Vec<String>) {
        self.overlay.update_items(items);
    }
}

#[wasm_bindgen]
impl ProgressBarHandle {
    /// Set progress in `0..=1` and an optional streak count.
    #[wasm_bindgen(js_name = updateProgress)]
    pub fn update_progress(&self, progress: f64, streak: Option<u32>) {
        self.overlay.update_progress(progress, streak);
    }

    /// Current rounded percentage.
    #[must_use]
    pub fn percent(&self) -> u8 {
        self.overlay.percent()
    }
}

#[wasm_bindgen]
impl SliderHandle {
    /// Current value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.overlay.value()
    }

    /// Set the value after a pointer drag on the canvas.
    #[wasm_bindgen(js_name = setValue)]
    pub fn set_value(&self, value: f64) {
        self.overlay.set_value(value);
    }
}

// ============================================================================
// Layer
// ============================================================================

/// Entry point: owns the DOM backend, scheduler, config and announcer
/// shared by every overlay it creates.
#[wasm_bindgen]
#[derive(Debug)]
pub struct A11yLayer {
    ctx: OverlayContext<WebDom>,
}

#[wasm_bindgen]
impl A11yLayer {
    /// Create a layer over the element with `container_id` (or `<body>`).
    ///
    /// `config_json` is an optional [`OverlayConfig`] in JSON; missing fields
    /// keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the container is missing or the config is malformed.
    #[wasm_bindgen(constructor)]
    #[allow(clippy::needless_pass_by_value)]
    pub fn new(
        container_id: Option<String>,
        config_json: Option<String>,
    ) -> Result<A11yLayer, JsValue> {
        let config = match config_json {
            Some(json) => OverlayConfig::from_json(&json).map_err(|e| to_js(&e))?,
            None => OverlayConfig::default(),
        };
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))?;
        let dom = WebDom::new(container_id.as_deref()).map_err(|e| to_js(&e))?;

        tracing::debug!(
            "A11y layer attached to {}",
            container_id.as_deref().unwrap_or("<body>")
        );

        Ok(Self {
            ctx: OverlayContext::new(dom, Rc::new(TimeoutScheduler::new(window)), config),
        })
    }

    /// Announce a message politely through the shared live region.
    pub fn announce(&self, message: &str) {
        self.ctx.announce(message);
    }

    /// Announce a message assertively, interrupting current speech.
    #[wasm_bindgen(js_name = announceAssertive)]
    pub fn announce_assertive(&self, message: &str) {
        self.ctx
            .announcer()
            .announce_with(message, Politeness::Assertive);
    }

    /// Mirror a button. `callbacks` may carry `onKeyDown`, `onKeyUp`,
    /// `onFocus` and `onBlur`.
    #[wasm_bindgen(js_name = createButton)]
    #[must_use]
    pub fn create_button(
        &self,
        scene: &SceneHandle,
        node: &NodeHandle,
        label: &str,
        callbacks: &JsValue,
    ) -> ButtonHandle {
        ButtonHandle {
            overlay: ButtonOverlay::new(
                &self.ctx,
                scene.host(),
                node.target(),
                OverlayOptions::new(label),
                interaction_callbacks(callbacks),
            ),
        }
    }

    /// Mirror a text block as a polite status element. With `announce`,
    /// every update is re-announced.
    #[wasm_bindgen(js_name = createText)]
    #[must_use]
    pub fn create_text(
        &self,
        scene: &SceneHandle,
        node: &NodeHandle,
        content: &str,
        announce: bool,
    ) -> TextHandle {
        TextHandle {
            overlay: TextOverlay::new(
                &self.ctx,
                scene.host(),
                node.target(),
                OverlayOptions::new(content),
                TextOptions::new().with_announce(announce),
            ),
        }
    }

    /// Mirror a list of text items as a labelled `<ul>`.
    #[wasm_bindgen(js_name = createList)]
    #[must_use]
    pub fn create_list(
        &self,
        scene: &SceneHandle,
        node: &NodeHandle,
        label: &str,
        items: Vec<String>,
    ) -> TextHandle {
        TextHandle {
            overlay: TextOverlay::new(
                &self.ctx,
                scene.host(),
                node.target(),
                OverlayOptions::new(label),
                TextOptions::list(items),
            ),
        }
    }

    /// Mirror an image with `label` as its description.
    #[wasm_bindgen(js_name = createImage)]
    #[must_use]
    pub fn create_image(&self, scene: &SceneHandle, node: &NodeHandle, label: &str) -> ImageHandle {
        ImageHandle {
            overlay: ImageOverlay::new(
                &self.ctx,
                scene.host(),
                node.target(),
                OverlayOptions::new(label),
            ),
        }
    }

    /// Mirror a progress bar, starting at 0%.
    #[wasm_bindgen(js_name = createProgressBar)]
    #[must_use]
    pub fn create_progress_bar(
        &self,
        scene: &SceneHandle,
        node: &NodeHandle,
        label: &str,
    ) -> ProgressBarHandle {
        ProgressBarHandle {
            overlay: ProgressBarOverlay::new(
                &self.ctx,
                scene.host(),
                node.target(),
                OverlayOptions::new(label),
            ),
        }
    }

    /// Mirror a slider.
    ///
    /// `options_json` may set `min`, `max`, `step`, `value`, `orientation`
    /// and `valueTemplate`. `callbacks` may carry the button callbacks plus
    /// `onChange(value)`.
    ///
    /// # Errors
    ///
    /// Returns an error if `options_json` is malformed.
    #[wasm_bindgen(js_name = createSlider)]
    pub fn create_slider(
        &self,
        scene: &SceneHandle,
        node: &NodeHandle,
        label: &str,
        options_json: &str,
        callbacks: &JsValue,
    ) -> Result<SliderHandle, JsValue> {
        let slider: SliderJson = serde_json::from_str(options_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid slider options: {e}")))?;
        let on_change = js_function(callbacks, "onChange").map(|f| {
            Rc::new(move |value: f64| call_logged(&f, "onChange", Some(&JsValue::from_f64(value))))
                as Rc<dyn Fn(f64)>
        });

        Ok(SliderHandle {
            overlay: SliderOverlay::new(
                &self.ctx,
                scene.host(),
                node.target(),
                OverlayOptions::new(label),
                slider.into(),
                interaction_callbacks(callbacks),
                on_change,
            ),
        })
    }
}
