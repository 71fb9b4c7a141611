//! `setTimeout` scheduling.

use a11y_core::schedule::Task;
use a11y_core::Scheduler;
use tracing::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Window;

/// [`Scheduler`] backed by `window.setTimeout`.
#[derive(Debug, Clone)]
pub struct TimeoutScheduler {
    window: Window,
}

impl TimeoutScheduler {
    /// Schedule on `window`.
    #[must_use]
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Scheduler for TimeoutScheduler {
    fn delayed_call(&self, delay_ms: u32, task: Task) {
        let callback = Closure::once_into_js(move || task());
        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        if let Err(e) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay)
        {
            warn!("Failed to schedule task: {:?}", e);
        }
    }
}
