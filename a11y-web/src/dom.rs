//! Browser document backend.

use a11y_core::dom::DomListener;
use a11y_core::{A11yError, A11yResult, Cleanup, Dom, DomEvent, DomEventKind, Propagation};
use tracing::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{AddEventListenerOptions, Document, Event, HtmlElement, KeyboardEvent};

/// Convert a JS exception into an [`A11yError`].
pub(crate) fn js_error(value: &JsValue) -> A11yError {
    A11yError::Dom(
        value
            .as_string()
            .unwrap_or_else(|| format!("{value:?}")),
    )
}

/// [`Dom`] implementation over `web_sys`.
///
/// Overlays are appended to `container`, which should be positioned
/// (e.g. `position: relative`) and overlap the canvas exactly.
#[derive(Debug, Clone)]
pub struct WebDom {
    document: Document,
    container: HtmlElement,
}

impl WebDom {
    /// Attach to the element with `container_id`, or to `<body>`.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no document or the container is missing.
    pub fn new(container_id: Option<&str>) -> A11yResult<Self> {
        let window =
            web_sys::window().ok_or_else(|| A11yError::Unavailable("window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| A11yError::Unavailable("document".to_string()))?;

        let container = match container_id {
            Some(id) => document
                .get_element_by_id(id)
                .ok_or_else(|| A11yError::Dom(format!("Container element '{id}' not found")))?
                .dyn_into::<HtmlElement>()
                .map_err(|_| A11yError::Dom(format!("Container '{id}' is not an HTML element")))?,
            None => document
                .body()
                .ok_or_else(|| A11yError::Unavailable("body".to_string()))?,
        };

        Ok(Self {
            document,
            container,
        })
    }

    /// The document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }
}

fn to_dom_event(kind: DomEventKind, event: &Event) -> DomEvent {
    match event.dyn_ref::<KeyboardEvent>() {
        Some(keyboard) => DomEvent::key(kind, keyboard.key()),
        None => DomEvent::new(kind),
    }
}

impl Dom for WebDom {
    type Node = HtmlElement;

    fn create_element(&self, tag: &str) -> A11yResult<HtmlElement> {
        self.document
            .create_element(tag)
            .map_err(|e| js_error(&e))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| A11yError::Dom(format!("<{tag}> is not an HTML element")))
    }

    fn container(&self) -> A11yResult<HtmlElement> {
        if self.container.is_connected() {
            Ok(self.container.clone())
        } else {
            Err(A11yError::Detached)
        }
    }

    fn append_child(&self, parent: &HtmlElement, child: &HtmlElement) -> A11yResult<()> {
        parent
            .append_child(child)
            .map(|_| ())
            .map_err(|e| js_error(&e))
    }

    fn remove(&self, node: &HtmlElement) {
        node.remove();
    }

    fn is_attached(&self, node: &HtmlElement) -> bool {
        node.is_connected()
    }

    fn element_by_id(&self, id: &str) -> Option<HtmlElement> {
        self.document
            .get_element_by_id(id)
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
    }

    fn set_attribute(&self, node: &HtmlElement, name: &str, value: &str) {
        if let Err(e) = node.set_attribute(name, value) {
            warn!("Failed to set {}: {:?}", name, e);
        }
    }

    fn remove_attribute(&self, node: &HtmlElement, name: &str) {
        if let Err(e) = node.remove_attribute(name) {
            warn!("Failed to remove {}: {:?}", name, e);
        }
    }

    fn set_style(&self, node: &HtmlElement, property: &str, value: &str) {
        if let Err(e) = node.style().set_property(property, value) {
            warn!("Failed to set style {}: {:?}", property, e);
        }
    }

    fn set_text(&self, node: &HtmlElement, text: &str) {
        node.set_text_content(Some(text));
    }

    fn focus(&self, node: &HtmlElement) -> A11yResult<()> {
        if !node.is_connected() {
            return Err(A11yError::Detached);
        }
        node.focus().map_err(|e| js_error(&e))
    }

    fn blur(&self, node: &HtmlElement) {
        if !self.is_focused(node) {
            return;
        }
        if let Err(e) = node.blur() {
            warn!("Failed to blur: {:?}", e);
        }
    }

    fn is_focused(&self, node: &HtmlElement) -> bool {
        self.document
            .active_element()
            .is_some_and(|active| active.is_same_node(Some(node.as_ref())))
    }

    fn listen(
        &self,
        node: &HtmlElement,
        kind: DomEventKind,
        listener: DomListener,
    ) -> A11yResult<Cleanup> {
        let closure = Closure::wrap(Box::new(move |event: Event| {
            if listener(&to_dom_event(kind, &event)) == Propagation::PreventDefault {
                event.prevent_default();
            }
        }) as Box<dyn FnMut(Event)>);

        // prevent_default is ignored in passive listeners.
        let options = AddEventListenerOptions::new();
        options.set_passive(!kind.is_cancelable());
        node.add_event_listener_with_callback_and_add_event_listener_options(
            kind.as_str(),
            closure.as_ref().unchecked_ref(),
            &options,
        )
        .map_err(|e| js_error(&e))?;

        let target = node.clone();
        Ok(Box::new(move || {
            if let Err(e) = target
                .remove_event_listener_with_callback(kind.as_str(), closure.as_ref().unchecked_ref())
            {
                warn!("Failed to remove {} listener: {:?}", kind.as_str(), e);
            }
        }))
    }
}
