//! In-process document.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use super::{Cleanup, Dom, DomEvent, DomEventKind, DomListener, Propagation};
use crate::{A11yError, A11yResult};

/// Handle to an element in a [`MemoryDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemoryNode(usize);

const ROOT: usize = 0;

struct NodeData {
    tag: String,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    text: String,
    text_history: Vec<String>,
    parent: Option<usize>,
    children: Vec<usize>,
    listeners: Vec<(u64, DomEventKind, DomListener)>,
}

impl NodeData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            style: BTreeMap::new(),
            text: String::new(),
            text_history: Vec::new(),
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
        }
    }
}

struct Tree {
    nodes: Vec<NodeData>,
    focused: Option<usize>,
    next_listener: u64,
}

impl Tree {
    fn is_within(&self, node: usize, ancestor: usize) -> bool {
        let mut current = Some(node);
        while let Some(index) = current {
            if index == ancestor {
                return true;
            }
            current = self.nodes[index].parent;
        }
        false
    }

    fn detach(&mut self, node: usize) {
        if let Some(parent) = self.nodes[node].parent.take() {
            self.nodes[parent].children.retain(|&c| c != node);
        }
        if self.focused.is_some_and(|f| self.is_within(f, node)) {
            self.focused = None;
        }
    }

    fn text_content(&self, node: usize) -> String {
        let data = &self.nodes[node];
        let mut text = data.text.clone();
        for &child in &data.children {
            text.push_str(&self.text_content(child));
        }
        text
    }
}

/// A document held in memory.
///
/// Implements [`Dom`] with browser-like semantics where they matter to
/// overlays: removal drops focus, disabled elements ignore `focus()`,
/// `getElementById` only finds connected elements. Inspection methods expose
/// attributes, styles and text for assertions, and [`dispatch`](Self::dispatch)
/// simulates user input.
#[derive(Clone)]
pub struct MemoryDom {
    tree: Rc<RefCell<Tree>>,
}

impl std::fmt::Debug for MemoryDom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tree = self.tree.borrow();
        f.debug_struct("MemoryDom")
            .field("nodes", &tree.nodes.len())
            .field("focused", &tree.focused)
            .finish()
    }
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// Create a document with an empty `<body>` container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: Rc::new(RefCell::new(Tree {
                nodes: vec![NodeData::new("body")],
                focused: None,
                next_listener: 0,
            })),
        }
    }

    /// The `<body>` element.
    #[must_use]
    pub fn body(&self) -> MemoryNode {
        MemoryNode(ROOT)
    }

    /// Whether `node` is connected to the document.
    #[must_use]
    pub fn contains(&self, node: MemoryNode) -> bool {
        self.tree.borrow().is_within(node.0, ROOT)
    }

    /// Tag name of `node`.
    #[must_use]
    pub fn tag(&self, node: MemoryNode) -> String {
        self.tree.borrow().nodes[node.0].tag.clone()
    }

    /// Attribute value, if present.
    #[must_use]
    pub fn attribute(&self, node: MemoryNode, name: &str) -> Option<String> {
        self.tree.borrow().nodes[node.0].attributes.get(name).cloned()
    }

    /// Whether the attribute is present.
    #[must_use]
    pub fn has_attribute(&self, node: MemoryNode, name: &str) -> bool {
        self.tree.borrow().nodes[node.0].attributes.contains_key(name)
    }

    /// Inline style value, if set.
    #[must_use]
    pub fn style(&self, node: MemoryNode, property: &str) -> Option<String> {
        self.tree.borrow().nodes[node.0].style.get(property).cloned()
    }

    /// Text content of `node` and its descendants.
    #[must_use]
    pub fn text(&self, node: MemoryNode) -> String {
        self.tree.borrow().text_content(node.0)
    }

    /// Every value passed to `set_text` on `node`, oldest first.
    #[must_use]
    pub fn text_history(&self, node: MemoryNode) -> Vec<String> {
        self.tree.borrow().nodes[node.0].text_history.clone()
    }

    /// Direct children of `node`.
    #[must_use]
    pub fn children(&self, node: MemoryNode) -> Vec<MemoryNode> {
        self.tree.borrow().nodes[node.0]
            .children
            .iter()
            .copied()
            .map(MemoryNode)
            .collect()
    }

    /// The focused element.
    #[must_use]
    pub fn focused(&self) -> Option<MemoryNode> {
        self.tree.borrow().focused.map(MemoryNode)
    }

    /// Number of listeners registered on `node`.
    #[must_use]
    pub fn listener_count(&self, node: MemoryNode) -> usize {
        self.tree.borrow().nodes[node.0].listeners.len()
    }

    /// Deliver `event` to the listeners on `node`.
    ///
    /// Returns `true` if a listener prevented the default action.
    pub fn dispatch(&self, node: MemoryNode, event: &DomEvent) -> bool {
        let listeners: Vec<DomListener> = self.tree.borrow().nodes[node.0]
            .listeners
            .iter()
            .filter(|(_, kind, _)| *kind == event.kind)
            .map(|(_, _, listener)| Rc::clone(listener))
            .collect();

        let mut prevented = false;
        for listener in listeners {
            if listener(event) == Propagation::PreventDefault {
                prevented = true;
            }
        }
        prevented
    }

    /// Dispatch a key event with the given `KeyboardEvent.key`.
    pub fn key(&self, node: MemoryNode, kind: DomEventKind, key: &str) -> bool {
        self.dispatch(node, &DomEvent::key(kind, key))
    }
}

impl Dom for MemoryDom {
    type Node = MemoryNode;

    fn create_element(&self, tag: &str) -> A11yResult<MemoryNode> {
        if tag.is_empty() {
            return Err(A11yError::Dom("empty tag name".to_string()));
        }
        let mut tree = self.tree.borrow_mut();
        tree.nodes.push(NodeData::new(tag));
        Ok(MemoryNode(tree.nodes.len() - 1))
    }

    fn container(&self) -> A11yResult<MemoryNode> {
        Ok(self.body())
    }

    fn append_child(&self, parent: &MemoryNode, child: &MemoryNode) -> A11yResult<()> {
        let mut tree = self.tree.borrow_mut();
        if tree.is_within(parent.0, child.0) {
            return Err(A11yError::Dom("cannot append an ancestor".to_string()));
        }
        tree.detach(child.0);
        tree.nodes[child.0].parent = Some(parent.0);
        tree.nodes[parent.0].children.push(child.0);
        Ok(())
    }

    fn remove(&self, node: &MemoryNode) {
        self.tree.borrow_mut().detach(node.0);
    }

    fn is_attached(&self, node: &MemoryNode) -> bool {
        self.contains(*node)
    }

    fn element_by_id(&self, id: &str) -> Option<MemoryNode> {
        let tree = self.tree.borrow();
        tree.nodes
            .iter()
            .enumerate()
            .find(|(index, data)| {
                data.attributes.get("id").is_some_and(|v| v == id) && tree.is_within(*index, ROOT)
            })
            .map(|(index, _)| MemoryNode(index))
    }

    fn set_attribute(&self, node: &MemoryNode, name: &str, value: &str) {
        self.tree.borrow_mut().nodes[node.0]
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn remove_attribute(&self, node: &MemoryNode, name: &str) {
        self.tree.borrow_mut().nodes[node.0].attributes.remove(name);
    }

    fn set_style(&self, node: &MemoryNode, property: &str, value: &str) {
        self.tree.borrow_mut().nodes[node.0]
            .style
            .insert(property.to_string(), value.to_string());
    }

    fn set_text(&self, node: &MemoryNode, text: &str) {
        let mut tree = self.tree.borrow_mut();
        let children = std::mem::take(&mut tree.nodes[node.0].children);
        for child in children {
            tree.nodes[child].parent = None;
            if tree.focused.is_some_and(|f| tree.is_within(f, child)) {
                tree.focused = None;
            }
        }
        let data = &mut tree.nodes[node.0];
        data.text = text.to_string();
        data.text_history.push(text.to_string());
    }

    fn focus(&self, node: &MemoryNode) -> A11yResult<()> {
        let previous = {
            let mut tree = self.tree.borrow_mut();
            if !tree.is_within(node.0, ROOT) {
                return Err(A11yError::Detached);
            }
            if tree.nodes[node.0].attributes.contains_key("disabled")
                || tree.focused == Some(node.0)
            {
                return Ok(());
            }
            tree.focused.replace(node.0)
        };

        if let Some(previous) = previous {
            self.dispatch(MemoryNode(previous), &DomEvent::new(DomEventKind::Blur));
        }
        self.dispatch(*node, &DomEvent::new(DomEventKind::Focus));
        Ok(())
    }

    fn blur(&self, node: &MemoryNode) {
        let had_focus = {
            let mut tree = self.tree.borrow_mut();
            if tree.focused == Some(node.0) {
                tree.focused = None;
                true
            } else {
                false
            }
        };
        if had_focus {
            self.dispatch(*node, &DomEvent::new(DomEventKind::Blur));
        }
    }

    fn is_focused(&self, node: &MemoryNode) -> bool {
        self.tree.borrow().focused == Some(node.0)
    }

    fn listen(
        &self,
        node: &MemoryNode,
        kind: DomEventKind,
        listener: DomListener,
    ) -> A11yResult<Cleanup> {
        let id = {
            let mut tree = self.tree.borrow_mut();
            let id = tree.next_listener;
            tree.next_listener += 1;
            tree.nodes[node.0].listeners.push((id, kind, listener));
            id
        };

        let tree = Rc::downgrade(&self.tree);
        let index = node.0;
        Ok(Box::new(move || {
            if let Some(tree) = tree.upgrade() {
                tree.borrow_mut().nodes[index]
                    .listeners
                    .retain(|(listener_id, _, _)| *listener_id != id);
            }
        }))
    }
}
