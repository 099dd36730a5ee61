//! UI surface capability consumed by the menu components
//!
//! The menu engine never touches a concrete rendering backend. Everything it
//! needs (element creation, attributes, classes, geometry, show/hide and event
//! subscription) goes through [`UiSurface`]. A host embeds the menu by
//! implementing this trait over its own element tree; [`HeadlessSurface`] is
//! the in-memory implementation used by tests and the scenario runner.

mod events;
mod geometry;
mod headless;
mod selector;

pub use events::{names, EventHandler, ListenerHandle, UiEvent};
pub use geometry::{Point, Rect, Size};
pub use headless::{HeadlessSurface, RowMetrics};
pub use selector::Selector;

/// Opaque handle to an element owned by a [`UiSurface`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Rendering and event capabilities of the host page
///
/// All methods take `&self`: implementations are expected to use interior
/// mutability, because event handlers run while an event is being dispatched
/// and call straight back into the surface (to hide the overlay, rebuild a
/// submenu, install or remove listeners).
///
/// Operations on unknown nodes are ignored rather than reported; the menu
/// only ever addresses nodes it created or received from the host.
pub trait UiSurface {
    // === Element tree ===

    /// The default container (the document body)
    fn body(&self) -> NodeId;

    fn create_element(&self, tag: &str) -> NodeId;

    fn append_child(&self, parent: NodeId, child: NodeId);

    /// Remove every child of `node` (and their subtrees)
    fn remove_children(&self, node: NodeId);

    /// Detach `node` from its parent
    fn remove(&self, node: NodeId);

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Whether `node` is `ancestor` or one of its descendants
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool;

    /// First element under `root` (inclusive) matching `selector`
    fn query_selector(&self, root: NodeId, selector: &str) -> Option<NodeId>;

    /// Whether delegated listeners can filter on `selector`
    fn supports_selector(&self, selector: &str) -> bool;

    // === Attributes, classes, text ===

    fn set_attribute(&self, node: NodeId, name: &str, value: &str);

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn remove_attribute(&self, node: NodeId, name: &str);

    fn add_class(&self, node: NodeId, class: &str);

    fn remove_class(&self, node: NodeId, class: &str);

    fn has_class(&self, node: NodeId, class: &str) -> bool;

    /// Ordered class list of `node`
    fn classes(&self, node: NodeId) -> Vec<String>;

    /// Replace the whole class list of `node`
    fn set_classes(&self, node: NodeId, classes: &[String]);

    fn set_text(&self, node: NodeId, text: &str);

    fn text(&self, node: NodeId) -> String;

    // === Visibility and geometry ===

    fn set_visible(&self, node: NodeId, visible: bool);

    fn is_visible(&self, node: NodeId) -> bool;

    /// Border box of `node` in page coordinates
    fn bounding_box(&self, node: NodeId) -> Rect;

    /// Natural size of the content of `node`, as laid out right now
    fn content_size(&self, node: NodeId) -> Size;

    /// Pin the size of `node`
    fn set_size(&self, node: NodeId, size: Size);

    /// Place `node` at an absolute page position
    fn set_position(&self, node: NodeId, position: Point);

    fn position(&self, node: NodeId) -> Point;

    fn viewport(&self) -> Size;

    // === Events ===

    /// Subscribe `handler` to `event` on `node`
    ///
    /// With a `selector`, the subscription is delegated: it fires for events
    /// coming from descendants of `node` that match the selector, including
    /// elements added after the subscription was made, and the event's
    /// `current_target` is the matching element.
    fn listen(
        &self,
        node: NodeId,
        event: &str,
        selector: Option<&str>,
        handler: EventHandler,
    ) -> ListenerHandle;

    /// Release a subscription; unknown handles are ignored
    fn unlisten(&self, handle: ListenerHandle);
}
