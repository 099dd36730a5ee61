use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt::Write as _;

use tracing::warn;

use super::events::{names, EventHandler, ListenerHandle, UiEvent};
use super::geometry::{Point, Rect, Size};
use super::selector::Selector;
use super::{NodeId, UiSurface};

const DEFAULT_VIEWPORT: Size = Size {
    width: 1024.0,
    height: 768.0,
};

/// Layout defaults used when an element has no explicit size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowMetrics {
    pub row_width: f32,
    pub row_height: f32,
    pub divider_height: f32,
}

impl Default for RowMetrics {
    fn default() -> Self {
        Self {
            row_width: 160.0,
            row_height: 24.0,
            divider_height: 9.0,
        }
    }
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    text: String,
    visible: bool,
    layout: Option<Rect>,
    position: Option<Point>,
    size: Option<Size>,
    intrinsic: Option<Size>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            parent: None,
            children: Vec::new(),
            attrs: BTreeMap::new(),
            classes: Vec::new(),
            text: String::new(),
            visible: true,
            layout: None,
            position: None,
            size: None,
            intrinsic: None,
        }
    }

    fn matches(&self, selector: &Selector) -> bool {
        selector.matches(&self.tag, &self.classes, |key| {
            self.attrs.get(key).map(String::as_str)
        })
    }
}

#[derive(Debug, Clone)]
enum Filter {
    Direct,
    Delegated(Selector),
    /// Selector could not be parsed; the listener never fires
    Never,
}

struct Listener {
    handle: ListenerHandle,
    node: NodeId,
    event: String,
    filter: Filter,
    handler: EventHandler,
}

/// In-memory [`UiSurface`] with DOM-like event dispatch
///
/// Holds a flat arena of elements rooted at a `body` element. Geometry is
/// deliberately simple: elements either carry an explicit layout box, or
/// are measured as a vertical stack of fixed-height rows.
///
/// Removing an element only detaches it; its slot is never reused, so a
/// `NodeId` handed out once stays valid and can be re-attached. The arena
/// therefore grows with every element created, including the dynamic
/// subaction rows rebuilt on each opening. This is a test and scripting
/// host: pages are expected to live for a test or a scenario run.
pub struct HeadlessSurface {
    elements: RefCell<Vec<Element>>,
    listeners: RefCell<Vec<Listener>>,
    next_listener: Cell<u64>,
    viewport: Cell<Size>,
    metrics: Cell<RowMetrics>,
    body: NodeId,
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessSurface {
    pub fn new() -> Self {
        let body = Element::new("body");
        Self {
            elements: RefCell::new(vec![body]),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(1),
            viewport: Cell::new(DEFAULT_VIEWPORT),
            metrics: Cell::new(RowMetrics::default()),
            body: NodeId(0),
        }
    }

    // === Builder API ===

    pub fn with_viewport(self, viewport: Size) -> Self {
        self.viewport.set(viewport);
        self
    }

    pub fn with_row_metrics(self, metrics: RowMetrics) -> Self {
        self.metrics.set(metrics);
        self
    }

    // === Page construction helpers ===

    /// Create an element with classes and append it to `parent`
    pub fn add_element(&self, parent: NodeId, tag: &str, classes: &[&str]) -> NodeId {
        let node = self.create_element(tag);
        for class in classes {
            self.add_class(node, class);
        }
        self.append_child(parent, node);
        node
    }

    /// Give `node` an explicit layout box
    pub fn set_layout(&self, node: NodeId, rect: Rect) {
        self.with_element_mut(node, |el| el.layout = Some(rect));
    }

    /// Give `node` a fixed natural content size
    pub fn set_intrinsic_size(&self, node: NodeId, size: Size) {
        self.with_element_mut(node, |el| el.intrinsic = Some(size));
    }

    pub fn set_viewport(&self, viewport: Size) {
        self.viewport.set(viewport);
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.elements
            .borrow()
            .get(node.0)
            .map(|el| el.children.clone())
            .unwrap_or_default()
    }

    pub fn tag(&self, node: NodeId) -> Option<String> {
        self.elements.borrow().get(node.0).map(|el| el.tag.clone())
    }

    /// Whether `node` matches a selector; unsupported selectors never match
    pub fn matches(&self, node: NodeId, selector: &str) -> bool {
        let Some(selector) = Selector::parse(selector) else {
            return false;
        };
        self.elements
            .borrow()
            .get(node.0)
            .map(|el| el.matches(&selector))
            .unwrap_or(false)
    }

    /// Nearest ancestor-or-self of `node` matching `selector`
    pub fn closest(&self, node: NodeId, selector: &str) -> Option<NodeId> {
        let selector = Selector::parse(selector)?;
        let elements = self.elements.borrow();
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            let el = elements.get(current.0)?;
            if el.matches(&selector) {
                return Some(current);
            }
            cursor = el.parent;
        }
        None
    }

    pub fn query_all(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        let Some(selector) = Selector::parse(selector) else {
            return Vec::new();
        };
        let elements = self.elements.borrow();
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            let Some(el) = elements.get(current.0) else {
                continue;
            };
            if el.matches(&selector) {
                out.push(current);
            }
            stack.extend(el.children.iter().rev().copied());
        }
        out
    }

    /// Number of live subscriptions, across all nodes
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Number of live subscriptions attached to `node`
    pub fn listeners_on(&self, node: NodeId) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|l| l.node == node)
            .count()
    }

    // === Input drivers ===

    /// Dispatch an event and return it after all listeners ran
    pub fn dispatch(&self, mut event: UiEvent) -> UiEvent {
        let path = self.ancestry(event.target);
        if path.is_empty() {
            return event;
        }

        if names::bubbles(&event.name) {
            for (depth, node) in path.iter().enumerate() {
                self.run_listeners_at(*node, &path[..depth], &mut event);
                if event.is_propagation_stopped() {
                    break;
                }
            }
        } else {
            // Non-bubbling: direct listeners on the target, plus delegated
            // listeners on ancestors whose selector matches the target itself.
            let target = event.target;
            for (depth, node) in path.iter().enumerate() {
                let below: &[NodeId] = if depth == 0 { &[] } else { &path[..1] };
                self.run_listeners_filtered(*node, below, depth == 0, target, &mut event);
                if event.is_propagation_stopped() {
                    break;
                }
            }
        }
        event
    }

    pub fn click(&self, node: NodeId) -> UiEvent {
        let center = self.center_of(node);
        self.dispatch(UiEvent::new(names::CLICK, node).at(center.x, center.y))
    }

    pub fn mouse_down(&self, node: NodeId) -> UiEvent {
        let center = self.center_of(node);
        self.dispatch(UiEvent::new(names::MOUSE_DOWN, node).at(center.x, center.y))
    }

    pub fn right_click_at(&self, node: NodeId, x: f32, y: f32) -> UiEvent {
        self.dispatch(UiEvent::new(names::CONTEXT_MENU, node).at(x, y))
    }

    pub fn pointer_enter(&self, node: NodeId) -> UiEvent {
        let center = self.center_of(node);
        self.dispatch(UiEvent::new(names::MOUSE_ENTER, node).at(center.x, center.y))
    }

    /// Pointer leaves `node` towards `to` (`None` for outside the page)
    pub fn pointer_leave(&self, node: NodeId, to: Option<NodeId>) -> UiEvent {
        self.dispatch(UiEvent::new(names::MOUSE_LEAVE, node).with_related_target(to))
    }

    // === Debug output ===

    /// Indented outline of the visible subtree under `node`
    pub fn dump(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.dump_into(node, 0, &mut out);
        out
    }

    fn dump_into(&self, node: NodeId, depth: usize, out: &mut String) {
        let (line, children) = {
            let elements = self.elements.borrow();
            let Some(el) = elements.get(node.0) else {
                return;
            };
            if !el.visible {
                return;
            }
            let mut line = el.tag.clone();
            for class in &el.classes {
                line.push('.');
                line.push_str(class);
            }
            for (key, value) in &el.attrs {
                let _ = write!(line, "[{key}={value}]");
            }
            if !el.text.is_empty() {
                let _ = write!(line, " {:?}", el.text);
            }
            (line, el.children.clone())
        };
        let _ = writeln!(out, "{}{}", "  ".repeat(depth), line);
        for child in children {
            self.dump_into(child, depth + 1, out);
        }
    }

    // === Internals ===

    fn with_element_mut(&self, node: NodeId, f: impl FnOnce(&mut Element)) {
        if let Some(el) = self.elements.borrow_mut().get_mut(node.0) {
            f(el);
        }
    }

    fn ancestry(&self, node: NodeId) -> Vec<NodeId> {
        let elements = self.elements.borrow();
        let mut path = Vec::new();
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            let Some(el) = elements.get(current.0) else {
                break;
            };
            path.push(current);
            cursor = el.parent;
        }
        path
    }

    fn center_of(&self, node: NodeId) -> Point {
        self.bounding_box(node).center()
    }

    fn run_listeners_at(&self, node: NodeId, below: &[NodeId], event: &mut UiEvent) {
        self.run_listeners_filtered(node, below, true, node, event);
    }

    /// Run the listeners attached to `node` for `event`
    ///
    /// Delegated listeners run first, once per matching element in `below`
    /// (closest to the target first); direct listeners run afterwards with
    /// `direct_target` as current target, when `run_direct` is set.
    fn run_listeners_filtered(
        &self,
        node: NodeId,
        below: &[NodeId],
        run_direct: bool,
        direct_target: NodeId,
        event: &mut UiEvent,
    ) {
        let snapshot: Vec<(ListenerHandle, Filter, EventHandler)> = self
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.node == node && l.event == event.name)
            .map(|l| (l.handle, l.filter.clone(), l.handler.clone()))
            .collect();
        if snapshot.is_empty() {
            return;
        }

        for candidate in below {
            for (handle, filter, handler) in &snapshot {
                let Filter::Delegated(selector) = filter else {
                    continue;
                };
                let matched = self
                    .elements
                    .borrow()
                    .get(candidate.0)
                    .map(|el| el.matches(selector))
                    .unwrap_or(false);
                if matched && self.is_live(*handle) {
                    event.current_target = *candidate;
                    handler(event);
                }
            }
            if event.is_propagation_stopped() {
                return;
            }
        }

        if run_direct {
            for (handle, filter, handler) in &snapshot {
                if !matches!(filter, Filter::Direct) || !self.is_live(*handle) {
                    continue;
                }
                event.current_target = direct_target;
                handler(event);
            }
        }
    }

    fn is_live(&self, handle: ListenerHandle) -> bool {
        self.listeners.borrow().iter().any(|l| l.handle == handle)
    }

    fn measure(&self, node: NodeId) -> Size {
        let metrics = self.metrics.get();
        let (intrinsic, tag, is_divider, children) = {
            let elements = self.elements.borrow();
            let Some(el) = elements.get(node.0) else {
                return Size::default();
            };
            (
                el.intrinsic,
                el.tag.clone(),
                el.classes.iter().any(|c| c == "divider"),
                el.children.clone(),
            )
        };
        if let Some(size) = intrinsic {
            return size;
        }
        if is_divider {
            return Size::new(metrics.row_width, metrics.divider_height);
        }
        match tag.as_str() {
            // Block containers stack their visible children
            "ul" | "div" | "body" => {
                let mut size = Size::default();
                for child in children {
                    if !self.is_visible(child) {
                        continue;
                    }
                    let child_size = self.outer_size(child);
                    size.width = size.width.max(child_size.width);
                    size.height += child_size.height;
                }
                size
            }
            // A row; nested submenus are out of flow
            _ => Size::new(metrics.row_width, metrics.row_height),
        }
    }

    /// Size an element occupies in its parent's flow
    fn outer_size(&self, node: NodeId) -> Size {
        let pinned = self
            .elements
            .borrow()
            .get(node.0)
            .and_then(|el| el.layout.map(|r| r.size()).or(el.size));
        pinned.unwrap_or_else(|| self.measure(node))
    }
}

impl UiSurface for HeadlessSurface {
    fn body(&self) -> NodeId {
        self.body
    }

    fn create_element(&self, tag: &str) -> NodeId {
        let mut elements = self.elements.borrow_mut();
        elements.push(Element::new(tag));
        NodeId(elements.len() - 1)
    }

    fn append_child(&self, parent: NodeId, child: NodeId) {
        if parent == child || self.contains(child, parent) {
            warn!("refusing to append {child} into its own subtree");
            return;
        }
        self.remove(child);
        let mut elements = self.elements.borrow_mut();
        if elements.get(parent.0).is_none() || elements.get(child.0).is_none() {
            return;
        }
        elements[child.0].parent = Some(parent);
        elements[parent.0].children.push(child);
    }

    fn remove_children(&self, node: NodeId) {
        let mut elements = self.elements.borrow_mut();
        let Some(el) = elements.get_mut(node.0) else {
            return;
        };
        let children = std::mem::take(&mut el.children);
        for child in children {
            if let Some(child_el) = elements.get_mut(child.0) {
                child_el.parent = None;
            }
        }
    }

    fn remove(&self, node: NodeId) {
        let mut elements = self.elements.borrow_mut();
        let Some(parent) = elements.get(node.0).and_then(|el| el.parent) else {
            return;
        };
        if let Some(parent_el) = elements.get_mut(parent.0) {
            parent_el.children.retain(|c| *c != node);
        }
        elements[node.0].parent = None;
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.elements.borrow().get(node.0).and_then(|el| el.parent)
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let elements = self.elements.borrow();
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = elements.get(current.0).and_then(|el| el.parent);
        }
        false
    }

    fn query_selector(&self, root: NodeId, selector: &str) -> Option<NodeId> {
        self.query_all(root, selector).into_iter().next()
    }

    fn supports_selector(&self, selector: &str) -> bool {
        Selector::parse(selector).is_some()
    }

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        self.with_element_mut(node, |el| {
            el.attrs.insert(name.to_string(), value.to_string());
        });
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.elements
            .borrow()
            .get(node.0)
            .and_then(|el| el.attrs.get(name).cloned())
    }

    fn remove_attribute(&self, node: NodeId, name: &str) {
        self.with_element_mut(node, |el| {
            el.attrs.remove(name);
        });
    }

    fn add_class(&self, node: NodeId, class: &str) {
        self.with_element_mut(node, |el| {
            for class in class.split_whitespace() {
                if !el.classes.iter().any(|c| c == class) {
                    el.classes.push(class.to_string());
                }
            }
        });
    }

    fn remove_class(&self, node: NodeId, class: &str) {
        self.with_element_mut(node, |el| el.classes.retain(|c| c != class));
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.elements
            .borrow()
            .get(node.0)
            .map(|el| el.classes.iter().any(|c| c == class))
            .unwrap_or(false)
    }

    fn classes(&self, node: NodeId) -> Vec<String> {
        self.elements
            .borrow()
            .get(node.0)
            .map(|el| el.classes.clone())
            .unwrap_or_default()
    }

    fn set_classes(&self, node: NodeId, classes: &[String]) {
        self.with_element_mut(node, |el| {
            el.classes.clear();
            for class in classes.iter().flat_map(|c| c.split_whitespace()) {
                if !el.classes.iter().any(|c| c == class) {
                    el.classes.push(class.to_string());
                }
            }
        });
    }

    fn set_text(&self, node: NodeId, text: &str) {
        self.with_element_mut(node, |el| el.text = text.to_string());
    }

    fn text(&self, node: NodeId) -> String {
        self.elements
            .borrow()
            .get(node.0)
            .map(|el| el.text.clone())
            .unwrap_or_default()
    }

    fn set_visible(&self, node: NodeId, visible: bool) {
        self.with_element_mut(node, |el| el.visible = visible);
    }

    fn is_visible(&self, node: NodeId) -> bool {
        self.elements
            .borrow()
            .get(node.0)
            .map(|el| el.visible)
            .unwrap_or(false)
    }

    fn bounding_box(&self, node: NodeId) -> Rect {
        let (layout, position, size) = {
            let elements = self.elements.borrow();
            let Some(el) = elements.get(node.0) else {
                return Rect::default();
            };
            (el.layout, el.position, el.size)
        };
        if let Some(rect) = layout {
            return rect;
        }
        let origin = position.unwrap_or_default();
        let size = size.unwrap_or_else(|| self.measure(node));
        Rect::from_origin_size(origin, size)
    }

    fn content_size(&self, node: NodeId) -> Size {
        self.measure(node)
    }

    fn set_size(&self, node: NodeId, size: Size) {
        self.with_element_mut(node, |el| el.size = Some(size));
    }

    fn set_position(&self, node: NodeId, position: Point) {
        self.with_element_mut(node, |el| el.position = Some(position));
    }

    fn position(&self, node: NodeId) -> Point {
        self.bounding_box(node).origin()
    }

    fn viewport(&self) -> Size {
        self.viewport.get()
    }

    fn listen(
        &self,
        node: NodeId,
        event: &str,
        selector: Option<&str>,
        handler: EventHandler,
    ) -> ListenerHandle {
        let handle = ListenerHandle(self.next_listener.get());
        self.next_listener.set(handle.0 + 1);

        let filter = match selector {
            None => Filter::Direct,
            Some(source) => match Selector::parse(source) {
                Some(selector) => Filter::Delegated(selector),
                None => {
                    warn!("unsupported selector {source:?}, listener will never fire");
                    Filter::Never
                }
            },
        };

        self.listeners.borrow_mut().push(Listener {
            handle,
            node,
            event: event.to_string(),
            filter,
            handler,
        });
        handle
    }

    fn unlisten(&self, handle: ListenerHandle) {
        self.listeners.borrow_mut().retain(|l| l.handle != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn counter() -> (Rc<Cell<usize>>, EventHandler) {
        let count = Rc::new(Cell::new(0));
        let inner = count.clone();
        (count, Rc::new(move |_: &mut UiEvent| inner.set(inner.get() + 1)))
    }

    #[test]
    fn test_tree_manipulation() {
        let surface = HeadlessSurface::new();
        let list = surface.add_element(surface.body(), "ul", &["menu"]);
        let item = surface.add_element(list, "li", &[]);

        assert_eq!(surface.parent(item), Some(list));
        assert!(surface.contains(surface.body(), item));

        surface.remove_children(list);
        assert_eq!(surface.parent(item), None);
        assert!(surface.children(list).is_empty());
    }

    #[test]
    fn test_delegated_listener_sees_future_elements() {
        let surface = HeadlessSurface::new();
        let (count, handler) = counter();
        surface.listen(surface.body(), names::CLICK, Some(".row"), handler);

        let row = surface.add_element(surface.body(), "div", &["row"]);
        let cell = surface.add_element(row, "span", &[]);
        surface.click(cell);

        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_delegated_current_target_is_match() {
        let surface = HeadlessSurface::new();
        let row = surface.add_element(surface.body(), "div", &["row"]);
        let cell = surface.add_element(row, "span", &[]);
        let seen = Rc::new(Cell::new(None));
        let inner = seen.clone();
        surface.listen(
            surface.body(),
            names::CLICK,
            Some(".row"),
            Rc::new(move |event: &mut UiEvent| inner.set(Some(event.current_target))),
        );

        surface.click(cell);
        assert_eq!(seen.get(), Some(row));
    }

    #[test]
    fn test_stop_propagation() {
        let surface = HeadlessSurface::new();
        let inner = surface.add_element(surface.body(), "div", &[]);
        let (outer_count, outer_handler) = counter();
        surface.listen(surface.body(), names::CLICK, None, outer_handler);
        surface.listen(
            inner,
            names::CLICK,
            None,
            Rc::new(|event: &mut UiEvent| event.stop_propagation()),
        );

        let event = surface.click(inner);
        assert!(event.is_propagation_stopped());
        assert_eq!(outer_count.get(), 0);
    }

    #[test]
    fn test_listener_added_during_dispatch_does_not_fire() {
        let surface = Rc::new(HeadlessSurface::new());
        let (count, late_handler) = counter();
        let weak = Rc::downgrade(&surface);
        surface.listen(
            surface.body(),
            names::CLICK,
            None,
            Rc::new(move |_: &mut UiEvent| {
                if let Some(surface) = weak.upgrade() {
                    surface.listen(surface.body(), names::CLICK, None, late_handler.clone());
                }
            }),
        );

        surface.click(surface.body());
        assert_eq!(count.get(), 0);
        surface.click(surface.body());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_leave_does_not_bubble() {
        let surface = HeadlessSurface::new();
        let outer = surface.add_element(surface.body(), "div", &[]);
        let inner = surface.add_element(outer, "div", &[]);
        let (count, handler) = counter();
        surface.listen(outer, names::MOUSE_LEAVE, None, handler);

        surface.pointer_leave(inner, None);
        assert_eq!(count.get(), 0);
        surface.pointer_leave(outer, None);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_delegated_enter_fires_for_matching_target() {
        let surface = HeadlessSurface::new();
        let row = surface.add_element(surface.body(), "div", &["row"]);
        let (count, handler) = counter();
        surface.listen(surface.body(), names::MOUSE_ENTER, Some(".row"), handler);

        surface.pointer_enter(row);
        assert_eq!(count.get(), 1);
        surface.pointer_enter(surface.body());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_unlisten() {
        let surface = HeadlessSurface::new();
        let (count, handler) = counter();
        let handle = surface.listen(surface.body(), names::CLICK, None, handler);
        assert_eq!(surface.listener_count(), 1);

        surface.unlisten(handle);
        surface.unlisten(handle);
        surface.click(surface.body());

        assert_eq!(surface.listener_count(), 0);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_stacked_measurement() {
        let surface = HeadlessSurface::new();
        let list = surface.add_element(surface.body(), "ul", &[]);
        surface.add_element(list, "li", &[]);
        surface.add_element(list, "li", &["divider"]);
        let hidden = surface.add_element(list, "li", &[]);
        surface.set_visible(hidden, false);

        assert_eq!(surface.content_size(list), Size::new(160.0, 33.0));
    }

    #[test]
    fn test_explicit_layout_wins() {
        let surface = HeadlessSurface::new();
        let node = surface.add_element(surface.body(), "div", &[]);
        surface.set_layout(node, Rect::new(10.0, 20.0, 30.0, 40.0));

        assert_eq!(surface.bounding_box(node), Rect::new(10.0, 20.0, 30.0, 40.0));
    }

    #[test]
    fn test_closest_and_query() {
        let surface = HeadlessSurface::new();
        let list = surface.add_element(surface.body(), "ul", &[]);
        let item = surface.add_element(list, "li", &[]);
        surface.set_attribute(item, "data-menu-item", "3");
        let anchor = surface.add_element(item, "a", &[]);

        assert_eq!(surface.closest(anchor, "[data-menu-item]"), Some(item));
        assert_eq!(surface.query_selector(surface.body(), "li"), Some(item));
        assert_eq!(surface.closest(list, "[data-menu-item]"), None);
    }

    #[test]
    fn test_supports_selector() {
        let surface = HeadlessSurface::new();
        assert!(surface.supports_selector("li.file[data-id], #row"));
        assert!(!surface.supports_selector(".files .file"));
        assert!(!surface.supports_selector("li:hover"));
    }

    #[test]
    fn test_removed_nodes_stay_addressable() {
        let surface = HeadlessSurface::new();
        let list = surface.add_element(surface.body(), "ul", &[]);
        let row = surface.add_element(list, "li", &["row"]);
        surface.set_text(row, "kept");

        surface.remove_children(list);
        assert!(surface.children(list).is_empty());
        assert_eq!(surface.parent(row), None);
        assert_eq!(surface.text(row), "kept");

        let fresh = surface.add_element(list, "li", &[]);
        assert_ne!(fresh, row);

        surface.append_child(list, row);
        assert_eq!(surface.children(list), vec![fresh, row]);
    }
}
