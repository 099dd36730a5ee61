use std::rc::Rc;

use super::{NodeId, Point};

/// Event names understood by the menu components
pub mod names {
    pub const CLICK: &str = "click";
    pub const CONTEXT_MENU: &str = "contextmenu";
    pub const MOUSE_DOWN: &str = "mousedown";
    pub const MOUSE_ENTER: &str = "mouseenter";
    pub const MOUSE_LEAVE: &str = "mouseleave";

    /// Whether events with this name travel from the target up to the root
    pub fn bubbles(name: &str) -> bool {
        !matches!(name, MOUSE_ENTER | MOUSE_LEAVE)
    }
}

/// Callback installed with [`UiSurface::listen`](super::UiSurface::listen)
pub type EventHandler = Rc<dyn Fn(&mut UiEvent)>;

/// Subscription token returned by [`UiSurface::listen`](super::UiSurface::listen)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(pub(crate) u64);

/// An input event as seen by listeners
#[derive(Debug, Clone)]
pub struct UiEvent {
    pub name: String,
    /// Element the event originated from
    pub target: NodeId,
    /// Element the running listener is attached to, or the delegate that
    /// matched its selector
    pub current_target: NodeId,
    /// For leave/enter events, the element the pointer moved to/from
    pub related_target: Option<NodeId>,
    pub page_x: f32,
    pub page_y: f32,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl UiEvent {
    pub fn new(name: impl Into<String>, target: NodeId) -> Self {
        Self {
            name: name.into(),
            target,
            current_target: target,
            related_target: None,
            page_x: 0.0,
            page_y: 0.0,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.page_x = x;
        self.page_y = y;
        self
    }

    pub fn with_related_target(mut self, related: Option<NodeId>) -> Self {
        self.related_target = related;
        self
    }

    pub fn pointer(&self) -> Point {
        Point::new(self.page_x, self.page_y)
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}
