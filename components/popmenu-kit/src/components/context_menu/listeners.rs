use tracing::debug;

use crate::surfaces::{EventHandler, ListenerHandle, NodeId, UiSurface};

/// Subscriptions installed and released together
///
/// Every handle a group arms is released by its `disarm`, which is safe to
/// call any number of times.
#[derive(Debug)]
pub struct ListenerGroup {
    name: &'static str,
    handles: Vec<ListenerHandle>,
}

impl ListenerGroup {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            handles: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_armed(&self) -> bool {
        !self.handles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn arm(
        &mut self,
        surface: &dyn UiSurface,
        node: NodeId,
        event: &str,
        selector: Option<&str>,
        handler: EventHandler,
    ) {
        let handle = surface.listen(node, event, selector, handler);
        self.handles.push(handle);
    }

    pub fn disarm(&mut self, surface: &dyn UiSurface) {
        if self.handles.is_empty() {
            return;
        }
        debug!(group = self.name, count = self.handles.len(), "disarming listeners");
        for handle in self.handles.drain(..) {
            surface.unlisten(handle);
        }
    }
}

/// The listener groups of one menu
///
/// - `open`: delegated trigger listener on the container
/// - `select`: action selection on the overlay
/// - `close`: click outside, plus the hover leave listeners, armed while open
/// - `hover_leave`: the one-shot leave listeners of hover menus
/// - `subactions`: click bindings of the dynamic submenu leaves
#[derive(Debug)]
pub struct ListenerManager {
    pub open: ListenerGroup,
    pub select: ListenerGroup,
    pub close: ListenerGroup,
    pub hover_leave: ListenerGroup,
    pub subactions: ListenerGroup,
}

impl Default for ListenerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ListenerManager {
    pub fn new() -> Self {
        Self {
            open: ListenerGroup::new("open"),
            select: ListenerGroup::new("select"),
            close: ListenerGroup::new("close"),
            hover_leave: ListenerGroup::new("hover-leave"),
            subactions: ListenerGroup::new("subactions"),
        }
    }

    /// Release everything armed while the menu is open
    pub fn disarm_close(&mut self, surface: &dyn UiSurface) {
        self.hover_leave.disarm(surface);
        self.close.disarm(surface);
    }

    pub fn disarm_all(&mut self, surface: &dyn UiSurface) {
        self.disarm_close(surface);
        self.subactions.disarm(surface);
        self.select.disarm(surface);
        self.open.disarm(surface);
    }

    /// Total number of live subscriptions held
    pub fn len(&self) -> usize {
        self.open.len()
            + self.select.len()
            + self.close.len()
            + self.hover_leave.len()
            + self.subactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surfaces::{names, HeadlessSurface, UiEvent};
    use std::rc::Rc;

    fn noop() -> EventHandler {
        Rc::new(|_: &mut UiEvent| {})
    }

    #[test]
    fn test_group_arm_disarm() {
        let surface = HeadlessSurface::new();
        let mut group = ListenerGroup::new("close");
        group.arm(&surface, surface.body(), names::CLICK, None, noop());
        group.arm(&surface, surface.body(), names::MOUSE_LEAVE, None, noop());
        assert!(group.is_armed());
        assert_eq!(surface.listener_count(), 2);

        group.disarm(&surface);
        group.disarm(&surface);
        assert!(!group.is_armed());
        assert_eq!(surface.listener_count(), 0);
    }

    #[test]
    fn test_disarm_close_leaves_other_groups() {
        let surface = HeadlessSurface::new();
        let mut manager = ListenerManager::new();
        manager.open.arm(&surface, surface.body(), names::CLICK, Some(".row"), noop());
        manager.close.arm(&surface, surface.body(), names::CLICK, None, noop());
        manager.hover_leave.arm(&surface, surface.body(), names::MOUSE_LEAVE, None, noop());

        manager.disarm_close(&surface);
        assert_eq!(manager.len(), 1);
        assert_eq!(surface.listener_count(), 1);

        manager.disarm_all(&surface);
        assert!(manager.is_empty());
        assert_eq!(surface.listener_count(), 0);
    }
}
