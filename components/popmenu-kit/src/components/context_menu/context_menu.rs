use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{debug, error, trace, warn};

use super::constants::{ATTR_MENU_ITEM, ATTR_SUBACTION, DISABLED_CLASS, PULL_LEFT_CLASS};
use super::listeners::ListenerManager;
use super::options::{FetchElementData, MenuEvent, MenuOptions, MenuSettings};
use super::position::{submenus_overflow, Anchor, MenuPosition, MenuSource};
use super::registry::{MenuRegistry, RegisteredMenu, RegistryKey};
use super::renderer::{ActionEntry, ActionIndex, ContextMenuRenderer, MenuSkeleton, SubactionBinding};
use super::state::{ContextMenuState, OpenEvent};
use crate::components::menu_item::Submenu;
use crate::error::{ConfigurationError, MenuError, Result};
use crate::surfaces::{names, EventHandler, NodeId, Rect, UiEvent, UiSurface};

/// Context menu attached to every element matching a selector
///
/// Cheap to clone; clones drive the same menu. The menu lives until
/// [`destroy`](Self::destroy) is called: dropping every handle without
/// destroying leaves the rendered overlay on the surface and turns its
/// listeners into no-ops.
pub struct ContextMenu<C: 'static> {
    inner: Rc<MenuInner<C>>,
}

impl<C: 'static> Clone for ContextMenu<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

struct MenuInner<C: 'static> {
    selector: String,
    settings: MenuSettings,
    menu_event: MenuEvent,
    fetch_element_data: FetchElementData<C>,

    surface: Rc<dyn UiSurface>,
    container: NodeId,
    skeleton: MenuSkeleton,
    index: ActionIndex<C>,

    state: RefCell<ContextMenuState>,
    listeners: RefCell<ListenerManager>,

    registry: MenuRegistry,
    registry_key: Cell<Option<RegistryKey>>,
}

impl<C: 'static> ContextMenu<C> {
    // === Construction ===

    /// Render the menu into its container and start listening for `selector`
    ///
    /// Fails when the open event is unknown, the selector or the select event
    /// is empty, the surface cannot filter on the selector, or the container
    /// selector matches nothing. Source and
    /// position are only checked when the menu is placed.
    pub fn new(
        selector: impl Into<String>,
        options: MenuOptions<C>,
        surface: Rc<dyn UiSurface>,
        registry: &MenuRegistry,
    ) -> Result<Self> {
        let selector = selector.into();
        if selector.trim().is_empty() {
            return Err(ConfigurationError::EmptySelector.into());
        }

        let MenuOptions {
            actions,
            settings,
            container,
            fetch_element_data,
        } = options;

        if settings.action_select_event.trim().is_empty() {
            return Err(ConfigurationError::EmptyActionSelectEvent.into());
        }
        let menu_event = settings.parsed_event()?;
        if !surface.supports_selector(&selector) {
            return Err(ConfigurationError::UnsupportedSelector(selector).into());
        }

        let container = match (container, settings.container.as_deref()) {
            (Some(node), _) => node,
            (None, Some(container_selector)) => surface
                .query_selector(surface.body(), container_selector)
                .ok_or_else(|| ConfigurationError::UnknownContainer(container_selector.to_string()))?,
            (None, None) => surface.body(),
        };

        let (skeleton, index) = ContextMenuRenderer::render(
            surface.as_ref(),
            container,
            actions,
            &settings.no_actions_message,
        );

        let inner = Rc::new(MenuInner {
            selector,
            settings,
            menu_event,
            fetch_element_data,
            surface,
            container,
            skeleton,
            index,
            state: RefCell::new(ContextMenuState::new()),
            listeners: RefCell::new(ListenerManager::new()),
            registry: registry.clone(),
            registry_key: Cell::new(None),
        });

        inner.arm_open_listener();
        inner.arm_select_listener();

        let member = Rc::downgrade(&inner);
        let member: Weak<dyn RegisteredMenu> = member;
        inner.registry_key.set(Some(registry.register(member)));

        debug!(
            selector = %inner.selector,
            event = %inner.menu_event,
            actions = inner.index.len(),
            "context menu created"
        );
        Ok(Self { inner })
    }

    // === Lifecycle ===

    /// Open the menu on `target`, closing every menu of the registry first
    pub fn open(&self, target: NodeId, event: &UiEvent) -> Result<()> {
        self.inner.open(target, event)
    }

    /// Hide the menu; closing a closed menu does nothing
    pub fn close(&self) {
        self.inner.close();
    }

    /// Recompute the overlay placement for the last opening
    pub fn update_position(&self) -> Result<()> {
        self.inner.update_position()
    }

    /// Close the menu, release all its listeners, remove its overlay and
    /// leave the registry. Later calls are no-ops.
    pub fn destroy(&self) {
        self.inner.destroy();
    }

    // === Getters ===

    pub fn is_open(&self) -> bool {
        self.inner.state.borrow().is_open()
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.state.borrow().is_destroyed()
    }

    pub fn selector(&self) -> &str {
        &self.inner.selector
    }

    pub fn settings(&self) -> &MenuSettings {
        &self.inner.settings
    }

    pub fn container(&self) -> NodeId {
        self.inner.container
    }

    pub fn overlay(&self) -> NodeId {
        self.inner.skeleton.overlay
    }

    pub fn list(&self) -> NodeId {
        self.inner.skeleton.list
    }

    pub fn placeholder(&self) -> NodeId {
        self.inner.skeleton.placeholder
    }

    /// Snapshot of the open/close state
    pub fn state(&self) -> ContextMenuState {
        self.inner.state.borrow().clone()
    }

    /// Number of indexed actions
    pub fn entry_count(&self) -> usize {
        self.inner.index.len()
    }

    /// Element of the action with the given index
    pub fn action_element(&self, index: usize) -> Option<NodeId> {
        self.inner.index.get(index).map(|entry| entry.element)
    }

    /// Submenu list of the action with the given index
    pub fn submenu_list(&self, index: usize) -> Option<NodeId> {
        self.inner.index.get(index).and_then(|entry| entry.submenu_list)
    }

    /// Live subscriptions held by this menu
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

impl<C: 'static> MenuInner<C> {
    fn is_destroyed(&self) -> bool {
        self.state.borrow().is_destroyed()
    }

    // === Listener wiring ===

    fn arm_open_listener(self: &Rc<Self>) {
        let menu = Rc::downgrade(self);
        let handler: EventHandler = Rc::new(move |event: &mut UiEvent| {
            let Some(menu) = menu.upgrade() else {
                return;
            };
            // Keeps the native menu away and the event from reaching the
            // container's click-outside listener
            event.prevent_default();
            event.stop_propagation();

            let target = event.current_target;
            if let Err(err) = menu.open(target, event) {
                error!(selector = %menu.selector, "failed to open context menu: {err}");
            }
        });

        self.listeners.borrow_mut().open.arm(
            self.surface.as_ref(),
            self.container,
            self.menu_event.open_event_name(),
            Some(&self.selector),
            handler,
        );
    }

    fn arm_select_listener(self: &Rc<Self>) {
        let menu = Rc::downgrade(self);
        let handler: EventHandler = Rc::new(move |event: &mut UiEvent| {
            let Some(menu) = menu.upgrade() else {
                return;
            };
            event.prevent_default();
            event.stop_propagation();
            menu.select(event.target);
        });

        self.listeners.borrow_mut().select.arm(
            self.surface.as_ref(),
            self.skeleton.overlay,
            &self.settings.action_select_event,
            None,
            handler,
        );
    }

    fn arm_close_listeners(self: &Rc<Self>, target: NodeId) {
        let surface = self.surface.as_ref();
        let mut listeners = self.listeners.borrow_mut();

        if self.menu_event == MenuEvent::Hover {
            for node in [target, self.skeleton.overlay] {
                let menu = Rc::downgrade(self);
                let handler: EventHandler = Rc::new(move |event: &mut UiEvent| {
                    if let Some(menu) = menu.upgrade() {
                        menu.on_hover_leave(event.related_target);
                    }
                });
                listeners
                    .hover_leave
                    .arm(surface, node, names::MOUSE_LEAVE, None, handler);
            }
        }

        let menu = Rc::downgrade(self);
        let handler: EventHandler = Rc::new(move |_: &mut UiEvent| {
            if let Some(menu) = menu.upgrade() {
                debug!(selector = %menu.selector, "click outside the menu");
                menu.close();
            }
        });
        listeners
            .close
            .arm(surface, self.container, names::CLICK, None, handler);
    }

    fn bind_subaction(self: &Rc<Self>, binding: SubactionBinding<C>, ctx: Rc<C>) {
        let menu = Rc::downgrade(self);
        let SubactionBinding { anchor, on_click } = binding;
        let handler: EventHandler = Rc::new(move |event: &mut UiEvent| {
            event.prevent_default();
            event.stop_propagation();
            on_click(ctx.as_ref());
            if let Some(menu) = menu.upgrade() {
                menu.close();
            }
        });

        self.listeners.borrow_mut().subactions.arm(
            self.surface.as_ref(),
            anchor,
            &self.settings.action_select_event,
            None,
            handler,
        );
    }

    // === Event handlers ===

    fn on_hover_leave(&self, related: Option<NodeId>) {
        let Some(target) = self.state.borrow().open_target() else {
            return;
        };
        if let Some(to) = related {
            if self.surface.contains(target, to) || self.surface.contains(self.skeleton.overlay, to)
            {
                trace!(selector = %self.selector, %to, "pointer moved within the menu");
                return;
            }
        }

        self.listeners
            .borrow_mut()
            .hover_leave
            .disarm(self.surface.as_ref());
        self.close();
    }

    fn select(&self, target: NodeId) {
        let Some(entry) = self.entry_for(target) else {
            warn!(selector = %self.selector, %target, "selection outside of any action");
            return;
        };
        if !self.state.borrow().is_open() || !self.surface.is_visible(entry.element) {
            warn!(index = entry.index, "ignoring selection of an action that is not shown");
            return;
        }
        if self.surface.has_class(entry.element, DISABLED_CLASS) {
            warn!(index = entry.index, "ignoring selection of a disabled action");
            return;
        }
        let Some(open_target) = self.state.borrow().open_target() else {
            return;
        };

        debug!(selector = %self.selector, index = entry.index, "action selected");
        let ctx = (self.fetch_element_data)(open_target);
        if let Some(on_click) = entry.item.click_handler().cloned() {
            on_click(&ctx);
        }
        self.close();
    }

    /// Nearest indexed action at or above `node`, inside the overlay
    fn entry_for(&self, node: NodeId) -> Option<&ActionEntry<C>> {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == self.skeleton.overlay
                || self.surface.attribute(current, ATTR_SUBACTION).is_some()
            {
                return None;
            }
            if let Some(raw) = self.surface.attribute(current, ATTR_MENU_ITEM) {
                return raw.parse::<usize>().ok().and_then(|i| self.index.get(i));
            }
            cursor = self.surface.parent(current);
        }
        None
    }

    // === State machine ===

    fn open(self: &Rc<Self>, target: NodeId, event: &UiEvent) -> Result<()> {
        if self.is_destroyed() {
            return Err(MenuError::Destroyed);
        }
        let source = self.settings.parsed_source()?;
        let position = self.settings.parsed_position()?;

        // Completes synchronously, this menu included, before going on
        self.registry.close_all();

        self.state
            .borrow_mut()
            .begin_open(target, OpenEvent::from(event));

        let ctx = Rc::new((self.fetch_element_data)(target));
        let (shown, disabled) = self.recompute(&ctx);
        if shown == 0 {
            self.surface.set_visible(self.skeleton.placeholder, true);
        }

        self.place(source, position);
        self.surface.set_visible(self.skeleton.overlay, true);
        self.arm_close_listeners(target);
        self.state.borrow_mut().finish_open(shown, disabled);

        debug!(
            selector = %self.selector,
            %target,
            shown,
            disabled,
            "context menu opened"
        );
        Ok(())
    }

    /// Refresh every entry for the context of this opening
    ///
    /// Returns the number of shown and of disabled entries.
    fn recompute(self: &Rc<Self>, ctx: &Rc<C>) -> (usize, usize) {
        let surface = self.surface.as_ref();
        let data: &C = ctx.as_ref();

        self.listeners.borrow_mut().subactions.disarm(surface);
        surface.set_visible(self.skeleton.placeholder, false);

        let mut hidden = vec![false; self.index.len()];
        let mut shown = 0;
        let mut disabled = 0;

        for entry in self.index.iter() {
            surface.set_visible(entry.element, true);
            let extra = entry
                .item
                .classes()
                .map(|spec| spec.resolve(data))
                .unwrap_or_default();
            surface.set_classes(
                entry.element,
                &ContextMenuRenderer::merge_classes(&entry.base_classes, &extra),
            );

            let parent_hidden = entry.parent.is_some_and(|parent| hidden[parent]);
            if parent_hidden || !entry.item.is_shown(data) {
                hidden[entry.index] = true;
                surface.set_visible(entry.element, false);
                trace!(index = entry.index, parent_hidden, "action hidden");
                continue;
            }
            shown += 1;

            surface.set_text(entry.label, &entry.item.name().resolve(data));
            if let Some(icon) = entry.item.icon() {
                ContextMenuRenderer::set_icon(surface, entry.icon, &icon.resolve(data));
            }

            if let (Some(Submenu::Dynamic(subactions)), Some(list)) =
                (entry.item.submenu(), entry.submenu_list)
            {
                let nodes = subactions(data);
                trace!(index = entry.index, count = nodes.len(), "rebuilding subactions");
                for binding in ContextMenuRenderer::render_subactions(surface, list, nodes) {
                    self.bind_subaction(binding, ctx.clone());
                }
            }

            if !entry.item.is_enabled(data) {
                surface.add_class(entry.element, DISABLED_CLASS);
                disabled += 1;
            }
        }

        (shown, disabled)
    }

    /// Size and position the overlay, then flip submenus near the right edge
    fn place(&self, source: MenuSource, position: MenuPosition) {
        let surface = self.surface.as_ref();
        let source_rect = {
            let state = self.state.borrow();
            match source {
                MenuSource::Element => state.open_target().map(|t| surface.bounding_box(t)),
                MenuSource::Mouse => state.open_event().map(|e| Rect::at_point(e.pointer)),
            }
        };
        let Some(source_rect) = source_rect else {
            return;
        };

        // Content may differ between openings, measure while displayed
        surface.set_visible(self.skeleton.overlay, true);
        let size = surface.content_size(self.skeleton.list);
        surface.set_size(self.skeleton.overlay, size);

        let point = Anchor::from(position).place(size, &source_rect);
        surface.set_position(self.skeleton.overlay, point);
        debug!(
            selector = %self.selector,
            %position,
            x = point.x,
            y = point.y,
            width = size.width,
            height = size.height,
            "overlay placed"
        );

        let flip = submenus_overflow(point.x, size.width, surface.viewport());
        for marker in self.index.submenu_markers() {
            surface.remove_class(marker, PULL_LEFT_CLASS);
            if flip {
                surface.add_class(marker, PULL_LEFT_CLASS);
            }
        }
    }

    fn update_position(&self) -> Result<()> {
        if self.is_destroyed() {
            return Err(MenuError::Destroyed);
        }
        let source = self.settings.parsed_source()?;
        let position = self.settings.parsed_position()?;

        if self.state.borrow().open_target().is_none() {
            return Ok(());
        }
        self.place(source, position);
        if !self.state.borrow().is_open() {
            self.surface.set_visible(self.skeleton.overlay, false);
        }
        Ok(())
    }

    fn close(&self) {
        let was_open = {
            let mut state = self.state.borrow_mut();
            if state.is_destroyed() {
                return;
            }
            state.close()
        };

        self.surface.set_visible(self.skeleton.overlay, false);
        self.listeners
            .borrow_mut()
            .disarm_close(self.surface.as_ref());
        if was_open {
            debug!(selector = %self.selector, "context menu closed");
        }
    }

    fn destroy(&self) {
        if self.is_destroyed() {
            return;
        }
        self.close();
        self.listeners
            .borrow_mut()
            .disarm_all(self.surface.as_ref());
        if let Some(key) = self.registry_key.take() {
            self.registry.unregister(key);
        }
        self.surface.remove(self.skeleton.overlay);
        self.state.borrow_mut().mark_destroyed();
        debug!(selector = %self.selector, "context menu destroyed");
    }
}

impl<C: 'static> RegisteredMenu for MenuInner<C> {
    fn close(&self) {
        MenuInner::close(self);
    }

    fn is_open(&self) -> bool {
        self.state.borrow().is_open()
    }
}
