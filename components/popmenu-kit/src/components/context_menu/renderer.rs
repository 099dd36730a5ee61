use tracing::trace;

use super::constants::*;
use crate::components::menu_item::{ActionItem, ActionNode, ClickHandler, SubactionNode};
use crate::surfaces::{NodeId, UiSurface};

/// Root elements of a rendered menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuSkeleton {
    /// Absolutely positioned root, hidden while closed
    pub overlay: NodeId,
    /// Top-level list; its content box gives the overlay size
    pub list: NodeId,
    /// "No actions" entry, revealed when nothing else is shown
    pub placeholder: NodeId,
}

/// An indexed, selectable action
pub struct ActionEntry<C> {
    /// Stable position in depth-first document order
    pub index: usize,
    /// Index of the action owning the static submenu this entry lives in
    pub parent: Option<usize>,
    pub is_subaction: bool,
    pub item: ActionItem<C>,

    pub element: NodeId,
    pub anchor: NodeId,
    pub icon: NodeId,
    pub label: NodeId,
    /// List holding the entry's submenu, static or dynamic
    pub submenu_list: Option<NodeId>,
    /// Classes the element was rendered with
    pub base_classes: Vec<String>,
}

impl<C> ActionEntry<C> {
    pub fn has_submenu(&self) -> bool {
        self.submenu_list.is_some()
    }
}

/// Dense `index -> ActionEntry` table built once per menu
pub struct ActionIndex<C> {
    entries: Vec<ActionEntry<C>>,
}

impl<C> ActionIndex<C> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ActionEntry<C>> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionEntry<C>> {
        self.entries.iter()
    }

    /// Elements flagged as owning a submenu
    pub fn submenu_markers(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries
            .iter()
            .filter(|entry| entry.has_submenu())
            .map(|entry| entry.element)
    }
}

/// Rendered leaf of a dynamic submenu, waiting for its click binding
pub struct SubactionBinding<C> {
    pub anchor: NodeId,
    pub on_click: ClickHandler<C>,
}

/// Builds menu markup on a [`UiSurface`]
///
/// Stateless - the surface owns the elements, the caller owns the index.
pub struct ContextMenuRenderer;

impl ContextMenuRenderer {
    /// Render the static skeleton into `container` and index its actions
    ///
    /// Indices are assigned depth-first: an action gets its index before the
    /// actions of its static submenu are visited. Dynamic submenus only get
    /// an empty list here, filled at every opening.
    pub fn render<C>(
        surface: &dyn UiSurface,
        container: NodeId,
        actions: Vec<ActionNode<C>>,
        no_actions_message: &str,
    ) -> (MenuSkeleton, ActionIndex<C>) {
        let overlay = surface.create_element("div");
        for class in OVERLAY_CLASSES {
            surface.add_class(overlay, class);
        }
        surface.set_visible(overlay, false);

        let list = surface.create_element("ul");
        surface.add_class(list, LIST_CLASS);
        surface.append_child(overlay, list);

        let mut entries = Vec::new();
        Self::render_nodes(surface, list, actions, None, &mut entries);

        let placeholder = Self::render_placeholder(surface, no_actions_message);
        surface.append_child(list, placeholder);

        surface.append_child(container, overlay);

        trace!(actions = entries.len(), "rendered menu skeleton");
        (
            MenuSkeleton {
                overlay,
                list,
                placeholder,
            },
            ActionIndex { entries },
        )
    }

    fn render_nodes<C>(
        surface: &dyn UiSurface,
        list: NodeId,
        nodes: Vec<ActionNode<C>>,
        parent: Option<usize>,
        entries: &mut Vec<ActionEntry<C>>,
    ) {
        for node in nodes {
            match node {
                ActionNode::Header(text) => {
                    let li = Self::text_row(surface, HEADER_CLASS, &text);
                    surface.append_child(list, li);
                }
                ActionNode::Divider => {
                    let li = Self::divider(surface);
                    surface.append_child(list, li);
                }
                ActionNode::Action(item) => {
                    Self::render_action(surface, list, item, parent, entries);
                }
            }
        }
    }

    fn render_action<C>(
        surface: &dyn UiSurface,
        list: NodeId,
        mut item: ActionItem<C>,
        parent: Option<usize>,
        entries: &mut Vec<ActionEntry<C>>,
    ) {
        let index = entries.len();
        let element = surface.create_element("li");
        surface.set_attribute(element, ATTR_ROLE, ROLE_MENU);
        surface.set_attribute(element, ATTR_MENU_ITEM, &index.to_string());
        if item.has_submenu() {
            surface.add_class(element, SUBMENU_CLASS);
        }

        let anchor = surface.create_element("a");
        surface.set_attribute(anchor, ATTR_ROLE, ROLE_MENU_ITEM);
        let icon = surface.create_element("i");
        surface.add_class(icon, ICON_BASE_CLASS);
        let label = surface.create_element("span");
        surface.add_class(label, ACTION_NAME_CLASS);
        surface.append_child(anchor, icon);
        surface.append_child(anchor, label);
        surface.append_child(element, anchor);
        surface.append_child(list, element);

        let submenu_list = item.has_submenu().then(|| {
            let sub = surface.create_element("ul");
            surface.add_class(sub, LIST_CLASS);
            surface.append_child(element, sub);
            sub
        });
        let children = item.take_static_submenu();

        entries.push(ActionEntry {
            index,
            parent,
            is_subaction: parent.is_some(),
            item,
            element,
            anchor,
            icon,
            label,
            submenu_list,
            base_classes: surface.classes(element),
        });

        if let (Some(children), Some(sub)) = (children, submenu_list) {
            Self::render_nodes(surface, sub, children, Some(index), entries);
        }
    }

    fn render_placeholder(surface: &dyn UiSurface, message: &str) -> NodeId {
        let li = surface.create_element("li");
        surface.set_attribute(li, ATTR_ROLE, ROLE_MENU);
        surface.add_class(li, NO_ACTIONS_CLASS);
        surface.add_class(li, DISABLED_CLASS);
        let anchor = surface.create_element("a");
        surface.set_attribute(anchor, ATTR_ROLE, ROLE_MENU_ITEM);
        let span = surface.create_element("span");
        surface.set_text(span, message);
        surface.append_child(anchor, span);
        surface.append_child(li, anchor);
        surface.set_visible(li, false);
        li
    }

    /// Replace the content of a dynamic submenu list
    ///
    /// Returns the leaves that carry a click handler; the caller binds them.
    pub fn render_subactions<C>(
        surface: &dyn UiSurface,
        list: NodeId,
        subactions: Vec<SubactionNode<C>>,
    ) -> Vec<SubactionBinding<C>> {
        surface.remove_children(list);

        let mut bindings = Vec::new();
        for node in subactions {
            let li = match node {
                SubactionNode::Header(text) => Self::text_row(surface, SUBACTION_HEADER_CLASS, &text),
                SubactionNode::Divider => Self::divider(surface),
                SubactionNode::Leaf(leaf) => {
                    let li = surface.create_element("li");
                    surface.set_attribute(li, ATTR_ROLE, ROLE_MENU);
                    surface.set_attribute(li, ATTR_SUBACTION, "");
                    let anchor = surface.create_element("a");
                    surface.set_attribute(anchor, ATTR_ROLE, ROLE_MENU_ITEM);
                    if let Some(icon_class) = &leaf.icon {
                        let icon = surface.create_element("i");
                        Self::set_icon(surface, icon, icon_class);
                        surface.append_child(anchor, icon);
                    }
                    let label = surface.create_element("span");
                    surface.add_class(label, ACTION_NAME_CLASS);
                    surface.set_text(label, &leaf.name);
                    surface.append_child(anchor, label);
                    surface.append_child(li, anchor);

                    if let Some(on_click) = leaf.on_click {
                        bindings.push(SubactionBinding { anchor, on_click });
                    }
                    li
                }
            };
            surface.append_child(list, li);
        }
        bindings
    }

    /// Set the classes of an icon element to the base icon classes plus `icon_class`
    pub fn set_icon(surface: &dyn UiSurface, icon: NodeId, icon_class: &str) {
        let mut classes = vec![
            ICON_BASE_CLASS.to_string(),
            ICON_FIXED_WIDTH_CLASS.to_string(),
        ];
        classes.extend(icon_class.split_whitespace().map(str::to_string));
        surface.set_classes(icon, &classes);
    }

    /// Union of two class lists, keeping first-seen order
    pub fn merge_classes(base: &[String], extra: &[String]) -> Vec<String> {
        let mut merged: Vec<String> = Vec::with_capacity(base.len() + extra.len());
        for class in base
            .iter()
            .chain(extra.iter())
            .flat_map(|c| c.split_whitespace())
        {
            if !merged.iter().any(|m| m == class) {
                merged.push(class.to_string());
            }
        }
        merged
    }

    fn text_row(surface: &dyn UiSurface, class: &str, text: &str) -> NodeId {
        let li = surface.create_element("li");
        surface.add_class(li, class);
        surface.set_text(li, text);
        li
    }

    fn divider(surface: &dyn UiSurface) -> NodeId {
        let li = surface.create_element("li");
        surface.add_class(li, DIVIDER_CLASS);
        li
    }
}
