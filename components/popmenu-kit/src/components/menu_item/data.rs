use std::fmt;
use std::rc::Rc;

/// Function of the context data of the current opening
pub type ContextFn<C, T> = Rc<dyn Fn(&C) -> T>;

/// Visibility / enablement predicate
pub type Predicate<C> = ContextFn<C, bool>;

/// Invoked with the context data when an entry is selected
pub type ClickHandler<C> = Rc<dyn Fn(&C)>;

/// Display name of an action
pub enum NameSpec<C> {
    Static(String),
    Dynamic(ContextFn<C, String>),
}

impl<C> NameSpec<C> {
    pub fn resolve(&self, ctx: &C) -> String {
        match self {
            Self::Static(name) => name.clone(),
            Self::Dynamic(f) => f(ctx),
        }
    }
}

/// Icon class of an action
pub enum IconSpec<C> {
    Static(String),
    Dynamic(ContextFn<C, String>),
}

impl<C> IconSpec<C> {
    pub fn resolve(&self, ctx: &C) -> String {
        match self {
            Self::Static(icon) => icon.clone(),
            Self::Dynamic(f) => f(ctx),
        }
    }
}

/// Extra classes merged into an action's element on every opening
pub enum ClassSpec<C> {
    Static(Vec<String>),
    Dynamic(ContextFn<C, Vec<String>>),
}

impl<C> ClassSpec<C> {
    pub fn resolve(&self, ctx: &C) -> Vec<String> {
        match self {
            Self::Static(classes) => classes.clone(),
            Self::Dynamic(f) => f(ctx),
        }
    }
}

/// Nested entries under an action
///
/// Static submenus are rendered once and their actions are indexed like
/// top-level ones. Dynamic submenus are regenerated on every opening and
/// never receive an index.
pub enum Submenu<C> {
    Static(Vec<ActionNode<C>>),
    Dynamic(ContextFn<C, Vec<SubactionNode<C>>>),
}

/// Leaf of a dynamic submenu
pub struct SubactionItem<C> {
    pub name: String,
    pub icon: Option<String>,
    pub on_click: Option<ClickHandler<C>>,
}

impl<C> SubactionItem<C> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: None,
            on_click: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn on_click<F>(mut self, callback: F) -> Self
    where
        F: Fn(&C) + 'static,
    {
        self.on_click = Some(Rc::new(callback));
        self
    }
}

/// Entry of a dynamic submenu; cannot nest further
pub enum SubactionNode<C> {
    Header(String),
    Divider,
    Leaf(SubactionItem<C>),
}

impl<C> SubactionNode<C> {
    pub fn header(text: impl Into<String>) -> Self {
        Self::Header(text.into())
    }

    pub fn divider() -> Self {
        Self::Divider
    }

    pub fn leaf(name: impl Into<String>) -> SubactionItem<C> {
        SubactionItem::new(name)
    }
}

impl<C> From<SubactionItem<C>> for SubactionNode<C> {
    fn from(item: SubactionItem<C>) -> Self {
        Self::Leaf(item)
    }
}

/// A selectable action and everything that is recomputed for it per opening
pub struct ActionItem<C> {
    name: NameSpec<C>,
    icon: Option<IconSpec<C>>,
    classes: Option<ClassSpec<C>>,
    is_shown: Option<Predicate<C>>,
    is_enabled: Option<Predicate<C>>,
    on_click: Option<ClickHandler<C>>,
    submenu: Option<Submenu<C>>,
}

impl<C> ActionItem<C> {
    /// Create an action with a static name
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_name_spec(NameSpec::Static(name.into()))
    }

    /// Create an action whose name is computed from the context data
    pub fn dynamic<F>(name: F) -> Self
    where
        F: Fn(&C) -> String + 'static,
    {
        Self::with_name_spec(NameSpec::Dynamic(Rc::new(name)))
    }

    fn with_name_spec(name: NameSpec<C>) -> Self {
        Self {
            name,
            icon: None,
            classes: None,
            is_shown: None,
            is_enabled: None,
            on_click: None,
            submenu: None,
        }
    }

    // === Getters ===

    pub fn name(&self) -> &NameSpec<C> {
        &self.name
    }

    pub fn icon(&self) -> Option<&IconSpec<C>> {
        self.icon.as_ref()
    }

    pub fn classes(&self) -> Option<&ClassSpec<C>> {
        self.classes.as_ref()
    }

    pub fn click_handler(&self) -> Option<&ClickHandler<C>> {
        self.on_click.as_ref()
    }

    pub fn submenu(&self) -> Option<&Submenu<C>> {
        self.submenu.as_ref()
    }

    pub fn static_submenu(&self) -> Option<&[ActionNode<C>]> {
        match &self.submenu {
            Some(Submenu::Static(items)) => Some(items),
            _ => None,
        }
    }

    pub fn has_submenu(&self) -> bool {
        self.submenu.is_some()
    }

    /// Detach a static submenu so its nodes can be indexed on their own
    pub(crate) fn take_static_submenu(&mut self) -> Option<Vec<ActionNode<C>>> {
        match self.submenu.take() {
            Some(Submenu::Static(items)) => Some(items),
            other => {
                self.submenu = other;
                None
            }
        }
    }

    /// Absent predicate means shown
    pub fn is_shown(&self, ctx: &C) -> bool {
        self.is_shown.as_ref().map_or(true, |f| f(ctx))
    }

    /// Absent predicate means enabled
    pub fn is_enabled(&self, ctx: &C) -> bool {
        self.is_enabled.as_ref().map_or(true, |f| f(ctx))
    }

    // === Builder API ===

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(IconSpec::Static(icon.into()));
        self
    }

    pub fn with_icon_fn<F>(mut self, icon: F) -> Self
    where
        F: Fn(&C) -> String + 'static,
    {
        self.icon = Some(IconSpec::Dynamic(Rc::new(icon)));
        self
    }

    pub fn with_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes = Some(ClassSpec::Static(
            classes.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn with_classes_fn<F>(mut self, classes: F) -> Self
    where
        F: Fn(&C) -> Vec<String> + 'static,
    {
        self.classes = Some(ClassSpec::Dynamic(Rc::new(classes)));
        self
    }

    pub fn shown_if<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&C) -> bool + 'static,
    {
        self.is_shown = Some(Rc::new(predicate));
        self
    }

    pub fn enabled_if<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&C) -> bool + 'static,
    {
        self.is_enabled = Some(Rc::new(predicate));
        self
    }

    pub fn on_click<F>(mut self, callback: F) -> Self
    where
        F: Fn(&C) + 'static,
    {
        self.on_click = Some(Rc::new(callback));
        self
    }

    pub fn with_submenu(mut self, items: Vec<ActionNode<C>>) -> Self {
        self.submenu = Some(Submenu::Static(items));
        self
    }

    pub fn with_subactions<F>(mut self, subactions: F) -> Self
    where
        F: Fn(&C) -> Vec<SubactionNode<C>> + 'static,
    {
        self.submenu = Some(Submenu::Dynamic(Rc::new(subactions)));
        self
    }
}

/// One node of the action tree handed to a context menu
pub enum ActionNode<C> {
    Header(String),
    Divider,
    Action(ActionItem<C>),
}

impl<C> ActionNode<C> {
    pub fn header(text: impl Into<String>) -> Self {
        Self::Header(text.into())
    }

    pub fn divider() -> Self {
        Self::Divider
    }
}

impl<C> From<ActionItem<C>> for ActionNode<C> {
    fn from(item: ActionItem<C>) -> Self {
        Self::Action(item)
    }
}

impl<C> fmt::Debug for NameSpec<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(name) => f.debug_tuple("Static").field(name).finish(),
            Self::Dynamic(_) => write!(f, "Dynamic(..)"),
        }
    }
}

impl<C> fmt::Debug for ActionItem<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionItem")
            .field("name", &self.name)
            .field("has_icon", &self.icon.is_some())
            .field("has_submenu", &self.submenu.is_some())
            .finish()
    }
}

impl<C> fmt::Debug for ActionNode<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header(text) => f.debug_tuple("Header").field(text).finish(),
            Self::Divider => write!(f, "Divider"),
            Self::Action(item) => item.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Ctx {
        owner: bool,
        name: &'static str,
    }

    #[test]
    fn test_absent_predicates_default_to_true() {
        let item: ActionItem<Ctx> = ActionItem::new("Open");

        assert!(item.is_shown(&Ctx::default()));
        assert!(item.is_enabled(&Ctx::default()));
        assert!(!item.has_submenu());
    }

    #[test]
    fn test_predicates_see_context() {
        let item = ActionItem::new("Delete")
            .shown_if(|ctx: &Ctx| ctx.owner)
            .enabled_if(|ctx: &Ctx| !ctx.name.is_empty());
        let ctx = Ctx {
            owner: true,
            name: "",
        };

        assert!(item.is_shown(&ctx));
        assert!(!item.is_enabled(&ctx));
    }

    #[test]
    fn test_dynamic_name_and_icon() {
        let item = ActionItem::dynamic(|ctx: &Ctx| format!("Rename {}", ctx.name))
            .with_icon_fn(|ctx: &Ctx| (if ctx.owner { "fa-lock" } else { "fa-pen" }).to_string());
        let ctx = Ctx {
            owner: false,
            name: "notes.txt",
        };

        assert_eq!(item.name().resolve(&ctx), "Rename notes.txt");
        assert_eq!(
            item.icon().map(|icon| icon.resolve(&ctx)).as_deref(),
            Some("fa-pen")
        );
    }

    #[test]
    fn test_submenu_kind_is_exclusive() {
        let item: ActionItem<Ctx> = ActionItem::new("Share")
            .with_submenu(vec![ActionNode::Action(ActionItem::new("Email"))])
            .with_subactions(|_| vec![SubactionNode::Leaf(SubactionItem::new("Link"))]);

        assert!(item.static_submenu().is_none());
        assert!(matches!(item.submenu(), Some(Submenu::Dynamic(_))));
    }
}
