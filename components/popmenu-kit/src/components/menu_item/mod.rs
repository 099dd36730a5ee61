mod data;

pub use data::{
    ActionItem, ActionNode, ClassSpec, ClickHandler, ContextFn, IconSpec, NameSpec, Predicate,
    SubactionItem, SubactionNode, Submenu,
};
