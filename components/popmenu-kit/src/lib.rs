pub mod components;
pub mod error;
pub mod surfaces;

// Re-export commonly used items
pub use components::context_menu::{ContextMenu, MenuOptions, MenuRegistry, MenuSettings};
pub use components::menu_item::{ActionItem, ActionNode, SubactionItem, SubactionNode};
pub use error::{ConfigurationError, MenuError};
pub use surfaces::{HeadlessSurface, NodeId, UiEvent, UiSurface};

/// Convenience prelude for embedding menus
pub mod prelude {
    pub use crate::components::context_menu::{
        ContextMenu, MenuEvent, MenuOptions, MenuPosition, MenuRegistry, MenuSettings, MenuSource,
    };
    pub use crate::components::menu_item::{
        ActionItem, ActionNode, SubactionItem, SubactionNode, Submenu,
    };
    pub use crate::error::{ConfigurationError, MenuError};
    pub use crate::surfaces::{
        names, HeadlessSurface, NodeId, Point, Rect, Size, UiEvent, UiSurface,
    };
}
