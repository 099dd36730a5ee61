//! Markup vocabulary of the rendered menu
//!
//! Class and attribute names match the Bootstrap dropdown markup so a host
//! stylesheet can target the overlay directly.

/// Attribute carrying the stable action index
pub const ATTR_MENU_ITEM: &str = "data-menu-item";

/// Attribute marking leaves of a dynamic submenu
pub const ATTR_SUBACTION: &str = "data-subaction";

pub const ATTR_ROLE: &str = "role";
pub const ROLE_MENU: &str = "menu";
pub const ROLE_MENU_ITEM: &str = "menuitem";

/// Classes of the overlay root
pub const OVERLAY_CLASSES: [&str; 2] = ["dropdown", "popmenu"];

/// Class of every list, root and submenus
pub const LIST_CLASS: &str = "dropdown-menu";

/// Marker on entries owning a submenu
pub const SUBMENU_CLASS: &str = "dropdown-submenu";

/// Makes a submenu expand leftward
pub const PULL_LEFT_CLASS: &str = "pull-left";

pub const DISABLED_CLASS: &str = "disabled";
pub const DIVIDER_CLASS: &str = "divider";
pub const HEADER_CLASS: &str = "nav-header";
pub const SUBACTION_HEADER_CLASS: &str = "dropdown-header";
pub const ACTION_NAME_CLASS: &str = "action-name";
pub const NO_ACTIONS_CLASS: &str = "no-actions-message";

/// Icon element classes; the resolved icon class is appended after these
pub const ICON_BASE_CLASS: &str = "fa";
pub const ICON_FIXED_WIDTH_CLASS: &str = "fa-fw";

pub const DEFAULT_NO_ACTIONS_MESSAGE: &str = "No available actions";
