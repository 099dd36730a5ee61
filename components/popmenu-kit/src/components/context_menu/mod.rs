pub mod constants;
mod context_menu;
mod listeners;
mod options;
pub mod position;
mod registry;
mod renderer;
mod state;

pub use context_menu::ContextMenu;
pub use listeners::{ListenerGroup, ListenerManager};
pub use options::{FetchElementData, MenuEvent, MenuOptions, MenuPosition, MenuSettings, MenuSource};
pub use position::Anchor;
pub use registry::{MenuRegistry, RegisteredMenu, RegistryKey};
pub use renderer::{ActionEntry, ActionIndex, ContextMenuRenderer, MenuSkeleton, SubactionBinding};
pub use state::{ContextMenuState, OpenEvent, Phase};
