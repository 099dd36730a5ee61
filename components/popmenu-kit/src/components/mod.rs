pub mod context_menu;
pub mod menu_item;
