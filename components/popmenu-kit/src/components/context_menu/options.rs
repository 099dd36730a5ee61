use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::constants::DEFAULT_NO_ACTIONS_MESSAGE;
use crate::components::menu_item::ActionNode;
use crate::error::ConfigurationError;
use crate::surfaces::{names, NodeId};

/// Plain-data menu options
///
/// Enumerated options are kept as the strings the host supplied and only
/// parsed where they are consulted, so an unknown value surfaces exactly
/// there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuSettings {
    /// Selector of the element receiving the open and close listeners;
    /// `None` means the document body
    pub container: Option<String>,
    /// `element` or `mouse`
    pub menu_source: String,
    /// `aboveLeft`, `aboveRight`, `belowLeft` or `belowRight`
    pub menu_position: String,
    /// `click`, `right-click` or `hover`
    pub menu_event: String,
    pub no_actions_message: String,
    /// Event selecting an action; hosts that swallow clicks on the anchors
    /// can switch this to `mousedown`
    pub action_select_event: String,
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self {
            container: None,
            menu_source: MenuSource::Mouse.to_string(),
            menu_position: MenuPosition::BelowLeft.to_string(),
            menu_event: MenuEvent::RightClick.to_string(),
            no_actions_message: DEFAULT_NO_ACTIONS_MESSAGE.to_string(),
            action_select_event: names::CLICK.to_string(),
        }
    }
}

impl MenuSettings {
    pub fn parsed_event(&self) -> Result<MenuEvent, ConfigurationError> {
        self.menu_event.parse()
    }

    pub fn parsed_source(&self) -> Result<MenuSource, ConfigurationError> {
        self.menu_source.parse()
    }

    pub fn parsed_position(&self) -> Result<MenuPosition, ConfigurationError> {
        self.menu_position.parse()
    }
}

/// Interaction opening the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEvent {
    Click,
    RightClick,
    Hover,
}

impl MenuEvent {
    /// Name of the surface event the open listener subscribes to
    pub fn open_event_name(&self) -> &'static str {
        match self {
            Self::Click => names::CLICK,
            Self::RightClick => names::CONTEXT_MENU,
            Self::Hover => names::MOUSE_ENTER,
        }
    }
}

impl FromStr for MenuEvent {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "click" => Ok(Self::Click),
            "right-click" => Ok(Self::RightClick),
            "hover" => Ok(Self::Hover),
            other => Err(ConfigurationError::UnknownMenuEvent(other.to_string())),
        }
    }
}

impl fmt::Display for MenuEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Click => "click",
            Self::RightClick => "right-click",
            Self::Hover => "hover",
        })
    }
}

/// Reference the overlay is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuSource {
    /// Bounding box of the element the menu was opened on
    Element,
    /// Pointer position of the opening event
    Mouse,
}

impl FromStr for MenuSource {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "element" => Ok(Self::Element),
            "mouse" => Ok(Self::Mouse),
            other => Err(ConfigurationError::UnknownMenuSource(other.to_string())),
        }
    }
}

impl fmt::Display for MenuSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Element => "element",
            Self::Mouse => "mouse",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuPosition {
    BelowRight,
    BelowLeft,
    AboveRight,
    AboveLeft,
}

impl FromStr for MenuPosition {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "belowRight" => Ok(Self::BelowRight),
            "belowLeft" => Ok(Self::BelowLeft),
            "aboveRight" => Ok(Self::AboveRight),
            "aboveLeft" => Ok(Self::AboveLeft),
            other => Err(ConfigurationError::UnknownMenuPosition(other.to_string())),
        }
    }
}

impl fmt::Display for MenuPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BelowRight => "belowRight",
            Self::BelowLeft => "belowLeft",
            Self::AboveRight => "aboveRight",
            Self::AboveLeft => "aboveLeft",
        })
    }
}

/// Produces the context data of the element a menu is opened on
pub type FetchElementData<C> = Rc<dyn Fn(NodeId) -> C>;

/// Everything a [`ContextMenu`](super::ContextMenu) is constructed from
pub struct MenuOptions<C> {
    pub actions: Vec<ActionNode<C>>,
    pub settings: MenuSettings,
    /// Container element, taking precedence over `settings.container`
    pub container: Option<NodeId>,
    pub fetch_element_data: FetchElementData<C>,
}

impl<C: Default + 'static> MenuOptions<C> {
    /// Options with default settings and a fetch returning `C::default()`
    pub fn new(actions: Vec<ActionNode<C>>) -> Self {
        Self {
            actions,
            settings: MenuSettings::default(),
            container: None,
            fetch_element_data: Rc::new(|_| C::default()),
        }
    }
}

impl<C> MenuOptions<C> {
    pub fn with_settings(mut self, settings: MenuSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_container(mut self, container: NodeId) -> Self {
        self.container = Some(container);
        self
    }

    pub fn with_menu_event(mut self, event: impl Into<String>) -> Self {
        self.settings.menu_event = event.into();
        self
    }

    pub fn with_menu_source(mut self, source: impl Into<String>) -> Self {
        self.settings.menu_source = source.into();
        self
    }

    pub fn with_menu_position(mut self, position: impl Into<String>) -> Self {
        self.settings.menu_position = position.into();
        self
    }

    pub fn with_no_actions_message(mut self, message: impl Into<String>) -> Self {
        self.settings.no_actions_message = message.into();
        self
    }

    pub fn with_action_select_event(mut self, event: impl Into<String>) -> Self {
        self.settings.action_select_event = event.into();
        self
    }

    pub fn fetch_element_data<F>(mut self, fetch: F) -> Self
    where
        F: Fn(NodeId) -> C + 'static,
    {
        self.fetch_element_data = Rc::new(fetch);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = MenuSettings::default();

        assert_eq!(settings.parsed_event(), Ok(MenuEvent::RightClick));
        assert_eq!(settings.parsed_source(), Ok(MenuSource::Mouse));
        assert_eq!(settings.parsed_position(), Ok(MenuPosition::BelowLeft));
        assert_eq!(settings.no_actions_message, "No available actions");
        assert_eq!(settings.action_select_event, "click");
        assert!(settings.container.is_none());
    }

    #[test]
    fn test_open_event_names() {
        assert_eq!(MenuEvent::Click.open_event_name(), "click");
        assert_eq!(MenuEvent::RightClick.open_event_name(), "contextmenu");
        assert_eq!(MenuEvent::Hover.open_event_name(), "mouseenter");
    }

    #[test]
    fn test_unknown_values_are_rejected() {
        assert_eq!(
            "double-click".parse::<MenuEvent>(),
            Err(ConfigurationError::UnknownMenuEvent("double-click".into()))
        );
        assert_eq!(
            "window".parse::<MenuSource>(),
            Err(ConfigurationError::UnknownMenuSource("window".into()))
        );
        assert_eq!(
            "below".parse::<MenuPosition>(),
            Err(ConfigurationError::UnknownMenuPosition("below".into()))
        );
    }

    #[test]
    fn test_settings_from_partial_toml() {
        let settings: MenuSettings = toml::from_str(
            r#"
            menu_event = "hover"
            menu_position = "aboveRight"
            "#,
        )
        .expect("settings should deserialize");

        assert_eq!(settings.parsed_event(), Ok(MenuEvent::Hover));
        assert_eq!(settings.parsed_position(), Ok(MenuPosition::AboveRight));
        assert_eq!(settings.menu_source, "mouse");
    }
}
