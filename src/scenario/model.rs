use std::collections::BTreeMap;
use std::fmt;

use popmenu_kit::components::context_menu::MenuSettings;
use popmenu_kit::surfaces::{Rect, Size};
use serde::Deserialize;

/// A page, the menus attached to it and the user input to replay
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Overrides the configured viewport
    pub viewport: Option<Size>,
    pub elements: Vec<ElementSpec>,
    pub menus: Vec<MenuSpec>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElementSpec {
    pub id: String,
    /// Id of an element declared earlier; the body when absent
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub bounds: Option<Rect>,
    /// Context data handed to menus; also mirrored as `data-<key>` attributes
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

fn default_tag() -> String {
    "div".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct MenuSpec {
    pub selector: String,
    #[serde(flatten)]
    pub overrides: SettingsOverrides,
    #[serde(default)]
    pub actions: Vec<ActionSpec>,
}

/// Per-menu settings layered over the configured `[menu]` defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SettingsOverrides {
    pub container: Option<String>,
    pub menu_source: Option<String>,
    pub menu_position: Option<String>,
    pub menu_event: Option<String>,
    pub no_actions_message: Option<String>,
    pub action_select_event: Option<String>,
}

impl SettingsOverrides {
    pub fn apply(&self, base: &MenuSettings) -> MenuSettings {
        let pick = |value: &Option<String>, fallback: &String| {
            value.clone().unwrap_or_else(|| fallback.clone())
        };
        MenuSettings {
            container: self.container.clone().or_else(|| base.container.clone()),
            menu_source: pick(&self.menu_source, &base.menu_source),
            menu_position: pick(&self.menu_position, &base.menu_position),
            menu_event: pick(&self.menu_event, &base.menu_event),
            no_actions_message: pick(&self.no_actions_message, &base.no_actions_message),
            action_select_event: pick(&self.action_select_event, &base.action_select_event),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    #[default]
    Action,
    Header,
    Divider,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ActionSpec {
    pub kind: ActionKind,
    /// Label, or header text; `{key}` is replaced by the context value
    pub name: String,
    pub icon: Option<String>,
    pub classes: Vec<String>,
    /// Data key that must be `"true"` for the action to show
    pub shown_if: Option<String>,
    /// Data key that must be `"true"` for the action to be enabled
    pub enabled_if: Option<String>,
    pub submenu: Vec<ActionSpec>,
    /// Data key holding a comma separated list of subaction labels
    pub subactions_from: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepAction {
    RightClick,
    Click,
    Hover,
    Leave,
    Select,
    CloseAll,
    Destroy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    pub action: StepAction,
    /// Element id, or the label of a visible action for `select`
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub y: Option<f32>,
    /// Element the pointer moves to on `leave`
    #[serde(default)]
    pub to: Option<String>,
    /// Menu index for `destroy`
    #[serde(default)]
    pub menu: Option<usize>,
}

impl fmt::Display for StepAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepAction::RightClick => "right-click",
            StepAction::Click => "click",
            StepAction::Hover => "hover",
            StepAction::Leave => "leave",
            StepAction::Select => "select",
            StepAction::CloseAll => "close-all",
            StepAction::Destroy => "destroy",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.action)?;
        if let Some(target) = &self.target {
            write!(f, " {target}")?;
        }
        if let Some(to) = &self.to {
            write!(f, " -> {to}")?;
        }
        if let Some(menu) = self.menu {
            write!(f, " menu[{menu}]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_deserializes_with_defaults() {
        let scenario: Scenario = toml::from_str(
            r#"
            [[elements]]
            id = "row"
            classes = ["file"]
            data = { deletable = "true" }

            [[menus]]
            selector = ".file"
            menu_event = "click"

            [[menus.actions]]
            name = "Delete {id}"
            shown_if = "deletable"

            [[menus.actions]]
            kind = "divider"

            [[steps]]
            action = "right-click"
            target = "row"
            "#,
        )
        .expect("scenario should deserialize");

        assert!(scenario.viewport.is_none());
        assert_eq!(scenario.elements[0].tag, "div");
        assert_eq!(scenario.elements[0].data["deletable"], "true");
        let menu = &scenario.menus[0];
        assert_eq!(menu.overrides.menu_event.as_deref(), Some("click"));
        assert_eq!(menu.actions[0].kind, ActionKind::Action);
        assert_eq!(menu.actions[1].kind, ActionKind::Divider);
        assert_eq!(scenario.steps[0].action, StepAction::RightClick);
        assert_eq!(scenario.steps[0].to_string(), "right-click row");
    }

    #[test]
    fn test_overrides_layer_on_configured_settings() {
        let base = MenuSettings {
            menu_position: "aboveLeft".to_string(),
            ..MenuSettings::default()
        };
        let overrides = SettingsOverrides {
            menu_event: Some("hover".to_string()),
            ..SettingsOverrides::default()
        };

        let settings = overrides.apply(&base);
        assert_eq!(settings.menu_event, "hover");
        assert_eq!(settings.menu_position, "aboveLeft");
        assert_eq!(settings.menu_source, "mouse");
        assert_eq!(settings.container, None);
    }

    #[test]
    fn test_unknown_step_action_is_rejected() {
        let parsed: Result<Scenario, _> = toml::from_str(
            r#"
            [[steps]]
            action = "double-click"
            "#,
        );
        assert!(parsed.is_err());
    }
}
