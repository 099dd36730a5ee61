//! Scripted pages for exercising menus outside a browser.
//!
//! A scenario file declares an element tree, the menus attached to it and
//! a list of user input steps. [`run`] replays the steps on a headless
//! surface and records what was visible and which actions fired.

use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use thiserror::Error;

mod model;
mod runner;

pub use model::{
    ActionKind, ActionSpec, ElementSpec, MenuSpec, Scenario, SettingsOverrides, Step, StepAction,
};
pub use runner::{run, ElementData, Runner, StepRecord, Transcript};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("element `{0}` is declared twice")]
    DuplicateElement(String),
    #[error("element `{id}` names parent `{parent}`, which is not declared before it")]
    UnknownParent { id: String, parent: String },
    #[error("no element with id `{0}`")]
    UnknownElement(String),
    #[error("`{0}` step needs a target")]
    MissingTarget(StepAction),
    #[error("`destroy` step needs a menu index")]
    MissingMenu,
    #[error("no menu with index {0}")]
    UnknownMenu(usize),
    #[error("action `{0}` declares both a static submenu and `subactions_from`")]
    ConflictingSubmenus(String),
    #[error("no open menu shows an action labelled `{0}`")]
    NoVisibleAction(String),
}

impl Scenario {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario: {}", path.display()))?;
        content
            .parse()
            .with_context(|| format!("Failed to parse scenario: {}", path.display()))
    }
}

impl FromStr for Scenario {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_reports_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("missing.toml");

        let err = Scenario::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to read scenario"));
    }

    #[test]
    fn test_load_reports_invalid_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("broken.toml");
        fs::write(&path, "[[menus]\nselector = ").unwrap();

        let err = Scenario::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse scenario"));
    }

    #[test]
    fn test_load_reads_scenario() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("page.toml");
        fs::write(
            &path,
            "[[elements]]\nid = \"row\"\n\n[[steps]]\naction = \"close-all\"\n",
        )
        .unwrap();

        let scenario = Scenario::load(&path).unwrap();
        assert_eq!(scenario.elements.len(), 1);
        assert_eq!(scenario.steps[0].action, StepAction::CloseAll);
    }
}
