use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use anyhow::Context;
use popmenu_kit::prelude::*;

use super::model::{ActionKind, ActionSpec, ElementSpec, Scenario, Step, StepAction};
use super::ScenarioError;
use crate::config::Config;

type FiredLog = Rc<RefCell<Vec<String>>>;

/// Context data a scenario menu receives for its trigger element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementData {
    pub id: String,
    pub data: BTreeMap<String, String>,
}

impl ElementData {
    /// Data value for `key`; `id` resolves to the element id
    pub fn get(&self, key: &str) -> Option<&str> {
        if key == "id" {
            return Some(&self.id);
        }
        self.data.get(key).map(String::as_str)
    }

    pub fn flag(&self, key: &str) -> bool {
        self.get(key) == Some("true")
    }

    /// Replaces `{key}` placeholders; unknown keys are left untouched
    pub fn fill(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else {
                out.push_str(&rest[start..]);
                return out;
            };
            let key = &after[..end];
            match self.get(key) {
                Some(value) => out.push_str(value),
                None => {
                    out.push('{');
                    out.push_str(key);
                    out.push('}');
                }
            }
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        out
    }
}

/// What the page looked like after one step
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    pub description: String,
    /// Indices of the menus open after the step
    pub open_menus: Vec<usize>,
    pub outline: String,
    /// Actions fired during the step, as `label@element`
    pub fired: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    pub steps: Vec<StepRecord>,
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            writeln!(f, "[{}] {}", i + 1, step.description)?;
            if step.open_menus.is_empty() {
                writeln!(f, "    (no menu open)")?;
            }
            for line in step.outline.lines() {
                writeln!(f, "    {line}")?;
            }
            if !step.fired.is_empty() {
                writeln!(f, "    fired: {}", step.fired.join(", "))?;
            }
        }
        Ok(())
    }
}

/// A scenario page with its menus, ready to replay steps
pub struct Runner {
    surface: Rc<HeadlessSurface>,
    registry: MenuRegistry,
    elements: BTreeMap<String, NodeId>,
    data: Rc<HashMap<NodeId, ElementData>>,
    menus: Vec<ContextMenu<ElementData>>,
    fired: FiredLog,
}

impl Runner {
    pub fn new(config: &Config, scenario: &Scenario) -> anyhow::Result<Self> {
        let surface = Rc::new(config.surface());
        if let Some(viewport) = scenario.viewport {
            surface.set_viewport(viewport);
        }
        let (elements, data) = build_page(&surface, &scenario.elements)?;
        let data = Rc::new(data);

        let registry = MenuRegistry::new();
        let fired = FiredLog::default();
        let mut menus = Vec::with_capacity(scenario.menus.len());
        for (i, spec) in scenario.menus.iter().enumerate() {
            let lookup = data.clone();
            let actions = build_actions(&spec.actions, &fired)
                .with_context(|| format!("menu[{i}] on `{}` has invalid actions", spec.selector))?;
            let options = MenuOptions::new(actions)
                .with_settings(spec.overrides.apply(&config.menu))
                .fetch_element_data(move |node| lookup.get(&node).cloned().unwrap_or_default());
            let menu = ContextMenu::new(spec.selector.as_str(), options, surface.clone(), &registry)
                .with_context(|| format!("menu[{i}] on `{}` was rejected", spec.selector))?;
            menus.push(menu);
        }
        tracing::debug!(
            "Built page with {} elements and {} menus",
            elements.len(),
            menus.len()
        );

        Ok(Self {
            surface,
            registry,
            elements,
            data,
            menus,
            fired,
        })
    }

    pub fn surface(&self) -> &HeadlessSurface {
        &self.surface
    }

    pub fn menus(&self) -> &[ContextMenu<ElementData>] {
        &self.menus
    }

    pub fn element(&self, id: &str) -> Result<NodeId, ScenarioError> {
        self.elements
            .get(id)
            .copied()
            .ok_or_else(|| ScenarioError::UnknownElement(id.to_string()))
    }

    pub fn step(&mut self, step: &Step) -> anyhow::Result<StepRecord> {
        match step.action {
            StepAction::RightClick => {
                let node = self.target(step)?;
                let center = self.surface.bounding_box(node).center();
                let x = step.x.unwrap_or(center.x);
                let y = step.y.unwrap_or(center.y);
                self.surface.right_click_at(node, x, y);
            }
            StepAction::Click => {
                let node = self.target(step)?;
                self.surface.click(node);
            }
            StepAction::Hover => {
                let node = self.target(step)?;
                self.surface.pointer_enter(node);
            }
            StepAction::Leave => {
                let node = self.target(step)?;
                let to = step.to.as_deref().map(|id| self.element(id)).transpose()?;
                self.surface.pointer_leave(node, to);
            }
            StepAction::Select => {
                let label = step
                    .target
                    .as_deref()
                    .ok_or(ScenarioError::MissingTarget(StepAction::Select))?;
                self.select(label)?;
            }
            StepAction::CloseAll => self.registry.close_all(),
            StepAction::Destroy => {
                let index = step.menu.ok_or(ScenarioError::MissingMenu)?;
                let menu = self
                    .menus
                    .get(index)
                    .ok_or(ScenarioError::UnknownMenu(index))?;
                menu.destroy();
            }
        }
        Ok(self.record(step))
    }

    fn target(&self, step: &Step) -> Result<NodeId, ScenarioError> {
        let id = step
            .target
            .as_deref()
            .ok_or(ScenarioError::MissingTarget(step.action))?;
        self.element(id)
    }

    /// Fires the select event on the first visible action labelled `label`
    fn select(&self, label: &str) -> Result<(), ScenarioError> {
        for menu in self.menus.iter().filter(|menu| menu.is_open()) {
            let overlay = menu.overlay();
            let found = self
                .surface
                .query_all(overlay, ".action-name")
                .into_iter()
                .find(|span| self.surface.text(*span) == label && self.shown(*span, overlay));
            let Some(anchor) = found.and_then(|span| self.surface.parent(span)) else {
                continue;
            };
            let event = UiEvent::new(menu.settings().action_select_event.clone(), anchor);
            self.surface.dispatch(event);
            return Ok(());
        }
        Err(ScenarioError::NoVisibleAction(label.to_string()))
    }

    fn shown(&self, node: NodeId, root: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if !self.surface.is_visible(n) {
                return false;
            }
            if n == root {
                return true;
            }
            current = self.surface.parent(n);
        }
        false
    }

    fn record(&self, step: &Step) -> StepRecord {
        let mut open_menus = Vec::new();
        let mut outline = String::new();
        for (i, menu) in self.menus.iter().enumerate() {
            if !menu.is_open() {
                continue;
            }
            open_menus.push(i);
            let target = menu
                .state()
                .open_target()
                .and_then(|node| self.data.get(&node))
                .map(|data| format!("#{}", data.id))
                .unwrap_or_else(|| "?".to_string());
            outline.push_str(&format!("menu[{i}] on {target}\n"));
            outline.push_str(&self.surface.dump(menu.overlay()));
        }
        let fired = std::mem::take(&mut *self.fired.borrow_mut());
        StepRecord {
            description: step.to_string(),
            open_menus,
            outline,
            fired,
        }
    }
}

/// Builds the page, replays every step and collects the transcript
pub fn run(config: &Config, scenario: &Scenario) -> anyhow::Result<Transcript> {
    let mut runner = Runner::new(config, scenario)?;
    let mut transcript = Transcript::default();
    for (i, step) in scenario.steps.iter().enumerate() {
        tracing::info!("Step {}: {step}", i + 1);
        let record = runner
            .step(step)
            .with_context(|| format!("step {} ({step}) failed", i + 1))?;
        transcript.steps.push(record);
    }
    Ok(transcript)
}

fn build_page(
    surface: &HeadlessSurface,
    specs: &[ElementSpec],
) -> Result<(BTreeMap<String, NodeId>, HashMap<NodeId, ElementData>), ScenarioError> {
    let mut elements = BTreeMap::new();
    let mut data = HashMap::new();
    for spec in specs {
        if elements.contains_key(&spec.id) {
            return Err(ScenarioError::DuplicateElement(spec.id.clone()));
        }
        let parent = match &spec.parent {
            Some(parent) => *elements
                .get(parent)
                .ok_or_else(|| ScenarioError::UnknownParent {
                    id: spec.id.clone(),
                    parent: parent.clone(),
                })?,
            None => surface.body(),
        };
        let classes: Vec<&str> = spec.classes.iter().map(String::as_str).collect();
        let node = surface.add_element(parent, &spec.tag, &classes);
        surface.set_attribute(node, "id", &spec.id);
        for (key, value) in &spec.data {
            surface.set_attribute(node, &format!("data-{key}"), value);
        }
        if let Some(bounds) = spec.bounds {
            surface.set_layout(node, bounds);
        }
        elements.insert(spec.id.clone(), node);
        data.insert(
            node,
            ElementData {
                id: spec.id.clone(),
                data: spec.data.clone(),
            },
        );
    }
    Ok((elements, data))
}

fn build_actions(
    specs: &[ActionSpec],
    fired: &FiredLog,
) -> Result<Vec<ActionNode<ElementData>>, ScenarioError> {
    specs.iter().map(|spec| build_action(spec, fired)).collect()
}

fn build_action(
    spec: &ActionSpec,
    fired: &FiredLog,
) -> Result<ActionNode<ElementData>, ScenarioError> {
    Ok(match spec.kind {
        ActionKind::Header => ActionNode::header(spec.name.clone()),
        ActionKind::Divider => ActionNode::divider(),
        ActionKind::Action => ActionNode::Action(build_item(spec, fired)?),
    })
}

fn build_item(
    spec: &ActionSpec,
    fired: &FiredLog,
) -> Result<ActionItem<ElementData>, ScenarioError> {
    if !spec.submenu.is_empty() && spec.subactions_from.is_some() {
        return Err(ScenarioError::ConflictingSubmenus(spec.name.clone()));
    }

    let template = spec.name.clone();
    let mut item = if template.contains('{') {
        let name = template.clone();
        ActionItem::dynamic(move |ctx: &ElementData| ctx.fill(&name))
    } else {
        ActionItem::new(template.clone())
    };

    if let Some(icon) = &spec.icon {
        item = item.with_icon(icon.clone());
    }
    if !spec.classes.is_empty() {
        item = item.with_classes(spec.classes.clone());
    }
    if let Some(key) = spec.shown_if.clone() {
        item = item.shown_if(move |ctx: &ElementData| ctx.flag(&key));
    }
    if let Some(key) = spec.enabled_if.clone() {
        item = item.enabled_if(move |ctx: &ElementData| ctx.flag(&key));
    }

    let log = fired.clone();
    let label = template.clone();
    item = item.on_click(move |ctx: &ElementData| {
        log.borrow_mut()
            .push(format!("{}@{}", ctx.fill(&label), ctx.id));
    });

    if !spec.submenu.is_empty() {
        item = item.with_submenu(build_actions(&spec.submenu, fired)?);
    } else if let Some(key) = spec.subactions_from.clone() {
        let log = fired.clone();
        item = item.with_subactions(move |ctx: &ElementData| {
            let parent = ctx.fill(&template);
            ctx.get(&key)
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|leaf| !leaf.is_empty())
                .map(|leaf| {
                    let log = log.clone();
                    let entry = format!("{parent}/{leaf}");
                    let leaf = SubactionNode::leaf(leaf).on_click(move |ctx: &ElementData| {
                        log.borrow_mut().push(format!("{entry}@{}", ctx.id));
                    });
                    SubactionNode::from(leaf)
                })
                .collect()
        });
    }
    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(source: &str) -> Scenario {
        toml::from_str(source).expect("scenario should deserialize")
    }

    const FILES: &str = r#"
        [[elements]]
        id = "list"
        tag = "ul"
        classes = ["files"]

        [[elements]]
        id = "notes"
        parent = "list"
        tag = "li"
        classes = ["file"]
        bounds = { x = 10.0, y = 10.0, width = 200.0, height = 20.0 }
        data = { name = "notes.txt", writable = "true", tags = "work, home" }

        [[elements]]
        id = "locked"
        parent = "list"
        tag = "li"
        classes = ["file"]
        bounds = { x = 10.0, y = 30.0, width = 200.0, height = 20.0 }
        data = { name = "locked.txt", writable = "false" }

        [[menus]]
        selector = ".file"

        [[menus.actions]]
        kind = "header"
        name = "File"

        [[menus.actions]]
        name = "Open {name}"

        [[menus.actions]]
        name = "Delete"
        enabled_if = "writable"

        [[menus.actions]]
        name = "Tag"
        subactions_from = "tags"
        shown_if = "writable"
    "#;

    #[test]
    fn test_fill_replaces_known_keys() {
        let data = ElementData {
            id: "row".to_string(),
            data: BTreeMap::from([("name".to_string(), "a.txt".to_string())]),
        };
        assert_eq!(data.fill("Open {name} ({id})"), "Open a.txt (row)");
        assert_eq!(data.fill("{missing} {"), "{missing} {");
    }

    #[test]
    fn test_right_click_then_select() {
        let mut scenario = scenario(FILES);
        scenario.steps = toml::from_str::<Scenario>(
            r#"
            [[steps]]
            action = "right-click"
            target = "notes"

            [[steps]]
            action = "select"
            target = "Open notes.txt"
            "#,
        )
        .unwrap()
        .steps;

        let transcript = run(&Config::default(), &scenario).expect("scenario should run");
        let opened = &transcript.steps[0];
        assert_eq!(opened.open_menus, vec![0]);
        assert!(opened.outline.contains("menu[0] on #notes"));
        assert!(opened.outline.contains("\"Open notes.txt\""));
        assert!(opened.fired.is_empty());

        let selected = &transcript.steps[1];
        assert!(selected.open_menus.is_empty());
        assert_eq!(selected.fired, vec!["Open notes.txt@notes"]);
    }

    #[test]
    fn test_dynamic_subactions_fire_with_their_label() {
        let mut runner = Runner::new(&Config::default(), &scenario(FILES)).unwrap();
        let steps: Scenario = toml::from_str(
            r#"
            [[steps]]
            action = "right-click"
            target = "notes"

            [[steps]]
            action = "select"
            target = "home"
            "#,
        )
        .unwrap();

        runner.step(&steps.steps[0]).unwrap();
        let record = runner.step(&steps.steps[1]).unwrap();
        assert_eq!(record.fired, vec!["Tag/home@notes"]);
        assert!(!runner.menus()[0].is_open());
    }

    #[test]
    fn test_disabled_action_cannot_be_selected() {
        let mut runner = Runner::new(&Config::default(), &scenario(FILES)).unwrap();
        let steps: Scenario = toml::from_str(
            r#"
            [[steps]]
            action = "right-click"
            target = "locked"

            [[steps]]
            action = "select"
            target = "Delete"

            [[steps]]
            action = "select"
            target = "Tag"
            "#,
        )
        .unwrap();

        runner.step(&steps.steps[0]).unwrap();
        let record = runner.step(&steps.steps[1]).unwrap();
        assert!(record.fired.is_empty());
        assert_eq!(record.open_menus, vec![0]);

        // Hidden for read-only files
        let err = runner.step(&steps.steps[2]).unwrap_err();
        assert!(err.to_string().contains("Tag"));
    }

    #[test]
    fn test_settings_layer_over_config() {
        let mut config = Config::default();
        config.menu.menu_event = "click".to_string();
        let mut scenario = scenario(FILES);
        scenario.menus[0].overrides.menu_source = Some("element".to_string());

        let runner = Runner::new(&config, &scenario).unwrap();
        let settings = runner.menus()[0].settings();
        assert_eq!(settings.menu_event, "click");
        assert_eq!(settings.menu_source, "element");

        let notes = runner.element("notes").unwrap();
        runner.surface().click(notes);
        assert!(runner.menus()[0].is_open());
        // Below-left of the element: x = 10, y = 10 + 20
        let overlay = runner.surface().bounding_box(runner.menus()[0].overlay());
        assert_eq!((overlay.x, overlay.y), (10.0, 30.0));
    }

    #[test]
    fn test_rejected_menu_reports_its_selector() {
        let mut scenario = scenario(FILES);
        scenario.menus[0].overrides.menu_event = Some("double-click".to_string());

        let err = Runner::new(&Config::default(), &scenario)
            .err()
            .expect("unknown menu event should be rejected");
        let message = format!("{err:#}");
        assert!(message.contains("menu[0] on `.file`"));
        assert!(message.contains("double-click"));
    }

    #[test]
    fn test_static_and_dynamic_submenu_is_rejected() {
        let scenario = scenario(
            r#"
            [[menus]]
            selector = ".file"

            [[menus.actions]]
            name = "Share"
            subactions_from = "people"

            [[menus.actions.submenu]]
            name = "Email"
            "#,
        );
        let err = Runner::new(&Config::default(), &scenario)
            .err()
            .expect("conflicting submenus should be rejected");
        let message = format!("{err:#}");
        assert!(message.contains("menu[0] on `.file` has invalid actions"));
        assert!(message.contains("action `Share` declares both"));
    }

    #[test]
    fn test_unknown_parent_is_rejected() {
        let scenario = scenario(
            r#"
            [[elements]]
            id = "child"
            parent = "nowhere"
            "#,
        );
        let err = Runner::new(&Config::default(), &scenario)
            .err()
            .expect("unknown parent should be rejected");
        assert!(err.to_string().contains("nowhere"));
    }

    #[test]
    fn test_destroy_step_requires_a_known_menu() {
        let mut runner = Runner::new(&Config::default(), &scenario(FILES)).unwrap();
        let steps: Scenario = toml::from_str(
            r#"
            [[steps]]
            action = "destroy"
            menu = 3

            [[steps]]
            action = "destroy"
            menu = 0
            "#,
        )
        .unwrap();

        assert!(runner.step(&steps.steps[0]).is_err());
        runner.step(&steps.steps[1]).unwrap();
        assert!(runner.menus()[0].is_destroyed());
        assert_eq!(runner.surface().listener_count(), 0);
    }

    #[test]
    fn test_transcript_renders_each_step() {
        let transcript = Transcript {
            steps: vec![StepRecord {
                description: "close-all".to_string(),
                open_menus: Vec::new(),
                outline: String::new(),
                fired: vec!["Delete@row".to_string()],
            }],
        };
        assert_eq!(
            transcript.to_string(),
            "[1] close-all\n    (no menu open)\n    fired: Delete@row\n"
        );
    }
}
