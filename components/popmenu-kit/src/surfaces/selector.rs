//! Minimal CSS selector support for the headless surface
//!
//! Only compound simple selectors are understood (`tag`, `*`, `#id`,
//! `.class`, `[attr]`, `[attr=value]`), optionally grouped with commas.
//! Combinators and pseudo classes are not supported; trigger selectors
//! for context menus rarely need more.

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SelectorStep {
    tag: Option<String>,
    universal: bool,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
}

/// A parsed selector group list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    groups: Vec<SelectorStep>,
}

impl Selector {
    /// Parse `source`, returning `None` for anything outside the supported subset
    pub fn parse(source: &str) -> Option<Self> {
        let groups = source
            .split(',')
            .map(parse_step)
            .collect::<Option<Vec<_>>>()?;
        if groups.is_empty() {
            return None;
        }
        Some(Self { groups })
    }

    /// Test an element described by its tag, classes and attribute lookup
    pub fn matches<'a>(
        &self,
        tag: &str,
        classes: &[String],
        attr: impl Fn(&str) -> Option<&'a str>,
    ) -> bool {
        self.groups
            .iter()
            .any(|step| step_matches(step, tag, classes, &attr))
    }
}

fn step_matches<'a>(
    step: &SelectorStep,
    tag: &str,
    classes: &[String],
    attr: &impl Fn(&str) -> Option<&'a str>,
) -> bool {
    if let Some(expected) = &step.tag {
        if !expected.eq_ignore_ascii_case(tag) {
            return false;
        }
    }
    if let Some(id) = &step.id {
        if attr("id") != Some(id.as_str()) {
            return false;
        }
    }
    if !step
        .classes
        .iter()
        .all(|class| classes.iter().any(|c| c == class))
    {
        return false;
    }
    step.attrs.iter().all(|condition| match condition {
        AttrCondition::Exists { key } => attr(key).is_some(),
        AttrCondition::Eq { key, value } => attr(key) == Some(value.as_str()),
    })
}

fn parse_step(part: &str) -> Option<SelectorStep> {
    let part = part.trim();
    if part.is_empty() {
        return None;
    }

    let bytes = part.as_bytes();
    let mut i = 0usize;
    let mut step = SelectorStep::default();

    while i < bytes.len() {
        match bytes[i] {
            b'*' => {
                if step.universal {
                    return None;
                }
                step.universal = true;
                i += 1;
            }
            b'#' => {
                let (id, next) = parse_ident(part, i + 1)?;
                if step.id.replace(id).is_some() {
                    return None;
                }
                i = next;
            }
            b'.' => {
                let (class, next) = parse_ident(part, i + 1)?;
                step.classes.push(class);
                i = next;
            }
            b'[' => {
                let (condition, next) = parse_attr(part, i)?;
                step.attrs.push(condition);
                i = next;
            }
            _ => {
                if step.tag.is_some()
                    || step.id.is_some()
                    || !step.classes.is_empty()
                    || !step.attrs.is_empty()
                    || step.universal
                {
                    return None;
                }
                let (tag, next) = parse_ident(part, i)?;
                step.tag = Some(tag);
                i = next;
            }
        }
    }

    Some(step)
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

fn parse_ident(src: &str, start: usize) -> Option<(String, usize)> {
    let bytes = src.as_bytes();
    let mut end = start;
    while end < bytes.len() && is_ident_char(bytes[end]) {
        end += 1;
    }
    if end == start {
        return None;
    }
    Some((src[start..end].to_string(), end))
}

fn parse_attr(src: &str, start: usize) -> Option<(AttrCondition, usize)> {
    let close = start + src[start..].find(']')?;
    let body = src[start + 1..close].trim();
    let next = close + 1;

    match body.split_once('=') {
        None => {
            let (key, end) = parse_ident(body, 0)?;
            if end != body.len() {
                return None;
            }
            Some((AttrCondition::Exists { key }, next))
        }
        Some((key, value)) => {
            let key = key.trim();
            let (parsed_key, end) = parse_ident(key, 0)?;
            if end != key.len() {
                return None;
            }
            let value = value
                .trim()
                .trim_matches(|c| c == '"' || c == '\'')
                .to_string();
            Some((
                AttrCondition::Eq {
                    key: parsed_key,
                    value,
                },
                next,
            ))
        }
    }
}
