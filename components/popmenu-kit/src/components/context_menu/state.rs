use crate::surfaces::{NodeId, Point, UiEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Closed,
    Open,
}

/// What is kept of the event that opened the menu
#[derive(Debug, Clone, PartialEq)]
pub struct OpenEvent {
    pub name: String,
    pub pointer: Point,
}

impl From<&UiEvent> for OpenEvent {
    fn from(event: &UiEvent) -> Self {
        Self {
            name: event.name.clone(),
            pointer: event.pointer(),
        }
    }
}

/// Open/closed phase of a menu and what its last opening recorded
///
/// Only the menu mutates it; readers get a snapshot.
#[derive(Debug, Clone, Default)]
pub struct ContextMenuState {
    phase: Phase,

    /// Element the menu was last opened on; kept after closing so the
    /// position can still be recomputed
    open_target: Option<NodeId>,
    open_event: Option<OpenEvent>,

    /// Entries left visible by the last opening
    shown_count: usize,
    /// Visible entries marked disabled by the last opening
    disabled_count: usize,

    destroyed: bool,
}

impl ContextMenuState {
    pub fn new() -> Self {
        Self::default()
    }

    // === Getters ===

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase == Phase::Open
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn open_target(&self) -> Option<NodeId> {
        self.open_target
    }

    pub fn open_event(&self) -> Option<&OpenEvent> {
        self.open_event.as_ref()
    }

    pub fn shown_count(&self) -> usize {
        self.shown_count
    }

    pub fn disabled_count(&self) -> usize {
        self.disabled_count
    }

    // === State Mutations ===

    /// Remember where the menu is being opened; the phase changes only once
    /// the overlay is revealed
    pub fn begin_open(&mut self, target: NodeId, event: OpenEvent) {
        self.open_target = Some(target);
        self.open_event = Some(event);
        self.shown_count = 0;
        self.disabled_count = 0;
    }

    pub fn finish_open(&mut self, shown_count: usize, disabled_count: usize) {
        self.shown_count = shown_count;
        self.disabled_count = disabled_count;
        self.phase = Phase::Open;
    }

    /// Returns whether the menu was open
    pub fn close(&mut self) -> bool {
        std::mem::replace(&mut self.phase, Phase::Closed) == Phase::Open
    }

    pub fn mark_destroyed(&mut self) {
        self.phase = Phase::Closed;
        self.destroyed = true;
    }
}
