use thiserror::Error;

/// Rejected menu configuration
///
/// Raised where the offending value is consulted: the open event, the
/// container and the selectors at construction, source and position when
/// the menu is placed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("unknown menu event {0:?} (expected click, right-click or hover)")]
    UnknownMenuEvent(String),
    #[error("unknown menu source {0:?} (expected element or mouse)")]
    UnknownMenuSource(String),
    #[error("unknown menu position {0:?} (expected aboveLeft, aboveRight, belowLeft or belowRight)")]
    UnknownMenuPosition(String),
    #[error("container {0:?} does not match any element")]
    UnknownContainer(String),
    #[error("trigger selector is empty")]
    EmptySelector,
    #[error("trigger selector {0:?} is not supported by the surface")]
    UnsupportedSelector(String),
    #[error("action select event name is empty")]
    EmptyActionSelectEvent,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MenuError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("context menu has been destroyed")]
    Destroyed,
}

pub type Result<T, E = MenuError> = std::result::Result<T, E>;
