//! Overlay placement
//!
//! Placement pins one corner of the overlay onto one corner of the source
//! box, the way a `my`/`at` pair does for jQuery UI's position utility. No
//! collision handling is applied to the overlay itself; only submenus are
//! flipped when the menu sits too close to the right edge.

use tracing::debug;

pub use super::options::{MenuPosition, MenuSource};
use crate::surfaces::{Point, Rect, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizontal {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vertical {
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Corner {
    pub horizontal: Horizontal,
    pub vertical: Vertical,
}

impl Corner {
    pub const fn new(horizontal: Horizontal, vertical: Vertical) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Coordinates of this corner on `rect`
    pub fn of(&self, rect: &Rect) -> Point {
        let x = match self.horizontal {
            Horizontal::Left => rect.left(),
            Horizontal::Right => rect.right(),
        };
        let y = match self.vertical {
            Vertical::Top => rect.top(),
            Vertical::Bottom => rect.bottom(),
        };
        Point::new(x, y)
    }
}

/// Overlay corner placed onto a source corner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub overlay: Corner,
    pub source: Corner,
}

impl From<MenuPosition> for Anchor {
    fn from(position: MenuPosition) -> Self {
        use Horizontal::*;
        use Vertical::*;

        let (overlay, source) = match position {
            MenuPosition::BelowRight => (Corner::new(Right, Top), Corner::new(Right, Bottom)),
            MenuPosition::BelowLeft => (Corner::new(Left, Top), Corner::new(Left, Bottom)),
            MenuPosition::AboveRight => (Corner::new(Right, Bottom), Corner::new(Right, Top)),
            MenuPosition::AboveLeft => (Corner::new(Left, Bottom), Corner::new(Left, Top)),
        };
        Self { overlay, source }
    }
}

impl Anchor {
    /// Top-left position of an overlay of `size` anchored to `source`
    pub fn place(&self, size: Size, source: &Rect) -> Point {
        let target = self.source.of(source);
        let left = match self.overlay.horizontal {
            Horizontal::Left => target.x,
            Horizontal::Right => target.x - size.width,
        };
        let top = match self.overlay.vertical {
            Vertical::Top => target.y,
            Vertical::Bottom => target.y - size.height,
        };
        Point::new(left, top)
    }
}

/// Whether submenus should expand leftward
///
/// Doubles the list width as a stand-in for a submenu opening next to it.
pub fn submenus_overflow(left: f32, list_width: f32, viewport: Size) -> bool {
    let overflow = left + list_width * 2.0 > viewport.width;
    debug!(left, list_width, viewport_width = viewport.width, overflow, "submenu overflow check");
    overflow
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> Rect {
        Rect::new(100.0, 50.0, 20.0, 20.0)
    }

    fn overlay() -> Size {
        Size::new(150.0, 80.0)
    }

    #[test]
    fn test_below_right() {
        let point = Anchor::from(MenuPosition::BelowRight).place(overlay(), &source());
        assert_eq!(point, Point::new(-30.0, 70.0));
    }

    #[test]
    fn test_below_left() {
        let point = Anchor::from(MenuPosition::BelowLeft).place(overlay(), &source());
        assert_eq!(point, Point::new(100.0, 70.0));
    }

    #[test]
    fn test_above_right() {
        let point = Anchor::from(MenuPosition::AboveRight).place(overlay(), &source());
        assert_eq!(point, Point::new(-30.0, -30.0));
    }

    #[test]
    fn test_above_left() {
        let point = Anchor::from(MenuPosition::AboveLeft).place(overlay(), &source());
        assert_eq!(point, Point::new(100.0, -30.0));
    }

    #[test]
    fn test_pointer_source() {
        let pointer = Rect::at_point(Point::new(300.0, 200.0));
        let point = Anchor::from(MenuPosition::BelowLeft).place(overlay(), &pointer);
        assert_eq!(point, Point::new(300.0, 200.0));
    }

    #[test]
    fn test_submenu_overflow() {
        let viewport = Size::new(900.0, 600.0);

        assert!(submenus_overflow(700.0, 150.0, viewport));
        assert!(!submenus_overflow(500.0, 150.0, viewport));
        assert!(!submenus_overflow(600.0, 150.0, viewport));
    }
}
