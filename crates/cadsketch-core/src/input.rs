//! Normalized pointer events fed to the canvas.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PointerEventKind {
    Move,
    Down,
    Drag,
    Up,
    Click,
    DoubleClick,
    Wheel,
}

/// A pointer event in surface-relative screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub screen_point: Point,
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Scroll amount; only meaningful for `Wheel`.
    #[serde(default)]
    pub wheel_delta: Vec2,
}

impl PointerEvent {
    pub fn new(kind: PointerEventKind, screen_point: Point) -> Self {
        Self {
            kind,
            screen_point,
            modifiers: Modifiers::NONE,
            wheel_delta: Vec2::ZERO,
        }
    }

    pub fn moved(p: Point) -> Self {
        Self::new(PointerEventKind::Move, p)
    }

    pub fn down(p: Point) -> Self {
        Self::new(PointerEventKind::Down, p)
    }

    pub fn drag(p: Point) -> Self {
        Self::new(PointerEventKind::Drag, p)
    }

    pub fn up(p: Point) -> Self {
        Self::new(PointerEventKind::Up, p)
    }

    pub fn click(p: Point) -> Self {
        Self::new(PointerEventKind::Click, p)
    }

    pub fn double_click(p: Point) -> Self {
        Self::new(PointerEventKind::DoubleClick, p)
    }

    pub fn wheel(p: Point, delta: Vec2) -> Self {
        Self {
            wheel_delta: delta,
            ..Self::new(PointerEventKind::Wheel, p)
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let e = PointerEvent::click(Point::new(3.0, 4.0)).with_modifiers(Modifiers::SHIFT);
        assert_eq!(e.kind, PointerEventKind::Click);
        assert!(e.modifiers.shift && !e.modifiers.ctrl);
        assert_eq!(e.wheel_delta, Vec2::ZERO);

        let w = PointerEvent::wheel(Point::ORIGIN, Vec2::new(0.0, -120.0));
        assert_eq!(w.kind, PointerEventKind::Wheel);
        assert_eq!(w.wheel_delta.y, -120.0);
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{"kind":"doubleClick","screenPoint":{"x":1.0,"y":2.0}}"#;
        let e: PointerEvent = serde_json::from_str(json).unwrap();
        assert_eq!(e.kind, PointerEventKind::DoubleClick);
        assert_eq!(e.screen_point, Point::new(1.0, 2.0));
        assert_eq!(e.modifiers, Modifiers::NONE);
    }
}
