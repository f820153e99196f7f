//! Normalized input events
//!
//! Hosts translate their raw pointer and keyboard events into
//! [`InputEvent`]s in surface pixels. Pointer deltas and the drag area are
//! usually filled in by a [`PointerTracker`](crate::surface::PointerTracker).

use crate::shape::NodeId;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    MouseDown,
    MouseMove,
    MouseUp,
    Click,
    DblClick,
    KeyDown,
    KeyUp,
}

/// Modifier keys held during an event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        alt: false,
        meta: false,
    };
}

/// Key of a keyboard event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Space,
    Shift,
    Char(char),
    /// Anything else, by host key code
    Code(u32),
}

/// One input event in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    pub kind: EventKind,
    pub x: f64,
    pub y: f64,
    /// Movement since the previous pointer event of the gesture
    pub dx: f64,
    pub dy: f64,
    /// Rectangle between the gesture's mousedown point and this event
    pub area: Option<Rect>,
    /// Scene node under the pointer
    pub target: Option<NodeId>,
    pub modifiers: Modifiers,
    /// Set on keyboard events only
    pub key: Option<Key>,
}

impl InputEvent {
    /// Pointer event at `(x, y)` without delta or area
    pub fn pointer(kind: EventKind, x: f64, y: f64) -> Self {
        Self {
            kind,
            x,
            y,
            dx: 0.0,
            dy: 0.0,
            area: None,
            target: None,
            modifiers: Modifiers::NONE,
            key: None,
        }
    }

    pub fn mouse_down(x: f64, y: f64) -> Self {
        Self::pointer(EventKind::MouseDown, x, y)
    }

    pub fn mouse_move(x: f64, y: f64) -> Self {
        Self::pointer(EventKind::MouseMove, x, y)
    }

    pub fn mouse_up(x: f64, y: f64) -> Self {
        Self::pointer(EventKind::MouseUp, x, y)
    }

    pub fn click(x: f64, y: f64) -> Self {
        Self::pointer(EventKind::Click, x, y)
    }

    pub fn dbl_click(x: f64, y: f64) -> Self {
        Self::pointer(EventKind::DblClick, x, y)
    }

    pub fn key_down(key: Key) -> Self {
        Self {
            key: Some(key),
            ..Self::pointer(EventKind::KeyDown, 0.0, 0.0)
        }
    }

    pub fn key_up(key: Key) -> Self {
        Self {
            key: Some(key),
            ..Self::pointer(EventKind::KeyUp, 0.0, 0.0)
        }
    }

    pub fn with_target(mut self, target: NodeId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_delta(mut self, dx: f64, dy: f64) -> Self {
        self.dx = dx;
        self.dy = dy;
        self
    }

    pub fn with_area(mut self, area: Rect) -> Self {
        self.area = Some(area);
        self
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Whether this is the given key going down
    pub fn is_key_down(&self, key: Key) -> bool {
        self.kind == EventKind::KeyDown && self.key == Some(key)
    }

    pub fn is_key_up(&self, key: Key) -> bool {
        self.kind == EventKind::KeyUp && self.key == Some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let event = InputEvent::mouse_move(10.0, 20.0)
            .with_delta(2.0, -1.0)
            .with_target(NodeId(4))
            .with_modifiers(Modifiers::SHIFT);

        assert_eq!(event.kind, EventKind::MouseMove);
        assert_eq!(event.position(), Point::new(10.0, 20.0));
        assert_eq!((event.dx, event.dy), (2.0, -1.0));
        assert_eq!(event.target, Some(NodeId(4)));
        assert!(event.modifiers.shift);
        assert!(event.key.is_none());
    }

    #[test]
    fn test_key_events() {
        let down = InputEvent::key_down(Key::Space);
        assert!(down.is_key_down(Key::Space));
        assert!(!down.is_key_up(Key::Space));
        assert!(!down.is_key_down(Key::Shift));
        assert!(InputEvent::key_up(Key::Shift).is_key_up(Key::Shift));
    }
}
