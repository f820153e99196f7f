//! Pointer gesture tracking
//!
//! The host reports raw pointer positions; [`PointerTracker`] turns them
//! into gesture-aware events carrying the delta since the previous event
//! and the drag area since mousedown.

use crate::event::{EventKind, InputEvent};
use kurbo::{Point, Rect};
use log::trace;

/// Tracks one pointer gesture at a time
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerTracker {
    down: Option<Point>,
    last: Option<Point>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a mousedown is pending its mouseup
    pub fn is_pressed(&self) -> bool {
        self.down.is_some()
    }

    /// Fill in `dx`, `dy` and `area` for a raw event
    ///
    /// Moves and mouseups outside a gesture return `None`: only pointer
    /// activity between a mousedown and its mouseup is reported. Clicks and
    /// keyboard events pass through unchanged.
    pub fn track(&mut self, mut event: InputEvent) -> Option<InputEvent> {
        let position = event.position();

        match event.kind {
            EventKind::MouseDown => {
                if self.down.is_some() {
                    trace!("Mousedown during a gesture, restarting it");
                }
                self.down = Some(position);
                self.last = Some(position);
                event.dx = 0.0;
                event.dy = 0.0;
                event.area = None;
            }
            EventKind::MouseMove | EventKind::MouseUp => {
                let down = self.down?;
                let last = self.last.unwrap_or(down);
                event.dx = position.x - last.x;
                event.dy = position.y - last.y;
                event.area = Some(Rect::from_points(down, position));

                if event.kind == EventKind::MouseUp {
                    self.down = None;
                    self.last = None;
                } else {
                    self.last = Some(position);
                }
            }
            EventKind::Click | EventKind::DblClick | EventKind::KeyDown | EventKind::KeyUp => {}
        }

        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Key;

    #[test]
    fn test_drag_gesture() {
        let mut tracker = PointerTracker::new();

        let down = tracker.track(InputEvent::mouse_down(100.0, 50.0)).unwrap();
        assert!(down.area.is_none());
        assert!(tracker.is_pressed());

        let moved = tracker.track(InputEvent::mouse_move(120.0, 40.0)).unwrap();
        assert_eq!((moved.dx, moved.dy), (20.0, -10.0));
        assert_eq!(moved.area, Some(Rect::new(100.0, 40.0, 120.0, 50.0)));

        let moved = tracker.track(InputEvent::mouse_move(90.5, 45.0)).unwrap();
        assert_eq!((moved.dx, moved.dy), (-29.5, 5.0));
        assert_eq!(moved.area, Some(Rect::new(90.5, 45.0, 100.0, 50.0)));

        let up = tracker.track(InputEvent::mouse_up(90.5, 45.0)).unwrap();
        assert_eq!((up.dx, up.dy), (0.0, 0.0));
        assert!(!tracker.is_pressed());
    }

    #[test]
    fn test_hover_is_dropped() {
        let mut tracker = PointerTracker::new();
        assert!(tracker.track(InputEvent::mouse_move(1.0, 1.0)).is_none());
        assert!(tracker.track(InputEvent::mouse_up(1.0, 1.0)).is_none());
        assert!(tracker.track(InputEvent::click(1.0, 1.0)).is_some());
        assert!(tracker.track(InputEvent::key_down(Key::Space)).is_some());
    }

    #[test]
    fn test_mousedown_restarts_gesture() {
        let mut tracker = PointerTracker::new();
        tracker.track(InputEvent::mouse_down(0.0, 0.0));
        tracker.track(InputEvent::mouse_move(30.0, 0.0));
        tracker.track(InputEvent::mouse_down(200.0, 10.0));

        let moved = tracker.track(InputEvent::mouse_move(210.0, 10.0)).unwrap();
        assert_eq!(moved.dx, 10.0);
        assert_eq!(moved.area, Some(Rect::new(200.0, 10.0, 210.0, 10.0)));
    }
}
