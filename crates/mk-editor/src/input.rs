//! Input abstraction layer.
//!
//! Normalizes mouse, touch, and pen events from the rendering host into a
//! unified `InputEvent` enum. Coordinates are in the container's pixel
//! space, the same space annotation absolute coordinates live in.

use kurbo::Point;

/// A normalized input event from any pointing device or the keyboard.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed (mouse down, touch start, pen contact).
    PointerDown { x: f64, y: f64 },

    /// Pointer moved, inside the container or, during a drag, anywhere in
    /// the window.
    PointerMove { x: f64, y: f64 },

    /// Pointer released.
    PointerUp { x: f64, y: f64 },

    /// The platform aborted the gesture (touch stolen by a scroll, pen out
    /// of range, window lost focus).
    PointerCancel,

    /// Pointer left the container.
    PointerLeave,

    /// Key press, by DOM `KeyboardEvent.key` name.
    Key { key: String },
}

impl InputEvent {
    pub fn pointer_down(x: f64, y: f64) -> Self {
        Self::PointerDown { x, y }
    }

    pub fn pointer_move(x: f64, y: f64) -> Self {
        Self::PointerMove { x, y }
    }

    pub fn pointer_up(x: f64, y: f64) -> Self {
        Self::PointerUp { x, y }
    }

    pub fn key(key: impl Into<String>) -> Self {
        Self::Key { key: key.into() }
    }

    /// Extract position if this is a positioned pointer event.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { x, y }
            | Self::PointerMove { x, y }
            | Self::PointerUp { x, y } => Some(Point::new(*x, *y)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_of_pointer_events() {
        assert_eq!(
            InputEvent::pointer_down(3.0, 4.0).position(),
            Some(Point::new(3.0, 4.0))
        );
        assert_eq!(InputEvent::PointerCancel.position(), None);
        assert_eq!(InputEvent::key("Escape").position(), None);
    }
}
