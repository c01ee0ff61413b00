//! Keyboard shortcut mapping.
//!
//! The overlay handles only the keys that act on the gesture or the hovered
//! annotation. Tool switching and undo belong to the host.

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Abort the active drag session. Committed frames stay committed.
    CancelDrag,
    /// Ask the store to delete the hovered annotation.
    DeleteHovered,
}

/// Resolves key events into shortcut actions.
pub struct ShortcutMap;

impl ShortcutMap {
    /// `key` is the `KeyboardEvent.key` value. Returns `None` if the key has
    /// no binding.
    pub fn resolve(key: &str) -> Option<ShortcutAction> {
        match key {
            "Escape" => Some(ShortcutAction::CancelDrag),
            "Delete" | "Backspace" => Some(ShortcutAction::DeleteHovered),
            _ => None,
        }
    }
}
