//! Hover tracking and affordance visibility.
//!
//! The only stored state is whether the pointer is over the annotation.
//! Handle and delete-button visibility are derived from it (and from the
//! active tool) every time they are asked for.

use crate::tools::ToolKind;
use mk_core::AnnotationKind;
use serde::Serialize;

/// Resize handles show while the matching drawing tool is active, or while
/// the pointer hovers the annotation.
pub fn handles_visible(active_tool: ToolKind, kind: AnnotationKind, hovering: bool) -> bool {
    active_tool.draws(kind) || hovering
}

/// The delete affordance shows only while hovering, whatever the tool.
pub fn delete_visible(hovering: bool) -> bool {
    hovering
}

/// What the renderer should draw around one annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Visibility {
    pub handles: bool,
    pub delete_affordance: bool,
}

/// Per-annotation hover flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoverState {
    hovering: bool,
}

impl HoverState {
    /// Returns whether the flag changed.
    pub fn pointer_enter(&mut self) -> bool {
        !std::mem::replace(&mut self.hovering, true)
    }

    /// Returns whether the flag changed.
    pub fn pointer_leave(&mut self) -> bool {
        std::mem::replace(&mut self.hovering, false)
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    pub fn visibility(&self, active_tool: ToolKind, kind: AnnotationKind) -> Visibility {
        Visibility {
            handles: handles_visible(active_tool, kind, self.hovering),
            delete_affordance: delete_visible(self.hovering),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_follow_tool_or_hover() {
        for tool in [ToolKind::Select, ToolKind::Arrow, ToolKind::Ink] {
            for hovering in [false, true] {
                let expected = tool == ToolKind::Arrow || hovering;
                assert_eq!(
                    handles_visible(tool, AnnotationKind::Arrow, hovering),
                    expected,
                    "tool={tool:?} hovering={hovering}"
                );
            }
        }
    }

    #[test]
    fn delete_follows_hover_only() {
        let mut hover = HoverState::default();
        assert!(!hover.visibility(ToolKind::Arrow, AnnotationKind::Arrow).delete_affordance);
        hover.pointer_enter();
        assert!(hover.visibility(ToolKind::Select, AnnotationKind::Arrow).delete_affordance);
    }

    #[test]
    fn enter_and_leave_report_changes() {
        let mut hover = HoverState::default();
        assert!(hover.pointer_enter());
        assert!(!hover.pointer_enter());
        assert!(hover.pointer_leave());
        assert!(!hover.pointer_leave());
        assert!(!hover.is_hovering());
    }
}
