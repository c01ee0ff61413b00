//! Active tool identifier.
//!
//! The toolbar lives in the host. The engine only reads which tool is
//! active, to decide whether resize handles of a given annotation kind are
//! shown without hovering. Drawing new annotations is the tool layer's job
//! and happens outside this crate.

use mk_core::AnnotationKind;

/// The tool currently selected in the host toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Pan,
    Arrow,
    Ink,
    Text,
    Highlighter,
    StickyNote,
    Stamp,
}

impl ToolKind {
    /// The annotation kind this tool draws, if it draws one.
    pub fn annotation_kind(self) -> Option<AnnotationKind> {
        match self {
            Self::Select | Self::Pan => None,
            Self::Arrow => Some(AnnotationKind::Arrow),
            Self::Ink => Some(AnnotationKind::Ink),
            Self::Text => Some(AnnotationKind::Text),
            Self::Highlighter => Some(AnnotationKind::Highlighter),
            Self::StickyNote => Some(AnnotationKind::StickyNote),
            Self::Stamp => Some(AnnotationKind::Stamp),
        }
    }

    /// Whether this tool draws annotations of `kind`.
    pub fn draws(self, kind: AnnotationKind) -> bool {
        self.annotation_kind() == Some(kind)
    }

    /// Resolve a toolbar identifier. Unknown names fall back to Select.
    pub fn from_name(name: &str) -> Self {
        match name {
            "pan" => Self::Pan,
            "select" => Self::Select,
            other => match AnnotationKind::from_name(other) {
                Some(AnnotationKind::Arrow) => Self::Arrow,
                Some(AnnotationKind::Ink) => Self::Ink,
                Some(AnnotationKind::Text) => Self::Text,
                Some(AnnotationKind::Highlighter) => Self::Highlighter,
                Some(AnnotationKind::StickyNote) => Self::StickyNote,
                Some(AnnotationKind::Stamp) => Self::Stamp,
                None => Self::Select,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Pan => "pan",
            other => other.annotation_kind().map_or("select", AnnotationKind::name),
        }
    }
}
