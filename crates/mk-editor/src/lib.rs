pub mod config;
pub mod dispatch;
pub mod drag;
pub mod hit;
pub mod hover;
pub mod input;
pub mod listener;
pub mod overlay;
pub mod shortcuts;
pub mod tools;

pub use config::OverlayConfig;
pub use dispatch::{AnnotationStore, MemoryStore, OverlayMessage, dispatch};
pub use drag::{DragController, DragMode, DragTarget};
pub use hit::{PointerTarget, hit_test};
pub use hover::{HoverState, Visibility};
pub use input::InputEvent;
pub use listener::{ListenerCounter, ListenerHost, ListenerLease, NoListeners};
pub use overlay::{AnnotationWidget, Overlay};
pub use tools::ToolKind;
