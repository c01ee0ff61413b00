pub mod derived;
pub mod error;
pub mod id;
pub mod model;
pub mod viewport;

pub use derived::Derived;
pub use error::GeometryError;
pub use id::AnnotationId;
pub use model::*;
pub use viewport::Viewport;

// Re-export kurbo geometry so downstream crates share one point type
pub use kurbo::{Point, Rect, Vec2};
