//! Reasons a pointer event produced no geometry change.
//!
//! None of these are failures of the engine. They are routine input noise
//! (a transient zero-size container during layout, a NaN from a synthetic
//! event) or normal interaction feedback (a rigid move that would leave the
//! page). Callers log them and treat the event as a no-op.

use thiserror::Error;

/// Why a candidate geometry was not committed.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum GeometryError {
    /// A pointer coordinate was NaN or infinite.
    #[error("non-finite pointer coordinate ({x}, {y})")]
    NonFinite {
        /// The offending x coordinate.
        x: f64,
        /// The offending y coordinate.
        y: f64,
    },

    /// The container has not been laid out yet (zero or invalid size).
    #[error("viewport not measured ({width}x{height})")]
    UnmeasuredViewport {
        /// Reported container width.
        width: f64,
        /// Reported container height.
        height: f64,
    },

    /// A rigid move would push at least one point outside the container.
    #[error("candidate point ({x}, {y}) lies outside the container")]
    OutOfBounds {
        /// The first offending x coordinate.
        x: f64,
        /// The first offending y coordinate.
        y: f64,
    },

    /// The annotation kind has no such resize handle.
    #[error("{kind} annotations have no resize handles")]
    NoSuchHandle {
        /// Name of the annotation kind.
        kind: &'static str,
    },
}
