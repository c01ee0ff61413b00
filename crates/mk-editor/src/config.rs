//! Interaction tuning supplied by the host.

use serde::{Deserialize, Serialize};

/// Hit-test sizes, in container pixels.
///
/// Every field has a default, so hosts can pass a partial JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverlayConfig {
    /// Grab radius around a resize handle. Default: **8**.
    pub handle_radius: f64,

    /// Extra tolerance around a stroke or box body. Default: **4**.
    pub body_slop: f64,

    /// Radius of the delete button drawn at the shape midpoint. Default: **10**.
    pub delete_radius: f64,

    /// Edge length of the sticky-note icon anchored at its point. Default: **24**.
    pub sticky_note_size: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            handle_radius: 8.0,
            body_slop: 4.0,
            delete_radius: 10.0,
            sticky_note_size: 24.0,
        }
    }
}
