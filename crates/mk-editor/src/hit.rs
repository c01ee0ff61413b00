//! Hit testing: pointer position → part of an annotation.
//!
//! Hosts that render annotations as DOM elements already know which element
//! was pressed and can pass the target straight to the widget. Canvas hosts
//! only have a position; these functions resolve it, front-to-back.

use crate::config::OverlayConfig;
use crate::drag::DragTarget;
use crate::hover::Visibility;
use kurbo::{Point, Rect};
use mk_core::derived::{Derived, bounds};
use mk_core::{Annotation, Geometry};

/// The part of an annotation under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// A draggable handle or the body.
    Drag(DragTarget),
    /// The delete button at the shape midpoint.
    DeleteAffordance,
}

/// What of `annotation` lies under `p`, given what is currently drawn.
///
/// The delete button is on top of the handles, which are on top of the
/// body. Hidden affordances cannot be hit.
pub fn hit_test(
    annotation: &Annotation,
    visibility: Visibility,
    config: &OverlayConfig,
    p: Point,
) -> Option<PointerTarget> {
    let geometry = &annotation.geometry;

    if visibility.delete_affordance
        && let Some(derived) = Derived::of(geometry)
        && derived.midpoint.distance(p) <= config.delete_radius
    {
        return Some(PointerTarget::DeleteAffordance);
    }

    if visibility.handles {
        for &handle in geometry.handles() {
            if let Ok(anchor) = geometry.handle_anchor(handle)
                && anchor.abs.distance(p) <= config.handle_radius
            {
                return Some(PointerTarget::Drag(DragTarget::Handle(handle)));
            }
        }
    }

    let reach = annotation.style.stroke_width / 2.0 + config.body_slop;
    hit_body(geometry, config, reach, p).then_some(PointerTarget::Drag(DragTarget::Body))
}

/// Whether `p` is over `annotation` at all, counting its handles.
///
/// Used for hover: handles belong to the shape even before they are shown.
pub fn hover_test(annotation: &Annotation, config: &OverlayConfig, p: Point) -> bool {
    let all = Visibility {
        handles: true,
        delete_affordance: false,
    };
    hit_test(annotation, all, config, p).is_some()
}

/// Find the topmost annotation under `p`, walking back to front paint order
/// in reverse.
pub fn hit_test_topmost<'a>(
    annotations: impl DoubleEndedIterator<Item = (&'a Annotation, Visibility)>,
    config: &OverlayConfig,
    p: Point,
) -> Option<(&'a Annotation, PointerTarget)> {
    annotations
        .rev()
        .find_map(|(a, vis)| hit_test(a, vis, config, p).map(|t| (a, t)))
}

fn hit_body(geometry: &Geometry, config: &OverlayConfig, reach: f64, p: Point) -> bool {
    match geometry {
        Geometry::Arrow { start, end } => distance_to_segment(p, start.abs, end.abs) <= reach,
        Geometry::Ink { points } => match points.as_slice() {
            [] => false,
            [only] => only.abs.distance(p) <= reach,
            samples => samples
                .windows(2)
                .any(|w| distance_to_segment(p, w[0].abs, w[1].abs) <= reach),
        },
        Geometry::Text { .. }
        | Geometry::Highlighter { .. }
        | Geometry::Stamp { .. } => bounds(geometry)
            .is_some_and(|r| r.inflate(config.body_slop, config.body_slop).contains(p)),
        Geometry::StickyNote { anchor, .. } => {
            Rect::from_origin_size(anchor.abs, (config.sticky_note_size, config.sticky_note_size))
                .inflate(config.body_slop, config.body_slop)
                .contains(p)
        }
    }
}

/// Shortest distance from `p` to the segment `a`–`b`.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.hypot2();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
