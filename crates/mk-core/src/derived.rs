//! Values derived from committed geometry for rendering.
//!
//! Nothing here is stored on the entity. Renderers call these on every
//! frame so a derived value can never drift from the geometry it came from.

use crate::model::Geometry;
use kurbo::{Point, Rect};
use serde::Serialize;

/// Euclidean distance between two endpoints.
pub fn segment_length(a: Point, b: Point) -> f64 {
    a.distance(b)
}

/// Direction from `a` to `b` in radians, as used to rotate an arrowhead.
pub fn orientation(a: Point, b: Point) -> f64 {
    (b.y - a.y).atan2(b.x - a.x)
}

/// Arithmetic mean of two endpoints. The delete affordance sits here.
pub fn midpoint(a: Point, b: Point) -> Point {
    a.midpoint(b)
}

/// Rendering values of one shape, recomputed from its current geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Derived {
    pub length: f64,
    pub angle: f64,
    pub midpoint: Point,
}

impl Derived {
    /// Derive from the shape's characteristic endpoints: the two handle
    /// points for arrows and boxes, first and last sample for ink, and the
    /// single anchor for sticky notes (zero length, zero angle).
    ///
    /// `None` for an ink stroke without samples.
    pub fn of(geometry: &Geometry) -> Option<Self> {
        let (a, b) = endpoints(geometry)?;
        Some(Self {
            length: segment_length(a, b),
            angle: orientation(a, b),
            midpoint: midpoint(a, b),
        })
    }
}

fn endpoints(geometry: &Geometry) -> Option<(Point, Point)> {
    let anchors = geometry.anchors();
    let first = anchors.first()?.abs;
    let last = anchors.last()?.abs;
    Some((first, last))
}

/// Axis-aligned bounds of every point of the shape.
pub fn bounds(geometry: &Geometry) -> Option<Rect> {
    let anchors = geometry.anchors();
    let (first, rest) = anchors.split_first()?;
    Some(
        rest.iter()
            .fold(Rect::from_points(first.abs, first.abs), |r, a| {
                r.union_pt(a.abs)
            }),
    )
}
