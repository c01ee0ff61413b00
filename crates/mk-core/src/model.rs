//! Annotation entity model.
//!
//! One `Annotation` per drawn object. Geometry is a sum type over the
//! annotation kinds; every positional field is an [`AnchoredPoint`] that
//! stores the absolute pixel position together with its viewport-relative
//! fraction. The two are only ever written together, through
//! [`AnchoredPoint::commit`] or [`AnchoredPoint::reproject`].
//!
//! Relative coordinates are the durable source of truth across viewport
//! changes. Absolute coordinates are a cache for fast interaction math.

use crate::error::GeometryError;
use crate::id::AnnotationId;
use crate::viewport::Viewport;
use kurbo::Point;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt;

/// Absolute positions of every point of a shape, in anchor order.
pub type Anchors = SmallVec<[Point; 4]>;

/// Tolerance for the absolute/relative agreement check.
pub const RELATIVE_TOLERANCE: f64 = 1e-6;

// ─── Colors & Style ──────────────────────────────────────────────────────

/// RGBA color, 4 × f32 in [0.0, 1.0]. Serialized as a hex string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let bytes = hex.strip_prefix('#').unwrap_or(hex).as_bytes();
        if bytes.len() != 6 && bytes.len() != 8 {
            return None;
        }
        let mut channels = [255u8; 4];
        for (i, pair) in bytes.chunks(2).enumerate() {
            channels[i] = hex_val(pair[0])? << 4 | hex_val(pair[1])?;
        }
        let [r, g, b, a] = channels.map(|c| c as f32 / 255.0);
        Some(Self::rgba(r, g, b, a))
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = [self.r, self.g, self.b, self.a].map(|c| (c * 255.0).round() as u8);
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color '{s}'")))
    }
}

/// Stroke styling. Irrelevant to the geometry invariants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    pub stroke: Color,
    pub stroke_width: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            // #E53935
            stroke: Color::rgba(229.0 / 255.0, 57.0 / 255.0, 53.0 / 255.0, 1.0),
            stroke_width: 3.0,
        }
    }
}

// ─── Anchored points ─────────────────────────────────────────────────────

/// A point stored in both representations.
///
/// `rel == abs / viewport` holds for every committed value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchoredPoint {
    pub abs: Point,
    pub rel: Point,
}

impl AnchoredPoint {
    /// Commit an absolute position, recomputing its relative fraction.
    pub fn commit(abs: Point, viewport: Viewport) -> Self {
        Self {
            abs,
            rel: viewport.point_to_relative(abs),
        }
    }

    /// Regenerate the absolute cache from the relative fraction.
    pub fn reproject(&mut self, viewport: Viewport) {
        self.abs = viewport.point_to_absolute(self.rel);
    }

    /// Whether both representations agree for `viewport` within `tolerance`.
    pub fn is_consistent(&self, viewport: Viewport, tolerance: f64) -> bool {
        let expected = viewport.point_to_absolute(self.rel);
        (expected.x - self.abs.x).abs() <= tolerance && (expected.y - self.abs.y).abs() <= tolerance
    }
}

// ─── Kinds & handles ─────────────────────────────────────────────────────

/// The annotation family this engine manipulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationKind {
    Arrow,
    #[serde(rename = "freehand-ink")]
    Ink,
    Text,
    Highlighter,
    StickyNote,
    Stamp,
}

impl AnnotationKind {
    pub const ALL: [AnnotationKind; 6] = [
        Self::Arrow,
        Self::Ink,
        Self::Text,
        Self::Highlighter,
        Self::StickyNote,
        Self::Stamp,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Arrow => "arrow",
            Self::Ink => "freehand-ink",
            Self::Text => "text",
            Self::Highlighter => "highlighter",
            Self::StickyNote => "sticky-note",
            Self::Stamp => "stamp",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A resize handle. Arrows map A/B to their endpoints; box-shaped kinds
/// map them to the two corners the box was drawn between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handle {
    EndpointA,
    EndpointB,
}

// ─── Geometry ────────────────────────────────────────────────────────────

/// Per-kind geometry. Box-shaped kinds keep the corners in drawing order
/// (`from`, `to`); they are not normalized, so a corner keeps its identity
/// when dragged across the other one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Geometry {
    Arrow {
        start: AnchoredPoint,
        end: AnchoredPoint,
    },
    #[serde(rename = "freehand-ink")]
    Ink {
        points: SmallVec<[AnchoredPoint; 8]>,
    },
    Text {
        from: AnchoredPoint,
        to: AnchoredPoint,
        content: String,
    },
    Highlighter {
        from: AnchoredPoint,
        to: AnchoredPoint,
    },
    StickyNote {
        anchor: AnchoredPoint,
        note: String,
    },
    Stamp {
        from: AnchoredPoint,
        to: AnchoredPoint,
        label: String,
    },
}

impl Geometry {
    pub fn arrow(start: Point, end: Point, viewport: Viewport) -> Self {
        Self::Arrow {
            start: AnchoredPoint::commit(start, viewport),
            end: AnchoredPoint::commit(end, viewport),
        }
    }

    pub fn ink(points: impl IntoIterator<Item = Point>, viewport: Viewport) -> Self {
        Self::Ink {
            points: points
                .into_iter()
                .map(|p| AnchoredPoint::commit(p, viewport))
                .collect(),
        }
    }

    pub fn text(from: Point, to: Point, content: impl Into<String>, viewport: Viewport) -> Self {
        Self::Text {
            from: AnchoredPoint::commit(from, viewport),
            to: AnchoredPoint::commit(to, viewport),
            content: content.into(),
        }
    }

    pub fn highlighter(from: Point, to: Point, viewport: Viewport) -> Self {
        Self::Highlighter {
            from: AnchoredPoint::commit(from, viewport),
            to: AnchoredPoint::commit(to, viewport),
        }
    }

    pub fn sticky_note(anchor: Point, note: impl Into<String>, viewport: Viewport) -> Self {
        Self::StickyNote {
            anchor: AnchoredPoint::commit(anchor, viewport),
            note: note.into(),
        }
    }

    pub fn stamp(from: Point, to: Point, label: impl Into<String>, viewport: Viewport) -> Self {
        Self::Stamp {
            from: AnchoredPoint::commit(from, viewport),
            to: AnchoredPoint::commit(to, viewport),
            label: label.into(),
        }
    }

    pub fn kind(&self) -> AnnotationKind {
        match self {
            Self::Arrow { .. } => AnnotationKind::Arrow,
            Self::Ink { .. } => AnnotationKind::Ink,
            Self::Text { .. } => AnnotationKind::Text,
            Self::Highlighter { .. } => AnnotationKind::Highlighter,
            Self::StickyNote { .. } => AnnotationKind::StickyNote,
            Self::Stamp { .. } => AnnotationKind::Stamp,
        }
    }

    /// Every point of the shape, in a stable order.
    pub fn anchors(&self) -> SmallVec<[&AnchoredPoint; 4]> {
        match self {
            Self::Arrow { start, end } => SmallVec::from_iter([start, end]),
            Self::Ink { points } => points.iter().collect(),
            Self::Text { from, to, .. }
            | Self::Highlighter { from, to }
            | Self::Stamp { from, to, .. } => SmallVec::from_iter([from, to]),
            Self::StickyNote { anchor, .. } => SmallVec::from_iter([anchor]),
        }
    }

    /// Mutable view of every point, same order as [`Geometry::anchors`].
    pub fn anchors_mut(&mut self) -> SmallVec<[&mut AnchoredPoint; 4]> {
        match self {
            Self::Arrow { start, end } => SmallVec::from_iter([start, end]),
            Self::Ink { points } => points.iter_mut().collect(),
            Self::Text { from, to, .. }
            | Self::Highlighter { from, to }
            | Self::Stamp { from, to, .. } => SmallVec::from_iter([from, to]),
            Self::StickyNote { anchor, .. } => SmallVec::from_iter([anchor]),
        }
    }

    /// Absolute positions of every point (a drag snapshot).
    pub fn anchor_points(&self) -> Anchors {
        self.anchors().iter().map(|a| a.abs).collect()
    }

    /// The resize handles this kind exposes.
    pub fn handles(&self) -> &'static [Handle] {
        match self {
            Self::Arrow { .. }
            | Self::Text { .. }
            | Self::Highlighter { .. }
            | Self::Stamp { .. } => &[Handle::EndpointA, Handle::EndpointB],
            Self::Ink { .. } | Self::StickyNote { .. } => &[],
        }
    }

    pub fn handle_anchor(&self, handle: Handle) -> Result<&AnchoredPoint, GeometryError> {
        match (self, handle) {
            (Self::Arrow { start, .. }, Handle::EndpointA) => Ok(start),
            (Self::Arrow { end, .. }, Handle::EndpointB) => Ok(end),
            (
                Self::Text { from, .. } | Self::Highlighter { from, .. } | Self::Stamp { from, .. },
                Handle::EndpointA,
            ) => Ok(from),
            (
                Self::Text { to, .. } | Self::Highlighter { to, .. } | Self::Stamp { to, .. },
                Handle::EndpointB,
            ) => Ok(to),
            (Self::Ink { .. } | Self::StickyNote { .. }, _) => Err(GeometryError::NoSuchHandle {
                kind: self.kind().name(),
            }),
        }
    }

    pub fn handle_anchor_mut(
        &mut self,
        handle: Handle,
    ) -> Result<&mut AnchoredPoint, GeometryError> {
        let kind = self.kind();
        match (self, handle) {
            (Self::Arrow { start, .. }, Handle::EndpointA) => Ok(start),
            (Self::Arrow { end, .. }, Handle::EndpointB) => Ok(end),
            (
                Self::Text { from, .. } | Self::Highlighter { from, .. } | Self::Stamp { from, .. },
                Handle::EndpointA,
            ) => Ok(from),
            (
                Self::Text { to, .. } | Self::Highlighter { to, .. } | Self::Stamp { to, .. },
                Handle::EndpointB,
            ) => Ok(to),
            (Self::Ink { .. } | Self::StickyNote { .. }, _) => {
                Err(GeometryError::NoSuchHandle { kind: kind.name() })
            }
        }
    }
}

// ─── Annotation ──────────────────────────────────────────────────────────

/// One drawn annotation: identity, style, and geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    #[serde(default)]
    pub style: Style,
    #[serde(flatten)]
    pub geometry: Geometry,
}

impl Annotation {
    pub fn new(id: AnnotationId, geometry: Geometry) -> Self {
        Self {
            id,
            style: Style::default(),
            geometry,
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn kind(&self) -> AnnotationKind {
        self.geometry.kind()
    }

    /// Regenerate every absolute position from its relative fraction.
    ///
    /// Returns whether any absolute coordinate changed. Skipped (with an
    /// error) while the viewport is unmeasured, so a transient zero-size
    /// container never collapses the annotation to the origin.
    pub fn reproject(&mut self, viewport: Viewport) -> Result<bool, GeometryError> {
        viewport.ensure_measured()?;
        let mut changed = false;
        for anchor in self.geometry.anchors_mut() {
            let before = anchor.abs;
            anchor.reproject(viewport);
            changed |= before != anchor.abs;
        }
        Ok(changed)
    }

    /// Absolute and relative coordinates agree for every point.
    pub fn is_consistent(&self, viewport: Viewport) -> bool {
        self.geometry
            .anchors()
            .iter()
            .all(|a| a.is_consistent(viewport, RELATIVE_TOLERANCE))
    }

    /// Every absolute coordinate lies inside the container.
    pub fn is_within(&self, viewport: Viewport) -> bool {
        self.geometry
            .anchors()
            .iter()
            .all(|a| viewport.contains(a.abs))
    }
}
