//! Viewport adapter: absolute pixels ↔ viewport-relative fractions.
//!
//! Everything here is a pure function of its inputs. The container size is
//! owned by the rendering host and may change between interactions (window
//! resize, zoom, page switch). A dimension of `0` means the host has not
//! measured the container yet; conversions then return `0` instead of
//! dividing by zero.

use crate::error::GeometryError;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Convert a pixel offset to a fraction of `dimension`.
pub fn to_relative(pixel: f64, dimension: f64) -> f64 {
    if dimension == 0.0 {
        return 0.0;
    }
    pixel / dimension
}

/// Convert a fraction of `dimension` back to pixels.
pub fn to_absolute(fraction: f64, dimension: f64) -> f64 {
    if dimension == 0.0 {
        return 0.0;
    }
    fraction * dimension
}

/// Clamp a pixel offset into `[0, dimension]`.
pub fn clamp(pixel: f64, dimension: f64) -> f64 {
    pixel.min(dimension).max(0.0)
}

/// The pixel size of the container the annotations are laid over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True once the host has reported a usable, positive size.
    pub fn is_measured(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// `Ok(())` if geometry can be computed against this viewport this frame.
    pub fn ensure_measured(&self) -> Result<(), GeometryError> {
        if self.is_measured() {
            Ok(())
        } else {
            Err(GeometryError::UnmeasuredViewport {
                width: self.width,
                height: self.height,
            })
        }
    }

    pub fn point_to_relative(&self, abs: Point) -> Point {
        Point::new(to_relative(abs.x, self.width), to_relative(abs.y, self.height))
    }

    pub fn point_to_absolute(&self, rel: Point) -> Point {
        Point::new(to_absolute(rel.x, self.width), to_absolute(rel.y, self.height))
    }

    pub fn clamp_point(&self, p: Point) -> Point {
        Point::new(clamp(p.x, self.width), clamp(p.y, self.height))
    }

    /// Whether `p` lies inside `[0, width] × [0, height]` (edges included).
    pub fn contains(&self, p: Point) -> bool {
        (0.0..=self.width).contains(&p.x) && (0.0..=self.height).contains(&p.y)
    }
}

/// `Ok(p)` if both coordinates are finite.
pub fn ensure_finite(p: Point) -> Result<Point, GeometryError> {
    if p.x.is_finite() && p.y.is_finite() {
        Ok(p)
    } else {
        Err(GeometryError::NonFinite { x: p.x, y: p.y })
    }
}
