//! Rectangle geometry for word and highlight matching.
//!
//! All rectangles use a top-left page origin: `y0` is the top edge and
//! grows downward, matching reading order. The loader converts PDF user
//! space (bottom-left origin) before anything reaches this module.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle given by its two corners.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl Rect {
    /// Create a rectangle from two corners in any order.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Smallest rectangle enclosing all the given points.
    ///
    /// Returns `None` for an empty point set.
    pub fn from_points(points: &[(f32, f32)]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut rect = Rect::new(first.0, first.1, first.0, first.1);
        for &(x, y) in rest {
            rect.x0 = rect.x0.min(x);
            rect.y0 = rect.y0.min(y);
            rect.x1 = rect.x1.max(x);
            rect.y1 = rect.y1.max(y);
        }
        Some(rect)
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// A rectangle with no area cannot capture any word.
    pub fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Check if this rectangle overlaps another with a non-empty interior.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x0 < other.x1 && self.x1 > other.x0 && self.y0 < other.y1 && self.y1 > other.y0
    }

    /// Mirror the rectangle vertically inside a page of the given height.
    ///
    /// Converts between bottom-left (PDF user space) and top-left origins.
    pub fn flip_vertical(&self, page_height: f32) -> Rect {
        Rect::new(self.x0, page_height - self.y1, self.x1, page_height - self.y0)
    }
}

/// Convert a flat `QuadPoints` array into one bounding rectangle per quad.
///
/// Every 8 numbers describe the four vertices of one quadrilateral. A
/// trailing group with fewer than 8 numbers is ignored.
pub fn quads_to_rects(quad_points: &[f32]) -> Vec<Rect> {
    quad_points
        .chunks_exact(8)
        .filter_map(|quad| {
            let vertices: Vec<(f32, f32)> = quad.chunks_exact(2).map(|p| (p[0], p[1])).collect();
            Rect::from_points(&vertices)
        })
        .collect()
}
