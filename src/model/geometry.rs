//! Geometric primitives shared by every pipeline stage.

use serde::{Deserialize, Serialize};

/// A 2D affine transform `[a b c d e f]`.
///
/// Maps a point `(x, y)` to `(a*x + c*y + e, b*x + d*y + f)`, the same
/// layout PDF content streams use for `cm` and `Tm`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    /// X translation
    pub e: f32,
    /// Y translation
    pub f: f32,
}

impl Matrix {
    /// The identity transform.
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Create a matrix from its six coefficients.
    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// A pure translation.
    pub fn translate(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// A pure scale.
    pub fn scale(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Compose `other` into this transform: the result applies `other`
    /// first, then `self`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    /// Transform a point.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }

    /// Translation component (where the local origin lands).
    pub fn translation(&self) -> (f32, f32) {
        (self.e, self.f)
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<[f32; 6]> for Matrix {
    fn from(m: [f32; 6]) -> Self {
        Self::new(m[0], m[1], m[2], m[3], m[4], m[5])
    }
}

/// Orientation of a ruling line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Runs along the y axis; its fixed coordinate is x.
    Vertical,
    /// Runs along the x axis; its fixed coordinate is y.
    Horizontal,
}

/// An axis-aligned rectangle in page coordinates, `(x, y)` being the
/// minimum corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Edge {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rebuild the edge from two opposite corners, normalizing so the
    /// extents are non-negative.
    pub fn from_corners(p1: (f32, f32), p2: (f32, f32)) -> Self {
        Self {
            x: p1.0.min(p2.0),
            y: p1.1.min(p2.1),
            width: (p1.0 - p2.0).abs(),
            height: (p1.1 - p2.1).abs(),
        }
    }

    /// Map this edge through `matrix` and normalize the result.
    pub fn transformed(&self, matrix: &Matrix) -> Self {
        let p1 = matrix.apply(self.x, self.y);
        let p2 = matrix.apply(self.x + self.width, self.y + self.height);
        Self::from_corners(p1, p2)
    }

    /// False when any coordinate is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Which ruler family this edge feeds, if any.
    ///
    /// Edges thin in exactly one dimension qualify; thin-in-both (dots,
    /// degenerate strokes) and thin-in-neither (filled boxes) do not.
    pub fn orientation(&self, line_max_width: f32) -> Option<Orientation> {
        let thin_w = self.width < line_max_width;
        let thin_h = self.height < line_max_width;
        match (thin_w, thin_h) {
            (true, false) => Some(Orientation::Vertical),
            (false, true) => Some(Orientation::Horizontal),
            _ => None,
        }
    }

    /// Coordinate that stays fixed along a ruler of `orientation`.
    pub fn fixed(&self, orientation: Orientation) -> f32 {
        match orientation {
            Orientation::Vertical => self.x,
            Orientation::Horizontal => self.y,
        }
    }

    /// Start coordinate along the ruler's running axis.
    pub fn start(&self, orientation: Orientation) -> f32 {
        match orientation {
            Orientation::Vertical => self.y,
            Orientation::Horizontal => self.x,
        }
    }

    /// Extent along the ruler's running axis.
    pub fn length(&self, orientation: Orientation) -> f32 {
        match orientation {
            Orientation::Vertical => self.height,
            Orientation::Horizontal => self.width,
        }
    }
}

/// A stretch `[start, end]` where a ruling line physically exists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub start: f32,
    pub end: f32,
}

impl Interval {
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> f32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Inclusive overlap test against `[lo, hi]`.
    pub fn overlaps(&self, lo: f32, hi: f32) -> bool {
        self.start <= hi && self.end >= lo
    }

    /// Whether this interval spans `[lo, hi]`, allowing `tolerance` of
    /// slack at either end.
    pub fn covers(&self, lo: f32, hi: f32, tolerance: f32) -> bool {
        self.start <= lo + tolerance && self.end >= hi - tolerance
    }
}

/// One logical grid line: a fixed coordinate plus the disjoint intervals
/// along which the line is drawn. Gaps between intervals mark where the
/// line is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ruler {
    /// `x` for vertical rulers, `y` for horizontal rulers.
    pub position: f32,
    /// Sorted, disjoint intervals along the perpendicular axis.
    pub intervals: Vec<Interval>,
}

impl Ruler {
    pub fn new(position: f32, intervals: Vec<Interval>) -> Self {
        Self {
            position,
            intervals,
        }
    }
}

/// Axis-aligned bounding box `(x_min, y_min, x_max, y_max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl BBox {
    pub fn new(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }

    /// Inclusive intersection test; boxes that merely touch intersect.
    pub fn intersects(&self, other: &BBox) -> bool {
        self.x_min.max(other.x_min) <= self.x_max.min(other.x_max)
            && self.y_min.max(other.y_min) <= self.y_max.min(other.y_max)
    }

    /// Grow this box to cover `other`.
    pub fn expand(&mut self, other: &BBox) {
        self.x_min = self.x_min.min(other.x_min);
        self.y_min = self.y_min.min(other.y_min);
        self.x_max = self.x_max.max(other.x_max);
        self.y_max = self.y_max.max(other.y_max);
    }
}
