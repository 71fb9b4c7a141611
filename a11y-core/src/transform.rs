//! World transform resolution.
//!
//! Overlays are axis-aligned rectangles: rotation and skew in the world
//! transform are dropped, only per-axis scale magnitudes survive. Focus
//! rectangles drawn by assistive technology are always axis-aligned anyway.

use serde::{Deserialize, Serialize};

use crate::config::Size;

/// 2D affine transform in canvas `setTransform` order.
///
/// Maps `(x, y)` to `(a·x + c·y + tx, b·x + d·y + ty)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Affine {
    /// X component of the first basis vector.
    pub a: f64,
    /// Y component of the first basis vector.
    pub b: f64,
    /// X component of the second basis vector.
    pub c: f64,
    /// Y component of the second basis vector.
    pub d: f64,
    /// X translation.
    pub tx: f64,
    /// Y translation.
    pub ty: f64,
}

impl Affine {
    /// The identity transform.
    pub const IDENTITY: Self = Self::new([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    /// Create a transform from `[a, b, c, d, tx, ty]`.
    #[must_use]
    pub const fn new(coeffs: [f64; 6]) -> Self {
        let [a, b, c, d, tx, ty] = coeffs;
        Self { a, b, c, d, tx, ty }
    }

    /// A pure translation.
    #[must_use]
    pub const fn translate(tx: f64, ty: f64) -> Self {
        Self::new([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    /// A translation followed by a non-uniform scale about the translated point.
    #[must_use]
    pub const fn translate_scale(tx: f64, ty: f64, sx: f64, sy: f64) -> Self {
        Self::new([sx, 0.0, 0.0, sy, tx, ty])
    }

    /// Translation, rotation (radians) and scale, composed as a sprite would be.
    #[must_use]
    pub fn from_parts(tx: f64, ty: f64, rotation: f64, sx: f64, sy: f64) -> Self {
        let (sin, cos) = rotation.sin_cos();
        Self::new([cos * sx, sin * sx, -sin * sy, cos * sy, tx, ty])
    }

    /// Coefficients as `[a, b, c, d, tx, ty]`.
    #[must_use]
    pub const fn as_coeffs(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.tx, self.ty]
    }

    /// Length of the first column of the linear part.
    #[must_use]
    pub fn scale_x(&self) -> f64 {
        finite_or_one(self.a.hypot(self.b))
    }

    /// Length of the second column of the linear part.
    #[must_use]
    pub fn scale_y(&self) -> f64 {
        finite_or_one(self.c.hypot(self.d))
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

fn finite_or_one(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        1.0
    }
}

/// Local bounding box of a render node, before any transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Local width, if the node has one.
    pub width: Option<f64>,
    /// Local height, if the node has one.
    pub height: Option<f64>,
    /// Horizontal origin as a fraction of width (0 = left, 1 = right).
    pub origin_x: f64,
    /// Vertical origin as a fraction of height (0 = top, 1 = bottom).
    pub origin_y: f64,
}

impl Bounds {
    /// Bounds with an explicit size and a centered origin.
    #[must_use]
    pub const fn sized(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            origin_x: 0.5,
            origin_y: 0.5,
        }
    }

    /// Set the origin fractions.
    #[must_use]
    pub fn with_origin(mut self, origin_x: f64, origin_y: f64) -> Self {
        self.origin_x = origin_x;
        self.origin_y = origin_y;
        self
    }
}

impl Default for Bounds {
    /// No explicit size, centered origin.
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            origin_x: 0.5,
            origin_y: 0.5,
        }
    }
}

/// Screen-space placement of an overlay element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Scaled width in pixels.
    pub width: f64,
    /// Scaled height in pixels.
    pub height: f64,
    /// Center X in container pixels.
    pub center_x: f64,
    /// Center Y in container pixels.
    pub center_y: f64,
}

impl Placement {
    /// Left edge in container pixels.
    #[must_use]
    pub fn left(&self) -> f64 {
        self.center_x - self.width / 2.0
    }

    /// Top edge in container pixels.
    #[must_use]
    pub fn top(&self) -> f64 {
        self.center_y - self.height / 2.0
    }

    /// Inline style declarations that place a center-origin element.
    #[must_use]
    pub fn style_declarations(&self) -> [(&'static str, String); 5] {
        [
            ("left", format!("{}px", self.center_x)),
            ("top", format!("{}px", self.center_y)),
            ("width", format!("{}px", self.width)),
            ("height", format!("{}px", self.height)),
            ("transform", "translate(-50%, -50%)".to_string()),
        ]
    }
}

/// Resolve a node's world transform and local bounds into a placement.
///
/// Missing or non-positive local extents use `fallback`, so an overlay is
/// never zero-sized and unreachable by pointer or touch.
#[must_use]
pub fn resolve(transform: &Affine, bounds: &Bounds, fallback: Size) -> Placement {
    let local_width = usable_extent(bounds.width).unwrap_or(fallback.width);
    let local_height = usable_extent(bounds.height).unwrap_or(fallback.height);

    let width = local_width * transform.scale_x();
    let height = local_height * transform.scale_y();

    let left = transform.tx - width * bounds.origin_x;
    let top = transform.ty - height * bounds.origin_y;

    Placement {
        width,
        height,
        center_x: left + width / 2.0,
        center_y: top + height / 2.0,
    }
}

fn usable_extent(extent: Option<f64>) -> Option<f64> {
    extent.filter(|e| e.is_finite() && *e > 0.0)
}
