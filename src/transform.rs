//! 2D transformation matrices for PDF content positioning.

use crate::units::*;

/// A transformation matrix for positioning Form XObjects on a page.
///
/// Uses the standard PDF transformation matrix where (0,0) is at the bottom-left.
/// The matrix is represented as [a, b, c, d, e, f] corresponding to:
/// ```text
/// | a  b  0 |
/// | c  d  0 |
/// | e  f  1 |
/// ```
///
/// Transforms compose with [`then`](Transform::then); operations apply in the order
/// they are chained, so `rotate(θ).with_translate(x, y)` spins the content about its
/// own origin and then moves it to `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Identity transform (no transformation)
    pub fn identity() -> Self {
        Transform {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Create a translation transform
    pub fn translate(x: Pt, y: Pt) -> Self {
        Transform {
            e: *x,
            f: *y,
            ..Transform::identity()
        }
    }

    /// Create a rotation transform (angle in radians, counter-clockwise)
    pub fn rotate(angle: f32) -> Self {
        let cos = angle.cos();
        let sin = angle.sin();
        Transform {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Combine this transform with another (self * other)
    pub fn then(self, other: Transform) -> Self {
        Transform {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Add a translation to this transform
    pub fn with_translate(self, x: Pt, y: Pt) -> Self {
        self.then(Transform::translate(x, y))
    }

    /// Map a point through the transform
    pub fn apply(&self, x: Pt, y: Pt) -> (Pt, Pt) {
        (
            Pt(self.a * *x + self.c * *y + self.e),
            Pt(self.b * *x + self.d * *y + self.f),
        )
    }
}
