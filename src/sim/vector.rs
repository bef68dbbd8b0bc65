//! 2D vector value type
//!
//! `Vector2D` is glam's `Vec2`: a `Copy` value, so every operation yields a
//! fresh vector and nothing aliases. The extension trait below adds the
//! degenerate-case guards the simulation relies on.

use glam::Vec2;

pub type Vector2D = Vec2;

/// Zero-safe vector operations
pub trait VectorExt: Sized {
    /// Unit vector in the same direction, or zero for a zero-length vector
    fn normalized(self) -> Self;
    /// Divide by a scalar; a zero (or non-finite) divisor yields the zero vector
    fn checked_div(self, scalar: f32) -> Self;
    /// Scale by a scalar
    fn scale(self, scalar: f32) -> Self;
}

impl VectorExt for Vec2 {
    #[inline]
    fn normalized(self) -> Self {
        let len = self.length();
        if len > 0.0 && len.is_finite() {
            self / len
        } else {
            Vec2::ZERO
        }
    }

    #[inline]
    fn checked_div(self, scalar: f32) -> Self {
        if scalar == 0.0 || !scalar.is_finite() {
            Vec2::ZERO
        } else {
            self / scalar
        }
    }

    #[inline]
    fn scale(self, scalar: f32) -> Self {
        self * scalar
    }
}
