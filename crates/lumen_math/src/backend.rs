//! Pluggable low-level vector math.
//!
//! All geometry, shading and sampling code is written once against
//! [`VectorBackend`]. Two backends ship with the crate:
//!
//! - [`Vec3`]: plain three-lane `f32` vector (scalar layout)
//! - [`Vec3A`]: 16-byte aligned vector that maps onto SIMD registers
//!
//! Both come from glam, so switching backend only changes the memory layout
//! and the instructions glam selects, never the algorithm.

use std::fmt::Debug;
use std::ops::{Add, Mul, Neg, Sub};

use glam::{Vec3, Vec3A};

/// Vector operations required by the ray tracing core.
///
/// Addition, subtraction, negation and scaling come from the operator
/// traits; everything else is spelled out here.
pub trait VectorBackend:
    Copy
    + Debug
    + PartialEq
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f32, Output = Self>
    + Neg<Output = Self>
{
    /// The zero vector.
    const ZERO: Self;

    /// Build a vector from its components.
    fn from_xyz(x: f32, y: f32, z: f32) -> Self;

    /// Components as `[x, y, z]`.
    fn to_array(self) -> [f32; 3];

    /// Dot product.
    fn dot(self, rhs: Self) -> f32;

    /// Cross product.
    fn cross(self, rhs: Self) -> Self;

    /// Euclidean length.
    fn length(self) -> f32;

    /// Unit vector in the same direction.
    ///
    /// Returns `None` for zero-length or non-finite input instead of
    /// producing NaN.
    fn try_normalize(self) -> Option<Self>;

    /// Scale by a scalar.
    #[inline]
    fn scale(self, s: f32) -> Self {
        self * s
    }

    /// True if every component is finite.
    #[inline]
    fn is_finite(self) -> bool {
        self.to_array().iter().all(|c| c.is_finite())
    }
}

macro_rules! impl_glam_backend {
    ($ty:ty) => {
        impl VectorBackend for $ty {
            const ZERO: Self = <$ty>::ZERO;

            #[inline]
            fn from_xyz(x: f32, y: f32, z: f32) -> Self {
                <$ty>::new(x, y, z)
            }

            #[inline]
            fn to_array(self) -> [f32; 3] {
                <$ty>::to_array(&self)
            }

            #[inline]
            fn dot(self, rhs: Self) -> f32 {
                <$ty>::dot(self, rhs)
            }

            #[inline]
            fn cross(self, rhs: Self) -> Self {
                <$ty>::cross(self, rhs)
            }

            #[inline]
            fn length(self) -> f32 {
                <$ty>::length(self)
            }

            #[inline]
            fn try_normalize(self) -> Option<Self> {
                <$ty>::try_normalize(self)
            }
        }
    };
}

impl_glam_backend!(Vec3);
impl_glam_backend!(Vec3A);
