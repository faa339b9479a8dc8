use crate::VectorBackend;
use glam::Vec3;

/// Distance a secondary ray's origin is moved along its direction so it
/// does not re-hit the surface it was spawned from.
pub const RAY_PUSH_EPSILON: f32 = 0.001;

/// A ray in 3D space with origin, unit direction and magnitude.
///
/// The direction is normalized at construction and never touched again.
/// `magnitude` is the length of the segment the ray was built from (the
/// distance to a light for shadow rays) or infinity for open rays.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray<V: VectorBackend = Vec3> {
    pub origin: V,
    pub direction: V,
    pub magnitude: f32,
}

impl<V: VectorBackend> Ray<V> {
    /// Create an open-ended ray. The direction is normalized.
    ///
    /// Returns `None` when `direction` has zero length.
    pub fn new(origin: V, direction: V) -> Option<Self> {
        let direction = direction.try_normalize()?;
        Some(Self {
            origin,
            direction,
            magnitude: f32::INFINITY,
        })
    }

    /// Create the ray from `from` towards `to`, with `magnitude = |to - from|`.
    ///
    /// Returns `None` when the two points coincide.
    pub fn between(from: V, to: V) -> Option<Self> {
        let delta = to - from;
        let magnitude = delta.length();
        let direction = delta.try_normalize()?;
        Some(Self {
            origin: from,
            direction,
            magnitude,
        })
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> V {
        self.origin
    }

    /// Get the unit direction of the ray.
    #[inline]
    pub fn direction(&self) -> V {
        self.direction
    }

    /// Copy of this ray with its origin nudged by [`RAY_PUSH_EPSILON`]
    /// along the direction. Magnitude is kept.
    #[inline]
    pub fn pushed(&self) -> Self {
        Self {
            origin: self.origin + self.direction * RAY_PUSH_EPSILON,
            ..*self
        }
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> V {
        self.origin + self.direction * t
    }
}
