//! Geometric primitives: spheres and planar polygons.
//!
//! These types only describe shapes and their surface normals. Ray tests
//! live in the renderer.

use glam::Vec3;
use lumen_math::{Color, VectorBackend};

use crate::scene::SceneError;
use crate::texture::Checker;

/// A sphere primitive.
#[derive(Clone, Debug, PartialEq)]
pub struct Sphere<V: VectorBackend = Vec3> {
    center: V,
    radius: f32,
}

impl<V: VectorBackend> Sphere<V> {
    /// Create a new sphere. The radius must be positive and finite.
    pub fn new(center: V, radius: f32) -> Result<Self, SceneError> {
        if !(radius > 0.0 && radius.is_finite()) || !center.is_finite() {
            return Err(SceneError::InvalidSphere { radius });
        }
        Ok(Self { center, radius })
    }

    pub fn center(&self) -> V {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Outward unit normal at a point on the surface.
    pub fn normal_at(&self, point: V) -> Option<V> {
        (point - self.center).try_normalize()
    }
}

/// An infinite plane `dot(normal, p) + offset = 0`.
///
/// The offset is signed: it is the negated projection of any plane point
/// onto the unit normal, so the normal keeps the orientation given by the
/// vertex winding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane<V: VectorBackend = Vec3> {
    pub normal: V,
    pub offset: f32,
}

impl<V: VectorBackend> Plane<V> {
    /// Plane through three points, normal = `(c - b) x (a - b)`.
    ///
    /// Returns `None` if the points are collinear.
    pub fn from_points(a: V, b: V, c: V) -> Option<Self> {
        let normal = (c - b).cross(a - b).try_normalize()?;
        Some(Self {
            normal,
            offset: -normal.dot(a),
        })
    }

    /// Signed distance from `point` to the plane along the normal.
    pub fn signed_distance(&self, point: V) -> f32 {
        self.normal.dot(point) + self.offset
    }
}

/// A planar polygon with at least three vertices.
///
/// The first three vertices define the plane. Remaining vertices are
/// assumed to lie on it; this is not checked.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon<V: VectorBackend = Vec3> {
    plane: Plane<V>,
    vertices: Vec<V>,
    checker: Option<Checker>,
}

impl<V: VectorBackend> Polygon<V> {
    /// Create a polygon from ordered vertices.
    pub fn new(vertices: Vec<V>) -> Result<Self, SceneError> {
        if vertices.len() < 3 {
            return Err(SceneError::TooFewVertices {
                count: vertices.len(),
            });
        }
        let plane = Plane::from_points(vertices[0], vertices[1], vertices[2])
            .ok_or(SceneError::DegeneratePolygon)?;

        Ok(Self {
            plane,
            vertices,
            checker: None,
        })
    }

    /// Paint the polygon with a procedural checker instead of the flat
    /// material color.
    pub fn with_checker(mut self, checker: Checker) -> Self {
        self.checker = Some(checker);
        self
    }

    pub fn plane(&self) -> &Plane<V> {
        &self.plane
    }

    pub fn vertices(&self) -> &[V] {
        &self.vertices
    }

    pub fn checker(&self) -> Option<&Checker> {
        self.checker.as_ref()
    }

    /// The plane normal; constant over the whole polygon.
    pub fn normal(&self) -> V {
        self.plane.normal
    }
}

/// Shape of a scene object.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape<V: VectorBackend = Vec3> {
    Sphere(Sphere<V>),
    Polygon(Polygon<V>),
}

impl<V: VectorBackend> Shape<V> {
    /// Unit surface normal at `point`.
    pub fn normal_at(&self, point: V) -> Option<V> {
        match self {
            Shape::Sphere(sphere) => sphere.normal_at(point),
            Shape::Polygon(polygon) => Some(polygon.normal()),
        }
    }

    /// Surface color at `point` given the material's diffuse color.
    ///
    /// Spheres are flat colored; polygons use their checker if they have one.
    pub fn color_at(&self, point: V, diffuse: Color) -> Color {
        match self {
            Shape::Polygon(polygon) => match polygon.checker() {
                Some(checker) => checker.color_at(point.to_array()),
                None => diffuse,
            },
            Shape::Sphere(_) => diffuse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3A;

    fn floor() -> Vec<Vec3> {
        vec![
            Vec3::new(7.0, 0.0, 0.0),
            Vec3::new(7.0, 0.0, -100.0),
            Vec3::new(-15.0, 0.0, -100.0),
            Vec3::new(-15.0, 0.0, 0.0),
        ]
    }

    #[test]
    fn test_sphere_normal() {
        let sphere = Sphere::new(Vec3::new(0.0, 1.0, 0.0), 2.0).unwrap();
        let n = sphere.normal_at(Vec3::new(0.0, 3.0, 0.0)).unwrap();
        assert!((n - Vec3::Y).length() < 1e-6);

        // Center has no defined normal
        assert!(sphere.normal_at(Vec3::new(0.0, 1.0, 0.0)).is_none());
    }

    #[test]
    fn test_sphere_rejects_bad_radius() {
        assert!(Sphere::new(Vec3::ZERO, 0.0).is_err());
        assert!(Sphere::new(Vec3::ZERO, -1.0).is_err());
        assert!(Sphere::new(Vec3::ZERO, f32::NAN).is_err());
    }

    #[test]
    fn test_floor_normal_points_up() {
        let polygon = Polygon::new(floor()).unwrap();
        assert!((polygon.normal() - Vec3::Y).length() < 1e-6);
        assert_eq!(polygon.plane().offset, 0.0);
    }

    #[test]
    fn test_plane_offset_is_signed() {
        // Plane y = 2 wound so the normal points up: offset must be -2
        let raised: Vec<Vec3> = floor().into_iter().map(|v| v + Vec3::new(0.0, 2.0, 0.0)).collect();
        let polygon = Polygon::new(raised).unwrap();
        assert!((polygon.normal() - Vec3::Y).length() < 1e-6);
        assert!((polygon.plane().offset + 2.0).abs() < 1e-5);
        assert!(polygon.plane().signed_distance(Vec3::new(0.0, 2.0, -5.0)).abs() < 1e-5);

        // Reversed winding flips the normal and the offset together
        let mut reversed: Vec<Vec3> = floor().into_iter().map(|v| v + Vec3::new(0.0, 2.0, 0.0)).collect();
        reversed.reverse();
        let flipped = Polygon::new(reversed).unwrap();
        assert!((flipped.normal() + Vec3::Y).length() < 1e-6);
        assert!((flipped.plane().offset - 2.0).abs() < 1e-5);
        assert!(flipped.plane().signed_distance(Vec3::new(3.0, 2.0, -1.0)).abs() < 1e-5);
    }

    #[test]
    fn test_polygon_validation() {
        let two = vec![Vec3::ZERO, Vec3::X];
        assert!(matches!(
            Polygon::new(two),
            Err(SceneError::TooFewVertices { count: 2 })
        ));

        let collinear = vec![Vec3::ZERO, Vec3::X, Vec3::X * 2.0];
        assert!(matches!(
            Polygon::new(collinear),
            Err(SceneError::DegeneratePolygon)
        ));
    }

    #[test]
    fn test_simd_backend_polygon() {
        let vertices: Vec<Vec3A> = floor().into_iter().map(Vec3A::from).collect();
        let polygon = Polygon::new(vertices).unwrap();
        assert!((polygon.normal() - Vec3A::Y).length() < 1e-6);
    }

    #[test]
    fn test_shape_color() {
        let diffuse = Color::new(0.2, 0.4, 0.6);
        let sphere = Shape::Sphere(Sphere::new(Vec3::ZERO, 1.0).unwrap());
        assert_eq!(sphere.color_at(Vec3::X, diffuse), diffuse);

        let plain = Shape::Polygon(Polygon::new(floor()).unwrap());
        assert_eq!(plain.color_at(Vec3::new(0.0, 0.0, -1.0), diffuse), diffuse);

        let checkered = Shape::Polygon(Polygon::new(floor()).unwrap().with_checker(Checker::default()));
        assert_ne!(checkered.color_at(Vec3::new(0.0, 0.0, -1.0), diffuse), diffuse);
    }
}
