//! Ray/primitive intersection and brute-force scene queries.
//!
//! Every test returns `Option`: degenerate input (parallel rays, zero
//! length vectors, NaN roots) is reported as a miss rather than leaking
//! non-finite distances into shading.

use std::f64::consts::TAU;

use glam::Vec3;
use lumen_core::{Polygon, Scene, Shape, Sphere};
use lumen_math::{Interval, Ray, VectorBackend};

/// Tolerance on `2π` for the point-in-polygon angle sum.
pub const ANGLE_SUM_EPSILON: f64 = 0.001;

/// A ray/object intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit<V: VectorBackend = Vec3> {
    /// Index of the object in `Scene::objects`
    pub object: usize,
    /// World-space hit point
    pub point: V,
    /// Distance along the ray
    pub distance: f32,
}

/// Real roots of the ray/sphere quadratic, smallest first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Roots {
    None,
    One(f32),
    Two(f32, f32),
}

/// Solve `t² + B t + C = 0` for a unit-direction ray against a sphere.
pub fn sphere_roots<V: VectorBackend>(sphere: &Sphere<V>, ray: &Ray<V>) -> Roots {
    let oc = ray.origin - sphere.center();
    let b = 2.0 * ray.direction.dot(oc);
    let c = oc.dot(oc) - sphere.radius() * sphere.radius();
    let det = b * b - 4.0 * c;

    if !det.is_finite() || det < 0.0 {
        Roots::None
    } else if det == 0.0 {
        Roots::One(-b / 2.0)
    } else {
        let sqrt_det = det.sqrt();
        Roots::Two((-b - sqrt_det) / 2.0, (-b + sqrt_det) / 2.0)
    }
}

/// Distance to the nearest sphere hit in front of the ray origin.
pub fn intersect_sphere<V: VectorBackend>(sphere: &Sphere<V>, ray: &Ray<V>) -> Option<f32> {
    match sphere_roots(sphere, ray) {
        Roots::None => None,
        Roots::One(t) => (t > 0.0).then_some(t),
        Roots::Two(near, far) => {
            if near > 0.0 {
                Some(near)
            } else if far > 0.0 {
                Some(far)
            } else {
                None
            }
        }
    }
}

/// Sum of the angles subtended at `point` by consecutive vertex pairs,
/// wrapping from the last vertex back to the first.
///
/// `None` if `point` coincides with a vertex.
pub fn angle_sum<V: VectorBackend>(point: V, vertices: &[V]) -> Option<f64> {
    let mut sum = 0.0f64;
    for (i, &current) in vertices.iter().enumerate() {
        let next = vertices[(i + 1) % vertices.len()];
        let a = (current - point).try_normalize()?;
        let b = (next - point).try_normalize()?;
        sum += (a.dot(b) as f64).clamp(-1.0, 1.0).acos();
    }
    Some(sum)
}

/// Distance to the polygon along the ray.
///
/// The inside test is the angle sum, which is approximate close to edges.
pub fn intersect_polygon<V: VectorBackend>(polygon: &Polygon<V>, ray: &Ray<V>) -> Option<f32> {
    let plane = polygon.plane();
    let denom = plane.normal.dot(ray.direction);
    if denom == 0.0 {
        return None;
    }

    let w = -plane.signed_distance(ray.origin) / denom;
    if !w.is_finite() || w < 0.0 {
        return None;
    }

    let sum = angle_sum(ray.at(w), polygon.vertices())?;
    ((TAU - sum).abs() < ANGLE_SUM_EPSILON).then_some(w)
}

/// Dispatch on the shape variant.
pub fn intersect_shape<V: VectorBackend>(shape: &Shape<V>, ray: &Ray<V>) -> Option<f32> {
    match shape {
        Shape::Sphere(sphere) => intersect_sphere(sphere, ray),
        Shape::Polygon(polygon) => intersect_polygon(polygon, ray),
    }
}

fn closest_hit<V: VectorBackend>(
    scene: &Scene<V>,
    ray: &Ray<V>,
    range: Interval,
    exclude: Option<usize>,
) -> Option<Hit<V>> {
    let mut closest: Option<(usize, f32)> = None;

    for (index, object) in scene.objects.iter().enumerate() {
        if exclude == Some(index) {
            continue;
        }
        let Some(distance) = intersect_shape(&object.shape, ray) else {
            continue;
        };
        if !range.surrounds(distance) {
            continue;
        }
        // Strict: the earlier object keeps an exact tie
        if closest.map_or(true, |(_, best)| distance < best) {
            closest = Some((index, distance));
        }
    }

    closest.map(|(object, distance)| Hit {
        object,
        point: ray.at(distance),
        distance,
    })
}

/// Nearest object hit by `ray` at a positive distance.
pub fn nearest_hit<V: VectorBackend>(scene: &Scene<V>, ray: &Ray<V>) -> Option<Hit<V>> {
    closest_hit(scene, ray, Interval::FORWARD, None)
}

/// Nearest hit strictly between the ray origin and `ray.magnitude`,
/// skipping object `exclude`.
///
/// Used for shadow rays, whose magnitude is the distance to the light.
pub fn nearest_hit_excluding<V: VectorBackend>(
    scene: &Scene<V>,
    ray: &Ray<V>,
    exclude: Option<usize>,
) -> Option<Hit<V>> {
    closest_hit(scene, ray, Interval::new(0.0, ray.magnitude), exclude)
}
