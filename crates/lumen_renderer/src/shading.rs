//! Recursive Whitted shading.
//!
//! Local illumination (ambient + shadowed diffuse/specular) plus mirror
//! reflection and refraction, bounded by a maximum recursion depth.

use std::cell::Cell;

use glam::Vec3;
use lumen_core::{Material, Scene};
use lumen_math::{Color, Ray, VectorBackend};

use crate::intersect::{nearest_hit, nearest_hit_excluding, Hit};
use crate::ShadingModel;

/// Traces rays through a scene.
///
/// A tracer is cheap to create and is not `Sync` (it counts its own
/// calls), so each worker makes its own.
pub struct Tracer<'a, V: VectorBackend = Vec3> {
    scene: &'a Scene<V>,
    max_depth: u32,
    model: ShadingModel,
    shade_calls: Cell<u64>,
}

impl<'a, V: VectorBackend> Tracer<'a, V> {
    pub fn new(scene: &'a Scene<V>, max_depth: u32) -> Self {
        Self {
            scene,
            max_depth,
            model: ShadingModel::default(),
            shade_calls: Cell::new(0),
        }
    }

    pub fn with_model(mut self, model: ShadingModel) -> Self {
        self.model = model;
        self
    }

    /// Number of `shade` evaluations since this tracer was created.
    pub fn shade_calls(&self) -> u64 {
        self.shade_calls.get()
    }

    /// Color seen along a primary ray.
    pub fn trace(&self, ray: &Ray<V>) -> Color {
        self.trace_at_depth(ray, 0)
    }

    fn trace_at_depth(&self, ray: &Ray<V>, depth: u32) -> Color {
        match nearest_hit(self.scene, ray) {
            Some(hit) => self.shade(&hit, ray, depth),
            None => self.scene.background,
        }
    }

    /// Radiance leaving `hit` back along `incoming`.
    ///
    /// At `depth == max_depth` no secondary rays are spawned.
    pub fn shade(&self, hit: &Hit<V>, incoming: &Ray<V>, depth: u32) -> Color {
        self.shade_calls.set(self.shade_calls.get() + 1);

        let scene = self.scene;
        let object = &scene.objects[hit.object];
        let material = &object.material;
        let point = hit.point;

        let surface = object.color_at(point);
        let ambient = surface.mul(scene.ambient, false).scale(material.ka, false);

        let Some(normal) = object.normal_at(point) else {
            log::trace!("No normal on '{}' at {:?}", object.name, point);
            return ambient.clamped();
        };
        let view = (incoming.origin - point)
            .try_normalize()
            .unwrap_or(-incoming.direction);

        let (diffuse, specular) = self.direct_light(hit, normal, view, material.ke);

        let mut color = ambient
            + diffuse.mul(surface, false).scale(material.kd, false)
            + specular.mul(material.specular_color, false).scale(material.ks, false);

        if depth < self.max_depth {
            if material.kr != 0.0 {
                let reflected = self.spawn(point, reflect(normal, view), depth);
                color += reflected.scale(material.kr, false);
            }
            if material.kt != 0.0 {
                let direction = refract(normal, view, incoming.direction, material);
                let transmitted = self.spawn(point, direction, depth);
                color += transmitted.scale(material.kt, false);
            }
        }

        color.clamped()
    }

    /// Summed diffuse and specular light from every unoccluded light.
    fn direct_light(&self, hit: &Hit<V>, normal: V, view: V, ke: f32) -> (Color, Color) {
        let mut diffuse = Color::BLACK;
        let mut specular = Color::BLACK;

        for light in &self.scene.lights {
            let Some(shadow) = Ray::between(hit.point, light.position) else {
                continue;
            };
            let shadow = shadow.pushed();
            if nearest_hit_excluding(self.scene, &shadow, Some(hit.object)).is_some() {
                continue;
            }

            let s = shadow.direction;
            let n_dot_s = normal.dot(s);
            if n_dot_s <= 0.0 {
                continue;
            }

            diffuse += light.color.scale(n_dot_s, false);
            specular += light.color.scale(self.highlight(normal, s, view, n_dot_s, ke), false);
        }

        (diffuse, specular)
    }

    fn highlight(&self, normal: V, s: V, view: V, n_dot_s: f32, ke: f32) -> f32 {
        let cosine = match self.model {
            ShadingModel::Phong => {
                let r = normal * (2.0 * n_dot_s) - s;
                r.dot(view)
            }
            ShadingModel::BlinnPhong => match (view + s).try_normalize() {
                Some(half) => half.dot(normal),
                None => 0.0,
            },
        };
        cosine.max(0.0).powf(ke)
    }

    /// Trace a secondary ray leaving `origin`; background if it escapes.
    fn spawn(&self, origin: V, direction: V, depth: u32) -> Color {
        match Ray::new(origin, direction) {
            Some(ray) => self.trace_at_depth(&ray.pushed(), depth + 1),
            None => self.scene.background,
        }
    }
}

/// Mirror `view` about `normal`.
fn reflect<V: VectorBackend>(normal: V, view: V) -> V {
    normal * (2.0 * view.dot(normal)) - view
}

/// Snell refraction of `incident` through a surface; falls back to the
/// mirror direction on total internal reflection.
fn refract<V: VectorBackend>(normal: V, view: V, incident: V, material: &Material) -> V {
    let mut nit = 1.0 / material.n;
    let mut normal = normal;
    let mut cos = view.dot(normal);

    // Leaving the medium
    if cos < 0.0 {
        nit = 1.0 / nit;
        normal = -normal;
        cos = -cos;
    }

    let disc = 1.0 + nit * nit * (cos * cos - 1.0);
    if disc < 0.0 {
        return reflect(normal, view);
    }
    incident * nit + normal * (nit * cos - disc.sqrt())
}
