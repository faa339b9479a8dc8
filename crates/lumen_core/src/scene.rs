//! Scene description types.
//!
//! A [`Scene`] is assembled once (usually through [`SceneBuilder`]) and is
//! read-only for the whole render. Render workers share it by reference;
//! nothing in the renderer takes `&mut Scene`.

use glam::Vec3;
use lumen_math::{Color, VectorBackend};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{Polygon, Shape, Sphere};
use crate::texture::Checker;

/// Errors raised while assembling a scene.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("Sphere radius must be positive and finite, got {radius}")]
    InvalidSphere { radius: f32 },

    #[error("Polygon needs at least 3 vertices, got {count}")]
    TooFewVertices { count: usize },

    #[error("First three polygon vertices are collinear")]
    DegeneratePolygon,

    #[error("Camera basis is degenerate (eye == target or up parallel to view direction)")]
    DegenerateCamera,

    #[error("Invalid material on '{object}': {reason}")]
    InvalidMaterial { object: String, reason: String },

    #[error("Scene has no camera")]
    MissingCamera,
}

/// Phong-style surface description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    /// Diffuse color (RGB, 0-1)
    pub diffuse_color: Color,

    /// Specular highlight color (RGB, 0-1)
    pub specular_color: Color,

    /// Ambient coefficient
    pub ka: f32,

    /// Diffuse coefficient
    pub kd: f32,

    /// Specular coefficient
    pub ks: f32,

    /// Phong exponent
    pub ke: f32,

    /// Reflectivity (0 = no mirror bounce)
    pub kr: f32,

    /// Transmissivity (0 = opaque)
    pub kt: f32,

    /// Index of refraction
    pub n: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse_color: Color::splat(0.5), // Grey default
            specular_color: Color::WHITE,
            ka: 0.1,
            kd: 0.7,
            ks: 0.2,
            ke: 20.0,
            kr: 0.0,
            kt: 0.0,
            n: 1.0,
        }
    }
}

impl Material {
    /// Opaque, non-reflective material with the given diffuse color.
    pub fn diffuse(color: Color) -> Self {
        Self {
            diffuse_color: color,
            ..Default::default()
        }
    }

    /// Set the Phong coefficients.
    pub fn with_phong(mut self, ka: f32, kd: f32, ks: f32, ke: f32) -> Self {
        self.ka = ka;
        self.kd = kd;
        self.ks = ks;
        self.ke = ke;
        self
    }

    /// Set the specular color.
    pub fn with_specular_color(mut self, color: Color) -> Self {
        self.specular_color = color;
        self
    }

    /// Set the mirror reflectivity.
    pub fn with_reflection(mut self, kr: f32) -> Self {
        self.kr = kr;
        self
    }

    /// Set transmissivity and index of refraction.
    pub fn with_transmission(mut self, kt: f32, n: f32) -> Self {
        self.kt = kt;
        self.n = n;
        self
    }

    /// Check the coefficients are usable.
    ///
    /// Coefficient sums above 1 are allowed; they only brighten the image.
    pub fn validate(&self) -> Result<(), String> {
        let coefficients = [
            ("ka", self.ka),
            ("kd", self.kd),
            ("ks", self.ks),
            ("ke", self.ke),
            ("kr", self.kr),
            ("kt", self.kt),
        ];
        for (name, value) in coefficients {
            if !value.is_finite() {
                return Err(format!("{name} is not finite"));
            }
        }
        if self.kt != 0.0 && !(self.n > 0.0 && self.n.is_finite()) {
            return Err(format!("refractive index must be positive, got {}", self.n));
        }
        Ok(())
    }
}

/// A point light.
#[derive(Clone, Debug, PartialEq)]
pub struct Light<V: VectorBackend = Vec3> {
    pub position: V,
    pub color: Color,
    /// Nominal reach. Not used for falloff: lights are unattenuated.
    pub range: f32,
}

impl<V: VectorBackend> Light<V> {
    pub fn new(position: V, color: Color) -> Self {
        Self {
            position,
            color,
            range: f32::INFINITY,
        }
    }

    pub fn with_range(mut self, range: f32) -> Self {
        self.range = range;
        self
    }
}

/// Pinhole camera with an orthonormal basis.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera<V: VectorBackend = Vec3> {
    eye: V,
    /// N: into the scene
    forward: V,
    /// U: screen right
    right: V,
    /// V: screen up
    up: V,
}

impl<V: VectorBackend> Camera<V> {
    /// Build the camera basis from an eye point, a look-at point and an
    /// approximate up vector.
    pub fn look_at(eye: V, target: V, up: V) -> Result<Self, SceneError> {
        let forward = (target - eye)
            .try_normalize()
            .ok_or(SceneError::DegenerateCamera)?;
        let right = forward
            .cross(up)
            .try_normalize()
            .ok_or(SceneError::DegenerateCamera)?;
        let up = right.cross(forward);

        Ok(Self {
            eye,
            forward,
            right,
            up,
        })
    }

    pub fn eye(&self) -> V {
        self.eye
    }

    pub fn forward(&self) -> V {
        self.forward
    }

    pub fn right(&self) -> V {
        self.right
    }

    pub fn up(&self) -> V {
        self.up
    }
}

/// Parameters for tone reproduction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneParams {
    /// Maximum luminance of the display device
    pub ld_max: f32,
    /// Maximum luminance of the scene (radiance 1.0 maps to this)
    pub l_max: f32,
}

impl Default for ToneParams {
    fn default() -> Self {
        Self {
            ld_max: 100.0,
            l_max: 1000.0,
        }
    }
}

/// A shape paired with its material.
#[derive(Clone, Debug, PartialEq)]
pub struct Object<V: VectorBackend = Vec3> {
    /// Display name (diagnostics only)
    pub name: String,
    pub shape: Shape<V>,
    pub material: Material,
}

impl<V: VectorBackend> Object<V> {
    pub fn new(name: impl Into<String>, shape: Shape<V>, material: Material) -> Self {
        Self {
            name: name.into(),
            shape,
            material,
        }
    }

    pub fn sphere(name: impl Into<String>, sphere: Sphere<V>, material: Material) -> Self {
        Self::new(name, Shape::Sphere(sphere), material)
    }

    pub fn polygon(name: impl Into<String>, polygon: Polygon<V>, material: Material) -> Self {
        Self::new(name, Shape::Polygon(polygon), material)
    }

    /// Surface color at `point` before lighting.
    pub fn color_at(&self, point: V) -> Color {
        self.shape.color_at(point, self.material.diffuse_color)
    }

    /// Unit surface normal at `point`, `None` if undefined there.
    pub fn normal_at(&self, point: V) -> Option<V> {
        self.shape.normal_at(point)
    }
}

/// Everything the renderer needs to know about the world.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene<V: VectorBackend = Vec3> {
    pub camera: Camera<V>,
    /// Color of rays that escape the scene
    pub background: Color,
    /// Ambient light color
    pub ambient: Color,
    pub objects: Vec<Object<V>>,
    pub lights: Vec<Light<V>>,
    pub tone: ToneParams,
}

impl<V: VectorBackend> Scene<V> {
    /// Start building a scene.
    pub fn builder() -> SceneBuilder<V> {
        SceneBuilder::new()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// The reference scene: a glassy sphere, a mirror sphere and a
    /// checkered floor under a single white light.
    pub fn demo() -> Result<Self, SceneError> {
        let v = V::from_xyz;

        let glass = Material::diffuse(Color::WHITE)
            .with_phong(0.075, 0.075, 0.2, 20.0)
            .with_reflection(0.01)
            .with_transmission(0.85, 0.95);
        let mirror = Material::diffuse(Color::splat(0.7))
            .with_phong(0.15, 0.25, 1.0, 20.0)
            .with_specular_color(Color::new(1.0, 0.95, 0.85))
            .with_reflection(0.75);
        let floor = Material::diffuse(Color::new(0.0, 1.0, 0.0)).with_phong(0.1, 0.7, 0.2, 2.0);

        let floor_polygon = Polygon::new(vec![
            v(7.0, 0.0, 0.0),
            v(7.0, 0.0, -100.0),
            v(-15.0, 0.0, -100.0),
            v(-15.0, 0.0, 0.0),
        ])?
        .with_checker(Checker::default());

        let eye = v(0.0, 4.5, 0.0);

        Scene::builder()
            .with_camera(Camera::look_at(eye, eye + v(0.0, 0.0, -1.0), v(0.0, 1.0, 0.0))?)
            .with_background(Color::new(0.447_058_8, 0.627_450_1, 0.870_588_2))
            .with_ambient(Color::WHITE)
            .with_tone(ToneParams::default())
            .add_sphere("Sphere 1", Sphere::new(v(0.0, 5.0, -6.0), 1.15)?, glass)
            .add_sphere("Sphere 2", Sphere::new(v(-1.25, 3.75, -7.25), 1.0)?, mirror)
            .add_polygon("Floor", floor_polygon, floor)
            .add_light(Light::new(v(1.0, 8.0, 1.0), Color::WHITE).with_range(150.0))
            .build()
    }
}

/// Incremental construction of a [`Scene`].
#[derive(Clone, Debug)]
pub struct SceneBuilder<V: VectorBackend = Vec3> {
    camera: Option<Camera<V>>,
    background: Color,
    ambient: Color,
    tone: ToneParams,
    objects: Vec<Object<V>>,
    lights: Vec<Light<V>>,
}

impl<V: VectorBackend> Default for SceneBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: VectorBackend> SceneBuilder<V> {
    pub fn new() -> Self {
        Self {
            camera: None,
            background: Color::BLACK,
            ambient: Color::splat(0.1),
            tone: ToneParams::default(),
            objects: Vec::new(),
            lights: Vec::new(),
        }
    }

    pub fn with_camera(mut self, camera: Camera<V>) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    pub fn with_ambient(mut self, color: Color) -> Self {
        self.ambient = color;
        self
    }

    pub fn with_tone(mut self, tone: ToneParams) -> Self {
        self.tone = tone;
        self
    }

    pub fn add_object(mut self, object: Object<V>) -> Self {
        self.objects.push(object);
        self
    }

    /// Shorthand for `add_object(Object::sphere(..))`.
    pub fn add_sphere(self, name: impl Into<String>, sphere: Sphere<V>, material: Material) -> Self {
        self.add_object(Object::sphere(name, sphere, material))
    }

    /// Shorthand for `add_object(Object::polygon(..))`.
    pub fn add_polygon(self, name: impl Into<String>, polygon: Polygon<V>, material: Material) -> Self {
        self.add_object(Object::polygon(name, polygon, material))
    }

    pub fn add_light(mut self, light: Light<V>) -> Self {
        self.lights.push(light);
        self
    }

    /// Validate materials and freeze the scene.
    pub fn build(self) -> Result<Scene<V>, SceneError> {
        let camera = self.camera.ok_or(SceneError::MissingCamera)?;

        for object in &self.objects {
            object
                .material
                .validate()
                .map_err(|reason| SceneError::InvalidMaterial {
                    object: object.name.clone(),
                    reason,
                })?;
        }

        if self.lights.is_empty() {
            log::warn!("Scene has no lights; only ambient and background will show");
        }

        log::info!(
            "Built scene with {} objects, {} lights",
            self.objects.len(),
            self.lights.len()
        );

        Ok(Scene {
            camera,
            background: self.background,
            ambient: self.ambient,
            objects: self.objects,
            lights: self.lights,
            tone: self.tone,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3A;

    #[test]
    fn test_camera_basis() {
        let camera = Camera::look_at(
            Vec3::new(0.0, 4.5, 0.0),
            Vec3::new(0.0, 4.5, -1.0),
            Vec3::Y,
        )
        .unwrap();

        assert!((camera.forward() - Vec3::NEG_Z).length() < 1e-6);
        assert!((camera.right() - Vec3::X).length() < 1e-6);
        assert!((camera.up() - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_camera_basis_is_orthonormal_with_tilted_up() {
        let camera = Camera::look_at(Vec3::ZERO, Vec3::new(1.0, -1.0, -3.0), Vec3::new(0.2, 1.0, 0.1)).unwrap();

        assert!(camera.forward().dot(camera.right()).abs() < 1e-5);
        assert!(camera.forward().dot(camera.up()).abs() < 1e-5);
        assert!(camera.right().dot(camera.up()).abs() < 1e-5);
        assert!((camera.up().length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_camera() {
        assert_eq!(
            Camera::look_at(Vec3::ZERO, Vec3::ZERO, Vec3::Y),
            Err(SceneError::DegenerateCamera)
        );
        assert_eq!(
            Camera::look_at(Vec3::ZERO, Vec3::Y, Vec3::Y),
            Err(SceneError::DegenerateCamera)
        );
    }

    #[test]
    fn test_material_validation() {
        assert!(Material::default().validate().is_ok());

        // Refractive index only matters for transmissive materials
        let opaque = Material { n: 0.0, ..Default::default() };
        assert!(opaque.validate().is_ok());

        let glass = Material::default().with_transmission(0.9, 0.0);
        assert!(glass.validate().is_err());

        let broken = Material { kd: f32::NAN, ..Default::default() };
        assert!(broken.validate().is_err());
    }

    #[test]
    fn test_builder_requires_camera() {
        let result = SceneBuilder::<Vec3>::new().build();
        assert_eq!(result.unwrap_err(), SceneError::MissingCamera);
    }

    #[test]
    fn test_builder_rejects_bad_material() {
        let camera = Camera::look_at(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y).unwrap();
        let sphere = Sphere::new(Vec3::NEG_Z * 3.0, 1.0).unwrap();
        let result = Scene::builder()
            .with_camera(camera)
            .add_object(Object::sphere("bad", sphere, Material::default().with_transmission(1.0, -1.0)))
            .build();

        assert!(matches!(result, Err(SceneError::InvalidMaterial { ref object, .. }) if object == "bad"));
    }

    #[test]
    fn test_demo_scene() {
        let _ = env_logger::builder().is_test(true).try_init();
        let scene: Scene = Scene::demo().unwrap();
        assert_eq!(scene.object_count(), 3);
        assert_eq!(scene.light_count(), 1);
        assert!(matches!(scene.objects[2].shape, Shape::Polygon(_)));
        assert_eq!(scene.tone, ToneParams::default());
        // Warm highlight on the mirror ball
        assert_eq!(scene.objects[1].material.specular_color, Color::new(1.0, 0.95, 0.85));
    }

    #[test]
    fn test_demo_scene_simd_backend() {
        let scene = Scene::<Vec3A>::demo().unwrap();
        assert_eq!(scene.object_count(), 3);
        assert!((scene.camera.eye() - Vec3A::new(0.0, 4.5, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_tone_params_from_json() {
        // serde(default) fills in missing fields
        let params: ToneParams = serde_json::from_str(r#"{"ld_max": 50.0}"#).unwrap();
        assert_eq!(params.ld_max, 50.0);
        assert_eq!(params.l_max, 1000.0);
    }

    #[test]
    fn test_material_from_json() {
        let material: Material = serde_json::from_str(r#"{"kr": 0.5, "ke": 8.0}"#).unwrap();
        assert_eq!(material.kr, 0.5);
        assert_eq!(material.ke, 8.0);
        assert_eq!(material.kd, Material::default().kd);
    }
}
