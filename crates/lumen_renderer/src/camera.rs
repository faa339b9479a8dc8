//! Primary ray generation.

use glam::Vec3;
use lumen_core::Camera;
use lumen_math::{Ray, VectorBackend};

use crate::RenderConfig;

/// Maps (pixel, sub-sample) pairs to primary rays.
///
/// The view plane sits `near_plane` in front of the eye. Each pixel is
/// split into a `sqrt_spp x sqrt_spp` grid and one ray is cast through
/// the center of every cell, stepping right along U and down along V.
#[derive(Debug, Clone)]
pub struct CameraSampler<V: VectorBackend = Vec3> {
    eye: V,
    forward: V,
    right: V,
    up: V,
    near_plane: f32,
    half_width: f32,
    half_height: f32,
    sample_width: f32,
    width: u32,
    height: u32,
    sqrt_spp: u32,
}

impl<V: VectorBackend> CameraSampler<V> {
    pub fn new(camera: &Camera<V>, config: &RenderConfig) -> Self {
        let half_height = config.near_plane * (config.fov_y.to_radians() / 2.0).tan();
        let half_width = half_height * config.effective_aspect();
        let sqrt_spp = config.sqrt_samples_per_pixel.max(1);
        let sample_width = (half_width / (config.image_width as f32 / 2.0)) / sqrt_spp as f32;

        Self {
            eye: camera.eye(),
            forward: camera.forward(),
            right: camera.right(),
            up: camera.up(),
            near_plane: config.near_plane,
            half_width,
            half_height,
            sample_width,
            width: config.image_width,
            height: config.image_height,
            sqrt_spp,
        }
    }

    /// Rays cast per pixel.
    pub fn samples_per_pixel(&self) -> u32 {
        self.sqrt_spp.saturating_mul(self.sqrt_spp)
    }

    /// Half extents of the view plane.
    pub fn half_extents(&self) -> (f32, f32) {
        (self.half_width, self.half_height)
    }

    /// View-plane offsets (along U, along V) of sub-sample (i, j) of
    /// pixel (x, y).
    pub fn view_offsets(&self, x: u32, y: u32, i: u32, j: u32) -> (f32, f32) {
        let half_w = self.width as f32 / 2.0;
        let half_h = self.height as f32 / 2.0;
        let sub = |k: u32| self.sample_width / 2.0 + k as f32 * self.sample_width;

        let u = ((x as f32 - half_w) / half_w) * self.half_width + sub(i);
        let v = ((half_h - y as f32) / half_h) * self.half_height - sub(j);
        (u, v)
    }

    /// Ray from the eye through sub-sample (i, j) of pixel (x, y).
    pub fn primary_ray(&self, x: u32, y: u32, i: u32, j: u32) -> Option<Ray<V>> {
        let (u, v) = self.view_offsets(x, y, i, j);
        let target = self.eye + self.forward * self.near_plane + self.right * u + self.up * v;
        Ray::between(self.eye, target)
    }

    /// Every primary ray for pixel (x, y), row by row within the pixel.
    pub fn pixel_rays(&self, x: u32, y: u32) -> impl Iterator<Item = Ray<V>> + '_ {
        let n = self.sqrt_spp;
        (0..n)
            .flat_map(move |j| (0..n).map(move |i| (i, j)))
            .filter_map(move |(i, j)| self.primary_ray(x, y, i, j))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3A;

    fn camera() -> Camera {
        Camera::look_at(Vec3::new(0.0, 4.5, 0.0), Vec3::new(0.0, 4.5, -1.0), Vec3::Y).unwrap()
    }

    #[test]
    fn test_view_plane_extents() {
        let config = RenderConfig::default()
            .with_resolution(4, 4)
            .with_view(90.0, 2.0, 1.0)
            .with_quality(1, 1);
        let sampler = CameraSampler::new(&camera(), &config);

        let (half_w, half_h) = sampler.half_extents();
        assert!((half_h - 1.0).abs() < 1e-5);
        assert!((half_w - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_single_pixel_looks_forward() {
        let config = RenderConfig::default()
            .with_resolution(2, 2)
            .with_view(60.0, 1.0, 1.0)
            .with_quality(1, 1);
        let sampler = CameraSampler::new(&camera(), &config);

        // The four pixel centers are symmetric about the view axis
        let rays: Vec<_> = (0..2)
            .flat_map(|y| (0..2).map(move |x| (x, y)))
            .map(|(x, y)| sampler.primary_ray(x, y, 0, 0).unwrap())
            .collect();
        let mean = rays.iter().fold(Vec3::ZERO, |acc, r| acc + r.direction) / 4.0;
        assert!(mean.x.abs() < 1e-5);
        assert!(mean.y.abs() < 1e-5);
        assert!(mean.z < 0.0);

        // Top-left pixel looks up and left
        assert!(rays[0].direction.x < 0.0);
        assert!(rays[0].direction.y > 0.0);
    }

    #[test]
    fn test_sub_samples_stay_inside_pixel() {
        let config = RenderConfig::default()
            .with_resolution(8, 6)
            .with_view(50.0, 8.0 / 6.0, 1.0)
            .with_quality(3, 1);
        let sampler = CameraSampler::new(&camera(), &config);
        let (half_w, half_h) = sampler.half_extents();
        let pixel_w = half_w / 4.0;
        let pixel_h = half_h / 3.0;

        for y in 0..6 {
            for x in 0..8 {
                let left = -half_w + x as f32 * pixel_w;
                let top = half_h - y as f32 * pixel_h;
                for j in 0..3 {
                    for i in 0..3 {
                        let (u, v) = sampler.view_offsets(x, y, i, j);
                        assert!(u > left && u < left + pixel_w, "u={u} outside pixel ({x}, {y})");
                        assert!(v < top && v > top - pixel_h, "v={v} outside pixel ({x}, {y})");
                    }
                }
            }
        }
    }

    #[test]
    fn test_pixel_rays_count() {
        let config = RenderConfig::default().with_resolution(4, 4).with_quality(3, 1);
        let sampler = CameraSampler::new(&camera(), &config);

        assert_eq!(sampler.samples_per_pixel(), 9);
        assert_eq!(sampler.pixel_rays(1, 2).count(), 9);
        for ray in sampler.pixel_rays(1, 2) {
            assert_eq!(ray.origin, Vec3::new(0.0, 4.5, 0.0));
            assert!((ray.direction.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_samples_per_pixel_saturates() {
        // Unvalidated config; the sampler must not overflow on its own
        let config = RenderConfig::default().with_quality(u32::MAX, 1);
        let sampler = CameraSampler::new(&camera(), &config);
        assert_eq!(sampler.samples_per_pixel(), u32::MAX);
    }

    #[test]
    fn test_simd_backend_matches_scalar() {
        let config = RenderConfig::default().with_resolution(5, 3).with_quality(2, 1);
        let scalar = CameraSampler::new(&camera(), &config);
        let simd_camera = Camera::look_at(Vec3A::new(0.0, 4.5, 0.0), Vec3A::new(0.0, 4.5, -1.0), Vec3A::Y).unwrap();
        let simd = CameraSampler::new(&simd_camera, &config);

        let a = scalar.primary_ray(3, 1, 1, 0).unwrap();
        let b = simd.primary_ray(3, 1, 1, 0).unwrap();
        assert!((a.direction - Vec3::from(b.direction)).length() < 1e-6);
    }
}
