//! Render configuration.

use serde::{Deserialize, Serialize};

use crate::{RenderError, RenderResult};

/// Local illumination model used for the specular term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadingModel {
    /// `max(0, R . V)^ke` with R the mirrored light vector
    #[default]
    Phong,
    /// `max(0, H . N)^ke` with H the half vector between V and S
    BlinnPhong,
}

/// Largest accepted `sqrt_samples_per_pixel` (4096 samples per pixel).
pub const MAX_SQRT_SAMPLES_PER_PIXEL: u32 = 64;

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output width in pixels
    pub image_width: u32,
    /// Output height in pixels
    pub image_height: u32,
    /// Vertical field of view in degrees
    pub fov_y: f32,
    /// Width / height of the view plane. Defaults to the image aspect.
    pub aspect_ratio: Option<f32>,
    /// Distance from the eye to the view plane
    pub near_plane: f32,
    /// Accepted for completeness; nothing is clipped against it
    pub far_plane: f32,
    /// Sub-samples per pixel along each axis
    pub sqrt_samples_per_pixel: u32,
    /// Maximum reflection/refraction recursion depth
    pub max_depth: u32,
    /// Number of render worker threads
    pub worker_count: usize,
    /// Specular model
    pub shading: ShadingModel,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            image_width: 640,
            image_height: 480,
            fov_y: 45.0,
            aspect_ratio: None,
            near_plane: 1.0,
            far_plane: 200.0,
            sqrt_samples_per_pixel: 2,
            max_depth: 5,
            worker_count: default_worker_count(),
            shading: ShadingModel::Phong,
        }
    }
}

fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl RenderConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> RenderResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self
    }

    /// Set the view frustum: vertical fov (degrees), aspect and near plane.
    pub fn with_view(mut self, fov_y: f32, aspect_ratio: f32, near_plane: f32) -> Self {
        self.fov_y = fov_y;
        self.aspect_ratio = Some(aspect_ratio);
        self.near_plane = near_plane;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, sqrt_samples_per_pixel: u32, max_depth: u32) -> Self {
        self.sqrt_samples_per_pixel = sqrt_samples_per_pixel;
        self.max_depth = max_depth;
        self
    }

    pub fn with_workers(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_shading(mut self, shading: ShadingModel) -> Self {
        self.shading = shading;
        self
    }

    /// Aspect ratio in effect: the explicit one or width / height.
    pub fn effective_aspect(&self) -> f32 {
        self.aspect_ratio
            .unwrap_or(self.image_width as f32 / self.image_height as f32)
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.image_width as usize * self.image_height as usize
    }

    /// Reject configurations the sampler or dispatcher cannot run.
    pub fn validate(&self) -> RenderResult<()> {
        let invalid = |msg: String| Err(RenderError::InvalidConfig(msg));

        if self.image_width == 0 || self.image_height == 0 {
            return invalid(format!(
                "image size must be non-zero, got {}x{}",
                self.image_width, self.image_height
            ));
        }
        if !(self.fov_y > 0.0 && self.fov_y < 180.0) {
            return invalid(format!("fov_y must be in (0, 180) degrees, got {}", self.fov_y));
        }
        let aspect = self.effective_aspect();
        if !(aspect > 0.0 && aspect.is_finite()) {
            return invalid(format!("aspect ratio must be positive, got {aspect}"));
        }
        if !(self.near_plane > 0.0 && self.near_plane.is_finite()) {
            return invalid(format!("near_plane must be positive, got {}", self.near_plane));
        }
        if !(1..=MAX_SQRT_SAMPLES_PER_PIXEL).contains(&self.sqrt_samples_per_pixel) {
            return invalid(format!(
                "sqrt_samples_per_pixel must be in 1..={MAX_SQRT_SAMPLES_PER_PIXEL}, got {}",
                self.sqrt_samples_per_pixel
            ));
        }
        if self.worker_count == 0 {
            return invalid("worker_count must be at least 1".to_string());
        }
        Ok(())
    }
}
