//! Lumen Renderer - Whitted-style CPU ray tracing
//!
//! Casts stratified primary rays through every pixel, shades hits with
//! shadowed Phong lighting plus recursive reflection and refraction, and
//! spreads the pixels over a pool of worker threads that report back
//! through one-slot channels.
//!
//! ```ignore
//! use lumen_core::Scene;
//! use lumen_renderer::{render, RenderConfig};
//!
//! let scene: Scene = Scene::demo()?;
//! let frame = render(&scene, &RenderConfig::default().with_resolution(320, 240))?;
//! let rgba = frame.to_rgba8();
//! ```

mod camera;
mod config;
mod dispatch;
mod error;
mod framebuffer;
mod intersect;
mod shading;
mod tonemap;

pub use camera::CameraSampler;
pub use config::{RenderConfig, ShadingModel, MAX_SQRT_SAMPLES_PER_PIXEL};
pub use dispatch::{partition, render, Dispatcher, PixelRenderer, SceneRenderer, WorkerAssignment};
pub use error::{RenderError, RenderResult};
pub use framebuffer::FrameBuffer;
pub use intersect::{
    angle_sum, intersect_polygon, intersect_shape, intersect_sphere, nearest_hit, nearest_hit_excluding,
    sphere_roots, Hit, Roots, ANGLE_SUM_EPSILON,
};
pub use shading::Tracer;
pub use tonemap::{apply_tone, log_average_luminance, ToneOperator};
