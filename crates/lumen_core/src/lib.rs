//! Lumen Core - Scene description for the lumen ray tracer.
//!
//! This crate provides:
//!
//! - **Geometry**: `Sphere`, `Polygon`, `Plane` and the `Shape` enum
//! - **Scene types**: `Scene`, `Object`, `Material`, `Light`, `Camera`
//! - **Textures**: the procedural `Checker` floor pattern
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::Scene;
//!
//! let scene: Scene = Scene::demo()?;
//! println!("{} objects, {} lights", scene.object_count(), scene.light_count());
//! ```

pub mod geometry;
pub mod scene;
pub mod texture;

// Re-export commonly used types
pub use geometry::{Plane, Polygon, Shape, Sphere};
pub use scene::{Camera, Light, Material, Object, Scene, SceneBuilder, SceneError, ToneParams};
pub use texture::Checker;
