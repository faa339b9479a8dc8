//! Lumen math - vector backends, colors and rays.

// Backends and the rest of glam
pub use glam::*;

mod backend;
mod color;
mod interval;
mod ray;

pub use backend::VectorBackend;
pub use color::{Color, LUMINANCE_WEIGHTS};
pub use interval::Interval;
pub use ray::{Ray, RAY_PUSH_EPSILON};
