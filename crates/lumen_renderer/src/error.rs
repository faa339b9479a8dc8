//! Render errors.

use thiserror::Error;

/// Errors that abort a render.
///
/// Setup failures are fatal and no partial image is returned.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse render configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Failed to spawn render worker {worker}")]
    WorkerSpawn {
        worker: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Render worker {worker} hung up after {delivered} of {expected} pixels")]
    WorkerDisconnected {
        worker: usize,
        delivered: usize,
        expected: usize,
    },

    #[error("Render worker {worker} panicked")]
    WorkerPanicked { worker: usize },

    #[error("Pixel {index} was written twice")]
    PixelOverwritten { index: usize },

    #[error("Got {actual} colors for a {width}x{height} frame")]
    SizeMismatch {
        width: u32,
        height: u32,
        actual: usize,
    },
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
