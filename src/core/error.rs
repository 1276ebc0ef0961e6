//! Error types for the voxed engine

use thiserror::Error;

/// Main error type for the engine
#[derive(Debug, Error)]
pub enum Error {
    #[error("texture error: {0}")]
    Texture(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
