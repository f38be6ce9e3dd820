use std::path::PathBuf;

use thiserror::Error;

use crate::model::TileSize;

#[derive(Debug, Error)]
pub enum SpriteSheetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Failed to decode frame {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Mismatched size for frame {}: expected {expected}, got {actual}", .path.display())]
    SizeMismatch {
        path: PathBuf,
        expected: TileSize,
        actual: TileSize,
    },
    #[error("Invalid grid layout: {0}")]
    Layout(String),
}

pub type Result<T> = std::result::Result<T, SpriteSheetError>;
