use nasadem::NasademError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TerrainError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("no height files in {0}")]
    Path(PathBuf),

    #[error("unsupported raster source {0}")]
    Unsupported(PathBuf),

    #[error("invalid grid {path}: {reason}")]
    Grid { path: PathBuf, reason: String },

    #[error("{0}")]
    Nasadem(#[from] NasademError),
}
