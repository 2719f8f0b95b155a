use terrain::TerrainError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InclineError {
    #[error("missing required parameter '{0}'")]
    Builder(&'static str),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// A single street's geometry is unusable. The street is skipped,
    /// the run continues.
    #[error("street {id}: {reason}")]
    Geometry { id: i64, reason: String },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Failure inside a street, trace or result collaborator.
    #[error("{0}")]
    Source(Box<dyn std::error::Error + Send + Sync>),

    #[error("{0}")]
    Terrain(#[from] TerrainError),
}
