use crate::{grid::is_ascii_grid, AsciiGrid, HeightLookup, TerrainError, TileMode, Tiles};
use geo::geometry::Coord;
use log::info;
use std::path::PathBuf;

/// A raster source opened from a path.
pub enum Dem {
    /// A directory of NASADEM/SRTM `.hgt` tiles.
    Tiles(Tiles),

    /// A single ESRI ASCII grid.
    Grid(AsciiGrid),
}

impl Dem {
    /// Opens `path` as a tile directory or an ASCII grid, depending on
    /// what it is.
    pub fn open(path: PathBuf) -> Result<Self, TerrainError> {
        if path.is_dir() {
            info!("using tile directory {path:?}");
            Ok(Self::Tiles(Tiles::new(path, TileMode::MemMap)?))
        } else if is_ascii_grid(&path) {
            info!("using ascii grid {path:?}");
            Ok(Self::Grid(AsciiGrid::open(path)?))
        } else {
            Err(TerrainError::Unsupported(path))
        }
    }
}

impl HeightLookup for Dem {
    fn height(&self, coord: Coord<f64>) -> Result<f64, TerrainError> {
        match self {
            Self::Tiles(tiles) => tiles.height(coord),
            Self::Grid(grid) => grid.height(coord),
        }
    }
}
