//! Height lookups over digital elevation models.
//!
//! Every raster source answers the same question: what is the ground
//! height at a coordinate? Points outside a source's coverage are not
//! errors, they are answered with `NaN`.

mod dem;
mod error;
mod grid;
mod tiles;

pub use crate::{
    dem::Dem,
    error::TerrainError,
    grid::AsciiGrid,
    tiles::{TileMode, Tiles},
};
pub use geo;
use geo::geometry::Coord;

/// A source of ground heights.
///
/// Implementations are shared read-only between threads.
pub trait HeightLookup: Send + Sync {
    /// Returns the height, in meters, at `coord` (`x` = longitude,
    /// `y` = latitude), or `NaN` if `coord` is outside this source's
    /// coverage.
    fn height(&self, coord: Coord<f64>) -> Result<f64, TerrainError>;
}

impl<T: HeightLookup + ?Sized> HeightLookup for &T {
    fn height(&self, coord: Coord<f64>) -> Result<f64, TerrainError> {
        (**self).height(coord)
    }
}

impl<T: HeightLookup + ?Sized> HeightLookup for Box<T> {
    fn height(&self, coord: Coord<f64>) -> Result<f64, TerrainError> {
        (**self).height(coord)
    }
}
