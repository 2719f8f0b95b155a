//! ESRI ASCII grid (`.asc`) rasters.
//!
//! A six (or five) line header followed by `nrows` rows of `ncols`
//! whitespace separated values, northernmost row first:
//!
//! ```text
//! ncols        4
//! nrows        3
//! xllcorner    7.0
//! yllcorner    49.0
//! cellsize     0.001
//! NODATA_value -9999
//! 1 2 3 4
//! ...
//! ```

use crate::{HeightLookup, TerrainError};
use geo::geometry::Coord;
use log::debug;
use std::{fs, path::Path};

pub struct AsciiGrid {
    /// Center of the south-west most cell.
    sw_center: Coord<f64>,

    /// Cell edge length in coordinate units.
    cellsize: f64,

    ncols: usize,

    nrows: usize,

    /// Row-major samples, northernmost row first. Voids are NaN.
    samples: Box<[f64]>,
}

impl AsciiGrid {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, TerrainError> {
        let path = path.as_ref();
        debug!("loading {path:?}");
        let text = fs::read_to_string(path)?;
        Self::parse(&text).map_err(|reason| TerrainError::Grid {
            path: path.to_owned(),
            reason,
        })
    }

    /// Returns the (west, south, east, north) extent of this grid.
    pub fn extent(&self) -> (f64, f64, f64, f64) {
        let half = self.cellsize / 2.0;
        #[allow(clippy::cast_precision_loss)]
        let (w, h) = (self.ncols as f64, self.nrows as f64);
        let west = self.sw_center.x - half;
        let south = self.sw_center.y - half;
        (
            west,
            south,
            west + w * self.cellsize,
            south + h * self.cellsize,
        )
    }
}

impl HeightLookup for AsciiGrid {
    /// Bilinear interpolation between cell centers. Points in the
    /// outer half cell are clamped to the edge row/column.
    fn height(&self, coord: Coord<f64>) -> Result<f64, TerrainError> {
        let (west, south, east, north) = self.extent();
        if !(west..=east).contains(&coord.x) || !(south..=north).contains(&coord.y) {
            return Ok(f64::NAN);
        }

        #[allow(clippy::cast_precision_loss)]
        let fx = ((coord.x - self.sw_center.x) / self.cellsize).clamp(0.0, (self.ncols - 1) as f64);
        #[allow(clippy::cast_precision_loss)]
        let fy = ((coord.y - self.sw_center.y) / self.cellsize).clamp(0.0, (self.nrows - 1) as f64);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let x0 = (fx.floor() as usize).min(self.ncols.saturating_sub(2));
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let y0 = (fy.floor() as usize).min(self.nrows.saturating_sub(2));
        let x1 = (x0 + 1).min(self.ncols - 1);
        let y1 = (y0 + 1).min(self.nrows - 1);
        #[allow(clippy::cast_precision_loss)]
        let (tx, ty) = (fx - x0 as f64, fy - y0 as f64);

        // Zero-weight neighbours are skipped so a void next to an
        // exact hit does not poison it.
        let height: f64 = [
            ((x0, y0), (1.0 - tx) * (1.0 - ty)),
            ((x1, y0), tx * (1.0 - ty)),
            ((x0, y1), (1.0 - tx) * ty),
            ((x1, y1), tx * ty),
        ]
        .into_iter()
        .filter(|(_, weight)| *weight > 0.0)
        .map(|(xy, weight)| self.get_xy(xy) * weight)
        .sum();
        Ok(height)
    }
}

/// Private API.
impl AsciiGrid {
    /// Returns the sample at column `x`, row `y`, where row 0 is the
    /// southernmost row.
    fn get_xy(&self, (x, y): (usize, usize)) -> f64 {
        self.samples[self.ncols * (self.nrows - y - 1) + x]
    }

    fn parse(text: &str) -> Result<Self, String> {
        let mut tokens = text.split_whitespace().peekable();

        let mut ncols = None;
        let mut nrows = None;
        let mut xll = None;
        let mut yll = None;
        let mut corner = true;
        let mut cellsize = None;
        let mut nodata = None;

        while let Some(key) = tokens.next_if(|t| t.parse::<f64>().is_err()) {
            let key = key.to_ascii_lowercase();
            let value = tokens
                .next()
                .ok_or_else(|| format!("missing value for {key}"))?;
            let number = value
                .parse::<f64>()
                .map_err(|_| format!("invalid value {value:?} for {key}"))?;
            match key.as_str() {
                "ncols" => ncols = Some(parse_dim(value, &key)?),
                "nrows" => nrows = Some(parse_dim(value, &key)?),
                "xllcorner" => xll = Some(number),
                "yllcorner" => yll = Some(number),
                "xllcenter" => {
                    xll = Some(number);
                    corner = false;
                }
                "yllcenter" => {
                    yll = Some(number);
                    corner = false;
                }
                "cellsize" => cellsize = Some(number),
                "nodata_value" => nodata = Some(number),
                _ => return Err(format!("unknown header key {key}")),
            }
        }

        let ncols = ncols.ok_or("missing ncols")?;
        let nrows = nrows.ok_or("missing nrows")?;
        let cellsize = cellsize
            .filter(|c| *c > 0.0)
            .ok_or("missing or non-positive cellsize")?;
        let (mut x, mut y) = (xll.ok_or("missing xll")?, yll.ok_or("missing yll")?);
        if corner {
            x += cellsize / 2.0;
            y += cellsize / 2.0;
        }

        let samples = tokens
            .map(|t| {
                t.parse::<f64>()
                    .map(|v| if Some(v) == nodata { f64::NAN } else { v })
                    .map_err(|_| format!("invalid sample {t:?}"))
            })
            .collect::<Result<Vec<f64>, String>>()?;
        if samples.len() != ncols * nrows {
            return Err(format!(
                "expected {} samples, found {}",
                ncols * nrows,
                samples.len()
            ));
        }

        Ok(Self {
            sw_center: Coord { x, y },
            cellsize,
            ncols,
            nrows,
            samples: samples.into_boxed_slice(),
        })
    }
}

fn parse_dim(value: &str, key: &str) -> Result<usize, String> {
    value
        .parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| format!("invalid {key} {value:?}"))
}

/// Returns `true` if `path` looks like an ASCII grid.
pub(crate) fn is_ascii_grid(path: &Path) -> bool {
    path.extension()
        .and_then(std::ffi::OsStr::to_str)
        .map_or(false, |ext| ext.eq_ignore_ascii_case("asc"))
}

#[cfg(test)]
mod tests {
    use super::{AsciiGrid, Coord, HeightLookup};
    use approx::assert_relative_eq;

    const GRID: &str = "\
ncols 3
nrows 2
xllcorner 10.0
yllcorner 50.0
cellsize 1.0
NODATA_value -9999
10 20 30
0 -9999 20
";

    #[test]
    fn test_parse_header() {
        let grid = AsciiGrid::parse(GRID).unwrap();
        assert_eq!((grid.ncols, grid.nrows), (3, 2));
        assert_eq!(grid.extent(), (10.0, 50.0, 13.0, 52.0));
        assert_eq!(grid.sw_center, Coord { x: 10.5, y: 50.5 });
    }

    #[test]
    fn test_cell_center_heights() {
        let grid = AsciiGrid::parse(GRID).unwrap();
        // North-west cell center.
        assert_relative_eq!(grid.height(Coord { x: 10.5, y: 51.5 }).unwrap(), 10.0);
        // South-west cell center.
        assert_relative_eq!(grid.height(Coord { x: 10.5, y: 50.5 }).unwrap(), 0.0);
        // Halfway between the two.
        assert_relative_eq!(grid.height(Coord { x: 10.5, y: 51.0 }).unwrap(), 5.0);
    }

    #[test]
    fn test_void_and_outside_are_nan() {
        let grid = AsciiGrid::parse(GRID).unwrap();
        assert!(grid.height(Coord { x: 11.5, y: 50.5 }).unwrap().is_nan());
        assert!(grid.height(Coord { x: 9.9, y: 51.0 }).unwrap().is_nan());
        assert!(grid.height(Coord { x: 11.0, y: 52.1 }).unwrap().is_nan());
    }

    #[test]
    fn test_edge_is_clamped() {
        let grid = AsciiGrid::parse(GRID).unwrap();
        assert_relative_eq!(grid.height(Coord { x: 10.1, y: 51.9 }).unwrap(), 10.0);
    }

    #[test]
    fn test_rejects_bad_sample_count() {
        let short = GRID.replace("0 -9999 20\n", "0 -9999\n");
        assert!(AsciiGrid::parse(&short).is_err());
        assert!(AsciiGrid::parse("ncols 2\nnrows 1\nxllcorner 0\nyllcorner 0\n1 2").is_err());
    }
}
