//! NASADEM/SRTM evelation (`.hgt`) file format.
//!
//! An HGT file is a square grid of big-endian `i16` samples, stored
//! row by row starting at the north-west corner. The file name
//! encodes the south-west corner (e.g. `N44W072.hgt`) and the file
//! length encodes the resolution.
//!
//! # References
//!
//! 1. [HGT file layout](https://www.researchgate.net/profile/Pierre-Boulanger-4/publication/228924813/figure/fig8/AS:300852653903880@1448740270695/Description-of-a-HGT-file-structure-The-name-file-in-this-case-is-N20W100HGT.png)
//! 1. [Archive Team](http://fileformats.archiveteam.org/index.php?title=HGT&oldid=17250)
//! 1. [SRTM Collection User Guide](https://lpdaac.usgs.gov/documents/179/SRTM_User_Guide_V3.pdf)

mod error;

pub use crate::error::NasademError;
use byteorder::{BigEndian as BE, ReadBytesExt};
use geo::geometry::Coord;
use memmap2::Mmap;
use std::{fs::File, io::BufReader, mem::size_of, path::Path};

/// Base floating point type used for all coordinates and heights.
pub type C = f64;

/// Sample value marking a data void.
pub const VOID: i16 = i16::MIN;

const ARCSEC_PER_DEG: C = 3600.0;

pub struct Tile {
    /// Southwest corner of the tile.
    ///
    /// Specificlly, the _center_ of the SW most sample of the tile.
    sw_corner_center: Coord<C>,

    /// Arcseconds per sample.
    resolution: u8,

    /// Number of samples along each edge of this (square) tile.
    dimension: usize,

    /// Elevation samples.
    samples: SampleStore,
}

enum SampleStore {
    /// Stand-in for a tile that does not exist on disk. Every sample
    /// is a void.
    Tombstone,
    InMem(Box<[i16]>),
    MemMap(Mmap),
}

impl SampleStore {
    fn get_unchecked(&self, index: usize) -> i16 {
        match self {
            Self::Tombstone => VOID,
            Self::InMem(samples) => samples[index],
            Self::MemMap(raw) => {
                let start = index * size_of::<i16>();
                let bytes = [raw[start], raw[start + 1]];
                i16::from_be_bytes(bytes)
            }
        }
    }
}

impl Tile {
    /// Returns a Tile read into memory from the file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, NasademError> {
        let (resolution, dimension) = extract_resolution(&path)?;
        let sw_corner_center = sw_corner_center(&path)?;

        let mut file = BufReader::new(File::open(path)?);
        let samples = {
            let mut sample_store = Vec::with_capacity(dimension * dimension);
            for _ in 0..(dimension * dimension) {
                sample_store.push(file.read_i16::<BE>()?);
            }
            SampleStore::InMem(sample_store.into_boxed_slice())
        };

        Ok(Self {
            sw_corner_center,
            resolution,
            dimension,
            samples,
        })
    }

    /// Returns a Tile using the memory-mapped file as storage.
    pub fn memmap<P: AsRef<Path>>(path: P) -> Result<Self, NasademError> {
        let (resolution, dimension) = extract_resolution(&path)?;
        let sw_corner_center = sw_corner_center(&path)?;

        let samples = {
            let file = File::open(path)?;
            // Safety: tiles are opened read-only and are not expected
            // to change while mapped.
            let mmap = unsafe { Mmap::map(&file)? };
            SampleStore::MemMap(mmap)
        };

        Ok(Self {
            sw_corner_center,
            resolution,
            dimension,
            samples,
        })
    }

    /// Returns a 3 arcsecond tile where every sample is a void.
    pub fn tombstone(sw_corner: Coord<i16>) -> Self {
        let sw_corner_center = Coord {
            x: C::from(sw_corner.x),
            y: C::from(sw_corner.y),
        };
        Self {
            sw_corner_center,
            resolution: 3,
            dimension: 1201,
            samples: SampleStore::Tombstone,
        }
    }

    /// Returns the number of samples in this tile.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.dimension * self.dimension
    }

    /// Returns this tile's resolution in arcseconds per sample.
    pub fn resolution(&self) -> u8 {
        self.resolution
    }

    /// Returns `true` if this tile has no backing data.
    pub fn is_tombstone(&self) -> bool {
        matches!(self.samples, SampleStore::Tombstone)
    }

    /// Returns the bilinearly interpolated height, in meters, at
    /// `coord`.
    ///
    /// Returns `None` when `coord` falls outside this tile or any of
    /// the four surrounding samples is a void.
    pub fn height(&self, coord: Coord<C>) -> Option<C> {
        let samples_per_deg = ARCSEC_PER_DEG / C::from(self.resolution);
        let fx = (coord.x - self.sw_corner_center.x) * samples_per_deg;
        let fy = (coord.y - self.sw_corner_center.y) * samples_per_deg;
        #[allow(clippy::cast_precision_loss)]
        let max = (self.dimension - 1) as C;
        if !(0.0..=max).contains(&fx) || !(0.0..=max).contains(&fy) {
            return None;
        }

        // Clamp so the far edge still has a cell to interpolate in.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let x0 = (fx.floor() as usize).min(self.dimension - 2);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let y0 = (fy.floor() as usize).min(self.dimension - 2);
        #[allow(clippy::cast_precision_loss)]
        let (tx, ty) = (fx - x0 as C, fy - y0 as C);

        let mut height = 0.0;
        for (xy, weight) in [
            ((x0, y0), (1.0 - tx) * (1.0 - ty)),
            ((x0 + 1, y0), tx * (1.0 - ty)),
            ((x0, y0 + 1), (1.0 - tx) * ty),
            ((x0 + 1, y0 + 1), tx * ty),
        ] {
            if weight > 0.0 {
                match self.get_xy(xy) {
                    VOID => return None,
                    sample => height += C::from(sample) * weight,
                }
            }
        }
        Some(height)
    }
}

/// Private API
impl Tile {
    /// Returns the raw sample at column `x`, row `y`, where row 0 is
    /// the southernmost row.
    fn get_xy(&self, (x, y): (usize, usize)) -> i16 {
        let idx_1d = self.xy_to_linear_index((x, y));
        self.samples.get_unchecked(idx_1d)
    }

    fn xy_to_linear_index(&self, (x, y): (usize, usize)) -> usize {
        self.dimension * (self.dimension - y - 1) + x
    }
}

fn extract_resolution<P: AsRef<Path>>(path: P) -> Result<(u8, usize), NasademError> {
    const RES_1_ARCSECONDS_FILE_LEN: u64 = 3601 * 3601 * size_of::<i16>() as u64;
    const RES_3_ARCSECONDS_FILE_LEN: u64 = 1201 * 1201 * size_of::<i16>() as u64;
    match path.as_ref().metadata().map(|m| m.len())? {
        RES_1_ARCSECONDS_FILE_LEN => Ok((1, 3601)),
        RES_3_ARCSECONDS_FILE_LEN => Ok((3, 1201)),
        invalid_len => Err(NasademError::HgtLen(invalid_len, path.as_ref().to_owned())),
    }
}

fn sw_corner_center<P: AsRef<Path>>(path: P) -> Result<Coord<C>, NasademError> {
    let Coord { x, y } = parse_sw_corner(path)?;
    Ok(Coord {
        x: C::from(x),
        y: C::from(y),
    })
}

fn parse_sw_corner<P: AsRef<Path>>(path: P) -> Result<Coord<i16>, NasademError> {
    let mk_err = || NasademError::HgtName(path.as_ref().to_owned());
    let name = path
        .as_ref()
        .file_stem()
        .and_then(std::ffi::OsStr::to_str)
        .ok_or_else(mk_err)?;
    if name.len() != 7 || !name.is_ascii() {
        return Err(mk_err());
    }
    let lat_sign = match &name[0..1] {
        "N" | "n" => 1,
        "S" | "s" => -1,
        _ => return Err(mk_err()),
    };
    let lat = lat_sign * name[1..3].parse::<i16>().map_err(|_| mk_err())?;
    let lon_sign = match &name[3..4] {
        "E" | "e" => 1,
        "W" | "w" => -1,
        _ => return Err(mk_err()),
    };
    let lon = lon_sign * name[4..7].parse::<i16>().map_err(|_| mk_err())?;
    Ok(Coord { x: lon, y: lat })
}

#[cfg(test)]
mod tests {
    use super::{extract_resolution, parse_sw_corner, Coord, NasademError, Tile, VOID};
    use approx::assert_relative_eq;
    use std::{fs, io::Write, path::PathBuf};

    /// Writes a synthetic 3 arcsecond tile where the sample at column
    /// `x`, row `y` (counting rows from the south) is `x + 2 * y`,
    /// except for samples listed in `voids`.
    fn write_tile(test: &str, name: &str, voids: &[(usize, usize)]) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("nasadem-{}-{test}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let mut bytes = Vec::with_capacity(1201 * 1201 * 2);
        for row in 0..1201 {
            let y = 1200 - row;
            for x in 0..1201 {
                let sample = if voids.contains(&(x, y)) {
                    VOID
                } else {
                    i16::try_from(x + 2 * y).unwrap()
                };
                bytes.extend_from_slice(&sample.to_be_bytes());
            }
        }
        fs::File::create(&path).unwrap().write_all(&bytes).unwrap();
        path
    }

    #[test]
    fn test_parse_hgt_name() {
        let path = write_tile("parse", "N44W072.hgt", &[]);
        assert_eq!(parse_sw_corner(&path).unwrap(), Coord { x: -72, y: 44 });
        assert_eq!(extract_resolution(&path).unwrap(), (3, 1201));
        assert!(matches!(
            parse_sw_corner(PathBuf::from("X44W072.hgt")),
            Err(NasademError::HgtName(_))
        ));
        assert!(matches!(
            parse_sw_corner(PathBuf::from("Né4W07.hgt")),
            Err(NasademError::HgtName(_))
        ));
        assert!(matches!(
            parse_sw_corner(PathBuf::from("N44É07.hgt")),
            Err(NasademError::HgtName(_))
        ));
    }

    #[test]
    fn test_invalid_len() {
        let dir = std::env::temp_dir().join(format!("nasadem-{}-len", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("N00E000.hgt");
        fs::write(&path, [0_u8; 16]).unwrap();
        assert!(matches!(
            Tile::load(&path),
            Err(NasademError::HgtLen(16, _))
        ));
    }

    #[test]
    fn test_height_on_sample_and_between_samples() {
        let path = write_tile("interp", "N44W072.hgt", &[]);
        let tile = Tile::load(&path).unwrap();
        let spacing = 3.0 / 3600.0;

        let on_sample = Coord {
            x: -72.0 + 10.0 * spacing,
            y: 44.0 + 20.0 * spacing,
        };
        assert_relative_eq!(tile.height(on_sample).unwrap(), 50.0, epsilon = 1e-6);

        // Samples form a plane, so bilinear interpolation is exact.
        let between = Coord {
            x: -72.0 + 10.5 * spacing,
            y: 44.0 + 20.25 * spacing,
        };
        assert_relative_eq!(tile.height(between).unwrap(), 51.0, epsilon = 1e-6);

        let ne_corner = Coord { x: -71.0, y: 45.0 };
        assert_relative_eq!(tile.height(ne_corner).unwrap(), 3600.0, epsilon = 1e-6);
    }

    #[test]
    fn test_out_of_bounds_height_returns_none() {
        let path = write_tile("bounds", "N44W072.hgt", &[]);
        let tile = Tile::memmap(path).unwrap();
        // Assert coordinate a smidge north of tile returns None.
        assert_eq!(tile.height(Coord { x: -71.5, y: 45.1 }), None);
        // Assert coordinate a smidge east of tile returns None.
        assert_eq!(tile.height(Coord { x: -70.9, y: 44.5 }), None);
        // Assert coordinate a smidge south of tile returns None.
        assert_eq!(tile.height(Coord { x: -71.5, y: 43.9 }), None);
        // Assert coordinate a smidge west of tile returns None.
        assert_eq!(tile.height(Coord { x: -72.1, y: 44.5 }), None);
    }

    #[test]
    fn test_void_returns_none() {
        let path = write_tile("void", "N00E000.hgt", &[(5, 5)]);
        let tile = Tile::load(path).unwrap();
        let spacing = 3.0 / 3600.0;
        let next_to_void = Coord {
            x: 4.5 * spacing,
            y: 4.5 * spacing,
        };
        assert_eq!(tile.height(next_to_void), None);
        let clear = Coord {
            x: 1.5 * spacing,
            y: 1.5 * spacing,
        };
        assert!(tile.height(clear).is_some());
    }

    #[test]
    fn test_memmap_matches_load() {
        let path = write_tile("memmap", "S01E010.hgt", &[]);
        let loaded = Tile::load(&path).unwrap();
        let mapped = Tile::memmap(&path).unwrap();
        for row in [0, 1, 600, 1200] {
            for col in [0, 7, 1199, 1200] {
                assert_eq!(loaded.get_xy((col, row)), mapped.get_xy((col, row)));
            }
        }
    }

    #[test]
    fn test_tombstone_is_all_void() {
        let tile = Tile::tombstone(Coord { x: 3, y: 50 });
        assert!(tile.is_tombstone());
        assert_eq!(tile.height(Coord { x: 3.5, y: 50.5 }), None);
    }
}
