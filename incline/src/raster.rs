use crate::{geometry::Polyline, math, InclineError};
use terrain::HeightLookup;

/// Returns the mean incline, in percent, of `densified` according to
/// the elevation model `dem`, rounded to 2 decimals.
///
/// Segment inclines are averaged without weights since densified
/// vertices are about evenly spaced. A single vertex outside the
/// model's coverage makes the whole estimate `NaN`.
pub fn raster_incline<D>(densified: &Polyline, dem: &D) -> Result<f64, InclineError>
where
    D: HeightLookup + ?Sized,
{
    let coords = densified.coords();
    let heights = coords
        .iter()
        .map(|coord| dem.height(coord.xy()))
        .collect::<Result<Vec<f64>, _>>()?;

    let sum: f64 = coords
        .windows(2)
        .zip(heights.windows(2))
        .map(|(c, h)| (h[1] - h[0]) / math::distance(c[0], c[1]) * 100.0)
        .sum();
    #[allow(clippy::cast_precision_loss)]
    let segments = coords.len().saturating_sub(1) as f64;

    Ok(math::round_half_ceil(sum / segments, 2))
}

#[cfg(test)]
mod tests {
    use super::raster_incline;
    use crate::geometry::{Coord3, Polyline};
    use approx::assert_relative_eq;
    use terrain::{geo::Coord, HeightLookup, TerrainError};

    /// Height rises 1 m per 0.0001° of latitude north of 50°N, no
    /// data south of it.
    struct Ramp;

    impl HeightLookup for Ramp {
        fn height(&self, coord: Coord<f64>) -> Result<f64, TerrainError> {
            if coord.y < 50.0 {
                Ok(f64::NAN)
            } else {
                Ok((coord.y - 50.0) * 10_000.0)
            }
        }
    }

    fn meridian(lats: &[f64]) -> Polyline {
        Polyline::new(lats.iter().map(|&y| Coord3::new(8.0, y, 0.0)).collect())
    }

    #[test]
    fn test_incline() {
        let street = meridian(&[50.0, 50.001, 50.002, 50.003]);
        // 10 m rise over 111.19 m.
        assert_relative_eq!(raster_incline(&street, &Ramp).unwrap(), 8.99);

        let mut reversed = street.coords().to_vec();
        reversed.reverse();
        assert_relative_eq!(
            raster_incline(&Polyline::new(reversed), &Ramp).unwrap(),
            -8.99
        );
    }

    #[test]
    fn test_missing_height_propagates() {
        let street = meridian(&[49.9995, 50.0005, 50.0015, 50.0025]);
        assert!(raster_incline(&street, &Ramp).unwrap().is_nan());
    }

    #[test]
    fn test_dyn_lookup() {
        let dem: Box<dyn HeightLookup> = Box::new(Ramp);
        let street = meridian(&[50.0, 50.001]);
        assert_relative_eq!(raster_incline(&street, &*dem).unwrap(), 8.99);
    }
}
