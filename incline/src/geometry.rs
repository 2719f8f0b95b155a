//! Polylines of 3D geographic coordinates.

use crate::math::{self, round_half_ceil, GreatCircle};
use log::warn;

/// Spatial reference id of WGS84 longitude/latitude.
pub const WGS84: i32 = 4326;

/// A longitude (`x`), latitude (`y`) and elevation (`z`) triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coord3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Drops the elevation.
    pub fn xy(&self) -> geo::Coord<f64> {
        geo::Coord {
            x: self.x,
            y: self.y,
        }
    }
}

impl From<geo::Coord<f64>> for Coord3 {
    fn from(geo::Coord { x, y }: geo::Coord<f64>) -> Self {
        Self { x, y, z: 0.0 }
    }
}

/// An ordered run of vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    srid: i32,
    coords: Vec<Coord3>,
}

impl Polyline {
    /// Returns a WGS84 polyline.
    pub fn new(coords: Vec<Coord3>) -> Self {
        Self {
            srid: WGS84,
            coords,
        }
    }

    #[must_use]
    pub fn with_srid(mut self, srid: i32) -> Self {
        self.srid = srid;
        self
    }

    pub fn srid(&self) -> i32 {
        self.srid
    }

    pub fn coords(&self) -> &[Coord3] {
        &self.coords
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Consecutive vertex pairs.
    pub fn segments(&self) -> impl Iterator<Item = (Coord3, Coord3)> + '_ {
        self.coords.windows(2).map(|pair| (pair[0], pair[1]))
    }

    /// Orthometric length in meters, rounded to centimeters.
    ///
    /// Only WGS84 polylines have a length, anything else is logged
    /// and measures 0.
    pub fn length(&self) -> f64 {
        if self.srid != WGS84 {
            warn!(
                "can not measure orthometric length of polyline with SRID {}",
                self.srid
            );
            return 0.0;
        }
        let length: f64 = self.segments().map(|(a, b)| math::distance(a, b)).sum();
        round_half_ceil(length, 2)
    }

    /// Mean segment bearing, in degrees, weighted by each segment's
    /// share of [`Self::length`].
    ///
    /// Bearings are averaged as plain numbers: segments heading
    /// 179° and -179° average to roughly 0°, not 180°.
    pub fn mean_bearing(&self) -> f64 {
        if self.coords.is_empty() {
            return f64::NAN;
        }
        let length = self.length();
        self.segments()
            .map(|(a, b)| math::bearing(a, b) * (math::distance(a, b) / length))
            .sum()
    }

    /// Returns a copy with vertices inserted along great circles so
    /// that no two consecutive vertices are more than `max_spacing`
    /// meters apart.
    ///
    /// Original vertices, end points included, are kept exactly.
    /// Elevations of inserted vertices are interpolated linearly.
    pub fn densify(&self, max_spacing: f64) -> Self {
        let mut coords = Vec::with_capacity(self.coords.len());
        coords.extend(self.coords.first().copied());
        for (start, end) in self.segments() {
            let arc = GreatCircle::new(start, end);
            let pieces = (arc.distance() / max_spacing).ceil();
            if pieces > 1.0 {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let pieces = pieces as usize;
                #[allow(clippy::cast_precision_loss)]
                coords.extend((1..pieces).map(|k| arc.point_at(k as f64 / pieces as f64)));
            }
            coords.push(end);
        }
        Self {
            srid: self.srid,
            coords,
        }
    }
}

/// Disjoint polylines, as produced by clipping a track to a
/// corridor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiPolyline(pub Vec<Polyline>);

impl MultiPolyline {
    pub fn iter(&self) -> std::slice::Iter<'_, Polyline> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Polyline>> for MultiPolyline {
    fn from(lines: Vec<Polyline>) -> Self {
        Self(lines)
    }
}

impl<'a> IntoIterator for &'a MultiPolyline {
    type Item = &'a Polyline;
    type IntoIter = std::slice::Iter<'a, Polyline>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{Coord3, Polyline, WGS84};
    use crate::math::distance;
    use approx::assert_relative_eq;

    fn line(coords: &[(f64, f64, f64)]) -> Polyline {
        Polyline::new(coords.iter().map(|&(x, y, z)| Coord3::new(x, y, z)).collect())
    }

    #[test]
    fn test_length() {
        let l = line(&[(0.0, 0.0, 0.0), (0.0, 0.001, 0.0), (0.0, 0.002, 0.0)]);
        assert_eq!(l.srid(), WGS84);
        assert_relative_eq!(l.length(), 222.39);
        assert_eq!(line(&[]).length(), 0.0);
        assert_eq!(line(&[(1.0, 1.0, 1.0)]).length(), 0.0);
    }

    #[test]
    fn test_length_other_srid_is_zero() {
        let l = line(&[(0.0, 0.0, 0.0), (0.0, 1.0, 0.0)]).with_srid(3857);
        assert_eq!(l.length(), 0.0);
    }

    #[test]
    fn test_mean_bearing() {
        let north = line(&[(0.0, 0.0, 0.0), (0.0, 0.001, 0.0)]);
        assert_relative_eq!(north.mean_bearing(), 0.0, epsilon = 1e-6);

        // 2/3 of the length heads east, 1/3 north.
        let bent = line(&[(0.0, 0.0, 0.0), (0.002, 0.0, 0.0), (0.002, 0.001, 0.0)]);
        assert_relative_eq!(bent.mean_bearing(), 60.0, epsilon = 1e-2);

        assert!(line(&[]).mean_bearing().is_nan());
    }

    #[test]
    fn test_densify_keeps_end_points_and_spacing() {
        let l = line(&[
            (7.0, 49.0, 100.0),
            (7.001, 49.0005, 110.0),
            (7.0011, 49.0005, 111.0),
            (7.003, 49.002, 130.0),
        ]);
        let max_spacing = 10.0;
        let dense = l.densify(max_spacing);

        assert_eq!(dense.coords().first(), l.coords().first());
        assert_eq!(dense.coords().last(), l.coords().last());
        assert!(dense.coords().len() > l.coords().len());
        for (a, b) in dense.segments() {
            assert!(distance(a, b) <= max_spacing + 1e-6);
        }
        for original in l.coords() {
            assert!(dense.coords().contains(original));
        }
        assert_relative_eq!(dense.length(), l.length(), epsilon = 0.02);
    }

    #[test]
    fn test_densify_interpolates_elevation() {
        let l = line(&[(0.0, 0.0, 0.0), (0.0, 0.0009, 100.0)]);
        let dense = l.densify(10.0);
        // 100.07 m / 10 m -> 11 pieces.
        assert_eq!(dense.coords().len(), 12);
        for (a, b) in dense.segments() {
            assert!(b.z > a.z);
        }
    }

    #[test]
    fn test_densify_short_segments_unchanged() {
        let l = line(&[(0.0, 0.0, 0.0), (0.0, 0.00001, 1.0)]);
        assert_eq!(l.densify(10.0), l);
        assert_eq!(line(&[]).densify(10.0), line(&[]));
    }
}
