//! Great circle routines on a spherical earth.
//!
//! The interpolation is taken from the [geo] crate, modified to carry
//! an elevation along the path.
//!
//! [geo](https://github.com/georust/geo/blob/eb0cd98f3ccfa226631af23d94d66d214ea66488/geo/src/algorithm/haversine_intermediate.rs)

use super::EARTH_RADIUS;
use crate::geometry::Coord3;

/// Returns the haversine distance, in meters, between `p1` and `p2`.
pub fn distance(p1: Coord3, p2: Coord3) -> f64 {
    let lon1 = p1.x.to_radians();
    let lat1 = p1.y.to_radians();
    let lon2 = p2.x.to_radians();
    let lat2 = p2.y.to_radians();
    let delta_lat = lat2 - lat1;
    let delta_lon = lon2 - lon1;

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS * c
}

/// Returns the initial bearing, in degrees within (-180, 180], of the
/// great circle from `p1` to `p2`.
pub fn bearing(p1: Coord3, p2: Coord3) -> f64 {
    let lon1 = p1.x.to_radians();
    let lat1 = p1.y.to_radians();
    let lon2 = p2.x.to_radians();
    let lat2 = p2.y.to_radians();

    let y = (lon2 - lon1).sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * (lon2 - lon1).cos();

    y.atan2(x).to_degrees()
}

/// The great circle arc between two coordinates.
pub struct GreatCircle {
    params: HaversineParams,
    start_z: f64,
    end_z: f64,
}

impl GreatCircle {
    pub fn new(start: Coord3, end: Coord3) -> Self {
        Self {
            params: get_params(start, end),
            start_z: start.z,
            end_z: end.z,
        }
    }

    /// Arc length in meters.
    pub fn distance(&self) -> f64 {
        self.params.d * EARTH_RADIUS
    }

    /// Returns the point at fraction `f` of the arc. Elevation is
    /// interpolated linearly.
    ///
    /// Undefined for a zero length arc.
    pub fn point_at(&self, f: f64) -> Coord3 {
        let mut point = get_point(&self.params, f);
        point.z = self.start_z + (self.end_z - self.start_z) * f;
        point
    }
}

#[allow(clippy::many_single_char_names)]
struct HaversineParams {
    d: f64,
    n: f64,
    o: f64,
    p: f64,
    q: f64,
    r: f64,
    s: f64,
}

#[allow(clippy::many_single_char_names)]
fn get_point(params: &HaversineParams, f: f64) -> Coord3 {
    let HaversineParams {
        d,
        n,
        o,
        p,
        q,
        r,
        s,
    } = *params;

    let a = ((1.0 - f) * d).sin() / d.sin();
    let b = (f * d).sin() / d.sin();

    let x = a * n + b * o;
    let y = a * p + b * q;
    let z = a * r + b * s;

    let lat = z.atan2(x.hypot(y));
    let lon = y.atan2(x);

    Coord3::new(lon.to_degrees(), lat.to_degrees(), 0.0)
}

#[allow(clippy::many_single_char_names)]
fn get_params(p1: Coord3, p2: Coord3) -> HaversineParams {
    let lat1 = p1.y.to_radians();
    let lon1 = p1.x.to_radians();
    let lat2 = p2.y.to_radians();
    let lon2 = p2.x.to_radians();

    let (lat1_sin, lat1_cos) = lat1.sin_cos();
    let (lat2_sin, lat2_cos) = lat2.sin_cos();
    let (lon1_sin, lon1_cos) = lon1.sin_cos();
    let (lon2_sin, lon2_cos) = lon2.sin_cos();

    let m = lat1_cos * lat2_cos;

    let n = lat1_cos * lon1_cos;
    let o = lat2_cos * lon2_cos;
    let p = lat1_cos * lon1_sin;
    let q = lat2_cos * lon2_sin;

    let k =
        (((lat1 - lat2) / 2.0).sin().powi(2) + m * ((lon1 - lon2) / 2.0).sin().powi(2)).sqrt();

    let d = 2.0 * k.asin();

    HaversineParams {
        d,
        n,
        o,
        p,
        q,
        r: lat1_sin,
        s: lat2_sin,
    }
}
