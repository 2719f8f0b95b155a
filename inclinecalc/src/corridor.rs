//! Clipping traces to the corridor around a street.
//!
//! The corridor is a band on either side of every street segment, with
//! round joins at interior vertices and either flat or round caps at
//! the ends. Distances are measured in a local equirectangular
//! projection centered on the street's first vertex, which is accurate
//! to well under a percent over street-sized corridors.

use geo::{BoundingRect, Intersects, LineString, Rect};
use incline::{math::EARTH_RADIUS, CapStyle, Coord3, Corridor, MultiPolyline, Polyline};
use itertools::Itertools;

/// Gaps between inside intervals narrower than this, as a fraction of
/// a trace segment, are closed, and intervals no wider are dropped.
const EPSILON: f64 = 1e-9;

pub struct StreetCorridor {
    /// Projection origin, degrees.
    origin: (f64, f64),

    /// Meters per degree of longitude and latitude at the origin.
    scale: (f64, f64),

    /// Projected street vertices, meters.
    street: Vec<(f64, f64)>,

    /// Street bounding box grown by the buffer distance, degrees.
    bounds: Option<Rect<f64>>,

    corridor: Corridor,
}

impl StreetCorridor {
    pub fn new(street: &Polyline, corridor: Corridor) -> Self {
        let origin = street
            .coords()
            .first()
            .map_or((0.0, 0.0), |first| (first.x, first.y));
        let meters_per_deg = EARTH_RADIUS.to_radians();
        let scale = (meters_per_deg * origin.1.to_radians().cos(), meters_per_deg);

        let bounds = to_line_string(street).bounding_rect().map(|rect| {
            let margin_x = corridor.distance / scale.0;
            let margin_y = corridor.distance / scale.1;
            Rect::new(
                (rect.min().x - margin_x, rect.min().y - margin_y),
                (rect.max().x + margin_x, rect.max().y + margin_y),
            )
        });

        let mut this = Self {
            origin,
            scale,
            street: Vec::new(),
            bounds,
            corridor,
        };
        this.street = street.coords().iter().map(|c| this.project(*c)).collect();
        this
    }

    /// Returns `true` if any part of `bounds` could be inside this
    /// corridor.
    pub fn may_intersect(&self, bounds: &Rect<f64>) -> bool {
        self.bounds
            .as_ref()
            .map_or(false, |own| own.intersects(bounds))
    }

    /// Returns the parts of `line` inside the corridor.
    ///
    /// Segments entering or leaving the corridor are cut where they
    /// cross its boundary, with elevations interpolated linearly.
    /// Parts that shrink to a single point are dropped.
    pub fn clip(&self, line: &Polyline) -> Vec<Polyline> {
        let mut runs = Vec::new();
        let mut run = Vec::new();
        for (a, b) in line.coords().iter().tuple_windows() {
            let intervals = self.intervals(self.project(*a), self.project(*b));
            for &(t0, t1) in &intervals {
                if t0 > EPSILON {
                    close(&mut runs, &mut run);
                }
                if run.is_empty() {
                    push(&mut run, lerp(a, b, t0));
                }
                push(&mut run, lerp(a, b, t1));
            }
            if intervals.last().map_or(true, |&(_, t1)| t1 < 1.0 - EPSILON) {
                close(&mut runs, &mut run);
            }
        }
        close(&mut runs, &mut run);

        runs.into_iter()
            .map(|run| Polyline::new(run).with_srid(line.srid()))
            .collect()
    }

    /// Clips every polyline of `lines`, returning `None` if nothing is
    /// left.
    pub fn clip_all(&self, lines: &[Polyline]) -> Option<MultiPolyline> {
        let clipped: Vec<Polyline> = lines.iter().flat_map(|line| self.clip(line)).collect();
        if clipped.is_empty() {
            None
        } else {
            Some(MultiPolyline(clipped))
        }
    }
}

/// Private API.
impl StreetCorridor {
    fn project(&self, c: Coord3) -> (f64, f64) {
        (
            (c.x - self.origin.0) * self.scale.0,
            (c.y - self.origin.1) * self.scale.1,
        )
    }

    /// Street vertices surrounded by a disk: interior vertices always,
    /// the end vertices only with round caps.
    fn joints(&self) -> impl Iterator<Item = &(f64, f64)> {
        let n = self.street.len();
        let round = self.corridor.cap == CapStyle::Round;
        self.street
            .iter()
            .enumerate()
            .filter(move |(i, _)| round || (*i > 0 && *i + 1 < n))
            .map(|(_, c)| c)
    }

    /// Returns the sorted, disjoint parameter intervals of segment `pq`
    /// that lie inside the corridor.
    fn intervals(&self, p: (f64, f64), q: (f64, f64)) -> Vec<(f64, f64)> {
        let d = self.corridor.distance;
        let mut pieces: Vec<(f64, f64)> = self
            .street
            .iter()
            .tuple_windows()
            .filter_map(|(a, b)| band_interval(p, q, *a, *b, d))
            .chain(self.joints().filter_map(|c| disk_interval(p, q, *c, d)))
            .collect();
        pieces.sort_by(|x, y| x.0.total_cmp(&y.0));

        let mut merged: Vec<(f64, f64)> = Vec::with_capacity(pieces.len());
        for (t0, t1) in pieces {
            match merged.last_mut() {
                Some(last) if t0 <= last.1 + EPSILON => last.1 = last.1.max(t1),
                _ => merged.push((t0, t1)),
            }
        }
        merged.retain(|(t0, t1)| t1 - t0 > EPSILON);
        merged
    }
}

pub fn to_line_string(line: &Polyline) -> LineString<f64> {
    line.coords().iter().map(Coord3::xy).collect()
}

/// Part of segment `pq` within `d` of segment `ab`, measured
/// perpendicular to `ab`, and projecting between `a` and `b`.
fn band_interval(
    p: (f64, f64),
    q: (f64, f64),
    a: (f64, f64),
    b: (f64, f64),
    d: f64,
) -> Option<(f64, f64)> {
    let len = (b.0 - a.0).hypot(b.1 - a.1);
    if len == 0.0 {
        return None;
    }
    let (ux, uy) = ((b.0 - a.0) / len, (b.1 - a.1) / len);
    let (rx, ry) = (p.0 - a.0, p.1 - a.1);
    let (vx, vy) = (q.0 - p.0, q.1 - p.1);

    let along = slab(rx * ux + ry * uy, vx * ux + vy * uy, 0.0, len)?;
    let across = slab(ry * ux - rx * uy, vy * ux - vx * uy, -d, d)?;
    let t0 = along.0.max(across.0).max(0.0);
    let t1 = along.1.min(across.1).min(1.0);
    (t0 <= t1).then_some((t0, t1))
}

/// Parameters for which `start + t * rate` lies in `[lo, hi]`.
fn slab(start: f64, rate: f64, lo: f64, hi: f64) -> Option<(f64, f64)> {
    if rate == 0.0 {
        return (lo..=hi)
            .contains(&start)
            .then_some((f64::NEG_INFINITY, f64::INFINITY));
    }
    let (t0, t1) = ((lo - start) / rate, (hi - start) / rate);
    Some((t0.min(t1), t0.max(t1)))
}

/// Part of segment `pq` within `d` of `center`.
fn disk_interval(p: (f64, f64), q: (f64, f64), center: (f64, f64), d: f64) -> Option<(f64, f64)> {
    let (vx, vy) = (q.0 - p.0, q.1 - p.1);
    let (wx, wy) = (p.0 - center.0, p.1 - center.1);
    let a = vx * vx + vy * vy;
    let c = wx * wx + wy * wy - d * d;
    if a == 0.0 {
        return (c <= 0.0).then_some((0.0, 1.0));
    }
    let half_b = vx * wx + vy * wy;
    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    let t0 = ((-half_b - root) / a).max(0.0);
    let t1 = ((-half_b + root) / a).min(1.0);
    (t0 <= t1).then_some((t0, t1))
}

fn lerp(a: &Coord3, b: &Coord3, t: f64) -> Coord3 {
    if t <= 0.0 {
        *a
    } else if t >= 1.0 {
        *b
    } else {
        Coord3::new(
            a.x + t * (b.x - a.x),
            a.y + t * (b.y - a.y),
            a.z + t * (b.z - a.z),
        )
    }
}

fn push(run: &mut Vec<Coord3>, coord: Coord3) {
    if run.last() != Some(&coord) {
        run.push(coord);
    }
}

fn close(runs: &mut Vec<Vec<Coord3>>, run: &mut Vec<Coord3>) {
    let done = std::mem::take(run);
    if done.len() >= 2 {
        runs.push(done);
    }
}
