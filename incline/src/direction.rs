//! Matching trace bearings against street bearings.

/// How a GPS polyline travels relative to a street.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Along the street's vertex order.
    Same,

    /// Against the street's vertex order. Inclines flip sign.
    Opposite,

    /// Crossing or otherwise unrelated. Contributes nothing.
    Unrelated,
}

/// Which of the two bearings, if any, gets turned around before an
/// opposite direction test.
///
/// Only a negative bearing is ever turned, and the GPS bearing is
/// checked first. Both bearings non-negative is never opposite, so 5°
/// against 175° is unrelated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quadrant {
    /// GPS bearing negative, street bearing anything.
    GpsNegative,

    /// GPS bearing non-negative, street bearing negative.
    StreetNegative,

    /// Both non-negative.
    NoneNegative,
}

impl Quadrant {
    fn of(gps: f64, street: f64) -> Self {
        if gps < 0.0 {
            Self::GpsNegative
        } else if street < 0.0 {
            Self::StreetNegative
        } else {
            Self::NoneNegative
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionClassifier {
    /// Degrees.
    threshold: f64,
}

impl DirectionClassifier {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns `true` if the bearings differ by less than the
    /// threshold.
    pub fn same_direction(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.threshold
    }

    /// Returns `true` if the negative one of the two bearings, turned
    /// around by 180°, is in the same direction as the other.
    pub fn opposite_direction(&self, gps: f64, street: f64) -> bool {
        match Quadrant::of(gps, street) {
            Quadrant::GpsNegative => self.same_direction(gps + 180.0, street),
            Quadrant::StreetNegative => self.same_direction(gps, street + 180.0),
            Quadrant::NoneNegative => false,
        }
    }

    pub fn classify(&self, gps: f64, street: f64) -> Direction {
        if self.same_direction(gps, street) {
            Direction::Same
        } else if self.opposite_direction(gps, street) {
            Direction::Opposite
        } else {
            Direction::Unrelated
        }
    }
}
