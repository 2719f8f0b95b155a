mod haversine;
mod round;

pub use {
    haversine::{bearing, distance, GreatCircle},
    round::{round, round_half_ceil},
};

/// Earth radius, in meters, used for all orthometric distances.
pub const EARTH_RADIUS: f64 = 6_371_000.0;
