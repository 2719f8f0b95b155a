use crate::{math::round, stats::WeightedIncline};
use serde::Serialize;

/// One output row: a street's GPS incline and its elevation model
/// counterparts.
///
/// Inclines are in percent. Elevation model inclines are `NaN` when
/// the model is not configured or does not cover the street, and the
/// deltas involving them follow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InclineResult {
    pub street_id: i64,

    /// Meters.
    pub street_length: f64,

    /// Distinct traces found near the street.
    pub trace_count: usize,

    /// `NaN` when only one GPS sample exists.
    pub gps_std_dev: f64,

    pub incline_gps: f64,
    pub incline_lidar: f64,
    pub incline_srtm: f64,
    pub delta_gps_lidar: f64,
    pub delta_gps_srtm: f64,
    pub delta_srtm_lidar: f64,
}

impl InclineResult {
    pub fn new(
        street_id: i64,
        street_length: f64,
        trace_count: usize,
        gps: WeightedIncline,
        incline_lidar: f64,
        incline_srtm: f64,
    ) -> Self {
        let incline_gps = gps.mean;
        Self {
            street_id,
            street_length,
            trace_count,
            gps_std_dev: gps.std_dev,
            incline_gps,
            incline_lidar,
            incline_srtm,
            delta_gps_lidar: round(incline_gps - incline_lidar, 7),
            delta_gps_srtm: round(incline_gps - incline_srtm, 7),
            delta_srtm_lidar: round(incline_srtm - incline_lidar, 7),
        }
    }
}
