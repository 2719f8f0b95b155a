//! GPS trace fragments and the incline samples they yield.

use crate::{
    config::GeometryVariant,
    direction::{Direction, DirectionClassifier},
    geometry::{MultiPolyline, Polyline},
    math,
    stats::InclineSample,
};
use log::trace;

/// A part of a GPS track clipped to one street's corridor.
#[derive(Debug, Clone, PartialEq)]
pub struct GpsTraceFragment {
    pub trace_id: i64,
    pub track_id: i64,
    pub part_id: i64,

    /// Geometry as recorded.
    pub raw: Option<MultiPolyline>,

    /// Geometry after smoothing, if any.
    pub smoothed: Option<MultiPolyline>,
}

impl GpsTraceFragment {
    pub fn geometry(&self, variant: GeometryVariant) -> Option<&MultiPolyline> {
        match variant {
            GeometryVariant::Raw => self.raw.as_ref(),
            GeometryVariant::Smoothed => self.smoothed.as_ref(),
        }
    }
}

/// Turns trace fragments into incline samples relative to a street.
#[derive(Debug, Clone, Copy)]
pub struct TraceInclineExtractor {
    variant: GeometryVariant,
    classifier: DirectionClassifier,
}

impl TraceInclineExtractor {
    pub fn new(variant: GeometryVariant, classifier: DirectionClassifier) -> Self {
        Self {
            variant,
            classifier,
        }
    }

    /// Returns one sample per polyline of `fragment` that travels
    /// along or against `street_bearing`.
    ///
    /// Inclines of polylines travelling against the street are
    /// negated so that every sample is relative to the street's
    /// vertex order.
    pub fn extract(&self, fragment: &GpsTraceFragment, street_bearing: f64) -> Vec<InclineSample> {
        let Some(geometry) = fragment.geometry(self.variant) else {
            return Vec::new();
        };

        geometry
            .iter()
            .filter_map(|line| {
                let length = line.length();
                let incline = weighted_incline(line, length);
                let bearing = line.mean_bearing();
                match self.classifier.classify(bearing, street_bearing) {
                    Direction::Same => Some(InclineSample::new(incline, length)),
                    Direction::Opposite => Some(InclineSample::new(-incline, length)),
                    Direction::Unrelated => {
                        trace!(
                            "trace {} part {}: bearing {bearing:.1} unrelated to street bearing {street_bearing:.1}",
                            fragment.trace_id,
                            fragment.part_id
                        );
                        None
                    }
                }
            })
            .collect()
    }
}

/// Segment inclines, in percent, weighted by each segment's share of
/// `length`. Zero length segments are skipped.
fn weighted_incline(line: &Polyline, length: f64) -> f64 {
    line.segments()
        .filter_map(|(a, b)| {
            let distance = math::distance(a, b);
            (distance > 0.0).then(|| (b.z - a.z) / distance * 100.0 * (distance / length))
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::{GpsTraceFragment, TraceInclineExtractor};
    use crate::{
        config::GeometryVariant,
        direction::DirectionClassifier,
        geometry::{Coord3, MultiPolyline, Polyline},
        math::distance,
    };
    use approx::assert_relative_eq;

    /// Northbound polyline rising `rise` meters per 0.001° step.
    fn northbound(steps: usize, rise: f64) -> Polyline {
        #[allow(clippy::cast_precision_loss)]
        let coords = (0..=steps)
            .map(|i| Coord3::new(8.0, 50.0 + 0.001 * i as f64, rise * i as f64))
            .collect();
        Polyline::new(coords)
    }

    fn fragment(lines: Vec<Polyline>) -> GpsTraceFragment {
        GpsTraceFragment {
            trace_id: 1,
            track_id: 0,
            part_id: 0,
            raw: Some(MultiPolyline(lines)),
            smoothed: None,
        }
    }

    fn extractor(variant: GeometryVariant) -> TraceInclineExtractor {
        TraceInclineExtractor::new(variant, DirectionClassifier::new(20.0))
    }

    #[test]
    fn test_same_direction() {
        let line = northbound(2, 5.0);
        let step = distance(line.coords()[0], line.coords()[1]);
        let samples = extractor(GeometryVariant::Raw).extract(&fragment(vec![line.clone()]), 5.0);
        assert_eq!(samples.len(), 1);
        assert_relative_eq!(samples[0].weight, line.length());
        assert_relative_eq!(
            samples[0].incline,
            5.0 / step * 100.0 * (2.0 * step / line.length()),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_opposite_direction_flips_sign() {
        let mut coords = northbound(2, 5.0).coords().to_vec();
        coords.reverse();
        let southbound = Polyline::new(coords);
        // Southbound travels at 180°, against a street heading -5°.
        let samples = extractor(GeometryVariant::Raw).extract(&fragment(vec![southbound]), -5.0);
        assert_eq!(samples.len(), 1);
        assert!(samples[0].incline > 0.0);
    }

    #[test]
    fn test_unrelated_direction_is_dropped() {
        let samples = extractor(GeometryVariant::Raw).extract(&fragment(vec![northbound(2, 5.0)]), 90.0);
        assert!(samples.is_empty());
    }

    #[test]
    fn test_one_sample_per_polyline() {
        let samples = extractor(GeometryVariant::Raw).extract(
            &fragment(vec![northbound(1, 1.0), northbound(3, 2.0), northbound(2, 0.5)]),
            0.0,
        );
        assert_eq!(samples.len(), 3);
    }

    #[test]
    fn test_zero_length_segments_are_skipped() {
        let mut coords = northbound(1, 3.0).coords().to_vec();
        coords.insert(1, coords[0]);
        let with_repeat = Polyline::new(coords);
        let samples = extractor(GeometryVariant::Raw).extract(&fragment(vec![with_repeat]), 0.0);
        let plain = extractor(GeometryVariant::Raw).extract(&fragment(vec![northbound(1, 3.0)]), 0.0);
        assert_eq!(samples, plain);
        assert!(samples[0].incline.is_finite());
    }

    #[test]
    fn test_missing_variant_yields_nothing() {
        let f = fragment(vec![northbound(2, 5.0)]);
        assert!(extractor(GeometryVariant::Smoothed).extract(&f, 0.0).is_empty());

        let f = GpsTraceFragment { raw: None, ..f };
        assert!(extractor(GeometryVariant::Raw).extract(&f, 0.0).is_empty());
    }
}
