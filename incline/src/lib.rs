//! Street incline estimation.
//!
//! Each street's incline is derived three ways: from crowd sourced GPS
//! traces travelling along it, and from up to two digital elevation
//! models (LIDAR and SRTM) sampled along its geometry. GPS inclines
//! are length weighted across all trace polylines heading with or
//! against the street; elevation model inclines are plain means over
//! a densified copy of the street.
//!
//! [`run`] drives the computation over a [`StreetSource`], looking up
//! trace fragments in a [`TraceSource`] and appending one
//! [`InclineResult`] per street with at least one GPS sample to a
//! [`ResultSink`].

mod config;
mod direction;
mod error;
mod geometry;
pub mod math;
mod orchestrator;
mod raster;
mod result;
mod source;
mod stats;
mod street;
mod trace;

pub use crate::{
    config::{CapStyle, Corridor, GeometryVariant, InclineConfig, InclineConfigBuilder},
    direction::{Direction, DirectionClassifier},
    error::InclineError,
    geometry::{Coord3, MultiPolyline, Polyline, WGS84},
    orchestrator::{process_street, run, Outcome, RasterSources, RunSummary},
    raster::raster_incline,
    result::InclineResult,
    source::{ResultSink, StreetSource, TraceSource},
    stats::{weighted_mean, weighted_std_dev, InclineSample, WeightedIncline},
    street::{Landuse, StreetSegment, LANDUSE_TAG},
    trace::{GpsTraceFragment, TraceInclineExtractor},
};
pub use terrain::{self, HeightLookup};
