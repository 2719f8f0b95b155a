//! Drives a run over all streets.

use crate::{
    config::InclineConfig,
    direction::DirectionClassifier,
    raster::raster_incline,
    result::InclineResult,
    source::{ResultSink, StreetSource, TraceSource},
    stats::{InclineSample, WeightedIncline},
    street::StreetSegment,
    trace::{GpsTraceFragment, TraceInclineExtractor},
    InclineError,
};
use log::{debug, info, warn};
use rayon::{prelude::*, ThreadPool, ThreadPoolBuilder};
use std::collections::HashSet;
use terrain::HeightLookup;

/// Streets fetched per worker before their inclines are computed.
const CHUNK_PER_WORKER: usize = 64;

/// The elevation models inclines are compared against.
#[derive(Clone, Copy, Default)]
pub struct RasterSources<'a> {
    pub lidar: Option<&'a dyn HeightLookup>,
    pub srtm: Option<&'a dyn HeightLookup>,
}

/// What became of a street.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// No trace fragments near the street.
    NoTraces,

    /// Trace fragments exist but none yielded a sample.
    NoSamples,

    Emit(InclineResult),
}

/// Street counts of a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Streets read from the street source.
    pub streets: usize,
    pub skipped_geometry: usize,
    pub skipped_no_traces: usize,
    pub skipped_no_samples: usize,
    pub emitted: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::NoTraces => self.skipped_no_traces += 1,
            Outcome::NoSamples => self.skipped_no_samples += 1,
            Outcome::Emit(_) => self.emitted += 1,
        }
    }
}

/// Computes the incline result of a single street from the trace
/// fragments found near it.
///
/// A result is only produced when at least one fragment yields an
/// incline sample.
pub fn process_street(
    street: &StreetSegment,
    fragments: &[GpsTraceFragment],
    rasters: RasterSources<'_>,
    config: &InclineConfig,
) -> Result<Outcome, InclineError> {
    if fragments.is_empty() {
        return Ok(Outcome::NoTraces);
    }

    let extractor = TraceInclineExtractor::new(
        config.geometry(),
        DirectionClassifier::new(config.bearing_threshold()),
    );
    let street_bearing = street.bearing();
    let samples: Vec<InclineSample> = fragments
        .iter()
        .flat_map(|fragment| extractor.extract(fragment, street_bearing))
        .collect();
    let Some(gps) = WeightedIncline::aggregate(&samples) else {
        debug!(
            "street {}: none of {} fragments match bearing {street_bearing:.1}",
            street.id(),
            fragments.len()
        );
        return Ok(Outcome::NoSamples);
    };

    let trace_count = fragments
        .iter()
        .map(|fragment| fragment.trace_id)
        .collect::<HashSet<i64>>()
        .len();

    let densified = street.geometry().densify(config.densify_spacing());
    let incline_lidar = match rasters.lidar {
        Some(dem) => raster_incline(&densified, dem)?,
        None => f64::NAN,
    };
    let incline_srtm = match rasters.srtm {
        Some(dem) => raster_incline(&densified, dem)?,
        None => f64::NAN,
    };

    Ok(Outcome::Emit(InclineResult::new(
        street.id(),
        street.length(),
        trace_count,
        gps,
        incline_lidar,
        incline_srtm,
    )))
}

/// Computes the inclines of every street in `streets` and appends
/// them to `sink`, in street order.
///
/// With more than one configured worker, inclines of a chunk of
/// streets are computed in parallel while traces are still fetched
/// one street at a time.
pub fn run<S, T, K>(
    mut streets: S,
    traces: &mut T,
    rasters: RasterSources<'_>,
    sink: &mut K,
    config: &InclineConfig,
) -> Result<RunSummary, InclineError>
where
    S: StreetSource,
    T: TraceSource + ?Sized,
    K: ResultSink + ?Sized,
{
    let total = streets.total();
    info!(
        "computing inclines of {total} streets with {} worker(s)",
        config.workers()
    );

    let pool = if config.workers() > 1 {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.workers())
            .build()
            .map_err(|e| InclineError::Source(Box::new(e)))?;
        Some(pool)
    } else {
        None
    };
    let chunk_size = config.workers() * CHUNK_PER_WORKER;

    let mut summary = RunSummary::default();
    let mut progress = Progress::new(total);
    let mut chunk = Vec::with_capacity(chunk_size);
    let mut exhausted = false;

    while !exhausted {
        chunk.clear();
        while chunk.len() < chunk_size {
            let Some(street) = streets.next() else {
                exhausted = true;
                break;
            };
            summary.streets += 1;
            progress.advance();
            match street {
                Ok(street) => {
                    let fragments = traces.fetch_near(&street, &config.corridor())?;
                    debug!("street {}: {} fragments", street.id(), fragments.len());
                    chunk.push((street, fragments));
                }
                Err(InclineError::Geometry { id, reason }) => {
                    warn!("skipping street {id}: {reason}");
                    summary.skipped_geometry += 1;
                }
                Err(e) => return Err(e),
            }
        }

        for outcome in compute(pool.as_ref(), &chunk, rasters, config)? {
            summary.record(&outcome);
            if let Outcome::Emit(result) = outcome {
                sink.append(result)?;
            }
        }
    }

    sink.flush()?;
    info!(
        "processed {} streets: {} results, {} without traces, {} without samples, {} invalid",
        summary.streets,
        summary.emitted,
        summary.skipped_no_traces,
        summary.skipped_no_samples,
        summary.skipped_geometry
    );
    Ok(summary)
}

/// Processes `chunk` in order, on `pool` if there is one.
fn compute(
    pool: Option<&ThreadPool>,
    chunk: &[(StreetSegment, Vec<GpsTraceFragment>)],
    rasters: RasterSources<'_>,
    config: &InclineConfig,
) -> Result<Vec<Outcome>, InclineError> {
    let process = |(street, fragments): &(StreetSegment, Vec<GpsTraceFragment>)| {
        process_street(street, fragments, rasters, config)
    };
    match pool {
        Some(pool) => pool.install(|| chunk.par_iter().map(process).collect()),
        None => chunk.iter().map(process).collect(),
    }
}

/// Logs every 5% of streets read.
struct Progress {
    total: usize,
    done: usize,
    last_logged: Option<usize>,
}

impl Progress {
    fn new(total: usize) -> Self {
        Self {
            total,
            done: 0,
            last_logged: None,
        }
    }

    /// Counts one street, returning the percentage if it was logged.
    fn advance(&mut self) -> Option<usize> {
        self.done += 1;
        if self.total == 0 {
            return None;
        }
        let percent = (self.done * 100 + self.total / 2) / self.total;
        if percent % 5 == 0 && self.last_logged != Some(percent) {
            info!("{}/{} streets ({percent}%)", self.done, self.total);
            self.last_logged = Some(percent);
            return Some(percent);
        }
        None
    }
}
