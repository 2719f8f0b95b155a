//! Batched CSV and JSON lines result sinks.

use crate::options::Format;
use incline::{InclineError, InclineResult, ResultSink};
use log::{debug, info};
use serde::Serialize;
use std::io::Write;

/// An output row. A missing standard deviation is written as an
/// empty field (CSV) or `null` (JSON).
#[derive(Serialize)]
struct Row {
    street_id: i64,
    street_length: f64,
    trace_count: usize,
    gps_std_dev: Option<f64>,
    incline_gps: f64,
    incline_lidar: f64,
    incline_srtm: f64,
    delta_gps_lidar: f64,
    delta_gps_srtm: f64,
    delta_srtm_lidar: f64,
}

impl From<&InclineResult> for Row {
    fn from(r: &InclineResult) -> Self {
        Self {
            street_id: r.street_id,
            street_length: r.street_length,
            trace_count: r.trace_count,
            gps_std_dev: Some(r.gps_std_dev).filter(|s| !s.is_nan()),
            incline_gps: r.incline_gps,
            incline_lidar: r.incline_lidar,
            incline_srtm: r.incline_srtm,
            delta_gps_lidar: r.delta_gps_lidar,
            delta_gps_srtm: r.delta_gps_srtm,
            delta_srtm_lidar: r.delta_srtm_lidar,
        }
    }
}

enum Writer<W: Write> {
    Csv(csv::Writer<W>),
    Json(W),
}

/// Buffers results and writes them `batch_size` at a time.
pub struct BatchedSink<W: Write> {
    writer: Writer<W>,
    batch: Vec<InclineResult>,
    batch_size: usize,
    written: usize,
}

impl<W: Write> BatchedSink<W> {
    pub fn new(out: W, format: Format, batch_size: usize) -> Result<Self, InclineError> {
        if batch_size == 0 {
            return Err(InclineError::Config("batch size must be at least 1".into()));
        }
        let writer = match format {
            Format::Csv => Writer::Csv(csv::Writer::from_writer(out)),
            Format::Json => Writer::Json(out),
        };
        Ok(Self {
            writer,
            batch: Vec::with_capacity(batch_size),
            batch_size,
            written: 0,
        })
    }

    /// Results written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> Result<W, InclineError> {
        match self.writer {
            Writer::Csv(wtr) => wtr.into_inner().map_err(|e| InclineError::Io(e.into_error())),
            Writer::Json(wtr) => Ok(wtr),
        }
    }

    fn write_batch(&mut self) -> Result<(), InclineError> {
        if self.batch.is_empty() {
            return Ok(());
        }
        for result in &self.batch {
            let row = Row::from(result);
            match &mut self.writer {
                Writer::Csv(wtr) => wtr.serialize(&row).map_err(source)?,
                Writer::Json(wtr) => {
                    serde_json::to_writer(&mut *wtr, &row).map_err(source)?;
                    wtr.write_all(b"\n")?;
                }
            }
        }
        match &mut self.writer {
            Writer::Csv(wtr) => wtr.flush()?,
            Writer::Json(wtr) => wtr.flush()?,
        }
        self.written += self.batch.len();
        debug!("wrote batch of {} results", self.batch.len());
        self.batch.clear();
        Ok(())
    }
}

impl<W: Write> ResultSink for BatchedSink<W> {
    fn append(&mut self, result: InclineResult) -> Result<(), InclineError> {
        self.batch.push(result);
        if self.batch.len() >= self.batch_size {
            self.write_batch()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), InclineError> {
        self.write_batch()?;
        info!("wrote {} results", self.written);
        Ok(())
    }
}

fn source<E: std::error::Error + Send + Sync + 'static>(e: E) -> InclineError {
    InclineError::Source(Box::new(e))
}
