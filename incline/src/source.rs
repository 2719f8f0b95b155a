//! The collaborators a run reads from and writes to.

use crate::{
    config::Corridor, result::InclineResult, street::StreetSegment, trace::GpsTraceFragment,
    InclineError,
};

/// Streets in ascending id order.
///
/// A street whose geometry can not be read is yielded as
/// [`InclineError::Geometry`]; the run skips it. Any other error ends
/// the run.
pub trait StreetSource: Iterator<Item = Result<StreetSegment, InclineError>> {
    /// Total number of streets this source yields.
    fn total(&self) -> usize;
}

/// Spatial lookup of GPS trace fragments.
pub trait TraceSource {
    /// Returns the fragments whose raw geometry intersects `corridor`
    /// around `street`, each clipped to it.
    fn fetch_near(
        &mut self,
        street: &StreetSegment,
        corridor: &Corridor,
    ) -> Result<Vec<GpsTraceFragment>, InclineError>;
}

/// Destination of result rows.
pub trait ResultSink {
    fn append(&mut self, result: InclineResult) -> Result<(), InclineError>;

    /// Writes any buffered rows.
    fn flush(&mut self) -> Result<(), InclineError>;
}

impl<T: ResultSink + ?Sized> ResultSink for &mut T {
    fn append(&mut self, result: InclineResult) -> Result<(), InclineError> {
        (**self).append(result)
    }

    fn flush(&mut self) -> Result<(), InclineError> {
        (**self).flush()
    }
}

impl ResultSink for Vec<InclineResult> {
    fn append(&mut self, result: InclineResult) -> Result<(), InclineError> {
        self.push(result);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), InclineError> {
        Ok(())
    }
}
