use incline::{InclineError, StreetSegment, StreetSource};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

pub fn bar(header: String, length: u64, quiet: bool) -> ProgressBar {
    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::with_draw_target(Some(length), ProgressDrawTarget::stderr_with_hz(4))
    };
    pb.set_prefix(header);
    pb.set_style(
        ProgressStyle::with_template("{prefix}...\n[{wide_bar:.cyan/blue}] {pos}/{len}")
            .expect("incorrect progress bar format string")
            .progress_chars("#>-"),
    );
    pb
}

/// Advances a progress bar for every street read.
pub struct ProgressStreets<S> {
    streets: S,
    pb: ProgressBar,
}

impl<S: StreetSource> ProgressStreets<S> {
    pub fn new(streets: S, pb: ProgressBar) -> Self {
        Self { streets, pb }
    }
}

impl<S: StreetSource> Iterator for ProgressStreets<S> {
    type Item = Result<StreetSegment, InclineError>;

    fn next(&mut self) -> Option<Self::Item> {
        let street = self.streets.next();
        if street.is_some() {
            self.pb.inc(1);
        }
        street
    }
}

impl<S: StreetSource> StreetSource for ProgressStreets<S> {
    fn total(&self) -> usize {
        self.streets.total()
    }
}
