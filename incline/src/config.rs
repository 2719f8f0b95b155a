use crate::InclineError;
use std::{fmt, str::FromStr};

/// Which of a trace fragment's geometries feeds the incline samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryVariant {
    /// As recorded.
    Raw,

    /// Smoothed in preprocessing. Fragments without one contribute
    /// nothing.
    Smoothed,
}

impl FromStr for GeometryVariant {
    type Err = InclineError;

    fn from_str(s: &str) -> Result<Self, InclineError> {
        match s {
            "raw" => Ok(Self::Raw),
            "smoothed" => Ok(Self::Smoothed),
            other => Err(InclineError::Config(format!(
                "geometry must be either \"raw\" or \"smoothed\", not {other:?}"
            ))),
        }
    }
}

impl fmt::Display for GeometryVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw => f.write_str("raw"),
            Self::Smoothed => f.write_str("smoothed"),
        }
    }
}

/// End cap of the corridor buffered around a street.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapStyle {
    /// The corridor ends square at the street's end points.
    Flat,

    /// The corridor extends past the end points by the buffer
    /// distance.
    Round,
}

impl FromStr for CapStyle {
    type Err = InclineError;

    fn from_str(s: &str) -> Result<Self, InclineError> {
        match s {
            "flat" | "CAP_FLAT" => Ok(Self::Flat),
            "round" | "CAP_ROUND" => Ok(Self::Round),
            other => Err(InclineError::Config(format!(
                "cap style must be either \"flat\" or \"round\", not {other:?}"
            ))),
        }
    }
}

impl fmt::Display for CapStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat => f.write_str("flat"),
            Self::Round => f.write_str("round"),
        }
    }
}

/// The area around a street in which GPS traces are looked up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corridor {
    /// Buffer distance, in meters, on either side of the street.
    pub distance: f64,

    pub cap: CapStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InclineConfig {
    geometry: GeometryVariant,
    bearing_threshold: f64,
    corridor: Corridor,
    densify_spacing: f64,
    workers: usize,
}

impl InclineConfig {
    pub fn builder() -> InclineConfigBuilder {
        InclineConfigBuilder {
            geometry: None,
            bearing_threshold: None,
            buffer_distance: None,
            cap_style: CapStyle::Round,
            densify_spacing: None,
            workers: 1,
        }
    }

    pub fn geometry(&self) -> GeometryVariant {
        self.geometry
    }

    /// Maximum bearing difference, in degrees, for a trace to count as
    /// travelling along a street.
    pub fn bearing_threshold(&self) -> f64 {
        self.bearing_threshold
    }

    pub fn corridor(&self) -> Corridor {
        self.corridor
    }

    /// Maximum vertex spacing, in meters, when sampling elevation
    /// models along a street.
    pub fn densify_spacing(&self) -> f64 {
        self.densify_spacing
    }

    /// Number of threads computing street inclines.
    pub fn workers(&self) -> usize {
        self.workers
    }
}

pub struct InclineConfigBuilder {
    /// GPS geometry variant (required).
    geometry: Option<GeometryVariant>,

    /// Direction match threshold in degrees (required).
    bearing_threshold: Option<f64>,

    /// Trace corridor buffer distance in meters (required).
    buffer_distance: Option<f64>,

    /// Trace corridor end cap (defaults to round).
    cap_style: CapStyle,

    /// Elevation model sampling distance in meters (required).
    densify_spacing: Option<f64>,

    /// Worker threads (defaults to 1).
    workers: usize,
}

impl InclineConfigBuilder {
    /// GPS geometry variant (required).
    #[must_use]
    pub fn geometry(mut self, variant: GeometryVariant) -> Self {
        self.geometry = Some(variant);
        self
    }

    /// Direction match threshold in degrees (required).
    #[must_use]
    pub fn bearing_threshold(mut self, degrees: f64) -> Self {
        self.bearing_threshold = Some(degrees);
        self
    }

    /// Trace corridor buffer distance in meters (required).
    #[must_use]
    pub fn buffer_distance(mut self, meters: f64) -> Self {
        self.buffer_distance = Some(meters);
        self
    }

    /// Trace corridor end cap (defaults to round).
    #[must_use]
    pub fn cap_style(mut self, cap: CapStyle) -> Self {
        self.cap_style = cap;
        self
    }

    /// Elevation model sampling distance in meters (required).
    #[must_use]
    pub fn densify_spacing(mut self, meters: f64) -> Self {
        self.densify_spacing = Some(meters);
        self
    }

    /// Worker threads (defaults to 1).
    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn build(&self) -> Result<InclineConfig, InclineError> {
        let geometry = self.geometry.ok_or(InclineError::Builder("geometry"))?;
        let bearing_threshold = self
            .bearing_threshold
            .ok_or(InclineError::Builder("bearing_threshold"))?;
        let buffer_distance = self
            .buffer_distance
            .ok_or(InclineError::Builder("buffer_distance"))?;
        let densify_spacing = self
            .densify_spacing
            .ok_or(InclineError::Builder("densify_spacing"))?;

        if !(bearing_threshold > 0.0 && bearing_threshold <= 180.0) {
            return Err(InclineError::Config(format!(
                "bearing threshold must be in (0, 180], not {bearing_threshold}"
            )));
        }
        if !(buffer_distance.is_finite() && buffer_distance > 0.0) {
            return Err(InclineError::Config(format!(
                "buffer distance must be positive, not {buffer_distance}"
            )));
        }
        if !(densify_spacing.is_finite() && densify_spacing > 0.0) {
            return Err(InclineError::Config(format!(
                "densify spacing must be positive, not {densify_spacing}"
            )));
        }
        if self.workers == 0 {
            return Err(InclineError::Config("workers must be at least 1".into()));
        }

        Ok(InclineConfig {
            geometry,
            bearing_threshold,
            corridor: Corridor {
                distance: buffer_distance,
                cap: self.cap_style,
            },
            densify_spacing,
            workers: self.workers,
        })
    }
}
