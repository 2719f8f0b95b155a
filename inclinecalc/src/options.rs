use clap::{Parser, ValueEnum};
use incline::{CapStyle, GeometryVariant};
use std::path::PathBuf;

/// Estimate street inclines from GPS traces and compare them against
/// elevation models.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// GeoJSON street line strings with `id` and `tags` properties.
    #[arg(long)]
    pub streets: PathBuf,

    /// GeoJSON GPS traces with `trace_id`, `track_id` and `part_id`
    /// properties.
    #[arg(long)]
    pub traces: PathBuf,

    /// LIDAR elevation model: a directory of `.hgt` tiles or an ESRI
    /// ASCII grid.
    #[arg(long)]
    pub lidar: Option<PathBuf>,

    /// SRTM elevation model: a directory of `.hgt` tiles or an ESRI
    /// ASCII grid.
    #[arg(long)]
    pub srtm: Option<PathBuf>,

    /// Output file.
    #[arg(short, long)]
    pub out: PathBuf,

    #[arg(short, long, value_enum, default_value_t = Format::Csv)]
    pub format: Format,

    /// GPS geometry to derive inclines from ("raw" or "smoothed").
    #[arg(short, long, default_value_t = GeometryVariant::Raw)]
    pub geometry: GeometryVariant,

    /// Maximum bearing difference, in degrees, between a trace and a
    /// street travelling the same way.
    #[arg(short, long, default_value_t = 20.0)]
    pub bearing_threshold: f64,

    /// Distance, in meters, around a street within which traces are
    /// used.
    #[arg(long, default_value_t = 10.0)]
    pub buffer_distance: f64,

    /// End cap of the street corridor ("flat" or "round").
    #[arg(long, default_value_t = CapStyle::Flat)]
    pub cap_style: CapStyle,

    /// Maximum spacing, in meters, of elevation model samples along a
    /// street.
    #[arg(short, long, default_value_t = 10.0)]
    pub densify_spacing: f64,

    /// Results written per batch.
    #[arg(long, default_value_t = 5000)]
    pub batch_size: usize,

    /// Threads computing street inclines.
    #[arg(short, long, default_value_t = 1)]
    pub workers: usize,

    /// Do not show a progress bar.
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Comma separated values with a header row.
    Csv,

    /// One JSON object per line.
    Json,
}
