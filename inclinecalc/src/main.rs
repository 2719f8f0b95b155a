mod corridor;
mod input;
mod options;
mod output;
mod progress;

use anyhow::Result;
use clap::Parser;
use incline::{HeightLookup, InclineConfig, RasterSources, StreetSource};
use input::{GeoJsonStreets, GeoJsonTraces};
use log::info;
use options::Cli;
use output::BatchedSink;
use progress::ProgressStreets;
use std::{
    fs::File,
    io::{BufWriter, Write},
};
use terrain::Dem;
#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = InclineConfig::builder()
        .geometry(cli.geometry)
        .bearing_threshold(cli.bearing_threshold)
        .buffer_distance(cli.buffer_distance)
        .cap_style(cli.cap_style)
        .densify_spacing(cli.densify_spacing)
        .workers(cli.workers)
        .build()?;

    let lidar = cli.lidar.clone().map(Dem::open).transpose()?;
    let srtm = cli.srtm.clone().map(Dem::open).transpose()?;
    let rasters = RasterSources {
        lidar: lidar.as_ref().map(|dem| dem as &dyn HeightLookup),
        srtm: srtm.as_ref().map(|dem| dem as &dyn HeightLookup),
    };

    let streets = GeoJsonStreets::open(&cli.streets)?;
    let mut traces = GeoJsonTraces::open(&cli.traces)?;
    let out = BufWriter::new(File::create(&cli.out)?);
    let mut sink = BatchedSink::new(out, cli.format, cli.batch_size)?;

    let pb = progress::bar("Streets".to_string(), streets.total() as u64, cli.quiet);
    let summary = incline::run(
        ProgressStreets::new(streets, pb.clone()),
        &mut traces,
        rasters,
        &mut sink,
        &config,
    )?;
    pb.finish_and_clear();

    info!(
        "{} of {} streets have an incline, {} written to {:?}",
        summary.emitted,
        summary.streets,
        sink.written(),
        cli.out
    );
    sink.into_inner()?.flush()?;
    Ok(())
}
