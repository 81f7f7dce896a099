mod opt_common;
mod opt_from_gibuu;

use crate::opt_from_gibuu::Opt;

use anyhow::{bail, Context, Result};
use clap::Parser;
use convenient::{
    event::Current, flux::read_edge_value_file, gibuu,
    particle::nuclear_code, prelude::*, progress_bar::ProgressBar,
};
use log::{debug, info};
use noisy_float::prelude::*;
use particle_id::ParticleID;

fn main() -> Result<()> {
    let opt = Opt::parse_from(opt_common::args()?);
    opt_common::init_logging("convenient-from-gibuu", &opt.loglevel);
    debug!("settings: {:#?}", opt);

    if !(opt.abundance.is_finite() && opt.abundance > 0.) {
        bail!("Abundance has to be positive, got {}", opt.abundance);
    }
    let target = nuclear_code(opt.protons, opt.nucleons)?;
    let normalizer = Normalizer::builder()
        .generator(Generator::GiBUU)
        .abundance(opt.abundance)
        .neutrino(ParticleID::new(opt.neutrino))
        .target(target)
        .charged_current(opt.current == Current::CC)
        .build();

    let mut header = Header::new(Generator::GiBUU);
    if let Some(flux) = &opt.flux {
        let last_row = if opt.last_row_is_edge {
            LastRow::Edge
        } else {
            LastRow::Bin
        };
        let flux = read_edge_value_file(flux, last_row)
            .with_context(|| format!("Failed to read flux from {flux:?}"))?;
        header = header.with_flux(flux);
    }

    let infile = &opt.infile;
    let reader = gibuu::FileReader::from_path(infile)
        .with_context(|| format!("Failed to open {infile:?}"))?;
    let mut events = Vec::new();
    let mut nruns = 0;
    for particles in reader.group_events() {
        let particles =
            particles.with_context(|| format!("Failed to read {infile:?}"))?;
        let event = normalizer
            .normalize(RawEvent::new(particles))
            .with_context(|| {
                format!("Failed to convert event {} in {infile:?}", events.len())
            })?;
        nruns = std::cmp::max(nruns, event.run);
        events.push(event);
    }
    info!("Read {} events from {infile:?}", events.len());

    if !opt.no_average_runs && nruns > 1 {
        info!("Averaging over {nruns} GiBUU runs");
        let factor = n64(1. / nruns as f64);
        for event in &mut events {
            event.rescale_weight(factor);
        }
    }

    let outfile = &opt.outfile;
    let mut writer = FileWriter::create(outfile, opt.compression, &header)
        .with_context(|| format!("Failed to create {outfile:?}"))?;
    let progress = ProgressBar::new(events.len() as u64, "Writing events:");
    for event in &events {
        writer
            .write(event)
            .with_context(|| format!("Failed to write to {outfile:?}"))?;
        progress.inc(1);
    }
    progress.finish();
    let nevents = writer
        .finish()
        .with_context(|| format!("Failed to write {outfile:?}"))?;
    info!("Wrote {nevents} events to {outfile:?}");
    Ok(())
}
