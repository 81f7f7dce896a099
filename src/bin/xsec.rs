mod opt_common;
mod opt_xsec;

use crate::opt_xsec::Opt;

use anyhow::{bail, Context, Result};
use clap::Parser;
use convenient::{
    file::write_text_file, flux::read_edge_value_file, prelude::*,
};
use log::{debug, info};
use particle_id::ParticleID;

fn main() -> Result<()> {
    let opt = Opt::parse_from(opt_common::args()?);
    opt_common::init_logging("convenient-xsec", &opt.loglevel);
    debug!("settings: {:#?}", opt);

    let observable = opt.kinematic()?;
    let hist = opt.histogram()?;
    let selection = NeutrinoSelection {
        pdg: opt.neutrino.map(ParticleID::new),
        current: opt.current,
    };

    let infile = &opt.infile;
    let reader = FileReader::from_path(infile)
        .with_context(|| format!("Failed to read {infile:?}"))?;
    info!("Events generated with {}", reader.header().generator);

    let mut reducer = match opt.treatment {
        FluxTreatment::Averaged => {
            CrossSectionReducer::averaged(selection, observable, hist)
        }
        FluxTreatment::Integrated => {
            let flux = if let Some(path) = &opt.flux {
                let last_row = if opt.last_row_is_edge {
                    LastRow::Edge
                } else {
                    LastRow::Bin
                };
                read_edge_value_file(path, last_row)
                    .with_context(|| format!("Failed to read flux from {path:?}"))?
            } else if let Some(flux) = &reader.header().flux {
                flux.clone()
            } else {
                bail!("No flux in {infile:?}, please specify one with --flux");
            };
            CrossSectionReducer::integrated(
                selection,
                observable,
                hist,
                &flux,
                opt.energy_edges.as_deref(),
            )?
        }
    };

    for event in reader {
        let event = event.with_context(|| format!("Failed to read {infile:?}"))?;
        reducer.add(&event);
    }
    let (xs, stats) = reducer.finish();
    debug!("{stats:?}");

    let outfile = &opt.outfile;
    write_text_file(outfile, &xs.to_edge_value_table())
        .with_context(|| format!("Failed to write {outfile:?}"))?;
    info!("Wrote {:?} cross section to {outfile:?}", opt.treatment);
    Ok(())
}
