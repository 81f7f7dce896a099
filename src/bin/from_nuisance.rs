mod opt_common;

use std::path::PathBuf;

use crate::opt_common::{COMPRESSION_HELP, LOGLEVEL_HELP};

use anyhow::{bail, Context, Result};
use clap::Parser;
use convenient::{flux::read_edge_value_file, nuisance, prelude::*};
use log::{debug, info};

#[derive(Debug, Parser)]
#[clap(about, author, version)]
struct Opt {
    /// NUISANCE flat tree records.
    #[clap(name = "INFILE", value_parser)]
    infile: PathBuf,

    /// Output file.
    #[clap(name = "OUTFILE", value_parser)]
    outfile: PathBuf,

    /// Generator that produced the events.
    #[clap(short, long, value_enum)]
    generator: Generator,

    /// Weight of the target nucleus in the detector material.
    #[clap(long, default_value_t = 1.)]
    abundance: f64,

    /// Flux file in edge-value format to store in the output.
    #[clap(long, value_parser)]
    flux: Option<PathBuf>,

    /// The last line of the flux file only gives the upper edge of the last bin.
    #[clap(long)]
    last_row_is_edge: bool,

    #[clap(short, long, help = COMPRESSION_HELP)]
    compression: Option<Compression>,

    #[clap(short, long, default_value = "Info", help = LOGLEVEL_HELP)]
    loglevel: String,
}

fn main() -> Result<()> {
    let opt = Opt::parse_from(opt_common::args()?);
    opt_common::init_logging("convenient-from-nuisance", &opt.loglevel);
    debug!("settings: {:#?}", opt);

    if !(opt.abundance.is_finite() && opt.abundance > 0.) {
        bail!("Abundance has to be positive, got {}", opt.abundance);
    }
    let normalizer = Normalizer::builder()
        .generator(opt.generator)
        .abundance(opt.abundance)
        .build();

    let mut header = Header::new(opt.generator);
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
    let outfile = &opt.outfile;
    let reader = nuisance::FileReader::from_path(infile)
        .with_context(|| format!("Failed to open {infile:?}"))?;
    let mut writer = FileWriter::create(outfile, opt.compression, &header)
        .with_context(|| format!("Failed to create {outfile:?}"))?;
    for (nr, raw) in reader.enumerate() {
        let raw = raw.with_context(|| format!("Failed to read {infile:?}"))?;
        let event = normalizer.normalize(raw).with_context(|| {
            format!("Failed to convert record {nr} in {infile:?}")
        })?;
        writer
            .write(&event)
            .with_context(|| format!("Failed to write to {outfile:?}"))?;
    }
    let nevents = writer
        .finish()
        .with_context(|| format!("Failed to write {outfile:?}"))?;
    info!("Wrote {nevents} events to {outfile:?}");
    Ok(())
}
