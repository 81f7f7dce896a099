mod opt_common;

use std::path::PathBuf;

use crate::opt_common::{COMPRESSION_HELP, LOGLEVEL_HELP};

use anyhow::{bail, Context, Result};
use clap::Parser;
use convenient::prelude::*;
use log::{debug, info};
use noisy_float::prelude::*;

#[derive(Debug, Parser)]
#[clap(about, author, version)]
struct Opt {
    /// Convenient input file.
    #[clap(name = "INFILE", value_parser)]
    infile: PathBuf,

    /// Output file.
    #[clap(name = "OUTFILE", value_parser)]
    outfile: PathBuf,

    /// Factor multiplying each event weight.
    #[clap(name = "FACTOR")]
    factor: f64,

    #[clap(short, long, help = COMPRESSION_HELP)]
    compression: Option<Compression>,

    #[clap(short, long, default_value = "Info", help = LOGLEVEL_HELP)]
    loglevel: String,
}

fn main() -> Result<()> {
    let opt = Opt::parse_from(opt_common::args()?);
    opt_common::init_logging("convenient-reweight", &opt.loglevel);
    debug!("settings: {:#?}", opt);

    if !opt.factor.is_finite() {
        bail!("Reweighting factor has to be finite, got {}", opt.factor);
    }
    let factor = n64(opt.factor);

    let infile = &opt.infile;
    let outfile = &opt.outfile;
    let reader = FileReader::from_path(infile)
        .with_context(|| format!("Failed to read {infile:?}"))?;
    let mut writer = FileWriter::create(outfile, opt.compression, reader.header())
        .with_context(|| format!("Failed to create {outfile:?}"))?;
    for event in reader {
        let mut event =
            event.with_context(|| format!("Failed to read {infile:?}"))?;
        event.rescale_weight(factor);
        writer
            .write(&event)
            .with_context(|| format!("Failed to write to {outfile:?}"))?;
    }
    let nevents = writer
        .finish()
        .with_context(|| format!("Failed to write {outfile:?}"))?;
    info!("Reweighted {nevents} events by a factor {factor}");
    Ok(())
}
