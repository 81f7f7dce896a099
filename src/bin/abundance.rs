mod opt_common;

use std::fs::File;
use std::path::PathBuf;

use crate::opt_common::LOGLEVEL_HELP;

use anyhow::{Context, Result};
use clap::Parser;
use convenient::composition::Mixture;
use convenient::particle::nuclear_code;
use log::{debug, info};

#[derive(Debug, Parser)]
#[clap(about, author, version)]
struct Opt {
    /// YAML file describing the material mixture.
    #[clap(name = "INFILE", value_parser)]
    infile: PathBuf,

    #[clap(short, long, default_value = "Info", help = LOGLEVEL_HELP)]
    loglevel: String,
}

fn main() -> Result<()> {
    let opt = Opt::parse_from(opt_common::args()?);
    opt_common::init_logging("convenient-abundance", &opt.loglevel);
    debug!("settings: {:#?}", opt);

    let infile = &opt.infile;
    let file =
        File::open(infile).with_context(|| format!("Failed to open {infile:?}"))?;
    let mixture = Mixture::from_reader(file)
        .with_context(|| format!("Failed to read mixture from {infile:?}"))?;
    debug!("{} materials", mixture.materials.len());

    let fractions = mixture.mass_fractions()?;
    println!("# element\ttarget_PDG\tmass fraction");
    for (element, fraction) in &fractions {
        let code = nuclear_code(element.atomic_number(), element.mass_number())?;
        println!("{element}\t{}\t{fraction:.11}", code.id());
    }
    info!("Average Z/A: {:.6}", mixture.z_over_a()?);
    Ok(())
}
