use std::path::PathBuf;

use crate::opt_common::{COMPRESSION_HELP, LOGLEVEL_HELP};

use clap::Parser;
use convenient::compression::Compression;
use convenient::event::Current;

#[derive(Debug, Parser)]
#[clap(about, author, version)]
pub(crate) struct Opt {
    /// GiBUU FinalEvents.dat file.
    #[clap(name = "INFILE", value_parser)]
    pub(crate) infile: PathBuf,

    /// Output file.
    #[clap(name = "OUTFILE", value_parser)]
    pub(crate) outfile: PathBuf,

    /// PDG code of the incoming neutrino.
    #[clap(long, allow_hyphen_values = true)]
    pub(crate) neutrino: i32,

    /// Interaction current.
    #[clap(long, value_enum)]
    pub(crate) current: Current,

    /// Atomic number of the target nucleus.
    #[clap(short = 'Z', long)]
    pub(crate) protons: u32,

    /// Mass number of the target nucleus.
    #[clap(short = 'A', long)]
    pub(crate) nucleons: u32,

    /// Weight of the target nucleus in the detector material.
    #[clap(long, default_value_t = 1.)]
    pub(crate) abundance: f64,

    /// Do not divide weights by the number of GiBUU runs.
    #[clap(long)]
    pub(crate) no_average_runs: bool,

    /// Flux file in edge-value format to store in the output.
    #[clap(long, value_parser)]
    pub(crate) flux: Option<PathBuf>,

    /// The last line of the flux file only gives the upper edge of the last bin.
    #[clap(long)]
    pub(crate) last_row_is_edge: bool,

    #[clap(short, long, help = COMPRESSION_HELP)]
    pub(crate) compression: Option<Compression>,

    #[clap(short, long, default_value = "Info", help = LOGLEVEL_HELP)]
    pub(crate) loglevel: String,
}
