mod opt_common;

use std::path::PathBuf;

use crate::opt_common::LOGLEVEL_HELP;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use convenient::{
    file::write_text_file,
    flux::{
        read_edge_value_file, write_edge_value_table, write_nuwro_table,
        GIBUU_FLUX_DIVISOR, NEUT_THRESHOLD,
    },
    prelude::*,
};
use log::{debug, info};

/// Beam energy formats expected by the generators
#[derive(Debug, Copy, Clone, ValueEnum)]
#[clap(rename_all = "lower")]
enum Format {
    GiBUU,
    NEUT,
    NuWro,
}

#[derive(Debug, Parser)]
#[clap(about, author, version)]
struct Opt {
    /// Output format.
    #[clap(name = "FORMAT", value_enum)]
    format: Format,

    /// Flux file in edge-value format.
    #[clap(name = "INFILE", value_parser)]
    infile: PathBuf,

    /// Output file.
    #[clap(name = "OUTFILE", value_parser)]
    outfile: PathBuf,

    /// The last line of the input only gives the upper edge of the last bin.
    #[clap(long)]
    last_row_is_edge: bool,

    #[clap(short, long, default_value = "Info", help = LOGLEVEL_HELP)]
    loglevel: String,
}

fn main() -> Result<()> {
    let opt = Opt::parse_from(opt_common::args()?);
    opt_common::init_logging("convenient-beam-energy", &opt.loglevel);
    debug!("settings: {:#?}", opt);

    let infile = &opt.infile;
    let last_row = if opt.last_row_is_edge {
        LastRow::Edge
    } else {
        LastRow::Bin
    };
    let flux = read_edge_value_file(infile, last_row)
        .with_context(|| format!("Failed to read flux from {infile:?}"))?;
    info!("Read flux with {} bins", flux.len());

    let text = match opt.format {
        Format::GiBUU => write_edge_value_table(&flux.divide(GIBUU_FLUX_DIVISOR)),
        Format::NEUT => write_edge_value_table(&flux.zero_below(NEUT_THRESHOLD)),
        Format::NuWro => write_nuwro_table(&flux)
            .with_context(|| "Failed to convert flux to NuWro format")?,
    };

    let outfile = &opt.outfile;
    write_text_file(outfile, &text)
        .with_context(|| format!("Failed to write {outfile:?}"))?;
    info!("Wrote {:?} beam energy file {outfile:?}", opt.format);
    Ok(())
}
