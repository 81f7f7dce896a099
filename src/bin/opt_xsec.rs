use std::path::PathBuf;

use crate::opt_common::LOGLEVEL_HELP;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use convenient::event::Current;
use convenient::histogram::Histogram;
use convenient::particle::Species;
use convenient::xsec::{FluxTreatment, Kinematic};

#[derive(Debug, Copy, Clone, ValueEnum)]
pub(crate) enum ObservableKind {
    /// Absolute momentum of the leading particle
    Momentum,
    /// Kinetic energy of the leading particle
    KineticEnergy,
    /// Cosine of the polar angle of the leading particle
    CosTheta,
    /// Energy of the incoming neutrino
    NeutrinoEnergy,
}

fn parse_species(s: &str) -> Result<Species, strum::ParseError> {
    s.parse()
}

#[derive(Debug, Parser)]
#[clap(about, author, version)]
pub(crate) struct Opt {
    /// Convenient input file.
    #[clap(name = "INFILE", value_parser)]
    pub(crate) infile: PathBuf,

    /// Output file for the cross section.
    #[clap(name = "OUTFILE", value_parser)]
    pub(crate) outfile: PathBuf,

    /// Observable.
    #[clap(short, long, value_enum)]
    pub(crate) observable: ObservableKind,

    #[clap(
        short,
        long,
        value_parser = parse_species,
        help = "Final-state species for the observable.
Possible values are 'Protons', 'Antiprotons', 'Neutrons', 'Antineutrons',
'Gammas', 'Pi0s', 'PiPs', 'PiMs', 'Muons', 'Electrons', 'Taus', 'Nus', 'Others'."
    )]
    pub(crate) species: Option<Species>,

    /// Only consider events with this incoming neutrino PDG code.
    #[clap(long, allow_hyphen_values = true)]
    pub(crate) neutrino: Option<i32>,

    /// Only consider events with this interaction current.
    #[clap(long, value_enum)]
    pub(crate) current: Option<Current>,

    /// Flux normalisation.
    #[clap(short, long, value_enum, default_value_t)]
    pub(crate) treatment: FluxTreatment,

    /// Flux file in edge-value format. Defaults to the flux in the input file.
    #[clap(long, value_parser)]
    pub(crate) flux: Option<PathBuf>,

    /// The last line of the flux file only gives the upper edge of the last bin.
    #[clap(long)]
    pub(crate) last_row_is_edge: bool,

    /// Comma-separated neutrino energy bin edges to rebin the flux to.
    #[clap(long, value_delimiter = ',')]
    pub(crate) energy_edges: Option<Vec<f64>>,

    /// Comma-separated histogram bin edges.
    #[clap(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub(crate) edges: Option<Vec<f64>>,

    /// Number of histogram bins of equal width.
    #[clap(long, conflicts_with = "edges")]
    pub(crate) bins: Option<usize>,

    /// Lower edge of the histogram.
    #[clap(long, allow_hyphen_values = true, requires = "bins")]
    pub(crate) min: Option<f64>,

    /// Upper edge of the histogram.
    #[clap(long, allow_hyphen_values = true, requires = "bins")]
    pub(crate) max: Option<f64>,

    #[clap(short, long, default_value = "Info", help = LOGLEVEL_HELP)]
    pub(crate) loglevel: String,
}

impl Opt {
    pub(crate) fn kinematic(&self) -> Result<Kinematic> {
        use ObservableKind::*;
        let species = || match self.species {
            Some(species) => Ok(species),
            None => bail!("Observable {:?} requires a species", self.observable),
        };
        let kinematic = match self.observable {
            Momentum => Kinematic::Momentum(species()?),
            KineticEnergy => Kinematic::KineticEnergy(species()?),
            CosTheta => Kinematic::CosTheta(species()?),
            NeutrinoEnergy => Kinematic::NeutrinoEnergy,
        };
        Ok(kinematic)
    }

    pub(crate) fn histogram(&self) -> Result<Histogram> {
        if let Some(edges) = &self.edges {
            return Ok(Histogram::new(edges.clone())?);
        }
        match (self.bins, self.min, self.max) {
            (Some(bins), Some(min), Some(max)) => {
                Ok(Histogram::uniform(bins, min, max)?)
            }
            _ => bail!("Either --edges or all of --bins, --min, --max are required"),
        }
    }
}
