use clap::ValueEnum;
use particle_id::ParticleID;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::particle::{ParticleTable, NUCLEAR_FRAGMENT_THRESHOLD};

/// Cross section unit of GiBUU perweights in cm^2
pub const GIBUU_SCALE_FACTOR: f64 = 1e-38;

/// Supported event generators
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    EnumIter,
    EnumString,
    ValueEnum,
    Deserialize,
    Serialize,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
)]
#[strum(ascii_case_insensitive)]
#[clap(rename_all = "lower")]
pub enum Generator {
    GiBUU,
    NEUT,
    GENIE,
    NuWro,
    NUISANCE,
}

/// Error for generator names that do not correspond to any [Generator]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown generator: {0}")]
pub struct UnknownGenerator(pub String);

impl Generator {
    /// Parse a generator name, ignoring case
    pub fn from_name(name: &str) -> Result<Self, UnknownGenerator> {
        name.parse().map_err(|_| UnknownGenerator(name.to_owned()))
    }

    /// Numbering scheme for particles in the native output
    pub fn particle_table(self) -> ParticleTable {
        match self {
            Generator::GiBUU => ParticleTable::GiBUU,
            _ => ParticleTable::Pdg,
        }
    }

    /// Rule for discarding entries that are not final-state particles
    pub fn skip_policy(self) -> SkipPolicy {
        match self {
            Generator::GiBUU => SkipPolicy::ZeroWeight,
            _ => SkipPolicy::NuclearFragment {
                threshold: NUCLEAR_FRAGMENT_THRESHOLD,
            },
        }
    }

    /// How to obtain the generator scale factor
    pub fn scale_factor_rule(self) -> ScaleFactorRule {
        match self {
            Generator::GiBUU => ScaleFactorRule::Constant(GIBUU_SCALE_FACTOR),
            _ => ScaleFactorRule::PassThrough,
        }
    }
}

/// Which raw entries are bookkeeping rather than final-state particles
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SkipPolicy {
    /// Skip entries with vanishing weight
    ///
    /// GiBUU lists the struck nucleon with zero perweight.
    ZeroWeight,
    /// Skip entries with canonical codes above the threshold
    ///
    /// These are nuclear remnants and generator-internal objects.
    NuclearFragment { threshold: i32 },
}

impl SkipPolicy {
    /// Whether to skip an entry with the given weight and canonical code
    pub fn skip(&self, weight: f64, code: ParticleID) -> bool {
        match self {
            SkipPolicy::ZeroWeight => weight == 0.,
            SkipPolicy::NuclearFragment { threshold } => code.id() > *threshold,
        }
    }
}

/// Rule for the generator scale factor
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ScaleFactorRule {
    /// The same factor for all events
    Constant(f64),
    /// Taken from the upstream normalisation field of each event
    PassThrough,
}

#[cfg(test)]
mod tests {
    use super::*;

    use strum::IntoEnumIterator;

    #[test]
    fn parse_names() {
        assert_eq!(Generator::from_name("GiBUU"), Ok(Generator::GiBUU));
        assert_eq!(Generator::from_name("nuwro"), Ok(Generator::NuWro));
        assert_eq!(Generator::from_name("NEUT"), Ok(Generator::NEUT));
        assert_eq!(
            Generator::from_name("Pythia"),
            Err(UnknownGenerator("Pythia".to_owned()))
        );
        for generator in Generator::iter() {
            let name = generator.to_string();
            assert_eq!(Generator::from_name(&name), Ok(generator));
        }
    }

    #[test]
    fn policies() {
        let gibuu = Generator::GiBUU.skip_policy();
        assert!(gibuu.skip(0., ParticleID::new(2212)));
        assert!(!gibuu.skip(1e-3, ParticleID::new(1_000_060_120)));

        let neut = Generator::NEUT.skip_policy();
        assert!(!neut.skip(0., ParticleID::new(2212)));
        assert!(neut.skip(1., ParticleID::new(1_000_060_120)));
        assert!(!neut.skip(1., ParticleID::new(9_999_999)));

        assert_eq!(
            Generator::GiBUU.scale_factor_rule(),
            ScaleFactorRule::Constant(1e-38)
        );
        assert_eq!(
            Generator::GENIE.scale_factor_rule(),
            ScaleFactorRule::PassThrough
        );
    }
}
