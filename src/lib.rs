//! `convenient` converts the output of neutrino event generators into
//! the common "Convenient" event format and computes cross sections from
//! it.
//!
//! # How to use
//!
//! Raw events from a generator are read with one of the input adapters
//! ([gibuu] or [nuisance]), turned into canonical [event::Event]s with a
//! [normalizer::Normalizer], and written with a
//! [convenient::FileWriter]. The binaries in `src/bin` do exactly this.
//!
//! ## Most relevant modules
//!
//! - [prelude] exports a list of the most relevant classes and objects
//! - [particle] for the classification into final-state species
//! - [normalizer] for the conversion from raw into canonical events
//! - [convenient] for reading and writing Convenient files
//! - [flux] for flux tables and their text formats
//! - [xsec] for cross sections
//!

/// Grouping of particle rows into events
pub mod accumulator;
/// Elemental composition of detector materials
pub mod composition;
/// The Convenient event format
pub mod convenient;
/// Output compression
pub mod compression;
/// Canonical event class
pub mod event;
/// Output files that only appear once complete
pub mod file;
/// Binned fluxes
pub mod flux;
/// Four-vector class
pub mod four_vector;
/// Supported event generators
pub mod generator;
/// GiBUU interface
pub mod gibuu;
/// One-dimensional histograms
pub mod histogram;
/// Conversion from raw into canonical events
pub mod normalizer;
/// NUISANCE flat tree interface
pub mod nuisance;
/// Ordering of particles by energy
pub mod ordering;
/// Particle codes and species
pub mod particle;
/// Most important exports
pub mod prelude;
/// Progress bar
pub mod progress_bar;
/// Generator-native events
pub mod raw;
/// Common traits
pub mod traits;
/// Cross sections
pub mod xsec;

mod parsing;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_REV: Option<&str> = option_env!("VERGEN_GIT_SHA");
pub const GIT_BRANCH: Option<&str> = option_env!("VERGEN_GIT_BRANCH");
