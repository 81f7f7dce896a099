pub use crate::{
    accumulator::GroupEvents,
    compression::Compression,
    convenient::{FileReader, FileWriter, Header},
    event::{Event, EventBuilder, Particle},
    flux::{FluxTable, LastRow},
    four_vector::FourVector,
    generator::Generator,
    histogram::Histogram,
    normalizer::Normalizer,
    particle::{ParticleClassifier, Species},
    raw::{RawEvent, RawParticle},
    traits::{Progress, TryConvert},
    xsec::{CrossSectionReducer, FluxTreatment, Kinematic, NeutrinoSelection},
};
