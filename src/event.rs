use clap::ValueEnum;
use noisy_float::prelude::*;
use particle_id::ParticleID;
use strum::{Display, EnumString};

use crate::four_vector::FourVector;
use crate::ordering::sort_by_energy;
use crate::particle::{Species, NSPECIES};

/// A final-state particle
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy)]
pub struct Particle {
    /// Canonical particle code
    pub code: ParticleID,
    pub p: FourVector,
}

impl Particle {
    pub fn new(code: ParticleID, p: FourVector) -> Self {
        Self { code, p }
    }
}

impl AsRef<FourVector> for Particle {
    fn as_ref(&self) -> &FourVector {
        &self.p
    }
}

/// Interaction current
#[derive(
    Copy, Clone, Debug, Display, EnumString, ValueEnum, Eq, PartialEq, Hash,
)]
#[strum(ascii_case_insensitive)]
#[clap(rename_all = "UPPER")]
pub enum Current {
    CC,
    NC,
}

/// The incoming neutrino
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy)]
pub struct Neutrino {
    pub pdg: ParticleID,
    /// Energy in GeV
    pub energy: N64,
}

impl Default for Neutrino {
    fn default() -> Self {
        Self {
            pdg: ParticleID::new(0),
            energy: n64(0.),
        }
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone)]
pub struct EventBuilder {
    run: u32,
    id: u64,
    neutrino: Neutrino,
    target: ParticleID,
    weight: N64,
    scale_factor: N64,
    charged_current: bool,
    neutral_current: bool,
    mode: i32,

    outgoing: Vec<Particle>,
}

impl EventBuilder {
    pub fn new(run: u32, id: u64) -> Self {
        Self {
            run,
            id,
            neutrino: Default::default(),
            target: ParticleID::new(0),
            weight: n64(0.),
            scale_factor: n64(1.),
            charged_current: false,
            neutral_current: false,
            mode: 0,
            outgoing: Vec::new(),
        }
    }

    pub fn with_capacity(run: u32, id: u64, cap: usize) -> Self {
        let mut res = Self::new(run, id);
        res.outgoing.reserve(cap);
        res
    }

    pub fn neutrino(&mut self, pdg: ParticleID, energy: N64) -> &mut Self {
        self.neutrino = Neutrino { pdg, energy };
        self
    }

    pub fn target(&mut self, target: ParticleID) -> &mut Self {
        self.target = target;
        self
    }

    pub fn weight(&mut self, weight: N64) -> &mut Self {
        self.weight = weight;
        self
    }

    pub fn scale_factor(&mut self, scale_factor: N64) -> &mut Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Set the charged-current and neutral-current flags
    ///
    /// The flags are stored as given. In particular, they are not
    /// required to be mutually exclusive.
    pub fn current(&mut self, charged: bool, neutral: bool) -> &mut Self {
        self.charged_current = charged;
        self.neutral_current = neutral;
        self
    }

    pub fn mode(&mut self, mode: i32) -> &mut Self {
        self.mode = mode;
        self
    }

    pub fn add_outgoing(&mut self, code: ParticleID, p: FourVector) -> &mut Self {
        self.outgoing.push(Particle::new(code, p));
        self
    }

    pub fn build(self) -> Event {
        let final_state = bucket_outgoing(self.outgoing);
        Event {
            run: self.run,
            id: self.id,
            neutrino: self.neutrino,
            target: self.target,
            weight: self.weight,
            scale_factor: self.scale_factor,
            charged_current: self.charged_current,
            neutral_current: self.neutral_current,
            mode: self.mode,
            final_state,
        }
    }
}

impl From<EventBuilder> for Event {
    fn from(b: EventBuilder) -> Self {
        b.build()
    }
}

fn bucket_outgoing(out: Vec<Particle>) -> [Vec<Particle>; NSPECIES] {
    let mut buckets: [Vec<Particle>; NSPECIES] = Default::default();
    for particle in out {
        buckets[Species::of(particle.code).index()].push(particle);
    }
    for bucket in &mut buckets {
        sort_by_energy(bucket);
    }
    buckets
}

/// A neutrino scattering event in canonical form
///
/// All final-state particles are sorted into [Species] buckets, and
/// each bucket is ordered by decreasing energy.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone)]
pub struct Event {
    pub run: u32,
    pub id: u64,
    pub neutrino: Neutrino,
    /// Nuclear code of the target
    pub target: ParticleID,
    pub weight: N64,
    /// Factor converting weights into physical cross section units
    pub scale_factor: N64,
    pub charged_current: bool,
    pub neutral_current: bool,
    /// Generator-specific interaction mode
    pub mode: i32,

    final_state: [Vec<Particle>; NSPECIES],
}

impl Default for Event {
    fn default() -> Self {
        EventBuilder::new(0, 0).build()
    }
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    /// Final-state particles of the given species, by decreasing energy
    pub fn outgoing(&self, species: Species) -> &[Particle] {
        &self.final_state[species.index()]
    }

    /// Number of final-state particles of the given species
    pub fn count(&self, species: Species) -> usize {
        self.outgoing(species).len()
    }

    /// Final-state particle of the given species with the highest energy
    pub fn leading(&self, species: Species) -> Option<&Particle> {
        self.outgoing(species).first()
    }

    /// Iterate over all species with their final-state particles
    pub fn final_state(&self) -> impl Iterator<Item = (Species, &[Particle])> {
        use strum::IntoEnumIterator;
        Species::iter().map(|s| (s, self.outgoing(s)))
    }

    /// Total number of final-state particles
    pub fn multiplicity(&self) -> usize {
        self.final_state.iter().map(|b| b.len()).sum()
    }

    /// Weight in physical units, the product of weight and scale factor
    pub fn physical_weight(&self) -> N64 {
        self.weight * self.scale_factor
    }

    pub fn rescale_weight(&mut self, factor: N64) {
        self.weight *= factor;
    }

    pub fn into_final_state(self) -> [Vec<Particle>; NSPECIES] {
        self.final_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(e: f64) -> FourVector {
        FourVector::try_new(e, 0., 0., 0.).unwrap()
    }

    #[test]
    fn buckets_sorted() {
        let mut builder = EventBuilder::new(1, 2);
        builder
            .add_outgoing(ParticleID::new(2212), p(1.))
            .add_outgoing(ParticleID::new(22), p(0.1))
            .add_outgoing(ParticleID::new(2212), p(2.))
            .add_outgoing(ParticleID::new(321), p(0.6))
            .add_outgoing(ParticleID::new(3122), p(1.3));
        let event = builder.build();
        assert_eq!(event.count(Species::Protons), 2);
        assert_eq!(event.leading(Species::Protons).unwrap().p, p(2.));
        let others = event.outgoing(Species::Others);
        assert_eq!(others[0].code, ParticleID::new(3122));
        assert_eq!(others[1].code, ParticleID::new(321));
        assert_eq!(event.count(Species::Neutrons), 0);
        assert_eq!(event.multiplicity(), 5);
        assert_eq!(event.final_state().count(), NSPECIES);
    }

    #[test]
    fn weights() {
        let mut builder = EventBuilder::new(0, 0);
        builder.weight(n64(2.)).scale_factor(n64(1e-38));
        let mut event = builder.build();
        assert_eq!(event.physical_weight(), n64(2e-38));
        event.rescale_weight(n64(0.5));
        assert_eq!(event.weight, n64(1.));
    }
}
