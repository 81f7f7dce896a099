use crate::four_vector::FourVector;

/// A particle entry as found in generator output
#[derive(Clone, Debug, PartialEq)]
pub struct RawParticle {
    pub run: u32,
    pub event: u64,
    /// Generator-specific particle identifier
    pub pid: i32,
    pub charge: i32,
    pub weight: f64,
    /// Production vertex in fm
    pub position: [f64; 3],
    pub momentum: FourVector,
    pub history: i64,
    pub production_id: i32,
    /// Energy of the incoming neutrino in GeV
    pub neutrino_energy: f64,
}

/// Event-level information that is not repeated for each particle
///
/// Generators that only write particle rows leave everything unset.
/// Where set, these take precedence over the values repeated in the
/// particle rows.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventHeader {
    pub run: Option<u32>,
    pub event: Option<u64>,
    pub weight: Option<f64>,
    /// Energy of the incoming neutrino in GeV
    pub neutrino_energy: Option<f64>,
    pub neutrino_pdg: Option<i32>,
    pub target_pdg: Option<i32>,
    pub scale_factor: Option<f64>,
    pub charged_current: Option<bool>,
    pub neutral_current: Option<bool>,
    pub mode: Option<i32>,
}

/// All particle entries belonging to a single event
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawEvent {
    pub header: EventHeader,
    pub particles: Vec<RawParticle>,
}

impl RawEvent {
    pub fn new(particles: Vec<RawParticle>) -> Self {
        Self {
            header: EventHeader::default(),
            particles,
        }
    }

    pub fn with_header(header: EventHeader, particles: Vec<RawParticle>) -> Self {
        Self { header, particles }
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }
}

impl From<Vec<RawParticle>> for RawEvent {
    fn from(particles: Vec<RawParticle>) -> Self {
        Self::new(particles)
    }
}
