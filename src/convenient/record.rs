use noisy_float::prelude::*;
use particle_id::ParticleID;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::{Event, EventBuilder, Particle};
use crate::four_vector::{FourVector, KinematicsError};
use crate::ordering::is_energy_ordered;
use crate::particle::Species;

/// Error converting a [ConvenientRecord] into an [Event]
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RecordError {
    #[error("n_FS_{species} is {count}, but FS_{species} has {len} entries")]
    CountMismatch {
        species: Species,
        count: usize,
        len: usize,
    },
    #[error("FS_{0} is not ordered by decreasing energy")]
    Unordered(Species),
    #[error("Invalid four-momentum in FS_{species}")]
    Kinematics {
        species: Species,
        source: KinematicsError,
    },
    #[error("Invalid particle code {0} in FS_Others")]
    InvalidCode(f64),
    #[error("Invalid value {value} for {field}")]
    InvalidValue { field: &'static str, value: f64 },
}

/// One event in the Convenient format
///
/// The field names form the schema consumed by all downstream analyses
/// and must not change. Four-momenta are stored as `[E, px, py, pz]`,
/// entries of `FS_Others` as `[E, px, py, pz, pdg]`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ConvenientRecord {
    pub run: u32,
    pub event: u64,
    #[serde(rename = "PDGnu")]
    pub neutrino_pdg: i32,
    #[serde(rename = "Enu")]
    pub neutrino_energy: f64,
    #[serde(rename = "target_PDG")]
    pub target_pdg: i32,
    #[serde(rename = "EventWeight")]
    pub weight: f64,
    #[serde(rename = "GenScaleFactor")]
    pub scale_factor: f64,
    #[serde(rename = "flagCC")]
    pub charged_current: bool,
    #[serde(rename = "flagNC")]
    pub neutral_current: bool,
    #[serde(rename = "Mode")]
    pub mode: i32,

    #[serde(rename = "FS_Protons")]
    pub protons: Vec<[f64; 4]>,
    #[serde(rename = "FS_Antiprotons")]
    pub antiprotons: Vec<[f64; 4]>,
    #[serde(rename = "FS_Neutrons")]
    pub neutrons: Vec<[f64; 4]>,
    #[serde(rename = "FS_Antineutrons")]
    pub antineutrons: Vec<[f64; 4]>,
    #[serde(rename = "FS_Gammas")]
    pub gammas: Vec<[f64; 4]>,
    #[serde(rename = "FS_Pi0s")]
    pub pi0s: Vec<[f64; 4]>,
    #[serde(rename = "FS_PiPs")]
    pub pips: Vec<[f64; 4]>,
    #[serde(rename = "FS_PiMs")]
    pub pims: Vec<[f64; 4]>,
    #[serde(rename = "FS_Muons")]
    pub muons: Vec<[f64; 4]>,
    #[serde(rename = "FS_Electrons")]
    pub electrons: Vec<[f64; 4]>,
    #[serde(rename = "FS_Taus")]
    pub taus: Vec<[f64; 4]>,
    #[serde(rename = "FS_Nus")]
    pub nus: Vec<[f64; 4]>,
    #[serde(rename = "FS_Others")]
    pub others: Vec<[f64; 5]>,

    #[serde(rename = "n_FS_Protons")]
    pub n_protons: usize,
    #[serde(rename = "n_FS_Antiprotons")]
    pub n_antiprotons: usize,
    #[serde(rename = "n_FS_Neutrons")]
    pub n_neutrons: usize,
    #[serde(rename = "n_FS_Antineutrons")]
    pub n_antineutrons: usize,
    #[serde(rename = "n_FS_Gammas")]
    pub n_gammas: usize,
    #[serde(rename = "n_FS_Pi0s")]
    pub n_pi0s: usize,
    #[serde(rename = "n_FS_PiPs")]
    pub n_pips: usize,
    #[serde(rename = "n_FS_PiMs")]
    pub n_pims: usize,
    #[serde(rename = "n_FS_Muons")]
    pub n_muons: usize,
    #[serde(rename = "n_FS_Electrons")]
    pub n_electrons: usize,
    #[serde(rename = "n_FS_Taus")]
    pub n_taus: usize,
    #[serde(rename = "n_FS_Nus")]
    pub n_nus: usize,
    #[serde(rename = "n_FS_Others")]
    pub n_others: usize,
}

impl ConvenientRecord {
    /// Four-momenta and count of a species
    ///
    /// The momenta of [Species::Others] carry a particle code and are
    /// not returned here.
    fn momenta(&self, species: Species) -> (&[[f64; 4]], usize) {
        use Species::*;
        match species {
            Protons => (self.protons.as_slice(), self.n_protons),
            Antiprotons => (self.antiprotons.as_slice(), self.n_antiprotons),
            Neutrons => (self.neutrons.as_slice(), self.n_neutrons),
            Antineutrons => (self.antineutrons.as_slice(), self.n_antineutrons),
            Gammas => (self.gammas.as_slice(), self.n_gammas),
            Pi0s => (self.pi0s.as_slice(), self.n_pi0s),
            PiPs => (self.pips.as_slice(), self.n_pips),
            PiMs => (self.pims.as_slice(), self.n_pims),
            Muons => (self.muons.as_slice(), self.n_muons),
            Electrons => (self.electrons.as_slice(), self.n_electrons),
            Taus => (self.taus.as_slice(), self.n_taus),
            Nus => (self.nus.as_slice(), self.n_nus),
            Others => (&[][..], self.n_others),
        }
    }
}

fn momenta(particles: &[Particle]) -> Vec<[f64; 4]> {
    particles.iter().map(|p| p.p.to_array()).collect()
}

impl From<&Event> for ConvenientRecord {
    fn from(ev: &Event) -> Self {
        use Species::*;
        let others = ev
            .outgoing(Others)
            .iter()
            .map(|p| {
                let [e, px, py, pz] = p.p.to_array();
                [e, px, py, pz, p.code.id() as f64]
            })
            .collect();
        Self {
            run: ev.run,
            event: ev.id,
            neutrino_pdg: ev.neutrino.pdg.id(),
            neutrino_energy: ev.neutrino.energy.raw(),
            target_pdg: ev.target.id(),
            weight: ev.weight.raw(),
            scale_factor: ev.scale_factor.raw(),
            charged_current: ev.charged_current,
            neutral_current: ev.neutral_current,
            mode: ev.mode,
            protons: momenta(ev.outgoing(Protons)),
            antiprotons: momenta(ev.outgoing(Antiprotons)),
            neutrons: momenta(ev.outgoing(Neutrons)),
            antineutrons: momenta(ev.outgoing(Antineutrons)),
            gammas: momenta(ev.outgoing(Gammas)),
            pi0s: momenta(ev.outgoing(Pi0s)),
            pips: momenta(ev.outgoing(PiPs)),
            pims: momenta(ev.outgoing(PiMs)),
            muons: momenta(ev.outgoing(Muons)),
            electrons: momenta(ev.outgoing(Electrons)),
            taus: momenta(ev.outgoing(Taus)),
            nus: momenta(ev.outgoing(Nus)),
            others,
            n_protons: ev.count(Protons),
            n_antiprotons: ev.count(Antiprotons),
            n_neutrons: ev.count(Neutrons),
            n_antineutrons: ev.count(Antineutrons),
            n_gammas: ev.count(Gammas),
            n_pi0s: ev.count(Pi0s),
            n_pips: ev.count(PiPs),
            n_pims: ev.count(PiMs),
            n_muons: ev.count(Muons),
            n_electrons: ev.count(Electrons),
            n_taus: ev.count(Taus),
            n_nus: ev.count(Nus),
            n_others: ev.count(Others),
        }
    }
}

impl From<Event> for ConvenientRecord {
    fn from(ev: Event) -> Self {
        Self::from(&ev)
    }
}

fn finite(field: &'static str, value: f64) -> Result<N64, RecordError> {
    if value.is_finite() {
        Ok(n64(value))
    } else {
        Err(RecordError::InvalidValue { field, value })
    }
}

fn check_bucket(
    species: Species,
    particles: &[Particle],
    count: usize,
) -> Result<(), RecordError> {
    if particles.len() != count {
        return Err(RecordError::CountMismatch {
            species,
            count,
            len: particles.len(),
        });
    }
    if !is_energy_ordered(particles) {
        return Err(RecordError::Unordered(species));
    }
    Ok(())
}

impl TryFrom<ConvenientRecord> for Event {
    type Error = RecordError;

    /// Convert back into an [Event]
    ///
    /// Checks that particle counts agree with the four-momentum lists
    /// and that each list is ordered by decreasing energy.
    fn try_from(rec: ConvenientRecord) -> Result<Self, Self::Error> {
        use strum::IntoEnumIterator;

        let mut buckets = Vec::new();
        for species in Species::iter() {
            let (raw, count) = rec.momenta(species);
            let particles = if species == Species::Others {
                others(&rec.others)?
            } else {
                let code = representative(species);
                raw.iter()
                    .map(|p| {
                        FourVector::try_from(*p)
                            .map(|p| Particle::new(code, p))
                            .map_err(|source| RecordError::Kinematics {
                                species,
                                source,
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()?
            };
            check_bucket(species, &particles, count)?;
            buckets.push(particles);
        }

        let mut event = EventBuilder::new(rec.run, rec.event);
        event
            .neutrino(
                ParticleID::new(rec.neutrino_pdg),
                finite("Enu", rec.neutrino_energy)?,
            )
            .target(ParticleID::new(rec.target_pdg))
            .weight(finite("EventWeight", rec.weight)?)
            .scale_factor(finite("GenScaleFactor", rec.scale_factor)?)
            .current(rec.charged_current, rec.neutral_current)
            .mode(rec.mode);
        for particle in buckets.into_iter().flatten() {
            event.add_outgoing(particle.code, particle.p);
        }
        Ok(event.build())
    }
}

fn others(raw: &[[f64; 5]]) -> Result<Vec<Particle>, RecordError> {
    raw.iter()
        .map(|&[e, px, py, pz, code]| {
            if code.fract() != 0. || code.abs() > i32::MAX as f64 {
                return Err(RecordError::InvalidCode(code));
            }
            let p = FourVector::try_new(e, px, py, pz).map_err(|source| {
                RecordError::Kinematics {
                    species: Species::Others,
                    source,
                }
            })?;
            Ok(Particle::new(ParticleID::new(code as i32), p))
        })
        .collect()
}

// Only the species is stored for particles outside `FS_Others`. Charged
// leptons and neutrinos are restored as particles, since the sign is
// not recorded.
fn representative(species: Species) -> ParticleID {
    use crate::particle::*;
    use Species::*;
    match species {
        Protons => PROTON,
        Antiprotons => ParticleID::new(-PROTON.id()),
        Neutrons => NEUTRON,
        Antineutrons => ParticleID::new(-NEUTRON.id()),
        Gammas => PHOTON,
        Pi0s => PI0,
        PiPs => PI_PLUS,
        PiMs => ParticleID::new(-PI_PLUS.id()),
        Muons => MUON,
        Electrons => ELECTRON,
        Taus => TAU,
        Nus => NU_MU,
        Others => UNKNOWN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(e: f64, pz: f64) -> FourVector {
        FourVector::try_new(e, 0., 0., pz).unwrap()
    }

    fn event() -> Event {
        let mut b = EventBuilder::new(3, 42);
        b.neutrino(ParticleID::new(14), n64(2.))
            .target(ParticleID::new(1_000_180_400))
            .weight(n64(0.5))
            .scale_factor(n64(1e-38))
            .current(true, false)
            .mode(1)
            .add_outgoing(ParticleID::new(13), p(1.5, 1.4))
            .add_outgoing(ParticleID::new(2212), p(1.0, 0.2))
            .add_outgoing(ParticleID::new(2212), p(1.2, 0.3))
            .add_outgoing(ParticleID::new(3122), p(1.3, 0.1));
        b.build()
    }

    #[test]
    fn record_fields() {
        let rec = ConvenientRecord::from(&event());
        assert_eq!(rec.n_protons, 2);
        assert_eq!(rec.protons, [[1.2, 0., 0., 0.3], [1.0, 0., 0., 0.2]]);
        assert_eq!(rec.others, [[1.3, 0., 0., 0.1, 3122.]]);
        assert_eq!(rec.n_neutrons, 0);
        assert_eq!(rec.weight, 0.5);
        assert_eq!(rec.scale_factor, 1e-38);

        let yaml = serde_yaml::to_string(&rec).unwrap();
        for field in [
            "PDGnu:", "Enu:", "target_PDG:", "EventWeight:", "GenScaleFactor:",
            "flagCC:", "flagNC:", "Mode:", "FS_Others:", "n_FS_PiMs:",
        ] {
            assert!(yaml.contains(field), "{field}");
        }
    }

    #[test]
    fn back_to_event() {
        let ev = event();
        let back = Event::try_from(ConvenientRecord::from(&ev)).unwrap();
        assert_eq!(back, ev);
    }

    #[test]
    fn invalid_records() {
        let mut rec = ConvenientRecord::from(&event());
        rec.n_protons = 3;
        assert_eq!(
            Event::try_from(rec),
            Err(RecordError::CountMismatch {
                species: Species::Protons,
                count: 3,
                len: 2
            })
        );

        let mut rec = ConvenientRecord::from(&event());
        rec.protons.swap(0, 1);
        assert_eq!(Event::try_from(rec), Err(RecordError::Unordered(Species::Protons)));

        let mut rec = ConvenientRecord::from(&event());
        rec.others[0][4] = 0.5;
        assert_eq!(Event::try_from(rec), Err(RecordError::InvalidCode(0.5)));
    }
}
