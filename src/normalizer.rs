use log::trace;
use noisy_float::prelude::*;
use particle_id::ParticleID;
use thiserror::Error;
use typed_builder::TypedBuilder;

use crate::event::{Event, EventBuilder};
use crate::generator::{Generator, ScaleFactorRule};
use crate::particle::ParticleClassifier;
use crate::raw::RawEvent;
use crate::traits::TryConvert;

/// Mass threshold in GeV below which nucleons are considered bound
pub const FREE_NUCLEON_MASS: f64 = 0.938;

/// Error normalising a generator event
#[derive(Debug, Clone, Error, PartialEq)]
pub enum NormalizeError {
    #[error("Event without particles or event-level information")]
    EmptyEvent,
    #[error("Missing {0}: neither in the event nor configured")]
    MissingField(&'static str),
    #[error("Invalid value {value} for {field}")]
    InvalidValue { field: &'static str, value: f64 },
}

/// Convert generator events into canonical [Event]s
///
/// Settings that are not part of the generator output, such as the
/// abundance weight of the target isotope, are supplied here. Event-level
/// information that is present in the generator output takes precedence
/// over the configured defaults.
#[derive(Debug, Clone, TypedBuilder)]
pub struct Normalizer {
    generator: Generator,
    /// Weight of the target isotope in the detector material
    #[builder(default = 1.)]
    abundance: f64,
    /// Incoming neutrino species, if not given by the events
    #[builder(default, setter(strip_option))]
    neutrino: Option<ParticleID>,
    /// Target nucleus, if not given by the events
    #[builder(default, setter(strip_option))]
    target: Option<ParticleID>,
    /// Whether events are charged-current, if not given by the events
    #[builder(default, setter(strip_option))]
    charged_current: Option<bool>,
}

impl Normalizer {
    pub fn generator(&self) -> Generator {
        self.generator
    }

    /// Normalise a single event
    pub fn normalize(&self, raw: RawEvent) -> Result<Event, NormalizeError> {
        use NormalizeError::*;

        let RawEvent { header, particles } = raw;
        let first = particles.first();
        let event_info = (
            header.run.or(first.map(|p| p.run)),
            header.event.or(first.map(|p| p.event)),
            header.weight.or(first.map(|p| p.weight)),
            header.neutrino_energy.or(first.map(|p| p.neutrino_energy)),
            header.mode.or(first.map(|p| p.production_id)),
        );
        let (Some(run), Some(id), Some(weight), Some(enu), Some(mode)) = event_info else {
            return Err(EmptyEvent);
        };

        let neutrino = header
            .neutrino_pdg
            .map(ParticleID::new)
            .or(self.neutrino)
            .ok_or(MissingField("PDGnu"))?;
        let target = header
            .target_pdg
            .map(ParticleID::new)
            .or(self.target)
            .ok_or(MissingField("target_PDG"))?;
        let charged_current = header
            .charged_current
            .or(self.charged_current)
            .ok_or(MissingField("flagCC"))?;
        let neutral_current = header.neutral_current.unwrap_or(!charged_current);
        let scale_factor = match self.generator.scale_factor_rule() {
            ScaleFactorRule::Constant(c) => c,
            ScaleFactorRule::PassThrough => {
                header.scale_factor.ok_or(MissingField("fScaleFactor"))?
            }
        };

        let mut event = EventBuilder::with_capacity(run, id, particles.len());
        event
            .neutrino(neutrino, finite("Enu", enu)?)
            .target(target)
            .weight(finite("EventWeight", weight * self.abundance)?)
            .scale_factor(finite("GenScaleFactor", scale_factor)?)
            .current(charged_current, neutral_current)
            .mode(mode);

        let classifier = ParticleClassifier::new(self.generator.particle_table());
        let skip = self.generator.skip_policy();
        for particle in particles {
            let (code, species) = classifier.species(particle.pid, particle.charge);
            if skip.skip(particle.weight, code) {
                trace!("Skipping entry with id {} and weight {}", particle.pid, particle.weight);
                continue;
            }
            if species.is_nucleon() && is_bound(particle.momentum.m_sq()) {
                trace!("Skipping bound nucleon {:?}", particle.momentum);
                continue;
            }
            event.add_outgoing(code, particle.momentum);
        }
        Ok(event.build())
    }
}

fn is_bound(m_sq: N64) -> bool {
    m_sq < FREE_NUCLEON_MASS * FREE_NUCLEON_MASS
}

fn finite(field: &'static str, value: f64) -> Result<N64, NormalizeError> {
    if value.is_finite() {
        Ok(n64(value))
    } else {
        Err(NormalizeError::InvalidValue { field, value })
    }
}

impl TryConvert<RawEvent, Event> for Normalizer {
    type Error = NormalizeError;

    fn try_convert(&mut self, raw: RawEvent) -> Result<Event, Self::Error> {
        self.normalize(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::four_vector::FourVector;
    use crate::particle::{nuclear_code, Species};
    use crate::raw::{EventHeader, RawParticle};

    fn log_init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn gibuu_particle(pid: i32, charge: i32, weight: f64, p: [f64; 4]) -> RawParticle {
        RawParticle {
            run: 1,
            event: 17,
            pid,
            charge,
            weight,
            position: [0.; 3],
            momentum: p.try_into().unwrap(),
            history: 0,
            production_id: 34,
            neutrino_energy: 1.5,
        }
    }

    fn gibuu_normalizer(abundance: f64) -> Normalizer {
        Normalizer::builder()
            .generator(Generator::GiBUU)
            .abundance(abundance)
            .neutrino(ParticleID::new(14))
            .target(nuclear_code(6, 12).unwrap())
            .charged_current(true)
            .build()
    }

    #[test]
    fn empty() {
        log_init();
        let norm = gibuu_normalizer(1.);
        assert_eq!(norm.normalize(RawEvent::default()), Err(NormalizeError::EmptyEvent));

        let header = EventHeader {
            run: Some(2),
            event: Some(5),
            weight: Some(0.5),
            neutrino_energy: Some(0.8),
            mode: Some(1),
            ..Default::default()
        };
        let event = norm.normalize(RawEvent::with_header(header.clone(), vec![])).unwrap();
        assert_eq!(event.multiplicity(), 0);
        assert_eq!((event.run, event.id), (2, 5));
        assert_eq!(event.neutrino.energy, 0.8);
        assert_eq!(event.weight, 0.5);

        let header = EventHeader { weight: None, ..header };
        assert_eq!(
            norm.normalize(RawEvent::with_header(header, vec![])),
            Err(NormalizeError::EmptyEvent)
        );
    }

    #[test]
    fn species_bucketing() {
        log_init();
        let norm = gibuu_normalizer(1.);
        let particles = vec![
            // free proton
            gibuu_particle(1, 1, 0.5, [1.2, 0., 0., 0.5]),
            // bound proton
            gibuu_particle(1, 1, 0.5, [0.9, 0., 0., 0.1]),
            gibuu_particle(999, 0, 0.5, [0.3, 0., 0.3, 0.]),
            // Lambda
            gibuu_particle(32, 0, 0.5, [1.2, 0.1, 0., 0.]),
        ];
        let event = norm.normalize(particles.into()).unwrap();
        assert_eq!(event.count(Species::Protons), 1);
        assert_eq!(event.count(Species::Gammas), 1);
        assert_eq!(event.count(Species::Others), 1);
        assert_eq!(event.multiplicity(), 3);
        assert_eq!(event.leading(Species::Protons).unwrap().p.e(), 1.2);
        assert_eq!(event.outgoing(Species::Others)[0].code, ParticleID::new(3122));
        assert_eq!(event.final_state().count(), 13);
        assert_eq!(event.mode, 34);
        assert!(event.charged_current);
        assert!(!event.neutral_current);
        assert_eq!(event.target.id(), 1_000_060_120);
        assert_eq!(event.neutrino.energy, 1.5);
        assert_eq!((event.run, event.id), (1, 17));
    }

    #[test]
    fn bound_nucleon_threshold() {
        log_init();
        let norm = gibuu_normalizer(1.);
        let m = FREE_NUCLEON_MASS;
        for (pid, charge) in [(1, 1), (1, 0), (-1, -1), (-1, 0)] {
            let free = gibuu_particle(pid, charge, 1., [m, 0., 0., 0.]);
            let bound = gibuu_particle(pid, charge, 1., [0.9, 0., 0., 0.]);
            let event = norm.normalize(vec![free, bound].into()).unwrap();
            assert_eq!(event.multiplicity(), 1);
            assert_eq!(event.final_state().find(|(_, p)| !p.is_empty()).unwrap().1[0].p.e(), m);
        }
        // other species are never filtered
        let pion = gibuu_particle(101, 1, 1., [0.1, 0., 0., 0.]);
        let event = norm.normalize(vec![pion].into()).unwrap();
        assert_eq!(event.count(Species::PiPs), 1);
    }

    #[test]
    fn zero_weight_skipped_for_gibuu() {
        log_init();
        let norm = gibuu_normalizer(1.);
        let particles = vec![
            gibuu_particle(902, -1, 0.2, [2., 0., 0., 1.9]),
            gibuu_particle(1, 1, 0., [1.5, 0., 0., 0.]),
        ];
        let event = norm.normalize(particles.into()).unwrap();
        assert_eq!(event.count(Species::Muons), 1);
        assert_eq!(event.count(Species::Protons), 0);
    }

    #[test]
    fn weight_composition() {
        log_init();
        let (w, a) = (0.25, 0.6);
        let norm = gibuu_normalizer(a);
        let particles = vec![gibuu_particle(902, -1, w, [2., 0., 0., 1.9])];
        let event = norm.normalize(particles.into()).unwrap();
        assert_eq!(event.weight, w * a);
        assert_eq!(event.scale_factor, 1e-38);
    }

    #[test]
    fn pass_through() {
        log_init();
        let norm = Normalizer::builder().generator(Generator::NEUT).abundance(2.).build();
        let header = EventHeader {
            neutrino_pdg: Some(-14),
            target_pdg: Some(1_000_080_160),
            scale_factor: Some(3e-39),
            charged_current: Some(false),
            neutral_current: Some(true),
            mode: Some(31),
            ..Default::default()
        };
        let p = |pid, e| RawParticle {
            pid,
            momentum: FourVector::try_new(e, 0., 0., 0.).unwrap(),
            ..gibuu_particle(0, 0, 0.5, [0.; 4])
        };
        let particles = vec![
            p(1_000_010_010, 1.),
            p(1_000_060_120, 10.),
            p(2212, 1.1),
            p(-14, 0.5),
        ];
        let event = norm.normalize(RawEvent::with_header(header, particles)).unwrap();
        assert_eq!(event.neutrino.pdg.id(), -14);
        assert_eq!(event.scale_factor, 3e-39);
        assert_eq!(event.weight, 1.);
        assert_eq!(event.mode, 31);
        assert!(event.neutral_current);
        assert_eq!(event.count(Species::Protons), 2);
        assert_eq!(event.leading(Species::Protons).unwrap().p.e(), 1.1);
        assert_eq!(event.count(Species::Others), 0);
        assert_eq!(event.count(Species::Nus), 1);
    }

    #[test]
    fn missing_fields() {
        log_init();
        let particles = || vec![gibuu_particle(902, -1, 1., [2., 0., 0., 1.9])];
        let norm = Normalizer::builder().generator(Generator::GENIE).build();
        assert_eq!(
            norm.normalize(particles().into()),
            Err(NormalizeError::MissingField("PDGnu"))
        );
        let norm = Normalizer::builder()
            .generator(Generator::GENIE)
            .neutrino(ParticleID::new(12))
            .target(ParticleID::new(1_000_180_400))
            .charged_current(true)
            .build();
        assert_eq!(
            norm.normalize(particles().into()),
            Err(NormalizeError::MissingField("fScaleFactor"))
        );
    }
}
