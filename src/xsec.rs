use clap::ValueEnum;
use log::{debug, info, trace, warn};
use particle_id::ParticleID;
use strum::{Display, EnumString};
use thiserror::Error;

use crate::event::{Current, Event};
use crate::flux::{FluxError, FluxTable};
use crate::histogram::{Histogram, HistogramError};
use crate::particle::Species;

/// How the flux enters a cross section
#[derive(
    Copy, Clone, Debug, Default, Display, EnumString, ValueEnum, Eq, PartialEq, Hash,
)]
#[strum(ascii_case_insensitive)]
pub enum FluxTreatment {
    /// Normalise with the total flux only
    #[default]
    Averaged,
    /// Divide out the flux at the incident neutrino energy
    Integrated,
}

#[derive(Debug, Error)]
pub enum XSecError {
    #[error("Invalid histogram")]
    Histogram(#[from] HistogramError),
    #[error("Invalid flux")]
    Flux(#[from] FluxError),
    #[error("Flux integral vanishes")]
    EmptyFlux,
    #[error("Flux has no upper edge")]
    UndefinedFluxRange,
}

/// Decide whether an event enters a cross section
pub trait Selection {
    fn accept(&self, event: &Event) -> bool;
}

impl<F: Fn(&Event) -> bool> Selection for F {
    fn accept(&self, event: &Event) -> bool {
        self(event)
    }
}

/// A scalar kinematic quantity
///
/// Returns `None` for events where the quantity is undefined, for
/// example if there is no final-state particle of the requested species.
pub trait Observable {
    fn value(&self, event: &Event) -> Option<f64>;
}

impl<F: Fn(&Event) -> Option<f64>> Observable for F {
    fn value(&self, event: &Event) -> Option<f64> {
        self(event)
    }
}

/// Select events by incident neutrino and interaction current
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct NeutrinoSelection {
    pub pdg: Option<ParticleID>,
    pub current: Option<Current>,
}

impl Selection for NeutrinoSelection {
    fn accept(&self, event: &Event) -> bool {
        if let Some(pdg) = self.pdg {
            if event.neutrino.pdg != pdg {
                return false;
            }
        }
        match self.current {
            Some(Current::CC) => event.charged_current,
            Some(Current::NC) => event.neutral_current,
            None => true,
        }
    }
}

/// Built-in observables
///
/// Quantities of final-state particles refer to the leading particle,
/// i.e. the one with the highest energy, of the given species.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Kinematic {
    /// Absolute value of the spatial momentum
    Momentum(Species),
    KineticEnergy(Species),
    /// Cosine of the angle to the beam axis
    CosTheta(Species),
    NeutrinoEnergy,
}

impl Observable for Kinematic {
    fn value(&self, event: &Event) -> Option<f64> {
        use Kinematic::*;
        match *self {
            Momentum(s) => event.leading(s).map(|p| p.p.spatial_norm().raw()),
            KineticEnergy(s) => {
                event.leading(s).map(|p| p.p.kinetic_energy().raw())
            }
            CosTheta(s) => event
                .leading(s)
                .and_then(|p| p.p.cos_theta())
                .map(|c| c.raw()),
            NeutrinoEnergy => Some(event.neutrino.energy.raw()),
        }
    }
}

/// Event counts from a cross section reduction
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ReductionStats {
    /// All events seen
    pub events: usize,
    /// Events passing the selection
    pub selected: usize,
    /// Selected events where the observable is undefined
    pub undefined: usize,
    /// Events with neutrino energy outside the flux range
    pub outside_flux: usize,
    /// Events with neutrino energy in a flux bin without content
    pub zero_flux: usize,
}

/// Reduce events to a differential cross section
///
/// Each selected event fills the histogram at the value of the
/// observable with its physical weight, i.e. event weight times
/// generator scale factor. For [FluxTreatment::Integrated], the weight is
/// furthermore multiplied by the total flux and divided by the flux in
/// the bin containing the incident neutrino energy. Finally, each bin is
/// divided by its width.
pub struct CrossSectionReducer<S, O> {
    selection: S,
    observable: O,
    hist: Histogram,
    flux: Option<FluxTable>,
    stats: ReductionStats,
}

impl<S: Selection, O: Observable> CrossSectionReducer<S, O> {
    /// Reducer for flux-averaged cross sections
    pub fn averaged(selection: S, observable: O, hist: Histogram) -> Self {
        Self {
            selection,
            observable,
            hist,
            flux: None,
            stats: ReductionStats::default(),
        }
    }

    /// Reducer for flux-integrated cross sections
    ///
    /// If `energy_edges` are given, the flux is first rebinned to them.
    pub fn integrated(
        selection: S,
        observable: O,
        hist: Histogram,
        flux: &FluxTable,
        energy_edges: Option<&[f64]>,
    ) -> Result<Self, XSecError> {
        let flux = match energy_edges {
            Some(edges) => flux.rebin_to(edges)?,
            None => flux.clone(),
        };
        if flux.upper_edge().is_none() {
            return Err(XSecError::UndefinedFluxRange);
        }
        if flux.integral() == 0. {
            return Err(XSecError::EmptyFlux);
        }
        debug!("Flux in {} energy bins", flux.len());
        Ok(Self {
            selection,
            observable,
            hist,
            flux: Some(flux.normalized()),
            stats: ReductionStats::default(),
        })
    }

    pub fn new(
        selection: S,
        observable: O,
        hist: Histogram,
        flux: &FluxTable,
        treatment: FluxTreatment,
        energy_edges: Option<&[f64]>,
    ) -> Result<Self, XSecError> {
        match treatment {
            FluxTreatment::Averaged => Ok(Self::averaged(selection, observable, hist)),
            FluxTreatment::Integrated => {
                Self::integrated(selection, observable, hist, flux, energy_edges)
            }
        }
    }

    /// Add an event
    pub fn add(&mut self, event: &Event) {
        self.stats.events += 1;
        if !self.selection.accept(event) {
            return;
        }
        self.stats.selected += 1;
        let Some(x) = self.observable.value(event) else {
            self.stats.undefined += 1;
            return;
        };
        let mut weight = event.physical_weight().raw();
        if let Some(flux) = &self.flux {
            let enu = event.neutrino.energy.raw();
            match flux.value_at(enu) {
                None => {
                    debug!(
                        "Skipping event {}: neutrino energy {enu} outside flux range",
                        event.id
                    );
                    self.stats.outside_flux += 1;
                    return;
                }
                Some(f) if f == 0. => {
                    debug!(
                        "Skipping event {}: no flux at neutrino energy {enu}",
                        event.id
                    );
                    self.stats.zero_flux += 1;
                    return;
                }
                Some(f) => weight /= f,
            }
        }
        trace!("Filling {x} with weight {weight}");
        self.hist.fill(x, weight);
    }

    pub fn stats(&self) -> ReductionStats {
        self.stats
    }

    /// Finish the reduction and return the cross section
    pub fn finish(self) -> (Histogram, ReductionStats) {
        let Self {
            mut hist, stats, ..
        } = self;
        hist.divide_by_width();
        info!("Selected {} out of {} events", stats.selected, stats.events);
        if stats.undefined > 0 {
            info!("Observable undefined for {} events", stats.undefined);
        }
        if stats.outside_flux > 0 {
            warn!(
                "Skipped {} events with neutrino energy outside the flux range",
                stats.outside_flux
            );
        }
        if stats.zero_flux > 0 {
            warn!(
                "Skipped {} events in flux bins without content",
                stats.zero_flux
            );
        }
        (hist, stats)
    }
}

/// Reduce a sequence of events to a cross section in one go
pub fn reduce<'a, I, S, O>(
    events: I,
    selection: S,
    observable: O,
    edges: Vec<f64>,
    flux: &FluxTable,
    treatment: FluxTreatment,
) -> Result<Histogram, XSecError>
where
    I: IntoIterator<Item = &'a Event>,
    S: Selection,
    O: Observable,
{
    let hist = Histogram::new(edges)?;
    let mut reducer =
        CrossSectionReducer::new(selection, observable, hist, flux, treatment, None)?;
    for event in events {
        reducer.add(event);
    }
    Ok(reducer.finish().0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventBuilder;

    use noisy_float::prelude::*;

    const NU_MU: ParticleID = ParticleID::new(14);
    const MUON: ParticleID = ParticleID::new(13);

    fn log_init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn event(id: u64, enu: f64, weight: f64, cc: bool, muon: [f64; 4]) -> Event {
        let mut b = EventBuilder::new(1, id);
        b.neutrino(NU_MU, n64(enu))
            .weight(n64(weight))
            .scale_factor(n64(2.))
            .current(cc, !cc)
            .add_outgoing(MUON, muon.try_into().unwrap());
        b.build()
    }

    fn assert_close(a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), b.len());
        for (a, b) in a.iter().zip(b) {
            assert!((a - b).abs() <= 1e-12 * b.abs().max(1.), "{a} != {b}");
        }
    }

    fn flux() -> FluxTable {
        FluxTable::new([(0., 1.), (1., 3.)])
            .unwrap()
            .with_upper_edge(2.)
            .unwrap()
    }

    #[test]
    fn observables() {
        let ev = event(0, 1.5, 1., true, [1., 0., 0., 0.5]);
        let value = |k: Kinematic| k.value(&ev);
        assert_eq!(value(Kinematic::Momentum(Species::Muons)), Some(0.5));
        assert_eq!(value(Kinematic::CosTheta(Species::Muons)), Some(1.));
        assert_eq!(value(Kinematic::NeutrinoEnergy), Some(1.5));
        let ekin = value(Kinematic::KineticEnergy(Species::Muons)).unwrap();
        assert!((ekin - (1. - 0.75f64.sqrt())).abs() < 1e-15);
        assert_eq!(value(Kinematic::Momentum(Species::Protons)), None);
    }

    #[test]
    fn selection() {
        let cc = event(0, 1., 1., true, [1., 0., 0., 0.]);
        let nc = event(1, 1., 1., false, [1., 0., 0., 0.]);
        let all = NeutrinoSelection::default();
        assert!(all.accept(&cc) && all.accept(&nc));
        let numu_cc = NeutrinoSelection {
            pdg: Some(NU_MU),
            current: Some(Current::CC),
        };
        assert!(numu_cc.accept(&cc));
        assert!(!numu_cc.accept(&nc));
        let nue = NeutrinoSelection {
            pdg: Some(ParticleID::new(12)),
            current: None,
        };
        assert!(!nue.accept(&cc));
    }

    #[test]
    fn flux_averaged() {
        log_init();
        let events = [
            event(0, 0.5, 1., true, [0.2, 0., 0., 0.]),
            event(1, 1.5, 3., true, [0.7, 0., 0., 0.]),
            event(2, 1.5, 5., false, [0.7, 0., 0., 0.]),
            event(3, 2.5, 7., true, [0.3, 0., 0., 0.]),
        ];
        let xs = reduce(
            &events,
            NeutrinoSelection {
                pdg: None,
                current: Some(Current::CC),
            },
            |ev: &Event| ev.leading(Species::Muons).map(|p| p.p.e().raw()),
            vec![0., 0.5, 1.],
            &flux(),
            FluxTreatment::Averaged,
        )
        .unwrap();
        // weight * scale factor / bin width
        assert_eq!(xs.contents(), &[32., 12.]);
    }

    #[test]
    fn flux_integrated() {
        log_init();
        let events = [
            event(0, 0.5, 1., true, [0.2, 0., 0., 0.]),
            event(1, 1.5, 3., true, [0.2, 0., 0., 0.]),
            event(2, 2.5, 5., true, [0.2, 0., 0., 0.]),
        ];
        let hist = Histogram::new(vec![0., 1.]).unwrap();
        let mut reducer = CrossSectionReducer::integrated(
            NeutrinoSelection::default(),
            Kinematic::Momentum(Species::Muons),
            hist,
            &flux(),
            None,
        )
        .unwrap();
        for ev in &events {
            reducer.add(ev);
        }
        let (xs, stats) = reducer.finish();
        // normalised flux is [1/4, 3/4]
        assert_close(xs.contents(), &[2. * 4. + 6. * 4. / 3.]);
        assert_eq!(
            stats,
            ReductionStats {
                events: 3,
                selected: 3,
                undefined: 0,
                outside_flux: 1,
                zero_flux: 0,
            }
        );
    }

    #[test]
    fn zero_flux_bins() {
        log_init();
        let flux = FluxTable::new([(0., 0.), (1., 1.)])
            .unwrap()
            .with_upper_edge(2.)
            .unwrap();
        let mut reducer = CrossSectionReducer::integrated(
            NeutrinoSelection::default(),
            Kinematic::NeutrinoEnergy,
            Histogram::new(vec![0., 2.]).unwrap(),
            &flux,
            None,
        )
        .unwrap();
        reducer.add(&event(0, 0.5, 1., true, [0.2, 0., 0., 0.]));
        reducer.add(&event(1, 1.5, 1., true, [0.2, 0., 0., 0.]));
        assert_eq!(reducer.stats().zero_flux, 1);
        let (xs, _) = reducer.finish();
        assert_eq!(xs.contents(), &[1.]);

        let empty = FluxTable::new([(0., 0.), (1., 0.)]).unwrap();
        assert!(matches!(
            CrossSectionReducer::integrated(
                NeutrinoSelection::default(),
                Kinematic::NeutrinoEnergy,
                Histogram::new(vec![0., 2.]).unwrap(),
                &empty,
                None,
            ),
            Err(XSecError::EmptyFlux)
        ));
    }

    #[test]
    fn rebinned_flux() {
        log_init();
        let flux = FluxTable::new([(0., 1.), (0.5, 1.), (1., 2.), (1.5, 2.)])
            .unwrap()
            .with_upper_edge(2.)
            .unwrap();
        let mut reducer = CrossSectionReducer::integrated(
            NeutrinoSelection::default(),
            Kinematic::Momentum(Species::Muons),
            Histogram::new(vec![0., 1.]).unwrap(),
            &flux,
            Some(&[0., 1., 2.][..]),
        )
        .unwrap();
        reducer.add(&event(0, 0.25, 1., true, [0.2, 0., 0., 0.]));
        let (xs, _) = reducer.finish();
        // rebinned and normalised flux is [1/3, 2/3]
        assert_close(xs.contents(), &[2. * 3.]);
    }
}
