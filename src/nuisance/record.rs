use itertools::izip;
use serde::{Deserialize, Serialize};

use crate::four_vector::FourVector;
use crate::raw::{EventHeader, RawEvent, RawParticle};

/// One event of a NUISANCE flat tree
///
/// Field names are the branch names of the flat tree. The final-state
/// arrays all have length `nfsp`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct FlatTreeRecord {
    #[serde(rename = "PDGnu")]
    pub neutrino_pdg: i32,
    #[serde(rename = "Enu_true")]
    pub neutrino_energy: f64,
    #[serde(rename = "tgt")]
    pub target_pdg: i32,
    #[serde(rename = "Weight")]
    pub weight: f64,
    #[serde(rename = "fScaleFactor")]
    pub scale_factor: f64,
    #[serde(rename = "flagCCINC")]
    pub charged_current: bool,
    #[serde(rename = "flagNCINC")]
    pub neutral_current: bool,
    #[serde(rename = "Mode")]
    pub mode: i32,
    pub nfsp: usize,
    pub pdg: Vec<i32>,
    #[serde(rename = "E")]
    pub e: Vec<f64>,
    pub px: Vec<f64>,
    pub py: Vec<f64>,
    pub pz: Vec<f64>,
}

impl FlatTreeRecord {
    /// Convert into a raw event with the given event number
    ///
    /// Fails if the array lengths disagree with `nfsp` or a four-momentum
    /// is invalid.
    pub fn into_raw_event(self, event: u64) -> Result<RawEvent, String> {
        let lengths = [
            ("pdg", self.pdg.len()),
            ("E", self.e.len()),
            ("px", self.px.len()),
            ("py", self.py.len()),
            ("pz", self.pz.len()),
        ];
        for (name, len) in lengths {
            if len != self.nfsp {
                return Err(format!(
                    "{name} has length {len}, but nfsp is {}",
                    self.nfsp
                ));
            }
        }
        let header = EventHeader {
            run: Some(0),
            event: Some(event),
            weight: Some(self.weight),
            neutrino_energy: Some(self.neutrino_energy),
            neutrino_pdg: Some(self.neutrino_pdg),
            target_pdg: Some(self.target_pdg),
            scale_factor: Some(self.scale_factor),
            charged_current: Some(self.charged_current),
            neutral_current: Some(self.neutral_current),
            mode: Some(self.mode),
        };
        let mut particles = Vec::with_capacity(self.nfsp);
        for (pid, e, px, py, pz) in izip!(self.pdg, self.e, self.px, self.py, self.pz) {
            let momentum = FourVector::try_new(e, px, py, pz)
                .map_err(|err| format!("particle {pid}: {err}"))?;
            particles.push(RawParticle {
                run: 0,
                event,
                pid,
                charge: 0,
                weight: self.weight,
                position: [0.; 3],
                momentum,
                history: 0,
                production_id: self.mode,
                neutrino_energy: self.neutrino_energy,
            });
        }
        Ok(RawEvent::with_header(header, particles))
    }
}
