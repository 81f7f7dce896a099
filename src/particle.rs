use particle_id::ParticleID;
use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

pub const PROTON: ParticleID = ParticleID::new(2212);
pub const NEUTRON: ParticleID = ParticleID::new(2112);
pub const PHOTON: ParticleID = ParticleID::new(22);
pub const PI0: ParticleID = ParticleID::new(111);
pub const PI_PLUS: ParticleID = ParticleID::new(211);
pub const ELECTRON: ParticleID = ParticleID::new(11);
pub const MUON: ParticleID = ParticleID::new(13);
pub const TAU: ParticleID = ParticleID::new(15);
pub const NU_E: ParticleID = ParticleID::new(12);
pub const NU_MU: ParticleID = ParticleID::new(14);
pub const NU_TAU: ParticleID = ParticleID::new(16);
pub const K_PLUS: ParticleID = ParticleID::new(321);
pub const K0: ParticleID = ParticleID::new(311);
pub const LAMBDA: ParticleID = ParticleID::new(3122);
pub const SIGMA_PLUS: ParticleID = ParticleID::new(3222);
pub const SIGMA0: ParticleID = ParticleID::new(3212);
pub const SIGMA_MINUS: ParticleID = ParticleID::new(3112);
/// Hydrogen nucleus, i.e. a free proton in nuclear notation
pub const HYDROGEN: ParticleID = ParticleID::new(1_000_010_010);

/// Code for particles the GiBUU table does not know about
pub const UNKNOWN: ParticleID = ParticleID::new(0);

/// Codes above this are nuclei or generator-internal objects
pub const NUCLEAR_FRAGMENT_THRESHOLD: i32 = 9_999_999;

/// Final-state particle species
///
/// The string representation is the species part of the
/// `FS_<Species>` and `n_FS_<Species>` fields of the Convenient format.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    EnumIter,
    EnumString,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
)]
#[strum(ascii_case_insensitive)]
pub enum Species {
    Protons,
    Antiprotons,
    Neutrons,
    Antineutrons,
    Gammas,
    Pi0s,
    PiPs,
    PiMs,
    Muons,
    Electrons,
    Taus,
    Nus,
    Others,
}

/// Number of distinct [Species]
pub const NSPECIES: usize = 13;

impl Species {
    /// The bucket a particle with the given canonical code belongs to
    ///
    /// Everything that is not explicitly listed ends up in
    /// [Species::Others].
    pub fn of(code: ParticleID) -> Self {
        use Species::*;
        match code.id() {
            2212 => Protons,
            -2212 => Antiprotons,
            2112 => Neutrons,
            -2112 => Antineutrons,
            22 => Gammas,
            111 => Pi0s,
            211 => PiPs,
            -211 => PiMs,
            11 | -11 => Electrons,
            13 | -13 => Muons,
            15 | -15 => Taus,
            12 | -12 | 14 | -14 | 16 | -16 => Nus,
            _ => Others,
        }
    }

    /// Whether this is a bucket of (anti)nucleons
    ///
    /// Nucleons are subject to the bound-state filter.
    pub fn is_nucleon(self) -> bool {
        use Species::*;
        matches!(self, Protons | Antiprotons | Neutrons | Antineutrons)
    }

    /// Position in a per-species array
    pub fn index(self) -> usize {
        self as usize
    }

    /// Name of the field holding the four-momenta of this species
    pub fn momenta_field(self) -> String {
        format!("FS_{self}")
    }

    /// Name of the field holding the number of particles of this species
    pub fn count_field(self) -> String {
        format!("n_FS_{self}")
    }
}

/// Convenience wrapper around [Species::of]
pub fn bucket_for(code: ParticleID) -> Species {
    Species::of(code)
}

/// Particle numbering scheme of a generator's native output
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ParticleTable {
    /// GiBUU's internal numbering, needs the charge to disambiguate
    GiBUU,
    /// (Almost) PDG numbering, as used by NUISANCE flat trees
    #[default]
    Pdg,
}

/// Map generator-native particle identifiers to canonical PDG codes
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ParticleClassifier {
    table: ParticleTable,
}

impl ParticleClassifier {
    pub fn new(table: ParticleTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> ParticleTable {
        self.table
    }

    /// The canonical code for a native particle identifier and charge
    ///
    /// This never fails. Identifiers missing from the table come out
    /// either unchanged (PDG-like tables) or as [UNKNOWN] (GiBUU).
    pub fn classify(&self, native_pid: i32, charge: i32) -> ParticleID {
        match self.table {
            ParticleTable::GiBUU => gibuu_to_pdg(native_pid, charge),
            ParticleTable::Pdg => pdg_to_pdg(native_pid),
        }
    }

    /// Classify and sort into a species bucket in one go
    pub fn species(&self, native_pid: i32, charge: i32) -> (ParticleID, Species) {
        let code = self.classify(native_pid, charge);
        (code, Species::of(code))
    }
}

fn pdg_to_pdg(pid: i32) -> ParticleID {
    let pid = ParticleID::new(pid);
    if pid == HYDROGEN {
        PROTON
    } else {
        pid
    }
}

fn signed(id: ParticleID, sign: i32) -> ParticleID {
    ParticleID::new(sign * id.id())
}

// GiBUU stores particles as an ID plus a charge, with negative IDs for
// antibaryons. Charged leptons are stored with their physical charge,
// so a negative lepton (positive PDG code) has charge -1.
fn gibuu_to_pdg(pid: i32, charge: i32) -> ParticleID {
    match pid {
        1 => match charge {
            0 => NEUTRON,
            _ => signed(PROTON, charge.signum()),
        },
        -1 => match charge {
            0 => signed(NEUTRON, -1),
            _ => signed(PROTON, -charge.abs()),
        },
        101 => match charge {
            0 => PI0,
            _ => signed(PI_PLUS, charge.signum()),
        },
        110 => {
            if charge == 1 {
                K_PLUS
            } else {
                K0
            }
        }
        111 => {
            if charge == -1 {
                signed(K_PLUS, -1)
            } else {
                signed(K0, -1)
            }
        }
        32 => LAMBDA,
        33 => match charge {
            0 => SIGMA0,
            1 => SIGMA_PLUS,
            _ => SIGMA_MINUS,
        },
        901 => signed(ELECTRON, -charge.signum()),
        902 => signed(MUON, -charge.signum()),
        903 => signed(TAU, -charge.signum()),
        911 => NU_E,
        912 => NU_MU,
        913 => NU_TAU,
        -911 => signed(NU_E, -1),
        -912 => signed(NU_MU, -1),
        -913 => signed(NU_TAU, -1),
        999 => PHOTON,
        _ => UNKNOWN,
    }
}

/// Error constructing a nuclear target code
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("Mass number must be positive")]
    ZeroMassNumber,
    #[error("Mass number {0} exceeds 999")]
    MassNumberTooLarge(u32),
    #[error("More protons ({z}) than nucleons ({a})")]
    TooManyProtons { z: u32, a: u32 },
}

/// Nuclear PDG code 10LZZZAAAI for a ground-state nucleus without strangeness
pub fn nuclear_code(z: u32, a: u32) -> Result<ParticleID, TargetError> {
    if a == 0 {
        return Err(TargetError::ZeroMassNumber);
    }
    if a > 999 {
        return Err(TargetError::MassNumberTooLarge(a));
    }
    if z > a {
        return Err(TargetError::TooManyProtons { z, a });
    }
    let code = 1_000_000_000 + 10_000 * z as i32 + 10 * a as i32;
    Ok(ParticleID::new(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256Plus;
    use strum::IntoEnumIterator;

    #[test]
    fn species_indices_are_dense() {
        let species: Vec<_> = Species::iter().collect();
        assert_eq!(species.len(), NSPECIES);
        for (n, s) in species.into_iter().enumerate() {
            assert_eq!(s.index(), n);
        }
    }

    #[test]
    fn field_names() {
        assert_eq!(Species::PiPs.momenta_field(), "FS_PiPs");
        assert_eq!(Species::Antineutrons.count_field(), "n_FS_Antineutrons");
        assert_eq!("Gammas".parse::<Species>(), Ok(Species::Gammas));
    }

    #[test]
    fn buckets() {
        let cases = [
            (2212, Species::Protons),
            (-2212, Species::Antiprotons),
            (2112, Species::Neutrons),
            (-2112, Species::Antineutrons),
            (22, Species::Gammas),
            (111, Species::Pi0s),
            (211, Species::PiPs),
            (-211, Species::PiMs),
            (13, Species::Muons),
            (-13, Species::Muons),
            (-11, Species::Electrons),
            (15, Species::Taus),
            (-12, Species::Nus),
            (14, Species::Nus),
            (16, Species::Nus),
            (321, Species::Others),
            (0, Species::Others),
            (1_000_060_120, Species::Others),
        ];
        for (code, species) in cases {
            assert_eq!(bucket_for(ParticleID::new(code)), species, "{code}");
        }
    }

    #[test]
    fn gibuu_table() {
        let c = ParticleClassifier::new(ParticleTable::GiBUU);
        let cases = [
            ((1, 1), 2212),
            ((1, 0), 2112),
            ((1, -1), -2212),
            ((-1, -1), -2212),
            ((-1, 0), -2112),
            ((101, 0), 111),
            ((101, 1), 211),
            ((101, -1), -211),
            ((902, -1), 13),
            ((902, 1), -13),
            ((901, -1), 11),
            ((903, 1), -15),
            ((912, 0), 14),
            ((-911, 0), -12),
            ((999, 0), 22),
            ((110, 1), 321),
            ((110, 0), 311),
            ((111, -1), -321),
            ((111, 0), -311),
            ((32, 0), 3122),
            ((33, 1), 3222),
            ((33, 0), 3212),
            ((33, -1), 3112),
            ((53, 1), 0),
        ];
        for ((pid, charge), code) in cases {
            assert_eq!(c.classify(pid, charge).id(), code, "{pid} {charge}");
        }
    }

    #[test]
    fn pdg_table() {
        let c = ParticleClassifier::new(ParticleTable::Pdg);
        assert_eq!(c.classify(1_000_010_010, 0), PROTON);
        assert_eq!(c.classify(-211, 0).id(), -211);
        assert_eq!(c.classify(1_000_060_120, 0).id(), 1_000_060_120);
    }

    #[test]
    fn classifier_is_total() {
        let mut rng = Xoshiro256Plus::seed_from_u64(1);
        for table in [ParticleTable::GiBUU, ParticleTable::Pdg] {
            let c = ParticleClassifier::new(table);
            for _ in 0..10_000 {
                let pid = rng.gen_range(-2_000_000_000..2_000_000_000);
                let charge = rng.gen_range(-3..=3);
                let (_, species) = c.species(pid, charge);
                assert!(Species::iter().any(|s| s == species));
            }
            for pid in [i32::MIN, -1, 0, 1, i32::MAX] {
                let _ = c.species(pid, 0);
            }
        }
    }

    #[test]
    fn target_codes() {
        assert_eq!(nuclear_code(6, 12).unwrap().id(), 1_000_060_120);
        assert_eq!(nuclear_code(1, 1).unwrap(), HYDROGEN);
        assert_eq!(nuclear_code(18, 40).unwrap().id(), 1_000_180_400);
        assert_eq!(nuclear_code(3, 2), Err(TargetError::TooManyProtons { z: 3, a: 2 }));
        assert_eq!(nuclear_code(0, 0), Err(TargetError::ZeroMassNumber));
        assert_eq!(nuclear_code(1, 1000), Err(TargetError::MassNumberTooLarge(1000)));
    }
}
