use std::collections::BTreeMap;
use std::io::Read;

use log::debug;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

/// Chemical elements found in detector materials
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    EnumIter,
    EnumString,
    Deserialize,
    Serialize,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
)]
pub enum Element {
    H,
    B,
    C,
    N,
    O,
    F,
    Na,
    Mg,
    Al,
    Si,
    P,
    S,
    Cl,
    Ar,
    K,
    Ca,
    Ti,
    Mn,
    Fe,
    Cu,
    Sn,
    Ba,
    Pb,
}

impl Element {
    /// Standard atomic weight in atomic mass units
    pub fn atomic_weight(self) -> f64 {
        use Element::*;
        match self {
            H => 1.00794,
            B => 10.811,
            C => 12.011,
            N => 14.00674,
            O => 15.9994,
            F => 18.998403,
            Na => 22.989768,
            Mg => 24.305,
            Al => 26.981539,
            Si => 28.0855,
            P => 30.973762,
            S => 32.066,
            Cl => 35.4527,
            Ar => 39.948,
            K => 39.0983,
            Ca => 40.078,
            Ti => 47.867,
            Mn => 54.93805,
            Fe => 55.847,
            Cu => 63.546,
            Sn => 118.71,
            Ba => 137.327,
            Pb => 207.2,
        }
    }

    pub fn atomic_number(self) -> u32 {
        use Element::*;
        match self {
            H => 1,
            B => 5,
            C => 6,
            N => 7,
            O => 8,
            F => 9,
            Na => 11,
            Mg => 12,
            Al => 13,
            Si => 14,
            P => 15,
            S => 16,
            Cl => 17,
            Ar => 18,
            K => 19,
            Ca => 20,
            Ti => 22,
            Mn => 25,
            Fe => 26,
            Cu => 29,
            Sn => 50,
            Ba => 56,
            Pb => 82,
        }
    }

    /// Mass number of the most common isotope, for nuclear target codes
    pub fn mass_number(self) -> u32 {
        use Element::*;
        match self {
            H => 1,
            B => 11,
            C => 12,
            N => 14,
            O => 16,
            F => 19,
            Na => 23,
            Mg => 24,
            Al => 27,
            Si => 28,
            P => 31,
            S => 32,
            Cl => 35,
            Ar => 40,
            K => 39,
            Ca => 40,
            Ti => 48,
            Mn => 55,
            Fe => 56,
            Cu => 63,
            Sn => 120,
            Ba => 138,
            Pb => 208,
        }
    }
}

#[derive(Debug, Error)]
pub enum CompositionError {
    #[error("Failed to read material mixture")]
    Parse(#[from] serde_yaml::Error),
    #[error("No composition given for material {0}")]
    UnknownMaterial(String),
    #[error("Negative amount {amount} in {material}")]
    NegativeAmount { material: String, amount: f64 },
    #[error("Material {0} has no mass")]
    EmptyMaterial(String),
    #[error("Material fractions add up to zero")]
    NoMass,
}

/// Numbers of atoms of each element in one molecule
pub type Formula = BTreeMap<Element, f64>;

/// A mixture of materials
///
/// Each material is described by its chemical formula, and enters the
/// mixture with a relative mass given in `fractions`. Materials without
/// a fraction are ignored.
///
/// ```yaml
/// materials:
///   water: { H: 2, O: 1 }
///   pvc: { C: 2, H: 3, Cl: 1 }
/// fractions:
///   water: 0.25
///   pvc: 0.75
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Mixture {
    pub materials: BTreeMap<String, Formula>,
    pub fractions: BTreeMap<String, f64>,
}

impl Mixture {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CompositionError> {
        Ok(serde_yaml::from_reader(reader)?)
    }

    pub fn from_text(text: &str) -> Result<Self, CompositionError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// The mass fraction of each element in the mixture
    ///
    /// These are the abundance weights for events generated on the
    /// individual elements.
    pub fn mass_fractions(&self) -> Result<BTreeMap<Element, f64>, CompositionError> {
        let mut total = 0.;
        for (material, &fraction) in &self.fractions {
            if fraction < 0. {
                return Err(CompositionError::NegativeAmount {
                    material: material.clone(),
                    amount: fraction,
                });
            }
            total += fraction;
        }
        if total <= 0. {
            return Err(CompositionError::NoMass);
        }

        let mut res = BTreeMap::new();
        for (material, &fraction) in &self.fractions {
            let Some(formula) = self.materials.get(material) else {
                return Err(CompositionError::UnknownMaterial(material.clone()));
            };
            let mass = molecular_weight(material, formula)?;
            debug!("{material}: molecular weight {mass}, fraction {fraction}");
            for (&element, &count) in formula {
                let element_mass = count * element.atomic_weight();
                *res.entry(element).or_insert(0.) +=
                    element_mass / mass * fraction / total;
            }
        }
        Ok(res)
    }

    /// Mass-weighted average of Z/A
    pub fn z_over_a(&self) -> Result<f64, CompositionError> {
        let fractions = self.mass_fractions()?;
        Ok(fractions
            .into_iter()
            .map(|(el, frac)| {
                frac * el.atomic_number() as f64 / el.atomic_weight()
            })
            .sum())
    }
}

fn molecular_weight(material: &str, formula: &Formula) -> Result<f64, CompositionError> {
    let mut mass = 0.;
    for (element, &count) in formula {
        if count < 0. {
            return Err(CompositionError::NegativeAmount {
                material: material.to_owned(),
                amount: count,
            });
        }
        mass += count * element.atomic_weight();
    }
    if mass > 0. {
        Ok(mass)
    } else {
        Err(CompositionError::EmptyMaterial(material.to_owned()))
    }
}
