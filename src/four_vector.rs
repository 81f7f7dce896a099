use noisy_float::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A four-momentum in GeV
///
/// The zero component is the energy. The remainder are the spatial
/// components. The energy is never negative.
#[derive(
    Deserialize,
    Serialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Debug,
    Clone,
    Copy,
    Default,
)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct FourVector {
    p: [N64; 4],
}

/// Error constructing a four-momentum
#[derive(Debug, Clone, Copy, Error, PartialEq)]
pub enum KinematicsError {
    #[error("Non-finite four-momentum component in {0:?}")]
    NotFinite([f64; 4]),
    #[error("Negative energy {0}")]
    NegativeEnergy(f64),
    #[error("Four-momentum {0:?} too large to square")]
    Overflow([f64; 4]),
}

impl FourVector {
    /// Construct a four-momentum from energy and momentum components
    pub fn try_new(
        e: f64,
        px: f64,
        py: f64,
        pz: f64,
    ) -> Result<Self, KinematicsError> {
        let raw = [e, px, py, pz];
        if raw.iter().any(|c| !c.is_finite()) {
            return Err(KinematicsError::NotFinite(raw));
        }
        if e < 0. {
            return Err(KinematicsError::NegativeEnergy(e));
        }
        // all invariants are computed from the squared components
        let sum_sq: f64 = raw.iter().map(|c| c * c).sum();
        if !sum_sq.is_finite() {
            return Err(KinematicsError::Overflow(raw));
        }
        Ok(Self {
            p: [n64(e), n64(px), n64(py), n64(pz)],
        })
    }

    /// The energy
    pub fn e(&self) -> N64 {
        self.p[0]
    }

    pub fn px(&self) -> N64 {
        self.p[1]
    }

    pub fn py(&self) -> N64 {
        self.p[2]
    }

    pub fn pz(&self) -> N64 {
        self.p[3]
    }

    /// The spatial norm \sqrt{\sum v_i^2} with i = 1,2,3
    pub fn spatial_norm(&self) -> N64 {
        self.spatial_norm_sq().sqrt()
    }

    /// The square \sum v_i^2 with i = 1,2,3 of the spatial norm
    pub fn spatial_norm_sq(&self) -> N64 {
        self.p.iter().skip(1).map(|e| *e * *e).sum()
    }

    /// The invariant mass square v_0^2 - \sum v_i^2 with i = 1,2,3
    ///
    /// Bound nucleons leave the generator off-shell, so this can be
    /// below the free mass square or even negative.
    pub fn m_sq(&self) -> N64 {
        self.p[0] * self.p[0] - self.spatial_norm_sq()
    }

    /// Cosine of the polar angle with respect to the beam (z) axis
    ///
    /// Returns `None` for vanishing spatial momentum.
    pub fn cos_theta(&self) -> Option<N64> {
        let norm = self.spatial_norm();
        if norm == 0. {
            None
        } else {
            Some(self.pz() / norm)
        }
    }

    /// Kinetic energy E - m, with m the invariant mass
    ///
    /// For off-shell momenta with m^2 < 0 the full energy is returned.
    pub fn kinetic_energy(&self) -> N64 {
        let m_sq = self.m_sq();
        if m_sq <= 0. {
            self.e()
        } else {
            self.e() - m_sq.sqrt()
        }
    }

    /// The components as plain floating-point numbers
    pub fn to_array(&self) -> [f64; 4] {
        [
            self.p[0].raw(),
            self.p[1].raw(),
            self.p[2].raw(),
            self.p[3].raw(),
        ]
    }
}

impl TryFrom<[f64; 4]> for FourVector {
    type Error = KinematicsError;

    fn try_from(p: [f64; 4]) -> Result<Self, Self::Error> {
        Self::try_new(p[0], p[1], p[2], p[3])
    }
}

impl From<FourVector> for [f64; 4] {
    fn from(p: FourVector) -> Self {
        p.to_array()
    }
}

impl std::ops::Index<usize> for FourVector {
    type Output = N64;

    fn index(&self, i: usize) -> &Self::Output {
        &self.p[i]
    }
}

impl AsRef<FourVector> for FourVector {
    fn as_ref(&self) -> &FourVector {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mass_square() {
        let p = FourVector::try_new(5., 1., 2., 3.).unwrap();
        assert_eq!(p.m_sq(), n64(25. - 14.));
        assert_eq!(p.spatial_norm_sq(), n64(14.));
        let at_rest = FourVector::try_new(0.938, 0., 0., 0.).unwrap();
        assert_eq!(at_rest.m_sq(), n64(0.938 * 0.938));
    }

    #[test]
    fn reject_invalid() {
        assert_eq!(
            FourVector::try_new(-1., 0., 0., 0.),
            Err(KinematicsError::NegativeEnergy(-1.))
        );
        assert!(matches!(
            FourVector::try_new(1., f64::NAN, 0., 0.),
            Err(KinematicsError::NotFinite(_))
        ));
        assert!(FourVector::try_from([1., 0., 0., f64::INFINITY]).is_err());
        assert_eq!(
            FourVector::try_new(1e200, 1e200, 0., 0.),
            Err(KinematicsError::Overflow([1e200, 1e200, 0., 0.]))
        );
        let large = FourVector::try_new(1e150, 1e150, 0., 0.).unwrap();
        assert_eq!(large.m_sq(), n64(0.));
    }

    #[test]
    fn angles_and_kinetic_energy() {
        let p = FourVector::try_new(2., 0., 0., 1.).unwrap();
        assert_eq!(p.cos_theta(), Some(n64(1.)));
        assert_eq!(p.kinetic_energy(), n64(2. - 3f64.sqrt()));
        let p = FourVector::try_new(1., 0., 0., 0.).unwrap();
        assert_eq!(p.cos_theta(), None);
    }
}
