/// Plain-text flux formats
pub mod text;

pub use text::{
    parse_edge_value_table, read_edge_value_file, read_edge_value_table,
    write_edge_value_table, write_nuwro_table, LastRow,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Threshold in GeV below which NEUT fluxes are set to zero
pub const NEUT_THRESHOLD: f64 = 0.1;
/// Divisor for fluxes in GiBUU input files
pub const GIBUU_FLUX_DIVISOR: f64 = 1e12;

/// Error constructing, reading, or writing a flux table
#[derive(Debug, Error)]
pub enum FluxError {
    #[error("I/O error")]
    Io(#[from] std::io::Error),
    #[error("Malformed flux line {line}: {content:?}")]
    MalformedLine { line: usize, content: String },
    #[error("Bin edges not strictly increasing at bin {0}")]
    NonIncreasingEdges(usize),
    #[error("Non-finite flux entry in bin {bin}: ({edge}, {value})")]
    NotFinite { bin: usize, edge: f64, value: f64 },
    #[error("Number of edges ({edges}) and values ({values}) differ")]
    LengthMismatch { edges: usize, values: usize },
    #[error("Flux table has no bins")]
    Empty,
    #[error("At least two bin edges are required, found {0}")]
    TooFewEdges(usize),
}

/// A binned flux
///
/// Bins are given by their lower edges, which are strictly increasing.
/// The width of the last bin is given by an explicit upper edge if
/// present, otherwise it is taken to be the same as the width of the
/// second-to-last bin.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "FluxTableRepr", into = "FluxTableRepr")]
pub struct FluxTable {
    edges: Vec<f64>,
    values: Vec<f64>,
    upper_edge: Option<f64>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
struct FluxTableRepr {
    edges: Vec<f64>,
    values: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    upper_edge: Option<f64>,
}

impl TryFrom<FluxTableRepr> for FluxTable {
    type Error = FluxError;

    fn try_from(repr: FluxTableRepr) -> Result<Self, Self::Error> {
        if repr.edges.len() != repr.values.len() {
            return Err(FluxError::LengthMismatch {
                edges: repr.edges.len(),
                values: repr.values.len(),
            });
        }
        let table = FluxTable::new(repr.edges.into_iter().zip(repr.values))?;
        match repr.upper_edge {
            Some(upper) => table.with_upper_edge(upper),
            None => Ok(table),
        }
    }
}

impl From<FluxTable> for FluxTableRepr {
    fn from(t: FluxTable) -> Self {
        Self {
            edges: t.edges,
            values: t.values,
            upper_edge: t.upper_edge,
        }
    }
}

impl FluxTable {
    /// Construct from pairs of lower bin edge and value
    pub fn new<I>(bins: I) -> Result<Self, FluxError>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let (edges, values): (Vec<_>, Vec<_>) = bins.into_iter().unzip();
        for (bin, (&edge, &value)) in edges.iter().zip(&values).enumerate() {
            if !edge.is_finite() || !value.is_finite() {
                return Err(FluxError::NotFinite { bin, edge, value });
            }
        }
        if let Some(pos) = edges.windows(2).position(|w| w[0] >= w[1]) {
            return Err(FluxError::NonIncreasingEdges(pos + 1));
        }
        Ok(Self {
            edges,
            values,
            upper_edge: None,
        })
    }

    /// Construct from all bin edges, including the upper edge of the last bin
    pub fn from_edges(edges: &[f64], values: &[f64]) -> Result<Self, FluxError> {
        let Some((&upper, lower)) = edges.split_last() else {
            return Err(FluxError::TooFewEdges(0));
        };
        if lower.len() != values.len() {
            return Err(FluxError::LengthMismatch {
                edges: lower.len(),
                values: values.len(),
            });
        }
        let table = Self::new(lower.iter().copied().zip(values.iter().copied()))?;
        table.with_upper_edge(upper)
    }

    /// Set the upper edge of the last bin
    pub fn with_upper_edge(mut self, upper: f64) -> Result<Self, FluxError> {
        let n = self.edges.len();
        match self.edges.last() {
            None => return Err(FluxError::Empty),
            Some(&last) if !(upper > last) => {
                return Err(FluxError::NonIncreasingEdges(n))
            }
            _ => {}
        }
        if !upper.is_finite() {
            return Err(FluxError::NotFinite {
                bin: n,
                edge: upper,
                value: 0.,
            });
        }
        self.upper_edge = Some(upper);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Lower bin edges
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate over pairs of lower bin edge and value
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.edges.iter().copied().zip(self.values.iter().copied())
    }

    /// The explicitly set upper edge of the last bin
    pub fn explicit_upper_edge(&self) -> Option<f64> {
        self.upper_edge
    }

    /// Width of the given bin
    ///
    /// For the last bin without an explicit upper edge this is the width
    /// of the preceding bin. A single bin without upper edge has no
    /// defined width.
    pub fn bin_width(&self, bin: usize) -> Option<f64> {
        let n = self.len();
        if bin + 1 < n {
            Some(self.edges[bin + 1] - self.edges[bin])
        } else if bin + 1 == n {
            match self.upper_edge {
                Some(upper) => Some(upper - self.edges[bin]),
                None if n >= 2 => Some(self.edges[n - 1] - self.edges[n - 2]),
                None => None,
            }
        } else {
            None
        }
    }

    /// Upper edge of the last bin
    pub fn upper_edge(&self) -> Option<f64> {
        let last = self.len().checked_sub(1)?;
        Some(self.edges[last] + self.bin_width(last)?)
    }

    /// All bin edges, including the upper edge of the last bin
    pub fn all_edges(&self) -> Option<Vec<f64>> {
        let upper = self.upper_edge()?;
        let mut edges = self.edges.clone();
        edges.push(upper);
        Some(edges)
    }

    /// Index of the bin containing `x`
    pub fn find_bin(&self, x: f64) -> Option<usize> {
        let upper = self.upper_edge()?;
        if !(x >= self.edges[0] && x < upper) {
            return None;
        }
        Some(self.edges.partition_point(|&e| e <= x) - 1)
    }

    /// Value of the bin containing `x`
    pub fn value_at(&self, x: f64) -> Option<f64> {
        self.find_bin(x).map(|bin| self.values[bin])
    }

    /// Sum of all values
    pub fn integral(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Multiply all values by a constant factor
    pub fn scale(mut self, factor: f64) -> Self {
        for v in &mut self.values {
            *v *= factor;
        }
        self
    }

    /// Divide all values by a constant
    pub fn divide(mut self, divisor: f64) -> Self {
        for v in &mut self.values {
            *v /= divisor;
        }
        self
    }

    /// Scale values such that they sum up to one
    ///
    /// Tables with vanishing integral are returned unchanged.
    pub fn normalized(self) -> Self {
        let integral = self.integral();
        if integral == 0. {
            self
        } else {
            self.divide(integral)
        }
    }

    /// Set the value of all bins with lower edge below `threshold` to zero
    pub fn zero_below(mut self, threshold: f64) -> Self {
        for (edge, value) in self.edges.iter().zip(self.values.iter_mut()) {
            if *edge < threshold {
                *value = 0.;
            }
        }
        self
    }

    /// Convert bin edges from GeV to MeV
    pub fn to_mev(mut self) -> Self {
        for e in &mut self.edges {
            *e *= 1000.;
        }
        self.upper_edge = self.upper_edge.map(|u| u * 1000.);
        self
    }

    /// Redistribute onto new bins
    ///
    /// `new_edges` includes the upper edge of the last new bin. Each old
    /// bin is assigned to the new bin containing its lower edge. Old bins
    /// outside the new range are dropped.
    pub fn rebin_to(&self, new_edges: &[f64]) -> Result<FluxTable, FluxError> {
        if new_edges.len() < 2 {
            return Err(FluxError::TooFewEdges(new_edges.len()));
        }
        let mut values = vec![0.; new_edges.len() - 1];
        let target = Self::from_edges(new_edges, &values)?;
        for (edge, value) in self.bins() {
            if let Some(bin) = target.find_bin(edge) {
                values[bin] += value;
            }
        }
        Self::from_edges(new_edges, &values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> FluxTable {
        FluxTable::new([(0., 1.), (0.5, 2.), (1., 3.), (2., 4.)]).unwrap()
    }

    #[test]
    fn invariants() {
        assert!(matches!(
            FluxTable::new([(0., 1.), (0., 2.)]),
            Err(FluxError::NonIncreasingEdges(1))
        ));
        assert!(matches!(
            FluxTable::new([(0., 1.), (1., f64::NAN)]),
            Err(FluxError::NotFinite { bin: 1, .. })
        ));
        assert!(matches!(
            table().with_upper_edge(2.),
            Err(FluxError::NonIncreasingEdges(4))
        ));
        assert!(matches!(
            FluxTable::default().with_upper_edge(2.),
            Err(FluxError::Empty)
        ));
    }

    #[test]
    fn widths() {
        let t = table();
        assert_eq!(t.bin_width(0), Some(0.5));
        assert_eq!(t.bin_width(2), Some(1.));
        assert_eq!(t.bin_width(3), Some(1.));
        assert_eq!(t.bin_width(4), None);
        assert_eq!(t.upper_edge(), Some(3.));
        let t = t.with_upper_edge(2.5).unwrap();
        assert_eq!(t.bin_width(3), Some(0.5));
        assert_eq!(t.all_edges(), Some(vec![0., 0.5, 1., 2., 2.5]));
        let single = FluxTable::new([(1., 1.)]).unwrap();
        assert_eq!(single.upper_edge(), None);
    }

    #[test]
    fn find_bin() {
        let t = table();
        assert_eq!(t.find_bin(-0.1), None);
        assert_eq!(t.find_bin(0.), Some(0));
        assert_eq!(t.find_bin(0.7), Some(1));
        assert_eq!(t.find_bin(1.), Some(2));
        assert_eq!(t.find_bin(2.9), Some(3));
        assert_eq!(t.find_bin(3.), None);
        assert_eq!(t.value_at(1.5), Some(3.));
    }

    #[test]
    fn transforms() {
        let t = table().zero_below(NEUT_THRESHOLD);
        assert_eq!(t.values(), [0., 2., 3., 4.]);
        let t = t.to_mev();
        assert_eq!(t.edges(), [0., 500., 1000., 2000.]);
        assert_eq!(t.upper_edge(), Some(3000.));
        let t = t.divide(2.).scale(4.);
        assert_eq!(t.values(), [0., 4., 6., 8.]);
        assert_eq!(t.integral(), 18.);
        let n = FluxTable::new([(0., 1.), (1., 1.), (2., 2.)]).unwrap();
        assert_eq!(n.normalized().values(), [0.25, 0.25, 0.5]);
        assert_eq!(FluxTable::new([(0., 0.)]).unwrap().normalized().integral(), 0.);
    }

    #[test]
    fn neut_threshold() {
        let t = FluxTable::new([(0.05, 7.), (0.15, 8.)]).unwrap();
        let t = t.zero_below(NEUT_THRESHOLD);
        assert_eq!(t.values(), [0., 8.]);
    }

    #[test]
    fn rebin() {
        let t = table();
        let r = t.rebin_to(&[0., 1., 3.]).unwrap();
        assert_eq!(r.edges(), [0., 1.]);
        assert_eq!(r.values(), [3., 7.]);
        assert_eq!(r.upper_edge(), Some(3.));

        let r = t.rebin_to(&[0.5, 1.5]).unwrap();
        assert_eq!(r.values(), [5.]);

        assert!(matches!(t.rebin_to(&[1.]), Err(FluxError::TooFewEdges(1))));
        assert!(t.rebin_to(&[1., 0.]).is_err());
    }

    #[test]
    fn serde() {
        let t = table().with_upper_edge(4.).unwrap();
        let yaml = serde_yaml::to_string(&t).unwrap();
        let back: FluxTable = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, t);
        let bad = "edges: [1.0, 0.0]\nvalues: [1.0, 2.0]\n";
        assert!(serde_yaml::from_str::<FluxTable>(bad).is_err());
    }
}
