use std::fmt::Write;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum HistogramError {
    #[error("At least two bin edges are required, found {0}")]
    TooFewEdges(usize),
    #[error("Bin edges not strictly increasing at edge {0}")]
    NonIncreasingEdges(usize),
    #[error("Non-finite bin edge {0}")]
    NotFinite(usize),
    #[error("Invalid uniform binning: {nbins} bins in [{min}, {max})")]
    InvalidRange { nbins: usize, min: f64, max: f64 },
}

/// A one-dimensional weighted histogram
///
/// Bins are half-open intervals `[lower, upper)`. Entries outside the
/// binned range are collected in underflow and overflow.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Histogram {
    edges: Vec<f64>,
    contents: Vec<f64>,
    sumw2: Vec<f64>,
    underflow: f64,
    overflow: f64,
    entries: usize,
}

impl Histogram {
    /// Create an empty histogram with the given bin edges
    pub fn new(edges: Vec<f64>) -> Result<Self, HistogramError> {
        if edges.len() < 2 {
            return Err(HistogramError::TooFewEdges(edges.len()));
        }
        if let Some(pos) = edges.iter().position(|e| !e.is_finite()) {
            return Err(HistogramError::NotFinite(pos));
        }
        if let Some(pos) = edges.windows(2).position(|w| w[0] >= w[1]) {
            return Err(HistogramError::NonIncreasingEdges(pos + 1));
        }
        let nbins = edges.len() - 1;
        Ok(Self {
            edges,
            contents: vec![0.; nbins],
            sumw2: vec![0.; nbins],
            underflow: 0.,
            overflow: 0.,
            entries: 0,
        })
    }

    /// Create an empty histogram with `nbins` bins of equal width
    pub fn uniform(nbins: usize, min: f64, max: f64) -> Result<Self, HistogramError> {
        if nbins == 0 || !(min < max) {
            return Err(HistogramError::InvalidRange { nbins, min, max });
        }
        let width = (max - min) / nbins as f64;
        let mut edges: Vec<_> =
            (0..nbins).map(|i| min + i as f64 * width).collect();
        edges.push(max);
        Self::new(edges)
    }

    pub fn nbins(&self) -> usize {
        self.contents.len()
    }

    /// All bin edges, including the upper edge of the last bin
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn contents(&self) -> &[f64] {
        &self.contents
    }

    /// Sum of squared weights per bin
    pub fn sumw2(&self) -> &[f64] {
        &self.sumw2
    }

    /// Statistical uncertainty per bin
    pub fn errors(&self) -> impl Iterator<Item = f64> + '_ {
        self.sumw2.iter().map(|w2| w2.sqrt())
    }

    pub fn underflow(&self) -> f64 {
        self.underflow
    }

    pub fn overflow(&self) -> f64 {
        self.overflow
    }

    /// Number of fill calls with a finite value
    pub fn entries(&self) -> usize {
        self.entries
    }

    pub fn bin_width(&self, bin: usize) -> Option<f64> {
        let lower = self.edges.get(bin)?;
        let upper = self.edges.get(bin + 1)?;
        Some(upper - lower)
    }

    /// Index of the bin containing `x`
    pub fn find_bin(&self, x: f64) -> Option<usize> {
        let nbins = self.nbins();
        if !(x >= self.edges[0] && x < self.edges[nbins]) {
            return None;
        }
        Some(self.edges.partition_point(|&e| e <= x) - 1)
    }

    /// Add an entry with value `x` and weight `w`
    ///
    /// Returns the index of the filled bin, or `None` if the entry
    /// ended up in underflow or overflow. Non-finite values are ignored.
    pub fn fill(&mut self, x: f64, w: f64) -> Option<usize> {
        if !x.is_finite() {
            return None;
        }
        self.entries += 1;
        match self.find_bin(x) {
            Some(bin) => {
                self.fill_bin(bin, w);
                Some(bin)
            }
            None => {
                if x < self.edges[0] {
                    self.underflow += w;
                } else {
                    self.overflow += w;
                }
                None
            }
        }
    }

    /// Add weight `w` to the given bin
    ///
    /// # Panics
    ///
    /// Panics if `bin` is out of range.
    pub fn fill_bin(&mut self, bin: usize, w: f64) {
        self.contents[bin] += w;
        self.sumw2[bin] += w * w;
    }

    /// Sum of all bin contents, excluding underflow and overflow
    pub fn integral(&self) -> f64 {
        self.contents.iter().sum()
    }

    /// Multiply all contents by a constant factor
    pub fn scale(&mut self, factor: f64) {
        for c in &mut self.contents {
            *c *= factor;
        }
        for w2 in &mut self.sumw2 {
            *w2 *= factor * factor;
        }
        self.underflow *= factor;
        self.overflow *= factor;
    }

    /// Divide each bin content by its width
    pub fn divide_by_width(&mut self) {
        for (bin, w) in self.edges.windows(2).enumerate() {
            let width = w[1] - w[0];
            self.contents[bin] /= width;
            self.sumw2[bin] /= width * width;
        }
    }

    /// Write as edge-value table with uncertainties
    ///
    /// Each line holds `<lower edge><TAB><content><TAB><error>`. The last
    /// line gives the upper edge of the last bin, with vanishing content
    /// and error.
    pub fn to_edge_value_table(&self) -> String {
        let mut text = String::new();
        for ((lower, content), err) in
            self.edges.iter().zip(&self.contents).zip(self.errors())
        {
            // writing to a String cannot fail
            let _ = writeln!(text, "{lower:e}\t{content:e}\t{err:e}");
        }
        let upper = self.edges[self.nbins()];
        let _ = writeln!(text, "{upper:e}\t0e0\t0e0");
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction() {
        assert_eq!(
            Histogram::new(vec![0.]),
            Err(HistogramError::TooFewEdges(1))
        );
        assert_eq!(
            Histogram::new(vec![0., 1., 1.]),
            Err(HistogramError::NonIncreasingEdges(2))
        );
        assert_eq!(
            Histogram::new(vec![0., f64::INFINITY]),
            Err(HistogramError::NotFinite(1))
        );
        assert!(Histogram::uniform(0, 0., 1.).is_err());
        assert!(Histogram::uniform(2, 1., 1.).is_err());

        let hist = Histogram::uniform(4, 0., 2.).unwrap();
        assert_eq!(hist.edges(), &[0., 0.5, 1., 1.5, 2.]);
        assert_eq!(hist.nbins(), 4);
        assert_eq!(hist.bin_width(3), Some(0.5));
        assert_eq!(hist.bin_width(4), None);
    }

    #[test]
    fn fill() {
        let mut hist = Histogram::new(vec![0., 1., 3.]).unwrap();
        assert_eq!(hist.fill(0., 1.), Some(0));
        assert_eq!(hist.fill(0.5, 2.), Some(0));
        assert_eq!(hist.fill(1., 4.), Some(1));
        assert_eq!(hist.fill(3., 8.), None);
        assert_eq!(hist.fill(-1., 16.), None);
        assert_eq!(hist.fill(f64::NAN, 32.), None);
        assert_eq!(hist.contents(), &[3., 4.]);
        assert_eq!(hist.sumw2(), &[5., 16.]);
        assert_eq!(hist.overflow(), 8.);
        assert_eq!(hist.underflow(), 16.);
        assert_eq!(hist.entries(), 5);
        assert_eq!(hist.integral(), 7.);

        hist.divide_by_width();
        assert_eq!(hist.contents(), &[3., 2.]);
        assert_eq!(hist.sumw2(), &[5., 4.]);
        hist.scale(2.);
        assert_eq!(hist.contents(), &[6., 4.]);
        assert_eq!(hist.sumw2(), &[20., 16.]);
        assert_eq!(hist.errors().nth(1), Some(4.));
    }

    #[test]
    fn text_output() {
        let mut hist = Histogram::new(vec![0., 0.5, 1.]).unwrap();
        hist.fill(0.7, 2e-38);
        assert_eq!(
            hist.to_edge_value_table(),
            "0e0\t0e0\t0e0\n5e-1\t2e-38\t2e-38\n1e0\t0e0\t0e0\n"
        );
    }
}
