use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use audec::auto_decompress;
use itertools::Itertools;
use log::debug;
use nom::sequence::tuple;

use crate::flux::{FluxError, FluxTable};
use crate::parsing::{double_entry, first_double, line_end};

/// Meaning of the last row of an edge-value table
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum LastRow {
    /// The last row is a bin like all others
    #[default]
    Bin,
    /// The last row only gives the upper edge of the last bin
    Edge,
}

/// Read an edge-value table
///
/// Each line has the form `<lower bin edge><TAB><value>`. Blank lines are
/// ignored.
pub fn read_edge_value_table<R: BufRead>(
    reader: R,
    last_row: LastRow,
) -> Result<FluxTable, FluxError> {
    let mut bins = Vec::new();
    for (nr, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let parsed = tuple((first_double, double_entry))(&line)
            .and_then(|(rest, bin)| line_end(rest).map(|_| bin));
        match parsed {
            Ok(bin) => bins.push(bin),
            Err(_) => {
                return Err(FluxError::MalformedLine {
                    line: nr + 1,
                    content: line,
                })
            }
        }
    }
    debug!("Read {} flux table rows", bins.len());
    match last_row {
        LastRow::Bin => FluxTable::new(bins),
        LastRow::Edge => {
            let Some((upper, _)) = bins.pop() else {
                return Err(FluxError::TooFewEdges(0));
            };
            if bins.is_empty() {
                return Err(FluxError::TooFewEdges(1));
            }
            FluxTable::new(bins)?.with_upper_edge(upper)
        }
    }
}

/// Read an edge-value table from a (potentially compressed) file
pub fn read_edge_value_file<P: AsRef<Path>>(
    path: P,
    last_row: LastRow,
) -> Result<FluxTable, FluxError> {
    let path = path.as_ref();
    debug!("Reading flux from {path:?}");
    let file = File::open(path)?;
    read_edge_value_table(auto_decompress(BufReader::new(file)), last_row)
}

/// Parse an edge-value table from a string
pub fn parse_edge_value_table(
    text: &str,
    last_row: LastRow,
) -> Result<FluxTable, FluxError> {
    read_edge_value_table(text.as_bytes(), last_row)
}

/// Write a table in edge-value format
///
/// Numbers are written with six decimal places, after which trailing
/// zeros and a trailing decimal point are removed. An explicit upper
/// edge is not written.
pub fn write_edge_value_table(table: &FluxTable) -> String {
    let mut text = String::new();
    for (edge, value) in table.bins() {
        text += &format_stripped(edge);
        text.push('\t');
        text += &format_stripped(value);
        text.push('\n');
    }
    text
}

/// Write a table in NuWro's beam energy format
///
/// The output is the single line `E_min E_max v1 ... vn`, with energies
/// converted from GeV to MeV and truncated to integers.
pub fn write_nuwro_table(table: &FluxTable) -> Result<String, FluxError> {
    if table.is_empty() {
        return Err(FluxError::Empty);
    }
    let table = table.clone().to_mev();
    let Some(upper) = table.upper_edge() else {
        return Err(FluxError::TooFewEdges(1));
    };
    let e_min = table.edges()[0].trunc() as i64;
    let e_max = upper.trunc() as i64;
    let values = table.values().iter().join(" ");
    Ok(format!("{e_min} {e_max} {values}\n"))
}

/// Format with six decimal places and strip trailing zeros
///
/// If only the decimal point remains after the last digit, it is
/// removed as well.
pub fn format_stripped(x: f64) -> String {
    let formatted = format!("{x:.6}");
    let stripped = formatted.trim_end_matches('0');
    stripped.strip_suffix('.').unwrap_or(stripped).to_owned()
}
