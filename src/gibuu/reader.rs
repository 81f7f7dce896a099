use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use audec::auto_decompress;
use log::debug;
use nom::sequence::tuple;
use thiserror::Error;

use crate::four_vector::FourVector;
use crate::parsing::{
    describe, double_entry, first_u32, i32_entry, i64_entry, line_end,
    u64_entry,
};
use crate::raw::RawParticle;

/// Error reading GiBUU output
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("I/O error")]
    Io(#[from] std::io::Error),
    #[error("Malformed record in line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },
}

/// Reader for the particle rows of GiBUU's `FinalEvents.dat`
///
/// Each row has the 15 columns
///
/// `run event ID charge perweight x y z E px py pz history production_ID Enu`
///
/// Lines starting with `#` and blank lines are skipped.
pub struct Reader<R> {
    lines: Lines<R>,
    line_nr: usize,
}

/// Reader for a single (potentially compressed) GiBUU file
pub type FileReader = Reader<Box<dyn BufRead>>;

impl FileReader {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        let path = path.as_ref();
        debug!("Reading GiBUU events from {path:?}");
        let file = File::open(path)?;
        Ok(Reader::new(auto_decompress(BufReader::new(file))))
    }
}

impl<R: BufRead> Reader<R> {
    pub fn new(source: R) -> Self {
        Self {
            lines: source.lines(),
            line_nr: 0,
        }
    }

    /// Number of lines read so far
    pub fn line_nr(&self) -> usize {
        self.line_nr
    }
}

impl<R: BufRead> Iterator for Reader<R> {
    type Item = Result<RawParticle, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(err.into())),
            };
            self.line_nr += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return Some(parse_row(&line).map_err(|reason| {
                ReadError::MalformedRecord {
                    line: self.line_nr,
                    reason,
                }
            }));
        }
    }
}

fn parse_row(line: &str) -> Result<RawParticle, String> {
    let (rest, (run, event, pid, charge, weight)) =
        tuple((first_u32, u64_entry, i32_entry, i32_entry, double_entry))(line)
            .map_err(describe)?;
    let (rest, (x, y, z, e, px, py, pz)) = tuple((
        double_entry,
        double_entry,
        double_entry,
        double_entry,
        double_entry,
        double_entry,
        double_entry,
    ))(rest)
    .map_err(describe)?;
    let (rest, (history, production_id, neutrino_energy)) =
        tuple((i64_entry, i32_entry, double_entry))(rest).map_err(describe)?;
    line_end(rest).map_err(|_| {
        format!("expected 15 columns, found trailing {:?}", rest.trim())
    })?;
    let momentum =
        FourVector::try_new(e, px, py, pz).map_err(|err| err.to_string())?;
    Ok(RawParticle {
        run,
        event,
        pid,
        charge,
        weight,
        position: [x, y, z],
        momentum,
        history,
        production_id,
        neutrino_energy,
    })
}
