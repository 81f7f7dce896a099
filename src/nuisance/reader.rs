use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use audec::auto_decompress;
use log::debug;
use serde::Deserialize;
use thiserror::Error;

use crate::nuisance::record::FlatTreeRecord;
use crate::raw::RawEvent;

/// Error reading NUISANCE flat-tree records
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("I/O error")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse record {record}")]
    Parse {
        record: usize,
        source: serde_yaml::Error,
    },
    #[error("Malformed record {record}: {reason}")]
    MalformedRecord { record: usize, reason: String },
}

/// Reader for a YAML stream of [FlatTreeRecord]s
///
/// Each document in the stream is one event. Event numbers count the
/// records, starting from zero.
pub struct Reader<'de> {
    documents: serde_yaml::Deserializer<'de>,
    record: usize,
}

pub type FileReader = Reader<'static>;

impl FileReader {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        let path = path.as_ref();
        debug!("Reading NUISANCE flat tree records from {path:?}");
        let file = File::open(path)?;
        Ok(Reader::from_reader(auto_decompress(BufReader::new(file))))
    }
}

impl<'de> Reader<'de> {
    pub fn from_reader<R: Read + 'de>(source: R) -> Self {
        Self {
            documents: serde_yaml::Deserializer::from_reader(source),
            record: 0,
        }
    }

    pub fn from_text(source: &'de str) -> Self {
        Self {
            documents: serde_yaml::Deserializer::from_str(source),
            record: 0,
        }
    }
}

impl<'de> Iterator for Reader<'de> {
    type Item = Result<RawEvent, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        let document = self.documents.next()?;
        let record = self.record;
        self.record += 1;
        let res = FlatTreeRecord::deserialize(document)
            .map_err(|source| ReadError::Parse { record, source })
            .and_then(|rec| {
                rec.into_raw_event(record as u64).map_err(|reason| {
                    ReadError::MalformedRecord { record, reason }
                })
            });
        Some(res)
    }
}
