use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use audec::auto_decompress;
use log::debug;
use serde::Deserialize;
use thiserror::Error;

use crate::convenient::record::{ConvenientRecord, RecordError};
use crate::convenient::Header;
use crate::event::Event;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("I/O error")]
    Io(#[from] std::io::Error),
    #[error("Missing header")]
    MissingHeader,
    #[error("Failed to parse header")]
    Header(#[source] serde_yaml::Error),
    #[error("Failed to parse event record {record}")]
    Parse {
        record: usize,
        source: serde_yaml::Error,
    },
    #[error("Invalid event record {record}")]
    Invalid { record: usize, source: RecordError },
}

/// Reader for Convenient files
///
/// The header is read on construction, events are read on iteration.
pub struct Reader<'de> {
    header: Header,
    documents: serde_yaml::Deserializer<'de>,
    record: usize,
}

pub type FileReader = Reader<'static>;

impl FileReader {
    /// Open a (potentially compressed) Convenient file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ReadError> {
        let path = path.as_ref();
        debug!("Reading Convenient events from {path:?}");
        let file = File::open(path)?;
        Reader::from_reader(auto_decompress(BufReader::new(file)))
    }
}

impl<'de> Reader<'de> {
    pub fn from_reader<R: Read + 'de>(source: R) -> Result<Self, ReadError> {
        Self::from_documents(serde_yaml::Deserializer::from_reader(source))
    }

    pub fn from_text(source: &'de str) -> Result<Self, ReadError> {
        Self::from_documents(serde_yaml::Deserializer::from_str(source))
    }

    fn from_documents(
        mut documents: serde_yaml::Deserializer<'de>,
    ) -> Result<Self, ReadError> {
        let header = documents.next().ok_or(ReadError::MissingHeader)?;
        let header = Header::deserialize(header).map_err(ReadError::Header)?;
        debug!("Header: {header:?}");
        Ok(Self {
            header,
            documents,
            record: 0,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }
}

impl<'de> Iterator for Reader<'de> {
    type Item = Result<Event, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        let document = self.documents.next()?;
        let record = self.record;
        self.record += 1;
        let res = ConvenientRecord::deserialize(document)
            .map_err(|source| ReadError::Parse { record, source })
            .and_then(|rec| {
                Event::try_from(rec)
                    .map_err(|source| ReadError::Invalid { record, source })
            });
        Some(res)
    }
}
