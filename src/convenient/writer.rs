use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;
use serde::Serialize;
use thiserror::Error;

use crate::compression::{compress_writer, CompressWriter, Compression};
use crate::file::{OutputError, OutputFile};
use crate::convenient::record::ConvenientRecord;
use crate::convenient::Header;
use crate::event::Event;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("I/O error")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialise")]
    Serialize(#[from] serde_yaml::Error),
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Writer for a Convenient event stream
///
/// The header is written on construction, followed by one document per
/// event.
pub struct Writer<W: Write> {
    serializer: serde_yaml::Serializer<W>,
    nevents: usize,
}

impl<W: Write> Writer<W> {
    pub fn new(writer: W, header: &Header) -> Result<Self, WriteError> {
        let mut serializer = serde_yaml::Serializer::new(writer);
        header.serialize(&mut serializer)?;
        Ok(Self {
            serializer,
            nevents: 0,
        })
    }

    pub fn write(&mut self, event: &Event) -> Result<(), WriteError> {
        ConvenientRecord::from(event).serialize(&mut self.serializer)?;
        self.nevents += 1;
        Ok(())
    }

    /// Number of events written so far
    pub fn nevents(&self) -> usize {
        self.nevents
    }

    /// Flush all output and return the underlying writer
    pub fn finish(self) -> Result<W, WriteError> {
        let mut writer = self.serializer.into_inner()?;
        writer.flush()?;
        Ok(writer)
    }
}

/// Writer for a Convenient file
///
/// The target file only appears once [FileWriter::finish] succeeds, see
/// [OutputFile].
pub struct FileWriter {
    writer: Writer<CompressWriter<BufWriter<File>>>,
    out: OutputFile,
}

impl FileWriter {
    pub fn create<P: AsRef<Path>>(
        path: P,
        compression: Option<Compression>,
        header: &Header,
    ) -> Result<Self, WriteError> {
        let out = OutputFile::create(path)?;
        let file = out.handle()?;
        let sink = compress_writer(BufWriter::new(file), compression)?;
        let writer = Writer::new(sink, header)?;
        Ok(Self { writer, out })
    }

    pub fn write(&mut self, event: &Event) -> Result<(), WriteError> {
        self.writer.write(event)
    }

    pub fn nevents(&self) -> usize {
        self.writer.nevents()
    }

    /// Complete the output and move it to the target path
    ///
    /// Returns the number of written events.
    pub fn finish(self) -> Result<usize, WriteError> {
        let nevents = self.writer.nevents();
        let sink = self.writer.finish()?;
        sink.finish()?;
        debug!("Wrote {nevents} events to {:?}", self.out.target());
        self.out.persist()?;
        Ok(nevents)
    }
}
