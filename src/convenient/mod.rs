/// Reader for Convenient files
pub mod reader;
/// Event records in the Convenient format
pub mod record;
/// Writer for Convenient files
pub mod writer;

pub use reader::{FileReader, ReadError, Reader};
pub use record::{ConvenientRecord, RecordError};
pub use writer::{FileWriter, WriteError, Writer};

use serde::{Deserialize, Serialize};

use crate::flux::FluxTable;
use crate::generator::Generator;

/// First document of a Convenient file
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Header {
    /// The generator that produced the events
    pub generator: Generator,
    /// Version of the program that wrote the file
    pub version: String,
    /// Flux used to generate the events
    #[serde(
        rename = "FlatTree_FLUX",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub flux: Option<FluxTable>,
}

impl Header {
    pub fn new(generator: Generator) -> Self {
        Self {
            generator,
            version: crate::VERSION.to_owned(),
            flux: None,
        }
    }

    pub fn with_flux(mut self, flux: FluxTable) -> Self {
        self.flux = Some(flux);
        self
    }
}
