/// Flat-tree records as written by NUISANCE
pub mod record;
/// Reader for streams of flat-tree records
pub mod reader;

pub use reader::{FileReader, ReadError, Reader};
pub use record::FlatTreeRecord;
