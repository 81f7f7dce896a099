/// Reader for GiBUU `FinalEvents.dat` files
pub mod reader;

pub use reader::{FileReader, ReadError, Reader};
