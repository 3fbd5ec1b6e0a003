//! Storage boundary for the tabular source.
//!
//! Every blocking read or write of the table goes through [`TableSource`],
//! so the rest of the engine stays pure over in-memory snapshots.

mod file;

pub use file::FileSource;

use std::io::{self, Read};
use std::path::Path;

pub trait TableSource {
    /// Where the table lives, for error reports and logs.
    fn location(&self) -> &Path;

    /// Opens the table for reading from the first byte.
    fn open(&self) -> io::Result<Box<dyn Read>>;

    /// Replaces the whole table with `bytes`.
    fn store(&self, bytes: &[u8]) -> io::Result<()>;
}
