use super::TableSource;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A table stored in a local file. Paths ending in `.gz` are read and
/// written gzip-compressed.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn is_gzip(&self) -> bool {
        self.path.extension().and_then(|e| e.to_str()) == Some("gz")
    }
}

impl TableSource for FileSource {
    fn location(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> io::Result<Box<dyn Read>> {
        let file = BufReader::new(File::open(&self.path)?);
        if self.is_gzip() {
            Ok(Box::new(GzDecoder::new(file)))
        } else {
            Ok(Box::new(file))
        }
    }

    fn store(&self, bytes: &[u8]) -> io::Result<()> {
        debug!(path = %self.path.display(), bytes = bytes.len(), gzip = self.is_gzip(), "Writing table");

        if self.is_gzip() {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(bytes)?;
            let compressed = encoder.finish()?;
            fs::write(&self.path, compressed)
        } else {
            fs::write(&self.path, bytes)
        }
    }
}
