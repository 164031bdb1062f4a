use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

/// A readable image the caller opened for compositing.
///
/// `open` may be called more than once: once to decode pixels and again to
/// read metadata from the designated source.
pub trait ImageSource: Send + Sync {
    /// Human-readable identifier used in logs and reports.
    fn name(&self) -> String;

    /// Open a fresh stream positioned at the start of the encoded image.
    fn open(&self) -> std::io::Result<Box<dyn Read + '_>>;

    /// Read the whole encoded image.
    fn read_all(&self) -> std::io::Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.open()?.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

/// An image file on disk.
#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ImageSource for FileSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn open(&self) -> std::io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(BufReader::new(File::open(&self.path)?)))
    }
}

/// An encoded image held in memory.
#[derive(Clone, Debug)]
pub struct MemorySource {
    name: String,
    bytes: Vec<u8>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

impl ImageSource for MemorySource {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn open(&self) -> std::io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(Cursor::new(self.bytes.as_slice())))
    }

    fn read_all(&self) -> std::io::Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}
