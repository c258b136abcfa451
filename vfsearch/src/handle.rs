//! Readable handles returned by resource lookups.

use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use bytes::Bytes;

/// Anything a [`FileHandle`] can read from.
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

/// Scoped read access to one resolved resource.
///
/// A handle either wraps an open reader or is closed. Dropping the handle
/// (or calling [`close`](Self::close)) releases the reader.
pub struct FileHandle {
    name: String,
    size: u64,
    reader: Option<Box<dyn ReadSeek>>,
}

impl FileHandle {
    /// Create a closed handle.
    ///
    /// Used by callers that keep handle storage themselves and fill it through
    /// [`Resolver::open_file_into`](crate::Resolver::open_file_into).
    pub fn closed() -> Self {
        Self {
            name: String::new(),
            size: 0,
            reader: None,
        }
    }

    /// Wrap an arbitrary reader of known size.
    pub fn new(name: impl Into<String>, size: u64, reader: Box<dyn ReadSeek>) -> Self {
        Self {
            name: name.into(),
            size,
            reader: Some(reader),
        }
    }

    /// Open a file on disk.
    pub fn from_path(name: impl Into<String>, path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let size = file.metadata()?.len();
        Ok(Self::new(name, size, Box::new(file)))
    }

    /// Serve in-memory content.
    pub fn from_bytes(name: impl Into<String>, data: Bytes) -> Self {
        let size = data.len() as u64;
        Self::new(name, size, Box::new(Cursor::new(data)))
    }

    /// Logical name this handle was opened for.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total content size in bytes (0 when closed).
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Whether the handle currently holds a reader.
    pub fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    /// Release the reader and reset the handle to the closed state.
    pub fn close(&mut self) {
        self.reader = None;
        self.name.clear();
        self.size = 0;
    }

    /// Read the remaining content into a vector.
    pub fn read_all(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.size as usize);
        self.read_to_end(&mut buf)?;
        Ok(buf)
    }

    fn reader_mut(&mut self) -> io::Result<&mut Box<dyn ReadSeek>> {
        self.reader
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "file handle is closed"))
    }
}

impl Default for FileHandle {
    fn default() -> Self {
        Self::closed()
    }
}

impl Read for FileHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader_mut()?.read(buf)
    }
}

impl Seek for FileHandle {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.reader_mut()?.seek(pos)
    }
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("open", &self.is_open())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_closed_handle() {
        let mut handle = FileHandle::closed();
        assert!(!handle.is_open());
        assert_eq!(handle.size(), 0);

        let mut buf = [0u8; 4];
        let err = handle.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
    }

    #[test]
    fn test_from_bytes_reads_and_seeks() {
        let mut handle = FileHandle::from_bytes("a.txt", Bytes::from_static(b"hello world"));
        assert!(handle.is_open());
        assert_eq!(handle.size(), 11);
        assert_eq!(handle.name(), "a.txt");

        handle.seek(SeekFrom::Start(6)).unwrap();
        assert_eq!(handle.read_all().unwrap(), b"world");
    }

    #[test]
    fn test_from_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("file.bin");
        std::fs::write(&path, b"on disk").unwrap();

        let mut handle = FileHandle::from_path("file.bin", &path).unwrap();
        assert_eq!(handle.size(), 7);
        assert_eq!(handle.read_all().unwrap(), b"on disk");
    }

    #[test]
    fn test_from_missing_path_fails() {
        let temp = TempDir::new().unwrap();
        assert!(FileHandle::from_path("x", &temp.path().join("missing")).is_err());
    }

    #[test]
    fn test_close_releases_reader() {
        let mut handle = FileHandle::from_bytes("a", Bytes::from_static(b"abc"));
        handle.close();
        assert!(!handle.is_open());
        assert_eq!(handle.name(), "");
    }
}
