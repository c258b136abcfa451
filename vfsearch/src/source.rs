//! Sources an entry can resolve to.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::archive::Archive;

/// Kind of source behind an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A member inside an archive.
    Archive,

    /// A file on disk (directory scans and patches).
    Path,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Archive => write!(f, "archive"),
            SourceKind::Path => write!(f, "path"),
        }
    }
}

/// Where the content of a logical name currently comes from.
#[derive(Debug, Clone)]
pub enum FileSource {
    /// A member of a tracked archive.
    Archive {
        archive: Arc<dyn Archive>,
        member: String,
    },

    /// A file on disk.
    Path(PathBuf),
}

impl FileSource {
    /// Create an archive-backed source.
    pub fn archive(archive: Arc<dyn Archive>, member: impl Into<String>) -> Self {
        FileSource::Archive {
            archive,
            member: member.into(),
        }
    }

    /// Create a direct filesystem source.
    pub fn path(path: impl Into<PathBuf>) -> Self {
        FileSource::Path(path.into())
    }

    /// Kind of this source.
    pub fn kind(&self) -> SourceKind {
        match self {
            FileSource::Archive { .. } => SourceKind::Archive,
            FileSource::Path(_) => SourceKind::Path,
        }
    }

    /// The filesystem path, for path sources.
    pub fn real_path(&self) -> Option<&Path> {
        match self {
            FileSource::Path(path) => Some(path.as_path()),
            FileSource::Archive { .. } => None,
        }
    }

    /// The archive, for archive sources.
    pub fn archive_ref(&self) -> Option<&Arc<dyn Archive>> {
        match self {
            FileSource::Archive { archive, .. } => Some(archive),
            FileSource::Path(_) => None,
        }
    }
}

impl fmt::Display for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSource::Archive { archive, member } => {
                write!(f, "{}:{}", archive.name(), member)
            }
            FileSource::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// One row of the override table: a logical name and its winning source.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Name as spelled by the registration that won.
    pub name: String,

    /// Where the content comes from.
    pub source: FileSource,
}

impl Entry {
    /// Create a new entry.
    pub fn new(name: impl Into<String>, source: FileSource) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }

    /// Kind of the winning source.
    pub fn kind(&self) -> SourceKind {
        self.source.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::MemoryArchive;

    #[test]
    fn test_source_kind_display() {
        assert_eq!(SourceKind::Archive.to_string(), "archive");
        assert_eq!(SourceKind::Path.to_string(), "path");
    }

    #[test]
    fn test_path_source() {
        let source = FileSource::path("/patches/a.txt");
        assert_eq!(source.kind(), SourceKind::Path);
        assert_eq!(source.real_path(), Some(Path::new("/patches/a.txt")));
        assert!(source.archive_ref().is_none());
        assert_eq!(source.to_string(), "/patches/a.txt");
    }

    #[test]
    fn test_archive_source() {
        let archive: Arc<dyn Archive> = Arc::new(MemoryArchive::new("data.zfs"));
        let source = FileSource::archive(archive.clone(), "intro.scr");

        assert_eq!(source.kind(), SourceKind::Archive);
        assert!(source.real_path().is_none());
        assert!(Arc::ptr_eq(source.archive_ref().unwrap(), &archive));
        assert_eq!(source.to_string(), "data.zfs:intro.scr");
    }

    #[test]
    fn test_entry_kind() {
        let entry = Entry::new("A.txt", FileSource::path("/x/a.txt"));
        assert_eq!(entry.kind(), SourceKind::Path);
        assert_eq!(entry.name, "A.txt");
    }
}
