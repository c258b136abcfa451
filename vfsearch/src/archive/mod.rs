//! Archive containers the resolver can serve members from.
//!
//! The resolver never parses container formats itself. It talks to archives
//! through the [`Archive`] trait and keeps them in an [`ArchiveRegistry`] as
//! shared `Arc<dyn Archive>` references, so the caller stays free to keep and
//! reuse the same archive elsewhere.
//!
//! # Built-in archives
//!
//! - [`DirArchive`]: the immediate files of one directory
//! - [`MemoryArchive`]: members held in memory
//!
//! Container files found while scanning directories are mounted through
//! [`ArchiveLoader`]s registered per glob pattern (see [`ArchiveLoaders`]).

mod dir;
mod loader;
mod memory;

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::handle::FileHandle;
use crate::name::normalize_archive_path;

pub use dir::DirArchive;
pub use loader::{ArchiveLoader, ArchiveLoaders};
pub use memory::MemoryArchive;

/// Errors raised by archive implementations.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The archive has no member with this name.
    #[error("member '{member}' not found in archive '{archive}'")]
    MemberNotFound { archive: String, member: String },

    /// Reading the archive or one of its members failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A loader could not turn a container file into an archive.
    #[error("failed to load archive {path}: {reason}")]
    LoadFailed { path: PathBuf, reason: String },
}

/// A read-only container exposing named member files.
pub trait Archive: Send + Sync + fmt::Debug {
    /// Name the archive is known by (used by bulk indexes to refer to it).
    fn name(&self) -> &str;

    /// Names of every member, as the archive spells them.
    fn list_members(&self) -> Vec<String>;

    /// Whether a member exists (case-insensitive).
    fn has_member(&self, member: &str) -> bool;

    /// Open one member for reading.
    fn open_member(&self, member: &str) -> Result<FileHandle, ArchiveError>;
}

/// How an index record refers to an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveRef {
    /// By archive name, compared case-insensitively after path normalization.
    Name(String),

    /// By zero-based position in the registry.
    Position(usize),
}

impl fmt::Display for ArchiveRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveRef::Name(name) => write!(f, "'{}'", name),
            ArchiveRef::Position(pos) => write!(f, "#{}", pos),
        }
    }
}

/// An archive plus the extra logical paths it is known by.
#[derive(Debug, Clone)]
struct Tracked {
    archive: Arc<dyn Archive>,
    aliases: Vec<String>,
}

fn lookup_key(name: &str) -> String {
    normalize_archive_path(name).to_lowercase()
}

/// Ordered list of the archives known to a resolver.
///
/// Archives are referenced, never owned exclusively. The same archive (by
/// pointer identity) is tracked only once. Besides its own name, an archive
/// can be found by any logical path it was mounted under.
#[derive(Debug, Default, Clone)]
pub struct ArchiveRegistry {
    archives: Vec<Tracked>,
}

impl ArchiveRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Track an archive, returning its position.
    ///
    /// An archive that is already tracked keeps its original position.
    pub fn insert(&mut self, archive: Arc<dyn Archive>) -> usize {
        if let Some(pos) = self.position_of(&archive) {
            return pos;
        }
        self.archives.push(Tracked {
            archive,
            aliases: Vec::new(),
        });
        self.archives.len() - 1
    }

    /// Track an archive and make it findable under `logical` as well.
    ///
    /// Used for containers mounted from a directory scan, whose own name is
    /// whatever the loader chose while indexes refer to them by path.
    pub fn insert_as(&mut self, archive: Arc<dyn Archive>, logical: &str) -> usize {
        let pos = self.insert(archive);
        let key = lookup_key(logical);
        let aliases = &mut self.archives[pos].aliases;
        if !key.is_empty() && !aliases.contains(&key) {
            aliases.push(key);
        }
        pos
    }

    /// Position of an already tracked archive.
    pub fn position_of(&self, archive: &Arc<dyn Archive>) -> Option<usize> {
        self.archives
            .iter()
            .position(|t| Arc::ptr_eq(&t.archive, archive))
    }

    /// Whether the archive is tracked.
    pub fn contains(&self, archive: &Arc<dyn Archive>) -> bool {
        self.position_of(archive).is_some()
    }

    /// Look an archive up by name or mounted path.
    ///
    /// When several archives match, the most recently added wins.
    pub fn find_by_name(&self, name: &str) -> Option<&Arc<dyn Archive>> {
        let wanted = lookup_key(name);
        self.archives
            .iter()
            .rev()
            .find(|t| lookup_key(t.archive.name()) == wanted || t.aliases.contains(&wanted))
            .map(|t| &t.archive)
    }

    /// Resolve an index reference to a tracked archive.
    pub fn resolve(&self, reference: &ArchiveRef) -> Option<&Arc<dyn Archive>> {
        match reference {
            ArchiveRef::Name(name) => self.find_by_name(name),
            ArchiveRef::Position(pos) => self.archives.get(*pos).map(|t| &t.archive),
        }
    }

    /// Number of tracked archives.
    pub fn len(&self) -> usize {
        self.archives.len()
    }

    /// Whether no archive is tracked.
    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }

    /// Iterate over archives in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Archive>> {
        self.archives.iter().map(|t| &t.archive)
    }
}
