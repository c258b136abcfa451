//! vfsearch - case-insensitive resource lookup for game data.
//!
//! This library presents one flat namespace of logical resource names over
//! on-disk directories, archive containers, individually registered archive
//! members and loose patch files that override packaged content.
//!
//! # Architecture
//!
//! ```text
//!  add_dir ──► discovery ──┐
//!  add_file / add_archive ─┤
//!  load_zix ──► ZixParser ─┼──► override table ──► has_file / open_file
//!  add_patch ──────────────┘    (NameKey → Entry)
//! ```
//!
//! All registrations write into the same table with "last write wins"
//! semantics; callers get precedence by registering general sources first and
//! patches last.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use vfsearch::{MemoryArchive, Resolver};
//!
//! let archive = Arc::new(MemoryArchive::new("base.zfs").with_member("Intro.scr", &b"v1"[..]));
//!
//! let mut resolver = Resolver::new(".", 2);
//! resolver.add_archive(archive);
//!
//! assert!(resolver.has_file("INTRO.SCR"));
//! assert!(!resolver.has_file("outro.scr"));
//! ```

pub mod archive;
pub mod config;
pub mod discovery;
pub mod error;
pub mod handle;
pub mod name;
pub mod resolver;
pub mod source;
pub mod zix;

pub use archive::{
    Archive, ArchiveError, ArchiveLoader, ArchiveLoaders, ArchiveRef, ArchiveRegistry, DirArchive,
    MemoryArchive,
};
pub use config::{default_config_path, ConfigError, ResolverConfig};
pub use discovery::{discover, discover_skipping, DiscoveredFile, Discovery};
pub use error::{ResolverError, ResolverResult};
pub use handle::{FileHandle, ReadSeek};
pub use name::NameKey;
pub use resolver::Resolver;
pub use source::{Entry, FileSource, SourceKind};
pub use zix::{SectionedZixParser, ZixError, ZixIndex, ZixParser, ZixRecord};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
