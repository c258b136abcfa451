//! The resolver: one flat, case-insensitive namespace over directories,
//! archives, patches and bulk indexes.
//!
//! Every registration path performs the same upsert into a single override
//! table keyed by [`NameKey`]: the last registration of a name wins,
//! regardless of what kind of source it brings. Precedence is therefore the
//! caller's call order. The usual setup registers general directories first,
//! then archives and indexes, then patches last so that they win.
//!
//! The resolver tracks archives by shared reference and never assumes it is
//! their only owner. It is not synchronized: finish registration before
//! querying from another thread, or wrap it in a lock.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use glob::PatternError;

use crate::archive::{Archive, ArchiveLoader, ArchiveLoaders, ArchiveRegistry, DirArchive};
use crate::config::ResolverConfig;
use crate::discovery::{discover_skipping, resolve_case_insensitive};
use crate::error::{ResolverError, ResolverResult};
use crate::handle::FileHandle;
use crate::name::{normalize_archive_path, NameKey};
use crate::source::{Entry, FileSource};
use crate::zix::{SectionedZixParser, ZixParser};

/// Case-insensitive resource resolver.
///
/// # Example
///
/// ```no_run
/// use vfsearch::Resolver;
///
/// let mut resolver = Resolver::new("/games/nemesis", 2);
/// resolver.add_dir("data1");
/// resolver.add_patch("scripts/intro.scr", "/home/me/fixes/intro.scr");
///
/// if let Some(mut handle) = resolver.open_file("SCRIPTS/INTRO.SCR") {
///     let bytes = handle.read_all()?;
///     println!("{} bytes", bytes.len());
/// }
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Resolver {
    /// Base for relative directory and patch paths.
    root: PathBuf,

    /// Levels below a scanned directory that discovery descends.
    depth: usize,

    /// The override table.
    files: HashMap<NameKey, Entry>,

    /// Archives referenced by entries, in registration order.
    archives: ArchiveRegistry,

    /// Canonical paths of every directory already listed, subdirectories
    /// included.
    scanned: HashSet<PathBuf>,

    /// Loaders for container files met during directory scans.
    loaders: ArchiveLoaders,

    /// Parser used by [`load_zix`](Self::load_zix).
    zix_parser: Box<dyn ZixParser>,
}

impl Resolver {
    /// Create an empty resolver.
    ///
    /// `depth` bounds directory discovery: 0 registers only the files
    /// directly inside a scanned directory.
    pub fn new(root: impl Into<PathBuf>, depth: usize) -> Self {
        Self {
            root: root.into(),
            depth,
            files: HashMap::new(),
            archives: ArchiveRegistry::new(),
            scanned: HashSet::new(),
            loaders: ArchiveLoaders::new(),
            zix_parser: Box::new(SectionedZixParser::new()),
        }
    }

    /// Create an empty resolver from configuration.
    ///
    /// Only the root, depth and index options are taken; use
    /// [`ResolverConfig::apply`] to run the configured registrations.
    pub fn with_config(config: &ResolverConfig) -> Self {
        let mut resolver = Self::new(&config.root, config.depth);
        let parser = config
            .zix_strip_prefixes
            .iter()
            .fold(SectionedZixParser::new(), |parser, prefix| {
                parser.with_strip_prefix(prefix.as_str())
            });
        resolver.set_zix_parser(Box::new(parser));
        resolver
    }

    /// Root directory relative names are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Discovery depth bound.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Mount container files matching `pattern` with `loader` during
    /// directory scans.
    pub fn register_loader(
        &mut self,
        pattern: &str,
        loader: Arc<dyn ArchiveLoader>,
    ) -> Result<(), PatternError> {
        self.loaders.register(pattern, loader)
    }

    /// Replace the bulk index parser.
    pub fn set_zix_parser(&mut self, parser: Box<dyn ZixParser>) {
        self.zix_parser = parser;
    }

    // ------------------------------------------------------------------
    // Override table
    // ------------------------------------------------------------------

    /// Bind `name` to `source`, replacing any previous binding.
    fn upsert(&mut self, name: &str, source: FileSource) {
        let key = NameKey::new(name);
        if let Some(previous) = self.files.insert(key, Entry::new(name, source)) {
            tracing::trace!(
                name = %name,
                previous = %previous.source,
                "Overriding existing entry"
            );
        }
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Bind `name` to the member of the same name inside `archive`.
    ///
    /// The archive is tracked if it is not already.
    pub fn add_file(&mut self, name: &str, archive: Arc<dyn Archive>) {
        self.archives.insert(archive.clone());
        self.upsert(name, FileSource::archive(archive, name));
    }

    /// Track `archive` and register every member under its own name.
    ///
    /// Returns the number of entries written.
    pub fn add_archive(&mut self, archive: Arc<dyn Archive>) -> usize {
        self.archives.insert(archive.clone());

        let members = archive.list_members();
        for member in &members {
            self.upsert(member, FileSource::archive(archive.clone(), member.as_str()));
        }

        tracing::debug!(
            archive = %archive.name(),
            members = members.len(),
            "Registered archive members"
        );
        members.len()
    }

    /// Scan a directory and register what it contains.
    ///
    /// `name` is resolved against the root unless absolute. Files become
    /// direct-path entries named by their path relative to the root (or to
    /// the scanned directory when it lies outside the root). Container files
    /// matching a registered loader are mounted and their members registered
    /// first, so loose files win over members of the same name.
    ///
    /// Mounted containers can also be looked up by their logical path, so a
    /// bulk index may declare them as e.g. `DIR:.\DATA1\SUBTITLE.ZFS`.
    ///
    /// Missing or unreadable directories register nothing. Directories that
    /// an earlier scan already listed, including subdirectories reached by
    /// its discovery, are not listed again. Returns the number of entries
    /// written.
    pub fn add_dir(&mut self, name: &str) -> usize {
        match self.try_add_dir(name) {
            Ok(count) => count,
            Err(e) => {
                tracing::debug!(dir = %name, error = %e, "Skipping directory");
                0
            }
        }
    }

    /// [`add_dir`](Self::add_dir), reporting why nothing was registered.
    pub fn try_add_dir(&mut self, name: &str) -> ResolverResult<usize> {
        let dir = self.locate_dir(name)?;
        let canonical = std::fs::canonicalize(&dir).map_err(|e| ResolverError::Io {
            path: dir.clone(),
            source: e,
        })?;

        if self.scanned.contains(&canonical) {
            tracing::debug!(dir = %canonical.display(), "Directory already scanned");
            return Ok(0);
        }

        let discovery = discover_skipping(&dir, self.depth, &self.scanned).map_err(|e| {
            ResolverError::Io {
                path: dir.clone(),
                source: e,
            }
        })?;
        self.scanned.extend(discovery.dirs);
        let found = discovery.files;

        let prefix = self.name_prefix(&canonical);
        let mut count = 0;

        for file in &found {
            let file_name = file.relative.rsplit('/').next().unwrap_or(&file.relative);
            let Some(loader) = self.loaders.find(file_name).cloned() else {
                continue;
            };
            match loader.load(&file.path) {
                Ok(archive) => {
                    self.archives
                        .insert_as(archive.clone(), &join_name(&prefix, &file.relative));
                    count += self.add_archive(archive);
                }
                Err(e) => tracing::warn!(
                    path = %file.path.display(),
                    error = %e,
                    "Failed to mount archive"
                ),
            }
        }

        for file in found {
            let name = join_name(&prefix, &file.relative);
            self.upsert(&name, FileSource::path(file.path));
            count += 1;
        }

        tracing::info!(
            dir = %canonical.display(),
            depth = self.depth,
            entries = count,
            "Scanned directory"
        );
        Ok(count)
    }

    /// Mount a directory as a [`DirArchive`] named `name` and register its
    /// immediate files.
    ///
    /// Bulk indexes refer to such archives by name. Returns the number of
    /// entries written; missing directories register nothing.
    pub fn add_dir_archive(&mut self, name: &str) -> usize {
        match self.try_add_dir_archive(name) {
            Ok(count) => count,
            Err(e) => {
                tracing::debug!(dir = %name, error = %e, "Skipping directory archive");
                0
            }
        }
    }

    /// [`add_dir_archive`](Self::add_dir_archive), reporting failures.
    pub fn try_add_dir_archive(&mut self, name: &str) -> ResolverResult<usize> {
        let dir = self.locate_dir(name)?;
        let archive = DirArchive::open(normalize_archive_path(name), dir)?;
        Ok(self.add_archive(Arc::new(archive)))
    }

    /// Bind `src` to the file at `dst`, overriding any earlier binding.
    ///
    /// A relative `dst` is taken relative to the root. The file is not
    /// checked here; a missing patch shows up as a failed open.
    pub fn add_patch(&mut self, src: &str, dst: impl AsRef<Path>) {
        let dst = dst.as_ref();
        let path = if dst.is_absolute() {
            dst.to_path_buf()
        } else {
            self.root.join(dst)
        };

        tracing::debug!(name = %src, path = %path.display(), "Registered patch");
        self.upsert(src, FileSource::path(path));
    }

    /// Bind `src` to whatever `dst` currently resolves to.
    ///
    /// Returns `false` (and changes nothing) when `dst` is not registered.
    pub fn add_alias(&mut self, src: &str, dst: &str) -> bool {
        let Some(target) = self.files.get(&NameKey::new(dst)) else {
            return false;
        };
        let source = target.source.clone();
        self.upsert(src, source);
        true
    }

    /// Load a bulk index and register its records.
    ///
    /// The index itself is opened through the current table, so it may live
    /// inside an archive registered earlier. Records naming an archive that is
    /// not tracked are skipped. Returns the number of entries written; an
    /// unusable index registers nothing.
    pub fn load_zix(&mut self, name: &str) -> usize {
        match self.try_load_zix(name) {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(index = %name, error = %e, "Failed to load index");
                0
            }
        }
    }

    /// [`load_zix`](Self::load_zix), reporting why the index was unusable.
    pub fn try_load_zix(&mut self, name: &str) -> ResolverResult<usize> {
        let mut handle = self.try_open_file(name)?;
        let mut raw = Vec::new();
        handle
            .read_to_end(&mut raw)
            .map_err(|e| ResolverError::Io {
                path: PathBuf::from(name),
                source: e,
            })?;
        let text = String::from_utf8_lossy(&raw);

        let index = self
            .zix_parser
            .parse(&text)
            .map_err(|e| ResolverError::Index {
                name: name.to_string(),
                source: e,
            })?;

        let mut registered = 0;
        let mut skipped = index.skipped;
        for record in index.records {
            let Some(archive) = self.archives.resolve(&record.archive).cloned() else {
                tracing::debug!(
                    name = %record.name,
                    archive = %record.archive,
                    "Skipping index record for unknown archive"
                );
                skipped += 1;
                continue;
            };
            let source = FileSource::archive(archive, record.name.as_str());
            self.upsert(&record.name, source);
            registered += 1;
        }

        tracing::info!(
            index = %name,
            registered = registered,
            skipped = skipped,
            "Loaded index"
        );
        Ok(registered)
    }

    // ------------------------------------------------------------------
    // Query
    // ------------------------------------------------------------------

    /// Whether some registration currently maps to `name`.
    pub fn has_file(&self, name: &str) -> bool {
        self.files.contains_key(&NameKey::new(name))
    }

    /// The winning entry for `name`.
    pub fn resolve(&self, name: &str) -> Option<&Entry> {
        self.files.get(&NameKey::new(name))
    }

    /// Open the content registered for `name`.
    ///
    /// Returns `None` when the name is unknown or its source cannot be
    /// opened; the two cases are not distinguished here.
    pub fn open_file(&self, name: &str) -> Option<FileHandle> {
        match self.try_open_file(name) {
            Ok(handle) => Some(handle),
            Err(ResolverError::NotFound(_)) => None,
            Err(e) => {
                tracing::debug!(name = %name, error = %e, "Source unavailable");
                None
            }
        }
    }

    /// Open `name` into a handle the caller owns.
    ///
    /// On success the previous content of `handle` is released and replaced.
    /// On failure `handle` is left as it was and `false` is returned.
    pub fn open_file_into(&self, handle: &mut FileHandle, name: &str) -> bool {
        match self.open_file(name) {
            Some(opened) => {
                *handle = opened;
                true
            }
            None => false,
        }
    }

    /// [`open_file`](Self::open_file), reporting why nothing was opened.
    pub fn try_open_file(&self, name: &str) -> ResolverResult<FileHandle> {
        let entry = self
            .resolve(name)
            .ok_or_else(|| ResolverError::NotFound(name.to_string()))?;

        match &entry.source {
            FileSource::Path(path) => {
                FileHandle::from_path(name, path).map_err(|e| ResolverError::Io {
                    path: path.clone(),
                    source: e,
                })
            }
            FileSource::Archive { archive, member } => Ok(archive.open_member(member)?),
        }
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate over all entries (unordered).
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.files.values()
    }

    /// Archives tracked so far.
    pub fn archives(&self) -> &ArchiveRegistry {
        &self.archives
    }

    /// Whether the directory was already listed by [`add_dir`](Self::add_dir),
    /// either directly or as a subdirectory of a scan.
    pub fn is_scanned(&self, name: &str) -> bool {
        self.locate_dir(name)
            .ok()
            .and_then(|dir| std::fs::canonicalize(dir).ok())
            .is_some_and(|canonical| self.scanned.contains(&canonical))
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    /// Find the directory `name` refers to, trying a case-insensitive match
    /// below the root when the exact spelling does not exist.
    fn locate_dir(&self, name: &str) -> ResolverResult<PathBuf> {
        let relative = Path::new(name);
        let candidate = if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            self.root.join(relative)
        };

        if candidate.is_dir() {
            return Ok(candidate);
        }

        if !relative.is_absolute() {
            if let Some(found) = resolve_case_insensitive(&self.root, relative) {
                if found.is_dir() {
                    return Ok(found);
                }
            }
        }

        Err(ResolverError::Io {
            path: candidate,
            source: io::Error::new(io::ErrorKind::NotFound, "directory not found"),
        })
    }

    /// Logical name prefix for files found under `canonical_dir`.
    fn name_prefix(&self, canonical_dir: &Path) -> String {
        let Ok(root) = std::fs::canonicalize(&self.root) else {
            return String::new();
        };
        let Ok(relative) = canonical_dir.strip_prefix(&root) else {
            return String::new();
        };

        relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().to_string()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

fn join_name(prefix: &str, relative: &str) -> String {
    if prefix.is_empty() {
        relative.to_string()
    } else {
        format!("{}/{}", prefix, relative)
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("root", &self.root)
            .field("depth", &self.depth)
            .field("entries", &self.files.len())
            .field("archives", &self.archives.len())
            .field("scanned", &self.scanned.len())
            .field("loaders", &self.loaders)
            .finish()
    }
}
