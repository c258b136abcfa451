//! Pluggable loaders for container files found during directory scans.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use glob::{MatchOptions, Pattern, PatternError};

use super::{Archive, ArchiveError};

/// Turns a container file on disk into an archive.
///
/// Implemented for any `Fn(&Path) -> Result<Arc<dyn Archive>, ArchiveError>`.
pub trait ArchiveLoader: Send + Sync {
    /// Open the container at `path`.
    fn load(&self, path: &Path) -> Result<Arc<dyn Archive>, ArchiveError>;
}

impl<F> ArchiveLoader for F
where
    F: Fn(&Path) -> Result<Arc<dyn Archive>, ArchiveError> + Send + Sync,
{
    fn load(&self, path: &Path) -> Result<Arc<dyn Archive>, ArchiveError> {
        self(path)
    }
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// File-name patterns mapped to the loaders that open them.
///
/// Patterns are globs matched case-insensitively against the file name only
/// (e.g. `*.zfs`). The first matching pattern wins.
#[derive(Clone, Default)]
pub struct ArchiveLoaders {
    loaders: Vec<(Pattern, Arc<dyn ArchiveLoader>)>,
}

impl ArchiveLoaders {
    /// Create an empty loader set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a loader for file names matching `pattern`.
    pub fn register(
        &mut self,
        pattern: &str,
        loader: Arc<dyn ArchiveLoader>,
    ) -> Result<(), PatternError> {
        self.loaders.push((Pattern::new(pattern)?, loader));
        Ok(())
    }

    /// Find the loader responsible for a file name.
    pub fn find(&self, file_name: &str) -> Option<&Arc<dyn ArchiveLoader>> {
        self.loaders
            .iter()
            .find(|(pattern, _)| pattern.matches_with(file_name, MATCH_OPTIONS))
            .map(|(_, loader)| loader)
    }

    /// Whether some loader handles this file name.
    pub fn matches(&self, file_name: &str) -> bool {
        self.find(file_name).is_some()
    }

    /// Number of registered patterns.
    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    /// Whether no loader is registered.
    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }
}

impl fmt::Debug for ArchiveLoaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.loaders.iter().map(|(p, _)| p.as_str()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::MemoryArchive;

    fn memory_loader(path: &Path) -> Result<Arc<dyn Archive>, ArchiveError> {
        let name = path.to_string_lossy().to_string();
        Ok(Arc::new(MemoryArchive::new(name)))
    }

    #[test]
    fn test_pattern_matches_case_insensitively() {
        let mut loaders = ArchiveLoaders::new();
        loaders.register("*.zfs", Arc::new(memory_loader)).unwrap();

        assert!(loaders.matches("SUBTITLE.ZFS"));
        assert!(loaders.matches("scripts.zfs"));
        assert!(!loaders.matches("readme.txt"));
        assert_eq!(loaders.len(), 1);
    }

    #[test]
    fn test_find_invokes_loader() {
        let mut loaders = ArchiveLoaders::new();
        loaders.register("*.pak", Arc::new(memory_loader)).unwrap();

        let loader = loaders.find("a.pak").unwrap();
        let archive = loader.load(Path::new("a.pak")).unwrap();
        assert_eq!(archive.name(), "a.pak");
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let mut loaders = ArchiveLoaders::new();
        assert!(loaders.register("[", Arc::new(memory_loader)).is_err());
        assert!(loaders.is_empty());
    }

    #[test]
    fn test_debug_lists_patterns() {
        let mut loaders = ArchiveLoaders::new();
        loaders.register("*.zfs", Arc::new(memory_loader)).unwrap();
        assert_eq!(format!("{:?}", loaders), "[\"*.zfs\"]");
    }
}
