//! Resolver configuration.
//!
//! A configuration fixes the root and discovery depth, and can describe a
//! whole setup phase: which directories to scan, which directories to mount
//! as archives, which bulk indexes to load and which patches to apply.
//!
//! # File format
//!
//! ```ini
//! [resolver]
//! root = /games/znemesis
//! depth = 6
//! zix_strip_prefixes = znemesis, zgi
//!
//! [search]
//! dirs = data1, data2
//! archives = data3
//! indexes = nemesis.zix
//!
//! [patches]
//! scripts/intro.scr = /home/me/fixes/intro.scr
//! ```

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use crate::resolver::Resolver;

/// Default discovery depth below a scanned directory.
pub const DEFAULT_DEPTH: usize = 6;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read or parsed.
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    /// Configuration text could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(#[from] ini::ParseError),

    /// A setting has an unusable value.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Configuration for building a [`Resolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Base directory for relative names.
    pub root: PathBuf,

    /// Discovery depth bound.
    pub depth: usize,

    /// Directories to scan, lowest priority first.
    pub dirs: Vec<String>,

    /// Directories to mount as named archives.
    pub archives: Vec<String>,

    /// Bulk indexes to load.
    pub indexes: Vec<String>,

    /// Patches as (logical name, file path), applied last.
    pub patches: Vec<(String, PathBuf)>,

    /// Prefixes stripped from archive paths declared in bulk indexes.
    pub zix_strip_prefixes: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            depth: DEFAULT_DEPTH,
            dirs: Vec::new(),
            archives: Vec::new(),
            indexes: Vec::new(),
            patches: Vec::new(),
            zix_strip_prefixes: Vec::new(),
        }
    }
}

/// Split a comma-separated setting into trimmed, non-empty items.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl ResolverConfig {
    /// Create a configuration with the given root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Set the discovery depth.
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Add a directory to scan.
    pub fn with_dir(mut self, dir: impl Into<String>) -> Self {
        self.dirs.push(dir.into());
        self
    }

    /// Add a directory to mount as an archive.
    pub fn with_archive(mut self, dir: impl Into<String>) -> Self {
        self.archives.push(dir.into());
        self
    }

    /// Add a bulk index to load.
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.indexes.push(index.into());
        self
    }

    /// Add a patch.
    pub fn with_patch(mut self, src: impl Into<String>, dst: impl Into<PathBuf>) -> Self {
        self.patches.push((src.into(), dst.into()));
        self
    }

    /// Strip `prefix` from archive paths declared in bulk indexes.
    pub fn with_zix_strip_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.zix_strip_prefixes.push(prefix.into());
        self
    }

    /// Load configuration from an INI file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_ini(&ini)
    }

    /// Parse configuration from INI text.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text)?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(section) = ini.section(Some("resolver")) {
            if let Some(root) = section.get("root") {
                config.root = PathBuf::from(root.trim());
            }
            if let Some(depth) = section.get("depth") {
                config.depth =
                    depth
                        .trim()
                        .parse()
                        .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
                            key: "resolver.depth".to_string(),
                            value: depth.to_string(),
                            reason: e.to_string(),
                        })?;
            }
            if let Some(prefixes) = section.get("zix_strip_prefixes") {
                config.zix_strip_prefixes = split_list(prefixes);
            }
        }

        if let Some(section) = ini.section(Some("search")) {
            if let Some(dirs) = section.get("dirs") {
                config.dirs = split_list(dirs);
            }
            if let Some(archives) = section.get("archives") {
                config.archives = split_list(archives);
            }
            if let Some(indexes) = section.get("indexes") {
                config.indexes = split_list(indexes);
            }
        }

        if let Some(section) = ini.section(Some("patches")) {
            for (src, dst) in section.iter() {
                config
                    .patches
                    .push((src.trim().to_string(), PathBuf::from(dst.trim())));
            }
        }

        Ok(config)
    }

    /// Run the configured registrations against `resolver`.
    ///
    /// Order is fixed so that more specific sources win: scanned directories,
    /// then directory archives, then bulk indexes, then patches. Returns the
    /// number of entries written.
    pub fn apply(&self, resolver: &mut Resolver) -> usize {
        let mut written = 0;

        for dir in &self.dirs {
            written += resolver.add_dir(dir);
        }
        for archive in &self.archives {
            written += resolver.add_dir_archive(archive);
        }
        for index in &self.indexes {
            written += resolver.load_zix(index);
        }
        for (src, dst) in &self.patches {
            resolver.add_patch(src, dst);
            written += 1;
        }

        tracing::info!(
            root = %self.root.display(),
            entries = resolver.len(),
            written = written,
            "Resolver setup complete"
        );
        written
    }

    /// Build a resolver and run the configured registrations.
    pub fn build(&self) -> Resolver {
        let mut resolver = Resolver::with_config(self);
        self.apply(&mut resolver);
        resolver
    }
}

/// Default configuration file location (`<config dir>/vfsearch/config.ini`).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("vfsearch").join("config.ini"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
[resolver]
root = /games/znemesis
depth = 2
zix_strip_prefixes = znemesis, zgi

[search]
dirs = data1, data2
archives = data3
indexes = nemesis.zix

[patches]
scripts/intro.scr = /home/me/fixes/intro.scr
";

    #[test]
    fn test_default_config() {
        let config = ResolverConfig::default();
        assert_eq!(config.root, PathBuf::from("."));
        assert_eq!(config.depth, DEFAULT_DEPTH);
        assert!(config.dirs.is_empty());
        assert!(config.patches.is_empty());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ResolverConfig::new("/games")
            .with_depth(1)
            .with_dir("data1")
            .with_archive("data2")
            .with_index("a.zix")
            .with_patch("x", "/p/x")
            .with_zix_strip_prefix("zgi");

        assert_eq!(config.root, PathBuf::from("/games"));
        assert_eq!(config.depth, 1);
        assert_eq!(config.dirs, vec!["data1"]);
        assert_eq!(config.archives, vec!["data2"]);
        assert_eq!(config.indexes, vec!["a.zix"]);
        assert_eq!(config.patches, vec![("x".to_string(), PathBuf::from("/p/x"))]);
        assert_eq!(config.zix_strip_prefixes, vec!["zgi"]);
    }

    #[test]
    fn test_from_ini_str() {
        let config = ResolverConfig::from_ini_str(SAMPLE).unwrap();

        assert_eq!(config.root, PathBuf::from("/games/znemesis"));
        assert_eq!(config.depth, 2);
        assert_eq!(config.dirs, vec!["data1", "data2"]);
        assert_eq!(config.archives, vec!["data3"]);
        assert_eq!(config.indexes, vec!["nemesis.zix"]);
        assert_eq!(config.zix_strip_prefixes, vec!["znemesis", "zgi"]);
        assert_eq!(
            config.patches,
            vec![(
                "scripts/intro.scr".to_string(),
                PathBuf::from("/home/me/fixes/intro.scr")
            )]
        );
    }

    #[test]
    fn test_invalid_depth() {
        let err = ResolverConfig::from_ini_str("[resolver]\ndepth = -1\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert!(err.to_string().contains("resolver.depth"));
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = ResolverConfig::load(&temp.path().join("missing.ini")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_and_build() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        std::fs::create_dir_all(root.join("data1")).unwrap();
        std::fs::create_dir_all(root.join("data3")).unwrap();
        std::fs::write(root.join("data1/a.txt"), b"a").unwrap();
        std::fs::write(root.join("data3/member.txt"), b"m").unwrap();
        std::fs::write(root.join("fix.txt"), b"fixed").unwrap();

        let ini_path = root.join("config.ini");
        std::fs::write(
            &ini_path,
            format!(
                "[resolver]\nroot = {}\ndepth = 0\n\n[search]\ndirs = data1\narchives = data3\n\n[patches]\ndata1/a.txt = fix.txt\n",
                root.display()
            ),
        )
        .unwrap();

        let config = ResolverConfig::load(&ini_path).unwrap();
        let resolver = config.build();

        assert!(resolver.has_file("member.txt"));
        let mut handle = resolver.open_file("DATA1/A.TXT").unwrap();
        assert_eq!(handle.read_all().unwrap(), b"fixed");
    }

    #[test]
    fn test_default_config_path() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("vfsearch/config.ini"));
        }
    }
}
