//! Bounded recursive directory discovery.
//!
//! [`discover`] enumerates the files beneath a directory down to a fixed
//! number of levels. Every directory is listed at most once: directories are
//! identified by canonical path, so symbolic link loops and directories
//! already covered by an earlier walk are not enumerated again.

use std::collections::HashSet;
use std::io;
use std::path::{Component, Path, PathBuf};

/// A file found by [`discover`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Path relative to the scanned directory, `/`-separated.
    pub relative: String,

    /// Real filesystem path.
    pub path: PathBuf,
}

/// Result of a [`discover`] walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Files found, in walk order.
    pub files: Vec<DiscoveredFile>,

    /// Canonical paths of every directory that was listed, top first.
    pub dirs: Vec<PathBuf>,
}

/// Immediate children of one directory, each list sorted by name.
struct Listing {
    files: Vec<(String, PathBuf)>,
    dirs: Vec<(String, PathBuf)>,
}

fn list_dir(dir: &Path) -> io::Result<Listing> {
    let mut files = Vec::new();
    let mut dirs = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();

        // Follows symlinks, so linked directories are descended into
        if path.is_dir() {
            dirs.push((name, path));
        } else if path.is_file() {
            files.push((name, path));
        }
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));
    dirs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(Listing { files, dirs })
}

fn join_relative(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}

/// List the files beneath `dir`, descending at most `depth` levels.
///
/// Depth 0 lists only the files directly inside `dir`; depth 1 adds the files
/// of its subdirectories, and so on. Files of a directory are emitted in name
/// order before any of its subdirectories are visited.
///
/// Fails only when `dir` itself cannot be listed. Unreadable subdirectories
/// are skipped.
pub fn discover(dir: &Path, depth: usize) -> io::Result<Discovery> {
    discover_skipping(dir, depth, &HashSet::new())
}

/// [`discover`], leaving out subdirectories whose canonical path is in
/// `skip` (typically directories listed by earlier walks).
///
/// `dir` itself is always listed.
pub fn discover_skipping(
    dir: &Path,
    depth: usize,
    skip: &HashSet<PathBuf>,
) -> io::Result<Discovery> {
    let mut discovery = Discovery::default();
    let mut listed = HashSet::new();
    let mut stack = vec![(dir.to_path_buf(), String::new(), depth, true)];

    while let Some((real_dir, prefix, remaining, is_top)) = stack.pop() {
        let listing = std::fs::canonicalize(&real_dir).and_then(|canonical| {
            if !is_top && (skip.contains(&canonical) || listed.contains(&canonical)) {
                return Ok(None);
            }
            let listing = list_dir(&real_dir)?;
            Ok(Some((canonical, listing)))
        });

        let (canonical, listing) = match listing {
            Ok(Some(found)) => found,
            Ok(None) => {
                tracing::debug!(dir = %real_dir.display(), "Directory already discovered");
                continue;
            }
            Err(e) if is_top => return Err(e),
            Err(e) => {
                tracing::debug!(
                    dir = %real_dir.display(),
                    error = %e,
                    "Skipping unreadable directory"
                );
                continue;
            }
        };
        listed.insert(canonical.clone());
        discovery.dirs.push(canonical);

        for (name, path) in listing.files {
            discovery.files.push(DiscoveredFile {
                relative: join_relative(&prefix, &name),
                path,
            });
        }

        if remaining > 0 {
            // Reversed so the stack pops subdirectories in name order
            for (name, path) in listing.dirs.into_iter().rev() {
                stack.push((path, join_relative(&prefix, &name), remaining - 1, false));
            }
        }
    }

    Ok(discovery)
}

/// Resolve `relative` beneath `root`, matching each component
/// case-insensitively when the exact spelling does not exist.
///
/// Returns `None` when some component has no match.
pub fn resolve_case_insensitive(root: &Path, relative: &Path) -> Option<PathBuf> {
    let mut current = root.to_path_buf();

    for component in relative.components() {
        let part = match component {
            Component::Normal(part) => part,
            other => {
                current.push(other.as_os_str());
                continue;
            }
        };

        let exact = current.join(part);
        if exact.exists() {
            current = exact;
            continue;
        }

        let wanted = part.to_string_lossy().to_lowercase();
        let matched = std::fs::read_dir(&current).ok()?.flatten().find(|entry| {
            entry.file_name().to_string_lossy().to_lowercase() == wanted
        })?;
        current = matched.path();
    }

    Some(current)
}
