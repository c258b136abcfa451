//! Directory-backed archive.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{Archive, ArchiveError};
use crate::handle::FileHandle;
use crate::name::NameKey;

/// The immediate files of one directory, exposed as an archive.
///
/// Members are indexed once at construction; lookups are case-insensitive.
#[derive(Debug, Clone)]
pub struct DirArchive {
    name: String,
    path: PathBuf,
    /// Normalized member name -> file name as spelled on disk.
    members: HashMap<NameKey, String>,
}

impl DirArchive {
    /// Index the files directly inside `path`.
    ///
    /// The archive is named after `name`, which is what bulk indexes use to
    /// refer to it.
    pub fn open(name: impl Into<String>, path: impl Into<PathBuf>) -> Result<Self, ArchiveError> {
        let path = path.into();
        let entries = std::fs::read_dir(&path).map_err(|e| ArchiveError::Io {
            path: path.clone(),
            source: e,
        })?;

        let mut members = HashMap::new();
        for entry in entries.flatten() {
            let is_file = entry.path().is_file();
            if !is_file {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().to_string();
            members.insert(NameKey::new(&file_name), file_name);
        }

        Ok(Self {
            name: name.into(),
            path,
            members,
        })
    }

    /// Directory this archive reads from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of member files.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

impl Archive for DirArchive {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_members(&self) -> Vec<String> {
        let mut names: Vec<String> = self.members.values().cloned().collect();
        names.sort();
        names
    }

    fn has_member(&self, member: &str) -> bool {
        self.members.contains_key(&NameKey::new(member))
    }

    fn open_member(&self, member: &str) -> Result<FileHandle, ArchiveError> {
        let file_name =
            self.members
                .get(&NameKey::new(member))
                .ok_or_else(|| ArchiveError::MemberNotFound {
                    archive: self.name.clone(),
                    member: member.to_string(),
                })?;

        let real_path = self.path.join(file_name);
        FileHandle::from_path(member, &real_path).map_err(|e| ArchiveError::Io {
            path: real_path,
            source: e,
        })
    }
}
