//! In-memory archive.

use std::collections::HashMap;

use bytes::Bytes;

use super::{Archive, ArchiveError};
use crate::handle::FileHandle;
use crate::name::NameKey;

/// Archive whose members live in memory.
///
/// Handy for resources embedded in the executable and for tests.
///
/// # Example
///
/// ```
/// use vfsearch::{Archive, MemoryArchive};
///
/// let archive = MemoryArchive::new("embedded")
///     .with_member("Fonts/Default.fnt", &b"font"[..]);
///
/// assert!(archive.has_member("fonts/default.fnt"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    name: String,
    members: HashMap<NameKey, (String, Bytes)>,
}

impl MemoryArchive {
    /// Create an empty archive.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: HashMap::new(),
        }
    }

    /// Add or replace a member.
    pub fn insert(&mut self, member: impl Into<String>, data: impl Into<Bytes>) {
        let member = member.into();
        self.members
            .insert(NameKey::new(&member), (member, data.into()));
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_member(mut self, member: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.insert(member, data);
        self
    }
}

impl Archive for MemoryArchive {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_members(&self) -> Vec<String> {
        let mut names: Vec<String> = self.members.values().map(|(n, _)| n.clone()).collect();
        names.sort();
        names
    }

    fn has_member(&self, member: &str) -> bool {
        self.members.contains_key(&NameKey::new(member))
    }

    fn open_member(&self, member: &str) -> Result<FileHandle, ArchiveError> {
        self.members
            .get(&NameKey::new(member))
            .map(|(_, data)| FileHandle::from_bytes(member, data.clone()))
            .ok_or_else(|| ArchiveError::MemberNotFound {
                archive: self.name.clone(),
                member: member.to_string(),
            })
    }
}
