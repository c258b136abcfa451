//! Logical resource names and their normalized lookup keys.
//!
//! Every name that enters the resolver, whether it is being registered or
//! queried, is folded into a [`NameKey`] first. Two names that differ only in
//! case (or in `\` versus `/` separators) produce the same key.

use std::fmt;

/// Normalized form of a logical resource name.
///
/// Normalization lowercases the name and turns backslash separators into
/// forward slashes.
///
/// # Example
///
/// ```
/// use vfsearch::NameKey;
///
/// assert_eq!(NameKey::new("Data\\INTRO.Scr"), NameKey::new("data/intro.scr"));
/// assert_eq!(NameKey::new("Data\\INTRO.Scr").as_str(), "data/intro.scr");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NameKey(String);

impl NameKey {
    /// Normalize a logical name into a lookup key.
    pub fn new(name: &str) -> Self {
        Self(name.replace('\\', "/").to_lowercase())
    }

    /// Get the normalized key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NameKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<&String> for NameKey {
    fn from(name: &String) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for NameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize an archive or directory reference as it appears in index files.
///
/// Separators become `/`, and a leading `.` or `/` and a trailing `/` are
/// dropped, so `.\DATA1\` and `data1` compare equal once case-folded.
pub(crate) fn normalize_archive_path(path: &str) -> String {
    let path = path.trim().replace('\\', "/");
    let path = path.strip_prefix('.').unwrap_or(&path);
    let path = path.strip_prefix('/').unwrap_or(path);
    let path = path.strip_suffix('/').unwrap_or(path);
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_folds_case() {
        assert_eq!(NameKey::new("INTRO.SCR"), NameKey::new("intro.scr"));
        assert_eq!(NameKey::new("Intro.Scr").as_str(), "intro.scr");
    }

    #[test]
    fn test_key_unifies_separators() {
        assert_eq!(NameKey::new("data\\sub\\a.txt").as_str(), "data/sub/a.txt");
    }

    #[test]
    fn test_key_display() {
        assert_eq!(format!("{}", NameKey::new("A/B")), "a/b");
    }

    #[test]
    fn test_normalize_archive_path() {
        assert_eq!(normalize_archive_path(".\\DATA1\\"), "DATA1");
        assert_eq!(normalize_archive_path("/data2/"), "data2");
        assert_eq!(normalize_archive_path("  sub\\x.zfs "), "sub/x.zfs");
        assert_eq!(normalize_archive_path(""), "");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_case_variants_share_a_key(name in "[A-Za-z0-9_./\\\\]{1,24}") {
                let upper = NameKey::new(&name.to_uppercase());
                let lower = NameKey::new(&name.to_lowercase());
                prop_assert_eq!(&upper, &lower);
                prop_assert_eq!(upper, NameKey::new(&name));
            }
        }
    }
}
