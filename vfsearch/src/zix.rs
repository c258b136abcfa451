//! Bulk index ("zix") parsing.
//!
//! A bulk index maps many logical names to the archive that holds them, so a
//! large archive set can publish its manifest once instead of being
//! enumerated member by member. Parsing sits behind the [`ZixParser`] trait;
//! [`SectionedZixParser`] is the default format.
//!
//! # Default format
//!
//! ```text
//! any header text, ignored
//! ----------------------------------------
//! DIR:.\DATA1\SUBTITLE.ZFS
//! DIR:.\DATA2\
//! ----------------------------------------
//! 1 SUB0001.TXT
//! 1 SUB0002.TXT
//! 2 INTRO.SCR
//! ```
//!
//! The header runs up to the first separator (a line starting with ten
//! dashes). Archive declarations follow as `TAG:path` lines up to the second
//! separator; the tag is free-form letters. Each record is `<n> <name>`,
//! where `n` is the 1-based position of a declaration. Declared paths are
//! normalized (`\` to `/`, leading `.`/`/` and trailing `/` removed) and
//! matched against archive names.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::archive::ArchiveRef;
use crate::name::normalize_archive_path;

/// Errors that make a whole index unusable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ZixError {
    /// A required section separator was not found.
    #[error("index is missing its {0} section")]
    MissingSection(&'static str),
}

/// One name → archive association read from an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZixRecord {
    /// Logical name to register.
    pub name: String,

    /// Archive that holds it.
    pub archive: ArchiveRef,
}

/// Parsed contents of an index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZixIndex {
    /// Records in file order.
    pub records: Vec<ZixRecord>,

    /// Number of record lines that could not be used.
    pub skipped: usize,
}

/// Turns index text into records.
pub trait ZixParser {
    /// Parse a complete index.
    fn parse(&self, text: &str) -> Result<ZixIndex, ZixError>;
}

const SEPARATOR: &str = "----------";

fn declaration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // TAG:path, e.g. "DIR:.\DATA1\" or "ZGI:SUBTITLE.ZFS"
    PATTERN.get_or_init(|| Regex::new(r"^([A-Za-z]+):(.*)$").expect("valid regex"))
}

fn record_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // <position> <name>
    PATTERN.get_or_init(|| Regex::new(r"^(\d+)\s+(\S+)").expect("valid regex"))
}

/// The default sectioned index format (see the module docs).
#[derive(Debug, Clone, Default)]
pub struct SectionedZixParser {
    /// Prefixes removed from declared archive paths (case-insensitive).
    strip_prefixes: Vec<String>,
}

impl SectionedZixParser {
    /// Create a parser with no prefix stripping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove `prefix` from declared archive paths that start with it.
    ///
    /// Indexes written for an install layout with an extra top-level folder
    /// (e.g. `znemesis/`) can then be used against a flattened copy.
    pub fn with_strip_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.strip_prefixes
            .push(normalize_archive_path(&prefix.into()).to_lowercase());
        self
    }

    fn archive_name(&self, declared: &str) -> String {
        let path = normalize_archive_path(declared);
        for prefix in &self.strip_prefixes {
            if prefix.is_empty() {
                continue;
            }
            if let Some(rest) = strip_dir_prefix(&path, prefix) {
                return rest.to_string();
            }
        }
        path
    }
}

/// Strip the leading directory `prefix` from `path`, comparing characters
/// case-insensitively.
///
/// Works char by char on `path` itself, so the remainder always starts on a
/// character boundary even when lowercasing changes byte lengths.
fn strip_dir_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let mut chars = path.chars();
    for wanted in prefix.chars() {
        let found = chars.next()?;
        if !found.to_lowercase().eq(wanted.to_lowercase()) {
            return None;
        }
    }
    chars.as_str().strip_prefix('/')
}

impl ZixParser for SectionedZixParser {
    fn parse(&self, text: &str) -> Result<ZixIndex, ZixError> {
        let mut lines = text.lines().map(str::trim);

        if !lines.by_ref().any(|line| line.starts_with(SEPARATOR)) {
            return Err(ZixError::MissingSection("header"));
        }

        let mut archives = Vec::new();
        let mut closed = false;
        for line in lines.by_ref() {
            if line.starts_with(SEPARATOR) {
                closed = true;
                break;
            }
            match declaration_pattern().captures(line) {
                Some(caps) => archives.push(self.archive_name(&caps[2])),
                None if line.is_empty() => {}
                None => tracing::debug!(line = %line, "Ignoring non-declaration line in index"),
            }
        }
        if !closed {
            return Err(ZixError::MissingSection("archive"));
        }

        let mut index = ZixIndex::default();
        for line in lines {
            if line.is_empty() {
                continue;
            }

            let record = record_pattern().captures(line).and_then(|caps| {
                let position: usize = caps[1].parse().ok()?;
                let archive = archives.get(position.checked_sub(1)?)?;
                Some(ZixRecord {
                    name: caps[2].to_string(),
                    archive: ArchiveRef::Name(archive.clone()),
                })
            });

            match record {
                Some(record) => index.records.push(record),
                None => {
                    tracing::debug!(line = %line, "Skipping unusable index record");
                    index.skipped += 1;
                }
            }
        }

        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Nemesis file index
version 1
----------------------------------------
DIR:.\\DATA1\\SUBTITLE.ZFS
DIR:.\\DATA2\\
----------------------------------------
1 SUB0001.TXT
2 INTRO.SCR
";

    fn names(index: &ZixIndex) -> Vec<&str> {
        index.records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_parse_sample() {
        let index = SectionedZixParser::new().parse(SAMPLE).unwrap();

        assert_eq!(names(&index), vec!["SUB0001.TXT", "INTRO.SCR"]);
        assert_eq!(
            index.records[0].archive,
            ArchiveRef::Name("DATA1/SUBTITLE.ZFS".to_string())
        );
        assert_eq!(index.records[1].archive, ArchiveRef::Name("DATA2".to_string()));
        assert_eq!(index.skipped, 0);
    }

    #[test]
    fn test_bad_lines_are_skipped_individually() {
        let text = format!("{}garbage\n0 ZERO.TXT\n3 OUT_OF_RANGE.TXT\n\n1 LAST.TXT\n", SAMPLE);
        let index = SectionedZixParser::new().parse(&text).unwrap();

        assert_eq!(names(&index), vec!["SUB0001.TXT", "INTRO.SCR", "LAST.TXT"]);
        assert_eq!(index.skipped, 3);
    }

    #[test]
    fn test_missing_header_separator() {
        let err = SectionedZixParser::new().parse("1 A.TXT\n").unwrap_err();
        assert_eq!(err, ZixError::MissingSection("header"));
    }

    #[test]
    fn test_missing_archive_separator() {
        let err = SectionedZixParser::new()
            .parse("----------\nDIR:DATA1\n")
            .unwrap_err();
        assert_eq!(err, ZixError::MissingSection("archive"));
        assert_eq!(err.to_string(), "index is missing its archive section");
    }

    #[test]
    fn test_strip_prefix() {
        let text = "----------\nDIR:.\\ZNEMESIS\\DATA1\\\n----------\n1 A.TXT\n";
        let parser = SectionedZixParser::new().with_strip_prefix("znemesis");
        let index = parser.parse(text).unwrap();

        assert_eq!(index.records[0].archive, ArchiveRef::Name("DATA1".to_string()));
    }

    #[test]
    fn test_strip_prefix_requires_whole_component() {
        let text = "----------\nDIR:ZNEMESISX\\DATA1\n----------\n1 A.TXT\n";
        let parser = SectionedZixParser::new().with_strip_prefix("znemesis");
        let index = parser.parse(text).unwrap();

        assert_eq!(
            index.records[0].archive,
            ArchiveRef::Name("ZNEMESISX/DATA1".to_string())
        );
    }

    #[test]
    fn test_strip_prefix_with_non_ascii_declaration() {
        // KELVIN SIGN lowercases to a one-byte 'k'
        let text = "----------\nDIR:\u{212A}/DATA1\nDIR:\u{212A}\n----------\n1 A.TXT\n2 B.TXT\n";
        let parser = SectionedZixParser::new().with_strip_prefix("k");
        let index = parser.parse(text).unwrap();

        assert_eq!(index.records[0].archive, ArchiveRef::Name("DATA1".to_string()));
        assert_eq!(
            index.records[1].archive,
            ArchiveRef::Name("\u{212A}".to_string())
        );
    }

    #[test]
    fn test_non_ascii_record_names() {
        let text = "----------\nDIR:DONNÉES\n----------\n1 ÉCRAN.PNG\n";
        let index = SectionedZixParser::new().parse(text).unwrap();

        assert_eq!(names(&index), vec!["ÉCRAN.PNG"]);
        assert_eq!(
            index.records[0].archive,
            ArchiveRef::Name("DONNÉES".to_string())
        );
    }

    #[test]
    fn test_strip_dir_prefix() {
        assert_eq!(strip_dir_prefix("ZGI/data", "zgi"), Some("data"));
        assert_eq!(strip_dir_prefix("zgi", "zgi"), None);
        assert_eq!(strip_dir_prefix("zg", "zgi"), None);
        assert_eq!(strip_dir_prefix("\u{212A}/x", "k"), Some("x"));
    }

    #[test]
    fn test_empty_record_section() {
        let index = SectionedZixParser::new()
            .parse("----------\nDIR:A\n----------\n")
            .unwrap();
        assert!(index.records.is_empty());
        assert_eq!(index.skipped, 0);
    }
}
