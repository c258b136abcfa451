//! Crate-level error type.
//!
//! Lookups never surface these: at the query boundary every failure turns into
//! "no usable content". They are returned by the fallible `try_*` setup
//! operations and logged everywhere else. Configuration loading has its own
//! [`ConfigError`](crate::config::ConfigError).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::archive::ArchiveError;
use crate::zix::ZixError;

/// Result type for resolver setup operations.
pub type ResolverResult<T> = Result<T, ResolverError>;

/// Errors raised while setting up a resolver.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// No entry is registered under this name.
    #[error("no entry registered for '{0}'")]
    NotFound(String),

    /// Filesystem access failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An archive could not be opened or read.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// A bulk index was unusable.
    #[error("invalid index '{name}': {source}")]
    Index {
        name: String,
        #[source]
        source: ZixError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_error_display() {
        let err = ResolverError::Index {
            name: "nemesis.zix".to_string(),
            source: ZixError::MissingSection("header"),
        };
        assert_eq!(
            err.to_string(),
            "invalid index 'nemesis.zix': index is missing its header section"
        );
    }

    #[test]
    fn test_not_found_display() {
        let err = ResolverError::NotFound("intro.scr".to_string());
        assert_eq!(err.to_string(), "no entry registered for 'intro.scr'");
    }

    #[test]
    fn test_from_archive_error() {
        let err: ResolverError = ArchiveError::MemberNotFound {
            archive: "a".to_string(),
            member: "b".to_string(),
        }
        .into();
        assert!(matches!(err, ResolverError::Archive(_)));
    }
}
