//! List command - show every registered name and its winning source.

use std::io::{self, Write};

use glob::{MatchOptions, Pattern};
use serde::Serialize;
use vfsearch::{Resolver, SourceKind};

use crate::error::CliError;

/// One row of `vfsearch list` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedEntry {
    pub name: String,
    pub kind: SourceKind,
    pub source: String,
}

/// Collect entries sorted by name, optionally filtered by a glob.
///
/// The glob is matched case-insensitively against the logical name.
pub fn collect_entries(
    resolver: &Resolver,
    pattern: Option<&str>,
) -> Result<Vec<ListedEntry>, CliError> {
    let pattern = pattern
        .map(Pattern::new)
        .transpose()
        .map_err(|e| CliError::InvalidPattern(e.to_string()))?;
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };

    let mut entries: Vec<ListedEntry> = resolver
        .entries()
        .filter(|e| {
            pattern
                .as_ref()
                .map_or(true, |p| p.matches_with(&e.name, options))
        })
        .map(|e| ListedEntry {
            name: e.name.clone(),
            kind: e.kind(),
            source: e.source.to_string(),
        })
        .collect();

    entries.sort_by_key(|e| e.name.to_lowercase());
    Ok(entries)
}

/// Run the list command.
pub fn run(resolver: &Resolver, pattern: Option<&str>, json: bool) -> Result<(), CliError> {
    let entries = collect_entries(resolver, pattern)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if json {
        serde_json::to_writer_pretty(&mut out, &entries).map_err(io::Error::from)?;
        writeln!(out)?;
        return Ok(());
    }

    for entry in &entries {
        writeln!(out, "{:<8} {}  ->  {}", entry.kind, entry.name, entry.source)?;
    }
    Ok(())
}
