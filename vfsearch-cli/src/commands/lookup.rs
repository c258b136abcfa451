//! Single-name commands: `which`, `cat` and `check`.

use std::io::{self, Write};

use vfsearch::Resolver;

use crate::error::CliError;

/// Print the winning source for `name`.
pub fn run_which(resolver: &Resolver, name: &str) -> Result<(), CliError> {
    let entry = resolver
        .resolve(name)
        .ok_or_else(|| CliError::NotFound(name.to_string()))?;
    println!("{} ({})", entry.source, entry.kind());
    Ok(())
}

/// Copy the content of `name` to stdout.
pub fn run_cat(resolver: &Resolver, name: &str) -> Result<(), CliError> {
    let mut handle = resolver
        .open_file(name)
        .ok_or_else(|| CliError::NotFound(name.to_string()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    io::copy(&mut handle, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Succeed only if `name` resolves to openable content.
pub fn run_check(resolver: &Resolver, name: &str) -> Result<(), CliError> {
    if resolver.open_file(name).is_some() {
        Ok(())
    } else {
        Err(CliError::NotFound(name.to_string()))
    }
}
