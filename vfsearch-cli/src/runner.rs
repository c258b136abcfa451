//! Shared setup for CLI commands: logging, configuration and the resolver.

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;
use vfsearch::{default_config_path, Resolver, ResolverConfig};

use crate::error::CliError;

/// Setup options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct SetupArgs {
    pub config: Option<PathBuf>,
    pub root: Option<PathBuf>,
    pub depth: Option<usize>,
    pub dirs: Vec<String>,
    pub archives: Vec<String>,
    pub indexes: Vec<String>,
    pub patches: Vec<(String, PathBuf)>,
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise verbosity picks the level.
pub fn init_logging(verbose: u8) {
    let default_directive = match verbose {
        0 => "vfsearch=warn",
        1 => "vfsearch=info",
        _ => "vfsearch=debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Merge the configuration file with command-line options.
///
/// An explicit `--config` must load. Otherwise the default config file is
/// used when present. Command-line values override scalar settings and are
/// appended to list settings, so patches given on the command line still
/// apply after the configured ones.
pub fn build_config(args: &SetupArgs) -> Result<ResolverConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => ResolverConfig::load(path)?,
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => ResolverConfig::load(&path)?,
            None => ResolverConfig::default(),
        },
    };

    if let Some(root) = &args.root {
        config.root = root.clone();
    }
    if let Some(depth) = args.depth {
        config.depth = depth;
    }
    config.dirs.extend(args.dirs.iter().cloned());
    config.archives.extend(args.archives.iter().cloned());
    config.indexes.extend(args.indexes.iter().cloned());
    config.patches.extend(args.patches.iter().cloned());

    Ok(config)
}

/// Parse a `SRC=DST` patch argument.
pub fn parse_patch(value: &str) -> Result<(String, PathBuf), String> {
    let (src, dst) = value
        .split_once('=')
        .ok_or_else(|| format!("expected SRC=DST, got '{}'", value))?;
    let (src, dst) = (src.trim(), dst.trim());
    if src.is_empty() || dst.is_empty() {
        return Err(format!("expected SRC=DST, got '{}'", value));
    }
    Ok((src.to_string(), PathBuf::from(dst)))
}

/// Configuration plus the resolver built from it.
pub struct CliRunner {
    config: ResolverConfig,
    resolver: Resolver,
}

impl CliRunner {
    /// Load configuration and run the setup phase.
    pub fn new(args: &SetupArgs) -> Result<Self, CliError> {
        let config = build_config(args)?;
        let resolver = config.build();
        Ok(Self { config, resolver })
    }

    /// Log what the command is about to work with.
    pub fn log_startup(&self, command: &str) {
        tracing::info!(
            command = command,
            version = vfsearch::VERSION,
            root = %self.config.root.display(),
            depth = self.config.depth,
            entries = self.resolver.len(),
            "vfsearch starting"
        );
    }

    /// The populated resolver.
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_patch() {
        assert_eq!(
            parse_patch("scripts/intro.scr=/fixes/intro.scr").unwrap(),
            ("scripts/intro.scr".to_string(), PathBuf::from("/fixes/intro.scr"))
        );
        assert!(parse_patch("no-separator").is_err());
        assert!(parse_patch("=/only/dst").is_err());
    }

    #[test]
    fn test_build_config_merges_cli_options() {
        let temp = TempDir::new().unwrap();
        let ini = temp.path().join("config.ini");
        std::fs::write(
            &ini,
            "[resolver]\nroot = /games\ndepth = 4\n[search]\ndirs = data1\n",
        )
        .unwrap();

        let args = SetupArgs {
            config: Some(ini),
            depth: Some(1),
            dirs: vec!["data2".to_string()],
            patches: vec![("a".to_string(), PathBuf::from("/p/a"))],
            ..Default::default()
        };
        let config = build_config(&args).unwrap();

        assert_eq!(config.root, PathBuf::from("/games"));
        assert_eq!(config.depth, 1);
        assert_eq!(config.dirs, vec!["data1", "data2"]);
        assert_eq!(config.patches.len(), 1);
    }

    #[test]
    fn test_build_config_missing_explicit_file() {
        let args = SetupArgs {
            config: Some(PathBuf::from("/nonexistent/vfsearch.ini")),
            ..Default::default()
        };
        assert!(matches!(build_config(&args), Err(CliError::Config(_))));
    }

    #[test]
    fn test_runner_builds_resolver() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("data")).unwrap();
        std::fs::write(temp.path().join("data/a.txt"), b"a").unwrap();
        let ini = temp.path().join("config.ini");
        std::fs::write(&ini, "[resolver]\ndepth = 0\n").unwrap();

        let args = SetupArgs {
            config: Some(ini),
            root: Some(temp.path().to_path_buf()),
            dirs: vec!["data".to_string()],
            ..Default::default()
        };
        let runner = CliRunner::new(&args).unwrap();

        assert!(runner.resolver().has_file("DATA/A.TXT"));
    }
}
