//! Command-line arguments.

use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;
use tagdex_config::{CliOverrides, parse_duration_secs};
use tracing::Level;

/// tagdex - build a package index from tagged releases on GitHub and Bitbucket
#[derive(Parser, Debug)]
#[command(name = "tagdex")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Index file to write to
    #[arg(long, value_name = "PATH")]
    pub index: PathBuf,

    /// File containing the list of packages to create the index for
    #[arg(long, value_name = "PATH")]
    pub packages: PathBuf,

    /// Disable the tag cache and ignore the existing index
    #[arg(long)]
    pub no_cache: bool,

    /// Tag cache file [env: TAGDEX_CACHE_FILE]
    #[arg(long, value_name = "PATH")]
    pub cache_file: Option<PathBuf>,

    /// Network timeout in seconds [env: TAGDEX_TIMEOUT]
    #[arg(long, value_name = "SECONDS", value_parser = parse_duration_secs)]
    pub timeout: Option<Duration>,

    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only report errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Values that override the environment and defaults.
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            index: Some(self.index.clone()),
            packages: Some(self.packages.clone()),
            cache_file: self.cache_file.clone(),
            no_cache: self.no_cache,
            timeout: self.timeout,
        }
    }

    /// Default log level for the chosen verbosity.
    pub const fn log_level(&self) -> Level {
        match self.verbose {
            _ if self.quiet => Level::ERROR,
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_required_flags() {
        let cli = Cli::try_parse_from([
            "tagdex",
            "--index",
            "index.json",
            "--packages",
            "packages.json",
        ])
        .unwrap();
        assert_eq!(cli.index, PathBuf::from("index.json"));
        assert!(!cli.no_cache);
        assert_eq!(cli.log_level(), Level::INFO);

        let overrides = cli.overrides();
        assert_eq!(overrides.packages, Some(PathBuf::from("packages.json")));
        assert!(overrides.cache_file.is_none());
    }

    #[test]
    fn index_and_packages_are_required() {
        assert!(Cli::try_parse_from(["tagdex", "--index", "index.json"]).is_err());
        assert!(Cli::try_parse_from(["tagdex", "--packages", "p.json"]).is_err());
    }

    #[test]
    fn optional_flags() {
        let cli = Cli::try_parse_from([
            "tagdex",
            "--index",
            "i.json",
            "--packages",
            "p.json",
            "--no-cache",
            "--cache-file",
            "/tmp/tags.json",
            "--timeout",
            "30",
            "-vv",
        ])
        .unwrap();
        assert!(cli.no_cache);
        assert_eq!(cli.timeout, Some(Duration::from_secs(30)));
        assert_eq!(cli.log_level(), Level::TRACE);
        assert!(cli.overrides().no_cache);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let quiet =
            Cli::try_parse_from(["tagdex", "--index", "i", "--packages", "p", "-q"]).unwrap();
        assert_eq!(quiet.log_level(), Level::ERROR);
        assert!(
            Cli::try_parse_from(["tagdex", "--index", "i", "--packages", "p", "-q", "-v"])
                .is_err()
        );
    }
}
