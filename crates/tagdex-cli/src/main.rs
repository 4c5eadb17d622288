//! tagdex CLI - builds and incrementally updates a package index from the
//! release tags of git repositories.
//!
//! Exit codes: `0` success, `1` provider API quota exhausted, `2` a listed
//! repository does not exist, `3` configuration or I/O error, including
//! invalid command-line arguments.

#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod cli;
mod output;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use std::process::ExitCode;
use tagdex_config::{ConfigLoader, EnvConfig, IndexerConfig};
use tagdex_core::PackageList;
use tagdex_index::error::EXIT_CONFIG;
use tagdex_index::{IndexError, Indexer, RunStats};
use tagdex_repository::{HttpClient, HttpClientConfig};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(usage_exit_code(&e));
        }
    };

    let filter = EnvFilter::builder()
        .with_default_directive(cli.log_level().into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok((stats, config)) => {
            if !cli.quiet {
                output::success(&stats, &config.index_path);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            output::error(&e);
            ExitCode::from(exit_code(&e))
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<(RunStats, IndexerConfig)> {
    let env = EnvConfig::from_env().context("invalid environment")?;
    let config = ConfigLoader::new(cli.overrides())
        .with_env(env)
        .resolve()
        .context("invalid configuration")?;

    let packages = PackageList::load(&config.packages_path)
        .map_err(IndexError::from)
        .context("cannot read packages file")?;

    let client = HttpClient::new(HttpClientConfig {
        timeout: config.timeout,
        user_agent: config.user_agent.clone(),
        github_token: config.github_token.clone(),
    })
    .map_err(IndexError::from)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create runtime")?;

    let stats = runtime.block_on(async {
        let mut indexer = Indexer::new(&config, client)?;
        indexer.run(&packages).await
    })?;

    Ok((stats, config))
}

/// Exit code after argument parsing stopped the run. `--help` and
/// `--version` succeed; anything else is a configuration error.
fn usage_exit_code(err: &clap::Error) -> u8 {
    if err.use_stderr() { EXIT_CONFIG } else { 0 }
}

/// Exit code for a failed run, taken from the typed indexing error.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<IndexError>()
        .map_or(EXIT_CONFIG, IndexError::exit_code)
}
