//! # CLI Layer
//!
//! One possible UI client for tag-monger, and the only place in the codebase
//! that knows about terminal I/O, process exit codes and argument parsing.
//!
//! ## Responsibilities
//!
//! 1. **Argument Parsing**: shell arguments and `TAG_MONGER_*` variables via clap
//! 2. **Config Layering**: defaults, then the config file, then env and flags
//! 3. **Provider Selection**: exactly one storage backend, picked once
//! 4. **Logging Setup**: a `tracing` subscriber on stderr
//! 5. **Output Formatting**: `CmdResult` into colored terminal output
//!
//! Business logic stays in the command layer.

use super::print::{print_classification, print_messages, print_relocations};
use super::setup::Cli;
use clap::Parser;
use directories::ProjectDirs;
use std::path::PathBuf;
use tag_monger::api::MongerApi;
use tag_monger::config::{MongerConfig, CONFIG_FILENAME};
use tag_monger::error::{MongerError, Result};
use tag_monger::store::cloud::CloudStore;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing(config.verbose);

    let provider = config
        .provider
        .ok_or_else(|| MongerError::config("no provider was selected"))?;
    debug!(%provider, bucket = ?config.bucket, "starting sweep");

    let api = MongerApi::new(CloudStore::new(provider)?);
    let result = api.sweep(&config)?;

    print_messages(&result.messages);
    if config.verbose {
        if let Some(classification) = &result.classification {
            print_classification(classification);
        }
    }
    print_relocations(&result.relocations);
    Ok(())
}

/// Filter used when `RUST_LOG` is unset. Moves are logged at info.
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "warn,tag_monger=debug"
    } else {
        "warn,tag_monger=info"
    }
}

fn init_tracing(verbose: bool) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbose))))
        .try_init();
}

fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "tag-monger").map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// Defaults, overridden by the config file, overridden by env and flags.
fn load_config(cli: &Cli) -> Result<MongerConfig> {
    let mut config = match &cli.config {
        Some(path) if !path.exists() => {
            return Err(MongerError::config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        Some(path) => MongerConfig::load(path)?,
        None => match default_config_path() {
            Some(path) => MongerConfig::load(path)?,
            None => MongerConfig::default(),
        },
    };
    apply_cli(cli, &mut config);
    Ok(config)
}

fn apply_cli(cli: &Cli, config: &mut MongerConfig) {
    if let Some(provider) = cli.provider() {
        config.provider = Some(provider);
    }
    if let Some(bucket) = &cli.bucket {
        config.bucket = Some(bucket.clone());
    }
    if let Some(page_size) = cli.page_size {
        config.page_size = page_size;
    }
    if let Some(max) = cli.max {
        config.max_objects = max;
    }
    if let Some(days) = cli.days {
        config.days = days;
    }
    if let Some(tz) = &cli.time_zone {
        config.time_zone = tz.clone();
    }
    if let Some(dir) = &cli.archive_dir {
        config.archive_dir = dir.clone();
    }
    if let Some(pattern) = &cli.pattern {
        config.pattern = pattern.clone();
    }
    if let Some(numbering) = cli.week_numbering {
        config.week_numbering = numbering;
    }
    if cli.noop {
        config.noop = true;
    }
    if cli.verbose {
        config.verbose = true;
    }
}
