//! Entry point for the clause tagger.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments.
//! - Load configuration from `conf/config.toml` (or `--config <path>`).
//! - Run each input document through `clause_core::run_file`.

mod config;

use crate::config::load_config;
use anyhow::{Result, anyhow};
use clause_core::run_file;
use std::env;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

const DEFAULT_CONFIG_PATH: &str = "conf/config.toml";
const USAGE: &str = "Usage: clause-tagger [--config <path>] <document.xhtml>...";

#[derive(Debug, PartialEq, Eq)]
struct CliArgs {
    config_path: PathBuf,
    inputs: Vec<PathBuf>,
}

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let args = parse_args(env::args().skip(1))?;
    let config = load_config(&args.config_path);
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        config = %args.config_path.display(),
        level = %config.log_level,
        inputs = args.inputs.len(),
        "Starting clause tagger"
    );

    let options = config.run_options();
    for input in &args.inputs {
        if !input.exists() {
            return Err(anyhow!("File not found: {}", input.display()));
        }
        let result = run_file(input, &options)?;
        info!(
            input = %result.input.display(),
            output = %result.output.display(),
            tags = result.report.tags_created,
            split_leaves = result.report.split_leaves,
            grouped_leaves = result.report.grouped_leaves,
            untouched_leaves = result.report.untouched_leaves,
            "Process has completed successfully"
        );
        if let Some(manifest) = &result.manifest {
            info!(path = %manifest.display(), "Wrote tag manifest");
        }
    }
    Ok(())
}

fn parse_args<I>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut inputs = Vec::new();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow!("--config needs a path\n{USAGE}"))?;
                config_path = PathBuf::from(path);
            }
            "--help" | "-h" => return Err(anyhow!(USAGE)),
            _ => inputs.push(PathBuf::from(arg)),
        }
    }
    if inputs.is_empty() {
        return Err(anyhow!(USAGE));
    }
    Ok(CliArgs {
        config_path,
        inputs,
    })
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    if env::var_os("RUST_LOG").is_some() {
        return;
    }
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = handle.modify(|filter| *filter = parsed) {
        warn!(%level, "Failed to update log level from config: {err}");
    }
}
