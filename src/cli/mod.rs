pub mod common;
pub mod parser;
pub mod reader;

pub use common::*;
pub use parser::ParsedConfig;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use parser::parse_config;
use reader::read_config;

use crate::error::MigrationError;
use crate::filter::Selection;

/// Migrates repositories declared in a Terraform snapshot from an archived
/// organization into a new one.
#[derive(Parser, Debug)]
#[clap(name = "repo-migrate", version)]
pub struct Args {
    /// Directory holding the snapshot; the import artifact is written here
    #[clap(parse(from_os_str))]
    pub directory: PathBuf,

    /// Perform the migration. Without it nothing is changed remotely
    #[clap(long)]
    pub yes: bool,

    /// Comma separated repositories to migrate
    #[clap(long)]
    pub only: Option<String>,

    /// Comma separated repositories to leave out
    #[clap(long)]
    pub exclude: Option<String>,

    /// Config file, defaults to <DIRECTORY>/migrate.yaml
    #[clap(long, parse(from_os_str))]
    pub config: Option<PathBuf>,
}

impl Args {
    pub fn selection(&self) -> Selection {
        Selection {
            only: self.only.as_deref().map(split_list),
            exclude: self.exclude.as_deref().map(split_list),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| self.directory.join("migrate.yaml"))
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct Invocation {
    pub config: ParsedConfig,
    pub selection: Selection,
    pub execute: bool,
}

/// Parses the command line and loads the config. Malformed invocations are
/// reported as [`MigrationError::Usage`] rather than exiting through clap.
pub fn run() -> Result<Invocation> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => return Err(MigrationError::Usage(e.to_string()).into()),
    };
    load(&args)
}

pub fn load(args: &Args) -> Result<Invocation> {
    let path = args.config_path();
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("could not read file `{:?}`", &path))?;

    let raw = read_config(&content).with_context(|| format!("invalid config `{:?}`", &path))?;
    let config = parse_config(raw, &args.directory, std::env::var("GITHUB_TOKEN").ok())?;

    Ok(Invocation {
        config,
        selection: args.selection(),
        execute: args.yes,
    })
}
