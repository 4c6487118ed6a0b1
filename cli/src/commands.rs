pub mod check;
pub mod diff;
pub mod fmt;
pub mod imports;
pub mod list;
pub mod resolve;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use pinlist_common::manifest::Manifest;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "pinlist")]
#[command(about = "Inspect, lint and verify Python requirement manifests.")]
#[command(version)]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file (defaults to ./pinlist.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Reduce output, repeat for less
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Do not print the banner
    #[arg(long, global = true)]
    pub no_banner: bool,

    /// Print a JSON document to stdout instead of terminal output
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List requirements grouped by their comment sections
    #[command(alias = "l")]
    List { manifest: PathBuf },
    /// Check that every line is a valid, pinned, unique requirement
    #[command(alias = "c")]
    Check {
        manifest: PathBuf,
        /// Fail on warnings too
        #[arg(long)]
        strict: bool,
    },
    /// Show what changed between two manifests
    #[command(alias = "d")]
    Diff { old: PathBuf, new: PathBuf },
    /// Rewrite a manifest in canonical form
    #[command(alias = "f")]
    Fmt {
        manifest: PathBuf,
        /// Sort requirements within each block
        #[arg(long)]
        sort: bool,
        /// Only report whether the file is formatted
        #[arg(long)]
        check: bool,
    },
    /// Verify pins against a package index
    #[command(alias = "r")]
    Resolve {
        manifest: PathBuf,
        /// Index base URL (PyPI JSON API compatible)
        #[arg(long)]
        index_url: Option<String>,
        /// Maximum number of concurrent lookups
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Compare a Python source tree's imports with the manifest
    #[command(alias = "i")]
    Imports { manifest: PathBuf, source: PathBuf },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

pub fn load_manifest(path: &Path) -> anyhow::Result<Manifest> {
    Manifest::load(path).with_context(|| format!("could not load manifest {}", path.display()))
}

pub fn emit_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn outcome(failed: bool) -> ExitCode {
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

pub fn plural(count: usize, singular: &str, plural: &str) -> String {
    let unit = if count == 1 { singular } else { plural };
    format!("{count} {unit}")
}
