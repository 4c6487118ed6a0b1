use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use colored::*;
use pinlist_common::config::Config;
use pinlist_core::imports::{self, ImportReport, Undeclared};
use tracing::info;

use crate::commands::{emit_json, load_manifest, outcome, plural};
use crate::mprint;
use crate::terminal::{colors, format, print};

const MAX_SITES: usize = 3;

pub fn imports(manifest_path: &Path, source: &Path, cfg: &Config) -> anyhow::Result<ExitCode> {
    let manifest = load_manifest(manifest_path)?;
    let report = imports::audit(&manifest, source, &cfg.settings.imports)
        .with_context(|| format!("could not scan {}", source.display()))?;
    let failed = !report.undeclared.is_empty();

    if cfg.json {
        emit_json(&report)?;
        return Ok(outcome(failed));
    }

    print::header("import audit", cfg.quiet);
    info!(
        "Scanned {} under {}",
        plural(report.files_scanned, "file", "files"),
        source.display()
    );

    if report.undeclared.is_empty() {
        info!("Every third-party import is declared in {}", manifest_path.display());
    } else if cfg.quiet < 2 {
        for (idx, undeclared) in report.undeclared.iter().enumerate() {
            if idx > 0 {
                mprint!();
            }
            print::tree_head(idx, &undeclared.distribution);
            print::as_tree_one_level(undeclared_detail(undeclared));
        }
    }

    print_unused(&report, cfg.quiet);

    print::summary(
        &format!(
            "{} used, {} undeclared, {} never imported",
            report.used.len(),
            report.undeclared.len(),
            report.unused.len()
        ),
        cfg.quiet,
    );

    Ok(outcome(failed))
}

fn undeclared_detail(undeclared: &Undeclared) -> Vec<(String, ColoredString)> {
    let modules = undeclared
        .modules
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    let mut detail = vec![("imports".to_string(), modules.color(colors::PACKAGE))];

    for site in undeclared.sites.iter().take(MAX_SITES) {
        detail.push(("at".to_string(), format::location(&site.file, site.line)));
    }

    let hidden = undeclared.sites.len().saturating_sub(MAX_SITES);
    if hidden > 0 {
        detail.push((
            "and".to_string(),
            plural(hidden, "more site", "more sites").color(colors::SEPARATOR),
        ));
    }
    detail
}

fn print_unused(report: &ImportReport, quiet: u8) {
    if report.unused.is_empty() || quiet > 1 {
        return;
    }

    mprint!();
    print::aligned_line(
        "Not imported",
        report.unused.join(", ").color(colors::WARNING),
        12,
    );
}
