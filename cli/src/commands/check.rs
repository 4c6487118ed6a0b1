use std::path::Path;
use std::process::ExitCode;

use colored::*;
use pinlist_common::config::Config;
use pinlist_core::lint;
use tracing::info;

use crate::commands::{emit_json, load_manifest, outcome, plural};
use crate::terminal::{colors, format, print};

pub fn check(path: &Path, strict: bool, cfg: &Config) -> anyhow::Result<ExitCode> {
    let manifest = load_manifest(path)?;
    let report = lint::lint(&manifest, &cfg.settings.lint);
    let failed = report.fails(strict || cfg.settings.lint.deny_warnings);

    if cfg.json {
        emit_json(&report)?;
        return Ok(outcome(failed));
    }

    if report.diagnostics.is_empty() {
        info!("{} is clean", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    print::header("manifest lint", cfg.quiet);
    if cfg.quiet < 2 {
        for diagnostic in &report.diagnostics {
            print::print_status(format::diagnostic_line(diagnostic));
        }
    }

    let errors = plural(report.errors(), "error", "errors");
    let warnings = plural(report.warnings(), "warning", "warnings");
    let verdict = if failed {
        "Check failed".color(colors::ERROR).bold()
    } else {
        "Check passed".color(colors::OK).bold()
    };
    print::summary(&format!("{verdict}: {errors}, {warnings}"), cfg.quiet);

    Ok(outcome(failed))
}
