use std::path::Path;
use std::process::ExitCode;

use pinlist_common::config::Config;
use pinlist_core::diff::{self, Change};
use tracing::info;

use crate::commands::{emit_json, load_manifest, plural};
use crate::terminal::{format, print};

pub fn diff(old: &Path, new: &Path, cfg: &Config) -> anyhow::Result<ExitCode> {
    let before = load_manifest(old)?;
    let after = load_manifest(new)?;
    let changes = diff::diff(&before, &after);

    if cfg.json {
        emit_json(&changes)?;
        return Ok(ExitCode::SUCCESS);
    }

    if changes.is_empty() {
        info!("{} and {} declare the same requirements", old.display(), new.display());
        return Ok(ExitCode::SUCCESS);
    }

    print::header("manifest diff", cfg.quiet);
    if cfg.quiet < 2 {
        for change in &changes {
            print::print_status(format::change_line(change));
        }
    }

    let count = |pred: fn(&Change) -> bool| changes.iter().filter(|c| pred(c)).count();
    let added = count(|c| matches!(c, Change::Added { .. }));
    let removed = count(|c| matches!(c, Change::Removed { .. }));
    let moved = count(|c| matches!(c, Change::Upgraded { .. } | Change::Downgraded { .. }));
    let respecified = count(|c| matches!(c, Change::Respecified { .. }));

    print::summary(
        &format!(
            "{added} added, {removed} removed, {} changed, {respecified} respecified",
            plural(moved, "version", "versions")
        ),
        cfg.quiet,
    );
    Ok(ExitCode::SUCCESS)
}
