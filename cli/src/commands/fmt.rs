use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use pinlist_common::config::Config;
use pinlist_common::manifest::Manifest;
use pinlist_core::format::{FormatOptions, format_manifest};
use serde_json::json;
use tracing::{info, warn};

use crate::commands::{emit_json, outcome};

pub fn fmt(path: &Path, sort: bool, check: bool, cfg: &Config) -> anyhow::Result<ExitCode> {
    let text = fs::read_to_string(path).with_context(|| format!("could not read {}", path.display()))?;
    let manifest = Manifest::parse(&text, path);

    let unparsed = manifest.issues().len();
    if unparsed > 0 {
        warn!("{unparsed} unparseable lines in {} are kept as-is", path.display());
    }

    let formatted = format_manifest(&manifest, FormatOptions { sort });
    let changed = formatted != text;

    if check {
        if cfg.json {
            emit_json(&json!({ "path": path, "formatted": !changed }))?;
        } else if changed {
            warn!("{} is not formatted", path.display());
        } else {
            info!("{} is formatted", path.display());
        }
        return Ok(outcome(changed));
    }

    if changed {
        fs::write(path, &formatted).with_context(|| format!("could not write {}", path.display()))?;
    }

    if cfg.json {
        emit_json(&json!({ "path": path, "changed": changed }))?;
    } else if changed {
        info!("Formatted {}", path.display());
    } else {
        info!("{} is already formatted", path.display());
    }
    Ok(ExitCode::SUCCESS)
}
