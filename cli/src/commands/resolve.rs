use std::path::Path;
use std::process::ExitCode;

use pinlist_common::config::{Config, MAX_CONCURRENCY};
use pinlist_core::index::PypiIndex;
use pinlist_core::resolver::{self, Resolved};
use tracing::{Instrument, Span, info, warn};

use crate::commands::{emit_json, load_manifest, outcome, plural};
use crate::mprint;
use crate::terminal::{format, print, spinner};

pub async fn resolve(
    path: &Path,
    index_url: Option<String>,
    concurrency: Option<usize>,
    cfg: &Config,
) -> anyhow::Result<ExitCode> {
    let manifest = load_manifest(path)?;

    let mut settings = cfg.settings.index.clone();
    if let Some(url) = index_url {
        settings.url = url;
    }
    if let Some(limit) = concurrency {
        if !(1..=MAX_CONCURRENCY).contains(&limit) {
            warn!("Concurrency {limit} is out of range, using 1..={MAX_CONCURRENCY}");
        }
        settings.concurrency = limit.clamp(1, MAX_CONCURRENCY);
    }

    let index = PypiIndex::from_settings(&settings)?;
    let total = resolver::lookup_count(&manifest);

    if !cfg.json {
        print::header("index check", cfg.quiet);
        info!(
            "Checking {} against {}",
            plural(total, "package", "packages"),
            settings.url
        );
    }

    let span = if cfg.json || cfg.quiet > 1 {
        Span::none()
    } else {
        spinner::lookup_progress(total)?
    };
    let on_progress = (!span.is_none()).then(|| spinner::advance(span.clone()));

    let results = resolver::resolve(&manifest, &index, settings.concurrency, on_progress)
        .instrument(span.clone())
        .await;
    drop(span);

    let failed = results.iter().any(|r| r.resolution.is_problem());

    if cfg.json {
        emit_json(&results)?;
        return Ok(outcome(failed));
    }

    print_results(&results, cfg.quiet);
    print_problems(&results);

    let problems = results.iter().filter(|r| r.resolution.is_problem()).count();
    let outdated = results.iter().filter(|r| r.resolution.is_outdated()).count();
    print::summary(
        &format!(
            "{} checked, {} outdated, {}",
            plural(results.len(), "requirement", "requirements"),
            outdated,
            plural(problems, "problem", "problems")
        ),
        cfg.quiet,
    );

    Ok(outcome(failed))
}

fn print_results(results: &[Resolved], quiet: u8) {
    if quiet > 1 || results.is_empty() {
        return;
    }

    mprint!();
    print::as_tree_one_level(
        results
            .iter()
            .map(|r| (r.name.clone(), format::resolution_detail(&r.resolution)))
            .collect(),
    );
}

fn print_problems(results: &[Resolved]) {
    for result in results.iter().filter(|r| r.resolution.is_problem()) {
        warn!(
            "{} {} {}: {}",
            format::location(&result.origin, result.line),
            result.name,
            result.spec,
            format::resolution_detail(&result.resolution)
        );
    }
}
