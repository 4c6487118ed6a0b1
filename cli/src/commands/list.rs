use std::path::Path;
use std::process::ExitCode;

use pinlist_common::config::Config;
use pinlist_common::manifest::{Manifest, Requirement};
use serde::Serialize;
use tracing::warn;

use crate::commands::{emit_json, load_manifest, plural};
use crate::mprint;
use crate::terminal::{format, print};

#[derive(Serialize)]
struct Listing<'a> {
    requirements: Vec<ListedRequirement<'a>>,
    issues: Vec<ListedIssue<'a>>,
}

#[derive(Serialize)]
struct ListedRequirement<'a> {
    origin: &'a Path,
    line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    section: Option<&'a str>,
    #[serde(flatten)]
    requirement: &'a Requirement,
}

#[derive(Serialize)]
struct ListedIssue<'a> {
    origin: &'a Path,
    line: usize,
    raw: &'a str,
    error: String,
}

pub fn list(path: &Path, cfg: &Config) -> anyhow::Result<ExitCode> {
    let manifest = load_manifest(path)?;

    if cfg.json {
        emit_json(&listing(&manifest))?;
        return Ok(ExitCode::SUCCESS);
    }

    if manifest.requirements().is_empty() && manifest.issues().is_empty() {
        print::no_results("requirements");
        return Ok(ExitCode::SUCCESS);
    }

    print::header("requirements", cfg.quiet);

    let mut idx: usize = 0;
    print_sections(&manifest, &mut idx, cfg);

    for issue in manifest.issues() {
        warn!(
            "{} {} ('{}')",
            format::location(issue.origin, issue.line_no),
            issue.error,
            issue.raw.trim()
        );
    }

    let total = manifest.requirements().len();
    print::summary(
        &format!(
            "{} in {}",
            plural(total, "requirement", "requirements"),
            plural(idx, "section", "sections")
        ),
        cfg.quiet,
    );
    Ok(ExitCode::SUCCESS)
}

fn listing(manifest: &Manifest) -> Listing<'_> {
    Listing {
        requirements: manifest
            .requirements()
            .into_iter()
            .map(|located| ListedRequirement {
                origin: located.origin,
                line: located.line_no,
                section: located.section,
                requirement: located.requirement,
            })
            .collect(),
        issues: manifest
            .issues()
            .into_iter()
            .map(|issue| ListedIssue {
                origin: issue.origin,
                line: issue.line_no,
                raw: issue.raw,
                error: issue.error.to_string(),
            })
            .collect(),
    }
}

fn print_sections(manifest: &Manifest, idx: &mut usize, cfg: &Config) {
    let is_include = *idx > 0;

    for section in manifest.sections() {
        if *idx > 0 {
            mprint!();
        }

        let title = section.title.unwrap_or("(untitled)");
        let title = if is_include {
            format!("{title} [{}]", manifest.origin().display())
        } else {
            title.to_string()
        };

        print::tree_head(*idx, &title);
        if cfg.quiet < 2 {
            print::as_tree_one_level(
                section
                    .requirements
                    .iter()
                    .map(format::requirement_detail)
                    .collect(),
            );
        }
        *idx += 1;
    }

    for include in manifest.includes() {
        print_sections(include, idx, cfg);
    }
}
