#![cfg(test)]
use crate::fixture;
use pinlist_common::config::LintSettings;
use pinlist_common::manifest::Manifest;
use pinlist_core::diff::{self, Change};
use pinlist_core::format::{FormatOptions, format_manifest, is_formatted};
use pinlist_core::lint::{self, Rule};
use std::fs;

/// The shipped manifest parses cleanly and every entry is an exact pin.
#[test]
fn fixture_manifest_is_clean() {
    let manifest = Manifest::load(fixture("requirements.txt")).expect("fixture loads");

    assert!(manifest.issues().is_empty(), "{:?}", manifest.issues().len());
    assert_eq!(manifest.requirements().len(), 17);

    let report = lint::lint(&manifest, &LintSettings::default());
    assert!(
        report.diagnostics.is_empty(),
        "unexpected diagnostics: {:?}",
        report.diagnostics
    );
    assert!(!report.fails(true));
}

#[test]
fn django_pin_is_found() {
    let manifest = Manifest::load(fixture("requirements.txt")).unwrap();

    let django = manifest.find("django").expect("Django is declared");
    assert_eq!(django.requirement.name.as_str(), "Django");
    assert_eq!(django.requirement.pinned().unwrap().to_string(), "5.1.5");
    assert_eq!(
        django.section,
        Some("Core Django - Using Django 5.1 for better compatibility")
    );
}

#[test]
fn sections_follow_comment_blocks() {
    let manifest = Manifest::load(fixture("requirements.txt")).unwrap();

    let titles: Vec<_> = manifest
        .sections()
        .iter()
        .map(|s| s.title.unwrap_or_default().to_string())
        .collect();

    assert_eq!(titles.len(), 7);
    assert_eq!(titles[1], "Database");
    assert_eq!(titles[3], "Task queue");
    assert_eq!(titles[4], "Search");
}

#[test]
fn includes_are_followed_and_lint_sees_both_files() {
    let manifest = Manifest::load(fixture("requirements-dev.txt")).unwrap();

    assert_eq!(manifest.includes().len(), 1);
    assert_eq!(manifest.requirements().len(), 19);
    assert!(manifest.find("celery").is_some());

    let report = lint::lint(&manifest, &LintSettings::default());
    assert!(report.has(Rule::Unpinned));
    assert_eq!(report.errors(), 0);
    assert!(!report.fails(false));
    assert!(report.fails(true));

    let exempt = LintSettings {
        allow_unpinned: vec!["pytest_django".into()],
        ..LintSettings::default()
    };
    assert!(lint::lint(&manifest, &exempt).diagnostics.is_empty());
}

#[test]
fn duplicates_across_includes_are_errors() {
    let dir = tempfile::tempdir().unwrap();
    fs::copy(fixture("requirements.txt"), dir.path().join("base.txt")).unwrap();
    let top = dir.path().join("requirements.txt");
    fs::write(&top, "-r base.txt\nDJANGO==5.1.4\n").unwrap();

    let manifest = Manifest::load(&top).unwrap();
    let report = lint::lint(&manifest, &LintSettings::default());

    assert!(report.has(Rule::DuplicatePackage));
    assert!(report.fails(false));
}

#[test]
fn upgrade_shows_in_diff() {
    let dir = tempfile::tempdir().unwrap();
    let text = fs::read_to_string(fixture("requirements.txt")).unwrap();
    let old = Manifest::parse(&text, dir.path().join("old.txt"));
    let new = Manifest::parse(
        &text
            .replace("Django==5.1.5", "Django==5.2")
            .replace("django-ratelimit==4.1.0\n", ""),
        dir.path().join("new.txt"),
    );

    let changes = diff::diff(&old, &new);
    assert_eq!(changes.len(), 2);
    assert!(changes.iter().any(|c| matches!(c, Change::Upgraded { name, .. } if name == "Django")));
    assert!(changes.iter().any(|c| matches!(c, Change::Removed { name, .. } if name == "django-ratelimit")));
}

#[test]
fn fixture_is_already_canonical() {
    let text = fs::read_to_string(fixture("requirements.txt")).unwrap();
    assert!(is_formatted(&text, FormatOptions::default()));

    let messy = text.replace("Django==5.1.5", "Django == 5.1.5   ");
    let manifest = Manifest::parse(&messy, "requirements.txt");
    assert_eq!(format_manifest(&manifest, FormatOptions::default()), text);
}

#[test]
fn shared_base_file_is_not_a_duplicate() {
    let dir = tempfile::tempdir().unwrap();
    fs::copy(fixture("requirements.txt"), dir.path().join("base.txt")).unwrap();
    fs::write(dir.path().join("prod.txt"), "-r base.txt\ngunicorn==23.0.0\n").unwrap();
    fs::write(dir.path().join("dev.txt"), "-r base.txt\npytest==8.3.4\n").unwrap();
    let all = dir.path().join("all.txt");
    fs::write(&all, "-r prod.txt\n-r dev.txt\n").unwrap();

    let manifest = Manifest::load(&all).unwrap();
    assert_eq!(manifest.requirements().len(), 19);

    let report = lint::lint(&manifest, &LintSettings::default());
    assert!(!report.has(Rule::DuplicatePackage), "{:?}", report.diagnostics);
    assert!(!report.fails(true));
}
