#![cfg(test)]
use crate::fixture;
use pinlist_common::config::ImportSettings;
use pinlist_common::manifest::Manifest;
use pinlist_core::imports;
use std::fs;
use std::path::Path;

fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

/// A small Django project laid out like a real one.
fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    write(root, "notes/__init__.py", "");
    write(
        root,
        "notes/views.py",
        "from django.db.models import Q\n\
         from rest_framework import viewsets, permissions\n\
         from django_filters.rest_framework import DjangoFilterBackend\n\
         from .models import Note\n\
         from users.models import Profile\n",
    );
    write(
        root,
        "notes/signals.py",
        "import json\nfrom django.dispatch import receiver\nfrom channels.layers import get_channel_layer\n",
    );
    write(root, "users/__init__.py", "");
    write(
        root,
        "users/serializers.py",
        "from rest_framework import serializers\nimport markdown\n",
    );
    dir
}

#[test]
fn undeclared_and_unused_against_fixture() {
    let dir = project();
    let manifest = Manifest::load(fixture("requirements.txt")).unwrap();

    let report = imports::audit(&manifest, dir.path(), &ImportSettings::default()).unwrap();

    assert_eq!(report.files_scanned, 5);
    assert!(report.first_party.contains("notes"));
    assert!(report.first_party.contains("users"));
    assert!(report.stdlib.contains("json"));

    for used in ["django", "djangorestframework", "django-filter", "channels"] {
        assert!(report.used.contains(used), "{used} should be used");
    }

    assert_eq!(report.undeclared.len(), 1);
    let markdown = &report.undeclared[0];
    assert_eq!(markdown.distribution, "markdown");
    assert_eq!(markdown.sites.len(), 1);
    assert_eq!(markdown.sites[0].line, 2);

    assert!(report.unused.iter().any(|n| n == "celery"));
    assert!(!report.unused.iter().any(|n| n == "Django"));
}

#[test]
fn aliases_from_settings_declare_imports() {
    let dir = project();
    let manifest = Manifest::parse("Django==5.1.5\nMarkdown==3.7\n", "requirements.txt");
    let settings = ImportSettings {
        aliases: [("markdown".to_string(), "Markdown".to_string())].into(),
        ..ImportSettings::default()
    };

    let report = imports::audit(&manifest, dir.path(), &settings).unwrap();

    assert!(report.used.contains("markdown"));
    assert!(report.undeclared.iter().all(|u| u.distribution != "markdown"));
}

#[test]
fn missing_source_directory_is_an_error() {
    let manifest = Manifest::parse("Django==5.1.5\n", "requirements.txt");
    let result = imports::audit(&manifest, Path::new("/definitely/not/here"), &ImportSettings::default());
    assert!(result.is_err());
}
