//! # Manifest Lint
//!
//! Checks the invariants a manifest is expected to hold:
//! every line parses, no package is declared twice, and every requirement
//! is pinned to an exact `name==version`.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use pinlist_common::config::LintSettings;
use pinlist_common::manifest::{Directive, Line, Located, Manifest, name};
use serde::{Serialize, Serializer};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    InvalidLine,
    DuplicatePackage,
    Unpinned,
    PrereleasePin,
    UnsortedSection,
    NotReproducible,
}

impl Rule {
    pub fn code(self) -> &'static str {
        match self {
            Rule::InvalidLine => "E001",
            Rule::DuplicatePackage => "E002",
            Rule::Unpinned => "W001",
            Rule::PrereleasePin => "W002",
            Rule::UnsortedSection => "W003",
            Rule::NotReproducible => "W004",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Rule::InvalidLine => "invalid-line",
            Rule::DuplicatePackage => "duplicate-package",
            Rule::Unpinned => "unpinned",
            Rule::PrereleasePin => "prerelease-pin",
            Rule::UnsortedSection => "unsorted-section",
            Rule::NotReproducible => "not-reproducible",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            Rule::InvalidLine | Rule::DuplicatePackage => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Rule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub rule: Rule,
    pub severity: Severity,
    pub origin: PathBuf,
    pub line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    pub message: String,
}

impl Diagnostic {
    fn new(rule: Rule, origin: impl Into<PathBuf>, line: usize, message: String) -> Self {
        Self {
            rule,
            severity: rule.severity(),
            origin: origin.into(),
            line,
            package: None,
            message,
        }
    }

    fn at(rule: Rule, located: &Located<'_>, message: String) -> Self {
        Self {
            package: Some(located.requirement.name.to_string()),
            ..Self::new(rule, located.origin, located.line_no, message)
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LintReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl LintReport {
    pub fn errors(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warnings(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    pub fn has(&self, rule: Rule) -> bool {
        self.diagnostics.iter().any(|d| d.rule == rule)
    }

    /// Whether the report should fail the run.
    pub fn fails(&self, deny_warnings: bool) -> bool {
        self.errors() > 0 || (deny_warnings && self.warnings() > 0)
    }
}

pub fn lint(manifest: &Manifest, settings: &LintSettings) -> LintReport {
    let mut diagnostics = Vec::new();

    check_parse_issues(manifest, &mut diagnostics);
    check_duplicates(manifest, &mut diagnostics);
    check_pins(manifest, settings, &mut diagnostics);
    check_editable_targets(manifest, &mut diagnostics);
    if settings.require_sorted {
        check_sorted(manifest, &mut diagnostics);
    }

    diagnostics.sort_by(|a, b| {
        (&a.origin, a.line, a.rule.code()).cmp(&(&b.origin, b.line, b.rule.code()))
    });

    debug!("Lint produced {} diagnostics", diagnostics.len());
    LintReport { diagnostics }
}

fn check_parse_issues(manifest: &Manifest, out: &mut Vec<Diagnostic>) {
    for issue in manifest.issues() {
        out.push(Diagnostic::new(
            Rule::InvalidLine,
            issue.origin,
            issue.line_no,
            format!("{} in '{}'", issue.error, issue.raw.trim()),
        ));
    }
}

fn check_duplicates(manifest: &Manifest, out: &mut Vec<Diagnostic>) {
    let mut seen: HashMap<&str, Located<'_>> = HashMap::new();

    for located in manifest.requirements() {
        let key = located.requirement.name.normalized();
        match seen.get(key) {
            Some(first) => out.push(Diagnostic::at(
                Rule::DuplicatePackage,
                &located,
                format!(
                    "'{}' is already declared at {}:{}",
                    located.requirement.name,
                    first.origin.display(),
                    first.line_no
                ),
            )),
            None => {
                seen.insert(key, located);
            }
        }
    }
}

fn check_pins(manifest: &Manifest, settings: &LintSettings, out: &mut Vec<Diagnostic>) {
    let exempt: Vec<String> = settings
        .allow_unpinned
        .iter()
        .map(|n| name::normalize(n))
        .collect();

    for located in manifest.requirements() {
        let requirement = located.requirement;

        if let Some(url) = &requirement.url {
            let how = if requirement.editable { "editable from" } else { "installed from" };
            out.push(Diagnostic::at(
                Rule::NotReproducible,
                &located,
                format!("'{}' is {how} {url}", requirement.name),
            ));
            continue;
        }

        match requirement.pinned() {
            Some(version) if version.is_prerelease() => out.push(Diagnostic::at(
                Rule::PrereleasePin,
                &located,
                format!("'{}' is pinned to pre-release {version}", requirement.name),
            )),
            Some(_) => {}
            None if exempt.iter().any(|n| n == requirement.name.normalized()) => {}
            None if requirement.specifiers.is_empty() => out.push(Diagnostic::at(
                Rule::Unpinned,
                &located,
                format!("'{}' has no version pin", requirement.name),
            )),
            None => out.push(Diagnostic::at(
                Rule::Unpinned,
                &located,
                format!(
                    "'{}' uses '{}' instead of an exact '==' pin",
                    requirement.name, requirement.specifiers
                ),
            )),
        }
    }
}

// Editable installs without `#egg=` never become requirements.
fn check_editable_targets(manifest: &Manifest, out: &mut Vec<Diagnostic>) {
    for entry in manifest.entries() {
        if let Ok(Line::Directive(Directive::Editable(target))) = &entry.line {
            out.push(Diagnostic::new(
                Rule::NotReproducible,
                manifest.origin(),
                entry.line_no,
                format!("'{target}' is an editable install"),
            ));
        }
    }

    for include in manifest.includes() {
        check_editable_targets(include, out);
    }
}

fn check_sorted(manifest: &Manifest, out: &mut Vec<Diagnostic>) {
    for section in manifest.sections() {
        for pair in section.requirements.windows(2) {
            let (prev, cur) = (&pair[0], &pair[1]);
            if prev.requirement.name.normalized() > cur.requirement.name.normalized() {
                let title = section.title.unwrap_or("(untitled)");
                out.push(Diagnostic::at(
                    Rule::UnsortedSection,
                    cur,
                    format!(
                        "'{}' should come before '{}' in section '{title}'",
                        cur.requirement.name, prev.requirement.name
                    ),
                ));
            }
        }
    }

    for include in manifest.includes() {
        check_sorted(include, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> LintReport {
        lint(&Manifest::parse(text, "requirements.txt"), &LintSettings::default())
    }

    #[test]
    fn clean_manifest_passes() {
        let report = run("# Core Django\nDjango==5.1.5\ndjangorestframework==3.15.2\n");
        assert!(report.diagnostics.is_empty());
        assert!(!report.fails(true));
    }

    #[test]
    fn invalid_lines_are_errors() {
        let report = run("Django==5.1.5\nthis is not valid\n");
        assert_eq!(report.errors(), 1);
        assert_eq!(report.diagnostics[0].rule, Rule::InvalidLine);
        assert_eq!(report.diagnostics[0].line, 2);
        assert!(report.fails(false));
    }

    #[test]
    fn duplicates_compare_normalized_names() {
        let report = run("Django==5.1.5\nredis==5.2.1\ndjango==5.1.4\n");
        let dup = report
            .diagnostics
            .iter()
            .find(|d| d.rule == Rule::DuplicatePackage)
            .unwrap();
        assert_eq!(dup.line, 3);
        assert!(dup.message.contains("requirements.txt:1"));
    }

    #[test]
    fn unpinned_and_exemptions() {
        let text = "Django>=5.1\npip\nredis==5.2.1\n";
        let report = run(text);
        assert_eq!(report.warnings(), 2);
        assert!(!report.fails(false));
        assert!(report.fails(true));

        let settings = LintSettings {
            allow_unpinned: vec!["PIP".into()],
            ..Default::default()
        };
        let report = lint(&Manifest::parse(text, "r.txt"), &settings);
        assert_eq!(report.warnings(), 1);
        assert_eq!(report.diagnostics[0].package.as_deref(), Some("Django"));
    }

    #[test]
    fn prerelease_and_url_requirements() {
        let report = run("channels==4.2.0rc1\nwatson @ https://example.com/watson.zip\n");
        assert!(report.has(Rule::PrereleasePin));
        assert!(report.has(Rule::NotReproducible));
        assert!(!report.has(Rule::Unpinned));
    }

    #[test]
    fn editable_installs_are_not_reproducible() {
        let report = run("-e .\n-e git+https://github.com/org/notes.git#egg=notes-core\nDjango==5.1.5\n");
        let lines: Vec<usize> = report
            .diagnostics
            .iter()
            .filter(|d| d.rule == Rule::NotReproducible)
            .map(|d| d.line)
            .collect();
        assert_eq!(lines, vec![1, 2]);
        assert_eq!(report.diagnostics[0].package, None);
        assert_eq!(report.errors(), 0);
    }

    #[test]
    fn sorting_is_opt_in_and_per_section() {
        let text = "# Core\nDjango==5.1.5\nchannels==4.2.0\n# Queue\ncelery==5.4.0\nredis==5.2.1\n";
        assert!(!run(text).has(Rule::UnsortedSection));

        let settings = LintSettings {
            require_sorted: true,
            ..Default::default()
        };
        let report = lint(&Manifest::parse(text, "r.txt"), &settings);
        let unsorted: Vec<&Diagnostic> = report
            .diagnostics
            .iter()
            .filter(|d| d.rule == Rule::UnsortedSection)
            .collect();
        assert_eq!(unsorted.len(), 1);
        assert_eq!(unsorted[0].line, 3);
    }
}
