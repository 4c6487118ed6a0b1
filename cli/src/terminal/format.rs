use std::path::Path;

use crate::terminal::colors;
use colored::*;
use pinlist_common::manifest::Located;
use pinlist_core::diff::{Change, describe};
use pinlist_core::lint::{Diagnostic, Severity};
use pinlist_core::resolver::Resolution;

pub fn location(origin: &Path, line: usize) -> ColoredString {
    format!("{}:{}", origin.display(), line).color(colors::SEPARATOR)
}

pub fn requirement_detail(located: &Located<'_>) -> (String, ColoredString) {
    let spec = describe(located.requirement);
    let value = if located.requirement.is_pinned() {
        spec.color(colors::VERSION)
    } else {
        spec.color(colors::WARNING)
    };
    (located.requirement.name.to_string(), value)
}

pub fn diagnostic_line(diagnostic: &Diagnostic) -> String {
    let code = match diagnostic.severity {
        Severity::Error => diagnostic.rule.code().color(colors::ERROR).bold(),
        Severity::Warning => diagnostic.rule.code().color(colors::WARNING).bold(),
    };
    format!(
        "{} {} {} {}",
        code,
        location(&diagnostic.origin, diagnostic.line),
        diagnostic.message,
        format!("({})", diagnostic.rule.name()).color(colors::SEPARATOR)
    )
}

pub fn change_line(change: &Change) -> String {
    let arrow = "→".color(colors::SEPARATOR);
    match change {
        Change::Added { name, spec } => {
            format!("{} {} {}", "+".color(colors::OK).bold(), name.color(colors::PACKAGE), spec)
        }
        Change::Removed { name, spec } => {
            format!("{} {} {}", "-".color(colors::ERROR).bold(), name.color(colors::PACKAGE), spec)
        }
        Change::Upgraded { name, from, to } => format!(
            "{} {} {} {} {}",
            "↑".color(colors::OK).bold(),
            name.color(colors::PACKAGE),
            from.to_string().color(colors::SEPARATOR),
            arrow,
            to.to_string().color(colors::VERSION)
        ),
        Change::Downgraded { name, from, to } => format!(
            "{} {} {} {} {}",
            "↓".color(colors::WARNING).bold(),
            name.color(colors::PACKAGE),
            from.to_string().color(colors::SEPARATOR),
            arrow,
            to.to_string().color(colors::WARNING)
        ),
        Change::Respecified { name, from, to } => format!(
            "{} {} {} {} {}",
            "~".color(colors::ACCENT).bold(),
            name.color(colors::PACKAGE),
            from.color(colors::SEPARATOR),
            arrow,
            to
        ),
    }
}

pub fn resolution_detail(resolution: &Resolution) -> ColoredString {
    match resolution {
        Resolution::Pinned {
            version,
            latest: Some(latest),
        } if latest > version => format!("{version} (latest {latest})").color(colors::WARNING),
        Resolution::Pinned { version, .. } => format!("{version} ok").color(colors::OK),
        Resolution::MissingVersion { version, latest } => match latest {
            Some(latest) => format!("{version} not found (latest {latest})").color(colors::ERROR),
            None => format!("{version} not found").color(colors::ERROR),
        },
        Resolution::Satisfiable { best } => format!("resolves to {best}").color(colors::OK),
        Resolution::Unsatisfiable => "no matching release".color(colors::ERROR),
        Resolution::UnknownPackage => "unknown package".color(colors::ERROR),
        Resolution::Unchecked => "not checked".color(colors::SEPARATOR),
        Resolution::Failed { reason } => format!("lookup failed: {reason}").color(colors::ERROR),
    }
}
