//! Canonical rendering of a manifest file.

use pinlist_common::manifest::line::split_inline_comment;
use pinlist_common::manifest::{Directive, Entry, Line, Manifest, Requirement};

#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Sort each contiguous run of requirement lines by normalized name.
    pub sort: bool,
}

/// Renders the manifest's own entries. Includes are not inlined.
pub fn format_manifest(manifest: &Manifest, options: FormatOptions) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut run: Vec<&Requirement> = Vec::new();

    for entry in manifest.entries() {
        if let Ok(Line::Requirement(requirement)) = &entry.line {
            run.push(requirement);
            continue;
        }

        flush_run(&mut run, &mut lines, options);
        push_line(&mut lines, render_entry(entry));
    }
    flush_run(&mut run, &mut lines, options);

    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }

    if lines.is_empty() {
        return String::new();
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Whether `text` is already in canonical form.
pub fn is_formatted(text: &str, options: FormatOptions) -> bool {
    format_manifest(&Manifest::parse(text, "<check>"), options) == text
}

fn flush_run(run: &mut Vec<&Requirement>, lines: &mut Vec<String>, options: FormatOptions) {
    if options.sort {
        run.sort_by(|a, b| a.name.normalized().cmp(b.name.normalized()));
    }
    for requirement in run.drain(..) {
        push_line(lines, render_requirement(requirement));
    }
}

// Drops leading blanks and collapses blank runs.
fn push_line(lines: &mut Vec<String>, line: String) {
    if line.is_empty() && lines.last().is_none_or(String::is_empty) {
        return;
    }
    lines.push(line);
}

fn render_entry(entry: &Entry) -> String {
    match &entry.line {
        Ok(Line::Blank) => String::new(),
        Ok(Line::Comment(text)) if text.is_empty() => "#".to_string(),
        Ok(Line::Comment(text)) => format!("# {text}"),
        Ok(Line::Directive(directive)) => {
            let (_, comment) = split_inline_comment(entry.raw.trim());
            with_comment(render_directive(directive), comment.as_deref())
        }
        Ok(Line::Requirement(requirement)) => render_requirement(requirement),
        Err(_) => entry.raw.trim_end().to_string(),
    }
}

fn render_directive(directive: &Directive) -> String {
    match directive {
        Directive::Include(path) => format!("-r {path}"),
        Directive::Constraint(path) => format!("-c {path}"),
        Directive::IndexUrl(url) => format!("-i {url}"),
        Directive::ExtraIndexUrl(url) => format!("--extra-index-url {url}"),
        Directive::Editable(target) => format!("-e {target}"),
        Directive::Other(raw) => raw.clone(),
    }
}

pub fn render_requirement(requirement: &Requirement) -> String {
    if requirement.editable {
        if let Some(url) = &requirement.url {
            return with_comment(format!("-e {url}"), requirement.inline_comment.as_deref());
        }
    }

    let mut out = requirement.name.to_string();
    if !requirement.extras.is_empty() {
        out.push_str(&format!("[{}]", requirement.extras.join(",")));
    }

    match &requirement.url {
        Some(url) => {
            out.push_str(&format!(" @ {url}"));
            if let Some(marker) = &requirement.marker {
                out.push_str(&format!(" ; {marker}"));
            }
        }
        None => {
            out.push_str(&requirement.specifiers.to_string());
            if let Some(marker) = &requirement.marker {
                out.push_str(&format!("; {marker}"));
            }
        }
    }

    with_comment(out, requirement.inline_comment.as_deref())
}

fn with_comment(line: String, comment: Option<&str>) -> String {
    match comment {
        Some(c) if !c.is_empty() => format!("{line}  # {c}"),
        _ => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(text: &str, sort: bool) -> String {
        format_manifest(&Manifest::parse(text, "r.txt"), FormatOptions { sort })
    }

    #[test]
    fn canonicalizes_spacing_and_blank_lines() {
        let input = "\n\n#Core Django\nDjango == 5.1.5   #  LTS soon\n\n\n\ncelery[ redis ] >= 5.3 ;python_version>'3.9'\n-r   base.txt # shared\n\n";
        let expected = "# Core Django\nDjango==5.1.5  # LTS soon\n\ncelery[redis]>=5.3; python_version>'3.9'\n-r base.txt  # shared\n";
        assert_eq!(fmt(input, false), expected);
    }

    #[test]
    fn sorting_stays_within_runs() {
        let input = "# Core\nDjango==5.1.5\nchannels==4.2.0\n\n# Queue\nredis==5.2.1\ncelery==5.4.0\n";
        let expected = "# Core\nchannels==4.2.0\nDjango==5.1.5\n\n# Queue\ncelery==5.4.0\nredis==5.2.1\n";
        assert_eq!(fmt(input, true), expected);
        assert_eq!(fmt(input, false), input);
    }

    #[test]
    fn invalid_lines_pass_through() {
        assert_eq!(fmt("Django 5.1.5\n", false), "Django 5.1.5\n");
    }

    #[test]
    fn formatting_is_idempotent() {
        let input = "# Search\nelasticsearch-dsl>=8,<9\ndjango-haystack @ https://example.com/h.zip ; python_version>'3'\n-e git+https://example.com/r.git#egg=notes\n";
        let once = fmt(input, true);
        assert_eq!(fmt(&once, true), once);
        assert!(is_formatted(&once, FormatOptions { sort: true }));
    }

    #[test]
    fn empty_manifest_renders_empty() {
        assert_eq!(fmt("\n\n", false), "");
    }
}
