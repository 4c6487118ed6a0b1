//! Line-oriented extraction of Python import statements.
//!
//! This is not a Python parser. It recognizes `import a.b as c, d` and
//! `from a.b import x` at any indentation, skips relative imports and
//! `__future__`, and ignores text inside triple-quoted strings.

const TRIPLE_QUOTES: [&str; 2] = ["\"\"\"", "'''"];

/// A top-level module name and the 1-based line it was imported on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedModule {
    pub module: String,
    pub line: usize,
}

pub fn parse_imports(source: &str) -> Vec<ImportedModule> {
    let mut out = Vec::new();
    let mut open_string: Option<&str> = None;

    for (idx, line) in source.lines().enumerate() {
        if let Some(delimiter) = open_string {
            if line.matches(delimiter).count() % 2 == 1 {
                open_string = None;
            }
            continue;
        }

        let code = line.split('#').next().unwrap_or("");
        for statement in code.split(';') {
            for module in modules_in(statement.trim()) {
                out.push(ImportedModule { module, line: idx + 1 });
            }
        }

        open_string = TRIPLE_QUOTES
            .into_iter()
            .filter_map(|q| code.find(q).map(|pos| (pos, q)))
            .min_by_key(|(pos, _)| *pos)
            .filter(|(_, q)| code.matches(q).count() % 2 == 1)
            .map(|(_, q)| q);
    }

    out
}

fn modules_in(statement: &str) -> Vec<String> {
    if let Some(rest) = strip_keyword(statement, "import") {
        return rest
            .trim_matches(|c| c == '(' || c == ')')
            .split(',')
            .filter_map(|part| part.split_whitespace().next())
            .filter_map(top_level)
            .collect();
    }

    if let Some(rest) = strip_keyword(statement, "from") {
        let Some(module) = rest.split_whitespace().next() else {
            return Vec::new();
        };
        let imports_something = rest
            .split_whitespace()
            .nth(1)
            .is_some_and(|word| word == "import");

        if !imports_something || module.starts_with('.') || module == "__future__" {
            return Vec::new();
        }
        return top_level(module).into_iter().collect();
    }

    Vec::new()
}

/// `keyword` followed by whitespace at the start of `statement`.
fn strip_keyword<'a>(statement: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = statement.strip_prefix(keyword)?;
    rest.starts_with(char::is_whitespace).then_some(rest)
}

fn top_level(dotted: &str) -> Option<String> {
    let head = dotted.split('.').next()?;
    is_identifier(head).then(|| head.to_string())
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
