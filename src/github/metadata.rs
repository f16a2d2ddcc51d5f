//! Metadata derived from a source file's text
//!
//! Type and member names come from two independent pattern passes. The
//! description comes from the comment block at the top of the file.

use crate::config::RepositoryEntry;
use crate::crawler::collapse_whitespace;
use crate::storage::{ExampleKind, GitHubExample};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Names kept per extraction pass
const MAX_NAMES: usize = 10;

/// Lines scanned for a leading description
const DESCRIPTION_SCAN_LINES: usize = 30;

/// Longest stored description (characters)
const MAX_DESCRIPTION_CHARS: usize = 300;

/// Longest stored preview (characters)
const MAX_PREVIEW_CHARS: usize = 300;

/// Block comment and docstring delimiters
const BLOCK_COMMENTS: &[(&str, &str)] = &[
    ("/*", "*/"),
    ("<!--", "-->"),
    ("\"\"\"", "\"\"\""),
    ("'''", "'''"),
];

static TYPE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\b(?:class|interface|enum|struct|record|trait)\s+([A-Za-z_$][\w$]*)",
        r"\btype\s+([A-Z][\w$]*)\s*(?:<[^>]*>)?\s*=",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid type declaration regex"))
    .collect()
});

static MEMBER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // function grid() / def grid( / fn grid(
        r"\b(?:function\*?|def|fn)\s+([A-Za-z_$][\w$]*)\s*[(<]",
        // const render = (...) => / const render = async x =>
        r"\b(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*(?:async\s*)?(?:\([^)]*\)|[A-Za-z_$][\w$]*)\s*=>",
        // public void Render( / private static async Task<int> Load(
        r"(?m)^\s*(?:(?:public|private|protected|internal|static|async|override|virtual|abstract|final|sealed|synchronized)\s+)+[\w<>\[\],.?]+\s+([A-Za-z_]\w*)\s*\(",
        // render(args) { inside a class body
        r"(?m)^\s*(?:async\s+|static\s+|get\s+|set\s+)*([A-Za-z_$][\w$]*)\s*\([^)]*\)\s*\{",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid member declaration regex"))
    .collect()
});

/// Keywords that the member patterns pick up from control flow and calls
static STOPLIST: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "if", "else", "for", "foreach", "while", "do", "switch", "case", "catch", "try",
        "finally", "return", "throw", "new", "typeof", "instanceof", "function", "class",
        "interface", "enum", "struct", "import", "export", "from", "default", "const", "let",
        "var", "public", "private", "protected", "internal", "static", "async", "await",
        "void", "super", "this", "constructor", "using", "namespace", "package", "lock",
        "with", "yield", "delete", "in", "of", "get", "set", "require", "print", "self",
        "def", "fn", "type",
    ]
    .into_iter()
    .collect()
});

/// Builds the stored record for one fetched file
///
/// `content` must already be truncated to the stored size.
pub fn build_example(
    repo: &RepositoryEntry,
    path: &str,
    html_url: Option<&str>,
    content: String,
) -> GitHubExample {
    let repo_name = repo.full_name();
    let repo_url = format!("https://github.com/{}", repo_name);
    let file_url = html_url
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}/blob/HEAD/{}", repo_url, path));
    let title = path.rsplit('/').next().unwrap_or(path).to_string();

    GitHubExample {
        id: format!("{}/{}", repo_name, path),
        kind: classify_kind(path),
        title,
        file_path: path.to_string(),
        repo_url,
        file_url,
        language: language_for_path(path).to_string(),
        content_preview: truncate_chars(&content, MAX_PREVIEW_CHARS).to_string(),
        related_classes: extract_type_names(&content),
        related_methods: extract_member_names(&content),
        description: extract_description(&content),
        repo_name,
        content,
        fetched_at: Utc::now(),
    }
}

/// Type declaration names in order of appearance
pub fn extract_type_names(content: &str) -> Vec<String> {
    collect_names(&TYPE_PATTERNS, content)
}

/// Function and method names in order of appearance
pub fn extract_member_names(content: &str) -> Vec<String> {
    collect_names(&MEMBER_PATTERNS, content)
}

fn collect_names(patterns: &[Regex], content: &str) -> Vec<String> {
    let mut found: Vec<(usize, &str)> = patterns
        .iter()
        .flat_map(|pattern| pattern.captures_iter(content))
        .filter_map(|caps| caps.get(1))
        .map(|m| (m.start(), m.as_str()))
        .collect();
    found.sort_by_key(|&(position, _)| position);

    let mut seen = HashSet::new();
    found
        .into_iter()
        .map(|(_, name)| name)
        .filter(|name| !STOPLIST.contains(name.to_ascii_lowercase().as_str()))
        .filter(|name| seen.insert(*name))
        .take(MAX_NAMES)
        .map(str::to_string)
        .collect()
}

/// Joins the comment lines at the top of a file
///
/// Import, namespace, and package lines are skipped; the first other code
/// line ends the scan. Returns an empty string when there is no comment.
pub fn extract_description(content: &str) -> String {
    let mut parts = Vec::new();
    let mut block_end: Option<&str> = None;

    for line in content.lines().take(DESCRIPTION_SCAN_LINES) {
        let trimmed = line.trim();

        if let Some(end) = block_end {
            let (text, closed) = match trimmed.find(end) {
                Some(i) => (&trimmed[..i], true),
                None => (trimmed, false),
            };
            push_comment_text(&mut parts, text.trim_start_matches('*'));
            if closed {
                block_end = None;
            }
            continue;
        }

        if trimmed.is_empty() || is_import_line(trimmed) || trimmed.starts_with("#!") {
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("//") {
            push_comment_text(&mut parts, rest.trim_start_matches(['/', '!']));
        } else if let Some((open, close)) = BLOCK_COMMENTS
            .iter()
            .copied()
            .find(|(open, _)| trimmed.starts_with(open))
        {
            let rest = trimmed[open.len()..].trim_start_matches(['*', '!']);
            match rest.find(close) {
                Some(i) => push_comment_text(&mut parts, &rest[..i]),
                None => {
                    push_comment_text(&mut parts, rest);
                    block_end = Some(close);
                }
            }
        } else if let Some(rest) = trimmed.strip_prefix('#') {
            push_comment_text(&mut parts, rest.trim_start_matches('#'));
        } else {
            break;
        }
    }

    let description = collapse_whitespace(&parts.join(" "));
    truncate_chars(&description, MAX_DESCRIPTION_CHARS)
        .trim_end()
        .to_string()
}

fn push_comment_text(parts: &mut Vec<String>, text: &str) {
    let text = text.trim();
    if text.is_empty() || is_import_line(text) {
        return;
    }
    // JSDoc tags carry no prose
    if text.starts_with('@') {
        return;
    }
    parts.push(text.to_string());
}

fn is_import_line(line: &str) -> bool {
    const PREFIXES: &[&str] = &[
        "import ", "import{", "from ", "using ", "namespace ", "package ", "require(",
        "#include", "#region", "#endregion", "\"use strict\"", "'use strict'",
    ];
    PREFIXES.iter().any(|p| line.starts_with(p))
        || (line.starts_with("const ") && line.contains("require("))
}

/// Display language tag for a file extension
pub fn language_for_path(path: &str) -> &'static str {
    let extension = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "js" | "jsx" | "mjs" | "cjs" => "javascript",
        "ts" | "tsx" => "typescript",
        "cs" => "csharp",
        "java" => "java",
        "py" => "python",
        "html" | "htm" => "html",
        "md" => "markdown",
        "css" => "css",
        "json" => "json",
        _ => "text",
    }
}

/// Files under an example, sample, or demo directory are examples
pub fn classify_kind(path: &str) -> ExampleKind {
    let mut segments: Vec<&str> = path.split('/').collect();
    segments.pop();

    let is_example = segments.iter().any(|segment| {
        matches!(
            segment.to_ascii_lowercase().as_str(),
            "example" | "examples" | "sample" | "samples" | "demo" | "demos"
        )
    });

    if is_example {
        ExampleKind::Example
    } else {
        ExampleKind::CodeFile
    }
}

/// Longest prefix of at most `max_bytes` bytes ending on a char boundary
pub fn truncate_bytes(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Longest prefix of at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
