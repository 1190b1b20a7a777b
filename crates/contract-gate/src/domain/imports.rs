//! # Import Extraction
//!
//! Reads `import` directives out of Solidity source and normalizes relative
//! paths the way the compiler does.

use regex::Regex;
use std::sync::LazyLock;

static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*import\b[^;"']*["']([^"']+)["'][^;]*;"#)
        .expect("valid import regex")
});

/// Import paths in order of appearance, exactly as written.
#[must_use]
pub fn extract_imports(source: &str) -> Vec<String> {
    IMPORT
        .captures_iter(source)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Resolves `path` as imported from `importer` into a source unit name.
///
/// Paths starting with `./` or `../` are relative to the importer's
/// directory; anything else is already absolute. Returns `None` when a
/// relative path climbs above the root.
#[must_use]
pub fn resolve_import(importer: &str, path: &str) -> Option<String> {
    let relative = path.starts_with("./") || path.starts_with("../");

    let mut segments: Vec<&str> = Vec::new();
    if relative {
        if let Some((dir, _)) = importer.rsplit_once('/') {
            segments.extend(dir.split('/').filter(|s| !s.is_empty()));
        }
    }

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }

    Some(segments.join("/"))
}
