use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSetBuilder};
use ignore::WalkBuilder;

fn has_glob_meta(s: &str) -> bool {
    s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
}

// Directory part of a pattern before its first glob meta-character
fn static_prefix_dir(pattern: &str) -> PathBuf {
    let idx = pattern
        .bytes()
        .position(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
        .unwrap_or(pattern.len());
    let p = Path::new(&pattern[..idx]);
    if p.is_dir() {
        p.to_path_buf()
    } else {
        p.parent()
            .filter(|pp| !pp.as_os_str().is_empty())
            .map(|pp| pp.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Expand glob patterns among the inputs into concrete file paths.
///
/// Plain paths are passed through untouched so missing files are still
/// reported by the checker. A pattern matching nothing is kept as-is for the
/// same reason. Order follows the inputs; duplicates are dropped.
pub fn expand_input_globs(inputs: &[String]) -> Result<Vec<String>, String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut results: Vec<String> = Vec::with_capacity(inputs.len());

    for input in inputs {
        let expanded = if has_glob_meta(input) {
            expand_pattern(input)?
        } else {
            Vec::new()
        };
        let expanded = if expanded.is_empty() {
            vec![input.clone()]
        } else {
            expanded
        };
        for path in expanded {
            if seen.insert(path.clone()) {
                results.push(path);
            }
        }
    }
    Ok(results)
}

fn expand_pattern(pattern: &str) -> Result<Vec<String>, String> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| format!("Invalid glob pattern '{}': {}", pattern, e))?;
    let set = GlobSetBuilder::new()
        .add(glob)
        .build()
        .map_err(|e| format!("Failed to build glob set: {}", e))?;

    let walker = WalkBuilder::new(static_prefix_dir(pattern))
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .hidden(false)
        .ignore(true)
        .parents(true)
        .build();

    let mut out: Vec<String> = Vec::new();
    for dent in walker {
        let dent = match dent {
            Ok(d) => d,
            Err(_e) => continue,
        };
        if !dent.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let path = dent.path();
        // walking "." yields "./a.xlf", which a pattern like "*.xlf" never matches
        let relative = path.strip_prefix(".").unwrap_or(path);
        if set.is_match(path) || set.is_match(relative) {
            out.push(path.to_string_lossy().to_string());
        }
    }
    out.sort();
    Ok(out)
}
