use crate::error::PruneError;
use globset::Glob;
use ignore::WalkBuilder;
use log::{debug, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Turns configured paths and glob patterns into existing files.
///
/// Literal paths that do not exist are skipped with a warning. Glob patterns
/// are matched against a walk of their static prefix directory that honours
/// `.gitignore`. The result keeps first-seen order without duplicates.
pub fn resolve_inputs(patterns: &[String]) -> Result<Vec<PathBuf>, PruneError> {
    let mut paths = Vec::new();
    let mut seen = HashSet::new();

    for pattern in patterns {
        if contains_glob_meta(pattern) {
            for path in expand_glob(pattern)? {
                if seen.insert(path.clone()) {
                    paths.push(path);
                }
            }
            continue;
        }

        let path = PathBuf::from(pattern);
        if !path.is_file() {
            warn!("skipping missing file {}", path.display());
            continue;
        }
        if seen.insert(path.clone()) {
            paths.push(path);
        }
    }

    Ok(paths)
}

fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>, PruneError> {
    let matcher = Glob::new(pattern)
        .map_err(|source| PruneError::Glob {
            pattern: pattern.to_string(),
            source,
        })?
        .compile_matcher();
    let root = glob_root(pattern);

    let mut builder = WalkBuilder::new(&root);
    builder
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true);

    let mut matches = Vec::new();
    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!("skipping unreadable entry under {}: {}", root.display(), err);
                continue;
            }
        };
        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }
        let path = entry.path();
        let relative = path.strip_prefix(".").unwrap_or(path);
        if matcher.is_match(relative) {
            matches.push(relative.to_path_buf());
        }
    }

    matches.sort();
    if matches.is_empty() {
        warn!("pattern '{}' matched no files", pattern);
    }
    Ok(matches)
}

fn contains_glob_meta(input: &str) -> bool {
    input.chars().any(|ch| matches!(ch, '*' | '?' | '[' | '{'))
}

/// Directory holding everything a glob pattern can match.
fn glob_root(pattern: &str) -> PathBuf {
    let first_meta = pattern
        .char_indices()
        .find(|(_, ch)| matches!(ch, '*' | '?' | '[' | '{'))
        .map(|(idx, _)| idx)
        .unwrap_or(pattern.len());

    let prefix = pattern[..first_meta].trim_end_matches(['/', '\\']);
    if prefix.is_empty() {
        return PathBuf::from(".");
    }
    if first_meta < pattern.len() && !pattern[..first_meta].ends_with(['/', '\\']) {
        // The meta character sits inside a path component: use its parent.
        return match prefix.rfind(['/', '\\']) {
            Some(idx) => PathBuf::from(&prefix[..=idx]),
            None => PathBuf::from("."),
        };
    }
    Path::new(prefix).to_path_buf()
}
