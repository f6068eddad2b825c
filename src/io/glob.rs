//! Glob expansion for input patterns.
//!
//! A pattern operand stands for every regular file it matches, in sorted order,
//! so a run over `logs/2024-01-*.tsv` reads the days in calendar order and every
//! output file receives its rows in that order too.
//!
//! # Pattern Syntax
//!
//! - `*` matches any sequence of characters within a path component
//! - `?` matches any single character
//! - `**` matches zero or more directories
//! - `[abc]` / `[!abc]` match any character in / not in the set

use anyhow::{Context, Result, bail};
use glob::glob;
use std::path::PathBuf;

/// Whether `text` contains glob metacharacters.
///
/// ```
/// use fieldsplit::io::glob::is_glob_pattern;
///
/// assert!(is_glob_pattern("logs/*.tsv"));
/// assert!(!is_glob_pattern("logs/today.tsv"));
/// ```
#[must_use]
pub fn is_glob_pattern(text: &str) -> bool {
    text.contains(['*', '?', '['])
}

/// Expand `pattern` into the regular files it matches, sorted.
///
/// Directories that happen to match are skipped.
///
/// # Examples
///
/// ```no_run
/// use fieldsplit::io::glob::expand_glob;
///
/// let days = expand_glob("logs/2024-01-*.tsv")?;
/// assert!(days.windows(2).all(|w| w[0] < w[1]));
/// # Ok::<(), anyhow::Error>(())
/// ```
///
/// # Errors
///
/// Returns an error if:
/// - The pattern is invalid
/// - A matching directory entry cannot be read
/// - No regular file matches (an input operand must name at least one file)
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let matches = glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))?;

    let mut files = matches
        .filter(|entry| entry.as_ref().map_or(true, |path| path.is_file()))
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("read entries matching {pattern}"))?;
    if files.is_empty() {
        bail!("no files found matching pattern: {pattern}");
    }
    files.sort_unstable();
    Ok(files)
}
