//! Input sources and their order of processing.

use crate::io::compression::auto_detect_reader;
use crate::io::glob::{expand_glob, is_glob_pattern};
use anyhow::{Context, Result};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

/// One place rows are read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    Path(PathBuf),
    /// Expanded to its sorted matches by [`resolve_inputs`].
    Glob(String),
}

impl InputSource {
    /// Interpret a command-line operand: `-` is stdin, text with glob
    /// metacharacters that is not itself an existing path is a pattern.
    #[must_use]
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdin
        } else if is_glob_pattern(arg) && !std::path::Path::new(arg).exists() {
            Self::Glob(arg.to_string())
        } else {
            Self::Path(PathBuf::from(arg))
        }
    }

    /// Open the source for reading, decompressing if needed.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened. Unexpanded globs are
    /// opened as a literal path.
    pub fn open(&self) -> Result<Box<dyn Read>> {
        match self {
            Self::Stdin => auto_detect_reader(std::io::stdin(), ""),
            Self::Path(path) => {
                let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
                auto_detect_reader(f, path)
                    .with_context(|| format!("setup decompression for {}", path.display()))
            }
            Self::Glob(pattern) => {
                let f = File::open(pattern).with_context(|| format!("open {pattern}"))?;
                auto_detect_reader(f, pattern)
                    .with_context(|| format!("setup decompression for {pattern}"))
            }
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("<stdin>"),
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Glob(pattern) => f.write_str(pattern),
        }
    }
}

/// Flatten `sources` into concrete inputs, in order.
///
/// Globs expand to their sorted matches in place. An empty list means stdin.
///
/// # Errors
/// Fails if a pattern is invalid or matches nothing.
pub fn resolve_inputs(sources: &[InputSource]) -> Result<Vec<InputSource>> {
    if sources.is_empty() {
        return Ok(vec![InputSource::Stdin]);
    }
    let mut out = Vec::with_capacity(sources.len());
    for source in sources {
        match source {
            InputSource::Glob(pattern) => {
                out.extend(
                    expand_glob(pattern)?
                        .into_iter()
                        .map(InputSource::Path),
                );
            }
            other => out.push(other.clone()),
        }
    }
    Ok(out)
}
