//! Run configuration.
//!
//! A [`SplitConfig`] is built once, validated with [`SplitConfig::validate`], and
//! then read by the router for the whole run.
//!
//! ```
//! use fieldsplit::SplitConfig;
//!
//! let config = SplitConfig::by_index(2)
//!     .delimiter(b",".to_vec())
//!     .output_dir("out")
//!     .suffix(".csv")
//!     .keep_header(true);
//! config.validate()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::key::Bucketer;
use anyhow::{Context, Result, bail};
use std::path::PathBuf;

/// Delimiter used when neither the configuration nor `DELIMITER` names one.
pub const DEFAULT_DELIMITER: &[u8] = &[0xfe];

/// Environment variable consulted for the delimiter.
pub const DELIMITER_ENV: &str = "DELIMITER";

/// Which field decides a row's output file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldSelector {
    /// 0-based field position.
    Index(usize),
    /// Field label(s) looked up in each input's header line.
    Label(String),
}

/// Everything a run needs besides its inputs.
///
/// Fields are public for callers that assemble a configuration by hand, as the
/// command-line front end does; the builder methods cover the common cases.
#[derive(Clone, Debug)]
pub struct SplitConfig {
    /// Routing field. Required; [`SplitConfig::validate`] rejects `None`.
    pub field: Option<FieldSelector>,
    /// Field separator, already escape-expanded.
    pub delimiter: Vec<u8>,
    /// Directory output files are created in.
    pub output_dir: PathBuf,
    /// Appended to every output file name.
    pub suffix: Option<String>,
    /// Copy each input's header line to the top of files it creates.
    pub keep_header: bool,
    /// Replace keys with hashed bucket names.
    pub buckets: Option<Bucketer>,
    /// Soft ceiling on simultaneously open output files.
    pub max_open_files: Option<usize>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            field: None,
            delimiter: DEFAULT_DELIMITER.to_vec(),
            output_dir: PathBuf::from("."),
            suffix: None,
            keep_header: false,
            buckets: None,
            max_open_files: None,
        }
    }
}

impl SplitConfig {
    /// Route on the 1-based field `position`, as operators number fields.
    #[must_use]
    pub fn by_index(position: usize) -> Self {
        Self {
            field: Some(FieldSelector::Index(position.saturating_sub(1))),
            ..Self::default()
        }
    }

    /// Route on the field named `label` in each input's header.
    #[must_use]
    pub fn by_label(label: impl Into<String>) -> Self {
        Self {
            field: Some(FieldSelector::Label(label.into())),
            ..Self::default()
        }
    }

    /// Set the field separator (raw bytes, no escape expansion).
    #[must_use]
    pub fn delimiter(mut self, delimiter: Vec<u8>) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the directory output files are written to.
    #[must_use]
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Append `suffix` to every output file name.
    #[must_use]
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// Treat each input's first line as a header and copy it into new files.
    #[must_use]
    pub fn keep_header(mut self, keep: bool) -> Self {
        self.keep_header = keep;
        self
    }

    /// Route on hashed bucket names instead of keys.
    #[must_use]
    pub fn buckets(mut self, bucketer: Bucketer) -> Self {
        self.buckets = Some(bucketer);
        self
    }

    /// Keep at most `limit` output files open at once.
    #[must_use]
    pub fn max_open_files(mut self, limit: usize) -> Self {
        self.max_open_files = Some(limit);
        self
    }

    /// Whether each input's first line is a header rather than a data row.
    #[must_use]
    pub fn reads_header(&self) -> bool {
        self.keep_header || matches!(self.field, Some(FieldSelector::Label(_)))
    }

    /// Check the configuration before any input is read.
    ///
    /// # Errors
    /// Fails when no field selector is set, the label is empty, the delimiter
    /// is empty, or the open-file ceiling is zero.
    pub fn validate(&self) -> Result<()> {
        match &self.field {
            None => bail!("either a field position or a field label must be specified"),
            Some(FieldSelector::Label(label)) if label.is_empty() => {
                bail!("field label must not be empty")
            }
            Some(_) => {}
        }
        if self.delimiter.is_empty() {
            bail!("delimiter must not be empty");
        }
        if self.max_open_files == Some(0) {
            bail!("open file limit must be at least 1");
        }
        Ok(())
    }
}

/// Pick the delimiter: the explicit one, else `DELIMITER`, else
/// [`DEFAULT_DELIMITER`]. Escape sequences are expanded.
///
/// # Errors
/// Returns an error if the chosen text contains a malformed escape.
pub fn resolve_delimiter(explicit: Option<&str>) -> Result<Vec<u8>> {
    let env = std::env::var(DELIMITER_ENV).ok();
    match explicit.or(env.as_deref()) {
        Some(text) => {
            expand_escapes(text).with_context(|| format!("invalid delimiter: {text:?}"))
        }
        None => Ok(DEFAULT_DELIMITER.to_vec()),
    }
}

/// Expand `\t`, `\n`, `\r`, `\\`, `\xHH` and `\NNN` (octal) in `text`.
///
/// # Errors
/// Returns an error for a trailing backslash or a hex escape without digits.
pub fn expand_escapes(text: &str) -> Result<Vec<u8>> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        let Some(&esc) = bytes.get(i + 1) else {
            bail!("trailing backslash");
        };
        i += 2;
        match esc {
            b't' => out.push(b'\t'),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b'\\' => out.push(b'\\'),
            b'x' => {
                let digits = take_digits(&bytes[i..], 2, 16);
                if digits.is_empty() {
                    bail!("\\x escape without hex digits");
                }
                i += digits.len();
                out.push(parse_radix(digits, 16));
            }
            b'0'..=b'7' => {
                let digits = take_digits(&bytes[i - 1..], 3, 8);
                i += digits.len() - 1;
                out.push(parse_radix(digits, 8));
            }
            other => {
                out.push(b'\\');
                out.push(other);
            }
        }
    }
    Ok(out)
}

fn take_digits(bytes: &[u8], max: usize, radix: u32) -> &[u8] {
    let n = bytes
        .iter()
        .take(max)
        .take_while(|b| char::from(**b).is_digit(radix))
        .count();
    &bytes[..n]
}

fn parse_radix(digits: &[u8], radix: u32) -> u8 {
    digits.iter().fold(0u8, |acc, &d| {
        let v = char::from(d).to_digit(radix).unwrap_or(0) as u8;
        acc.wrapping_mul(radix as u8).wrapping_add(v)
    })
}
