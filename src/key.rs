//! Key derivation: turning a raw field value into an output file name.
//!
//! Two stages run in sequence for every row:
//!
//! 1. [`transform_key`] rewrites the field value into something safe to use as a
//!    file name: an empty value becomes [`BLANK_KEY`], whitespace and `/` become `_`.
//! 2. When bucketing is configured, a [`Bucketer`] hashes the transformed key with
//!    [`strhash32`] and replaces it with a zero-padded bucket number.
//!
//! # Examples
//!
//! ```
//! use fieldsplit::key::{transform_key, Bucketer};
//!
//! let mut key = Vec::new();
//! transform_key(b"new york/ny", &mut key);
//! assert_eq!(key, b"new_york_ny");
//!
//! let bucketer: Bucketer = "007".parse()?;
//! let mut bucketed = Vec::new();
//! bucketer.bucket_key(&key, &mut bucketed);
//! assert_eq!(bucketed.len(), 3);
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result, bail};
use std::str::FromStr;

/// Key used for rows whose routing field is empty.
pub const BLANK_KEY: &[u8] = b"_blank_value";

/// Byte written in place of every whitespace character and `/`.
const REPLACEMENT: u8 = b'_';

/// Whitespace as the C locale's `isspace` defines it.
///
/// Unlike [`u8::is_ascii_whitespace`] this includes vertical tab (`0x0b`).
#[inline]
#[must_use]
pub const fn is_c_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

/// Write the filesystem-safe form of `value` into `out`.
///
/// The value ends at its first NUL byte, since a file name cannot hold one;
/// a value that is empty up to that point maps to [`BLANK_KEY`].
/// `out` is cleared first and reused; its capacity only ever grows.
///
/// # Examples
///
/// ```
/// use fieldsplit::key::{transform_key, BLANK_KEY};
///
/// let mut key = Vec::new();
/// transform_key(b"", &mut key);
/// assert_eq!(key, BLANK_KEY);
///
/// transform_key(b"id\0rest", &mut key);
/// assert_eq!(key, b"id");
/// ```
pub fn transform_key(value: &[u8], out: &mut Vec<u8>) {
    out.clear();
    let value = value.split(|&b| b == 0).next().unwrap_or_default();
    if value.is_empty() {
        out.extend_from_slice(BLANK_KEY);
        return;
    }
    out.extend(value.iter().map(|&b| {
        if is_c_space(b) || b == b'/' {
            REPLACEMENT
        } else {
            b
        }
    }));
}

/// Multiplicative string hash (`acc * 33 + byte`, wrapping at 32 bits).
///
/// Bytes are treated as unsigned.
#[inline]
#[must_use]
pub fn strhash32(data: &[u8]) -> u32 {
    data.iter()
        .fold(0u32, |acc, &b| acc.wrapping_mul(33).wrapping_add(u32::from(b)))
}

/// Maps transformed keys onto a fixed number of zero-padded bucket names.
///
/// The padding width is the length of the bucket-count text exactly as the
/// operator wrote it, so `"007"` produces `000`..`006` and `"7"` produces
/// `0`..`6`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bucketer {
    count: u32,
    width: usize,
}

impl Bucketer {
    /// Build a bucketer from a count and an explicit padding width.
    ///
    /// # Errors
    /// Returns an error if `count` is zero.
    pub fn new(count: u32, width: usize) -> Result<Self> {
        if count == 0 {
            bail!("bucket count must be greater than zero");
        }
        Ok(Self { count, width })
    }

    /// Number of buckets keys are spread over.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Minimum width of a bucket name; shorter numbers are zero-padded.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Bucket number for `key`, always in `0..count`.
    #[inline]
    #[must_use]
    pub fn bucket(&self, key: &[u8]) -> u32 {
        strhash32(key) % self.count
    }

    /// Write the formatted bucket name for `key` into `out` (cleared first).
    ///
    /// # Examples
    ///
    /// ```
    /// use fieldsplit::key::Bucketer;
    ///
    /// let bucketer = Bucketer::new(100, 3)?;
    /// let mut name = Vec::new();
    /// bucketer.bucket_key(b"abc", &mut name); // 108966 % 100
    /// assert_eq!(name, b"066");
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn bucket_key(&self, key: &[u8], out: &mut Vec<u8>) {
        out.clear();
        let name = format!("{:0width$}", self.bucket(key), width = self.width);
        out.extend_from_slice(name.as_bytes());
    }
}

impl FromStr for Bucketer {
    type Err = anyhow::Error;

    /// Parse the operator's bucket-count argument, keeping its text width.
    fn from_str(text: &str) -> Result<Self> {
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
            bail!("invalid bucket count: {text:?}");
        }
        let count = text
            .parse::<u32>()
            .with_context(|| format!("bucket count out of range: {text}"))?;
        Self::new(count, text.len())
            .with_context(|| format!("invalid bucket count: {text:?}"))
    }
}
