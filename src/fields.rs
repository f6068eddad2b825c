//! Locating fields inside delimited rows.
//!
//! Rows are raw bytes: the default delimiter (`0xfe`) is not valid UTF-8 and
//! field values are routed byte-for-byte. Delimiters may be longer than one
//! byte. The line terminator (`\n` or `\r\n`) never belongs to the last field.

use memchr::memmem::Finder;

/// Strip a trailing `\n` or `\r\n`.
#[inline]
#[must_use]
pub fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Field splitter for one delimiter.
pub struct FieldSplitter {
    finder: Finder<'static>,
}

impl FieldSplitter {
    /// # Panics
    /// Panics if `delimiter` is empty; configuration validation rejects that earlier.
    #[must_use]
    pub fn new(delimiter: &[u8]) -> Self {
        assert!(!delimiter.is_empty(), "delimiter must not be empty");
        Self {
            finder: Finder::new(delimiter).into_owned(),
        }
    }

    /// The delimiter fields are split on.
    #[must_use]
    pub fn delimiter(&self) -> &[u8] {
        self.finder.needle()
    }

    /// Iterate the fields of `line` in order.
    pub fn fields<'a>(&'a self, line: &'a [u8]) -> impl Iterator<Item = &'a [u8]> + 'a {
        let step = self.delimiter().len();
        let mut rest = Some(strip_terminator(line));
        std::iter::from_fn(move || {
            let current = rest?;
            match self.finder.find(current) {
                Some(pos) => {
                    rest = Some(&current[pos + step..]);
                    Some(&current[..pos])
                }
                None => {
                    rest = None;
                    Some(current)
                }
            }
        })
    }

    /// The field at 0-based `index`, or an empty slice when the row is shorter.
    #[must_use]
    pub fn field<'a>(&'a self, line: &'a [u8], index: usize) -> &'a [u8] {
        self.fields(line).nth(index).unwrap_or_default()
    }

    /// 0-based position of the field named by `labels` in `header`.
    ///
    /// `labels` is a comma-separated list; only its first entry selects the
    /// routing field.
    #[must_use]
    pub fn resolve_label(&self, labels: &str, header: &[u8]) -> Option<usize> {
        let label = labels.split(',').next().filter(|l| !l.is_empty())?;
        self.fields(header).position(|f| f == label.as_bytes())
    }
}
