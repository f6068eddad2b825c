//! Line-at-a-time reading with a reused buffer.

use anyhow::{Context, Result};
use std::io::{BufRead, BufReader, Read};

/// Reads `\n`-terminated lines, keeping the terminator so rows are written
/// back byte-for-byte. The final line may lack one.
pub struct LineReader<R> {
    inner: BufReader<R>,
    buf: Vec<u8>,
    line_no: u64,
}

impl<R: Read> LineReader<R> {
    /// Wrap `reader` in a buffered line reader.
    pub fn new(reader: R) -> Self {
        Self {
            inner: BufReader::new(reader),
            buf: Vec::new(),
            line_no: 0,
        }
    }

    /// The next line, or `None` at end of input.
    ///
    /// # Errors
    /// Returns the underlying read error annotated with the line number.
    pub fn next_line(&mut self) -> Result<Option<&[u8]>> {
        self.buf.clear();
        let n = self
            .inner
            .read_until(b'\n', &mut self.buf)
            .with_context(|| format!("read line {}", self.line_no + 1))?;
        if n == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        Ok(Some(&self.buf))
    }

    /// Number of lines returned so far.
    #[must_use]
    pub const fn line_no(&self) -> u64 {
        self.line_no
    }
}
