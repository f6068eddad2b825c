//! Bounded cache of append-mode output file handles.
//!
//! Every output file the run has touched keeps an entry for the rest of the run.
//! An entry is either holding a live handle or closed; a file that has never been
//! written is simply absent. Closed entries remember that the file (and its header)
//! already exists, so a reopen appends without emitting the header again.
//!
//! The number of live handles is bounded only by the descriptor limit. When an
//! open fails with `EMFILE` (or the configured soft ceiling is reached) every live
//! handle is flushed and closed in one pass and the open is retried. There is no
//! selective eviction; files are reopened lazily on their next row.

use crate::limits::is_descriptor_exhaustion;
use anyhow::{Context, Result};
use log::{debug, trace};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Upper bound on how many map slots a capacity hint may reserve up front.
const MAX_PREALLOCATED_ENTRIES: usize = 4096;

/// Observable lifecycle state of an output file within a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryState {
    /// Never written during this run.
    Unseen,
    /// Has a live handle.
    Open,
    /// Written earlier; its handle was released.
    Closed,
}

enum Entry {
    Open(BufWriter<File>),
    Closed,
}

impl Entry {
    /// Demote to `Closed`, handing back the live writer if there was one.
    fn close(&mut self) -> Option<BufWriter<File>> {
        match std::mem::replace(self, Self::Closed) {
            Self::Open(out) => Some(out),
            Self::Closed => None,
        }
    }
}

/// Filename-keyed cache of output handles, owned by a single run.
pub struct HandleCache {
    entries: HashMap<PathBuf, Entry>,
    open: usize,
    soft_limit: Option<usize>,
    flushes: u64,
}

impl HandleCache {
    /// Create an empty cache sized for roughly `capacity_hint` files.
    #[must_use]
    pub fn with_capacity(capacity_hint: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity_hint.min(MAX_PREALLOCATED_ENTRIES)),
            open: 0,
            soft_limit: None,
            flushes: 0,
        }
    }

    /// Treat `limit` live handles as descriptor exhaustion even if the host
    /// would allow more.
    #[must_use]
    pub fn with_soft_limit(mut self, limit: usize) -> Self {
        self.soft_limit = Some(limit);
        self
    }

    /// Append `line` to `path`.
    ///
    /// When the file is opened for the first time in this run and `header` is
    /// `Some`, the header is written before the line. Reopened files never get
    /// a second header.
    ///
    /// # Errors
    /// Any open failure other than descriptor exhaustion, and any write
    /// failure, is returned with the path attached.
    pub fn append(&mut self, path: &Path, line: &[u8], header: Option<&[u8]>) -> Result<()> {
        if let Some(Entry::Open(out)) = self.entries.get_mut(path) {
            return out
                .write_all(line)
                .with_context(|| format!("write {}", path.display()));
        }

        let seen = self.entries.contains_key(path);
        let file = self.open_output(path)?;
        let mut out = BufWriter::new(file);
        if !seen {
            trace!("new output file {}", path.display());
            if let Some(header) = header {
                out.write_all(header)
                    .with_context(|| format!("write header to {}", path.display()))?;
            }
        }
        out.write_all(line)
            .with_context(|| format!("write {}", path.display()))?;

        self.open += 1;
        if let Some(entry) = self.entries.get_mut(path) {
            *entry = Entry::Open(out);
        } else {
            self.entries.insert(path.to_path_buf(), Entry::Open(out));
        }
        Ok(())
    }

    /// Flush and close every live handle, keeping all entries as `Closed`.
    ///
    /// # Errors
    /// Returns the first flush failure.
    pub fn close_all(&mut self) -> Result<()> {
        for (path, entry) in &mut self.entries {
            if let Some(mut out) = entry.close() {
                self.open -= 1;
                out.flush()
                    .with_context(|| format!("write {}", path.display()))?;
            }
        }
        Ok(())
    }

    /// Lifecycle state of the output file at `path`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use fieldsplit::{EntryState, HandleCache};
    /// use std::path::Path;
    ///
    /// let mut cache = HandleCache::with_capacity(16);
    /// let path = Path::new("out/a");
    /// assert_eq!(cache.state(path), EntryState::Unseen);
    /// cache.append(path, b"a,1\n", None)?;
    /// assert_eq!(cache.state(path), EntryState::Open);
    /// cache.close_all()?;
    /// assert_eq!(cache.state(path), EntryState::Closed);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn state(&self, path: &Path) -> EntryState {
        match self.entries.get(path) {
            None => EntryState::Unseen,
            Some(Entry::Open(_)) => EntryState::Open,
            Some(Entry::Closed) => EntryState::Closed,
        }
    }

    /// Number of distinct output files touched so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no output file has been touched yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries currently holding a live handle.
    #[must_use]
    pub const fn open_count(&self) -> usize {
        self.open
    }

    /// How many times descriptor exhaustion forced a full close.
    #[must_use]
    pub const fn flush_count(&self) -> u64 {
        self.flushes
    }

    fn try_open(&self, path: &Path) -> io::Result<File> {
        if self.soft_limit.is_some_and(|limit| self.open >= limit) {
            return Err(io::Error::from_raw_os_error(libc::EMFILE));
        }
        OpenOptions::new().append(true).create(true).open(path)
    }

    fn open_output(&mut self, path: &Path) -> Result<File> {
        loop {
            match self.try_open(path) {
                Ok(file) => return Ok(file),
                // With nothing left to close a retry could never succeed.
                Err(e) if is_descriptor_exhaustion(&e) && self.open > 0 => {
                    debug!(
                        "out of file descriptors opening {}; closing {} open files",
                        path.display(),
                        self.open
                    );
                    self.close_all()?;
                    self.flushes += 1;
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("open {}", path.display()));
                }
            }
        }
    }
}
