//! The driver loop: read rows, derive keys, append rows to their files.
//!
//! Inputs are processed strictly one after another and rows one at a time, so
//! each output file receives its rows in the order they were read.
//!
//! ```no_run
//! use fieldsplit::{run, InputSource, SplitConfig};
//!
//! let config = SplitConfig::by_index(1)
//!     .delimiter(b",".to_vec())
//!     .output_dir("by_region");
//! let stats = run(&config, &[InputSource::Path("sales.csv".into())])?;
//! println!("{} rows into {} files", stats.rows, stats.files);
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::cache::HandleCache;
use crate::config::{FieldSelector, SplitConfig};
use crate::fields::FieldSplitter;
use crate::io::input::{InputSource, resolve_inputs};
use crate::io::lines::LineReader;
use crate::key::transform_key;
use crate::limits::open_files_budget;
use crate::stats::RunStats;
use anyhow::{Context, Result, bail};
use log::{debug, info};
use std::fs::create_dir_all;
use std::io::Read;
use std::path::PathBuf;

/// Route every row of `sources` into per-key files under the configured
/// output directory.
///
/// # Errors
/// Configuration problems are reported before any input is opened. After that
/// the first read, open or write failure ends the run; files already written
/// stay on disk as they are.
pub fn run(config: &SplitConfig, sources: &[InputSource]) -> Result<RunStats> {
    config.validate()?;
    let inputs = resolve_inputs(sources)?;
    let budget = open_files_budget(config.max_open_files);
    info!(
        "splitting {} input(s) into {} (open file budget {budget})",
        inputs.len(),
        config.output_dir.display()
    );

    let mut router = Router::new(config, budget)?;
    for input in &inputs {
        router.route_source(input)?;
    }
    router.finish()
}

/// [`run`], reduced to a process exit status (`0` success, `1` failure).
///
/// The error chain is printed to stderr.
#[must_use]
pub fn run_exit_code(config: &SplitConfig, sources: &[InputSource]) -> i32 {
    match run(config, sources) {
        Ok(_) => 0,
        Err(err) => {
            eprintln!("fieldsplit: {err:#}");
            1
        }
    }
}

/// Routing state for one run. Owns the handle cache and the reusable key buffers.
pub struct Router<'a> {
    config: &'a SplitConfig,
    splitter: FieldSplitter,
    cache: HandleCache,
    key: Vec<u8>,
    bucketed: Vec<u8>,
    file_name: Vec<u8>,
    stats: RunStats,
}

impl<'a> Router<'a> {
    /// Prepare a run: validate `config`, create the output directory and size
    /// the handle cache for `budget` open files.
    ///
    /// # Errors
    /// Fails on invalid configuration or if the output directory cannot be created.
    pub fn new(config: &'a SplitConfig, budget: usize) -> Result<Self> {
        config.validate()?;
        create_dir_all(&config.output_dir)
            .with_context(|| format!("mkdir -p {}", config.output_dir.display()))?;

        let mut cache = HandleCache::with_capacity(budget);
        if let Some(limit) = config.max_open_files {
            cache = cache.with_soft_limit(limit);
        }
        Ok(Self {
            config,
            splitter: FieldSplitter::new(&config.delimiter),
            cache,
            key: Vec::with_capacity(128),
            bucketed: Vec::new(),
            file_name: Vec::with_capacity(128),
            stats: RunStats {
                open_files_budget: budget,
                ..RunStats::default()
            },
        })
    }

    /// Open `source` and route all of its rows.
    ///
    /// # Errors
    /// See [`Router::route_reader`]; also fails if the source cannot be opened.
    pub fn route_source(&mut self, source: &InputSource) -> Result<()> {
        let reader = source.open()?;
        self.route_reader(reader, &source.to_string())
    }

    /// Route all rows of one input stream. `name` labels error messages.
    ///
    /// # Errors
    /// Fails if the field label cannot be found in this stream's header, or
    /// on any read, open or write failure.
    pub fn route_reader<R: Read>(&mut self, reader: R, name: &str) -> Result<()> {
        debug!("reading {name}");
        self.stats.inputs += 1;
        let mut lines = LineReader::new(reader);

        let header = if self.config.reads_header() {
            lines.next_line()?.map(<[u8]>::to_vec)
        } else {
            None
        };

        let field_index = match &self.config.field {
            Some(FieldSelector::Index(index)) => *index,
            Some(FieldSelector::Label(labels)) => {
                // An empty input has no header and no rows.
                let Some(header) = header.as_deref() else {
                    return Ok(());
                };
                self.splitter
                    .resolve_label(labels, header)
                    .with_context(|| format!("{name}: error parsing field label {labels:?}"))?
            }
            None => bail!("either a field position or a field label must be specified"),
        };
        let header_out = if self.config.keep_header {
            header.as_deref()
        } else {
            None
        };

        let mut row_no = lines.line_no();
        while let Some(line) = lines.next_line()? {
            row_no += 1;
            transform_key(self.splitter.field(line, field_index), &mut self.key);
            if let Some(bucketer) = &self.config.buckets {
                bucketer.bucket_key(&self.key, &mut self.bucketed);
                std::mem::swap(&mut self.key, &mut self.bucketed);
            }

            self.file_name.clear();
            self.file_name.extend_from_slice(&self.key);
            if let Some(suffix) = &self.config.suffix {
                self.file_name.extend_from_slice(suffix.as_bytes());
            }
            let path = self.config.output_dir.join(file_name_os(&self.file_name));

            self.cache
                .append(&path, line, header_out)
                .with_context(|| format!("{name}: line {row_no}"))?;
            self.stats.rows += 1;
        }
        Ok(())
    }

    /// Close every open output file and report the run's totals.
    ///
    /// # Errors
    /// Returns the first failure to flush a buffered output file.
    pub fn finish(mut self) -> Result<RunStats> {
        self.cache.close_all()?;
        self.stats.files = self.cache.len();
        self.stats.descriptor_flushes = self.cache.flush_count();
        info!(
            "routed {} rows from {} input(s) into {} files ({} descriptor flushes)",
            self.stats.rows, self.stats.inputs, self.stats.files, self.stats.descriptor_flushes
        );
        Ok(self.stats)
    }
}

#[cfg(unix)]
fn file_name_os(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(std::ffi::OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn file_name_os(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}
