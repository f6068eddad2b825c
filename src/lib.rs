//! # fieldsplit
//!
//! Split delimited text into one output file per distinct value of a chosen field.
//!
//! Every input row is read, its routing field is turned into a filesystem-safe
//! key, and the unchanged row is appended to `<output_dir>/<key><suffix>`. Rows
//! keep their input order within each output file, across all inputs.
//!
//! ## Key Features
//!
//! - **Safe file names** - empty values go to `_blank_value`, whitespace and `/` become `_`
//! - **Bucketing** - hash keys into a fixed number of zero-padded files
//! - **Headers** - optionally copy each input's header line to the top of every new file
//! - **Label selection** - pick the routing field by header label, resolved per input
//! - **Bounded descriptors** - any number of distinct keys within the host's open-file limit
//! - **Compressed inputs** - gzip and zstd are detected and decoded transparently
//!
//! ## Quick Start
//!
//! ```no_run
//! use fieldsplit::*;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let config = SplitConfig::by_label("country")
//!     .delimiter(b"\t".to_vec())
//!     .output_dir("by_country")
//!     .suffix(".tsv")
//!     .keep_header(true);
//!
//! let inputs = [InputSource::from_arg("visits-*.tsv.gz")];
//! let stats = run(&config, &inputs)?;
//! println!("{} rows, {} files", stats.rows, stats.files);
//! # Ok(())
//! # }
//! ```
//!
//! ## Descriptor Exhaustion
//!
//! Output handles stay open between rows. When opening another file fails
//! because the process is out of descriptors, every open handle is closed at
//! once and the open is retried; closed files are reopened in append mode on
//! their next row, without repeating the header. See [`cache`].
//!
//! ## Module Overview
//!
//! - [`key`] - key transformation and bucket hashing
//! - [`cache`] - the output handle cache
//! - [`router`] - the driver loop and run entry points
//! - [`fields`] - field extraction and label lookup
//! - [`config`] - run configuration and delimiter handling
//! - [`io`] - input sources, globbing, decompression, line reading
//! - [`limits`] - host file-descriptor limits

pub mod cache;
pub mod config;
pub mod fields;
pub mod io;
pub mod key;
pub mod limits;
pub mod router;
pub mod stats;
pub mod testing;

pub use cache::{EntryState, HandleCache};
pub use config::{FieldSelector, SplitConfig};
pub use io::input::InputSource;
pub use key::{BLANK_KEY, Bucketer, strhash32, transform_key};
pub use router::{Router, run, run_exit_code};
pub use stats::RunStats;
