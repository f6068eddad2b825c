//! Helpers for tests that run splits against temporary directories.
//!
//! ```
//! use fieldsplit::testing::{read_output_dir, write_input};
//! use fieldsplit::{run, InputSource, SplitConfig};
//!
//! let dir = tempfile::tempdir()?;
//! let input = write_input(dir.path(), "in.csv", b"a,1\nb,2\na,3\n")?;
//! let out = dir.path().join("out");
//!
//! let config = SplitConfig::by_index(1).delimiter(b",".to_vec()).output_dir(&out);
//! run(&config, &[InputSource::Path(input)])?;
//!
//! let files = read_output_dir(&out)?;
//! assert_eq!(files["a"], b"a,1\na,3\n");
//! assert_eq!(files["b"], b"b,2\n");
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Write `contents` to `dir/name` and return the path.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_input(dir: &Path, name: &str, contents: &[u8]) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

/// Every regular file directly under `dir`, keyed by file name.
///
/// # Errors
/// Returns an error if the directory or any file in it cannot be read.
pub fn read_output_dir(dir: &Path) -> Result<BTreeMap<String, Vec<u8>>> {
    let mut out = BTreeMap::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() {
            let bytes = fs::read(&path).with_context(|| format!("read {}", path.display()))?;
            out.insert(entry.file_name().to_string_lossy().into_owned(), bytes);
        }
    }
    Ok(out)
}

/// `rows` rows of `key,n` with `distinct` keys, cycling through the keys so
/// consecutive rows go to different files. A `distinct` of zero is treated
/// as one key.
///
/// ```
/// use fieldsplit::testing::cycling_rows;
///
/// assert_eq!(cycling_rows(3, 2), b"k0000,0\nk0001,1\nk0000,2\n");
/// assert_eq!(cycling_rows(2, 0), b"k0000,0\nk0000,1\n");
/// ```
#[must_use]
pub fn cycling_rows(rows: usize, distinct: usize) -> Vec<u8> {
    let distinct = distinct.max(1);
    let mut out = Vec::new();
    for n in 0..rows {
        out.extend_from_slice(format!("k{:04},{n}\n", n % distinct).as_bytes());
    }
    out
}
