//! Per-run counters reported when a run finishes.

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Totals for one run, returned by [`run`](crate::run).
///
/// ```
/// use fieldsplit::RunStats;
///
/// let stats = RunStats { rows: 3, files: 2, ..RunStats::default() };
/// assert!(stats.to_json()?.contains("\"rows\": 3"));
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Input streams read.
    pub inputs: usize,
    /// Data rows routed (header lines excluded).
    pub rows: u64,
    /// Distinct output files written.
    pub files: usize,
    /// Times descriptor exhaustion forced every open file closed.
    pub descriptor_flushes: u64,
    /// Open-file budget the run started with.
    pub open_files_budget: usize,
}

impl RunStats {
    /// Render as pretty-printed JSON.
    ///
    /// # Errors
    /// Only fails if serialization itself fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
