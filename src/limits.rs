//! Host file-descriptor limits.

use std::io;

/// Open-file budget used when the host cannot report its limit.
///
/// Matches the C library's guaranteed minimum `FOPEN_MAX`.
pub const FALLBACK_OPEN_FILES: usize = 16;

/// Maximum number of simultaneously open descriptors the host allows this
/// process, or `None` if it cannot be determined.
#[cfg(unix)]
#[must_use]
pub fn host_open_files_limit() -> Option<usize> {
    // SAFETY: sysconf has no preconditions and only reads process limits.
    let max = unsafe { libc::sysconf(libc::_SC_OPEN_MAX) };
    usize::try_from(max).ok().filter(|&n| n > 0)
}

/// Hosts without `sysconf` never report a limit.
#[cfg(not(unix))]
#[must_use]
pub fn host_open_files_limit() -> Option<usize> {
    None
}

/// Descriptor budget for a run: the host limit (or [`FALLBACK_OPEN_FILES`]),
/// lowered to `ceiling` when the operator asked for a smaller one.
#[must_use]
pub fn open_files_budget(ceiling: Option<usize>) -> usize {
    let host = host_open_files_limit().unwrap_or(FALLBACK_OPEN_FILES);
    match ceiling {
        Some(c) => c.min(host),
        None => host,
    }
}

/// Whether `err` means the process ran out of file descriptors.
#[must_use]
pub fn is_descriptor_exhaustion(err: &io::Error) -> bool {
    err.raw_os_error() == Some(libc::EMFILE)
}
