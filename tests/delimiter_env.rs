//! Delimiter fallbacks read the process environment, so this binary holds a
//! single test and nothing else touches `DELIMITER` concurrently.

use anyhow::Result;
use fieldsplit::config::{DEFAULT_DELIMITER, DELIMITER_ENV, resolve_delimiter};

#[test]
fn test_delimiter_falls_back_to_env_then_default() -> Result<()> {
    // SAFETY: this is the only test in the binary; no other thread reads or
    // writes the environment while it runs.
    unsafe { std::env::set_var(DELIMITER_ENV, "\\t") };
    assert_eq!(resolve_delimiter(None)?, b"\t");
    assert_eq!(resolve_delimiter(Some(","))?, b",");

    // SAFETY: as above.
    unsafe { std::env::set_var(DELIMITER_ENV, "\\x7c\\174") };
    assert_eq!(resolve_delimiter(None)?, b"||");

    // SAFETY: as above.
    unsafe { std::env::set_var(DELIMITER_ENV, "bad\\") };
    let err = resolve_delimiter(None).unwrap_err();
    assert!(format!("{err:#}").contains("invalid delimiter"));
    assert_eq!(resolve_delimiter(Some(";"))?, b";");

    // SAFETY: as above.
    unsafe { std::env::remove_var(DELIMITER_ENV) };
    assert_eq!(resolve_delimiter(None)?, DEFAULT_DELIMITER);
    assert_eq!(resolve_delimiter(Some("\\t"))?, b"\t");
    Ok(())
}
