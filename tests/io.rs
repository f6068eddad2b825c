use anyhow::Result;
use fieldsplit::InputSource;
use fieldsplit::io::compression::auto_detect_reader;
use fieldsplit::io::glob::{expand_glob, is_glob_pattern};
use fieldsplit::io::input::resolve_inputs;
use fieldsplit::io::lines::LineReader;
use fieldsplit::limits::{FALLBACK_OPEN_FILES, is_descriptor_exhaustion, open_files_budget};
use fieldsplit::testing::write_input;
use std::io::{Cursor, Read};
use tempfile::TempDir;

#[test]
fn test_line_reader_keeps_terminators() -> Result<()> {
    let mut lines = LineReader::new(Cursor::new(b"one\ntwo\r\nlast".to_vec()));
    assert_eq!(lines.next_line()?, Some(&b"one\n"[..]));
    assert_eq!(lines.next_line()?, Some(&b"two\r\n"[..]));
    assert_eq!(lines.next_line()?, Some(&b"last"[..]));
    assert_eq!(lines.next_line()?, None);
    assert_eq!(lines.line_no(), 3);
    Ok(())
}

#[test]
fn test_input_source_from_arg() -> Result<()> {
    let dir = TempDir::new()?;
    assert_eq!(InputSource::from_arg("-"), InputSource::Stdin);
    assert_eq!(
        InputSource::from_arg("data.csv"),
        InputSource::Path("data.csv".into())
    );
    let pattern = format!("{}/*.csv", dir.path().display());
    assert_eq!(InputSource::from_arg(&pattern), InputSource::Glob(pattern.clone()));

    // An existing file whose name looks like a pattern is taken literally.
    let odd = write_input(dir.path(), "[odd].csv", b"x\n")?;
    let odd_arg = odd.display().to_string();
    assert_eq!(InputSource::from_arg(&odd_arg), InputSource::Path(odd));
    Ok(())
}

#[test]
fn test_resolve_inputs_expands_globs_in_place() -> Result<()> {
    let dir = TempDir::new()?;
    let b = write_input(dir.path(), "b.csv", b"")?;
    let a = write_input(dir.path(), "a.csv", b"")?;
    write_input(dir.path(), "skip.txt", b"")?;
    let first = write_input(dir.path(), "first.dat", b"")?;

    let resolved = resolve_inputs(&[
        InputSource::Path(first.clone()),
        InputSource::Glob(format!("{}/*.csv", dir.path().display())),
        InputSource::Stdin,
    ])?;
    assert_eq!(
        resolved,
        vec![
            InputSource::Path(first),
            InputSource::Path(a),
            InputSource::Path(b),
            InputSource::Stdin,
        ]
    );

    assert_eq!(resolve_inputs(&[])?, vec![InputSource::Stdin]);
    assert!(resolve_inputs(&[InputSource::Glob(format!("{}/*.nope", dir.path().display()))]).is_err());
    Ok(())
}

#[test]
fn test_glob_helpers() -> Result<()> {
    let dir = TempDir::new()?;
    std::fs::create_dir(dir.path().join("sub.csv"))?;
    write_input(dir.path(), "x.csv", b"")?;

    let pattern = format!("{}/*.csv", dir.path().display());
    // The matching directory is skipped.
    assert_eq!(expand_glob(&pattern)?, vec![dir.path().join("x.csv")]);

    let err = expand_glob(&format!("{}/*.tsv", dir.path().display())).unwrap_err();
    assert!(format!("{err:#}").contains("no files found"));
    assert!(expand_glob(&format!("{}/[", dir.path().display())).is_err());
    assert!(is_glob_pattern("a*.csv"));
    assert!(is_glob_pattern("a?.csv"));
    assert!(!is_glob_pattern("plain.csv"));
    Ok(())
}

#[test]
fn test_plain_input_passes_through() -> Result<()> {
    let mut reader = auto_detect_reader(Cursor::new(b"a,1\n".to_vec()), "in.csv")?;
    let mut out = String::new();
    reader.read_to_string(&mut out)?;
    assert_eq!(out, "a,1\n");
    Ok(())
}

#[cfg(feature = "compression-gzip")]
#[test]
fn test_gzip_detected_by_magic_bytes() -> Result<()> {
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(b"a,1\nb,2\n")?;
    let compressed = enc.finish()?;

    // No telling extension: detection falls back to the stream header.
    let mut reader = auto_detect_reader(Cursor::new(compressed), "rows.txt")?;
    let mut out = String::new();
    reader.read_to_string(&mut out)?;
    assert_eq!(out, "a,1\nb,2\n");
    Ok(())
}

#[cfg(feature = "compression-zstd")]
#[test]
fn test_zstd_detected_by_extension() -> Result<()> {
    let compressed = zstd::encode_all(&b"x\ty\n"[..], 3)?;
    let mut reader = auto_detect_reader(Cursor::new(compressed), "rows.tsv.zst")?;
    let mut out = String::new();
    reader.read_to_string(&mut out)?;
    assert_eq!(out, "x\ty\n");
    Ok(())
}

#[test]
fn test_descriptor_budget() {
    assert!(open_files_budget(None) >= 1);
    assert_eq!(open_files_budget(Some(3)), 3);
    assert!(FALLBACK_OPEN_FILES > 0);
}

#[test]
fn test_descriptor_exhaustion_detection() {
    assert!(is_descriptor_exhaustion(&std::io::Error::from_raw_os_error(libc::EMFILE)));
    assert!(!is_descriptor_exhaustion(&std::io::Error::from_raw_os_error(libc::ENOENT)));
    assert!(!is_descriptor_exhaustion(&std::io::Error::other("boom")));
}
