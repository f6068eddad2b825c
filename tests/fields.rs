use anyhow::Result;
use fieldsplit::config::{expand_escapes, resolve_delimiter};
use fieldsplit::fields::{FieldSplitter, strip_terminator};
use fieldsplit::{FieldSelector, SplitConfig};

#[test]
fn test_field_positions() {
    let s = FieldSplitter::new(b",");
    assert_eq!(s.field(b"a,b,c\n", 0), b"a");
    assert_eq!(s.field(b"a,b,c\n", 1), b"b");
    assert_eq!(s.field(b"a,b,c\n", 2), b"c");
    assert_eq!(s.field(b"a,b,c\n", 3), b"");
    assert_eq!(s.field(b"a,,c", 1), b"");
    assert_eq!(s.field(b"", 0), b"");
}

#[test]
fn test_terminators_are_not_field_content() {
    let s = FieldSplitter::new(b",");
    assert_eq!(s.field(b"a,last\r\n", 1), b"last");
    assert_eq!(s.field(b"a,last\n", 1), b"last");
    assert_eq!(strip_terminator(b"x\r\n"), b"x");
    assert_eq!(strip_terminator(b"x\n\n"), b"x\n");
    assert_eq!(strip_terminator(b"x"), b"x");
}

#[test]
fn test_multibyte_delimiter() {
    let s = FieldSplitter::new(b"::");
    let fields: Vec<&[u8]> = s.fields(b"one::two:three::four\n").collect();
    assert_eq!(fields, vec![&b"one"[..], &b"two:three"[..], &b"four"[..]]);
    assert_eq!(s.delimiter(), b"::");
}

#[test]
fn test_label_resolution() {
    let s = FieldSplitter::new(b"\t");
    let header = b"id\tname\tcity\n";
    assert_eq!(s.resolve_label("city", header), Some(2));
    assert_eq!(s.resolve_label("id", header), Some(0));
    assert_eq!(s.resolve_label("name,city", header), Some(1));
    assert_eq!(s.resolve_label("nope", header), None);
    assert_eq!(s.resolve_label("", header), None);
    assert_eq!(s.resolve_label("Name", header), None);
}

#[test]
fn test_escape_expansion() -> Result<()> {
    assert_eq!(expand_escapes("\\t")?, b"\t");
    assert_eq!(expand_escapes(",")?, b",");
    assert_eq!(expand_escapes("\\xfe")?, [0xfe_u8]);
    assert_eq!(expand_escapes("\\376")?, [0xfe_u8]);
    assert_eq!(expand_escapes("\\0")?, [0x00_u8]);
    assert_eq!(expand_escapes("a\\\\b")?, b"a\\b");
    assert_eq!(expand_escapes("\\r\\n")?, b"\r\n");
    assert_eq!(expand_escapes("\\q")?, b"\\q");
    assert!(expand_escapes("a\\").is_err());
    assert!(expand_escapes("\\xzz").is_err());
    Ok(())
}

#[test]
fn test_explicit_delimiter_wins() -> Result<()> {
    assert_eq!(resolve_delimiter(Some("|"))?, b"|");
    assert_eq!(resolve_delimiter(Some("\\t"))?, b"\t");
    Ok(())
}

#[test]
fn test_config_validation() {
    assert!(SplitConfig::by_index(1).validate().is_ok());
    assert!(SplitConfig::by_label("x").validate().is_ok());
    assert!(SplitConfig::default().validate().is_err());
    assert!(SplitConfig::by_label("").validate().is_err());
    assert!(SplitConfig::by_index(1).delimiter(Vec::new()).validate().is_err());
    assert!(SplitConfig::by_index(1).max_open_files(0).validate().is_err());
}

#[test]
fn test_config_builder() {
    let config = SplitConfig::by_index(3).keep_header(true).suffix(".txt");
    assert_eq!(config.field, Some(FieldSelector::Index(2)));
    assert_eq!(config.delimiter, [0xfe_u8]);
    assert_eq!(config.suffix.as_deref(), Some(".txt"));
    assert!(config.reads_header());

    let by_label = SplitConfig::by_label("city");
    assert!(by_label.reads_header());
    assert!(!SplitConfig::by_index(1).reads_header());
}
