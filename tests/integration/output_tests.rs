use dupeprint::cli::OutputFormat;
use dupeprint::hashing::{Digest, Hasher};
use dupeprint::identify::{identify_paths, Mode};
use dupeprint::output::write_report;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_text_output_columns() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("abc.txt");
    fs::write(&path, b"abc").unwrap();
    let missing = dir.path().join("missing.txt");

    let hasher = Hasher::default();
    let report = identify_paths(&[path.clone(), missing], &hasher, Mode::Hash, true, None);

    let mut out = Vec::new();
    write_report(&report, OutputFormat::Text, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 2);
    // read_size 1: head "a", middle starts at "b", tail "c"
    let expected = format!(
        "{} 6263000000000000 {} {}  3  {}",
        Digest::compute(b"a"),
        Digest::compute(b"c"),
        Digest::compute(b"bc"),
        path.display()
    );
    assert_eq!(lines[0], expected);
    assert!(lines[1].starts_with("- - - -  -  "));
}

#[test]
fn test_json_output_document() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data.bin");
    fs::write(&path, vec![0u8; 100]).unwrap();

    let hasher = Hasher::default();
    let report = identify_paths(&[path], &hasher, Mode::Fingerprint, true, None);

    let mut out = Vec::new();
    write_report(&report, OutputFormat::Json, &mut out).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(value["mode"], "fingerprint");
    assert_eq!(value["serial_io"], true);
    assert_eq!(value["summary"]["total_files"], 1);

    let file = &value["files"][0];
    assert_eq!(file["size"], 100);
    assert_eq!(file["read_size"], 4);
    assert_eq!(file["readable"], true);
    assert_eq!(file["fingerprint"]["middle"], "0000000000000000");
    assert_eq!(
        file["fingerprint"]["head"],
        Digest::compute(&[0u8; 4]).to_hex()
    );
    assert!(file["content_digest"].is_null());
}
