use dupeprint::hashing::{Digest, Hasher, IoGate, SamplingPolicy};
use dupeprint::identify::{identify_paths, Mode};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::tempdir;

fn write_file(dir: &std::path::Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    File::create(&path).unwrap().write_all(data).unwrap();
    path
}

#[test]
fn test_identify_empty_input() {
    let hasher = Hasher::default();
    let report = identify_paths(&[], &hasher, Mode::Hash, true, None);

    assert!(report.files.is_empty());
    assert_eq!(report.summary.total_files, 0);
    assert!(!report.has_unreadable());
}

#[test]
fn test_duplicates_share_identifiers() {
    let dir = tempdir().unwrap();
    let data: Vec<u8> = (0..300_000u32).map(|i| (i % 251) as u8).collect();
    let a = write_file(dir.path(), "a.bin", &data);
    let b = write_file(dir.path(), "b.bin", &data);
    let c = write_file(dir.path(), "c.bin", &data[..299_999]);

    let hasher = Hasher::default();
    let report = identify_paths(&[a, b, c], &hasher, Mode::Hash, true, None);

    let files = &report.files;
    assert_eq!(files[0].record.fingerprint, files[1].record.fingerprint);
    assert_eq!(files[0].record.content_digest, files[1].record.content_digest);
    assert_ne!(files[0].record.content_digest, files[2].record.content_digest);
    assert_eq!(report.summary.content_digests, 3);
    assert_eq!(report.summary.total_bytes, 899_999);
}

#[test]
fn test_directory_and_missing_paths_are_unreadable() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    let ok = write_file(dir.path(), "ok.bin", b"some content here");

    let hasher = Hasher::default();
    let report = identify_paths(
        &[sub, ok, dir.path().join("gone.bin")],
        &hasher,
        Mode::Fingerprint,
        true,
        None,
    );

    assert!(!report.files[0].readable);
    assert!(report.files[0].record.fingerprint.is_none());
    assert!(report.files[1].readable);
    assert!(!report.files[2].readable);
    assert_eq!(report.summary.unreadable, 2);
    assert!(report.has_unreadable());
}

#[test]
fn test_read_size_reported_per_file() {
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "r.bin", &vec![7u8; 1000]);

    let hasher = Hasher::new(Arc::new(IoGate::unserialized())).with_policy(SamplingPolicy {
        percent: 10,
        max_read_size: Some(5),
    });
    let report = identify_paths(&[path], &hasher, Mode::Hash, false, None);

    let file = &report.files[0];
    assert_eq!(file.read_size, 5);
    assert_eq!(
        file.record.content_digest,
        Some(Digest::compute(&[7u8; 995]))
    );
    assert!(!report.serial_io);
}
