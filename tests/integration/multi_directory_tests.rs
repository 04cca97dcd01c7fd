use dedup::diagnostics::NullSink;
use dedup::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use std::fs::{self, File};
use std::io::Write;
use std::sync::Arc;
use tempfile::tempdir;

fn finder() -> DuplicateFinder {
    DuplicateFinder::new(FinderConfig::default(), Arc::new(NullSink))
}

#[test]
fn test_scan_two_directories_cross_duplicates() {
    let dir1 = tempdir().unwrap();
    let dir2 = tempdir().unwrap();

    File::create(dir1.path().join("a.txt"))
        .unwrap()
        .write_all(b"dup")
        .unwrap();
    File::create(dir2.path().join("b.txt"))
        .unwrap()
        .write_all(b"dup")
        .unwrap();

    let (groups, summary) = finder()
        .find_duplicates_in_paths(&[dir1.path().to_path_buf(), dir2.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths.len(), 2);
    assert_eq!(summary.total_files, 2);
}

#[test]
fn test_scan_two_directories_no_overlap_in_content() {
    let dir1 = tempdir().unwrap();
    let dir2 = tempdir().unwrap();

    fs::write(dir1.path().join("a.txt"), b"alpha").unwrap();
    fs::write(dir2.path().join("b.txt"), b"bravo").unwrap();

    let (groups, summary) = finder()
        .find_duplicates_in_paths(&[dir1.path().to_path_buf(), dir2.path().to_path_buf()])
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 2);
}

#[test]
fn test_scan_overlapping_directories() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();

    fs::write(dir.path().join("a.txt"), b"content").unwrap();
    fs::write(sub.join("b.txt"), b"content").unwrap();

    // Parent and child: the child's files must not be collected twice
    let (groups, summary) = finder()
        .find_duplicates_in_paths(&[dir.path().to_path_buf(), sub.clone()])
        .unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths.len(), 2);
}

#[test]
fn test_scan_same_root_twice() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("only.txt"), b"single").unwrap();

    let (groups, summary) = finder()
        .find_duplicates_in_paths(&[dir.path().to_path_buf(), dir.path().to_path_buf()])
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 1);
}

#[test]
fn test_scan_equivalent_spellings_of_root() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("x.txt"), b"once").unwrap();

    let dotted = dir.path().join("sub").join(".").join("..").join("sub");

    let (groups, summary) = finder()
        .find_duplicates_in_paths(&[sub.clone(), dotted])
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 1);
}

#[test]
fn test_missing_second_root_is_fatal() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"dup").unwrap();
    fs::write(dir.path().join("b"), b"dup").unwrap();

    let result = finder().find_duplicates_in_paths(&[
        dir.path().to_path_buf(),
        dir.path().join("does-not-exist"),
    ]);

    assert!(matches!(result, Err(FinderError::PathNotFound(_))));
}
