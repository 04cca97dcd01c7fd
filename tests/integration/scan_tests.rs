use dedup::diagnostics::{CollectingSink, NullSink};
use dedup::duplicates::{DuplicateFinder, FinderConfig};
use dedup::scanner::{hash_to_hex, hex_to_hash, WalkerConfig};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

fn finder() -> DuplicateFinder {
    DuplicateFinder::new(FinderConfig::default(), Arc::new(NullSink))
}

fn write(path: &Path, content: &[u8]) {
    File::create(path).unwrap().write_all(content).unwrap();
}

fn file_names(paths: &[std::path::PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();

    let (groups, summary) = finder().find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scan_distinct_sizes_hashes_nothing() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"1");
    write(&dir.path().join("b.txt"), b"22");
    write(&dir.path().join("c.txt"), b"333");

    let (groups, summary) = finder().find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.eliminated_by_size, 3);
    assert_eq!(summary.hashed_files, 0);
}

#[test]
fn test_scan_same_size_different_content() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"content a");
    write(&dir.path().join("b.txt"), b"content b");

    let (groups, summary) = finder().find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.hashed_files, 2);
}

#[test]
fn test_scan_scenario_a() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a"), b"x");
    write(&dir.path().join("b"), b"x");
    write(&dir.path().join("c"), b"z");

    let (groups, summary) = finder().find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(file_names(&groups[0].paths), vec!["a", "b"]);
    assert_eq!(summary.hashed_files, 3);
    assert_eq!(summary.duplicate_files, 1);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("subdir");
    fs::create_dir(&sub).unwrap();
    write(&dir.path().join("a.txt"), b"dup");
    write(&sub.join("b.txt"), b"dup");

    let (groups, summary) = finder().find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths.len(), 2);
    assert_eq!(summary.total_files, 2);
}

#[test]
fn test_scan_multiple_groups() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("1a.txt"), b"group1");
    write(&dir.path().join("1b.txt"), b"group1");
    write(&dir.path().join("1c.txt"), b"group1");
    write(&dir.path().join("2a.txt"), b"group2");
    write(&dir.path().join("2b.txt"), b"group2");
    write(&dir.path().join("unique.txt"), b"unique");

    let (groups, summary) = finder().find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 2);
    let mut sizes: Vec<usize> = groups.iter().map(|g| g.paths.len()).collect();
    sizes.sort_unstable();
    assert_eq!(sizes, vec![2, 3]);
    assert_eq!(summary.duplicate_files, 3);
    assert_eq!(summary.reclaimable_space, 18);
}

#[test]
fn test_scan_empty_files_are_duplicates() {
    let dir = tempdir().unwrap();
    File::create(dir.path().join("e1")).unwrap();
    File::create(dir.path().join("e2")).unwrap();

    let (groups, _) = finder().find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size, 0);
}

#[test]
fn test_scan_min_size_excludes_small_files() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a"), b"x");
    write(&dir.path().join("b"), b"x");
    write(&dir.path().join("c"), b"larger content");
    write(&dir.path().join("d"), b"larger content");

    let config = FinderConfig::default().with_walker_config(WalkerConfig {
        min_size: Some(2),
        ..Default::default()
    });
    let finder = DuplicateFinder::new(config, Arc::new(NullSink));
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(file_names(&groups[0].paths), vec!["c", "d"]);
    assert_eq!(summary.total_files, 2);
}

#[test]
fn test_scan_is_idempotent() {
    let dir = tempdir().unwrap();
    for i in 0..5 {
        write(&dir.path().join(format!("copy{i}")), b"same bytes");
        write(&dir.path().join(format!("other{i}")), format!("other {i}").as_bytes());
    }

    let (first, _) = finder().find_duplicates(dir.path()).unwrap();
    let (second, _) = finder().find_duplicates(dir.path()).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].paths.len(), 5);
}

#[test]
fn test_reported_digest_is_stable_and_round_trips() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a"), b"x");
    write(&dir.path().join("b"), b"x");

    let (groups, _) = finder().find_duplicates(dir.path()).unwrap();
    let hex = groups[0].hash_hex();

    // BLAKE2b-512("x")
    assert_eq!(
        hex,
        "0909377ad35110cafb2909e185672b7f2728d1f5094f8ad68d6fac6274bf1f499485a80ea364c04ed006d29459ea3cb7c600280e2f83e032529906f88ae30d0a"
    );
    assert_eq!(hex_to_hash(&hex), Some(groups[0].digest));
    assert_eq!(hash_to_hex(&groups[0].digest), hex);
}

#[test]
fn test_scan_reports_paths_absolute() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a"), b"dup");
    write(&dir.path().join("b"), b"dup");

    let (groups, _) = finder().find_duplicates(dir.path()).unwrap();

    assert!(groups[0].paths.iter().all(|p| p.is_absolute()));
}

#[cfg(unix)]
#[test]
fn test_scan_symlinks_are_not_candidates() {
    use dedup::diagnostics::Diagnostic;
    use std::os::unix::fs::symlink;

    let dir = tempdir().unwrap();
    write(&dir.path().join("real"), b"content");
    symlink(dir.path().join("real"), dir.path().join("alias")).unwrap();

    let sink = Arc::new(CollectingSink::new());
    let finder = DuplicateFinder::new(FinderConfig::default(), sink.clone());
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 1);
    assert_eq!(summary.entries_skipped, 1);
    assert!(matches!(
        sink.events().as_slice(),
        [Diagnostic::EntrySkipped { .. }]
    ));
}
