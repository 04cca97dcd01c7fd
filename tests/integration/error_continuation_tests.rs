use dedup::diagnostics::{CollectingSink, Diagnostic, NullSink};
use dedup::duplicates::{group_by_size, hash_phase, DuplicateFinder, FinderConfig, FinderError};
use dedup::scanner::{Hasher, Walker, WalkerConfig, DEFAULT_CHUNK_SIZE};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn test_file_removed_before_hashing_is_reported_and_skipped() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"same").unwrap();
    fs::write(dir.path().join("b"), b"same").unwrap();
    fs::write(dir.path().join("c"), b"same").unwrap();

    let mut walker = Walker::new(WalkerConfig::default());
    let files: Vec<_> = walker
        .walk_root(dir.path(), &NullSink)
        .unwrap()
        .collect();
    assert_eq!(files.len(), 3);

    let (size_groups, _) = group_by_size(files);

    let gone: PathBuf = dir.path().join("b").canonicalize().unwrap();
    fs::remove_file(&gone).unwrap();

    let sink = CollectingSink::new();
    let mut hasher = Hasher::new(DEFAULT_CHUNK_SIZE).unwrap();
    let (groups, stats) = hash_phase(size_groups, &mut hasher, &sink);

    assert_eq!(stats.failed_files, 1);
    assert_eq!(stats.hashed_files, 2);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths.len(), 2);
    assert!(!groups[0].paths.contains(&gone));

    let events = sink.events();
    assert_eq!(events.len(), 1);
    match &events[0] {
        Diagnostic::HashFailed { path, .. } => assert_eq!(path, &gone),
        other => panic!("unexpected diagnostic: {other:?}"),
    }
}

#[test]
fn test_removed_file_breaks_pair_without_aborting() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("x1"), b"pair").unwrap();
    fs::write(dir.path().join("x2"), b"pair").unwrap();
    fs::write(dir.path().join("y1"), b"other group").unwrap();
    fs::write(dir.path().join("y2"), b"other group").unwrap();

    let mut walker = Walker::new(WalkerConfig::default());
    let files: Vec<_> = walker
        .walk_root(dir.path(), &NullSink)
        .unwrap()
        .collect();
    let (size_groups, _) = group_by_size(files);

    fs::remove_file(dir.path().join("x2")).unwrap();

    let sink = CollectingSink::new();
    let mut hasher = Hasher::new(DEFAULT_CHUNK_SIZE).unwrap();
    let (groups, stats) = hash_phase(size_groups, &mut hasher, &sink);

    // x1 is now alone; the y pair is still reported
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size, 11);
    assert_eq!(stats.failed_files, 1);
    assert_eq!(sink.len(), 1);
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_reported_and_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"same").unwrap();
    fs::write(dir.path().join("b"), b"same").unwrap();
    let locked = dir.path().join("c");
    fs::write(&locked, b"same").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can still read the file
    if fs::File::open(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
        return;
    }

    let sink = Arc::new(CollectingSink::new());
    let finder = DuplicateFinder::new(FinderConfig::default(), sink.clone());
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths.len(), 2);
    assert_eq!(summary.failed_files, 1);
    assert!(summary.has_errors());
    assert!(sink
        .events()
        .iter()
        .any(|d| matches!(d, Diagnostic::HashFailed { .. })));
}

#[cfg(unix)]
#[test]
fn test_unreadable_subdirectory_does_not_abort_scan() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"dup").unwrap();
    fs::write(dir.path().join("b"), b"dup").unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("hidden-copy"), b"dup").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let sink = Arc::new(CollectingSink::new());
    let finder = DuplicateFinder::new(FinderConfig::default(), sink.clone());
    let result = finder.find_duplicates(dir.path());

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let (groups, summary) = result.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths.len(), 2);
    assert_eq!(summary.entries_failed, 1);
    assert!(sink
        .events()
        .iter()
        .any(|d| matches!(d, Diagnostic::EntryFailed { .. })));
}

#[test]
fn test_missing_root_is_fatal() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");

    let finder = DuplicateFinder::new(FinderConfig::default(), Arc::new(NullSink));
    let result = finder.find_duplicates(&missing);

    assert!(matches!(result, Err(FinderError::PathNotFound(_))));
}

#[test]
fn test_engine_init_failure_reported_once() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"dup").unwrap();

    let sink = Arc::new(CollectingSink::new());
    let finder = DuplicateFinder::new(FinderConfig::default().with_chunk_size(0), sink.clone());
    let err = finder.find_duplicates(dir.path()).unwrap_err();

    assert!(matches!(err, FinderError::EngineInit(_)));
    assert!(err.is_reported());
    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert!(events[0].is_fatal());
}
