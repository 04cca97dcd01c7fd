//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct, the path collector of the
//! duplicate detection pipeline. It walks each root recursively and yields
//! a [`FileEntry`] for every regular file it finds.
//!
//! # Features
//!
//! - Sequential traversal in file-name order
//! - Symbolic links are never followed and never become candidates
//! - Visited-path tracking scoped to one `Walker`, so overlapping roots
//!   are scanned only once
//! - Size and hidden-file filtering
//! - Per-entry failures are reported to a [`DiagnosticSink`] and skipped
//!
//! # Example
//!
//! ```no_run
//! use dedup::diagnostics::StderrSink;
//! use dedup::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let mut walker = Walker::new(WalkerConfig::default());
//! let files: Vec<_> = walker
//!     .walk_root(Path::new("/home/user/Downloads"), &StderrSink)
//!     .unwrap()
//!     .collect();
//! println!("Found {} files", files.len());
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use super::{FileEntry, ScanError, WalkerConfig};
use crate::diagnostics::{Diagnostic, DiagnosticSink};

/// Counters accumulated across every root walked by one [`Walker`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Regular files yielded as candidates
    pub files_found: usize,
    /// Non-regular entries excluded (symlinks, devices, sockets, ...)
    pub entries_skipped: usize,
    /// Entries that could not be classified or sized
    pub entries_failed: usize,
    /// Regular files excluded by the size filters
    pub filtered_by_size: usize,
    /// Entries ignored because they were already visited
    pub already_visited: usize,
}

/// Path collector for one invocation.
///
/// Owns the set of paths already visited, so walking several roots with
/// the same `Walker` never yields the same file twice.
#[derive(Debug)]
pub struct Walker {
    /// Walker configuration
    config: WalkerConfig,
    /// Every path seen so far, directories included
    visited: HashSet<PathBuf>,
    /// Counters for all roots walked so far
    stats: WalkStats,
}

impl Walker {
    /// Create a new walker with an empty visited set.
    #[must_use]
    pub fn new(config: WalkerConfig) -> Self {
        Self {
            config,
            visited: HashSet::new(),
            stats: WalkStats::default(),
        }
    }

    /// Counters accumulated so far.
    #[must_use]
    pub fn stats(&self) -> &WalkStats {
        &self.stats
    }

    /// Walk `root`, lazily yielding every regular file beneath it.
    ///
    /// The root is canonicalized first, so the yielded paths are absolute.
    ///
    /// # Errors
    ///
    /// A missing, unreadable or non-directory root is fatal for that root
    /// and is returned before any entry is yielded. Failures on individual
    /// entries are reported to `sink` instead.
    pub fn walk_root<'a>(
        &'a mut self,
        root: &Path,
        sink: &'a dyn DiagnosticSink,
    ) -> Result<RootWalk<'a>, ScanError> {
        let root = validate_root(root)?;
        log::debug!("Walking {}", root.display());

        let inner = WalkDir::new(&root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        Ok(RootWalk {
            root,
            inner,
            config: &self.config,
            visited: &mut self.visited,
            stats: &mut self.stats,
            sink,
        })
    }

    /// Check if a file passes size filters.
    fn passes_size_filter(config: &WalkerConfig, size: u64) -> bool {
        if let Some(min) = config.min_size {
            if size < min {
                return false;
            }
        }
        if let Some(max) = config.max_size {
            if size > max {
                return false;
            }
        }
        true
    }
}

/// Resolve a root argument to an absolute directory path.
fn validate_root(root: &Path) -> Result<PathBuf, ScanError> {
    let metadata = fs::metadata(root).map_err(|e| ScanError::from_io(root.to_path_buf(), e))?;
    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    // An unreadable root would otherwise surface as a per-entry error.
    fs::read_dir(root).map_err(|e| ScanError::from_io(root.to_path_buf(), e))?;

    fs::canonicalize(root).map_err(|e| ScanError::from_io(root.to_path_buf(), e))
}

/// Check whether an entry's file name starts with a dot.
fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

/// Lazy traversal of a single root.
///
/// Created by [`Walker::walk_root`]; borrows the walker's visited set for
/// as long as it lives.
pub struct RootWalk<'a> {
    root: PathBuf,
    inner: walkdir::IntoIter,
    config: &'a WalkerConfig,
    visited: &'a mut HashSet<PathBuf>,
    stats: &'a mut WalkStats,
    sink: &'a dyn DiagnosticSink,
}

impl RootWalk<'_> {
    /// Convert a walkdir failure into a [`ScanError`] and report it.
    fn report_failure(&mut self, error: walkdir::Error) {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);
        let message = error.to_string();
        let error = match error.into_io_error() {
            Some(io) => ScanError::from_io(path.clone(), io),
            None => ScanError::Io {
                path: path.clone(),
                source: std::io::Error::other(message),
            },
        };

        log::debug!("Traversal error: {}", error);
        self.stats.entries_failed += 1;
        self.sink.report(&Diagnostic::EntryFailed {
            path,
            error: error.to_string(),
        });
    }
}

impl Iterator for RootWalk<'_> {
    type Item = FileEntry;

    fn next(&mut self) -> Option<FileEntry> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    self.report_failure(e);
                    continue;
                }
            };

            let file_type = entry.file_type();
            let is_dir = file_type.is_dir();

            if entry.depth() > 0 && self.config.skip_hidden && is_hidden(&entry) {
                log::trace!("Skipping hidden entry: {}", entry.path().display());
                if is_dir {
                    self.inner.skip_current_dir();
                }
                continue;
            }

            if !self.visited.insert(entry.path().to_path_buf()) {
                log::trace!("Already visited: {}", entry.path().display());
                self.stats.already_visited += 1;
                if is_dir {
                    self.inner.skip_current_dir();
                }
                continue;
            }

            if is_dir {
                continue;
            }

            if !file_type.is_file() {
                log::trace!("Skipping non-regular entry: {}", entry.path().display());
                self.stats.entries_skipped += 1;
                self.sink.report(&Diagnostic::EntrySkipped {
                    path: entry.path().to_path_buf(),
                });
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    self.report_failure(e);
                    continue;
                }
            };

            let size = metadata.len();
            if !Walker::passes_size_filter(self.config, size) {
                log::trace!(
                    "Skipping file due to size filter ({}): {}",
                    size,
                    entry.path().display()
                );
                self.stats.filtered_by_size += 1;
                continue;
            }

            self.stats.files_found += 1;
            return Some(FileEntry::new(entry.into_path(), size));
        }
    }
}
