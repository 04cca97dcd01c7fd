//! Duplicate finder implementation with two-phase detection.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Collect** - Walk every root, filing regular files by size
//!    (see [`crate::duplicates::groups`])
//! 2. **Hash** - Compute BLAKE2b-512 digests of files in size buckets with
//!    two or more members and group them by digest
//!
//! Every bucket is complete before the first file is hashed, and each file
//! is hashed at most once. Digests are not re-verified byte-by-byte; two
//! files sharing a BLAKE2b-512 digest are reported as duplicates.
//!
//! # Example
//!
//! ```no_run
//! use dedup::duplicates::{DuplicateFinder, FinderConfig};
//! use dedup::diagnostics::StderrSink;
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default(), Arc::new(StderrSink));
//! let (groups, summary) = finder
//!     .find_duplicates_in_paths(&[PathBuf::from("/photos"), PathBuf::from("/backup")])
//!     .unwrap();
//!
//! println!("Found {} duplicate groups", groups.len());
//! println!("Reclaimable space: {}", summary.reclaimable_display());
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;

use super::groups::{DuplicateGroup, SizeGroups};
use crate::diagnostics::{Diagnostic, DiagnosticSink, StderrSink};
use crate::scanner::{
    hash_to_hex, Digest, HashError, Hasher, ScanError, Walker, WalkerConfig,
    DEFAULT_CHUNK_SIZE,
};

/// Threshold for logging large files.
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024; // 100MB

/// Statistics from the hashing phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashStats {
    /// Files that belonged to a size bucket with 2+ members
    pub input_files: usize,
    /// Number of files successfully hashed
    pub hashed_files: usize,
    /// Number of files that failed to hash (I/O errors)
    pub failed_files: usize,
    /// Total bytes hashed across all files
    pub bytes_hashed: u64,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Number of confirmed duplicate files (excluding originals)
    pub duplicate_files: usize,
    /// Total space wasted by duplicates
    pub wasted_space: u64,
}

impl HashStats {
    /// Calculate wasted space from duplicate groups.
    pub fn calculate_wasted_space(&mut self, groups: &[DuplicateGroup]) {
        self.duplicate_groups = groups.len();
        self.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        self.wasted_space = groups.iter().map(DuplicateGroup::wasted_space).sum();
    }
}

/// Paths sharing one digest, plus the size they were bucketed under.
struct DigestBucket {
    size: u64,
    paths: Vec<PathBuf>,
}

/// Hash the members of every size bucket with 2+ files (Phase 2).
///
/// Files that cannot be opened or read are reported to `sink` as
/// [`Diagnostic::HashFailed`] and left out of every group; the remaining
/// members of their bucket are grouped as usual.
///
/// # Returns
///
/// Confirmed duplicate groups sorted by digest (paths sorted within each
/// group), and statistics about the phase.
#[must_use]
pub fn hash_phase(
    size_groups: SizeGroups,
    hasher: &mut Hasher,
    sink: &dyn DiagnosticSink,
) -> (Vec<DuplicateGroup>, HashStats) {
    let mut stats = HashStats::default();
    let mut digest_groups: BTreeMap<Digest, DigestBucket> = BTreeMap::new();

    for bucket in size_groups.into_candidates() {
        log::debug!(
            "Hashing size group {} bytes: {} files",
            bucket.size,
            bucket.len()
        );
        stats.input_files += bucket.len();

        for file in bucket.files {
            if file.size > LARGE_FILE_THRESHOLD {
                log::debug!(
                    "Hashing large file ({} MB): {}",
                    file.size / (1024 * 1024),
                    file.path.display()
                );
            }

            match hasher.full_hash(&file.path) {
                Ok(digest) => {
                    log::trace!("Full hash computed: {}", file.path.display());
                    stats.hashed_files += 1;
                    stats.bytes_hashed += file.size;
                    digest_groups
                        .entry(digest)
                        .or_insert_with(|| DigestBucket {
                            size: file.size,
                            paths: Vec::new(),
                        })
                        .paths
                        .push(file.path);
                }
                Err(e) => {
                    log::debug!("Failed to hash {}: {}", file.path.display(), e);
                    stats.failed_files += 1;
                    sink.report(&Diagnostic::HashFailed {
                        path: file.path,
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    let duplicate_groups: Vec<DuplicateGroup> = digest_groups
        .into_iter()
        .filter(|(_, bucket)| bucket.paths.len() > 1)
        .map(|(digest, bucket)| {
            log::debug!(
                "Duplicate group {}: {} files, {} bytes each",
                hash_to_hex(&digest),
                bucket.paths.len(),
                bucket.size
            );
            DuplicateGroup::new(digest, bucket.size, bucket.paths)
        })
        .collect();

    stats.calculate_wasted_space(&duplicate_groups);

    log::info!(
        "Hash phase complete: {} hashed ({}), {} failed, {} groups",
        stats.hashed_files,
        ByteSize(stats.bytes_hashed),
        stats.failed_files,
        stats.duplicate_groups
    );

    (duplicate_groups, stats)
}

// ============================================================================
// DuplicateFinder - Pipeline Orchestrator
// ============================================================================

/// Configuration for the duplicate finder.
#[derive(Debug, Clone)]
pub struct FinderConfig {
    /// Read chunk size for streaming hashes, in bytes.
    pub chunk_size: usize,
    /// Walker configuration (size filters, hidden files).
    pub walker_config: WalkerConfig,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            walker_config: WalkerConfig::default(),
        }
    }
}

impl FinderConfig {
    /// Set the hashing chunk size.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Total number of candidate files collected
    pub total_files: usize,
    /// Total size of all candidate files in bytes
    pub total_size: u64,
    /// Number of files eliminated by size grouping (unique sizes)
    pub eliminated_by_size: usize,
    /// Number of files hashed successfully
    pub hashed_files: usize,
    /// Number of files that could not be hashed
    pub failed_files: usize,
    /// Non-regular entries skipped during traversal
    pub entries_skipped: usize,
    /// Entries that failed during traversal
    pub entries_failed: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding originals)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Bytes read while hashing
    pub bytes_hashed: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
}

impl ScanSummary {
    /// Whether any recoverable error occurred during the scan.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.failed_files > 0 || self.entries_failed > 0
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize(self.reclaimable_space).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize(self.total_size).to_string()
    }
}

/// Errors that terminate a duplicate scan.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// No root paths were supplied.
    #[error("no paths provided")]
    NoPaths,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The hashing engine could not be initialized.
    #[error(transparent)]
    EngineInit(HashError),

    /// A root could not be scanned.
    #[error(transparent)]
    ScanError(ScanError),
}

impl From<ScanError> for FinderError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::NotFound(path) => Self::PathNotFound(path),
            ScanError::NotADirectory(path) => Self::NotADirectory(path),
            other => Self::ScanError(other),
        }
    }
}

impl FinderError {
    /// Whether the error was already rendered through the diagnostics sink.
    #[must_use]
    pub fn is_reported(&self) -> bool {
        matches!(self, Self::EngineInit(_))
    }
}

/// Duplicate finder that orchestrates the detection pipeline.
///
/// The sink receives every recoverable event raised while collecting and
/// hashing files.
pub struct DuplicateFinder {
    config: FinderConfig,
    sink: Arc<dyn DiagnosticSink>,
}

impl std::fmt::Debug for DuplicateFinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplicateFinder")
            .field("config", &self.config)
            .field("sink", &"<sink>")
            .finish()
    }
}

impl DuplicateFinder {
    /// Create a new duplicate finder.
    #[must_use]
    pub fn new(config: FinderConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { config, sink }
    }

    /// Create a finder with default configuration reporting to stderr.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default(), Arc::new(StderrSink))
    }

    /// Initialize the hash engine, reporting a failure once.
    fn init_hasher(&self) -> Result<Hasher, FinderError> {
        Hasher::new(self.config.chunk_size).map_err(|e| {
            log::debug!("Hash engine initialization failed: {}", e);
            self.sink.report(&Diagnostic::EngineInitFailed {
                error: e.to_string(),
            });
            FinderError::EngineInit(e)
        })
    }

    /// Find all duplicate files beneath a single root.
    ///
    /// # Errors
    ///
    /// See [`DuplicateFinder::find_duplicates_in_paths`].
    pub fn find_duplicates(
        &self,
        path: &Path,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        self.find_duplicates_in_paths(&[path.to_path_buf()])
    }

    /// Find duplicates across several roots.
    ///
    /// Roots are walked in order with one shared visited set, so
    /// duplicates may span roots and overlapping roots are scanned once.
    /// Hashing starts only after every root has been collected.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - No roots are given
    /// - A root does not exist, is not a directory, or cannot be read
    /// - The hash engine cannot be initialized
    pub fn find_duplicates_in_paths(
        &self,
        paths: &[PathBuf],
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        if paths.is_empty() {
            return Err(FinderError::NoPaths);
        }

        let start_time = Instant::now();
        let mut hasher = self.init_hasher()?;

        let mut walker = Walker::new(self.config.walker_config.clone());
        let mut size_groups = SizeGroups::new();

        for root in paths {
            log::info!("Scanning {}", root.display());
            for file in walker.walk_root(root, self.sink.as_ref())? {
                size_groups.insert(file);
            }
        }

        let walk_stats = walker.stats();
        let summary = ScanSummary {
            entries_skipped: walk_stats.entries_skipped,
            entries_failed: walk_stats.entries_failed,
            ..Default::default()
        };

        Ok(self.run_phases(size_groups, &mut hasher, summary, start_time))
    }

    fn run_phases(
        &self,
        size_groups: SizeGroups,
        hasher: &mut Hasher,
        mut summary: ScanSummary,
        start_time: Instant,
    ) -> (Vec<DuplicateGroup>, ScanSummary) {
        let size_stats = size_groups.stats();
        summary.total_files = size_stats.total_files;
        summary.total_size = size_stats.total_size;
        summary.eliminated_by_size = size_stats.eliminated_unique;

        log::info!(
            "Found {} files ({} total), {} share a size with another file",
            size_stats.total_files,
            summary.total_size_display(),
            size_stats.potential_duplicates
        );

        let (groups, hash_stats) = hash_phase(size_groups, hasher, self.sink.as_ref());

        summary.hashed_files = hash_stats.hashed_files;
        summary.failed_files = hash_stats.failed_files;
        summary.bytes_hashed = hash_stats.bytes_hashed;
        summary.duplicate_groups = hash_stats.duplicate_groups;
        summary.duplicate_files = hash_stats.duplicate_files;
        summary.reclaimable_space = hash_stats.wasted_space;
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete in {:.2?}: {} duplicate groups, {} duplicate files, {} reclaimable",
            summary.scan_duration,
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display()
        );

        (groups, summary)
    }
}
