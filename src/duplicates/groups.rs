//! Size buckets and confirmed duplicate groups.
//!
//! # Overview
//!
//! Size grouping is the first phase of duplicate detection. Files with
//! different sizes cannot be duplicates, so every candidate is filed under
//! its exact byte size and only buckets holding two or more files are ever
//! hashed.
//!
//! # Example
//!
//! ```
//! use dedup::scanner::FileEntry;
//! use dedup::duplicates::group_by_size;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileEntry::new(PathBuf::from("/file1.txt"), 1024),
//!     FileEntry::new(PathBuf::from("/file2.txt"), 1024),
//!     FileEntry::new(PathBuf::from("/file3.txt"), 2048),
//! ];
//!
//! let (groups, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);
//! assert_eq!(groups.candidates().count(), 1);
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::scanner::{hash_to_hex, Digest, FileEntry};

/// A group of files with the same size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeGroup {
    /// File size in bytes (shared by all files in this group)
    pub size: u64,
    /// Files with this exact size, in discovery order
    pub files: Vec<FileEntry>,
}

impl SizeGroup {
    /// Create a new, empty size group.
    #[must_use]
    pub fn new(size: u64) -> Self {
        Self {
            size,
            files: Vec::new(),
        }
    }

    /// Add a file to this group.
    ///
    /// # Panics
    ///
    /// Debug assertion fails if file size doesn't match group size.
    pub fn add(&mut self, file: FileEntry) {
        debug_assert_eq!(
            file.size, self.size,
            "File size {} doesn't match group size {}",
            file.size, self.size
        );
        self.files.push(file);
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check if this group has potential duplicates (2+ files).
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.files.len() > 1
    }
}

/// All size buckets observed in one run, keyed by byte size.
///
/// Every candidate lands in exactly one bucket. Buckets with a single
/// member are kept for statistics but never offered for hashing.
#[derive(Debug, Clone, Default)]
pub struct SizeGroups {
    groups: BTreeMap<u64, SizeGroup>,
}

impl SizeGroups {
    /// Create an empty set of buckets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// File a candidate under its size.
    pub fn insert(&mut self, file: FileEntry) {
        self.groups
            .entry(file.size)
            .or_insert_with(|| SizeGroup::new(file.size))
            .add(file);
    }

    /// Buckets that could contain duplicates (2+ files), smallest size first.
    pub fn candidates(&self) -> impl Iterator<Item = &SizeGroup> {
        self.groups.values().filter(|g| g.has_duplicates())
    }

    /// Consume the buckets, keeping only those with 2+ files.
    pub fn into_candidates(self) -> impl Iterator<Item = SizeGroup> {
        self.groups.into_values().filter(SizeGroup::has_duplicates)
    }

    /// Bucket for an exact size, if any file had that size.
    #[must_use]
    pub fn get(&self, size: u64) -> Option<&SizeGroup> {
        self.groups.get(&size)
    }

    /// Number of distinct sizes seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if no file has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of files across all buckets.
    #[must_use]
    pub fn total_files(&self) -> usize {
        self.groups.values().map(SizeGroup::len).sum()
    }

    /// Compute grouping statistics for the current buckets.
    #[must_use]
    pub fn stats(&self) -> GroupingStats {
        let mut stats = GroupingStats {
            unique_sizes: self.groups.len(),
            ..Default::default()
        };

        for group in self.groups.values() {
            stats.total_files += group.len();
            stats.total_size += group.size * group.len() as u64;
            if group.size == 0 {
                stats.empty_files += group.len();
            }
            if group.has_duplicates() {
                stats.potential_duplicates += group.len();
                stats.duplicate_groups += 1;
            } else {
                stats.eliminated_unique += group.len();
            }
        }

        stats
    }
}

/// Statistics from size grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of unique file sizes
    pub unique_sizes: usize,
    /// Number of files that could be duplicates (in groups of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated as unique (singleton groups)
    pub eliminated_unique: usize,
    /// Number of empty files encountered
    pub empty_files: usize,
    /// Number of size groups with 2+ files
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group files by size (Phase 1 of duplicate detection).
///
/// No file I/O is performed; only the sizes recorded at scan time are used.
///
/// # Example
///
/// ```
/// use dedup::scanner::FileEntry;
/// use dedup::duplicates::group_by_size;
/// use std::path::PathBuf;
///
/// let files = vec![
///     FileEntry::new(PathBuf::from("/a.txt"), 100),
///     FileEntry::new(PathBuf::from("/b.txt"), 100),
///     FileEntry::new(PathBuf::from("/c.txt"), 200),
/// ];
///
/// let (groups, stats) = group_by_size(files);
///
/// assert_eq!(groups.get(100).unwrap().len(), 2);
/// assert_eq!(stats.eliminated_unique, 1);
/// ```
#[must_use]
pub fn group_by_size(files: impl IntoIterator<Item = FileEntry>) -> (SizeGroups, GroupingStats) {
    let mut groups = SizeGroups::new();
    for file in files {
        groups.insert(file);
    }

    let stats = groups.stats();
    log::debug!(
        "Phase 1 complete: {} files → {} potential duplicates ({:.1}% eliminated)",
        stats.total_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (groups, stats)
}

/// Confirmed duplicate group: paths whose contents share one digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// BLAKE2b-512 digest of the shared content
    pub digest: Digest,
    /// File size in bytes (shared by all files in the group)
    pub size: u64,
    /// Paths with identical content, sorted
    pub paths: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Create a new duplicate group; paths are sorted on construction.
    #[must_use]
    pub fn new(digest: Digest, size: u64, mut paths: Vec<PathBuf>) -> Self {
        paths.sort();
        Self {
            digest,
            size,
            paths,
        }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }

    /// Total wasted space (all copies minus one).
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Digest as lowercase hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.digest)
    }
}
