//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (Phase 1)
//! - Full content hashing of same-size files (Phase 2)
//! - Duplicate group management

pub mod finder;
pub mod groups;

pub use finder::{
    hash_phase, DuplicateFinder, FinderConfig, FinderError, HashStats, ScanSummary,
};
pub use groups::{group_by_size, DuplicateGroup, GroupingStats, SizeGroup, SizeGroups};
