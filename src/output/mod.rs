//! Output formatters for duplicate scan results.
//!
//! The only format is the plain-text report written to stdout:
//!
//! ```text
//! <hex digest>
//! \t<path>
//! \t<path>
//! ```
//!
//! # Example
//!
//! ```no_run
//! use dedup::duplicates::DuplicateFinder;
//! use dedup::output::TextReport;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (groups, _) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! TextReport::new(&groups).write_to(std::io::stdout().lock()).unwrap();
//! ```

pub mod text;

// Re-export main types
pub use text::TextReport;
