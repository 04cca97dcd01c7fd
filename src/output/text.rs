//! Plain-text duplicate report.
//!
//! One block per duplicate group: the lowercase hex digest on its own
//! line, then each member path on a line indented by one tab. There is no
//! header, summary or trailing metadata.

use std::io::{self, Write};
use std::path::Path;

use crate::duplicates::DuplicateGroup;

/// Plain-text report formatter.
pub struct TextReport<'a> {
    groups: &'a [DuplicateGroup],
}

impl<'a> TextReport<'a> {
    /// Create a new report over confirmed duplicate groups.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup]) -> Self {
        Self { groups }
    }

    /// Write the report to the given writer.
    ///
    /// Groups with fewer than two paths are not written.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised by the writer.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for group in self.groups.iter().filter(|g| g.len() > 1) {
            writeln!(writer, "{}", group.hash_hex())?;
            for path in &group.paths {
                writer.write_all(b"\t")?;
                write_path(&mut writer, path)?;
                writer.write_all(b"\n")?;
            }
        }
        writer.flush()
    }

    /// Render the report into a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the output is not valid UTF-8, which can only
    /// happen for non-UTF-8 paths.
    pub fn to_string(&self) -> io::Result<String> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// Write a path without lossy conversion where the platform allows it.
#[cfg(unix)]
fn write_path<W: Write>(writer: &mut W, path: &Path) -> io::Result<()> {
    use std::os::unix::ffi::OsStrExt;
    writer.write_all(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn write_path<W: Write>(writer: &mut W, path: &Path) -> io::Result<()> {
    write!(writer, "{}", path.display())
}
