//! BLAKE2b-512 file hasher with streaming support.
//!
//! # Overview
//!
//! This module provides the [`Hasher`] struct for computing BLAKE2b-512
//! digests of file contents. Files are streamed through the hash state in
//! fixed-size chunks so memory use does not grow with file size.
//!
//! # Example
//!
//! ```no_run
//! use dedup::scanner::{hash_to_hex, Hasher, DEFAULT_CHUNK_SIZE};
//! use std::path::Path;
//!
//! let mut hasher = Hasher::new(DEFAULT_CHUNK_SIZE).unwrap();
//! let digest = hasher.full_hash(Path::new("Cargo.toml")).unwrap();
//! println!("{}", hash_to_hex(&digest));
//! ```

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use blake2::{Blake2b512, Digest as _};

use super::HashError;

/// Length of a BLAKE2b-512 digest in bytes.
pub const DIGEST_LEN: usize = 64;

/// Default read chunk size (64 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Largest read chunk accepted from configuration (64 MiB).
pub const MAX_CHUNK_SIZE: usize = 64 * 1024 * 1024;

/// BLAKE2b-512 digest of a file's full contents.
pub type Digest = [u8; DIGEST_LEN];

/// Streaming content hasher.
///
/// Owns a single read buffer that is reused for every file, so one
/// `Hasher` performs exactly one allocation for the whole run.
#[derive(Debug)]
pub struct Hasher {
    buffer: Vec<u8>,
}

impl Hasher {
    /// Create a hasher that reads files in chunks of `chunk_size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::EngineInit`] if `chunk_size` is zero or the
    /// read buffer cannot be allocated. This is a run-wide failure, not a
    /// per-file one.
    pub fn new(chunk_size: usize) -> Result<Self, HashError> {
        if chunk_size == 0 {
            return Err(HashError::EngineInit {
                requested: chunk_size,
                reason: "chunk size must be non-zero".to_string(),
            });
        }

        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(chunk_size)
            .map_err(|e| HashError::EngineInit {
                requested: chunk_size,
                reason: e.to_string(),
            })?;
        buffer.resize(chunk_size, 0);

        log::trace!("Hash engine initialized with {} byte chunks", chunk_size);
        Ok(Self { buffer })
    }

    /// Size of the read chunk in bytes.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.buffer.len()
    }

    /// Compute the BLAKE2b-512 digest of the entire file at `path`.
    ///
    /// The file handle is released before returning, on success and on
    /// every error path.
    ///
    /// # Errors
    ///
    /// Returns a per-file [`HashError`] if the file cannot be opened or a
    /// read fails partway through.
    pub fn full_hash(&mut self, path: &Path) -> Result<Digest, HashError> {
        let mut file =
            File::open(path).map_err(|e| HashError::from_io(path.to_path_buf(), e))?;
        self.hash_reader(&mut file)
            .map_err(|e| HashError::from_io(path.to_path_buf(), e))
    }

    /// Compute the digest of everything readable from `reader`.
    ///
    /// # Errors
    ///
    /// Propagates the first non-interrupt read error.
    pub fn hash_reader<R: Read>(&mut self, reader: &mut R) -> std::io::Result<Digest> {
        let mut state = Blake2b512::new();

        loop {
            let count = match reader.read(&mut self.buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            state.update(&self.buffer[..count]);
        }

        let mut digest = [0u8; DIGEST_LEN];
        digest.copy_from_slice(&state.finalize());
        Ok(digest)
    }
}

/// Encode a digest as lowercase hexadecimal, two characters per byte.
#[must_use]
pub fn hash_to_hex(digest: &Digest) -> String {
    hex::encode(digest)
}

/// Decode a hexadecimal string produced by [`hash_to_hex`].
///
/// Returns `None` if the string is not exactly `2 * DIGEST_LEN` hex
/// characters.
#[must_use]
pub fn hex_to_hash(s: &str) -> Option<Digest> {
    let mut digest = [0u8; DIGEST_LEN];
    hex::decode_to_slice(s, &mut digest).ok()?;
    Some(digest)
}
