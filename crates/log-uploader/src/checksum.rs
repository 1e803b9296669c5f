// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Streaming MD5 computation over an arbitrary byte source.
//!
//! The ingestion service verifies every upload against the `md5sum` field, so
//! the digest must always cover the whole payload. [`ChecksumStream`] only
//! hands out a digest once its source has reported end-of-input.

use md5::{Digest, Md5};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Errors from checksum computation.
#[derive(Debug, thiserror::Error)]
pub enum ChecksumError {
    #[error("failed to read source: {0}")]
    Io(#[from] io::Error),

    /// The digest was requested before the source was fully consumed.
    #[error("digest requested after {bytes_read} bytes, before the source was exhausted")]
    Incomplete { bytes_read: u64 },
}

/// A finalized 128-bit MD5 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Md5Digest([u8; 16]);

impl Md5Digest {
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Lowercase hex, as sent in the `md5sum` form field.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Md5Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Md5Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Md5Digest({})", self.to_hex())
    }
}

/// Reader adapter that feeds every byte it yields into an MD5 accumulator.
///
/// The wrapped source is owned by the stream and released when the stream is
/// dropped, whichever way the caller exits.
pub struct ChecksumStream<R> {
    inner: R,
    hasher: Md5,
    bytes_read: u64,
    exhausted: bool,
}

impl<R: Read> ChecksumStream<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Md5::new(),
            bytes_read: 0,
            exhausted: false,
        }
    }

    /// Number of bytes delivered so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Whether the source has reported end-of-input.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Returns the digest of everything read.
    ///
    /// Fails with [`ChecksumError::Incomplete`] until a read has returned
    /// end-of-input, so a digest over a prefix of the payload can never leak
    /// out.
    pub fn digest(&self) -> Result<Md5Digest, ChecksumError> {
        if !self.exhausted {
            return Err(ChecksumError::Incomplete {
                bytes_read: self.bytes_read,
            });
        }
        let mut out = [0u8; 16];
        out.copy_from_slice(&self.hasher.clone().finalize());
        Ok(Md5Digest(out))
    }

    /// Drains whatever is left of the source and returns the digest.
    pub fn consume(mut self) -> Result<Md5Digest, ChecksumError> {
        io::copy(&mut self, &mut io::sink())?;
        self.digest()
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for ChecksumStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n == 0 {
            // A zero-length read into an empty buffer says nothing about EOF.
            if !buf.is_empty() {
                self.exhausted = true;
            }
        } else {
            self.hasher.update(&buf[..n]);
            self.bytes_read += n as u64;
        }
        Ok(n)
    }
}

/// Reads `reader` to the end and returns its MD5 digest.
pub fn compute_md5<R: Read>(reader: R) -> Result<Md5Digest, ChecksumError> {
    ChecksumStream::new(reader).consume()
}

/// Opens `path` and returns the MD5 digest of its contents.
pub fn compute_file_md5(path: &Path) -> Result<Md5Digest, ChecksumError> {
    let file = File::open(path)?;
    compute_md5(file)
}

/// MD5 of an in-memory buffer.
pub fn md5_hex(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}
