//! Multi-digest checksum engine: one streaming pass, several digests.
//!
//! The engine instantiates only the digests actually requested, so asking for
//! MD5 alone never pays for SHA256. Reads are chunked to keep memory use
//! bounded on large files.

use crc32fast::Hasher as Crc32;
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::io::Read;

use crate::fixity::FixityAlgorithm;

/// Default read-chunk size for the streaming pass.
pub const DEFAULT_BUF_SIZE: usize = 64 * 1024;

/// Digest strings produced by one pass of the engine.
///
/// Hash digests are lowercase hex; CRC32 is the 32-bit value zero-padded to
/// 8 hex digits, so repeated runs on identical content compare byte-identically.
#[derive(Debug, Clone, Default)]
pub struct DigestSet {
    md5: Option<String>,
    sha1: Option<String>,
    sha256: Option<String>,
    crc32: Option<String>,
}

impl DigestSet {
    /// Digest string for `algorithm`, if it was requested for this pass.
    pub fn value(&self, algorithm: FixityAlgorithm) -> Option<&str> {
        match algorithm {
            FixityAlgorithm::Md5 => self.md5.as_deref(),
            FixityAlgorithm::Sha1 => self.sha1.as_deref(),
            FixityAlgorithm::Sha256 => self.sha256.as_deref(),
            FixityAlgorithm::Crc32 => self.crc32.as_deref(),
        }
    }
}

/// Accumulates the requested digests over a byte stream.
pub struct ChecksumEngine {
    md5: Option<Md5>,
    sha1: Option<Sha1>,
    sha256: Option<Sha256>,
    crc32: Option<Crc32>,
    buf_size: usize,
}

impl ChecksumEngine {
    /// Engine computing exactly the algorithms in `requested` (duplicates
    /// collapse into one digest).
    pub fn new(requested: &[FixityAlgorithm]) -> Self {
        ChecksumEngine {
            md5: requested
                .contains(&FixityAlgorithm::Md5)
                .then(|| Md5::new()),
            sha1: requested
                .contains(&FixityAlgorithm::Sha1)
                .then(|| Sha1::new()),
            sha256: requested
                .contains(&FixityAlgorithm::Sha256)
                .then(|| Sha256::new()),
            crc32: requested
                .contains(&FixityAlgorithm::Crc32)
                .then(Crc32::new),
            buf_size: DEFAULT_BUF_SIZE,
        }
    }

    /// Override the read-chunk size used by [`consume`](Self::consume)
    /// (config: `checksum_buffer_bytes`). Sizes below 1 are clamped to 1.
    pub fn with_buffer_bytes(mut self, bytes: usize) -> Self {
        self.buf_size = bytes.max(1);
        self
    }

    /// Feed a chunk to every active digest.
    pub fn update(&mut self, chunk: &[u8]) {
        if let Some(h) = self.md5.as_mut() {
            h.update(chunk);
        }
        if let Some(h) = self.sha1.as_mut() {
            h.update(chunk);
        }
        if let Some(h) = self.sha256.as_mut() {
            h.update(chunk);
        }
        if let Some(h) = self.crc32.as_mut() {
            h.update(chunk);
        }
    }

    /// Finish all active digests.
    pub fn finish(self) -> DigestSet {
        DigestSet {
            md5: self.md5.map(|h| hex::encode(h.finalize())),
            sha1: self.sha1.map(|h| hex::encode(h.finalize())),
            sha256: self.sha256.map(|h| hex::encode(h.finalize())),
            crc32: self.crc32.map(|h| format!("{:08x}", h.finalize())),
        }
    }

    /// Run one full pass over `reader` and finish.
    pub fn consume<R: Read>(mut self, mut reader: R) -> std::io::Result<DigestSet> {
        let mut buf = vec![0u8; self.buf_size];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            self.update(&buf[..n]);
        }
        Ok(self.finish())
    }
}
