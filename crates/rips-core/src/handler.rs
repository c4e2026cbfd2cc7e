//! Storage handler facade: store, retrieve, ranged read, delete, fixity.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::destmap::DestMapStore;
use crate::error::{StoreError, StoreResult};
use crate::fixity::Fixity;
use crate::metadata::EntityMetadata;
use crate::plugin::PluginRegistry;
use crate::resolver::DestinationResolver;
use crate::verifier::FixityVerifier;

/// In-place storage handler: relocates deposited files instead of copying
/// bytes, then verifies fixity at the final location.
///
/// All operations are synchronous blocking filesystem calls; nothing is
/// retried. The host may call `store` for different entities concurrently;
/// coordination per entity is the destination-map store's job.
pub struct InPlaceStorageHandler<S: DestMapStore> {
    resolver: DestinationResolver<S>,
    verifier: FixityVerifier,
}

impl<S: DestMapStore> InPlaceStorageHandler<S> {
    pub fn new(destmap: S, plugins: PluginRegistry) -> Self {
        InPlaceStorageHandler {
            resolver: DestinationResolver::new(destmap),
            verifier: FixityVerifier::new(plugins),
        }
    }

    /// Override the read-chunk size of built-in checksum passes
    /// (config: `checksum_buffer_bytes`).
    pub fn with_checksum_buffer_bytes(mut self, bytes: usize) -> Self {
        self.verifier = self.verifier.with_buffer_bytes(bytes);
        self
    }

    /// Place the deposited file described by `meta` and verify its fixity,
    /// returning the canonical path.
    ///
    /// The bytes already sit on disk behind the deposit link chain; nothing is
    /// copied. On fixity failure the file stays at its canonical path but the
    /// call fails, and the caller must not treat placement as successful.
    pub fn store(&self, meta: &mut EntityMetadata) -> StoreResult<PathBuf> {
        let dest = self.resolver.resolve(meta)?;
        let passed = self.verifier.verify(&mut meta.fixities, &dest)?;
        if !passed {
            let err = StoreError::FixityMismatch {
                pid: meta.entity_pid.clone(),
                path: dest,
            };
            tracing::error!("{err}");
            return Err(err);
        }
        Ok(dest)
    }

    /// Open a stored entity for reading.
    pub fn retrieve(&self, stored: &Path) -> StoreResult<File> {
        File::open(stored).map_err(|e| StoreError::io("open", stored, e))
    }

    /// Read the inclusive byte range `start..=end` of a stored entity.
    pub fn retrieve_range(&self, stored: &Path, start: u64, end: u64) -> StoreResult<Vec<u8>> {
        let mut file = self.retrieve(stored)?;
        let len = file
            .metadata()
            .map_err(|e| StoreError::io("stat", stored, e))?
            .len();
        if end < start || end >= len {
            return Err(StoreError::RangeOutOfBounds { start, end, len });
        }
        file.seek(SeekFrom::Start(start))
            .map_err(|e| StoreError::io("seek", stored, e))?;
        let mut bytes = vec![0u8; (end - start + 1) as usize];
        file.read_exact(&mut bytes)
            .map_err(|e| StoreError::io("read", stored, e))?;
        Ok(bytes)
    }

    /// Best-effort unlink. Failure is logged and reported as `false`, never
    /// propagated.
    pub fn delete(&self, stored: &Path) -> bool {
        match std::fs::remove_file(stored) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = %stored.display(), error = %e, "failed to delete entity file");
                false
            }
        }
    }

    /// Validate or establish fixity values for a file already in place,
    /// annotating each claim. See [`FixityVerifier::verify`].
    pub fn check_fixity(&self, fixities: &mut [Fixity], stored: &Path) -> StoreResult<bool> {
        self.verifier.verify(fixities, stored)
    }

    /// Stored entities are identified by their filesystem path, so both
    /// path accessors are the identity.
    pub fn full_file_path<'a>(&self, stored: &'a Path) -> &'a Path {
        stored
    }

    pub fn local_file_path<'a>(&self, stored: &'a Path) -> &'a Path {
        self.full_file_path(stored)
    }
}
