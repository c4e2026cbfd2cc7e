//! Destination resolution: adopt a deposited file in place, exactly once.
//!
//! The deposit workflow leaves a two-level soft-link chain: repository tree
//! link -> deposit-area link -> real file. Resolution renames the real file to
//! its canonical name next to where it already lives (no byte copy) and
//! memoizes the result, so the destructive rename happens at most once per
//! entity. Once the file has moved, the original chain no longer resolves;
//! the memoized mapping is the only way back to the file.

use std::path::{Path, PathBuf};

use crate::destmap::DestMapStore;
use crate::error::{StoreError, StoreResult};
use crate::metadata::EntityMetadata;

pub struct DestinationResolver<S: DestMapStore> {
    destmap: S,
}

impl<S: DestMapStore> DestinationResolver<S> {
    pub fn new(destmap: S) -> Self {
        DestinationResolver { destmap }
    }

    /// Canonical destination for `meta`, resolving and renaming on first call.
    ///
    /// Later calls for the same `(ie_pid, entity_pid)` return the memoized
    /// path without touching the filesystem.
    pub fn resolve(&self, meta: &EntityMetadata) -> StoreResult<PathBuf> {
        if let Some(dest) = self.destmap.read(&meta.ie_pid, &meta.entity_pid)? {
            tracing::debug!(
                entity = %meta.entity_pid,
                dest = %dest.display(),
                "destination already resolved"
            );
            return Ok(dest);
        }

        let deposit_link = read_link_level(&meta.current_path)?;
        let real_file = read_link_level(&deposit_link)?;

        let parent = real_file.parent().unwrap_or_else(|| Path::new("."));
        let dest = parent.join(canonical_file_name(meta, &real_file));

        // Same-filesystem move; failure is surfaced, never retried.
        std::fs::rename(&real_file, &dest)
            .map_err(|e| StoreError::io("rename", real_file.clone(), e))?;
        self.destmap.write(&meta.ie_pid, &meta.entity_pid, &dest)?;
        tracing::info!(
            entity = %meta.entity_pid,
            dest = %dest.display(),
            "adopted deposited file"
        );
        Ok(dest)
    }
}

/// Follow exactly one soft-link level. Relative targets are resolved against
/// the link's own directory. A missing path counts as "not a soft link",
/// the same verdict the deposit contract gives any non-link.
fn read_link_level(path: &Path) -> StoreResult<PathBuf> {
    let md = match std::fs::symlink_metadata(path) {
        Ok(md) => md,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StoreError::NotASymlink {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(StoreError::io("stat", path, e)),
    };
    if !md.file_type().is_symlink() {
        return Err(StoreError::NotASymlink {
            path: path.to_path_buf(),
        });
    }
    let target = std::fs::read_link(path).map_err(|e| StoreError::io("readlink", path, e))?;
    if target.is_absolute() {
        Ok(target)
    } else {
        Ok(path.parent().unwrap_or_else(|| Path::new(".")).join(target))
    }
}

/// Deterministic canonical name: the entity pid plus the real file's
/// extension. Pids are unique, so renames never collide and repeated runs
/// derive the same name.
fn canonical_file_name(meta: &EntityMetadata, real_file: &Path) -> String {
    match real_file.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}.{}", meta.entity_pid, ext),
        None => meta.entity_pid.clone(),
    }
}
