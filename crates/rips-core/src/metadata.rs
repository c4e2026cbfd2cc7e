//! Deposit metadata for one stored entity.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::fixity::Fixity;

/// Metadata handed over by the upstream deposit workflow for a single file.
///
/// `current_path` is where the file appears inside the repository tree; for
/// in-place storage it is expected to be a soft link into the deposit area.
/// Everything is read-only to the storage handler except the fixity
/// annotations, which verification writes in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMetadata {
    /// Persistent identifier of this file, unique within its IE.
    pub entity_pid: String,
    /// Persistent identifier of the owning intellectual entity.
    pub ie_pid: String,
    /// Path of the file as seen in the repository tree.
    pub current_path: PathBuf,
    /// Declared integrity assertions.
    #[serde(default)]
    pub fixities: Vec<Fixity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_deposit_document() {
        let meta: EntityMetadata = serde_json::from_str(
            r#"{
                "entity_pid": "FL1001",
                "ie_pid": "IE42",
                "current_path": "/repo/IE42/FL1001",
                "fixities": [
                    { "algorithm": "MD5", "declared": "5d41402abc4b2a76b9719d911017c592" },
                    { "algorithm": "XXH64" }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(meta.entity_pid, "FL1001");
        assert_eq!(meta.ie_pid, "IE42");
        assert_eq!(meta.fixities.len(), 2);
        assert!(meta.fixities[1].declared.is_none());
    }

    #[test]
    fn fixities_default_to_empty() {
        let meta: EntityMetadata = serde_json::from_str(
            r#"{ "entity_pid": "FL1", "ie_pid": "IE1", "current_path": "/repo/FL1" }"#,
        )
        .unwrap();
        assert!(meta.fixities.is_empty());
    }
}
