//! Fixity records and the closed set of built-in algorithms.

use serde::{Deserialize, Serialize};

/// Checksum algorithms computed internally in a single streaming pass.
/// Any other algorithm name is assumed to name an external plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixityAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Crc32,
}

impl FixityAlgorithm {
    /// Match an algorithm name against the built-in set. Names are exact;
    /// anything unmatched is dispatched to the plugin registry instead.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "MD5" => Some(FixityAlgorithm::Md5),
            "SHA1" => Some(FixityAlgorithm::Sha1),
            "SHA256" => Some(FixityAlgorithm::Sha256),
            "CRC32" => Some(FixityAlgorithm::Crc32),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FixityAlgorithm::Md5 => "MD5",
            FixityAlgorithm::Sha1 => "SHA1",
            FixityAlgorithm::Sha256 => "SHA256",
            FixityAlgorithm::Crc32 => "CRC32",
        }
    }
}

/// One integrity assertion against a stored file.
///
/// Verification writes `computed` and `passed` together; they are never set
/// one without the other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixity {
    /// Built-in algorithm name (MD5/SHA1/SHA256/CRC32) or a plugin name.
    pub algorithm: String,
    /// Declared value from the deposit. `None` means there is no prior value
    /// to compare, which always verifies as passed.
    #[serde(default)]
    pub declared: Option<String>,
    /// Value computed by the last verification run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed: Option<String>,
    /// Verdict of the last verification run; `None` until verified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed: Option<bool>,
}

impl Fixity {
    pub fn new(algorithm: impl Into<String>, declared: Option<String>) -> Self {
        Fixity {
            algorithm: algorithm.into(),
            declared,
            computed: None,
            passed: None,
        }
    }

    /// Clear any stale result so an earlier run is never mistaken for a fresh
    /// one.
    pub(crate) fn reset(&mut self) {
        self.computed = None;
        self.passed = None;
    }

    /// Record a fresh computed value and its verdict, together.
    pub(crate) fn record(&mut self, computed: String, passed: bool) {
        self.computed = Some(computed);
        self.passed = Some(passed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_names_are_exact() {
        assert_eq!(FixityAlgorithm::from_name("MD5"), Some(FixityAlgorithm::Md5));
        assert_eq!(FixityAlgorithm::from_name("SHA1"), Some(FixityAlgorithm::Sha1));
        assert_eq!(
            FixityAlgorithm::from_name("SHA256"),
            Some(FixityAlgorithm::Sha256)
        );
        assert_eq!(
            FixityAlgorithm::from_name("CRC32"),
            Some(FixityAlgorithm::Crc32)
        );
        // Lowercase and unknown names go to the plugin path.
        assert_eq!(FixityAlgorithm::from_name("md5"), None);
        assert_eq!(FixityAlgorithm::from_name("BLAKE3"), None);
    }

    #[test]
    fn reset_clears_both_fields() {
        let mut fixity = Fixity::new("MD5", Some("abc".into()));
        fixity.record("abc".into(), true);
        assert!(fixity.computed.is_some() && fixity.passed.is_some());
        fixity.reset();
        assert!(fixity.computed.is_none() && fixity.passed.is_none());
    }

    #[test]
    fn metadata_json_accepts_missing_optional_fields() {
        let fixity: Fixity =
            serde_json::from_str(r#"{ "algorithm": "SHA1" }"#).unwrap();
        assert_eq!(fixity.algorithm, "SHA1");
        assert!(fixity.declared.is_none());
        assert!(fixity.computed.is_none());
        assert!(fixity.passed.is_none());
    }
}
