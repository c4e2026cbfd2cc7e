//! Fixity verification: plugin dispatch plus a single-pass built-in sweep.

use std::fs::File;
use std::path::Path;

use crate::checksum::ChecksumEngine;
use crate::error::{StoreError, StoreResult};
use crate::fixity::{Fixity, FixityAlgorithm};
use crate::plugin::PluginRegistry;

/// Validates declared fixity values against the file at a canonical path.
pub struct FixityVerifier {
    plugins: PluginRegistry,
    buffer_bytes: Option<usize>,
}

impl FixityVerifier {
    pub fn new(plugins: PluginRegistry) -> Self {
        FixityVerifier {
            plugins,
            buffer_bytes: None,
        }
    }

    /// Override the read-chunk size of the built-in checksum pass.
    pub fn with_buffer_bytes(mut self, bytes: usize) -> Self {
        self.buffer_bytes = Some(bytes);
        self
    }

    /// Validate or establish every claim in `fixities` against `path`,
    /// annotating each claim in place. Returns the AND of all verdicts.
    ///
    /// Built-in algorithms share one streaming pass over a single file handle
    /// and compare case-insensitively; plugin algorithms each read the file on
    /// their own and compare exactly. A claim without a declared value passes
    /// as soon as a value has been computed.
    pub fn verify(&self, fixities: &mut [Fixity], path: &Path) -> StoreResult<bool> {
        let mut all_passed = true;
        let mut known: Vec<(usize, FixityAlgorithm)> = Vec::new();

        for (idx, fixity) in fixities.iter_mut().enumerate() {
            fixity.reset();
            match FixityAlgorithm::from_name(&fixity.algorithm) {
                Some(algorithm) => known.push((idx, algorithm)),
                None => {
                    let plugin = self
                        .plugins
                        .get(&fixity.algorithm)
                        .ok_or_else(|| StoreError::UnknownPlugin(fixity.algorithm.clone()))?;
                    let computed = plugin
                        .compute(path, fixity.declared.as_deref())
                        .map_err(|source| StoreError::Plugin {
                            name: fixity.algorithm.clone(),
                            source,
                        })?;
                    let passed = match fixity.declared.as_deref() {
                        None => true,
                        Some(declared) => declared == computed,
                    };
                    fixity.record(computed, passed);
                    all_passed &= passed;
                }
            }
        }

        if !known.is_empty() {
            let algorithms: Vec<FixityAlgorithm> = known.iter().map(|&(_, a)| a).collect();
            let file = File::open(path).map_err(|e| StoreError::io("open", path, e))?;
            let mut engine = ChecksumEngine::new(&algorithms);
            if let Some(bytes) = self.buffer_bytes {
                engine = engine.with_buffer_bytes(bytes);
            }
            // One pass, however many digests were asked for. `consume` takes
            // the handle by value, so it is dropped on every exit path.
            let digests = engine
                .consume(file)
                .map_err(|e| StoreError::io("read", path, e))?;
            for (idx, algorithm) in known {
                let fixity = &mut fixities[idx];
                let computed = digests
                    .value(algorithm)
                    .expect("digest computed for every requested algorithm")
                    .to_string();
                let passed = match fixity.declared.as_deref() {
                    None => true,
                    Some(declared) => declared.eq_ignore_ascii_case(&computed),
                };
                fixity.record(computed, passed);
                all_passed &= passed;
            }
        }

        Ok(all_passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::ChecksumPlugin;
    use anyhow::Result;
    use std::io::Write;
    use std::sync::Arc;

    const HELLO_MD5: &str = "5d41402abc4b2a76b9719d911017c592";

    struct Fixed(&'static str);

    impl ChecksumPlugin for Fixed {
        fn compute(&self, _path: &Path, _declared: Option<&str>) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn hello_file() -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello").unwrap();
        f.flush().unwrap();
        f
    }

    fn verifier_with(name: &str, value: &'static str) -> FixityVerifier {
        let mut registry = PluginRegistry::new();
        registry.register(name, Arc::new(Fixed(value)));
        FixityVerifier::new(registry)
    }

    #[test]
    fn builtin_match_passes_and_annotates() {
        let f = hello_file();
        let verifier = FixityVerifier::new(PluginRegistry::new());
        let mut fixities = vec![Fixity::new("MD5", Some(HELLO_MD5.into()))];
        assert!(verifier.verify(&mut fixities, f.path()).unwrap());
        assert_eq!(fixities[0].computed.as_deref(), Some(HELLO_MD5));
        assert_eq!(fixities[0].passed, Some(true));
    }

    #[test]
    fn builtin_mismatch_fails_but_still_annotates() {
        let f = hello_file();
        let verifier = FixityVerifier::new(PluginRegistry::new());
        let mut fixities = vec![
            Fixity::new("MD5", Some("deadbeef".into())),
            Fixity::new("CRC32", Some("3610a686".into())),
        ];
        assert!(!verifier.verify(&mut fixities, f.path()).unwrap());
        assert_eq!(fixities[0].passed, Some(false));
        assert_eq!(fixities[0].computed.as_deref(), Some(HELLO_MD5));
        // The good claim still passes; the overall verdict is the AND.
        assert_eq!(fixities[1].passed, Some(true));
    }

    #[test]
    fn builtin_comparison_ignores_case() {
        let f = hello_file();
        let verifier = FixityVerifier::new(PluginRegistry::new());
        let mut fixities = vec![Fixity::new("MD5", Some(HELLO_MD5.to_uppercase()))];
        assert!(verifier.verify(&mut fixities, f.path()).unwrap());
    }

    #[test]
    fn buffer_override_does_not_change_digests() {
        let f = hello_file();
        let verifier = FixityVerifier::new(PluginRegistry::new()).with_buffer_bytes(3);
        let mut fixities = vec![Fixity::new("MD5", Some(HELLO_MD5.into()))];
        assert!(verifier.verify(&mut fixities, f.path()).unwrap());
        assert_eq!(fixities[0].computed.as_deref(), Some(HELLO_MD5));
    }

    #[test]
    fn plugin_comparison_is_exact() {
        let f = hello_file();
        let verifier = verifier_with("XXH64", "abcd");
        let mut fixities = vec![Fixity::new("XXH64", Some("ABCD".into()))];
        assert!(!verifier.verify(&mut fixities, f.path()).unwrap());
        assert_eq!(fixities[0].computed.as_deref(), Some("abcd"));

        let mut fixities = vec![Fixity::new("XXH64", Some("abcd".into()))];
        assert!(verifier.verify(&mut fixities, f.path()).unwrap());
    }

    #[test]
    fn absent_declared_value_always_passes() {
        let f = hello_file();
        let verifier = verifier_with("XXH64", "abcd");
        let mut fixities = vec![Fixity::new("MD5", None), Fixity::new("XXH64", None)];
        assert!(verifier.verify(&mut fixities, f.path()).unwrap());
        assert_eq!(fixities[0].computed.as_deref(), Some(HELLO_MD5));
        assert_eq!(fixities[0].passed, Some(true));
        assert_eq!(fixities[1].computed.as_deref(), Some("abcd"));
        assert_eq!(fixities[1].passed, Some(true));
    }

    #[test]
    fn unknown_algorithm_without_plugin_is_an_error() {
        let f = hello_file();
        let verifier = FixityVerifier::new(PluginRegistry::new());
        let mut fixities = vec![Fixity::new("BLAKE3", Some("00".into()))];
        let err = verifier.verify(&mut fixities, f.path()).unwrap_err();
        assert!(matches!(err, StoreError::UnknownPlugin(name) if name == "BLAKE3"));
    }

    #[test]
    fn stale_results_are_cleared_before_recomputing() {
        let f = hello_file();
        let verifier = FixityVerifier::new(PluginRegistry::new());
        let mut fixities = vec![Fixity::new("MD5", Some("deadbeef".into()))];
        assert!(!verifier.verify(&mut fixities, f.path()).unwrap());

        // Fix the declared value and re-run; the old verdict must not leak.
        fixities[0].declared = Some(HELLO_MD5.into());
        assert!(verifier.verify(&mut fixities, f.path()).unwrap());
        assert_eq!(fixities[0].passed, Some(true));
    }

    #[test]
    fn missing_file_surfaces_open_error() {
        let verifier = FixityVerifier::new(PluginRegistry::new());
        let mut fixities = vec![Fixity::new("MD5", None)];
        let err = verifier
            .verify(&mut fixities, Path::new("/nonexistent/payload.bin"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Io { op: "open", .. }));
        // Claims stay unannotated on error.
        assert!(fixities[0].computed.is_none());
        assert!(fixities[0].passed.is_none());
    }
}
