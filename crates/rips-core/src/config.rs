//! Global configuration loaded from `~/.config/rips/config.toml`.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Global configuration for the storage handler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RipsConfig {
    /// Directory for the destination-map JSON documents. `None` means the
    /// default under the XDG state home.
    #[serde(default)]
    pub destinations_dir: Option<PathBuf>,
    /// Read-chunk size in bytes for built-in checksum passes. `None` means
    /// the built-in default (64 KiB).
    #[serde(default)]
    pub checksum_buffer_bytes: Option<usize>,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("rips")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RipsConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = RipsConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: RipsConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_builtin_fallbacks() {
        let cfg = RipsConfig::default();
        assert!(cfg.destinations_dir.is_none());
        assert!(cfg.checksum_buffer_bytes.is_none());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = RipsConfig {
            destinations_dir: Some(PathBuf::from("/var/lib/rips/destinations")),
            checksum_buffer_bytes: Some(128 * 1024),
        };
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: RipsConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.destinations_dir, cfg.destinations_dir);
        assert_eq!(parsed.checksum_buffer_bytes, cfg.checksum_buffer_bytes);
    }

    #[test]
    fn empty_config_file_parses_to_defaults() {
        let cfg: RipsConfig = toml::from_str("").unwrap();
        assert!(cfg.destinations_dir.is_none());
        assert!(cfg.checksum_buffer_bytes.is_none());
    }
}
