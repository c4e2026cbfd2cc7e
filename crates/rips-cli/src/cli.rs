//! CLI: store a deposit, check fixity, retrieve, ranged read, delete.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use rips_core::config;
use rips_core::destmap::FileDestMapStore;
use rips_core::fixity::Fixity;
use rips_core::handler::InPlaceStorageHandler;
use rips_core::metadata::EntityMetadata;
use rips_core::plugin::PluginRegistry;

/// Top-level CLI for the RIPS storage handler.
#[derive(Debug, Parser)]
#[command(name = "rips")]
#[command(about = "RIPS: in-place repository storage with fixity verification", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Store a deposited entity described by a metadata JSON document.
    Store {
        /// Path to an entity metadata JSON file.
        metadata: PathBuf,
    },

    /// Check one fixity value against a stored file.
    CheckFixity {
        /// Stored file path.
        path: PathBuf,

        /// Algorithm name: MD5/SHA1/SHA256/CRC32 or a plugin name.
        algorithm: String,

        /// Declared value to compare; omit to just compute one.
        #[arg(long)]
        value: Option<String>,
    },

    /// Copy a stored entity to stdout.
    Retrieve {
        /// Stored file path.
        path: PathBuf,
    },

    /// Read an inclusive byte range of a stored entity and print it as hex.
    Range {
        /// Stored file path.
        path: PathBuf,

        /// First byte offset (inclusive).
        start: u64,

        /// Last byte offset (inclusive).
        end: u64,
    },

    /// Delete a stored entity (best effort).
    Delete {
        /// Stored file path.
        path: PathBuf,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        let destinations_dir = match cfg.destinations_dir {
            Some(dir) => dir,
            None => FileDestMapStore::default_dir()?,
        };
        let mut handler = InPlaceStorageHandler::new(
            FileDestMapStore::new(destinations_dir),
            PluginRegistry::new(),
        );
        if let Some(bytes) = cfg.checksum_buffer_bytes {
            handler = handler.with_checksum_buffer_bytes(bytes);
        }

        match cli.command {
            CliCommand::Store { metadata } => {
                let bytes = std::fs::read(&metadata)
                    .with_context(|| format!("read metadata {}", metadata.display()))?;
                let mut meta: EntityMetadata = serde_json::from_slice(&bytes)
                    .with_context(|| format!("parse metadata {}", metadata.display()))?;
                let dest = handler.store(&mut meta)?;
                for fixity in &meta.fixities {
                    print_fixity(fixity);
                }
                println!("{}", dest.display());
            }
            CliCommand::CheckFixity { path, algorithm, value } => {
                let mut fixities = vec![Fixity::new(algorithm, value)];
                let passed = handler.check_fixity(&mut fixities, &path)?;
                print_fixity(&fixities[0]);
                if !passed {
                    std::process::exit(1);
                }
            }
            CliCommand::Retrieve { path } => {
                let mut file = handler.retrieve(&path)?;
                let stdout = std::io::stdout();
                let mut out = stdout.lock();
                std::io::copy(&mut file, &mut out)
                    .with_context(|| format!("copy {} to stdout", path.display()))?;
            }
            CliCommand::Range { path, start, end } => {
                let bytes = handler.retrieve_range(&path, start, end)?;
                println!("{}", hex::encode(&bytes));
            }
            CliCommand::Delete { path } => {
                if !handler.delete(&path) {
                    eprintln!("not deleted: {}", path.display());
                    std::process::exit(1);
                }
                println!("deleted {}", path.display());
            }
        }

        Ok(())
    }
}

fn print_fixity(fixity: &Fixity) {
    println!(
        "{}: {} ({})",
        fixity.algorithm,
        fixity.computed.as_deref().unwrap_or("-"),
        if fixity.passed == Some(true) { "ok" } else { "failed" }
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_store() {
        let cli = Cli::try_parse_from(["rips", "store", "deposit.json"]).unwrap();
        match cli.command {
            CliCommand::Store { metadata } => {
                assert_eq!(metadata, PathBuf::from("deposit.json"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_check_fixity_with_optional_value() {
        let cli = Cli::try_parse_from([
            "rips",
            "check-fixity",
            "/perm/FL1.bin",
            "MD5",
            "--value",
            "5d41402abc4b2a76b9719d911017c592",
        ])
        .unwrap();
        match cli.command {
            CliCommand::CheckFixity { path, algorithm, value } => {
                assert_eq!(path, PathBuf::from("/perm/FL1.bin"));
                assert_eq!(algorithm, "MD5");
                assert_eq!(value.as_deref(), Some("5d41402abc4b2a76b9719d911017c592"));
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["rips", "check-fixity", "/perm/FL1.bin", "SHA1"]).unwrap();
        match cli.command {
            CliCommand::CheckFixity { value, .. } => assert!(value.is_none()),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_range_offsets() {
        let cli = Cli::try_parse_from(["rips", "range", "/perm/FL1.bin", "0", "4"]).unwrap();
        match cli.command {
            CliCommand::Range { start, end, .. } => {
                assert_eq!((start, end), (0, 4));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_subcommand() {
        assert!(Cli::try_parse_from(["rips"]).is_err());
    }
}
