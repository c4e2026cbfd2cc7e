//! RIPS core: in-place repository storage with fixity verification.
//!
//! A deposited file enters the repository as a two-level soft-link chain
//! (repository tree link -> deposit-area link -> real file). This crate adopts
//! the real file in place (rename, not copy), memoizes the canonical
//! destination per entity so placement is idempotent, and validates declared
//! fixity values with built-in digests or external checksum plugins.

pub mod config;
pub mod logging;

pub mod checksum;
pub mod destmap;
pub mod error;
pub mod fixity;
pub mod handler;
pub mod metadata;
pub mod plugin;
pub mod resolver;
pub mod verifier;
