// src/config/mod.rs

//! Manifest loading and validation for fetchbin.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a manifest from disk (`loader.rs`).
//! - Validate basic invariants like file-safe binary names (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_manifest_path, load_and_validate, load_from_path};
pub use model::{BinaryConfig, ConfigSection, Manifest, RawManifest};
