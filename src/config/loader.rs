// src/config/loader.rs

use std::path::{Path, PathBuf};

use crate::config::model::{Manifest, RawManifest};
use crate::errors::{FetchbinError, Result};
use crate::fs::FileSystem;

/// Load a manifest from a given path and return the raw `RawManifest`.
///
/// This only performs TOML deserialization; it does **not** validate. Use
/// [`load_and_validate`] for that.
pub fn load_from_path(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<RawManifest> {
    let path = path.as_ref();
    let contents = fs
        .read_to_string(path)
        .map_err(|e| FetchbinError::file_io(path, e))?;

    let manifest: RawManifest = toml::from_str(&contents)?;

    Ok(manifest)
}

/// Load a manifest from path, validate it and anchor relative paths at the
/// manifest's directory.
pub fn load_and_validate(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<Manifest> {
    let path = path.as_ref();
    let raw = load_from_path(fs, path)?;
    let manifest = Manifest::try_from(raw)?;
    Ok(manifest.with_root(manifest_root_dir(path)))
}

/// Resolve the manifest path to use.
///
/// Priority: explicit `--config`, then `FETCHBIN_CONFIG`, then
/// `Fetchbin.toml` in the current working directory.
pub fn default_manifest_path(cli: Option<&Path>) -> PathBuf {
    if let Some(path) = cli {
        return path.to_path_buf();
    }
    match std::env::var_os("FETCHBIN_CONFIG") {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from("Fetchbin.toml"),
    }
}

/// Directory a manifest's relative paths are resolved against.
///
/// A bare file name like `Fetchbin.toml` (empty parent) resolves to `.`.
fn manifest_root_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
