// src/config/validate.rs

use std::path::{Component, Path};

use crate::config::model::{Manifest, RawManifest};
use crate::errors::{FetchbinError, Result};

impl TryFrom<RawManifest> for Manifest {
    type Error = crate::errors::FetchbinError;

    fn try_from(raw: RawManifest) -> std::result::Result<Self, Self::Error> {
        validate_raw_manifest(&raw)?;
        Ok(Manifest::new_unchecked(raw.config, raw.binary))
    }
}

fn validate_raw_manifest(cfg: &RawManifest) -> Result<()> {
    ensure_has_binaries(cfg)?;
    validate_global_config(cfg)?;
    validate_binaries(cfg)?;
    Ok(())
}

fn ensure_has_binaries(cfg: &RawManifest) -> Result<()> {
    if cfg.binary.is_empty() {
        return Err(FetchbinError::Config(
            "manifest must contain at least one [binary.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawManifest) -> Result<()> {
    if cfg.config.timeout_secs == Some(0) {
        return Err(FetchbinError::Config(
            "[config].timeout_secs must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_binaries(cfg: &RawManifest) -> Result<()> {
    for (name, binary) in cfg.binary.iter() {
        if !is_plain_file_name(name) {
            return Err(FetchbinError::Config(format!(
                "binary name '{}' must be a plain file name (no separators, '.' or '..')",
                name
            )));
        }
        if binary.url.trim().is_empty() {
            return Err(FetchbinError::Config(format!(
                "binary '{}' has an empty `url`",
                name
            )));
        }
        if let Some(ref embedded) = binary.embedded {
            if embedded.as_os_str().is_empty() {
                return Err(FetchbinError::Config(format!(
                    "binary '{}' has an empty `embedded` path",
                    name
                )));
            }
        }
    }
    Ok(())
}

/// A name that joins onto a directory as exactly one normal component.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}
