// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::Path;

use tokio::io::AsyncWrite;

pub mod mock;

/// Async byte sink returned by [`FileSystem::create_executable`].
///
/// Dropping it closes the underlying handle.
pub type FileWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Abstract filesystem interface.
///
/// Errors are plain `io::Error`s so callers can attach the path they were
/// working on and keep the error kind intact.
pub trait FileSystem: Send + Sync + Debug {
    /// `lstat` the path and report whether it is a regular file.
    ///
    /// Directories, symlinks (dangling or not), special files and any stat
    /// error all yield `false`.
    fn is_regular_file(&self, path: &Path) -> bool;

    /// Open `path` for writing, creating it with mode 0755 if absent and
    /// truncating any previous content. Missing parent directories are
    /// created.
    fn create_executable(&self, path: &Path) -> io::Result<FileWriter>;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write `contents` to `path`, creating parent directories as needed.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Delete the file at `path`. A missing file is a `NotFound` error.
    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// Implementation that uses `std::fs` / `tokio::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn is_regular_file(&self, path: &Path) -> bool {
        fs::symlink_metadata(path)
            .map(|meta| meta.file_type().is_file())
            .unwrap_or(false)
    }

    fn create_executable(&self, path: &Path) -> io::Result<FileWriter> {
        ensure_parent(path)?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o755);
        }

        let file = options.open(path)?;
        // `mode` is filtered through the umask and ignored for existing files.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o755))?;
        }
        Ok(Box::new(tokio::fs::File::from_std(file)))
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        ensure_parent(path)?;
        fs::write(path, contents)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
