// src/fs/mock.rs

use super::{FileSystem, FileWriter};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::io::AsyncWrite;

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir,
}

/// In-memory filesystem.
///
/// Paths are compared verbatim; no normalisation happens. Writes through
/// [`FileSystem::create_executable`] land in the map as they are polled.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
    read_only: Arc<Mutex<HashSet<PathBuf>>>,
    creates: Arc<Mutex<usize>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let mut files = self.files.lock().unwrap();
        files.insert(path.as_ref().to_path_buf(), MockEntry::File(content.into()));
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut files = self.files.lock().unwrap();
        files.insert(path.as_ref().to_path_buf(), MockEntry::Dir);
    }

    /// Make every future `create_executable` on `path` fail with
    /// `PermissionDenied`.
    pub fn deny_writes(&self, path: impl AsRef<Path>) {
        let mut read_only = self.read_only.lock().unwrap();
        read_only.insert(path.as_ref().to_path_buf());
    }

    /// Content of a file entry, if there is one.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        let files = self.files.lock().unwrap();
        match files.get(path.as_ref()) {
            Some(MockEntry::File(content)) => Some(content.clone()),
            _ => None,
        }
    }

    /// How many times `create_executable` succeeded.
    pub fn create_count(&self) -> usize {
        *self.creates.lock().unwrap()
    }
}

impl FileSystem for MockFileSystem {
    fn is_regular_file(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        matches!(files.get(path), Some(MockEntry::File(_)))
    }

    fn create_executable(&self, path: &Path) -> io::Result<FileWriter> {
        if self.read_only.lock().unwrap().contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("write denied: {:?}", path),
            ));
        }

        let mut files = self.files.lock().unwrap();
        if let Some(MockEntry::Dir) = files.get(path) {
            return Err(io::Error::other(format!("Is a directory: {:?}", path)));
        }
        files.insert(path.to_path_buf(), MockEntry::File(Vec::new()));
        *self.creates.lock().unwrap() += 1;

        Ok(Box::new(MockWriter {
            files: Arc::clone(&self.files),
            path: path.to_path_buf(),
        }))
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let files = self.files.lock().unwrap();
        match files.get(path) {
            Some(MockEntry::File(content)) => String::from_utf8(content.clone())
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
            Some(MockEntry::Dir) => Err(io::Error::other(format!("Is a directory: {:?}", path))),
            None => Err(not_found(path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        self.add_file(path, contents);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let mut files = self.files.lock().unwrap();
        match files.get(path) {
            Some(MockEntry::File(_)) => {
                files.remove(path);
                Ok(())
            }
            Some(MockEntry::Dir) => Err(io::Error::other(format!("Is a directory: {:?}", path))),
            None => Err(not_found(path)),
        }
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("File not found: {:?}", path))
}

struct MockWriter {
    files: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
    path: PathBuf,
}

impl AsyncWrite for MockWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let mut files = self.files.lock().unwrap();
        match files.get_mut(&self.path) {
            Some(MockEntry::File(content)) => {
                content.extend_from_slice(buf);
                Poll::Ready(Ok(buf.len()))
            }
            _ => Poll::Ready(Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("file vanished: {:?}", self.path),
            ))),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
