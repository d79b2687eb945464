//! The build-wide state file shared by every transform invocation.
//!
//! The transform tool owns the file's contents; it reads the identifiers already handed out
//! and appends new ones, so numbering continues across every driver invocation in a build.
//! The driver treats the file as an append-only log. It holds an exclusive advisory lock on a
//! sibling `<state>.lock` file while a transform runs and while it snapshots the file for
//! embedding, and records which byte range each transform appended.

use fs2::FileExt;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Failed to lock state file {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("State file {0} does not exist; no transform has run in this build")]
    Missing(PathBuf),

    #[error("Failed to copy state file {from} to {to}: {source}")]
    Snapshot {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The byte range of the state file appended by one transform invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateSegment {
    pub offset: u64,
    pub len: u64,
}

impl StateSegment {
    pub fn end(&self) -> u64 {
        self.offset + self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Location of the shared state file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateFile {
    path: PathBuf,
}

/// Exclusive lock on the state file, released on drop.
#[derive(Debug)]
pub struct StateLock {
    file: File,
    path: PathBuf,
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), error = %e, "Failed to release state lock");
        }
    }
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lock_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Current size in bytes, zero if the transform tool has not created it yet.
    pub fn len(&self) -> u64 {
        fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Blocks until this process holds the state lock.
    ///
    /// The state file's directory is created if needed so the transform tool can create the
    /// file itself.
    pub fn lock(&self) -> Result<StateLock, StateError> {
        let lock_path = self.lock_path();
        let lock_err = |source| StateError::Lock {
            path: lock_path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(lock_err)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&lock_path)
            .map_err(lock_err)?;

        file.lock_exclusive().map_err(lock_err)?;
        debug!(path = %lock_path.display(), "Acquired state lock");

        Ok(StateLock {
            file,
            path: lock_path,
        })
    }

    /// The segment appended since the file was `before` bytes long.
    ///
    /// A file that shrank breaks the append-only contract; that is logged and reported as an
    /// empty segment at the new end.
    pub fn appended_since(&self, before: u64) -> StateSegment {
        let after = self.len();
        if after < before {
            warn!(
                path = %self.path.display(),
                before,
                after,
                "State file shrank during transform; region numbering may repeat"
            );
            return StateSegment {
                offset: after,
                len: 0,
            };
        }

        StateSegment {
            offset: before,
            len: after - before,
        }
    }

    /// Copies the state file to `dest` under the state lock, returning the bytes copied.
    pub fn snapshot_to(&self, dest: &Path) -> Result<Vec<u8>, StateError> {
        let _lock = self.lock()?;

        if !self.path.exists() {
            return Err(StateError::Missing(self.path.clone()));
        }

        let snapshot_err = |source| StateError::Snapshot {
            from: self.path.clone(),
            to: dest.to_path_buf(),
            source,
        };

        let bytes = fs::read(&self.path).map_err(snapshot_err)?;
        fs::write(dest, &bytes).map_err(snapshot_err)?;

        debug!(
            from = %self.path.display(),
            to = %dest.display(),
            bytes = bytes.len(),
            "Snapshotted state file"
        );
        Ok(bytes)
    }
}
