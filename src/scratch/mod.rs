//! Scratch file management for intermediate artifacts
//!
//! All caption and audio temp files live under one private directory per
//! pipeline, named by a fresh UUID plus a caller-supplied suffix so concurrent
//! requests never collide. Handles remove their file on drop, so a strategy
//! that bails out early with `?` still leaves nothing behind.

use anyhow::Context;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use uuid::Uuid;

/// Arena owning the private working directory
pub struct Scratch {
    dir: TempDir,
}

impl Scratch {
    pub fn new() -> crate::Result<Self> {
        let dir = TempDir::new().context("Failed to create scratch directory")?;
        Ok(Self { dir })
    }

    /// Reserve a collision-free path named `<uuid><suffix>`.
    ///
    /// The file itself is not created; the handle removes it on release or
    /// drop if the caller (or an external tool) wrote it.
    pub fn acquire(&self, suffix: &str) -> ScratchFile {
        let name = format!("{}{}", Uuid::new_v4(), suffix);
        ScratchFile {
            path: self.dir.path().join(name),
        }
    }

    /// Wrap a path an external tool derived from one of ours (e.g. whisper's
    /// `<stem>.txt`) so it is reclaimed the same way.
    pub fn adopt(&self, path: PathBuf) -> ScratchFile {
        ScratchFile { path }
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

/// Handle to one scratch path; the file is gone once this is released or
/// dropped.
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file if present. Removing a missing file is not an error,
    /// so releasing twice is a no-op.
    pub fn release(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("failed to remove scratch file {}: {}", self.path.display(), e);
            }
        }
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        self.release();
    }
}
