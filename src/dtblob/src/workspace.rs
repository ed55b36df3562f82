//! Per-invocation scratch directory shared with the external converter.
//!
//! Each workspace gets a freshly generated name under an explicitly
//! configured base directory, so repeated or concurrent runs never collide.
//! The directory and everything in it is removed when the workspace is
//! dropped, whichever way the pipeline exits.

use crate::error::Result;
use crate::extract::RawBlob;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const WORKSPACE_PREFIX: &str = ".dtb_to_dts-";
const BLOB_FILE: &str = "blob.dtb";
const SOURCE_FILE: &str = "blob.dts";

#[derive(Debug)]
pub struct TempWorkspace {
    dir: TempDir,
}

impl TempWorkspace {
    /// Create a uniquely named directory inside `base`
    pub fn create(base: &Path) -> Result<Self> {
        fs::create_dir_all(base)?;
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(base)?;
        tracing::debug!("Created workspace {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where the extracted blob is written for the converter
    pub fn blob_path(&self) -> PathBuf {
        self.dir.path().join(BLOB_FILE)
    }

    /// Where the converter is asked to write its source output
    pub fn source_path(&self) -> PathBuf {
        self.dir.path().join(SOURCE_FILE)
    }

    /// Write the blob into the workspace and return its path
    pub fn persist_blob(&self, blob: &RawBlob) -> Result<PathBuf> {
        let path = self.blob_path();
        fs::write(&path, blob.as_bytes())?;
        Ok(path)
    }

    /// Remove the workspace now, reporting any failure.
    ///
    /// Dropping the workspace also removes it, but silently.
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        tracing::debug!("Removed workspace {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob() -> RawBlob {
        let mem = crate::memory::MockAddressSpace::new(vec![1, 2, 3, 4], 0);
        crate::extract::extract(&mem, 0, 4).unwrap()
    }

    fn entries(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_workspaces_are_unique() {
        let base = tempfile::tempdir().unwrap();

        let a = TempWorkspace::create(base.path()).unwrap();
        let b = TempWorkspace::create(base.path()).unwrap();
        assert_ne!(a.path(), b.path());
        assert!(a.path().starts_with(base.path()));
        assert_eq!(entries(base.path()), 2);
    }

    #[test]
    fn test_persist_and_close() {
        let base = tempfile::tempdir().unwrap();
        let ws = TempWorkspace::create(base.path()).unwrap();

        let path = ws.persist_blob(&blob()).unwrap();
        assert_eq!(fs::read(&path).unwrap(), vec![1, 2, 3, 4]);
        fs::write(ws.source_path(), "/dts-v1/;").unwrap();

        ws.close().unwrap();
        assert_eq!(entries(base.path()), 0);
    }

    #[test]
    fn test_drop_removes_directory() {
        let base = tempfile::tempdir().unwrap();
        let path = {
            let ws = TempWorkspace::create(base.path()).unwrap();
            ws.persist_blob(&blob()).unwrap();
            ws.path().to_path_buf()
        };

        assert!(!path.exists());
        assert_eq!(entries(base.path()), 0);
    }

    #[test]
    fn test_creates_missing_base() {
        let base = tempfile::tempdir().unwrap();
        let nested = base.path().join("scratch").join("dtb");

        let ws = TempWorkspace::create(&nested).unwrap();
        assert!(ws.path().starts_with(&nested));
    }
}
