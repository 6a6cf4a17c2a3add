// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scoped temporary files for intermediate documents.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use umkehr_core::error::{Result, UmkehrError};

/// A temporary `.pdf` file that is deleted when released or dropped, unless
/// it is persisted to a final location first.
#[derive(Debug)]
pub struct ScopedTempFile {
    file: NamedTempFile,
}

impl ScopedTempFile {
    /// Create an empty file in `dir` whose name starts with `prefix`.
    pub fn create_in(dir: &Path, prefix: &str) -> Result<Self> {
        let file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(".pdf")
            .tempfile_in(dir)?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Replace the file's contents with `bytes`.
    pub fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        let handle = self.file.as_file_mut();
        handle.set_len(0)?;
        handle.write_all(bytes)?;
        handle.flush()?;
        Ok(())
    }

    /// Move the file to `destination`, replacing anything already there.
    pub fn persist(self, destination: &Path) -> Result<PathBuf> {
        self.file
            .persist(destination)
            .map_err(|err| UmkehrError::Io(err.error))?;
        Ok(destination.to_path_buf())
    }

    /// Delete the file now, reporting what went wrong if it could not be
    /// removed.
    pub fn release(self) -> std::result::Result<(), String> {
        let path = self.file.path().display().to_string();
        self.file
            .close()
            .map_err(|err| format!("{}: {}", path, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_deletes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut temp = ScopedTempFile::create_in(dir.path(), "t-").unwrap();
        temp.write_all(b"%PDF-").unwrap();
        let path = temp.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("pdf"));

        temp.release().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn release_reports_a_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let temp = ScopedTempFile::create_in(dir.path(), "gone-").unwrap();
        let path = temp.path().to_path_buf();
        std::fs::remove_file(&path).unwrap();

        let failure = temp.release().unwrap_err();
        assert!(failure.starts_with(&path.display().to_string()), "{}", failure);
    }

    #[test]
    fn drop_deletes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let temp = ScopedTempFile::create_in(dir.path(), "t-").unwrap();
            temp.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn persist_moves_and_keeps_contents() {
        let dir = tempfile::tempdir().unwrap();
        let mut temp = ScopedTempFile::create_in(dir.path(), "t-").unwrap();
        temp.write_all(b"payload").unwrap();
        let scratch = temp.path().to_path_buf();

        let dest = dir.path().join("final.pdf");
        let persisted = temp.persist(&dest).unwrap();

        assert_eq!(persisted, dest);
        assert!(!scratch.exists());
        assert_eq!(std::fs::read(&dest).unwrap(), b"payload");
    }
}
