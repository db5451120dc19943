use std::io;
use std::path::{Path, PathBuf};

/// A uniquely named file that is removed when the guard goes out of scope,
/// on success and error paths alike
#[derive(Debug)]
pub(crate) struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Create an empty file named `{prefix}<random>{suffix}` in `dir`, or in the
    /// system temp directory when no directory is given
    pub(crate) fn create(dir: Option<&Path>, prefix: &str, suffix: &str) -> io::Result<ScratchFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix).suffix(suffix);
        let file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        // cleanup is ours so that failures are reported the way we want
        let (_, path) = file.keep().map_err(|e| e.error)?;
        Ok(ScratchFile { path })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => log::debug!("removed scratch file {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::warn!(
                "failed to remove scratch file {}: {e}",
                self.path.display()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_are_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchFile::create(Some(dir.path()), "letter_", ".pdf").unwrap();
        let path = scratch.path().to_path_buf();
        assert!(path.exists());
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("letter_"));
        drop(scratch);
        assert!(!path.exists());
    }

    #[test]
    fn already_removed_files_are_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchFile::create(Some(dir.path()), "letter_", ".pdf").unwrap();
        std::fs::remove_file(scratch.path()).unwrap();
        drop(scratch);
    }

    #[test]
    fn names_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let a = ScratchFile::create(Some(dir.path()), "same_", ".pdf").unwrap();
        let b = ScratchFile::create(Some(dir.path()), "same_", ".pdf").unwrap();
        assert_ne!(a.path(), b.path());
    }
}
