//! Where finished letters are kept.

use async_trait::async_trait;
use chrono::Utc;
use std::io;
use std::path::{Path, PathBuf};

/// Persists finished documents and hands back a location to record on the letter
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn store(&self, letter_id: &str, pdf: &[u8]) -> io::Result<String>;

    async fn load(&self, location: &str) -> io::Result<Vec<u8>>;
}

/// Stores each letter as `PermissionLetter_{id}_{unix-millis}.pdf` in one directory
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    dir: PathBuf,
}

impl FsDocumentStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> FsDocumentStore {
        FsDocumentStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Letter ids come from outside; keep them from escaping the directory
fn file_safe(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn store(&self, letter_id: &str, pdf: &[u8]) -> io::Result<String> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let name = format!(
            "PermissionLetter_{}_{}.pdf",
            file_safe(letter_id),
            Utc::now().timestamp_millis()
        );
        let path = self.dir.join(name);
        tokio::fs::write(&path, pdf).await?;
        log::info!("stored letter {letter_id} at {}", path.display());
        Ok(path.to_string_lossy().into_owned())
    }

    async fn load(&self, location: &str) -> io::Result<Vec<u8>> {
        tokio::fs::read(location).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stored_files_are_named_after_the_letter() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsDocumentStore::new(dir.path().join("letters"));
        let location = store.store("letter-42", b"%PDF").await.unwrap();

        let name = Path::new(&location).file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("PermissionLetter_letter-42_"), "{name}");
        assert!(name.ends_with(".pdf"));
        assert_eq!(store.load(&location).await.unwrap(), b"%PDF");
    }

    #[tokio::test]
    async fn ids_cannot_escape_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsDocumentStore::new(dir.path());
        let location = store.store("../../etc/passwd", b"%PDF").await.unwrap();
        assert_eq!(Path::new(&location).parent().unwrap(), dir.path());
    }
}
