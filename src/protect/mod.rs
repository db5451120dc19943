//! Making a finished letter tamper resistant.
//!
//! A document moves through [Unprotected] → [Flattened] → [Encrypted]. Each
//! state owns its bytes, so a document can only be encrypted after it has been
//! flattened and the encrypted bytes cannot be mistaken for the plain ones.

mod flatten;
mod qpdf;
mod scratch;

pub use flatten::flatten;
pub use qpdf::QpdfBackend;

use crate::error::ProtectionError;
use async_trait::async_trait;
use rand::RngCore;

/// Applies owner-password encryption to a finished document
#[async_trait]
pub trait ProtectionBackend: Send + Sync {
    /// Encrypt `pdf` with an empty user password and the given owner password,
    /// allowing printing but not modification or content extraction
    async fn protect(&self, pdf: &[u8], owner_password: &str) -> Result<Vec<u8>, ProtectionError>;
}

/// A fresh random owner password; it is never stored, so nobody can lift the
/// restrictions afterwards
pub fn generate_owner_password() -> String {
    let mut bytes = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Rendered bytes, straight from the layout engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unprotected(Vec<u8>);

/// Bytes with every interactive form field baked into page content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flattened(Vec<u8>);

/// Bytes as returned by the protection backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encrypted(Vec<u8>);

impl Unprotected {
    pub fn new(bytes: Vec<u8>) -> Unprotected {
        Unprotected(bytes)
    }

    pub fn flatten(self) -> Result<Flattened, ProtectionError> {
        let bytes = flatten(&self.0)?;
        log::debug!("document flattened ({} bytes)", bytes.len());
        Ok(Flattened(bytes))
    }
}

impl Flattened {
    pub async fn encrypt(
        self,
        backend: &dyn ProtectionBackend,
    ) -> Result<Encrypted, ProtectionError> {
        let password = generate_owner_password();
        let bytes = backend.protect(&self.0, &password).await?;
        log::debug!("document encrypted ({} bytes)", bytes.len());
        Ok(Encrypted(bytes))
    }
}

impl Encrypted {
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

/// Run the whole protection stage over rendered bytes
pub async fn protect_document(
    pdf: Vec<u8>,
    backend: &dyn ProtectionBackend,
) -> Result<Vec<u8>, ProtectionError> {
    let encrypted = Unprotected::new(pdf).flatten()?.encrypt(backend).await?;
    Ok(encrypted.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records what it was asked to protect and marks the output
    #[derive(Default)]
    struct Recording {
        seen: Mutex<Vec<(Vec<u8>, String)>>,
    }

    #[async_trait]
    impl ProtectionBackend for Recording {
        async fn protect(&self, pdf: &[u8], owner_password: &str) -> Result<Vec<u8>, ProtectionError> {
            self.seen
                .lock()
                .unwrap()
                .push((pdf.to_vec(), owner_password.to_string()));
            let mut out = pdf.to_vec();
            out.extend_from_slice(b"%encrypted");
            Ok(out)
        }
    }

    fn blank_pdf() -> Vec<u8> {
        let mut doc = crate::Document::default();
        doc.add_page(crate::Page::new(crate::pagesize::A4, None));
        doc.to_bytes().unwrap()
    }

    #[test]
    fn passwords_are_random_hex() {
        let a = generate_owner_password();
        let b = generate_owner_password();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn backend_sees_the_flattened_bytes() {
        let pdf = blank_pdf();
        let backend = Recording::default();
        let out = protect_document(pdf.clone(), &backend).await.unwrap();

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, pdf);
        assert_eq!(seen[0].1.len(), 32);
        assert!(out.ends_with(b"%encrypted"));
    }

    #[tokio::test]
    async fn unreadable_documents_never_reach_the_backend() {
        let backend = Recording::default();
        let err = protect_document(b"garbage".to_vec(), &backend).await.unwrap_err();
        assert!(matches!(err, ProtectionError::Document(_)));
        assert!(backend.seen.lock().unwrap().is_empty());
    }
}
