//! The generation pipeline: validate, render, protect, hash, store.

use crate::config::GeneratorConfig;
use crate::error::{GenerationError, InputError};
use crate::integrity::sha256_hex;
use crate::letter::{ApprovedRollNumbers, LetterRecord, PersistedDocument};
use crate::protect::{protect_document, ProtectionBackend, QpdfBackend};
use crate::render::render_letter;
use crate::store::DocumentStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Expand a verification URL for one letter. `{id}` in `template` is replaced
/// by the percent-encoded letter id; without it the id is appended as a final
/// path segment.
pub fn verification_url(template: &str, letter_id: &str) -> Result<String, InputError> {
    let template = template.trim();
    let id = urlencoding::encode(letter_id);
    let url = if template.contains("{id}") {
        template.replace("{id}", &id)
    } else {
        format!("{}/{}", template.trim_end_matches('/'), id)
    };

    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(rest) if rest.split('/').next().is_some_and(|host| !host.is_empty()) => Ok(url),
        _ => Err(InputError::VerificationUrl(url)),
    }
}

/// One letter to generate
#[derive(Debug, Clone)]
pub struct GenerationRequest<'a> {
    pub letter: &'a LetterRecord,
    pub approved: &'a ApprovedRollNumbers,
    /// Overrides the configured verification URL
    pub verification_url: Option<&'a str>,
    pub generated_at: DateTime<Utc>,
}

impl<'a> GenerationRequest<'a> {
    pub fn new(letter: &'a LetterRecord, approved: &'a ApprovedRollNumbers) -> Self {
        GenerationRequest {
            letter,
            approved,
            verification_url: None,
            generated_at: Utc::now(),
        }
    }

    pub fn verification_url(mut self, url: &'a str) -> Self {
        self.verification_url = Some(url);
        self
    }

    pub fn at(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = generated_at;
        self
    }
}

/// Final bytes and their digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    pub bytes: Vec<u8>,
    /// Hex SHA-256 of `bytes`
    pub hash: String,
    pub secured: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Generated(GeneratedDocument),
    /// The letter already has a stored document; nothing was rendered
    AlreadyGenerated(PersistedDocument),
}

/// Runs the pipeline for any number of letters. Holds no per-letter state, so
/// one generator can serve concurrent requests.
#[derive(Clone)]
pub struct LetterGenerator {
    config: GeneratorConfig,
    protection: Option<Arc<dyn ProtectionBackend>>,
}

impl LetterGenerator {
    /// Uses the `qpdf` backend when protection is enabled in `config`
    pub fn new(config: GeneratorConfig) -> LetterGenerator {
        let protection: Option<Arc<dyn ProtectionBackend>> = if config.protection.enabled {
            Some(Arc::new(QpdfBackend::new(&config.protection)))
        } else {
            None
        };
        LetterGenerator { config, protection }
    }

    pub fn with_backend(mut self, backend: Arc<dyn ProtectionBackend>) -> LetterGenerator {
        self.protection = Some(backend);
        self
    }

    pub fn without_protection(mut self) -> LetterGenerator {
        self.protection = None;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest<'_>,
    ) -> Result<GenerationOutcome, GenerationError> {
        let letter = request.letter;
        letter.validate()?;
        if let Some(existing) = &letter.generated {
            log::info!(
                "letter {} already generated at {}",
                letter.id,
                existing.location
            );
            return Ok(GenerationOutcome::AlreadyGenerated(existing.clone()));
        }
        request.approved.validate_against(letter)?;
        let template = request
            .verification_url
            .unwrap_or(self.config.verification_url.as_str());
        let url = verification_url(template, &letter.id)?;

        log::info!("generating letter {}", letter.id);
        let rendered = render_letter(
            &self.config,
            letter,
            request.approved,
            &url,
            request.generated_at,
        )?;
        log::debug!("letter {} rendered ({} bytes)", letter.id, rendered.len());

        let (bytes, secured) = match &self.protection {
            Some(backend) => (protect_document(rendered, backend.as_ref()).await?, true),
            None => {
                log::warn!("letter {} is not protected", letter.id);
                (rendered, false)
            }
        };

        let hash = sha256_hex(&bytes);
        log::info!("letter {} hashed to {hash}", letter.id);
        Ok(GenerationOutcome::Generated(GeneratedDocument {
            bytes,
            hash,
            secured,
        }))
    }

    /// Generate a letter once and record where it went. A letter that already
    /// carries a stored document is returned as is.
    pub async fn generate_and_store(
        &self,
        letter: &mut LetterRecord,
        approved: &ApprovedRollNumbers,
        store: &dyn DocumentStore,
    ) -> Result<PersistedDocument, GenerationError> {
        let request = GenerationRequest::new(letter, approved);
        let document = match self.generate(&request).await? {
            GenerationOutcome::AlreadyGenerated(existing) => return Ok(existing),
            GenerationOutcome::Generated(document) => document,
        };

        let location = store
            .store(&letter.id, &document.bytes)
            .await
            .map_err(GenerationError::Store)?;
        let persisted = PersistedDocument {
            location,
            hash: document.hash,
            is_secured: document.secured,
        };
        letter.generated = Some(persisted.clone());
        Ok(persisted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProtectionError;
    use crate::letter::tests::sample_letter;
    use crate::letter::ApprovalStatus;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ProtectionBackend for Counting {
        async fn protect(&self, pdf: &[u8], _owner: &str) -> Result<Vec<u8>, ProtectionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(pdf.to_vec())
        }
    }

    #[test]
    fn urls_expand_templates_or_append_the_id() {
        assert_eq!(
            verification_url("https://x.org/verify/{id}?src=qr", "42").unwrap(),
            "https://x.org/verify/42?src=qr"
        );
        assert_eq!(
            verification_url("https://x.org/verify/", "42").unwrap(),
            "https://x.org/verify/42"
        );
        assert!(matches!(
            verification_url("ftp://x.org", "42"),
            Err(InputError::VerificationUrl(_))
        ));
        assert!(verification_url("https:///nohost", "42").is_err());
    }

    #[test]
    fn ids_are_encoded_as_a_single_path_segment() {
        assert_eq!(
            verification_url("https://x.org/verify", "a b/c?d#e").unwrap(),
            "https://x.org/verify/a%20b%2Fc%3Fd%23e"
        );
        assert_eq!(
            verification_url("https://x.org/v/{id}?src=qr", "letter-7_b.~").unwrap(),
            "https://x.org/v/letter-7_b.~?src=qr"
        );
    }

    #[tokio::test]
    async fn protected_output_is_hashed_after_protection() {
        let letter = sample_letter();
        let approved = ApprovedRollNumbers::from_letter(&letter);
        let backend = Arc::new(Counting::default());
        let generator =
            LetterGenerator::new(GeneratorConfig::default()).with_backend(backend.clone());

        let outcome = generator
            .generate(&GenerationRequest::new(&letter, &approved))
            .await
            .unwrap();
        let GenerationOutcome::Generated(document) = outcome else {
            panic!("expected a fresh document");
        };
        assert!(document.secured);
        assert_eq!(document.hash, sha256_hex(&document.bytes));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unapproved_letters_are_rejected_before_rendering() {
        let mut letter = sample_letter();
        letter.status = ApprovalStatus::Rejected;
        let approved = ApprovedRollNumbers::from_letter(&letter);
        let backend = Arc::new(Counting::default());
        let generator =
            LetterGenerator::new(GeneratorConfig::default()).with_backend(backend.clone());

        let err = generator
            .generate(&GenerationRequest::new(&letter, &approved))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Input(InputError::NotApproved { .. })
        ));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn bad_urls_are_input_errors() {
        let letter = sample_letter();
        let approved = ApprovedRollNumbers::from_letter(&letter);
        let generator = LetterGenerator::new(GeneratorConfig::default()).without_protection();
        let request = GenerationRequest::new(&letter, &approved).verification_url("not a url");
        let err = generator.generate(&request).await.unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Input(InputError::VerificationUrl(_))
        ));
    }

    #[tokio::test]
    async fn generated_letters_short_circuit() {
        let mut letter = sample_letter();
        let existing = PersistedDocument {
            location: "stored.pdf".into(),
            hash: "abc".into(),
            is_secured: true,
        };
        letter.generated = Some(existing.clone());
        let approved = ApprovedRollNumbers::from_letter(&letter);
        let backend = Arc::new(Counting::default());
        let generator =
            LetterGenerator::new(GeneratorConfig::default()).with_backend(backend.clone());

        let outcome = generator
            .generate(&GenerationRequest::new(&letter, &approved))
            .await
            .unwrap();
        assert_eq!(outcome, GenerationOutcome::AlreadyGenerated(existing));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unprotected_documents_are_marked_as_such() {
        let letter = sample_letter();
        let approved = ApprovedRollNumbers::from_letter(&letter);
        let generator = LetterGenerator::new(GeneratorConfig::default()).without_protection();
        let outcome = generator
            .generate(&GenerationRequest::new(&letter, &approved))
            .await
            .unwrap();
        match outcome {
            GenerationOutcome::Generated(document) => {
                assert!(!document.secured);
                assert!(document.bytes.starts_with(b"%PDF"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
