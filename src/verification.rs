//! The public, read-only view of a stored letter.

use crate::integrity::matches_hash;
use crate::letter::{group_label, ApprovalStatus, ApprovedRollNumbers, LetterRecord};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalEntry {
    pub role: String,
    pub status: ApprovalStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermittedGroup {
    pub group: String,
    pub roll_numbers: Vec<String>,
}

/// What the verification page shows for one letter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub letter_id: String,
    pub club_name: String,
    pub subject: String,
    pub status: ApprovalStatus,
    /// Approved, with a stored document and its hash
    pub verified: bool,
    pub approvals: Vec<ApprovalEntry>,
    pub permitted: Vec<PermittedGroup>,
    pub document_hash: Option<String>,
    pub document_location: Option<String>,
}

impl VerificationReport {
    pub fn from_letter(letter: &LetterRecord) -> VerificationReport {
        let approvals = letter
            .approvals_in_order()
            .into_iter()
            .map(|(role, status)| ApprovalEntry {
                role: role.label().to_string(),
                status,
            })
            .collect();
        let approved = ApprovedRollNumbers::from_letter(letter);
        let permitted = approved
            .groups_in_order()
            .into_iter()
            .map(|(group, rolls)| PermittedGroup {
                group: group_label(group),
                roll_numbers: rolls.to_vec(),
            })
            .collect();

        let generated = letter.generated.as_ref();
        let document_hash = generated
            .map(|g| g.hash.clone())
            .filter(|h| !h.is_empty());
        let document_location = generated
            .map(|g| g.location.clone())
            .filter(|l| !l.is_empty());

        VerificationReport {
            letter_id: letter.id.clone(),
            club_name: letter.club_name.clone(),
            subject: letter.subject.clone(),
            status: letter.status,
            verified: letter.status.is_approved()
                && document_hash.is_some()
                && document_location.is_some(),
            approvals,
            permitted,
            document_hash,
            document_location,
        }
    }

    /// Whether `bytes` are the stored document; `None` if nothing was stored
    pub fn check_document(&self, bytes: &[u8]) -> Option<bool> {
        self.document_hash
            .as_deref()
            .map(|hash| matches_hash(bytes, hash))
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Letter {} ({})", self.letter_id, self.club_name)?;
        writeln!(f, "Subject: {}", self.subject)?;
        writeln!(f, "Status: {}", self.status)?;
        writeln!(
            f,
            "Verified: {}",
            if self.verified { "yes" } else { "no" }
        )?;
        for approval in &self.approvals {
            writeln!(f, "  {}: {}", approval.role, approval.status)?;
        }
        for group in &self.permitted {
            writeln!(f, "  {}: {}", group.group, group.roll_numbers.join(", "))?;
        }
        if let Some(hash) = &self.document_hash {
            writeln!(f, "SHA-256: {hash}")?;
        }
        Ok(())
    }
}
