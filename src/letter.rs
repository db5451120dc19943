//! The letter record handed over by the approval workflow, and the approved
//! roll numbers derived from it.

use crate::error::InputError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A reviewer whose decision is shown on the letter.
///
/// The declaration order is the order roles are printed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReviewerRole {
    Director,
    Dsaa,
    Tpo,
    CseHod,
    CsmHod,
    CsdHod,
    CscHod,
    FrshHod,
    EceHod,
}

impl ReviewerRole {
    pub const ALL: [ReviewerRole; 9] = [
        ReviewerRole::Director,
        ReviewerRole::Dsaa,
        ReviewerRole::Tpo,
        ReviewerRole::CseHod,
        ReviewerRole::CsmHod,
        ReviewerRole::CsdHod,
        ReviewerRole::CscHod,
        ReviewerRole::FrshHod,
        ReviewerRole::EceHod,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ReviewerRole::Director => "Director",
            ReviewerRole::Dsaa => "DSAA",
            ReviewerRole::Tpo => "TPO",
            ReviewerRole::CseHod => "CSE HOD",
            ReviewerRole::CsmHod => "CSM HOD",
            ReviewerRole::CsdHod => "CSD HOD",
            ReviewerRole::CscHod => "CSC HOD",
            ReviewerRole::FrshHod => "Freshman HOD",
            ReviewerRole::EceHod => "ECE HOD",
        }
    }
}

impl fmt::Display for ReviewerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn is_approved(&self) -> bool {
        *self == ApprovalStatus::Approved
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        })
    }
}

/// Where a finished letter was stored and what it hashed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedDocument {
    pub location: String,
    /// Hex SHA-256 of the stored bytes
    pub hash: String,
    /// Whether the protection stage ran on the stored bytes
    pub is_secured: bool,
}

/// A permission letter as stored by the portal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterRecord {
    pub id: String,
    pub club_name: String,
    pub subject: String,
    /// The name signed under "Yours Sincerely"
    pub sincerely: String,
    /// Rich-text body markup
    pub body: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub status: ApprovalStatus,
    #[serde(default)]
    pub approvals: HashMap<ReviewerRole, ApprovalStatus>,
    /// Group key (`cse`, `frsh`, ...) to the submitted roll numbers, one per line
    #[serde(default)]
    pub roll_numbers_by_group: BTreeMap<String, String>,
    /// Group key to roll number to the reviewer's decision on that student
    #[serde(default)]
    pub roll_number_decisions: HashMap<String, HashMap<String, ApprovalStatus>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated: Option<PersistedDocument>,
}

impl LetterRecord {
    /// The roll numbers submitted for a group, in submission order
    pub fn submitted_roll_numbers(&self, group: &str) -> Vec<&str> {
        self.roll_numbers_by_group
            .get(group)
            .map(|text| split_roll_numbers(text))
            .unwrap_or_default()
    }

    /// Reviewer decisions in canonical role order, skipping roles that were never asked
    pub fn approvals_in_order(&self) -> Vec<(ReviewerRole, ApprovalStatus)> {
        ReviewerRole::ALL
            .iter()
            .filter_map(|role| self.approvals.get(role).map(|status| (*role, *status)))
            .collect()
    }

    /// Reject records that cannot be rendered
    pub fn validate(&self) -> Result<(), InputError> {
        if self.status != ApprovalStatus::Approved {
            return Err(InputError::NotApproved {
                id: self.id.clone(),
                status: self.status.to_string(),
            });
        }
        let required: [(&'static str, &str); 4] = [
            ("id", &self.id),
            ("clubName", &self.club_name),
            ("subject", &self.subject),
            ("sincerely", &self.sincerely),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(InputError::MissingField(name));
            }
        }
        Ok(())
    }
}

fn split_roll_numbers(text: &str) -> Vec<&str> {
    text.split(['\n', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

const CANONICAL_GROUPS: [&str; 6] = ["cse", "csm", "csd", "csc", "frsh", "ece"];

/// Display name of a group key
pub fn group_label(group: &str) -> String {
    match group {
        "frsh" => "Freshman".to_string(),
        other => other.to_uppercase(),
    }
}

/// Roll numbers cleared to take part, per group
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApprovedRollNumbers(pub BTreeMap<String, Vec<String>>);

impl ApprovedRollNumbers {
    pub fn new(groups: BTreeMap<String, Vec<String>>) -> Self {
        ApprovedRollNumbers(groups)
    }

    /// Derive the approved subset from the per-student decisions on a letter,
    /// keeping the order the roll numbers were submitted in
    pub fn from_letter(letter: &LetterRecord) -> Self {
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for group in letter.roll_numbers_by_group.keys() {
            let Some(decisions) = letter.roll_number_decisions.get(group) else {
                continue;
            };
            let approved: Vec<String> = letter
                .submitted_roll_numbers(group)
                .into_iter()
                .filter(|roll| decisions.get(*roll).is_some_and(ApprovalStatus::is_approved))
                .map(str::to_string)
                .collect();
            if !approved.is_empty() {
                groups.insert(group.clone(), approved);
            }
        }
        ApprovedRollNumbers(groups)
    }

    /// Check that every approved roll number was actually submitted on `letter`
    pub fn validate_against(&self, letter: &LetterRecord) -> Result<(), InputError> {
        for (group, rolls) in &self.0 {
            let submitted = letter.submitted_roll_numbers(group);
            if let Some(unknown) = rolls.iter().find(|r| !submitted.contains(&r.as_str())) {
                return Err(InputError::UnknownRollNumber {
                    group: group.clone(),
                    roll_number: unknown.clone(),
                });
            }
        }
        Ok(())
    }

    /// Non-empty groups, canonical departments first and any others alphabetically
    pub fn groups_in_order(&self) -> Vec<(&str, &[String])> {
        let known = CANONICAL_GROUPS.iter().filter_map(|g| self.0.get_key_value(*g));
        let others = self
            .0
            .iter()
            .filter(|(g, _)| !CANONICAL_GROUPS.contains(&g.as_str()));
        known
            .chain(others)
            .filter(|(_, rolls)| !rolls.is_empty())
            .map(|(g, rolls)| (g.as_str(), rolls.as_slice()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    pub fn contains(&self, roll_number: &str) -> bool {
        self.0.values().flatten().any(|r| r == roll_number)
    }
}
