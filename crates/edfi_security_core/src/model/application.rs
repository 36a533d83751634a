//! Application and claim set records.
//!
//! # Invariants
//! - A claim set belongs to exactly one application.
//! - `claim_set_name` is non-blank and at most 255 characters.

use super::EntityId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Upper bound on claim set name length, in characters.
pub const CLAIM_SET_NAME_MAX_CHARS: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub application_id: EntityId,
    pub application_name: String,
}

/// Named bundle of resource-claim permissions owned by one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSet {
    pub claim_set_id: EntityId,
    pub claim_set_name: String,
    pub application_id: EntityId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimSetValidationError {
    EmptyName,
    NameTooLong { chars: usize },
}

impl Display for ClaimSetValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "claim set name must not be empty"),
            Self::NameTooLong { chars } => write!(
                f,
                "claim set name has {chars} characters; at most {CLAIM_SET_NAME_MAX_CHARS} allowed"
            ),
        }
    }
}

impl Error for ClaimSetValidationError {}

impl ClaimSet {
    /// Checks the name constraints persisted rows must satisfy.
    pub fn validate(&self) -> Result<(), ClaimSetValidationError> {
        if self.claim_set_name.trim().is_empty() {
            return Err(ClaimSetValidationError::EmptyName);
        }
        let chars = self.claim_set_name.chars().count();
        if chars > CLAIM_SET_NAME_MAX_CHARS {
            return Err(ClaimSetValidationError::NameTooLong { chars });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ClaimSet, ClaimSetValidationError, CLAIM_SET_NAME_MAX_CHARS};

    fn claim_set(name: impl Into<String>) -> ClaimSet {
        ClaimSet {
            claim_set_id: 1,
            claim_set_name: name.into(),
            application_id: 1,
        }
    }

    #[test]
    fn accepts_name_at_limit() {
        let name = "x".repeat(CLAIM_SET_NAME_MAX_CHARS);
        assert!(claim_set(name).validate().is_ok());
    }

    #[test]
    fn rejects_blank_name() {
        assert_eq!(
            claim_set("   ").validate(),
            Err(ClaimSetValidationError::EmptyName)
        );
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        let name = "é".repeat(CLAIM_SET_NAME_MAX_CHARS);
        assert!(claim_set(name).validate().is_ok());

        let err = claim_set("é".repeat(CLAIM_SET_NAME_MAX_CHARS + 1))
            .validate()
            .unwrap_err();
        assert_eq!(err, ClaimSetValidationError::NameTooLong { chars: 256 });
    }
}
