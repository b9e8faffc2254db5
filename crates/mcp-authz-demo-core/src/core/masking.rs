// crates/mcp-authz-demo-core/src/core/masking.rs
// ============================================================================
// Module: Response Field Masking
// Description: The fixed sensitive-field set and its deterministic masks.
// Purpose: Single place that decides which response fields a role may see.
// Dependencies: crate::core::identifiers, serde, serde_json
// ============================================================================

//! ## Overview
//! Only four response fields are ever masked: `ssn`, `account_number`,
//! `credit_score`, and `salary`. Masking depends on the field and the role and
//! nothing else, so the same (role, payload) always yields the same output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::RoleId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Replacement text for fully redacted values.
pub const REDACTED: &str = "[REDACTED]";

/// Role permitted to see unmasked credit scores.
const CREDIT_SCORE_ROLE: &str = "branch_manager";

// ============================================================================
// SECTION: Sensitive Fields
// ============================================================================

/// Response field drawn from the fixed sensitive set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitiveField {
    /// Social security number.
    Ssn,
    /// Bank account number.
    AccountNumber,
    /// Credit score.
    CreditScore,
    /// Salary.
    Salary,
}

impl SensitiveField {
    /// Every sensitive field in masking order.
    pub const ALL: [Self; 4] = [Self::Ssn, Self::AccountNumber, Self::CreditScore, Self::Salary];

    /// Returns the payload field name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ssn => "ssn",
            Self::AccountNumber => "account_number",
            Self::CreditScore => "credit_score",
            Self::Salary => "salary",
        }
    }

    /// Parses a payload field name.
    #[must_use]
    pub fn from_field_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == name)
    }

    /// Returns the narration reason for masking this field.
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::Ssn => "SSN masked per agent restriction and PII policy",
            Self::AccountNumber => "Account number partially masked for agent access",
            Self::CreditScore => "Credit score not visible to non-manager roles",
            Self::Salary => "Salary data restricted by agent policy",
        }
    }

    /// Returns true when `role` must not see this field unmasked.
    #[must_use]
    pub fn is_masked_for(self, role: &RoleId) -> bool {
        match self {
            Self::CreditScore => role.as_str() != CREDIT_SCORE_ROLE,
            Self::Ssn | Self::AccountNumber | Self::Salary => true,
        }
    }

    /// Applies this field's mask to a raw value.
    #[must_use]
    pub fn mask(self, raw: &Value) -> Value {
        match self {
            Self::Ssn => Value::String(format!("XXX-XX-{}", last_four(raw))),
            Self::AccountNumber => Value::String(format!("****{}", last_four(raw))),
            Self::CreditScore | Self::Salary => Value::String(REDACTED.to_string()),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the last four characters of a value, or `****` when too short.
fn last_four(raw: &Value) -> String {
    let text = match raw {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        _ => String::new(),
    };
    let chars: Vec<char> = text.chars().collect();
    if chars.len() < 4 {
        return "****".to_string();
    }
    chars[chars.len() - 4..].iter().collect()
}
