// crates/mcp-authz-demo-core/src/core/outcome.rs
// ============================================================================
// Module: Scenario Outcomes
// Description: Scenarios, per-gate verdicts, and precomputed outcome records.
// Purpose: Capture the fixed decision each (role, scenario) pair narrates.
// Dependencies: crate::core::{identifiers, masking}, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! An [`Outcome`] records what each of the three gates decided for one role in
//! one scenario. The pipeline short-circuits on the first denial: a stage-1
//! deny forces stages 2 and 3 to [`ExecutionVerdict::Skip`] and
//! [`MaskingVerdict::Skip`], and a stage-2 deny forces stage 3 to skip.
//! [`Outcome::validate`] enforces those rules along with payload presence.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::identifiers::PolicyId;
use crate::core::identifiers::RoleId;
use crate::core::identifiers::ScenarioId;
use crate::core::identifiers::ToolName;
use crate::core::masking::SensitiveField;

// ============================================================================
// SECTION: Verdicts
// ============================================================================

/// Gate 1 (tool discovery) verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryVerdict {
    /// Tool is visible to the role.
    Permit,
    /// Tool is hidden from the role.
    Deny,
}

/// Gate 2 (execution authorization) verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionVerdict {
    /// Call is authorized.
    Permit,
    /// Call is refused.
    Deny,
    /// Not evaluated because an earlier gate denied.
    Skip,
}

/// Gate 3 (response masking) verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "fields", rename_all = "snake_case")]
pub enum MaskingVerdict {
    /// Listed fields were masked.
    Mask(Vec<SensitiveField>),
    /// Response passed through unchanged.
    Pass,
    /// Not evaluated because an earlier gate denied.
    Skip,
}

impl MaskingVerdict {
    /// Returns the masked fields (empty unless [`MaskingVerdict::Mask`]).
    #[must_use]
    pub fn masked_fields(&self) -> &[SensitiveField] {
        match self {
            Self::Mask(fields) => fields,
            Self::Pass | Self::Skip => &[],
        }
    }
}

/// Final pipeline result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalResult {
    /// Response delivered to the agent.
    Success,
    /// Request blocked.
    Denied,
}

// ============================================================================
// SECTION: Outcome Details
// ============================================================================

/// Explanation attached to a denied outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Denial {
    /// Human-readable reason.
    pub reason: String,
    /// Policy that produced the denial.
    pub policy: PolicyId,
    /// Optional escalation hint.
    pub suggestion: Option<String>,
}

impl Denial {
    /// Creates a denial without a suggestion.
    #[must_use]
    pub fn new(reason: impl Into<String>, policy: &str) -> Self {
        Self {
            reason: reason.into(),
            policy: PolicyId::new(policy),
            suggestion: None,
        }
    }

    /// Attaches an escalation suggestion.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Agent-specific restriction triggered on an otherwise permitted call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCheck {
    /// Whether a human must confirm the action.
    pub requires_confirmation: bool,
    /// Reason shown in narration.
    pub reason: String,
}

/// Single response field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseField {
    /// Field name.
    pub name: String,
    /// Field value as returned by the tool server.
    pub value: Value,
}

impl ResponseField {
    /// Returns the sensitive classification of this field, if any.
    #[must_use]
    pub fn sensitive(&self) -> Option<SensitiveField> {
        SensitiveField::from_field_name(&self.name)
    }
}

/// Ordered tool-server response payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponsePayload {
    /// Fields in server order.
    pub fields: Vec<ResponseField>,
}

impl ResponsePayload {
    /// Builds a payload from `(name, value)` pairs.
    #[must_use]
    pub fn from_pairs(pairs: Vec<(&str, Value)>) -> Self {
        Self {
            fields: pairs
                .into_iter()
                .map(|(name, value)| ResponseField {
                    name: name.to_string(),
                    value,
                })
                .collect(),
        }
    }

    /// Returns a field value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|field| field.name == name).map(|field| &field.value)
    }

    /// Returns the sensitive fields present in the payload.
    #[must_use]
    pub fn sensitive_fields(&self) -> Vec<SensitiveField> {
        self.fields.iter().filter_map(ResponseField::sensitive).collect()
    }
}

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// Precomputed per-(role, scenario) record of gate verdicts and result.
///
/// # Invariants
/// - Stage-1 deny implies stage 2 and stage 3 skip.
/// - Stage-2 deny implies stage 3 skip.
/// - `response` is present exactly when `result` is success.
/// - `denial` is present exactly when `result` is denied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Gate 1 verdict.
    pub stage1: DiscoveryVerdict,
    /// Gate 2 verdict.
    pub stage2: ExecutionVerdict,
    /// Gate 3 verdict.
    pub stage3: MaskingVerdict,
    /// Final result.
    pub result: FinalResult,
    /// Denial details for denied outcomes.
    pub denial: Option<Denial>,
    /// Agent restriction triggered on permitted calls.
    pub agent_check: Option<AgentCheck>,
    /// Raw tool-server response for successful outcomes.
    pub response: Option<ResponsePayload>,
}

impl Outcome {
    /// Successful outcome with the given masking verdict and raw payload.
    #[must_use]
    pub fn success(stage3: MaskingVerdict, response: ResponsePayload) -> Self {
        Self {
            stage1: DiscoveryVerdict::Permit,
            stage2: ExecutionVerdict::Permit,
            stage3,
            result: FinalResult::Success,
            denial: None,
            agent_check: None,
            response: Some(response),
        }
    }

    /// Outcome where gate 1 hides the tool.
    #[must_use]
    pub fn hidden(denial: Denial) -> Self {
        Self {
            stage1: DiscoveryVerdict::Deny,
            stage2: ExecutionVerdict::Skip,
            stage3: MaskingVerdict::Skip,
            result: FinalResult::Denied,
            denial: Some(denial),
            agent_check: None,
            response: None,
        }
    }

    /// Outcome where gate 2 refuses execution.
    #[must_use]
    pub fn blocked(denial: Denial) -> Self {
        Self {
            stage1: DiscoveryVerdict::Permit,
            stage2: ExecutionVerdict::Deny,
            stage3: MaskingVerdict::Skip,
            result: FinalResult::Denied,
            denial: Some(denial),
            agent_check: None,
            response: None,
        }
    }

    /// Attaches an agent restriction check.
    #[must_use]
    pub fn with_agent_check(mut self, requires_confirmation: bool, reason: &str) -> Self {
        self.agent_check = Some(AgentCheck {
            requires_confirmation,
            reason: reason.to_string(),
        });
        self
    }

    /// Returns true when the response reached the agent.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result == FinalResult::Success
    }

    /// Returns the gate (1-3) that denied the request, if any.
    #[must_use]
    pub fn denied_at(&self) -> Option<u8> {
        if self.stage1 == DiscoveryVerdict::Deny {
            Some(1)
        } else if self.stage2 == ExecutionVerdict::Deny {
            Some(2)
        } else {
            None
        }
    }

    /// Checks the short-circuit and payload invariants.
    ///
    /// # Errors
    ///
    /// Returns [`OutcomeError`] describing the first violated invariant.
    pub fn validate(&self) -> Result<(), OutcomeError> {
        if self.stage1 == DiscoveryVerdict::Deny
            && (self.stage2 != ExecutionVerdict::Skip || self.stage3 != MaskingVerdict::Skip)
        {
            return Err(OutcomeError::MissingShortCircuit(1));
        }
        if self.stage2 == ExecutionVerdict::Deny && self.stage3 != MaskingVerdict::Skip {
            return Err(OutcomeError::MissingShortCircuit(2));
        }
        if self.stage1 == DiscoveryVerdict::Permit && self.stage2 == ExecutionVerdict::Skip {
            return Err(OutcomeError::UnexpectedSkip(2));
        }
        if self.stage2 == ExecutionVerdict::Permit && self.stage3 == MaskingVerdict::Skip {
            return Err(OutcomeError::UnexpectedSkip(3));
        }
        let expected = if self.stage2 == ExecutionVerdict::Permit {
            FinalResult::Success
        } else {
            FinalResult::Denied
        };
        if self.result != expected {
            return Err(OutcomeError::ResultMismatch);
        }
        match (self.result, &self.response, &self.denial) {
            (FinalResult::Success, Some(response), None) => {
                for field in self.stage3.masked_fields() {
                    if response.get(field.as_str()).is_none() {
                        return Err(OutcomeError::MaskedFieldAbsent(*field));
                    }
                }
                Ok(())
            }
            (FinalResult::Denied, None, Some(_)) => Ok(()),
            (FinalResult::Success, _, _) => Err(OutcomeError::PayloadMismatch),
            (FinalResult::Denied, _, _) => Err(OutcomeError::DenialMismatch),
        }
    }
}

/// Outcome invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutcomeError {
    /// A denial at the given stage did not skip the later stages.
    #[error("stage {0} denied but later stages were not skipped")]
    MissingShortCircuit(u8),
    /// A stage was skipped although every earlier stage permitted.
    #[error("stage {0} skipped without an earlier denial")]
    UnexpectedSkip(u8),
    /// Final result disagrees with the stage verdicts.
    #[error("final result does not match stage verdicts")]
    ResultMismatch,
    /// Success without payload, or payload alongside a denial.
    #[error("successful outcome must carry a payload and no denial")]
    PayloadMismatch,
    /// Denied outcome without a reason, or with a payload.
    #[error("denied outcome must carry a denial and no payload")]
    DenialMismatch,
    /// A masked field is missing from the payload.
    #[error("masked field {} is absent from the payload", .0.as_str())]
    MaskedFieldAbsent(SensitiveField),
}

// ============================================================================
// SECTION: Scenarios
// ============================================================================

/// Invocation parameters a scenario passes to its tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioParams {
    /// Account identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// Loan identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_id: Option<String>,
    /// Resource branch (lowercase).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Requested amount in whole dollars.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    /// Requested new transaction limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_limit: Option<u64>,
}

/// Outcome keyed by role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleOutcome {
    /// Role the outcome applies to.
    pub role: RoleId,
    /// Outcome record.
    pub outcome: Outcome,
}

/// Scripted demo request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario identifier.
    pub id: ScenarioId,
    /// Short display name.
    pub name: String,
    /// Natural-language query the user types.
    pub query: String,
    /// What the scenario demonstrates.
    pub description: String,
    /// Tool the agent selects.
    pub tool: ToolName,
    /// Tool parameters.
    pub params: ScenarioParams,
    /// Per-role outcomes.
    pub outcomes: Vec<RoleOutcome>,
}

impl Scenario {
    /// Returns the outcome for a role.
    #[must_use]
    pub fn outcome(&self, role: &RoleId) -> Option<&Outcome> {
        self.outcomes.iter().find(|entry| &entry.role == role).map(|entry| &entry.outcome)
    }
}
