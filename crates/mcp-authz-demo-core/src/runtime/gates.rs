// crates/mcp-authz-demo-core/src/runtime/gates.rs
// ============================================================================
// Module: Gate Narration Helpers
// Description: Cosmetic recomputation of the three gate decisions.
// Purpose: Derive counts, scopes, and masked values shown in narration.
// Dependencies: crate::core, serde, serde_json
// ============================================================================

//! ## Overview
//! These functions recompute what each gate would report for a role so the
//! compiler can narrate tool counts, permission scopes, and masked values.
//! They never override the outcome table; tests check the two agree.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde_json::Value;

use crate::core::catalog::Catalog;
use crate::core::catalog::Clearance;
use crate::core::catalog::POLICY_ADMIN_TOOLS;
use crate::core::catalog::POLICY_BRANCH_BOUNDARY;
use crate::core::catalog::POLICY_LOAN_LIMITS;
use crate::core::catalog::POLICY_PII_MASKING;
use crate::core::catalog::POLICY_ROLE_TOOL_ACCESS;
use crate::core::catalog::PermissionScope;
use crate::core::catalog::Role;
use crate::core::identifiers::PolicyId;
use crate::core::identifiers::ToolName;
use crate::core::masking::SensitiveField;
use crate::core::outcome::AgentCheck;
use crate::core::outcome::Denial;
use crate::core::outcome::DiscoveryVerdict;
use crate::core::outcome::ExecutionVerdict;
use crate::core::outcome::MaskingVerdict;
use crate::core::outcome::ResponseField;
use crate::core::outcome::ResponsePayload;
use crate::core::outcome::Scenario;

/// Tool reserved for system administrators.
const ADMIN_TOOL: &str = "override_transaction_limit";
/// Tool subject to loan approval limits.
const LOAN_TOOL: &str = "approve_loan";
/// Tool subject to transfer limits.
const TRANSFER_TOOL: &str = "transfer_funds";

// ============================================================================
// SECTION: Gate 1
// ============================================================================

/// Tool removed from the agent's tool list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedTool {
    /// Removed tool.
    pub tool: ToolName,
    /// Why it was removed.
    pub reason: String,
    /// Policy that removed it.
    pub policy: PolicyId,
}

/// Filtered `tools/list` result for one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryReport {
    /// Tools exposed by every server.
    pub original_count: usize,
    /// Tools the agent may see.
    pub visible: Vec<ToolName>,
    /// Tools filtered out.
    pub removed: Vec<RemovedTool>,
}

impl DiscoveryReport {
    /// Returns the number of visible tools.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    /// Returns the verdict for one tool.
    #[must_use]
    pub fn verdict_for(&self, tool: &ToolName) -> DiscoveryVerdict {
        if self.visible.contains(tool) { DiscoveryVerdict::Permit } else { DiscoveryVerdict::Deny }
    }

    /// Returns the removal record for one tool.
    #[must_use]
    pub fn removal(&self, tool: &ToolName) -> Option<&RemovedTool> {
        self.removed.iter().find(|removed| &removed.tool == tool)
    }
}

/// Filters the full tool list down to what `role` may discover.
#[must_use]
pub fn evaluate_tool_discovery(catalog: &Catalog, role: &Role) -> DiscoveryReport {
    let tools = catalog.tools();
    let mut visible = Vec::new();
    let mut removed = Vec::new();
    for entry in &tools {
        let name = &entry.tool.name;
        if name.as_str() == ADMIN_TOOL && role.clearance != Clearance::SystemAdmin {
            removed.push(RemovedTool {
                tool: name.clone(),
                reason: format!("Tool \"{name}\" requires system administrator privileges"),
                policy: PolicyId::new(POLICY_ADMIN_TOOLS),
            });
        } else if role.permission(name).allowed {
            visible.push(name.clone());
        } else {
            removed.push(RemovedTool {
                tool: name.clone(),
                reason: format!("Not authorized for role \"{}\"", role.name),
                policy: PolicyId::new(POLICY_ROLE_TOOL_ACCESS),
            });
        }
    }
    DiscoveryReport {
        original_count: tools.len(),
        visible,
        removed,
    }
}

// ============================================================================
// SECTION: Gate 2
// ============================================================================

/// Gate 2 result for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionDecision {
    /// Call authorized.
    Permit {
        /// Scope the permission grants.
        scope: Option<PermissionScope>,
        /// Agent restriction triggered by the call.
        agent_check: Option<AgentCheck>,
    },
    /// Call refused.
    Deny(Denial),
}

impl ExecutionDecision {
    /// Returns the gate verdict.
    #[must_use]
    pub const fn verdict(&self) -> ExecutionVerdict {
        match self {
            Self::Permit {
                ..
            } => ExecutionVerdict::Permit,
            Self::Deny(_) => ExecutionVerdict::Deny,
        }
    }
}

/// Authorizes the scenario's tool call for `role`.
#[must_use]
pub fn evaluate_execution(catalog: &Catalog, role: &Role, scenario: &Scenario) -> ExecutionDecision {
    let tool = &scenario.tool;
    let permission = role.permission(tool);
    let params = &scenario.params;

    if !permission.allowed {
        return ExecutionDecision::Deny(Denial::new(
            format!("Tool \"{tool}\" is not authorized for role \"{}\"", role.id),
            POLICY_ROLE_TOOL_ACCESS,
        ));
    }

    if permission.scope == Some(PermissionScope::OwnBranch)
        && let Some(branch) = params.branch.as_deref()
        && branch != role.branch.to_lowercase()
    {
        return ExecutionDecision::Deny(Denial::new(
            format!(
                "User branch \"{}\" does not match requested branch \"{}\"",
                role.branch,
                capitalize(branch)
            ),
            POLICY_BRANCH_BOUNDARY,
        ));
    }

    if let Some(amount) = params.amount {
        let limit = permission.amount_limit().unwrap_or(0);
        if tool.as_str() == LOAN_TOOL && amount > limit {
            let suggestion = if role.id.as_str() == "loan_officer" {
                "Escalate to Branch Manager for approval"
            } else {
                "Escalate to Regional Director"
            };
            return ExecutionDecision::Deny(
                Denial::new(
                    format!(
                        "Loan amount {} exceeds approval limit of {} for role \"{}\"",
                        format_dollars(amount),
                        format_dollars(limit),
                        role.id
                    ),
                    POLICY_LOAN_LIMITS,
                )
                .with_suggestion(suggestion),
            );
        }
        if tool.as_str() == TRANSFER_TOOL && amount > limit {
            return ExecutionDecision::Deny(Denial::new(
                format!(
                    "Transfer amount {} exceeds limit of {} for role \"{}\"",
                    format_dollars(amount),
                    format_dollars(limit),
                    role.id
                ),
                POLICY_BRANCH_BOUNDARY,
            ));
        }
    }

    ExecutionDecision::Permit {
        scope: permission.scope,
        agent_check: agent_check(catalog, scenario),
    }
}

/// Applies the agent's own restrictions to a permitted call.
fn agent_check(catalog: &Catalog, scenario: &Scenario) -> Option<AgentCheck> {
    let restrictions = &catalog.agent.restrictions;
    match scenario.tool.as_str() {
        LOAN_TOOL => {
            let amount = scenario.params.amount?;
            if amount > restrictions.max_loan_approval {
                Some(AgentCheck {
                    requires_confirmation: true,
                    reason: format!(
                        "Amount exceeds agent auto-approval limit of {}",
                        format_dollars(restrictions.max_loan_approval)
                    ),
                })
            } else if amount > restrictions.requires_confirmation_above {
                Some(AgentCheck {
                    requires_confirmation: true,
                    reason: format!(
                        "Loans above {} require human confirmation",
                        format_dollars(restrictions.requires_confirmation_above)
                    ),
                })
            } else {
                None
            }
        }
        TRANSFER_TOOL if restrictions.requires_confirmation_for_transfers => Some(AgentCheck {
            requires_confirmation: true,
            reason: "All fund transfers require human confirmation".to_string(),
        }),
        _ => None,
    }
}

// ============================================================================
// SECTION: Gate 3
// ============================================================================

/// One masked response field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaskedField {
    /// Masked field.
    pub field: SensitiveField,
    /// Value shown to the agent.
    pub masked_value: Value,
    /// Narration reason.
    pub reason: &'static str,
    /// Policy that masked it.
    pub policy: PolicyId,
}

/// Masked response for one role.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaskingReport {
    /// Payload with every masked field replaced.
    pub masked: ResponsePayload,
    /// Fields that were masked, in payload order.
    pub fields: Vec<MaskedField>,
}

impl MaskingReport {
    /// Returns the gate verdict.
    #[must_use]
    pub fn verdict(&self) -> MaskingVerdict {
        if self.fields.is_empty() {
            MaskingVerdict::Pass
        } else {
            MaskingVerdict::Mask(self.fields.iter().map(|entry| entry.field).collect())
        }
    }
}

/// Masks the sensitive fields `role` may not see.
#[must_use]
pub fn evaluate_response_masking(role: &Role, payload: &ResponsePayload) -> MaskingReport {
    let mut fields = Vec::new();
    let masked = payload
        .fields
        .iter()
        .map(|entry| match entry.sensitive() {
            Some(field) if field.is_masked_for(&role.id) => {
                let masked_value = field.mask(&entry.value);
                fields.push(MaskedField {
                    field,
                    masked_value: masked_value.clone(),
                    reason: field.reason(),
                    policy: PolicyId::new(POLICY_PII_MASKING),
                });
                ResponseField {
                    name: entry.name.clone(),
                    value: masked_value,
                }
            }
            _ => entry.clone(),
        })
        .collect();
    MaskingReport {
        masked: ResponsePayload {
            fields: masked,
        },
        fields,
    }
}

// ============================================================================
// SECTION: Formatting
// ============================================================================

/// Formats whole dollars with thousands separators, e.g. `$75,000`.
#[must_use]
pub fn format_dollars(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push('$');
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Uppercases the first character of a branch label.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| first.to_uppercase().chain(chars).collect())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::format_dollars;

    #[test]
    fn dollars_group_thousands() {
        assert_eq!(format_dollars(0), "$0");
        assert_eq!(format_dollars(999), "$999");
        assert_eq!(format_dollars(25_000), "$25,000");
        assert_eq!(format_dollars(1_500_000), "$1,500,000");
    }
}
