// crates/mcp-authz-demo-core/src/core/table.rs
// ============================================================================
// Module: Scenario Outcome Table
// Description: Static (role, scenario) -> Outcome lookup over the catalog.
// Purpose: Provide the total outcome table every script is compiled from.
// Dependencies: crate::core::{catalog, identifiers, masking, outcome}, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The table pairs the [`Catalog`] with the scripted scenarios. Lookups are pure
//! and return `None` for unknown identifiers so callers can render an empty
//! state. Coverage gaps in a declared table are configuration errors reported
//! by [`ScenarioTable::validate`], never runtime faults.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::json;
use thiserror::Error;

use crate::core::catalog::Catalog;
use crate::core::catalog::POLICY_ADMIN_TOOLS;
use crate::core::catalog::POLICY_BRANCH_BOUNDARY;
use crate::core::catalog::POLICY_LOAN_LIMITS;
use crate::core::catalog::POLICY_ROLE_TOOL_ACCESS;
use crate::core::catalog::Role;
use crate::core::identifiers::RoleId;
use crate::core::identifiers::ScenarioId;
use crate::core::identifiers::ToolName;
use crate::core::masking::SensitiveField;
use crate::core::outcome::Denial;
use crate::core::outcome::MaskingVerdict;
use crate::core::outcome::Outcome;
use crate::core::outcome::OutcomeError;
use crate::core::outcome::ResponsePayload;
use crate::core::outcome::RoleOutcome;
use crate::core::outcome::Scenario;
use crate::core::outcome::ScenarioParams;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors found while validating a table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// The cross-product has a hole.
    #[error("scenario {scenario} has no outcome for role {role}")]
    MissingOutcome {
        /// Role without an outcome.
        role: RoleId,
        /// Scenario missing the entry.
        scenario: ScenarioId,
    },
    /// An outcome references a role the catalog does not declare.
    #[error("scenario {scenario} declares an outcome for unknown role {role}")]
    UnknownRole {
        /// Undeclared role.
        role: RoleId,
        /// Scenario declaring it.
        scenario: ScenarioId,
    },
    /// A scenario targets a tool no server exposes.
    #[error("scenario {scenario} targets unknown tool {tool}")]
    UnknownTool {
        /// Undeclared tool.
        tool: ToolName,
        /// Scenario targeting it.
        scenario: ScenarioId,
    },
    /// Two scenarios share an identifier.
    #[error("duplicate scenario id {0}")]
    DuplicateScenario(ScenarioId),
    /// An outcome violates its own invariants.
    #[error("outcome for {role} in {scenario} is invalid: {source}")]
    InvalidOutcome {
        /// Role of the outcome.
        role: RoleId,
        /// Scenario of the outcome.
        scenario: ScenarioId,
        /// Violated invariant.
        source: OutcomeError,
    },
    /// Declared masked fields disagree with the masking rules for the role.
    #[error("outcome for {role} in {scenario} masks {declared:?} but the rules mask {expected:?}")]
    MaskingMismatch {
        /// Role of the outcome.
        role: RoleId,
        /// Scenario of the outcome.
        scenario: ScenarioId,
        /// Fields listed in the outcome.
        declared: Vec<SensitiveField>,
        /// Fields the masking rules select.
        expected: Vec<SensitiveField>,
    },
}

// ============================================================================
// SECTION: Table
// ============================================================================

/// Static outcome table over the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioTable {
    /// Catalog of roles, tools, and policies.
    pub catalog: Catalog,
    /// Scenarios in display order.
    pub scenarios: Vec<Scenario>,
}

impl ScenarioTable {
    /// Creates a table from parts without validating it.
    #[must_use]
    pub const fn new(catalog: Catalog, scenarios: Vec<Scenario>) -> Self {
        Self {
            catalog,
            scenarios,
        }
    }

    /// Returns the built-in bank demo table.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(Catalog::builtin(), builtin_scenarios())
    }

    /// Returns a role by id.
    #[must_use]
    pub fn role(&self, id: &RoleId) -> Option<&Role> {
        self.catalog.role(id)
    }

    /// Returns a scenario by id.
    #[must_use]
    pub fn scenario(&self, id: &ScenarioId) -> Option<&Scenario> {
        self.scenarios.iter().find(|scenario| &scenario.id == id)
    }

    /// Looks up the outcome for a (role, scenario) pair.
    #[must_use]
    pub fn outcome(&self, role: &RoleId, scenario: &ScenarioId) -> Option<&Outcome> {
        self.role(role)?;
        self.scenario(scenario)?.outcome(role)
    }

    /// Verifies the table is total over roles x scenarios and internally consistent.
    ///
    /// # Errors
    ///
    /// Returns the first [`TableError`] found.
    pub fn validate(&self) -> Result<(), TableError> {
        for (index, scenario) in self.scenarios.iter().enumerate() {
            if self.scenarios[..index].iter().any(|earlier| earlier.id == scenario.id) {
                return Err(TableError::DuplicateScenario(scenario.id.clone()));
            }
            if self.catalog.tool(&scenario.tool).is_none() {
                return Err(TableError::UnknownTool {
                    tool: scenario.tool.clone(),
                    scenario: scenario.id.clone(),
                });
            }
            for entry in &scenario.outcomes {
                if self.catalog.role(&entry.role).is_none() {
                    return Err(TableError::UnknownRole {
                        role: entry.role.clone(),
                        scenario: scenario.id.clone(),
                    });
                }
            }
            for role in &self.catalog.roles {
                let outcome = scenario.outcome(&role.id).ok_or_else(|| TableError::MissingOutcome {
                    role: role.id.clone(),
                    scenario: scenario.id.clone(),
                })?;
                outcome.validate().map_err(|source| TableError::InvalidOutcome {
                    role: role.id.clone(),
                    scenario: scenario.id.clone(),
                    source,
                })?;
                if let Some(response) = &outcome.response {
                    let expected: Vec<SensitiveField> = response
                        .sensitive_fields()
                        .into_iter()
                        .filter(|field| field.is_masked_for(&role.id))
                        .collect();
                    let declared = outcome.stage3.masked_fields().to_vec();
                    if declared != expected {
                        return Err(TableError::MaskingMismatch {
                            role: role.id.clone(),
                            scenario: scenario.id.clone(),
                            declared,
                            expected,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Built-in Scenarios
// ============================================================================

/// Pairs a role id with its outcome.
fn for_role(role: &str, outcome: Outcome) -> RoleOutcome {
    RoleOutcome {
        role: RoleId::new(role),
        outcome,
    }
}

/// Raw account record returned by `get_account_details`.
fn account_payload(
    account_id: &str,
    customer: &str,
    kind: &str,
    ssn: &str,
    branch: &str,
    opened: Option<&str>,
) -> ResponsePayload {
    let mut pairs = vec![
        ("account_id", json!(account_id)),
        ("customer_name", json!(customer)),
        ("account_type", json!(kind)),
        ("ssn", json!(ssn)),
        ("branch", json!(branch)),
        ("status", json!("Active")),
    ];
    if let Some(opened) = opened {
        pairs.push(("opened_date", json!(opened)));
    }
    ResponsePayload::from_pairs(pairs)
}

/// Raw loan record returned by `get_loan_details`.
///
/// Underwriting ratios are only released to the manager tier; other roles
/// receive the record without `debt_to_income`.
fn loan_payload(underwriting: bool) -> ResponsePayload {
    let mut pairs = vec![
        ("loan_id", json!("L-789")),
        ("customer_id", json!("12345")),
        ("customer_name", json!("John Smith")),
        ("loan_type", json!("Personal")),
        ("amount", json!(35_000)),
        ("status", json!("Pending Review")),
        ("interest_rate", json!("7.5%")),
        ("term_months", json!(60)),
        ("credit_score", json!(720)),
    ];
    if underwriting {
        pairs.push(("debt_to_income", json!(0.32)));
    }
    ResponsePayload::from_pairs(pairs)
}

/// Raw approval record returned by `approve_loan`.
fn approval_payload(loan_id: &str, amount: u64, approver: &str) -> ResponsePayload {
    ResponsePayload::from_pairs(vec![
        ("loan_id", json!(loan_id)),
        ("status", json!("Approved (Pending Confirmation)")),
        ("approved_amount", json!(amount)),
        ("approved_by", json!(approver)),
        ("confirmation_required", json!(true)),
    ])
}

/// Gate 1 denial for a tool outside the role's permission matrix.
fn tool_unavailable(tool: &str, role: &str) -> Denial {
    Denial::new(
        format!("Tool \"{tool}\" not available for role \"{role}\""),
        POLICY_ROLE_TOOL_ACCESS,
    )
}

/// Reason used when the agent must hand a loan approval to a human.
const AGENT_LOAN_REASON: &str = "Amount exceeds agent auto-approval limit of $25,000";

/// Built-in scenarios.
#[allow(clippy::too_many_lines, reason = "Static table data is clearer kept in one place.")]
fn builtin_scenarios() -> Vec<Scenario> {
    let ssn_mask = || MaskingVerdict::Mask(vec![SensitiveField::Ssn]);
    let branch_mismatch = || {
        Denial::new(
            "User branch \"Central\" does not match requested branch \"Downtown\"",
            POLICY_BRANCH_BOUNDARY,
        )
    };
    let lookup = || {
        account_payload(
            "12345",
            "John Smith",
            "Checking",
            "123-45-6789",
            "Central",
            Some("2019-03-15"),
        )
    };
    let downtown =
        || account_payload("67890", "Jane Doe", "Savings", "987-65-4321", "Downtown", None);
    let admin_hidden = || {
        Denial::new(
            "Tool \"override_transaction_limit\" is not exposed to any non-admin role",
            POLICY_ADMIN_TOOLS,
        )
    };

    vec![
        Scenario {
            id: ScenarioId::new("account_lookup"),
            name: "Look up customer account".to_string(),
            query: "Show me the account details for customer #12345".to_string(),
            description: "Basic account inquiry; shows data masking".to_string(),
            tool: ToolName::new("get_account_details"),
            params: ScenarioParams {
                account_id: Some("12345".to_string()),
                branch: Some("central".to_string()),
                ..ScenarioParams::default()
            },
            outcomes: vec![
                for_role("teller", Outcome::success(ssn_mask(), lookup())),
                for_role("loan_officer", Outcome::success(ssn_mask(), lookup())),
                for_role("branch_manager", Outcome::success(ssn_mask(), lookup())),
            ],
        },
        Scenario {
            id: ScenarioId::new("cross_branch"),
            name: "Access another branch's data".to_string(),
            query: "Show me accounts from the Downtown branch".to_string(),
            description: "Shows branch boundary enforcement".to_string(),
            tool: ToolName::new("get_account_details"),
            params: ScenarioParams {
                account_id: Some("67890".to_string()),
                branch: Some("downtown".to_string()),
                ..ScenarioParams::default()
            },
            outcomes: vec![
                for_role("teller", Outcome::blocked(branch_mismatch())),
                for_role("loan_officer", Outcome::blocked(branch_mismatch())),
                for_role("branch_manager", Outcome::success(ssn_mask(), downtown())),
            ],
        },
        Scenario {
            id: ScenarioId::new("loan_status"),
            name: "Check a loan application".to_string(),
            query: "What is the status of loan application #L-789?".to_string(),
            description: "Shows tool filtering and role-dependent masking".to_string(),
            tool: ToolName::new("get_loan_details"),
            params: ScenarioParams {
                loan_id: Some("L-789".to_string()),
                ..ScenarioParams::default()
            },
            outcomes: vec![
                for_role("teller", Outcome::hidden(tool_unavailable("get_loan_details", "teller"))),
                for_role(
                    "loan_officer",
                    Outcome::success(
                        MaskingVerdict::Mask(vec![SensitiveField::CreditScore]),
                        loan_payload(false),
                    ),
                ),
                for_role(
                    "branch_manager",
                    Outcome::success(MaskingVerdict::Pass, loan_payload(true)),
                ),
            ],
        },
        Scenario {
            id: ScenarioId::new("approve_loan_within_limit"),
            name: "Approve a $40,000 loan".to_string(),
            query: "Approve the $40,000 loan for customer #12345".to_string(),
            description: "Shows parameter-level authorization and agent confirmation".to_string(),
            tool: ToolName::new("approve_loan"),
            params: ScenarioParams {
                loan_id: Some("L-789".to_string()),
                amount: Some(40_000),
                ..ScenarioParams::default()
            },
            outcomes: vec![
                for_role("teller", Outcome::hidden(tool_unavailable("approve_loan", "teller"))),
                for_role(
                    "loan_officer",
                    Outcome::success(MaskingVerdict::Pass, approval_payload("L-789", 40_000, "E-5678"))
                        .with_agent_check(true, AGENT_LOAN_REASON),
                ),
                for_role(
                    "branch_manager",
                    Outcome::success(MaskingVerdict::Pass, approval_payload("L-789", 40_000, "E-9012"))
                        .with_agent_check(true, AGENT_LOAN_REASON),
                ),
            ],
        },
        Scenario {
            id: ScenarioId::new("approve_loan"),
            name: "Approve a $75,000 loan".to_string(),
            query: "Approve the $75,000 loan for customer #12345".to_string(),
            description: "Shows role-based approval limits".to_string(),
            tool: ToolName::new("approve_loan"),
            params: ScenarioParams {
                loan_id: Some("L-456".to_string()),
                amount: Some(75_000),
                ..ScenarioParams::default()
            },
            outcomes: vec![
                for_role("teller", Outcome::hidden(tool_unavailable("approve_loan", "teller"))),
                for_role(
                    "loan_officer",
                    Outcome::blocked(
                        Denial::new(
                            "Loan amount $75,000 exceeds approval limit of $50,000 for role \
                             \"loan_officer\"",
                            POLICY_LOAN_LIMITS,
                        )
                        .with_suggestion("Escalate to Branch Manager for approval"),
                    ),
                ),
                for_role(
                    "branch_manager",
                    Outcome::success(MaskingVerdict::Pass, approval_payload("L-456", 75_000, "E-9012"))
                        .with_agent_check(true, AGENT_LOAN_REASON),
                ),
            ],
        },
        Scenario {
            id: ScenarioId::new("admin_override"),
            name: "Override transaction limits".to_string(),
            query: "Override the transaction limit for account #12345 to $50,000".to_string(),
            description: "Shows admin tool hiding".to_string(),
            tool: ToolName::new("override_transaction_limit"),
            params: ScenarioParams {
                account_id: Some("12345".to_string()),
                new_limit: Some(50_000),
                ..ScenarioParams::default()
            },
            outcomes: vec![
                for_role("teller", Outcome::hidden(admin_hidden())),
                for_role("loan_officer", Outcome::hidden(admin_hidden())),
                for_role(
                    "branch_manager",
                    Outcome::hidden(Denial::new(
                        "Tool \"override_transaction_limit\" requires system administrator \
                         privileges",
                        POLICY_ADMIN_TOOLS,
                    )),
                ),
            ],
        },
    ]
}
