// crates/mcp-authz-demo-core/src/core/catalog.rs
// ============================================================================
// Module: Demo Catalog
// Description: Roles, MCP tool servers, policies, agent identity, incidents.
// Purpose: Immutable reference data every narrated pipeline is drawn from.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! The catalog is the static world the demo narrates: three bank personas, three
//! MCP tool servers with four tools each, the named policies the gates cite,
//! the AI agent acting on the user's behalf, and a short list of public
//! incidents. Nothing here is mutated after construction.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::IncidentId;
use crate::core::identifiers::PolicyId;
use crate::core::identifiers::RoleId;
use crate::core::identifiers::ServerId;
use crate::core::identifiers::ToolName;

// ============================================================================
// SECTION: Roles
// ============================================================================

/// Clearance level carried by a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Clearance {
    /// Front-line staff.
    Standard,
    /// Staff with lending authority.
    Elevated,
    /// Branch leadership.
    Executive,
    /// System administrators (no demo persona holds this).
    SystemAdmin,
}

impl Clearance {
    /// Returns a stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Elevated => "elevated",
            Self::Executive => "executive",
            Self::SystemAdmin => "system_admin",
        }
    }
}

/// Resource scope attached to an allowed permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionScope {
    /// Only resources belonging to the user's branch.
    OwnBranch,
    /// Resources in every branch.
    AllBranches,
    /// Records of the user's direct reports.
    DirectReports,
}

impl PermissionScope {
    /// Returns a stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OwnBranch => "own_branch",
            Self::AllBranches => "all_branches",
            Self::DirectReports => "direct_reports",
        }
    }
}

/// Limit attached to an allowed permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionLimit {
    /// Monetary ceiling in whole dollars.
    Amount(u64),
    /// Transaction history window.
    History(HistoryWindow),
}

/// Transaction history window a role may read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryWindow {
    /// Last 30 days.
    #[serde(rename = "30_days")]
    Days30,
    /// Last 90 days.
    #[serde(rename = "90_days")]
    Days90,
    /// Full history.
    #[serde(rename = "full")]
    Full,
}

/// Permission entry for one tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Whether the tool is visible and callable at all.
    pub allowed: bool,
    /// Scope restriction for allowed tools.
    pub scope: Option<PermissionScope>,
    /// Optional amount or history limit.
    pub limit: Option<PermissionLimit>,
}

impl Permission {
    /// Permission that hides the tool.
    pub const DENIED: Self = Self {
        allowed: false,
        scope: None,
        limit: None,
    };

    /// Allowed permission with a scope.
    #[must_use]
    pub const fn allow(scope: PermissionScope) -> Self {
        Self {
            allowed: true,
            scope: Some(scope),
            limit: None,
        }
    }

    /// Allowed permission with a scope and a limit.
    #[must_use]
    pub const fn allow_limited(scope: PermissionScope, limit: PermissionLimit) -> Self {
        Self {
            allowed: true,
            scope: Some(scope),
            limit: Some(limit),
        }
    }

    /// Returns the monetary limit, if any.
    #[must_use]
    pub const fn amount_limit(&self) -> Option<u64> {
        match self.limit {
            Some(PermissionLimit::Amount(amount)) => Some(amount),
            _ => None,
        }
    }
}

/// Tool permission keyed by tool name, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPermission {
    /// Tool the permission applies to.
    pub tool: ToolName,
    /// Permission details.
    pub permission: Permission,
}

/// Demo persona with a fixed permission matrix.
///
/// # Invariants
/// - `permissions` lists every catalog tool exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role identifier.
    pub id: RoleId,
    /// Display name.
    pub name: String,
    /// Short access label ("Basic", "Limited", "Full").
    pub access: String,
    /// Employee identifier used in authorization context.
    pub employee_id: String,
    /// Branch the user belongs to.
    pub branch: String,
    /// Clearance level.
    pub clearance: Clearance,
    /// One-line description.
    pub description: String,
    /// Ordered permission map.
    pub permissions: Vec<ToolPermission>,
}

impl Role {
    /// Returns the permission for a tool; unknown tools are denied.
    #[must_use]
    pub fn permission(&self, tool: &ToolName) -> Permission {
        self.permissions
            .iter()
            .find(|entry| &entry.tool == tool)
            .map_or(Permission::DENIED, |entry| entry.permission)
    }
}

// ============================================================================
// SECTION: Tool Servers
// ============================================================================

/// Data sensitivity classification for a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sensitivity {
    /// Routine customer data.
    Medium,
    /// Regulated or financial data.
    High,
    /// Money movement or HR data.
    Critical,
}

/// Tool exposed by an MCP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    /// Tool name.
    pub name: ToolName,
    /// Description shown in tool listings.
    pub description: String,
    /// Category label.
    pub category: String,
    /// Sensitivity classification.
    pub sensitivity: Sensitivity,
}

/// MCP tool server and its tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpServer {
    /// Server identifier.
    pub id: ServerId,
    /// Display name.
    pub name: String,
    /// Nominal endpoint (never contacted).
    pub endpoint: String,
    /// Server version label.
    pub version: String,
    /// Tools in declaration order.
    pub tools: Vec<Tool>,
}

// ============================================================================
// SECTION: Policies
// ============================================================================

/// Pipeline stage a policy applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Gate 1: tool discovery filtering.
    ToolDiscovery,
    /// Gate 2: execution authorization.
    ExecutionAuthorization,
    /// Gate 3: response masking.
    ResponseMasking,
    /// Cross-cutting obligation (audit).
    Obligation,
}

/// Named policy cited in gate narration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Policy identifier.
    pub id: PolicyId,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Stage kind.
    pub kind: PolicyKind,
    /// Gate number (1-3) when the policy belongs to a gate.
    pub gate: Option<u8>,
}

/// Policy id for role-based tool visibility.
pub const POLICY_ROLE_TOOL_ACCESS: &str = "role-based-tool-access";
/// Policy id for branch boundary checks.
pub const POLICY_BRANCH_BOUNDARY: &str = "branch-boundary-enforcement";
/// Policy id for loan approval limits.
pub const POLICY_LOAN_LIMITS: &str = "loan-approval-limits";
/// Policy id for agent-specific restrictions.
pub const POLICY_AGENT_RESTRICTIONS: &str = "agent-restrictions";
/// Policy id for PII masking.
pub const POLICY_PII_MASKING: &str = "pii-masking";
/// Policy id for admin tool hiding.
pub const POLICY_ADMIN_TOOLS: &str = "admin-tool-restriction";
/// Policy id for audit obligations.
pub const POLICY_AUDIT_LOGGING: &str = "audit-logging";

// ============================================================================
// SECTION: Agent
// ============================================================================

/// Restrictions applied to the agent regardless of the user's permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRestrictions {
    /// Largest loan the agent may approve.
    pub max_loan_approval: u64,
    /// Loans above this amount require human confirmation.
    pub requires_confirmation_above: u64,
    /// Whether the agent may see full SSNs.
    pub can_view_ssn: bool,
    /// Whether the agent may see full account numbers.
    pub can_view_full_account_number: bool,
    /// Whether the agent may see salary data.
    pub can_view_salary: bool,
    /// Whether every transfer requires human confirmation.
    pub requires_confirmation_for_transfers: bool,
}

/// AI agent identity acting on behalf of the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Agent identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Version label.
    pub version: String,
    /// Trust level label.
    pub trust_level: String,
    /// Restrictions.
    pub restrictions: AgentRestrictions,
}

// ============================================================================
// SECTION: Incidents
// ============================================================================

/// Severity label for an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// High severity.
    High,
    /// Critical severity.
    Critical,
}

impl Severity {
    /// Returns the stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Public MCP incident and the gate that would have contained it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    /// Incident identifier.
    pub id: IncidentId,
    /// Short name.
    pub name: String,
    /// Affected company or source.
    pub company: String,
    /// Month and year.
    pub date: String,
    /// Severity.
    pub severity: Severity,
    /// Optional CVE identifier.
    pub cve: Option<String>,
    /// What happened.
    pub description: String,
    /// Outcome without a proxy.
    pub without_proxy: String,
    /// Outcome with the proxy.
    pub with_proxy: String,
    /// Gate (1-3) that blocks it.
    pub gate: u8,
    /// Policy cited for the block.
    pub policy: PolicyId,
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Complete static catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Roles in display order.
    pub roles: Vec<Role>,
    /// Tool servers in display order.
    pub servers: Vec<McpServer>,
    /// Policies.
    pub policies: Vec<Policy>,
    /// Agent identity.
    pub agent: Agent,
    /// Incidents.
    pub incidents: Vec<Incident>,
}

/// Tool paired with the server that exposes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolRef<'a> {
    /// Hosting server.
    pub server: &'a McpServer,
    /// Tool definition.
    pub tool: &'a Tool,
}

impl Catalog {
    /// Returns a role by id.
    #[must_use]
    pub fn role(&self, id: &RoleId) -> Option<&Role> {
        self.roles.iter().find(|role| &role.id == id)
    }

    /// Returns a policy by id.
    #[must_use]
    pub fn policy(&self, id: &str) -> Option<&Policy> {
        self.policies.iter().find(|policy| policy.id.as_str() == id)
    }

    /// Returns every tool across all servers in declaration order.
    #[must_use]
    pub fn tools(&self) -> Vec<ToolRef<'_>> {
        self.servers
            .iter()
            .flat_map(|server| {
                server.tools.iter().map(move |tool| ToolRef {
                    server,
                    tool,
                })
            })
            .collect()
    }

    /// Looks up a tool by name.
    #[must_use]
    pub fn tool(&self, name: &ToolName) -> Option<ToolRef<'_>> {
        self.tools().into_iter().find(|entry| &entry.tool.name == name)
    }

    /// Returns the built-in bank catalog.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            roles: builtin_roles(),
            servers: builtin_servers(),
            policies: builtin_policies(),
            agent: builtin_agent(),
            incidents: builtin_incidents(),
        }
    }
}

// ============================================================================
// SECTION: Built-in Data
// ============================================================================

/// Builds an ordered permission list from `(tool, permission)` pairs.
fn permissions(entries: &[(&str, Permission)]) -> Vec<ToolPermission> {
    entries
        .iter()
        .map(|(tool, permission)| ToolPermission {
            tool: ToolName::new(*tool),
            permission: *permission,
        })
        .collect()
}

/// Built-in roles.
fn builtin_roles() -> Vec<Role> {
    use PermissionLimit::Amount;
    use PermissionLimit::History;
    use PermissionScope::AllBranches;
    use PermissionScope::DirectReports;
    use PermissionScope::OwnBranch;

    let denied = Permission::DENIED;
    vec![
        Role {
            id: RoleId::new("teller"),
            name: "Bank Teller".to_string(),
            access: "Basic".to_string(),
            employee_id: "E-1234".to_string(),
            branch: "Central".to_string(),
            clearance: Clearance::Standard,
            description: "Front-line customer service".to_string(),
            permissions: permissions(&[
                ("get_account_details", Permission::allow(OwnBranch)),
                ("get_account_balance", Permission::allow(OwnBranch)),
                (
                    "get_transaction_history",
                    Permission::allow_limited(OwnBranch, History(HistoryWindow::Days30)),
                ),
                ("update_account_info", denied),
                ("get_loan_details", denied),
                ("calculate_loan_eligibility", denied),
                ("approve_loan", denied),
                ("get_loan_documents", denied),
                ("get_employee_records", denied),
                ("transfer_funds", denied),
                ("override_transaction_limit", denied),
                ("generate_audit_report", denied),
            ]),
        },
        Role {
            id: RoleId::new("loan_officer"),
            name: "Loan Officer".to_string(),
            access: "Limited".to_string(),
            employee_id: "E-5678".to_string(),
            branch: "Central".to_string(),
            clearance: Clearance::Elevated,
            description: "Processes loan applications".to_string(),
            permissions: permissions(&[
                ("get_account_details", Permission::allow(OwnBranch)),
                ("get_account_balance", Permission::allow(OwnBranch)),
                (
                    "get_transaction_history",
                    Permission::allow_limited(OwnBranch, History(HistoryWindow::Days90)),
                ),
                ("update_account_info", denied),
                ("get_loan_details", Permission::allow(OwnBranch)),
                ("calculate_loan_eligibility", Permission::allow(OwnBranch)),
                ("approve_loan", Permission::allow_limited(OwnBranch, Amount(50_000))),
                ("get_loan_documents", Permission::allow(OwnBranch)),
                ("get_employee_records", denied),
                ("transfer_funds", denied),
                ("override_transaction_limit", denied),
                ("generate_audit_report", denied),
            ]),
        },
        Role {
            id: RoleId::new("branch_manager"),
            name: "Branch Manager".to_string(),
            access: "Full".to_string(),
            employee_id: "E-9012".to_string(),
            branch: "Central".to_string(),
            clearance: Clearance::Executive,
            description: "Oversees all operations".to_string(),
            permissions: permissions(&[
                ("get_account_details", Permission::allow(AllBranches)),
                ("get_account_balance", Permission::allow(AllBranches)),
                (
                    "get_transaction_history",
                    Permission::allow_limited(AllBranches, History(HistoryWindow::Full)),
                ),
                ("update_account_info", Permission::allow(OwnBranch)),
                ("get_loan_details", Permission::allow(AllBranches)),
                ("calculate_loan_eligibility", Permission::allow(AllBranches)),
                ("approve_loan", Permission::allow_limited(OwnBranch, Amount(500_000))),
                ("get_loan_documents", Permission::allow(AllBranches)),
                ("get_employee_records", Permission::allow(DirectReports)),
                ("transfer_funds", Permission::allow_limited(OwnBranch, Amount(10_000))),
                ("override_transaction_limit", denied),
                ("generate_audit_report", Permission::allow(OwnBranch)),
            ]),
        },
    ]
}

/// Builds a tool definition.
fn tool(name: &str, description: &str, category: &str, sensitivity: Sensitivity) -> Tool {
    Tool {
        name: ToolName::new(name),
        description: description.to_string(),
        category: category.to_string(),
        sensitivity,
    }
}

/// Built-in MCP servers.
fn builtin_servers() -> Vec<McpServer> {
    use Sensitivity::Critical;
    use Sensitivity::High;
    use Sensitivity::Medium;

    vec![
        McpServer {
            id: ServerId::new("account_management"),
            name: "Account Management MCP Server".to_string(),
            endpoint: "mcp://acme-bank/account-management".to_string(),
            version: "1.2.0".to_string(),
            tools: vec![
                tool(
                    "get_account_details",
                    "Retrieve detailed account information for a customer",
                    "account",
                    Medium,
                ),
                tool("get_account_balance", "Get current balance for an account", "account", Medium),
                tool(
                    "get_transaction_history",
                    "Retrieve transaction history for an account",
                    "account",
                    Medium,
                ),
                tool("update_account_info", "Update customer account information", "account", High),
            ],
        },
        McpServer {
            id: ServerId::new("loan_services"),
            name: "Loan Services MCP Server".to_string(),
            endpoint: "mcp://acme-bank/loan-services".to_string(),
            version: "2.0.1".to_string(),
            tools: vec![
                tool(
                    "get_loan_details",
                    "Retrieve details of a loan application or active loan",
                    "loan",
                    High,
                ),
                tool(
                    "calculate_loan_eligibility",
                    "Calculate loan eligibility for a customer",
                    "loan",
                    Medium,
                ),
                tool("approve_loan", "Approve a loan application", "loan", Critical),
                tool("get_loan_documents", "Retrieve documents associated with a loan", "loan", High),
            ],
        },
        McpServer {
            id: ServerId::new("admin_operations"),
            name: "Admin Operations MCP Server".to_string(),
            endpoint: "mcp://acme-bank/admin-operations".to_string(),
            version: "1.5.0".to_string(),
            tools: vec![
                tool("get_employee_records", "Retrieve employee HR records", "admin", Critical),
                tool("transfer_funds", "Transfer funds between accounts", "admin", Critical),
                tool(
                    "override_transaction_limit",
                    "Override daily transaction limit for an account",
                    "admin",
                    Critical,
                ),
                tool("generate_audit_report", "Generate compliance audit report", "admin", High),
            ],
        },
    ]
}

/// Builds a policy definition.
fn policy(id: &str, name: &str, description: &str, kind: PolicyKind, gate: Option<u8>) -> Policy {
    Policy {
        id: PolicyId::new(id),
        name: name.to_string(),
        description: description.to_string(),
        kind,
        gate,
    }
}

/// Built-in policies.
fn builtin_policies() -> Vec<Policy> {
    vec![
        policy(
            POLICY_ROLE_TOOL_ACCESS,
            "Role-Based Tool Access",
            "Controls which MCP tools are visible based on user role",
            PolicyKind::ToolDiscovery,
            Some(1),
        ),
        policy(
            POLICY_BRANCH_BOUNDARY,
            "Branch Boundary Enforcement",
            "Ensures users can only access data within their authorized branch scope",
            PolicyKind::ExecutionAuthorization,
            Some(2),
        ),
        policy(
            POLICY_LOAN_LIMITS,
            "Loan Approval Limits",
            "Enforces loan approval amount limits based on role",
            PolicyKind::ExecutionAuthorization,
            Some(2),
        ),
        policy(
            POLICY_AGENT_RESTRICTIONS,
            "AI Agent Restrictions",
            "Applies additional restrictions when an AI agent acts on behalf of a user",
            PolicyKind::ExecutionAuthorization,
            Some(2),
        ),
        policy(
            POLICY_PII_MASKING,
            "PII Data Masking",
            "Masks personally identifiable information in responses",
            PolicyKind::ResponseMasking,
            Some(3),
        ),
        policy(
            POLICY_ADMIN_TOOLS,
            "Administrative Tool Restriction",
            "Completely hides administrative tools from non-admin roles",
            PolicyKind::ToolDiscovery,
            Some(1),
        ),
        policy(
            POLICY_AUDIT_LOGGING,
            "Audit Logging",
            "Records all authorization decisions for compliance",
            PolicyKind::Obligation,
            None,
        ),
    ]
}

/// Built-in agent identity.
fn builtin_agent() -> Agent {
    Agent {
        id: "enterprise-ai-assistant-v2.1".to_string(),
        name: "Enterprise AI Assistant".to_string(),
        version: "2.1".to_string(),
        trust_level: "standard".to_string(),
        restrictions: AgentRestrictions {
            max_loan_approval: 25_000,
            requires_confirmation_above: 10_000,
            can_view_ssn: false,
            can_view_full_account_number: false,
            can_view_salary: false,
            requires_confirmation_for_transfers: true,
        },
    }
}

/// Built-in incident narratives.
fn builtin_incidents() -> Vec<Incident> {
    vec![
        Incident {
            id: IncidentId::new("asana_cross_tenant"),
            name: "Cross-Tenant Data Exposure".to_string(),
            company: "Asana".to_string(),
            date: "June 2025".to_string(),
            severity: Severity::Critical,
            cve: None,
            description: "An MCP server exposed data from one customer's tenant to another due \
                          to insufficient tenant isolation."
                .to_string(),
            without_proxy: "User A queries the MCP server and receives User B's data.".to_string(),
            with_proxy: "Gate 2 validates tenant context; the request is blocked on tenant \
                         mismatch."
                .to_string(),
            gate: 2,
            policy: PolicyId::new("tenant-isolation"),
        },
        Incident {
            id: IncidentId::new("slack_mcp_cve"),
            name: "Sensitive Data Leakage".to_string(),
            company: "Slack MCP Server".to_string(),
            date: "May 2025".to_string(),
            severity: Severity::High,
            cve: Some("CVE-2025-34072".to_string()),
            description: "A widely used but deprecated MCP server leaked sensitive data in API \
                          responses."
                .to_string(),
            without_proxy: "Raw responses including PII reach any caller.".to_string(),
            with_proxy: "Gate 3 masks sensitive fields before the response reaches the agent."
                .to_string(),
            gate: 3,
            policy: PolicyId::new(POLICY_PII_MASKING),
        },
        Incident {
            id: IncidentId::new("backslash_exposure"),
            name: "Excessive Permissions".to_string(),
            company: "Industry-Wide (Backslash Research)".to_string(),
            date: "June 2025".to_string(),
            severity: Severity::High,
            cve: None,
            description: "About 7,000 MCP servers were found on the public web, hundreds allowing \
                          unauthenticated access with elevated privileges."
                .to_string(),
            without_proxy: "Every tool is exposed to every authenticated user.".to_string(),
            with_proxy: "Gate 1 filters tools/list so the agent only sees authorized tools."
                .to_string(),
            gate: 1,
            policy: PolicyId::new(POLICY_ROLE_TOOL_ACCESS),
        },
    ]
}
