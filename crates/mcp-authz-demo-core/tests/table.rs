// crates/mcp-authz-demo-core/tests/table.rs
// ============================================================================
// Module: Outcome Table Tests
// Description: Totality, short-circuit, and gate agreement of the built-in table.
// ============================================================================
//! ## Overview
//! Checks that every role has an outcome for every scenario, that denials
//! short-circuit later gates, and that the cosmetic gate evaluation agrees with
//! the precomputed verdicts.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use mcp_authz_demo_core::DiscoveryVerdict;
use mcp_authz_demo_core::ExecutionVerdict;
use mcp_authz_demo_core::FinalResult;
use mcp_authz_demo_core::MaskingVerdict;
use mcp_authz_demo_core::OutcomeError;
use mcp_authz_demo_core::RoleId;
use mcp_authz_demo_core::ScenarioId;
use mcp_authz_demo_core::ScenarioTable;
use mcp_authz_demo_core::SensitiveField;
use mcp_authz_demo_core::TableError;
use mcp_authz_demo_core::core::catalog::POLICY_ADMIN_TOOLS;
use mcp_authz_demo_core::core::catalog::POLICY_BRANCH_BOUNDARY;
use mcp_authz_demo_core::runtime::ExecutionDecision;
use mcp_authz_demo_core::runtime::evaluate_execution;
use mcp_authz_demo_core::runtime::evaluate_response_masking;
use mcp_authz_demo_core::runtime::evaluate_tool_discovery;
use serde_json::json;

#[test]
fn builtin_table_validates() {
    ScenarioTable::builtin().validate().expect("builtin table is valid");
}

#[test]
fn every_role_has_an_outcome_for_every_scenario() {
    let table = ScenarioTable::builtin();
    assert_eq!(table.catalog.roles.len(), 3);
    assert_eq!(table.scenarios.len(), 6);
    for role in &table.catalog.roles {
        for scenario in &table.scenarios {
            assert!(
                table.outcome(&role.id, &scenario.id).is_some(),
                "missing outcome for {} / {}",
                role.id,
                scenario.id
            );
        }
    }
}

#[test]
fn unknown_ids_return_none() {
    let table = ScenarioTable::builtin();
    assert!(table.outcome(&RoleId::new("auditor"), &ScenarioId::new("account_lookup")).is_none());
    assert!(table.outcome(&RoleId::new("teller"), &ScenarioId::new("wire_fraud")).is_none());
}

#[test]
fn denials_short_circuit_later_gates() {
    let table = ScenarioTable::builtin();
    for scenario in &table.scenarios {
        for entry in &scenario.outcomes {
            let outcome = &entry.outcome;
            if outcome.stage1 == DiscoveryVerdict::Deny {
                assert_eq!(outcome.stage2, ExecutionVerdict::Skip);
                assert_eq!(outcome.stage3, MaskingVerdict::Skip);
            }
            if outcome.stage2 == ExecutionVerdict::Deny {
                assert_eq!(outcome.stage3, MaskingVerdict::Skip);
            }
            assert_eq!(outcome.response.is_some(), outcome.result == FinalResult::Success);
        }
    }
}

#[test]
fn teller_account_lookup_masks_ssn() {
    let table = ScenarioTable::builtin();
    let outcome = table
        .outcome(&RoleId::new("teller"), &ScenarioId::new("account_lookup"))
        .expect("outcome");
    assert_eq!(outcome.stage1, DiscoveryVerdict::Permit);
    assert_eq!(outcome.stage2, ExecutionVerdict::Permit);
    assert_eq!(outcome.stage3, MaskingVerdict::Mask(vec![SensitiveField::Ssn]));
    assert_eq!(outcome.result, FinalResult::Success);
}

#[test]
fn account_lookup_response_carries_opening_date() {
    let table = ScenarioTable::builtin();
    for role in &table.catalog.roles {
        let response = table
            .outcome(&role.id, &ScenarioId::new("account_lookup"))
            .and_then(|outcome| outcome.response.as_ref())
            .expect("response");
        assert_eq!(response.get("opened_date"), Some(&json!("2019-03-15")));
    }
}

#[test]
fn underwriting_ratio_reaches_only_the_branch_manager() {
    let table = ScenarioTable::builtin();
    let loan = ScenarioId::new("loan_status");
    let officer = table
        .outcome(&RoleId::new("loan_officer"), &loan)
        .and_then(|outcome| outcome.response.as_ref())
        .expect("officer response");
    assert!(officer.get("debt_to_income").is_none());
    assert!(officer.get("credit_score").is_some());

    let manager = table
        .outcome(&RoleId::new("branch_manager"), &loan)
        .and_then(|outcome| outcome.response.as_ref())
        .expect("manager response");
    assert_eq!(manager.get("debt_to_income"), Some(&json!(0.32)));
}

#[test]
fn teller_cross_branch_is_blocked_at_execution() {
    let table = ScenarioTable::builtin();
    let outcome =
        table.outcome(&RoleId::new("teller"), &ScenarioId::new("cross_branch")).expect("outcome");
    assert_eq!(outcome.stage1, DiscoveryVerdict::Permit);
    assert_eq!(outcome.stage2, ExecutionVerdict::Deny);
    assert_eq!(outcome.stage3, MaskingVerdict::Skip);
    assert_eq!(outcome.result, FinalResult::Denied);
    assert!(outcome.response.is_none());
    assert_eq!(outcome.denial.as_ref().expect("denial").policy.as_str(), POLICY_BRANCH_BOUNDARY);
}

#[test]
fn branch_manager_cannot_discover_admin_override() {
    let table = ScenarioTable::builtin();
    let outcome = table
        .outcome(&RoleId::new("branch_manager"), &ScenarioId::new("admin_override"))
        .expect("outcome");
    assert_eq!(outcome.stage1, DiscoveryVerdict::Deny);
    assert_eq!(outcome.result, FinalResult::Denied);
    assert_eq!(outcome.denied_at(), Some(1));
    assert_eq!(outcome.denial.as_ref().expect("denial").policy.as_str(), POLICY_ADMIN_TOOLS);
}

#[test]
fn loan_officer_over_limit_gets_escalation_hint() {
    let table = ScenarioTable::builtin();
    let outcome = table
        .outcome(&RoleId::new("loan_officer"), &ScenarioId::new("approve_loan"))
        .expect("outcome");
    let denial = outcome.denial.as_ref().expect("denial");
    assert_eq!(denial.suggestion.as_deref(), Some("Escalate to Branch Manager for approval"));
    assert!(denial.reason.contains("$75,000"));
}

#[test]
fn validate_reports_missing_outcome() {
    let mut table = ScenarioTable::builtin();
    table.scenarios[2].outcomes.retain(|entry| entry.role.as_str() != "loan_officer");
    let err = table.validate().expect_err("gap must be reported");
    assert_eq!(
        err,
        TableError::MissingOutcome {
            role: RoleId::new("loan_officer"),
            scenario: ScenarioId::new("loan_status"),
        }
    );
}

#[test]
fn validate_reports_broken_short_circuit() {
    let mut table = ScenarioTable::builtin();
    table.scenarios[5].outcomes[0].outcome.stage2 = ExecutionVerdict::Permit;
    let err = table.validate().expect_err("invariant violation must be reported");
    assert!(matches!(
        err,
        TableError::InvalidOutcome {
            source: OutcomeError::MissingShortCircuit(1),
            ..
        }
    ));
}

#[test]
fn validate_reports_masking_disagreement() {
    let mut table = ScenarioTable::builtin();
    let manager = table.scenarios[2]
        .outcomes
        .iter_mut()
        .find(|entry| entry.role.as_str() == "branch_manager")
        .expect("manager outcome");
    manager.outcome.stage3 = MaskingVerdict::Mask(vec![SensitiveField::CreditScore]);
    let err = table.validate().expect_err("mismatch must be reported");
    assert!(matches!(err, TableError::MaskingMismatch { .. }));
}

#[test]
fn validate_reports_duplicate_scenario() {
    let mut table = ScenarioTable::builtin();
    let copy = table.scenarios[0].clone();
    table.scenarios.push(copy);
    let err = table.validate().expect_err("duplicate must be reported");
    assert_eq!(err, TableError::DuplicateScenario(ScenarioId::new("account_lookup")));
}

#[test]
fn gate_evaluation_agrees_with_table() {
    let table = ScenarioTable::builtin();
    for role in &table.catalog.roles {
        let discovery = evaluate_tool_discovery(&table.catalog, role);
        for scenario in &table.scenarios {
            let outcome = scenario.outcome(&role.id).expect("outcome");
            let context = format!("{} / {}", role.id, scenario.id);

            assert_eq!(discovery.verdict_for(&scenario.tool), outcome.stage1, "{context}");
            if outcome.stage1 == DiscoveryVerdict::Deny {
                let removal = discovery.removal(&scenario.tool).expect("removal record");
                let denial = outcome.denial.as_ref().expect("denial");
                assert_eq!(removal.policy, denial.policy, "{context}");
                continue;
            }

            let execution = evaluate_execution(&table.catalog, role, scenario);
            assert_eq!(execution.verdict(), outcome.stage2, "{context}");
            match execution {
                ExecutionDecision::Deny(denial) => {
                    let expected = outcome.denial.as_ref().expect("denial");
                    assert_eq!(denial.policy, expected.policy, "{context}");
                    assert_eq!(denial.suggestion, expected.suggestion, "{context}");
                }
                ExecutionDecision::Permit {
                    agent_check,
                    ..
                } => {
                    assert_eq!(agent_check, outcome.agent_check, "{context}");
                    let payload = outcome.response.as_ref().expect("payload");
                    let masking = evaluate_response_masking(role, payload);
                    assert_eq!(masking.verdict(), outcome.stage3, "{context}");
                }
            }
        }
    }
}

#[test]
fn discovery_counts_match_permission_matrix() {
    let table = ScenarioTable::builtin();
    let counts: Vec<(String, usize)> = table
        .catalog
        .roles
        .iter()
        .map(|role| {
            let report = evaluate_tool_discovery(&table.catalog, role);
            assert_eq!(report.original_count, 12);
            assert_eq!(report.visible_count() + report.removed.len(), 12);
            (role.id.to_string(), report.visible_count())
        })
        .collect();
    assert_eq!(
        counts,
        vec![
            ("teller".to_string(), 3),
            ("loan_officer".to_string(), 7),
            ("branch_manager".to_string(), 11),
        ]
    );
}
