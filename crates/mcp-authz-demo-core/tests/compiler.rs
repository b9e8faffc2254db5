// crates/mcp-authz-demo-core/tests/compiler.rs
// ============================================================================
// Module: Script Compiler Tests
// Description: Readable/raw parity, masking, and digest stability.
// ============================================================================
//! ## Overview
//! Compiles every (role, scenario, mode) selection of the built-in table and
//! checks that the views agree, that raw sensitive values never leak, and that
//! compilation is deterministic.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use mcp_authz_demo_core::LineKind;
use mcp_authz_demo_core::OutputMode;
use mcp_authz_demo_core::ScenarioTable;
use mcp_authz_demo_core::Script;
use mcp_authz_demo_core::ScriptKey;
use mcp_authz_demo_core::SensitiveField;
use mcp_authz_demo_core::Tag;
use mcp_authz_demo_core::compile;
use serde_json::Value;

/// Compiles every built-in selection in the given mode.
fn all_scripts(table: &ScenarioTable, mode: OutputMode) -> Vec<Script> {
    let mut scripts = Vec::new();
    for role in &table.catalog.roles {
        for scenario in &table.scenarios {
            let key = ScriptKey::new(role.id.clone(), scenario.id.clone(), mode);
            scripts.push(compile(table, &key).expect("script"));
        }
    }
    scripts
}

#[test]
fn readable_and_raw_share_tag_sequence() {
    let table = ScenarioTable::builtin();
    let readable = all_scripts(&table, OutputMode::Readable);
    let raw = all_scripts(&table, OutputMode::Raw);
    for (readable, raw) in readable.iter().zip(&raw) {
        assert_eq!(readable.tag_sequence(), raw.tag_sequence(), "{:?}", readable.key);
    }
}

#[test]
fn teller_account_lookup_shows_masked_ssn_only() {
    let table = ScenarioTable::builtin();
    let script =
        compile(&table, &ScriptKey::new("teller", "account_lookup", OutputMode::Readable)).expect("script");
    let text = script.full_text();
    assert!(text.contains("ssn: \"XXX-XX-6789\""));
    assert!(!text.contains("123-45-6789"));
    assert_eq!(
        script.tag_sequence(),
        vec![
            (Tag::Pass, Some(1)),
            (Tag::Pass, Some(2)),
            (Tag::Mask, Some(3)),
            (Tag::Done, None),
        ]
    );
}

#[test]
fn raw_sensitive_values_never_appear() {
    let table = ScenarioTable::builtin();
    let secrets = ["123-45-6789", "987-65-4321"];
    for mode in [OutputMode::Readable, OutputMode::Raw] {
        for script in all_scripts(&table, mode) {
            let text = script.full_text();
            for secret in secrets {
                assert!(!text.contains(secret), "{secret} leaked in {:?}", script.key);
            }
        }
    }
}

#[test]
fn loan_officer_sees_redacted_credit_score() {
    let table = ScenarioTable::builtin();
    let officer = compile(&table, &ScriptKey::new("loan_officer", "loan_status", OutputMode::Readable))
        .expect("script");
    assert!(officer.full_text().contains("credit_score: \"[REDACTED]\""));

    let manager =
        compile(&table, &ScriptKey::new("branch_manager", "loan_status", OutputMode::Readable))
            .expect("script");
    assert!(manager.full_text().contains("credit_score: 720"));
    assert!(manager.tag_sequence().contains(&(Tag::Pass, Some(3))));
}

#[test]
fn mask_metadata_only_on_fields_gate_three_masked() {
    let table = ScenarioTable::builtin();
    for script in all_scripts(&table, OutputMode::Readable) {
        let outcome = table.outcome(&script.key.role, &script.key.scenario).expect("outcome");
        let masked = outcome.stage3.masked_fields();
        for line in &script.lines {
            if let Some(transform) = &line.mask {
                assert!(
                    masked.contains(&transform.field),
                    "{:?} tagged {:?} in {:?}",
                    line.text,
                    transform.field,
                    script.key
                );
            }
        }
    }
}

#[test]
fn loan_status_credit_score_mask_follows_role() {
    let table = ScenarioTable::builtin();
    let credit_line = |role: &str| {
        let script = compile(&table, &ScriptKey::new(role, "loan_status", OutputMode::Readable))
            .expect("script");
        script
            .lines
            .into_iter()
            .find(|line| line.kind == LineKind::Response && line.text.starts_with("  credit_score:"))
            .expect("credit_score response line")
    };

    let officer = credit_line("loan_officer");
    let transform = officer.mask.expect("officer credit score is masked");
    assert_eq!(transform.field, SensitiveField::CreditScore);
    assert_eq!(transform.masked, "[REDACTED]");

    let manager = credit_line("branch_manager");
    assert_eq!(manager.text, "  credit_score: 720");
    assert!(manager.mask.is_none());
    assert!(manager.highlight.is_none());
}

#[test]
fn denied_scripts_skip_later_gates_and_carry_no_response() {
    let table = ScenarioTable::builtin();
    let hidden = compile(&table, &ScriptKey::new("branch_manager", "admin_override", OutputMode::Readable))
        .expect("script");
    assert_eq!(
        hidden.tag_sequence(),
        vec![(Tag::Deny, Some(1)), (Tag::Skip, Some(2)), (Tag::Skip, Some(3)), (Tag::Done, None)]
    );
    assert!(hidden.lines.iter().all(|line| line.kind != LineKind::Response));

    let blocked =
        compile(&table, &ScriptKey::new("teller", "cross_branch", OutputMode::Readable)).expect("script");
    assert_eq!(
        blocked.tag_sequence(),
        vec![(Tag::Pass, Some(1)), (Tag::Deny, Some(2)), (Tag::Skip, Some(3)), (Tag::Done, None)]
    );
    assert!(blocked.lines.iter().all(|line| line.kind != LineKind::Response));
    assert!(blocked.full_text().contains("branch-boundary-enforcement"));
}

#[test]
fn agent_check_is_narrated_as_info() {
    let table = ScenarioTable::builtin();
    let script = compile(
        &table,
        &ScriptKey::new("loan_officer", "approve_loan_within_limit", OutputMode::Readable),
    )
    .expect("script");
    assert!(script.tag_sequence().contains(&(Tag::Info, Some(2))));
    assert!(script.full_text().contains("auto-approval limit of $25,000"));
}

#[test]
fn raw_lines_are_sorted_json_records() {
    let table = ScenarioTable::builtin();
    for script in all_scripts(&table, OutputMode::Raw) {
        assert!(script.lines.iter().all(|line| !line.is_blank()));
        for (index, line) in script.lines.iter().enumerate() {
            let record: Value = serde_json::from_str(&line.text).expect("json line");
            let object = record.as_object().expect("object");
            assert_eq!(object.get("seq").and_then(Value::as_u64), Some(index as u64));
            assert!(object.contains_key("event"));
            let keys: Vec<&String> = object.keys().collect();
            let mut sorted = keys.clone();
            sorted.sort();
            assert_eq!(keys, sorted);
            if let Some(tag) = line.tag {
                assert_eq!(object.get("decision").and_then(Value::as_str), Some(tag.label()));
            }
        }
    }
}

#[test]
fn compilation_is_deterministic() {
    let table = ScenarioTable::builtin();
    for mode in [OutputMode::Readable, OutputMode::Raw] {
        let first = all_scripts(&table, mode);
        let second = all_scripts(&table, mode);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a, b);
            assert_eq!(a.digest().expect("digest"), b.digest().expect("digest"));
        }
    }
}

#[test]
fn digests_distinguish_modes_and_roles() {
    let table = ScenarioTable::builtin();
    let readable = compile(&table, &ScriptKey::new("teller", "account_lookup", OutputMode::Readable))
        .expect("script")
        .digest()
        .expect("digest");
    let raw = compile(&table, &ScriptKey::new("teller", "account_lookup", OutputMode::Raw))
        .expect("script")
        .digest()
        .expect("digest");
    let manager =
        compile(&table, &ScriptKey::new("branch_manager", "account_lookup", OutputMode::Readable))
            .expect("script")
            .digest()
            .expect("digest");
    assert_ne!(readable, raw);
    assert_ne!(readable, manager);
    assert_eq!(readable.as_str().len(), 64);
}

#[test]
fn unknown_selection_compiles_to_none() {
    let table = ScenarioTable::builtin();
    assert!(compile(&table, &ScriptKey::new("auditor", "account_lookup", OutputMode::Raw)).is_none());
}
