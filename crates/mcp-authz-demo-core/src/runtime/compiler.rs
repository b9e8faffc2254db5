// crates/mcp-authz-demo-core/src/runtime/compiler.rs
// ============================================================================
// Module: Script Compiler
// Description: Compiles an outcome into readable or raw playback lines.
// Purpose: Guarantee every view of an outcome narrates the same decisions.
// Dependencies: crate::core, crate::runtime::gates, serde_json
// ============================================================================

//! ## Overview
//! Compilation runs in two passes. The first turns an [`Outcome`] into a list
//! of pipeline steps; the second renders each step as lines for the selected
//! [`OutputMode`]. Every step maps to exactly one kind, tag, and stage, so the
//! readable and raw views always carry the same tag sequence.
//!
//! Sensitive response values are masked before any text is produced; the raw
//! value of a masked field never reaches a compiled line.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::core::catalog::Catalog;
use crate::core::catalog::McpServer;
use crate::core::catalog::POLICY_PII_MASKING;
use crate::core::catalog::PermissionScope;
use crate::core::catalog::Role;
use crate::core::masking::SensitiveField;
use crate::core::outcome::AgentCheck;
use crate::core::outcome::Denial;
use crate::core::outcome::DiscoveryVerdict;
use crate::core::outcome::ExecutionVerdict;
use crate::core::outcome::FinalResult;
use crate::core::outcome::MaskingVerdict;
use crate::core::outcome::Outcome;
use crate::core::outcome::ResponseField;
use crate::core::outcome::ResponsePayload;
use crate::core::outcome::Scenario;
use crate::core::script::Line;
use crate::core::script::LineKind;
use crate::core::script::OutputMode;
use crate::core::script::Script;
use crate::core::script::ScriptKey;
use crate::core::script::Tag;
use crate::core::table::ScenarioTable;
use crate::runtime::gates::evaluate_tool_discovery;

// ============================================================================
// SECTION: Entry Points
// ============================================================================

/// Compiles the script for a selection, or `None` when the table has no entry.
#[must_use]
pub fn compile(table: &ScenarioTable, key: &ScriptKey) -> Option<Script> {
    let role = table.role(&key.role)?;
    let scenario = table.scenario(&key.scenario)?;
    let outcome = scenario.outcome(&key.role)?;
    Some(compile_outcome(&table.catalog, role, scenario, outcome, key.mode))
}

/// Compiles one outcome for one role and scenario.
#[must_use]
pub fn compile_outcome(
    catalog: &Catalog,
    role: &Role,
    scenario: &Scenario,
    outcome: &Outcome,
    mode: OutputMode,
) -> Script {
    let steps = plan(catalog, role, scenario, outcome);
    let mut lines = Vec::new();
    for (seq, step) in steps.iter().enumerate() {
        match mode {
            OutputMode::Readable => render_readable(step, &mut lines),
            OutputMode::Raw => lines.push(render_raw(step, seq)),
        }
    }
    Script {
        key: ScriptKey::new(role.id.clone(), scenario.id.clone(), mode),
        lines,
    }
}

// ============================================================================
// SECTION: Pipeline Steps
// ============================================================================

/// One narrated pipeline event.
enum Step<'a> {
    /// User query reaches the agent.
    Request {
        /// Requesting role.
        role: &'a Role,
        /// Query text.
        query: &'a str,
    },
    /// Agent picks a tool.
    ToolSelected {
        /// Scenario carrying the tool and parameters.
        scenario: &'a Scenario,
        /// Server exposing the tool.
        server: Option<&'a McpServer>,
    },
    /// Proxy resolves the caller identity.
    Authenticated {
        /// Resolved role.
        role: &'a Role,
    },
    /// Gate header.
    GateStart {
        /// Gate number.
        stage: u8,
    },
    /// Gate 1 filtered the tool list.
    ToolFilter {
        /// Tools before filtering.
        original: usize,
        /// Tools after filtering.
        visible: usize,
    },
    /// Gate 1 verdict for the selected tool.
    DiscoveryDecision {
        /// Verdict.
        verdict: DiscoveryVerdict,
        /// Selected tool.
        scenario: &'a Scenario,
    },
    /// Permission scope applied by gate 2.
    ExecutionScope {
        /// Granted scope.
        scope: Option<PermissionScope>,
    },
    /// Agent restriction applied by gate 2.
    AgentCheck(&'a AgentCheck),
    /// Reason for a denial.
    DenyReason {
        /// Gate that denied.
        stage: u8,
        /// Denial details.
        denial: &'a Denial,
    },
    /// Gate 2 verdict.
    ExecutionDecision {
        /// Verdict.
        verdict: ExecutionVerdict,
    },
    /// Gate 3 masked one field.
    MaskField {
        /// Masked field.
        field: SensitiveField,
        /// Value shown in place of the raw one.
        masked: Value,
    },
    /// Gate 3 verdict.
    MaskingDecision {
        /// Masked fields, empty when passed through.
        fields: &'a [SensitiveField],
    },
    /// Gate not evaluated.
    GateSkipped {
        /// Gate number.
        stage: u8,
    },
    /// Response delivered to the agent.
    Response {
        /// Masked payload.
        payload: ResponsePayload,
        /// Fields replaced by gate 3.
        masked: &'a [SensitiveField],
    },
    /// Pipeline finished.
    Completed {
        /// Final result.
        result: FinalResult,
        /// Gate that denied, if any.
        denied_at: Option<u8>,
    },
}

impl Step<'_> {
    /// Returns the kind, tag, and stage shared by every rendering of the step.
    const fn head(&self) -> (LineKind, Option<Tag>, Option<u8>) {
        match self {
            Self::Request {
                ..
            }
            | Self::ToolSelected {
                ..
            } => (LineKind::Context, None, None),
            Self::Authenticated {
                ..
            } => (LineKind::Detail, None, None),
            Self::GateStart {
                stage,
            } => (LineKind::GateStart, None, Some(*stage)),
            Self::ToolFilter {
                ..
            } => (LineKind::Detail, None, Some(1)),
            Self::DiscoveryDecision {
                verdict,
                ..
            } => {
                let tag = match verdict {
                    DiscoveryVerdict::Permit => Tag::Pass,
                    DiscoveryVerdict::Deny => Tag::Deny,
                };
                (LineKind::Decision, Some(tag), Some(1))
            }
            Self::ExecutionScope {
                ..
            } => (LineKind::Detail, None, Some(2)),
            Self::AgentCheck(_) => (LineKind::Decision, Some(Tag::Info), Some(2)),
            Self::DenyReason {
                stage,
                ..
            } => (LineKind::Deny, None, Some(*stage)),
            Self::ExecutionDecision {
                verdict,
            } => {
                let tag = match verdict {
                    ExecutionVerdict::Permit => Tag::Pass,
                    ExecutionVerdict::Deny => Tag::Deny,
                    ExecutionVerdict::Skip => Tag::Skip,
                };
                (LineKind::Decision, Some(tag), Some(2))
            }
            Self::MaskField {
                ..
            } => (LineKind::Mask, None, Some(3)),
            Self::MaskingDecision {
                fields,
            } => {
                let tag = if fields.is_empty() { Tag::Pass } else { Tag::Mask };
                (LineKind::Decision, Some(tag), Some(3))
            }
            Self::GateSkipped {
                stage,
            } => (LineKind::Decision, Some(Tag::Skip), Some(*stage)),
            Self::Response {
                ..
            } => (LineKind::Response, None, None),
            Self::Completed {
                ..
            } => (LineKind::Result, Some(Tag::Done), None),
        }
    }

    /// Builds a line carrying the step's head.
    fn line(&self, text: impl Into<String>) -> Line {
        let (kind, tag, stage) = self.head();
        let mut line = Line::new(kind, text);
        line.tag = tag;
        line.stage = stage;
        line
    }
}

/// Plans the ordered pipeline steps for an outcome.
fn plan<'a>(
    catalog: &'a Catalog,
    role: &'a Role,
    scenario: &'a Scenario,
    outcome: &'a Outcome,
) -> Vec<Step<'a>> {
    let discovery = evaluate_tool_discovery(catalog, role);
    let mut steps = vec![
        Step::Request {
            role,
            query: &scenario.query,
        },
        Step::ToolSelected {
            scenario,
            server: catalog.tool(&scenario.tool).map(|entry| entry.server),
        },
        Step::Authenticated {
            role,
        },
        Step::GateStart {
            stage: 1,
        },
        Step::ToolFilter {
            original: discovery.original_count,
            visible: discovery.visible_count(),
        },
    ];

    if outcome.stage1 == DiscoveryVerdict::Deny {
        if let Some(denial) = &outcome.denial {
            steps.push(Step::DenyReason {
                stage: 1,
                denial,
            });
        }
        steps.push(Step::DiscoveryDecision {
            verdict: DiscoveryVerdict::Deny,
            scenario,
        });
        steps.push(Step::GateSkipped {
            stage: 2,
        });
        steps.push(Step::GateSkipped {
            stage: 3,
        });
    } else {
        steps.push(Step::DiscoveryDecision {
            verdict: DiscoveryVerdict::Permit,
            scenario,
        });
        steps.push(Step::GateStart {
            stage: 2,
        });
        plan_execution(role, scenario, outcome, &mut steps);
    }

    steps.push(Step::Completed {
        result: outcome.result,
        denied_at: outcome.denied_at(),
    });
    steps
}

/// Plans gate 2 and, when it permits, gate 3 and the response.
fn plan_execution<'a>(
    role: &'a Role,
    scenario: &'a Scenario,
    outcome: &'a Outcome,
    steps: &mut Vec<Step<'a>>,
) {
    if outcome.stage2 == ExecutionVerdict::Deny {
        if let Some(denial) = &outcome.denial {
            steps.push(Step::DenyReason {
                stage: 2,
                denial,
            });
        }
        steps.push(Step::ExecutionDecision {
            verdict: ExecutionVerdict::Deny,
        });
        steps.push(Step::GateSkipped {
            stage: 3,
        });
        return;
    }

    steps.push(Step::ExecutionScope {
        scope: role.permission(&scenario.tool).scope,
    });
    if let Some(check) = &outcome.agent_check {
        steps.push(Step::AgentCheck(check));
    }
    steps.push(Step::ExecutionDecision {
        verdict: ExecutionVerdict::Permit,
    });
    steps.push(Step::GateStart {
        stage: 3,
    });

    let raw = outcome.response.clone().unwrap_or_default();
    let masked_fields = outcome.stage3.masked_fields();
    for field in masked_fields {
        if let Some(value) = raw.get(field.as_str()) {
            steps.push(Step::MaskField {
                field: *field,
                masked: field.mask(value),
            });
        }
    }
    steps.push(Step::MaskingDecision {
        fields: masked_fields,
    });
    steps.push(Step::Response {
        payload: apply_masks(&raw, &outcome.stage3),
        masked: masked_fields,
    });
}

/// Replaces every field listed in the verdict with its masked value.
fn apply_masks(raw: &ResponsePayload, verdict: &MaskingVerdict) -> ResponsePayload {
    let masked = verdict.masked_fields();
    ResponsePayload {
        fields: raw
            .fields
            .iter()
            .map(|entry| match entry.sensitive() {
                Some(field) if masked.contains(&field) => ResponseField {
                    name: entry.name.clone(),
                    value: field.mask(&entry.value),
                },
                _ => entry.clone(),
            })
            .collect(),
    }
}

// ============================================================================
// SECTION: Readable Rendering
// ============================================================================

/// Returns the display title of a gate.
const fn gate_title(stage: u8) -> &'static str {
    match stage {
        1 => "Tool Discovery Filter",
        2 => "Execution Authorization",
        _ => "Response Masking",
    }
}

/// Returns the scope label, or `unrestricted`.
fn scope_label(scope: Option<PermissionScope>) -> &'static str {
    scope.map_or("unrestricted", PermissionScope::as_str)
}

/// Renders a JSON value the way response lines show it.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Appends the readable lines for one step.
fn render_readable(step: &Step<'_>, lines: &mut Vec<Line>) {
    match step {
        Step::Request {
            role,
            query,
        } => lines.push(
            step.line(format!("> {} ({}): \"{query}\"", role.name, role.employee_id)).slow(),
        ),
        Step::ToolSelected {
            scenario,
            server,
        } => {
            let server = server.map_or("unknown server", |server| server.name.as_str());
            lines.push(
                step.line(format!("Agent selected {} on {server}", scenario.tool))
                    .with_highlight(scenario.tool.as_str()),
            );
        }
        Step::Authenticated {
            role,
        } => lines.push(step.line(format!(
            "Identity resolved: {} @ {}, {} clearance",
            role.id,
            role.branch,
            role.clearance.as_str()
        ))),
        Step::GateStart {
            stage,
        } => {
            lines.push(Line::blank());
            lines.push(step.line(format!("Gate {stage}: {}", gate_title(*stage))));
        }
        Step::ToolFilter {
            original,
            visible,
        } => {
            let highlight = format!("{visible} visible");
            lines.push(
                step.line(format!("tools/list: {original} tools -> {highlight}"))
                    .with_highlight(highlight),
            );
        }
        Step::DiscoveryDecision {
            verdict,
            scenario,
        } => {
            let text = match verdict {
                DiscoveryVerdict::Permit => format!("{} visible to agent", scenario.tool),
                DiscoveryVerdict::Deny => format!("{} hidden from agent", scenario.tool),
            };
            lines.push(step.line(text));
        }
        Step::ExecutionScope {
            scope,
        } => lines.push(step.line(format!("Permission scope: {}", scope_label(*scope)))),
        Step::AgentCheck(check) => {
            let suffix = if check.requires_confirmation { " (human confirmation required)" } else { "" };
            lines.push(step.line(format!("Agent check: {}{suffix}", check.reason)));
        }
        Step::DenyReason {
            stage,
            denial,
        } => {
            lines.push(
                step.line(format!("Denied: {} [policy: {}]", denial.reason, denial.policy))
                    .with_highlight(denial.policy.as_str())
                    .slow(),
            );
            if let Some(suggestion) = &denial.suggestion {
                lines.push(
                    Line::new(LineKind::Detail, format!("Suggestion: {suggestion}"))
                        .with_stage(*stage),
                );
            }
        }
        Step::ExecutionDecision {
            verdict,
        } => {
            let text = match verdict {
                ExecutionVerdict::Permit => "Execution authorized",
                ExecutionVerdict::Deny => "Execution denied",
                ExecutionVerdict::Skip => "Execution not evaluated",
            };
            lines.push(step.line(text));
        }
        Step::MaskField {
            field,
            masked,
        } => {
            let shown = display_value(masked);
            lines.push(
                step.line(format!("{}: {shown}  ({})", field.as_str(), field.reason()))
                    .with_highlight(shown.clone())
                    .with_mask(*field, shown),
            );
        }
        Step::MaskingDecision {
            fields,
        } => {
            let text = match fields.len() {
                0 => "No restricted fields; response passed through".to_string(),
                1 => "1 field masked".to_string(),
                count => format!("{count} fields masked"),
            };
            lines.push(step.line(text));
        }
        Step::GateSkipped {
            stage,
        } => lines.push(step.line(format!("Gate {stage}: {} skipped", gate_title(*stage)))),
        Step::Response {
            payload,
            masked,
        } => {
            lines.push(Line::blank());
            lines.push(Line::new(LineKind::Context, "Response delivered to agent:"));
            for entry in &payload.fields {
                let mut line = step.line(format!("  {}: {}", entry.name, entry.value));
                if let Some(field) = entry.sensitive().filter(|field| masked.contains(field)) {
                    let shown = display_value(&entry.value);
                    line = line.with_highlight(shown.clone()).with_mask(field, shown);
                }
                lines.push(line);
            }
        }
        Step::Completed {
            result,
            denied_at,
        } => {
            lines.push(Line::blank());
            let text = match (result, denied_at) {
                (FinalResult::Success, _) => "Request complete: response delivered".to_string(),
                (FinalResult::Denied, Some(stage)) => format!("Request denied at gate {stage}"),
                (FinalResult::Denied, None) => "Request denied".to_string(),
            };
            lines.push(step.line(text));
        }
    }
}

// ============================================================================
// SECTION: Raw Rendering
// ============================================================================

/// Renders one step as a single JSON log record with sorted keys.
fn render_raw(step: &Step<'_>, seq: usize) -> Line {
    let mut record = Map::new();
    record.insert("seq".to_string(), json!(seq));
    let (_, tag, stage) = step.head();
    if let Some(tag) = tag {
        record.insert("decision".to_string(), json!(tag.label()));
    }
    if let Some(stage) = stage {
        record.insert("stage".to_string(), json!(stage));
    }
    let event = match step {
        Step::Request {
            role,
            query,
        } => {
            record.insert("role".to_string(), json!(role.id));
            record.insert("employee_id".to_string(), json!(role.employee_id));
            record.insert("query".to_string(), json!(query));
            "request"
        }
        Step::ToolSelected {
            scenario,
            server,
        } => {
            record.insert("tool".to_string(), json!(scenario.tool));
            record.insert("params".to_string(), json!(scenario.params));
            if let Some(server) = server {
                record.insert("server".to_string(), json!(server.id));
            }
            "tool_selected"
        }
        Step::Authenticated {
            role,
        } => {
            record.insert("role".to_string(), json!(role.id));
            record.insert("branch".to_string(), json!(role.branch));
            record.insert("clearance".to_string(), json!(role.clearance.as_str()));
            "authenticated"
        }
        Step::GateStart {
            stage,
        } => {
            record.insert("gate".to_string(), json!(gate_title(*stage)));
            "gate_start"
        }
        Step::ToolFilter {
            original,
            visible,
        } => {
            record.insert("original_count".to_string(), json!(original));
            record.insert("visible_count".to_string(), json!(visible));
            record.insert("removed_count".to_string(), json!(original.saturating_sub(*visible)));
            "tools_filtered"
        }
        Step::DiscoveryDecision {
            scenario,
            ..
        } => {
            record.insert("tool".to_string(), json!(scenario.tool));
            "gate_decision"
        }
        Step::ExecutionScope {
            scope,
        } => {
            record.insert("scope".to_string(), json!(scope_label(*scope)));
            "scope_check"
        }
        Step::AgentCheck(check) => {
            record.insert("requires_confirmation".to_string(), json!(check.requires_confirmation));
            record.insert("reason".to_string(), json!(check.reason));
            "agent_check"
        }
        Step::DenyReason {
            denial,
            ..
        } => {
            record.insert("reason".to_string(), json!(denial.reason));
            record.insert("policy".to_string(), json!(denial.policy));
            if let Some(suggestion) = &denial.suggestion {
                record.insert("suggestion".to_string(), json!(suggestion));
            }
            "deny"
        }
        Step::ExecutionDecision {
            ..
        } => "gate_decision",
        Step::MaskField {
            field,
            masked,
        } => {
            record.insert("field".to_string(), json!(field.as_str()));
            record.insert("masked".to_string(), masked.clone());
            record.insert("policy".to_string(), json!(POLICY_PII_MASKING));
            "mask"
        }
        Step::MaskingDecision {
            fields,
        } => {
            record.insert("masked_fields".to_string(), json!(fields));
            "gate_decision"
        }
        Step::GateSkipped {
            ..
        } => "gate_skipped",
        Step::Response {
            payload,
            ..
        } => {
            let body: Map<String, Value> = payload
                .fields
                .iter()
                .map(|entry| (entry.name.clone(), entry.value.clone()))
                .collect();
            record.insert("payload".to_string(), Value::Object(body));
            "response"
        }
        Step::Completed {
            result,
            ..
        } => {
            record.insert("result".to_string(), json!(result));
            "completed"
        }
    };
    record.insert("event".to_string(), json!(event));
    let text = Value::Object(record).to_string();
    let line = step.line(text);
    if matches!(step, Step::Request { .. } | Step::DenyReason { .. }) { line.slow() } else { line }
}
