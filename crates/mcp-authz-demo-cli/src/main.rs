// crates/mcp-authz-demo-cli/src/main.rs
// ============================================================================
// Module: MCP Authorization Demo CLI Entry Point
// Description: Command dispatcher for the scripted authorization demo.
// Purpose: Browse the demo tables and animate scripts in a terminal.
// Dependencies: clap, mcp-authz-demo-core, mcp-authz-demo-config, serde_json, thiserror, tokio.
// ============================================================================

//! ## Overview
//! The demo CLI lists roles, scenarios, and incidents, prints precomputed
//! outcomes, and plays compiled scripts with per-character timing. Ctrl-C
//! during playback skips to the end. All user-facing strings other than
//! script text are routed through the i18n catalog.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use mcp_authz_demo_cli::audit::AuditEventSink;
use mcp_authz_demo_cli::audit::audit_sink_from_config;
use mcp_authz_demo_cli::bell::TerminalBell;
use mcp_authz_demo_cli::driver::ctrl_c;
use mcp_authz_demo_cli::driver::drive;
use mcp_authz_demo_cli::preferences::FilePreferenceStore;
use mcp_authz_demo_cli::t;
use mcp_authz_demo_cli::view::TerminalView;
use mcp_authz_demo_config::DemoConfig;
use mcp_authz_demo_core::FanoutEventSink;
use mcp_authz_demo_core::NoopEventSink;
use mcp_authz_demo_core::OutputMode;
use mcp_authz_demo_core::PlaybackEngine;
use mcp_authz_demo_core::PlaybackTiming;
use mcp_authz_demo_core::PreferenceStore;
use mcp_authz_demo_core::RoleId;
use mcp_authz_demo_core::ScenarioId;
use mcp_authz_demo_core::ScenarioTable;
use mcp_authz_demo_core::ScriptKey;
use mcp_authz_demo_core::ToneEventSink;
use mcp_authz_demo_core::evaluate_tool_discovery;
use mcp_authz_demo_core::render;
use mcp_authz_demo_core::resolve_sound_enabled;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "mcp-authz-demo", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Optional config file path (defaults to mcp-authz-demo.toml or env override).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List roles with their visible tool counts.
    Roles,
    /// List scenarios with the result for every role.
    Scenarios,
    /// List incident narratives.
    Incidents,
    /// Print the precomputed outcome for a selection as JSON.
    Outcome(SelectionArgs),
    /// Print a compiled script and its canonical digest.
    Script(ScriptCommand),
    /// Animate a script in the terminal.
    Play(PlayCommand),
    /// Manage the persisted sound preference.
    Sound {
        /// Selected sound subcommand.
        #[command(subcommand)]
        command: SoundCommand,
    },
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Role and scenario selection.
#[derive(Args, Debug, Clone)]
struct SelectionArgs {
    /// Role identifier (see `roles`).
    #[arg(long, value_name = "ROLE")]
    role: String,
    /// Scenario identifier (see `scenarios`).
    #[arg(long, value_name = "SCENARIO")]
    scenario: String,
}

/// Arguments for the `script` command.
#[derive(Args, Debug)]
struct ScriptCommand {
    /// Selected role and scenario.
    #[command(flatten)]
    selection: SelectionArgs,
    /// Output mode (defaults to `output.default_mode`).
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
}

/// Arguments for the `play` command.
#[derive(Args, Debug)]
struct PlayCommand {
    /// Selected role and scenario.
    #[command(flatten)]
    selection: SelectionArgs,
    /// Output mode (defaults to `output.default_mode`).
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
    /// Reveal the whole script at once.
    #[arg(long, action = ArgAction::SetTrue)]
    quick: bool,
}

/// Sound subcommands.
#[derive(Subcommand, Debug)]
enum SoundCommand {
    /// Enable sound and persist the choice.
    On,
    /// Disable sound and persist the choice.
    Off,
    /// Show the effective sound setting.
    Status,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a demo configuration file.
    Validate,
}

/// Output mode argument.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum ModeArg {
    /// Narrated, human-readable lines.
    Readable,
    /// One JSON event per line.
    Raw,
}

impl From<ModeArg> for OutputMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Readable => Self::Readable,
            ModeArg::Raw => Self::Raw,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let config_path = cli.config.as_deref();
    match command {
        Commands::Roles => command_roles(),
        Commands::Scenarios => command_scenarios(),
        Commands::Incidents => command_incidents(),
        Commands::Outcome(selection) => command_outcome(&selection),
        Commands::Script(command) => command_script(config_path, &command),
        Commands::Play(command) => command_play(config_path, &command).await,
        Commands::Sound {
            command,
        } => command_sound(config_path, &command),
        Commands::Config {
            command,
        } => command_config(config_path, &command),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Listing Commands
// ============================================================================

/// Lists roles with the tool counts gate 1 leaves visible.
fn command_roles() -> CliResult<ExitCode> {
    let table = ScenarioTable::builtin();
    for role in &table.catalog.roles {
        let report = evaluate_tool_discovery(&table.catalog, role);
        write_stdout_line(&t!(
            "roles.line",
            id = role.id,
            name = role.name,
            branch = role.branch,
            clearance = role.clearance.as_str(),
            visible = report.visible_count(),
            total = report.original_count,
        ))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Lists scenarios and the result each role reaches.
fn command_scenarios() -> CliResult<ExitCode> {
    let table = ScenarioTable::builtin();
    for scenario in &table.scenarios {
        write_stdout_line(&t!(
            "scenarios.line",
            id = scenario.id,
            name = scenario.name,
            query = scenario.query,
        ))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        for role in &table.catalog.roles {
            let Some(outcome) = scenario.outcome(&role.id) else {
                continue;
            };
            let line = match outcome.denied_at() {
                Some(gate) => t!("scenarios.outcome.denied", role = role.id, gate = gate),
                None => t!("scenarios.outcome.success", role = role.id),
            };
            write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Lists incident narratives.
fn command_incidents() -> CliResult<ExitCode> {
    let table = ScenarioTable::builtin();
    for incident in &table.catalog.incidents {
        let mut lines = vec![t!(
            "incidents.line",
            id = incident.id,
            name = incident.name,
            company = incident.company,
            date = incident.date,
            severity = incident.severity.as_str(),
            gate = incident.gate,
        )];
        if let Some(cve) = &incident.cve {
            lines.push(t!("incidents.cve", cve = cve));
        }
        lines.push(t!("incidents.without", text = incident.without_proxy));
        lines.push(t!("incidents.with", text = incident.with_proxy));
        for line in lines {
            write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Prints the outcome for a selection as pretty JSON.
fn command_outcome(selection: &SelectionArgs) -> CliResult<ExitCode> {
    let table = ScenarioTable::builtin();
    let (role, scenario) = resolve_selection(&table, selection)?;
    let outcome = table.outcome(&role, &scenario).ok_or_else(|| {
        CliError::new(t!("selection.no_script", role = role, scenario = scenario))
    })?;
    let json = serde_json::to_string_pretty(outcome)
        .map_err(|err| CliError::new(t!("outcome.serialize_failed", error = err)))?;
    write_stdout_line(&json).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Script and Playback Commands
// ============================================================================

/// Prints every line of a compiled script followed by its digest.
fn command_script(config_path: Option<&Path>, command: &ScriptCommand) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let table = Arc::new(ScenarioTable::builtin());
    let key = resolve_key(&table, &command.selection, command.mode, &config)?;
    let mut engine = PlaybackEngine::new(table, PlaybackTiming::default(), NoopEventSink);
    if !engine.configure(key.clone()) {
        return Err(no_script(&key));
    }
    engine.quick_run().map_err(|err| CliError::new(t!("play.start_failed", error = err)))?;
    for line in render(&engine.snapshot()) {
        write_stdout_line(&line.text).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    let digest = engine
        .script()
        .ok_or_else(|| no_script(&key))?
        .digest()
        .map_err(|err| CliError::new(t!("script.digest_failed", error = err)))?;
    write_stdout_line(&t!("script.digest", digest = digest))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Animates a script, honoring Ctrl-C as skip.
async fn command_play(config_path: Option<&Path>, command: &PlayCommand) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let table = Arc::new(ScenarioTable::builtin());
    let key = resolve_key(&table, &command.selection, command.mode, &config)?;

    let audit = audit_sink_from_config(&config.audit).map_err(|err| {
        CliError::new(t!(
            "audit.open_failed",
            path = config.audit.path.as_deref().unwrap_or_default(),
            error = err
        ))
    })?;
    let store = FilePreferenceStore::from_config(config.sound.preference_path.as_deref());
    let sound_enabled = resolve_sound_enabled(&store, config.sound.default_enabled);
    let sink = FanoutEventSink::new()
        .with(Arc::new(AuditEventSink::new(audit, key.clone())))
        .with(Arc::new(ToneEventSink::new(TerminalBell::stderr(), sound_enabled)));

    let mut engine = PlaybackEngine::new(table, config.playback.to_timing(), sink);
    if !engine.configure(key.clone()) {
        return Err(no_script(&key));
    }
    write_stdout_line(&t!("play.header", role = key.role, scenario = key.scenario, mode = key.mode))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;

    let mut view = TerminalView::new();
    let mut stdout = io::stdout();
    if command.quick {
        engine.quick_run().map_err(|err| CliError::new(t!("play.start_failed", error = err)))?;
        view.update(&render(&engine.snapshot()), &mut stdout)
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let first = engine.start().map_err(|err| CliError::new(t!("play.start_failed", error = err)))?;
    let mut hinted = false;
    let summary = drive(&mut engine, first, ctrl_c(), |engine| {
        view.update(&render(&engine.snapshot()), &mut stdout)?;
        if !hinted && engine.can_skip() && view.at_line_start() {
            hinted = true;
            write_stderr_line(&t!("play.skip_hint"))?;
        }
        Ok(())
    })
    .await
    .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    if summary.interrupted {
        write_stderr_line(&t!("play.skipped"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Sound Commands
// ============================================================================

/// Stores or reports the sound preference.
fn command_sound(config_path: Option<&Path>, command: &SoundCommand) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let store = FilePreferenceStore::from_config(config.sound.preference_path.as_deref());
    match command {
        SoundCommand::On | SoundCommand::Off => {
            let enabled = matches!(command, SoundCommand::On);
            store
                .save_sound_enabled(enabled)
                .map_err(|err| CliError::new(t!("sound.save_failed", error = err)))?;
            write_stdout_line(&t!("sound.saved", state = sound_state(enabled)))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
        SoundCommand::Status => {
            let stored = store
                .load_sound_enabled()
                .map_err(|err| CliError::new(t!("sound.load_failed", error = err)))?;
            let (enabled, source) = match stored {
                Some(enabled) => {
                    (enabled, t!("sound.source.stored", path = store.path().display()))
                }
                None => (config.sound.default_enabled, t!("sound.source.default")),
            };
            write_stdout_line(&t!("sound.status", state = sound_state(enabled), source = source))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Localized on/off label.
fn sound_state(enabled: bool) -> String {
    if enabled { t!("sound.state.on") } else { t!("sound.state.off") }
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Executes the config validation command.
fn command_config(config_path: Option<&Path>, command: &ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate => {
            let config = load_config(config_path)?;
            write_stdout_line(&t!("config.validate.ok"))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            let source = config.source.as_ref().map_or_else(
                || t!("config.validate.defaults"),
                |path| t!("config.validate.source", path = path.display()),
            );
            write_stdout_line(&source).map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads and validates configuration.
fn load_config(path: Option<&Path>) -> CliResult<DemoConfig> {
    DemoConfig::load(path).map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

/// Checks both identifiers against the table.
fn resolve_selection(
    table: &ScenarioTable,
    selection: &SelectionArgs,
) -> CliResult<(RoleId, ScenarioId)> {
    let role = RoleId::new(selection.role.trim());
    let scenario = ScenarioId::new(selection.scenario.trim());
    if table.role(&role).is_none() {
        return Err(CliError::new(t!("selection.unknown_role", role = role)));
    }
    if table.scenario(&scenario).is_none() {
        return Err(CliError::new(t!("selection.unknown_scenario", scenario = scenario)));
    }
    Ok((role, scenario))
}

/// Builds a script key, falling back to the configured output mode.
fn resolve_key(
    table: &ScenarioTable,
    selection: &SelectionArgs,
    mode: Option<ModeArg>,
    config: &DemoConfig,
) -> CliResult<ScriptKey> {
    let (role, scenario) = resolve_selection(table, selection)?;
    let mode = mode.map_or(config.output.default_mode, OutputMode::from);
    Ok(ScriptKey::new(role, scenario, mode))
}

/// Error for a selection without a script.
fn no_script(key: &ScriptKey) -> CliError {
    CliError::new(t!("selection.no_script", role = key.role, scenario = key.scenario))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> io::Result<()> {
    let mut stderr = io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
