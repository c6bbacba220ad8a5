// crates/hub-cli/src/main.rs
// ============================================================================
// Module: Widget Hub CLI Entry Point
// Description: Command dispatcher for dashboard, polling, mutation, and reveal.
// Purpose: Give operators a scriptable front-end over the widget data layer.
// Dependencies: clap, hub-config, hub-core, hub-providers, hub-reveal, tokio
// ============================================================================

//! ## Overview
//! `hub` resolves a user's dashboard, watches widget pollers, issues widget
//! mutations, and runs the reveal engine. Every command writes JSON to
//! stdout; operator events go to the configured log sink and failures are
//! reported on stderr with a non-zero exit code.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod wiring;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use hub_config::HubConfig;
use hub_core::Clock;
use hub_core::DashboardView;
use hub_core::GridRect;
use hub_core::InstanceId;
use hub_core::ListResolution;
use hub_core::OwnerId;
use hub_core::SeedOutcome;
use hub_core::SystemClock;
use hub_core::WidgetKind;
use hub_providers::CreateWidgetRequest;
use hub_providers::DEFAULT_GRID;
use hub_providers::PollState;
use hub_providers::UpdateWidgetRequest;
use hub_providers::WidgetPollers;
use hub_reveal::RevealController;
use hub_reveal::RevealGeometry;
use hub_reveal::builtin_cases;
use hub_reveal::find_case;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::wiring::HubRuntime;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Longest `watch` duration accepted.
const MAX_WATCH_SECONDS: u64 = 24 * 60 * 60;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "hub", version, disable_help_subcommand = true)]
struct Cli {
    /// Configuration file (overrides `HUB_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve and classify a user's dashboard, seeding the cache when live.
    Dashboard(OwnerArgs),
    /// Resolve a dashboard, then print widget poller state changes.
    Watch(WatchCommand),
    /// Create, update, or delete widgets.
    Widget {
        /// Selected widget subcommand.
        #[command(subcommand)]
        command: WidgetCommand,
    },
    /// Run one reveal spin.
    Spin(SpinCommand),
    /// List the built-in reveal cases.
    Cases,
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Owner selection.
#[derive(Args, Debug)]
struct OwnerArgs {
    /// Owner whose dashboard is resolved.
    #[arg(long, value_name = "ID")]
    owner: String,
}

/// Arguments for `watch`.
#[derive(Args, Debug)]
struct WatchCommand {
    /// Owner selection.
    #[command(flatten)]
    owner: OwnerArgs,
    /// How long to watch before exiting.
    #[arg(long, value_name = "N", default_value_t = 60)]
    seconds: u64,
}

/// Widget mutation subcommands.
#[derive(Subcommand, Debug)]
enum WidgetCommand {
    /// Create a widget.
    Create(WidgetCreateCommand),
    /// Update a widget's title or settings.
    Update(WidgetUpdateCommand),
    /// Delete a widget.
    Delete(WidgetTargetArgs),
}

/// Arguments for `widget create`.
#[derive(Args, Debug)]
struct WidgetCreateCommand {
    /// Display title.
    #[arg(long)]
    title: String,
    /// Widget kind label.
    #[arg(long, value_parser = parse_kind)]
    kind: WidgetKind,
    /// Settings as a JSON object.
    #[arg(long, value_name = "JSON", value_parser = parse_settings)]
    settings: Option<Value>,
    /// Grid placement as `x,y,w,h`.
    #[arg(long, value_name = "X,Y,W,H", value_parser = parse_grid)]
    grid: Option<GridRect>,
}

/// Arguments for `widget update`.
#[derive(Args, Debug)]
struct WidgetUpdateCommand {
    /// Target widget.
    #[command(flatten)]
    target: WidgetTargetArgs,
    /// New display title.
    #[arg(long)]
    title: Option<String>,
    /// Settings to merge, as a JSON object.
    #[arg(long, value_name = "JSON", value_parser = parse_settings)]
    settings: Option<Value>,
}

/// Widget selection.
#[derive(Args, Debug)]
struct WidgetTargetArgs {
    /// Instance identifier of the widget.
    #[arg(long, value_name = "ID")]
    instance: String,
}

/// Arguments for `spin`.
#[derive(Args, Debug)]
struct SpinCommand {
    /// Case identifier.
    #[arg(long = "case", value_name = "ID")]
    case_id: String,
    /// Seed for a reproducible spin.
    #[arg(long)]
    seed: Option<u64>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate the configuration.
    Check,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
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
    let config = cli.config.as_deref();
    match cli.command {
        Commands::Dashboard(owner) => command_dashboard(config, &owner).await,
        Commands::Watch(command) => command_watch(config, &command).await,
        Commands::Widget {
            command,
        } => command_widget(config, command).await,
        Commands::Spin(command) => command_spin(config, &command),
        Commands::Cases => command_cases(),
        Commands::Config {
            command: ConfigCommand::Check,
        } => command_config_check(config),
    }
}

/// Loads configuration and builds the runtime.
fn load_runtime(config: Option<&Path>) -> CliResult<HubRuntime> {
    let config = HubConfig::load(config)
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    HubRuntime::new(config).map_err(CliError::new)
}

/// Parses a non-blank owner identifier.
fn parse_owner(raw: &str) -> CliResult<OwnerId> {
    let owner = OwnerId::new(raw.trim());
    if owner.is_blank() {
        return Err(CliError::new("owner must not be blank".to_string()));
    }
    Ok(owner)
}

// ============================================================================
// SECTION: Dashboard Commands
// ============================================================================

/// Resolution summary written by `dashboard` and `watch`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardSummary<'a> {
    /// Owner resolved.
    owner: &'a str,
    /// Classified dashboard state.
    view: DashboardView,
    /// Number of widgets resolved.
    widget_count: usize,
    /// Failure message, shown only in development.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    /// Whether cached data is served.
    stale: bool,
    /// Whether the backend was classified unreachable.
    offline: bool,
    /// Cache seeding outcome.
    seed: &'static str,
}

/// Resolves, classifies, and seeds one dashboard.
async fn resolve_dashboard(
    runtime: &HubRuntime,
    owner: &OwnerId,
) -> CliResult<(ListResolution, DashboardView, &'static str)> {
    let cache = runtime.snapshot_cache().map_err(CliError::new)?;
    let resolution = runtime.resolver(cache.clone()).resolve(Some(owner)).await;
    let view = DashboardView::classify(&resolution, runtime.config.profile);
    let seed = if matches!(view, DashboardView::Grid { .. }) {
        seed_label(runtime.seeder(cache).seed(&resolution, Some(owner)))
    } else {
        "skipped"
    };
    Ok((resolution, view, seed))
}

/// Builds the printed summary for a resolution.
fn dashboard_summary<'a>(
    runtime: &HubRuntime,
    owner: &'a OwnerId,
    resolution: &'a ListResolution,
    view: DashboardView,
    seed: &'static str,
) -> DashboardSummary<'a> {
    DashboardSummary {
        owner: owner.as_str(),
        view,
        widget_count: resolution.widgets().len(),
        error: resolution.error().filter(|_| runtime.config.profile.is_development()),
        stale: resolution.is_stale(),
        offline: resolution.is_offline(),
        seed,
    }
}

/// Executes `dashboard`.
async fn command_dashboard(config: Option<&Path>, args: &OwnerArgs) -> CliResult<ExitCode> {
    let runtime = load_runtime(config)?;
    let owner = parse_owner(&args.owner)?;
    let (resolution, view, seed) = resolve_dashboard(&runtime, &owner).await?;
    write_json(&dashboard_summary(&runtime, &owner, &resolution, view, seed))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `watch`.
async fn command_watch(config: Option<&Path>, command: &WatchCommand) -> CliResult<ExitCode> {
    if command.seconds > MAX_WATCH_SECONDS {
        return Err(CliError::new(format!("--seconds must be at most {MAX_WATCH_SECONDS}")));
    }
    let runtime = load_runtime(config)?;
    let owner = parse_owner(&command.owner.owner)?;
    let (resolution, view, seed) = resolve_dashboard(&runtime, &owner).await?;
    write_json(&dashboard_summary(&runtime, &owner, &resolution, view, seed))?;

    let mut pollers =
        WidgetPollers::new(Arc::new(runtime.registry())).with_log_sink(Arc::clone(&runtime.log));
    pollers.sync(resolution.widgets());

    let (tx, mut rx) = mpsc::unbounded_channel::<(String, PollState)>();
    for (_, handle) in pollers.iter() {
        write_json(&poll_line(handle.widget_key(), &handle.state()))?;
        let key = handle.widget_key().to_string();
        let mut states = handle.subscribe();
        let tx = tx.clone();
        tokio::spawn(async move {
            while states.changed().await.is_ok() {
                let state = states.borrow_and_update().clone();
                if tx.send((key.clone(), state)).is_err() {
                    return;
                }
            }
        });
    }
    drop(tx);

    let deadline = tokio::time::sleep(Duration::from_secs(command.seconds));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            () = &mut deadline => break,
            message = rx.recv() => match message {
                Some((key, state)) => write_json(&poll_line(&key, &state))?,
                None => {
                    (&mut deadline).await;
                    break;
                }
            },
        }
    }
    pollers.shutdown();
    Ok(ExitCode::SUCCESS)
}

/// Builds one poller output line.
fn poll_line(widget_key: &str, state: &PollState) -> Value {
    json!({ "widget": widget_key, "poll": state })
}

/// Returns the printed label of a seed outcome.
const fn seed_label(outcome: SeedOutcome) -> &'static str {
    match outcome {
        SeedOutcome::Written(_) => "written",
        SeedOutcome::NotFresh => "not_fresh",
        SeedOutcome::NoRows => "no_rows",
        SeedOutcome::NoOwner => "no_owner",
        SeedOutcome::AlreadySeeded => "already_seeded",
        SeedOutcome::WriteFailed => "write_failed",
    }
}

// ============================================================================
// SECTION: Widget Commands
// ============================================================================

/// Executes widget mutation subcommands.
async fn command_widget(config: Option<&Path>, command: WidgetCommand) -> CliResult<ExitCode> {
    let runtime = load_runtime(config)?;
    let client = runtime.mutation_client();
    match command {
        WidgetCommand::Create(command) => {
            let request = CreateWidgetRequest {
                title: command.title,
                kind: command.kind,
                settings: command.settings.unwrap_or_else(|| json!({})),
                grid: command.grid.unwrap_or(DEFAULT_GRID),
            };
            let row = client
                .create(&request)
                .await
                .map_err(|err| CliError::new(format!("widget create failed: {err}")))?;
            write_json(&row)?;
        }
        WidgetCommand::Update(command) => {
            let request = UpdateWidgetRequest {
                title: command.title,
                settings: command.settings,
            };
            let row = client
                .update(&InstanceId::new(command.target.instance), &request)
                .await
                .map_err(|err| CliError::new(format!("widget update failed: {err}")))?;
            write_json(&row)?;
        }
        WidgetCommand::Delete(target) => {
            let instance_id = InstanceId::new(target.instance);
            client
                .delete(&instance_id)
                .await
                .map_err(|err| CliError::new(format!("widget delete failed: {err}")))?;
            write_json(&json!({ "deleted": instance_id }))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Parses a widget kind label.
fn parse_kind(raw: &str) -> Result<WidgetKind, String> {
    WidgetKind::parse(raw).ok_or_else(|| {
        let known: Vec<&str> = WidgetKind::ALL.iter().map(|kind| kind.as_str()).collect();
        format!("unknown widget kind {raw}; expected one of {}", known.join(", "))
    })
}

/// Parses a settings JSON object.
fn parse_settings(raw: &str) -> Result<Value, String> {
    let value: Value =
        serde_json::from_str(raw).map_err(|err| format!("settings must be JSON: {err}"))?;
    if value.is_object() { Ok(value) } else { Err("settings must be a JSON object".to_string()) }
}

/// Parses `x,y,w,h` grid placement.
fn parse_grid(raw: &str) -> Result<GridRect, String> {
    let parts = raw
        .split(',')
        .map(|part| part.trim().parse::<i64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| format!("grid must be four integers: {err}"))?;
    let &[x, y, w, h] = parts.as_slice() else {
        return Err("grid must be four integers: x,y,w,h".to_string());
    };
    if x < 0 || y < 0 || w < 1 || h < 1 {
        return Err("grid offsets must be >= 0 and sizes >= 1".to_string());
    }
    Ok(GridRect {
        x,
        y,
        w,
        h,
    })
}

// ============================================================================
// SECTION: Reveal Commands
// ============================================================================

/// Executes `spin`.
fn command_spin(config: Option<&Path>, command: &SpinCommand) -> CliResult<ExitCode> {
    let geometry = match config {
        Some(path) => load_runtime(Some(path))?.reveal_geometry(),
        None => RevealGeometry::default(),
    };
    let case = find_case(&command.case_id)
        .ok_or_else(|| CliError::new(format!("unknown case: {}", command.case_id)))?;
    let rng = command.seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
    let mut controller = RevealController::new(case.items, geometry, rng);

    let now_ms = SystemClock.now_ms();
    let plan = controller
        .spin(now_ms)
        .ok_or_else(|| CliError::new(format!("case {} has no items", case.id)))?;
    controller.tick(now_ms);
    controller.tick(now_ms);
    controller.tick(plan.settles_at_ms);

    let strip: Vec<&str> = controller.display_strip().iter().map(|item| item.name.as_str()).collect();
    write_json(&json!({
        "case": case.id,
        "winner": plan.winner,
        "chosenIndex": plan.chosen_index,
        "finalOffsetPx": plan.final_offset_px,
        "strip": strip,
        "state": controller.state(),
    }))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `cases`.
fn command_cases() -> CliResult<ExitCode> {
    let cases: Vec<Value> = builtin_cases()
        .into_iter()
        .map(|case| json!({ "id": case.id, "label": case.label, "items": case.items.len() }))
        .collect();
    write_json(&cases)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Executes `config check`.
fn command_config_check(config: Option<&Path>) -> CliResult<ExitCode> {
    let runtime = load_runtime(config)?;
    write_json(&json!({
        "status": "ok",
        "profile": runtime.config.profile,
        "backend": runtime.client.base_url().as_str(),
        "cache": runtime.config.cache.path,
    }))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Writes a value as one JSON line to stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let line = serde_json::to_string(value)
        .map_err(|err| CliError::new(format!("failed to encode output: {err}")))?;
    write_stdout_line(&line)
        .map_err(|err| CliError::new(format!("failed to write stdout: {err}")))
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
