// crates/aird-cli/src/main.rs
// ============================================================================
// Module: AIRD CLI Entry Point
// Description: Command dispatcher for the assessment engine.
// Purpose: Expose assess, discovery, history, and variant workflows.
// Dependencies: clap, aird-core, aird-pipeline, aird-platform, aird-store-sqlite
// ============================================================================

//! ## Overview
//! The `aird` binary wires the assessment pipeline to the command line:
//! `assess`, `discover`, `run`, `report`, `save`, `history`, `diff`,
//! `suites`, `requirements`, `compare`, `rerun`, `benchmark`, `init`, and
//! `fix`. Machine-readable output always goes to stdout; human rendering,
//! diagnostics, and progress go to stderr. Exit codes: 0 success, 2 usage
//! error, 1 runtime error.
//!
//! Security posture: connection strings may carry credentials; they are
//! fingerprinted before anything reaches the history store or a rendering.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod output;
mod render;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::IsTerminal;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use aird_core::CancellationToken;
use aird_core::Factor;
use aird_core::Report;
use aird_core::ReportInputs;
use aird_core::RunOutcome;
use aird_core::TestResult;
use aird_core::WorkloadLevel;
use aird_core::build_report;
use aird_pipeline::AssessConfig;
use aird_pipeline::AssessOutcome;
use aird_pipeline::BenchmarkOptions;
use aird_pipeline::Pipeline;
use aird_pipeline::PipelineError;
use aird_pipeline::StoreAuditSink;
use aird_pipeline::benchmark::run_benchmark;
use aird_pipeline::compare::parse_table_names;
use aird_pipeline::compare::run_compare;
use aird_pipeline::discover;
use aird_pipeline::generate_fix_suggestions;
use aird_pipeline::rerun::run_rerun;
use aird_pipeline::runner::RunOptions;
use aird_pipeline::runner::run_tests;
use aird_store_sqlite::AssessmentFilter;
use aird_store_sqlite::HistoryStore;
use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use thiserror::Error;

use crate::output::OutputTarget;
use crate::output::write_stderr_line;
use crate::output::write_stdout_line;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Env var selecting the default output format.
const ENV_OUTPUT: &str = "AIRD_OUTPUT";
/// Env var selecting the default log level.
const ENV_LOG_LEVEL: &str = "AIRD_LOG_LEVEL";
/// Length of a UUID string, used to tell ids from paths in `diff`.
const UUID_LENGTH: usize = 36;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "aird", about = "AI-Ready Data assessment CLI", version)]
struct Cli {
    /// Log level for stderr diagnostics (error, warn, info, debug, trace).
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,
    /// History store path (defaults to ~/.aird/assessments.db).
    #[arg(long, global = true, value_name = "PATH")]
    db_path: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Full pipeline: discover, run, report, save.
    Assess(AssessCommand),
    /// Connect and output the catalog inventory.
    Discover(DiscoverCommand),
    /// Run tests from a previously saved inventory.
    Run(RunCommand),
    /// Build a report from results or load a saved one by id.
    Report(ReportCommand),
    /// Persist a report to history.
    Save(SaveCommand),
    /// List saved assessments.
    History(HistoryCommand),
    /// Compare two saved reports.
    Diff(DiffCommand),
    /// List registered test suites.
    Suites,
    /// List registered requirements and default thresholds.
    Requirements,
    /// Assess two tables side by side.
    Compare(CompareCommand),
    /// Re-run failed tests from a saved assessment.
    Rerun(RerunCommand),
    /// Assess multiple connections and rank them.
    Benchmark(BenchmarkCommand),
    /// Scaffold the local state directory and a starter context file.
    Init,
    /// Generate remediation scripts from failed assessment results.
    Fix(FixCommand),
}

/// Arguments for `assess`.
#[derive(Args, Debug)]
struct AssessCommand {
    /// Connection string (or `env:VAR` to read it from the environment).
    #[arg(short = 'c', long = "connection", value_name = "URI")]
    connection: Option<String>,
    /// Schema whitelist (repeatable).
    #[arg(short = 's', long = "schema", value_name = "SCHEMA")]
    schema: Vec<String>,
    /// Table scope, bare or qualified (repeatable).
    #[arg(short = 't', long = "tables", value_name = "TABLE")]
    tables: Vec<String>,
    /// Suite name (`auto` selects the adapter default).
    #[arg(long, default_value = "auto", value_name = "SUITE")]
    suite: String,
    /// Output format: stdout | markdown | json:<path>.
    #[arg(short = 'o', long, value_name = "FORMAT")]
    output: Option<String>,
    /// Threshold override file (JSON).
    #[arg(long, value_name = "PATH")]
    thresholds: Option<PathBuf>,
    /// Context document (YAML).
    #[arg(long, value_name = "PATH")]
    context: Option<PathBuf>,
    /// Target workload level: analytics (L1), rag (L2), training (L3).
    #[arg(long, value_name = "LEVEL")]
    workload: Option<String>,
    /// Skip persisting the report.
    #[arg(long, action = ArgAction::SetTrue)]
    no_save: bool,
    /// Attach the previous assessment id for diffing.
    #[arg(long, action = ArgAction::SetTrue)]
    compare: bool,
    /// Preview the expansion without executing anything.
    #[arg(long, action = ArgAction::SetTrue)]
    dry_run: bool,
    /// Record executed SQL in the audit log.
    #[arg(long, action = ArgAction::SetTrue)]
    audit: bool,
    /// Run the question-based survey and include it in the report.
    #[arg(long, action = ArgAction::SetTrue)]
    survey: bool,
    /// Pre-filled survey answers (YAML).
    #[arg(long, value_name = "PATH")]
    survey_answers: Option<PathBuf>,
    /// Filter to a single factor (e.g. clean, contextual).
    #[arg(long, value_name = "FACTOR")]
    factor: Option<String>,
    /// Assess only the named data product from the context file.
    #[arg(long, value_name = "NAME")]
    product: Option<String>,
}

/// Arguments for `discover`.
#[derive(Args, Debug)]
struct DiscoverCommand {
    /// Connection string (or `env:VAR`).
    #[arg(short = 'c', long = "connection", value_name = "URI")]
    connection: Option<String>,
    /// Schema whitelist (repeatable).
    #[arg(short = 's', long = "schema", value_name = "SCHEMA")]
    schema: Vec<String>,
    /// Table scope (repeatable).
    #[arg(short = 't', long = "tables", value_name = "TABLE")]
    tables: Vec<String>,
    /// Output: stdout | json:<path> | <path>.
    #[arg(short = 'o', long, default_value = "stdout", value_name = "FORMAT")]
    output: String,
}

/// Arguments for `run`.
#[derive(Args, Debug)]
struct RunCommand {
    /// Connection string (or `env:VAR`).
    #[arg(short = 'c', long = "connection", value_name = "URI")]
    connection: Option<String>,
    /// Inventory JSON path (`-` reads stdin).
    #[arg(long, default_value = "-", value_name = "PATH")]
    inventory: String,
    /// Suite name (`auto` selects the adapter default).
    #[arg(long, default_value = "auto", value_name = "SUITE")]
    suite: String,
    /// Threshold override file (JSON).
    #[arg(long, value_name = "PATH")]
    thresholds: Option<PathBuf>,
    /// Results output path (defaults to stdout).
    #[arg(long, value_name = "PATH")]
    results: Option<PathBuf>,
    /// Preview the expansion without executing anything.
    #[arg(long, action = ArgAction::SetTrue)]
    dry_run: bool,
    /// Record executed SQL in the audit log.
    #[arg(long, action = ArgAction::SetTrue)]
    audit: bool,
}

/// Arguments for `report`.
#[derive(Args, Debug)]
struct ReportCommand {
    /// Results JSON path (`-` reads stdin).
    #[arg(long, value_name = "PATH")]
    results: Option<String>,
    /// Load a saved report by assessment id instead.
    #[arg(long, value_name = "ID")]
    id: Option<String>,
    /// Output format: stdout | markdown | json:<path>.
    #[arg(short = 'o', long, default_value = "markdown", value_name = "FORMAT")]
    output: String,
}

/// Arguments for `save`.
#[derive(Args, Debug)]
struct SaveCommand {
    /// Report JSON path (`-` reads stdin).
    #[arg(long, default_value = "-", value_name = "PATH")]
    report: String,
}

/// Arguments for `history`.
#[derive(Args, Debug)]
struct HistoryCommand {
    /// Filter by connection fingerprint.
    #[arg(long = "connection", value_name = "FINGERPRINT")]
    connection_filter: Option<String>,
    /// Filter by data product name.
    #[arg(long = "product", value_name = "NAME")]
    product_filter: Option<String>,
    /// Maximum rows listed.
    #[arg(short = 'n', long, default_value_t = 20, value_name = "LIMIT")]
    limit: usize,
}

/// Arguments for `diff`.
#[derive(Args, Debug)]
struct DiffCommand {
    /// Left assessment id (or report path).
    #[arg(value_name = "LEFT")]
    left_id: Option<String>,
    /// Right assessment id (or report path).
    #[arg(value_name = "RIGHT")]
    right_id: Option<String>,
    /// Left report path override.
    #[arg(long, value_name = "PATH")]
    left: Option<String>,
    /// Right report path override.
    #[arg(long, value_name = "PATH")]
    right: Option<String>,
}

/// Arguments for `compare`.
#[derive(Args, Debug)]
struct CompareCommand {
    /// Connection string (or `env:VAR`).
    #[arg(short = 'c', long = "connection", value_name = "URI")]
    connection: Option<String>,
    /// Comma-separated table names to compare (e.g. main.t1,main.t2).
    #[arg(long, value_name = "TABLES")]
    tables: Vec<String>,
    /// Suite name (`auto` selects the adapter default).
    #[arg(long, default_value = "auto", value_name = "SUITE")]
    suite: String,
    /// Threshold override file (JSON).
    #[arg(long, value_name = "PATH")]
    thresholds: Option<PathBuf>,
}

/// Arguments for `rerun`.
#[derive(Args, Debug)]
struct RerunCommand {
    /// Connection string (or `env:VAR`).
    #[arg(short = 'c', long = "connection", value_name = "URI")]
    connection: Option<String>,
    /// Assessment id to re-run (defaults to the most recent).
    #[arg(long, value_name = "ID")]
    id: Option<String>,
    /// Threshold override file (JSON).
    #[arg(long, value_name = "PATH")]
    thresholds: Option<PathBuf>,
}

/// Arguments for `benchmark`.
#[derive(Args, Debug)]
struct BenchmarkCommand {
    /// Connection string (repeatable; at least 2 required).
    #[arg(short = 'c', long = "connection", value_name = "URI")]
    connection: Vec<String>,
    /// Labels per connection (comma-separated; padded when missing).
    #[arg(long, value_name = "LABELS")]
    label: Vec<String>,
    /// Suite name (`auto` selects each adapter's default).
    #[arg(long, default_value = "auto", value_name = "SUITE")]
    suite: String,
    /// Filter to a single factor.
    #[arg(long, value_name = "FACTOR")]
    factor: Option<String>,
    /// Threshold override file (JSON).
    #[arg(long, value_name = "PATH")]
    thresholds: Option<PathBuf>,
    /// Persist each report plus a benchmark group record.
    #[arg(long, action = ArgAction::SetTrue)]
    save: bool,
    /// List previous benchmark runs instead of assessing.
    #[arg(long, action = ArgAction::SetTrue)]
    list: bool,
}

/// Arguments for `fix`.
#[derive(Args, Debug)]
struct FixCommand {
    /// Assessment id (defaults to the most recent).
    #[arg(long, value_name = "ID")]
    id: Option<String>,
    /// Print suggestions without writing files.
    #[arg(long, action = ArgAction::SetTrue)]
    dry_run: bool,
    /// Directory for generated remediation scripts.
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    output_dir: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error carrying the exit code class.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
    /// Exit code (2 usage, 1 runtime).
    exit: u8,
}

impl CliError {
    /// Builds a usage error (exit code 2).
    fn usage(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit: 2,
        }
    }

    /// Builds a runtime error (exit code 1).
    fn runtime(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit: 1,
        }
    }
}

impl From<PipelineError> for CliError {
    fn from(error: PipelineError) -> Self {
        if error.is_usage() {
            Self::usage(error.to_string())
        } else {
            Self::runtime(error.to_string())
        }
    }
}

impl From<aird_store_sqlite::StoreError> for CliError {
    fn from(error: aird_store_sqlite::StoreError) -> Self {
        Self::runtime(error.to_string())
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());
    match dispatch(cli) {
        Ok(code) => code,
        Err(err) => {
            let _ = write_stderr_line(&format!("error: {err}"));
            ExitCode::from(err.exit)
        }
    }
}

/// Initialises stderr logging from the flag or `AIRD_LOG_LEVEL`.
fn init_logging(flag: Option<&str>) {
    let level = flag
        .map(str::to_string)
        .or_else(|| std::env::var(ENV_LOG_LEVEL).ok())
        .unwrap_or_else(|| "warn".to_string());
    let filter = tracing_subscriber::EnvFilter::try_new(level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}

/// Routes the parsed command to its handler.
fn dispatch(cli: Cli) -> CliResult<ExitCode> {
    let db_path = cli.db_path;
    match cli.command {
        Commands::Assess(command) => command_assess(command, db_path.as_deref()),
        Commands::Discover(command) => command_discover(command),
        Commands::Run(command) => command_run(command, db_path.as_deref()),
        Commands::Report(command) => command_report(command, db_path.as_deref()),
        Commands::Save(command) => command_save(&command, db_path.as_deref()),
        Commands::History(command) => command_history(&command, db_path.as_deref()),
        Commands::Diff(command) => command_diff(command, db_path.as_deref()),
        Commands::Suites => command_suites(),
        Commands::Requirements => command_requirements(),
        Commands::Compare(command) => command_compare(command, db_path.as_deref()),
        Commands::Rerun(command) => command_rerun(command, db_path.as_deref()),
        Commands::Benchmark(command) => command_benchmark(command, db_path.as_deref()),
        Commands::Init => command_init(db_path.as_deref()),
        Commands::Fix(command) => command_fix(command, db_path.as_deref()),
    }
}

// ============================================================================
// SECTION: Shared Helpers
// ============================================================================

/// Expands an `env:VAR` connection argument from the environment.
fn resolve_connection_arg(raw: Option<String>) -> Option<String> {
    let raw = raw?;
    let trimmed = raw.trim();
    if let Some(prefix) = trimmed.get(.. 4)
        && prefix.eq_ignore_ascii_case("env:")
    {
        let var_name = trimmed.get(4 ..).unwrap_or_default().trim();
        return std::env::var(var_name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
    }
    Some(trimmed.to_string())
}

/// Fails with a usage error when a flag references a missing file.
fn require_file(path: Option<&Path>, flag: &str) -> CliResult<()> {
    if let Some(path) = path
        && !path.exists()
    {
        return Err(CliError::usage(format!("file not found for {flag}: {}", path.display())));
    }
    Ok(())
}

/// Parses a `--factor` argument.
fn parse_factor(raw: Option<&str>) -> CliResult<Option<Factor>> {
    raw.map(|key| {
        Factor::from_key(key)
            .ok_or_else(|| CliError::usage(format!("unknown factor: {key}")))
    })
    .transpose()
}

/// Parses a `--workload` argument.
fn parse_workload(raw: Option<&str>) -> CliResult<Option<WorkloadLevel>> {
    raw.map(|value| {
        WorkloadLevel::parse(value).ok_or_else(|| {
            CliError::usage(format!(
                "invalid workload: {value} (expected analytics, rag, or training)"
            ))
        })
    })
    .transpose()
}

/// Resolves the effective output target.
fn output_target(flag: Option<&str>, default: &str, allow_bare_path: bool) -> OutputTarget {
    let raw = flag
        .map(str::to_string)
        .or_else(|| std::env::var(ENV_OUTPUT).ok())
        .unwrap_or_else(|| default.to_string());
    OutputTarget::parse(&raw, allow_bare_path)
}

/// Writes machine or human output for one JSON-serialisable artifact.
fn emit_json(target: &OutputTarget, value: &serde_json::Value) -> CliResult<()> {
    match target {
        OutputTarget::Stdout | OutputTarget::Markdown => {
            let compact = serde_json::to_string(value)
                .map_err(|err| CliError::runtime(err.to_string()))?;
            write_stdout_line(&compact).map_err(|err| CliError::runtime(err.to_string()))
        }
        OutputTarget::JsonFile(path) | OutputTarget::File(path) => {
            let pretty = serde_json::to_string_pretty(value)
                .map_err(|err| CliError::runtime(err.to_string()))?;
            std::fs::write(path, pretty).map_err(|err| CliError::runtime(err.to_string()))
        }
    }
}

/// Reads a whole input (`-` means stdin).
fn read_input(path: &str) -> CliResult<String> {
    if path == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|err| CliError::runtime(err.to_string()))?;
        return Ok(buffer);
    }
    std::fs::read_to_string(path)
        .map_err(|_| CliError::usage(format!("file not found: {path}")))
}

/// Opens the history store at the effective path (flag, then
/// `AIRD_DB_PATH`, then the default location).
fn open_store(db_path: Option<&Path>) -> CliResult<HistoryStore> {
    let path = db_path
        .map_or_else(|| AssessConfig::from_env().db_path, Path::to_path_buf);
    Ok(HistoryStore::open(&path)?)
}

/// Builds the base pipeline config from env plus shared flags.
fn base_config(
    connection: Option<String>,
    db_path: Option<&Path>,
    suite: &str,
    thresholds: Option<PathBuf>,
) -> AssessConfig {
    let mut config = AssessConfig::from_env();
    if let Some(connection) = resolve_connection_arg(connection) {
        config.connection = Some(connection);
    }
    if let Some(path) = db_path {
        config.db_path = path.to_path_buf();
    }
    config.suite = suite.to_string();
    if thresholds.is_some() {
        config.thresholds_path = thresholds;
    }
    config
}

// ============================================================================
// SECTION: Assess Command
// ============================================================================

/// Executes the `assess` command.
fn command_assess(command: AssessCommand, db_path: Option<&Path>) -> CliResult<ExitCode> {
    require_file(command.thresholds.as_deref(), "--thresholds")?;
    require_file(command.context.as_deref(), "--context")?;
    require_file(command.survey_answers.as_deref(), "--survey-answers")?;

    let mut config =
        base_config(command.connection, db_path, &command.suite, command.thresholds);
    config.schemas = command.schema;
    config.tables = command.tables;
    if command.context.is_some() {
        config.context_path = command.context;
    }
    config.no_save = command.no_save;
    config.compare = command.compare;
    config.dry_run = command.dry_run;
    config.audit = config.audit || command.audit;
    config.survey = command.survey;
    config.survey_answers_path = command.survey_answers;
    config.target_workload = parse_workload(command.workload.as_deref())?;
    config.factor_filter = parse_factor(command.factor.as_deref())?;
    config.product = command.product;

    let pipeline = Pipeline::new()?;
    let connection_label = config.connection.clone().unwrap_or_default();

    let show_progress = std::io::stderr().is_terminal() && !config.dry_run;
    let mut progress = |index: usize, total: usize, result: &TestResult| {
        if show_progress {
            let status = if result.l1_pass { "pass" } else { "fail" };
            let _ = write_stderr_line(&format!(
                "[{}/{}] {} ... {}",
                index + 1,
                total,
                result.test_id,
                status
            ));
        }
    };
    let outcome =
        pipeline.assess(&config, Some(&mut progress), &CancellationToken::new())?;

    let target = output_target(command.output.as_deref(), "markdown", false);
    match outcome {
        AssessOutcome::DryRun(run) => {
            if matches!(target, OutputTarget::Stdout | OutputTarget::JsonFile(_)) {
                let value = serde_json::to_value(&run)
                    .map_err(|err| CliError::runtime(err.to_string()))?;
                emit_json(&target, &value)?;
            } else {
                write_stdout_line(&render::dry_run_preview(&connection_label, &run))
                    .map_err(|err| CliError::runtime(err.to_string()))?;
            }
        }
        AssessOutcome::Report(report) => {
            emit_report(&target, &report)?;
            if let Some(previous) = &report.diff_previous_id {
                write_stdout_line(&format!("(Diff vs previous: {previous})"))
                    .map_err(|err| CliError::runtime(err.to_string()))?;
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Routes one report to its output target.
fn emit_report(target: &OutputTarget, report: &Report) -> CliResult<()> {
    match target {
        OutputTarget::Markdown => {
            let rendered = render::report_to_markdown(report);
            if std::io::stdout().is_terminal() {
                // Human rendering goes to stderr; stdout stays empty so
                // shells capturing it see machine output only.
                write_stderr_line(&rendered).map_err(|err| CliError::runtime(err.to_string()))
            } else {
                write_stdout_line(&rendered).map_err(|err| CliError::runtime(err.to_string()))
            }
        }
        OutputTarget::Stdout | OutputTarget::JsonFile(_) | OutputTarget::File(_) => {
            let value = serde_json::to_value(report)
                .map_err(|err| CliError::runtime(err.to_string()))?;
            emit_json(target, &value)
        }
    }
}

// ============================================================================
// SECTION: Discover Command
// ============================================================================

/// Executes the `discover` command.
fn command_discover(command: DiscoverCommand) -> CliResult<ExitCode> {
    let connection_string = resolve_connection_arg(command.connection)
        .or_else(|| AssessConfig::from_env().connection)
        .ok_or_else(|| {
            CliError::usage("--connection or AIRD_CONNECTION_STRING required")
        })?;
    let pipeline = Pipeline::new()?;
    let entry = pipeline.platforms().resolve(&connection_string).map_err(PipelineError::from)?;
    let adapter_name = entry.name;
    let connection =
        pipeline.platforms().connect(&connection_string).map_err(PipelineError::from)?;
    let filter = aird_core::InventoryFilter::new(command.schema, command.tables);
    let inventory =
        discover(connection.as_ref(), adapter_name, &filter).map_err(PipelineError::from)?;
    let value =
        serde_json::to_value(&inventory).map_err(|err| CliError::runtime(err.to_string()))?;
    let target = OutputTarget::parse(&command.output, true);
    emit_json(&target, &value)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Run Command
// ============================================================================

/// Executes the `run` command.
fn command_run(command: RunCommand, db_path: Option<&Path>) -> CliResult<ExitCode> {
    let config = base_config(command.connection, db_path, &command.suite, command.thresholds);
    let connection_string = config
        .connection
        .clone()
        .ok_or_else(|| CliError::usage("--connection or AIRD_CONNECTION_STRING required"))?;

    let raw = read_input(&command.inventory)?;
    let inventory: aird_core::Inventory =
        serde_json::from_str(&raw).map_err(|err| CliError::runtime(format!(
            "invalid inventory JSON: {err}"
        )))?;

    let pipeline = Pipeline::new()?;
    let suite_name = pipeline.resolve_suite_name(&config, &connection_string)?;
    let tests = pipeline.suites().resolve(&suite_name);
    let thresholds = pipeline.thresholds_for(&config);
    let connection =
        pipeline.platforms().connect(&connection_string).map_err(PipelineError::from)?;

    let audit_sink = if command.audit {
        Some(StoreAuditSink::new(open_store(Some(&config.db_path))?))
    } else {
        None
    };
    let options = RunOptions {
        dry_run: command.dry_run,
        factor_filter: None,
        audit: audit_sink.as_ref().map(|sink| sink as &dyn aird_core::AuditSink),
        cancel: CancellationToken::new(),
    };
    let outcome = run_tests(
        connection.as_ref(),
        &tests,
        &inventory,
        &thresholds,
        &options,
        None,
    )
    .map_err(PipelineError::from)?;

    let value =
        serde_json::to_value(&outcome).map_err(|err| CliError::runtime(err.to_string()))?;
    match command.results {
        Some(path) => {
            let pretty = serde_json::to_string_pretty(&value)
                .map_err(|err| CliError::runtime(err.to_string()))?;
            std::fs::write(&path, pretty)
                .map_err(|err| CliError::runtime(err.to_string()))?;
        }
        None => emit_json(&OutputTarget::Stdout, &value)?,
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Report Command
// ============================================================================

/// Executes the `report` command.
fn command_report(command: ReportCommand, db_path: Option<&Path>) -> CliResult<ExitCode> {
    let target = output_target(Some(command.output.as_str()), "markdown", false);
    if let Some(id) = &command.id {
        let store = open_store(db_path)?;
        let value = store
            .get_report(id)?
            .ok_or_else(|| CliError::runtime(format!("assessment not found: {id}")))?;
        let report: Report = serde_json::from_value(value)
            .map_err(|err| CliError::runtime(format!("malformed persisted report: {err}")))?;
        emit_report(&target, &report)?;
        return Ok(ExitCode::SUCCESS);
    }
    let Some(results_path) = &command.results else {
        return Err(CliError::usage("--results or --id required"));
    };
    let raw = read_input(results_path)?;
    let outcome: RunOutcome = serde_json::from_str(&raw)
        .map_err(|err| CliError::runtime(format!("invalid results JSON: {err}")))?;
    let report = build_report(outcome.results, ReportInputs::default());
    emit_report(&target, &report)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Save / History / Diff
// ============================================================================

/// Executes the `save` command.
fn command_save(command: &SaveCommand, db_path: Option<&Path>) -> CliResult<ExitCode> {
    let raw = read_input(&command.report)?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|err| CliError::runtime(format!("invalid report JSON: {err}")))?;
    let store = open_store(db_path)?;
    let id = store.save_assessment(&value, None)?;
    write_stdout_line(&id).map_err(|err| CliError::runtime(err.to_string()))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `history` command.
fn command_history(command: &HistoryCommand, db_path: Option<&Path>) -> CliResult<ExitCode> {
    let store = open_store(db_path)?;
    let rows = store.list_assessments(&AssessmentFilter {
        fingerprint: command.connection_filter.clone(),
        data_product: command.product_filter.clone(),
        limit: Some(command.limit),
    })?;
    for row in &rows {
        write_stdout_line(&render::history_line(row))
            .map_err(|err| CliError::runtime(err.to_string()))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `diff` command.
fn command_diff(command: DiffCommand, db_path: Option<&Path>) -> CliResult<ExitCode> {
    let left_ref = command.left.or(command.left_id);
    let right_ref = command.right.or(command.right_id);
    let (Some(left_ref), Some(right_ref)) = (left_ref, right_ref) else {
        return Err(CliError::usage(
            "diff requires two assessment ids or --left/--right paths",
        ));
    };
    let store = open_store(db_path)?;
    let left = load_report_ref(&store, &left_ref)?;
    let right = load_report_ref(&store, &right_ref)?;
    for line in render::diff_lines(&left, &right) {
        write_stdout_line(&line).map_err(|err| CliError::runtime(err.to_string()))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Loads a report by id (UUID-shaped refs) or file path.
fn load_report_ref(store: &HistoryStore, reference: &str) -> CliResult<serde_json::Value> {
    if reference.len() == UUID_LENGTH
        && let Some(report) = store.get_report(reference)?
    {
        return Ok(report);
    }
    let raw = std::fs::read_to_string(reference)
        .map_err(|_| CliError::runtime(format!("assessment not found: {reference}")))?;
    serde_json::from_str(&raw)
        .map_err(|err| CliError::runtime(format!("invalid report JSON: {err}")))
}

// ============================================================================
// SECTION: Suites / Requirements
// ============================================================================

/// Executes the `suites` command.
fn command_suites() -> CliResult<ExitCode> {
    let pipeline = Pipeline::new()?;
    for name in pipeline.suites().suite_names() {
        let count = pipeline.suites().resolve(&name).len();
        let extends = pipeline.suites().extends_of(&name);
        let line = if extends.is_empty() {
            format!("{name}\t{count} tests")
        } else {
            format!("{name}\t{count} tests  (extends: {})", extends.join(", "))
        };
        write_stdout_line(&line).map_err(|err| CliError::runtime(err.to_string()))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `requirements` command.
fn command_requirements() -> CliResult<ExitCode> {
    let pipeline = Pipeline::new()?;
    for requirement in pipeline.requirements().iter() {
        write_stdout_line(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            requirement.key,
            requirement.factor,
            requirement.direction.as_str(),
            requirement.default_thresholds.l1,
            requirement.default_thresholds.l2,
            requirement.default_thresholds.l3
        ))
        .map_err(|err| CliError::runtime(err.to_string()))?;
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Compare / Rerun / Benchmark
// ============================================================================

/// Executes the `compare` command.
fn command_compare(command: CompareCommand, db_path: Option<&Path>) -> CliResult<ExitCode> {
    require_file(command.thresholds.as_deref(), "--thresholds")?;
    let config =
        base_config(command.connection, db_path, &command.suite, command.thresholds);
    let table_names: Vec<String> = command
        .tables
        .iter()
        .flat_map(|raw| parse_table_names(raw))
        .collect();
    let pipeline = Pipeline::new()?;
    let outcome =
        run_compare(&pipeline, &config, &table_names, &CancellationToken::new())?;
    for line in render::compare_lines(&outcome) {
        write_stdout_line(&line).map_err(|err| CliError::runtime(err.to_string()))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `rerun` command.
fn command_rerun(command: RerunCommand, db_path: Option<&Path>) -> CliResult<ExitCode> {
    require_file(command.thresholds.as_deref(), "--thresholds")?;
    let config = base_config(command.connection, db_path, "auto", command.thresholds);
    let pipeline = Pipeline::new()?;
    let deltas =
        run_rerun(&pipeline, &config, command.id.as_deref(), &CancellationToken::new())?;
    if deltas.is_empty() {
        write_stdout_line("No failed tests to re-run.")
            .map_err(|err| CliError::runtime(err.to_string()))?;
        return Ok(ExitCode::SUCCESS);
    }
    for line in render::rerun_lines(&deltas) {
        write_stdout_line(&line).map_err(|err| CliError::runtime(err.to_string()))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `benchmark` command.
fn command_benchmark(command: BenchmarkCommand, db_path: Option<&Path>) -> CliResult<ExitCode> {
    if command.list {
        let store = open_store(db_path)?;
        for record in store.list_benchmarks(20)? {
            write_stdout_line(&render::benchmark_history_line(&record))
                .map_err(|err| CliError::runtime(err.to_string()))?;
        }
        return Ok(ExitCode::SUCCESS);
    }
    require_file(command.thresholds.as_deref(), "--thresholds")?;
    let mut config = base_config(None, db_path, &command.suite, command.thresholds);
    config.factor_filter = parse_factor(command.factor.as_deref())?;
    let connections: Vec<String> = command
        .connection
        .into_iter()
        .filter_map(|raw| resolve_connection_arg(Some(raw)))
        .collect();
    let options = BenchmarkOptions {
        connections,
        labels: command.label,
        save: command.save,
    };
    let pipeline = Pipeline::new()?;
    let outcome = run_benchmark(&pipeline, &config, &options, &CancellationToken::new())?;
    for line in render::benchmark_lines(&outcome) {
        write_stdout_line(&line).map_err(|err| CliError::runtime(err.to_string()))?;
    }
    if let Some(id) = &outcome.benchmark_id {
        write_stderr_line(&format!("Benchmark saved: {id}"))
            .map_err(|err| CliError::runtime(err.to_string()))?;
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Init / Fix
// ============================================================================

/// Starter context document written by `init`.
const STARTER_CONTEXT: &str = "# AIRD context file\n\
     # Narrow the assessment scope and declare data products here.\n\
     # schemas: [main]\n\
     # tables: [main.orders]\n\
     # target_level: l2\n\
     # data_products:\n\
     #   - name: orders\n\
     #     tables: [main.orders]\n";

/// Executes the `init` command.
fn command_init(db_path: Option<&Path>) -> CliResult<ExitCode> {
    let path = db_path
        .map_or_else(|| AssessConfig::from_env().db_path, Path::to_path_buf);
    // Opening the store creates the state directory and schema.
    let _store = HistoryStore::open(&path)?;
    let context_path = PathBuf::from("aird-context.yaml");
    if context_path.exists() {
        write_stderr_line("aird-context.yaml already exists; leaving it untouched")
            .map_err(|err| CliError::runtime(err.to_string()))?;
    } else {
        std::fs::write(&context_path, STARTER_CONTEXT)
            .map_err(|err| CliError::runtime(err.to_string()))?;
        write_stderr_line("wrote starter context to aird-context.yaml")
            .map_err(|err| CliError::runtime(err.to_string()))?;
    }
    write_stderr_line(&format!("history store ready at {}", path.display()))
        .map_err(|err| CliError::runtime(err.to_string()))?;
    write_stderr_line("next: aird assess -c sqlite:///path/to/data.db")
        .map_err(|err| CliError::runtime(err.to_string()))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `fix` command.
fn command_fix(command: FixCommand, db_path: Option<&Path>) -> CliResult<ExitCode> {
    let store = open_store(db_path)?;
    let value = match &command.id {
        Some(id) => store
            .get_report(id)?
            .ok_or_else(|| CliError::usage(format!("assessment not found: {id}")))?,
        None => {
            let latest = store.list_assessments(&AssessmentFilter {
                limit: Some(1),
                ..AssessmentFilter::default()
            })?;
            let Some(summary) = latest.into_iter().next() else {
                return Err(CliError::usage(
                    "no assessments in history; run `aird assess` first",
                ));
            };
            store
                .get_report(&summary.id)?
                .ok_or_else(|| CliError::runtime("could not load latest assessment"))?
        }
    };
    let report: Report = serde_json::from_value(value)
        .map_err(|err| CliError::runtime(format!("malformed persisted report: {err}")))?;
    let suggestions = generate_fix_suggestions(&report);
    if suggestions.is_empty() {
        write_stdout_line("No failed tests to remediate.")
            .map_err(|err| CliError::runtime(err.to_string()))?;
        return Ok(ExitCode::SUCCESS);
    }
    match (&command.output_dir, command.dry_run) {
        (Some(dir), false) => {
            std::fs::create_dir_all(dir)
                .map_err(|err| CliError::runtime(err.to_string()))?;
            for (position, suggestion) in suggestions.iter().enumerate() {
                let safe_name = format!(
                    "{:02}_{}_{}",
                    position + 1,
                    suggestion.requirement,
                    suggestion.table
                )
                .replace('.', "_");
                let body = format!(
                    "-- {}/{}: {}\n\n{}\n",
                    suggestion.factor,
                    suggestion.requirement,
                    suggestion.description,
                    suggestion.sql
                );
                std::fs::write(dir.join(format!("{safe_name}.sql")), body)
                    .map_err(|err| CliError::runtime(err.to_string()))?;
            }
            write_stderr_line(&format!(
                "wrote {} remediation scripts to {}",
                suggestions.len(),
                dir.display()
            ))
            .map_err(|err| CliError::runtime(err.to_string()))?;
        }
        _ => {
            for line in render::suggestion_lines(&suggestions) {
                write_stdout_line(&line)
                    .map_err(|err| CliError::runtime(err.to_string()))?;
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
