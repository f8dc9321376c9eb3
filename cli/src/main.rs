//! CLI entrypoint for geotools
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use geotools_application::{
    BatchExecutor, BatchItem, BatchProgressNotifier, BatchRequest, ExecutionOptions, NoProgress,
    NoReportSink, ReportSink, RunToolError,
};
use geotools_domain::{BatchReport, ControlMode, ExecutionResult, RegisteredTool, ToolRegistry};
use geotools_infrastructure::{
    ConfigLoader, FileConfig, FsDatasourceProvider, JsonlReportWriter, MemoryStore,
    register_builtin_tools,
};
use geotools_presentation::{
    BatchProgressReporter, Cli, Command, ConsoleFormatter, OutputConfig, RunArgs, SimpleProgress,
    parse_assignments,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Outcome of `geotools run`
enum RunOutcome {
    Single(ExecutionResult),
    Batch(BatchReport),
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered log lines reach the file
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(ExitCode::SUCCESS);
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    for issue in config.validate() {
        warn!(field = %issue.field, "{}", issue.message);
    }

    let mut output = OutputConfig {
        color: config.output.color,
        show_progress: config.output.progress && !cli.quiet,
        json: false,
    };
    output.apply_color();

    info!("Starting geotools");

    // === Dependency Injection ===
    let store = Arc::new(MemoryStore::new());
    let registry = ToolRegistry::global();
    register_builtin_tools(registry, &store)?;

    let Some(command) = cli.command else {
        bail!("No command given. Run `geotools --help` for usage.");
    };

    match command {
        Command::List { group, json } => {
            let tools: Vec<Arc<RegisteredTool>> = registry
                .all()
                .into_iter()
                .filter(|t| group.as_deref().is_none_or(|g| t.descriptor.group == g))
                .collect();
            if json {
                let descriptors: Vec<_> = tools.iter().map(|t| t.descriptor.as_ref()).collect();
                println!("{}", ConsoleFormatter::format_json(&descriptors));
            } else {
                print!("{}", ConsoleFormatter::format_tool_list(&tools));
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Describe { tool, batch, json } => {
            let descriptor = registry
                .describe(&tool)
                .with_context(|| format!("Unknown tool '{}'", tool))?;
            let mode = if batch {
                ControlMode::Batch
            } else {
                ControlMode::Single
            };
            if json {
                println!("{}", ConsoleFormatter::format_json(&descriptor.describe(mode)));
            } else {
                print!("{}", ConsoleFormatter::format_description(&descriptor, mode));
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Run(args) => {
            output.json = args.json;
            run(args, registry, store, &config, &output).await
        }
    }
}

/// Initialize logging based on verbosity level, to stderr or `log_file`.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .with_context(|| format!("Invalid log file path '{}'", path.display()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory '{}'", dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}

async fn run(
    args: RunArgs,
    registry: &ToolRegistry,
    store: Arc<MemoryStore>,
    config: &FileConfig,
    output: &OutputConfig,
) -> Result<ExitCode> {
    let tool = registry
        .get(&args.tool)
        .with_context(|| format!("Unknown tool '{}'. Run `geotools list` to see available tools.", args.tool))?;
    let values = parse_assignments(&tool.descriptor, &args.params)?;

    let options = execution_options(&args, config);
    let report_sink = report_sink(&args, config);

    // Ctrl-C stops the batch after the item in progress
    let token = CancellationToken::new();
    let interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling after the current item");
            interrupt.cancel();
        }
    });

    let executor = BatchExecutor::new(Arc::new(FsDatasourceProvider::new(store)))
        .with_options(options)
        .with_cancellation(token)
        .with_report_sink(report_sink);

    let outcome = if args.is_batch() {
        let items = expand_inputs(&args)?;
        if items.is_empty() {
            bail!("No batch inputs matched");
        }
        let mut request = BatchRequest::new(items).with_shared(values);
        if let Some(name) = &args.batch_param {
            request = request.with_batch_parameter(name);
        }

        let progress: Box<dyn BatchProgressNotifier> = if !output.show_progress || output.json {
            Box::new(NoProgress)
        } else if output.color {
            Box::new(BatchProgressReporter::new())
        } else {
            Box::new(SimpleProgress)
        };

        let tool = tool.clone();
        tokio::task::spawn_blocking(move || {
            executor
                .run_batch(&tool, request, progress.as_ref())
                .map(RunOutcome::Batch)
        })
        .await??
    } else {
        let tool_id = tool.id().to_string();
        let tool = tool.clone();
        let result = tokio::task::spawn_blocking(move || executor.run_single(&tool, &values)).await?;
        RunOutcome::Single(match result {
            Ok(result) => result,
            Err(e @ RunToolError::Cancelled) => bail!(e),
            Err(e) => ExecutionResult::failed(tool_id, e.to_execution_error()),
        })
    };

    let success = match &outcome {
        RunOutcome::Single(result) => {
            if output.json {
                println!("{}", ConsoleFormatter::format_json(result));
            } else {
                print!("{}", ConsoleFormatter::format_result(result));
            }
            result.is_success()
        }
        RunOutcome::Batch(report) => {
            if output.json {
                println!("{}", ConsoleFormatter::format_json(report));
            } else {
                print!("{}", ConsoleFormatter::format_report(report));
            }
            report.all_succeeded()
        }
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Config file settings, overridden by command-line flags.
fn execution_options(args: &RunArgs, config: &FileConfig) -> ExecutionOptions {
    let mut options = config.execution.to_execution_options();
    if args.stop_on_error {
        options = options.with_continue_on_error(false);
    }
    if args.overwrite {
        options = options.with_overwrite_outputs(true);
    }
    if args.in_memory {
        options = options.with_prefer_in_memory(true);
    }
    if let Some(dir) = &args.output_dir {
        options = options.with_output_dir(dir.clone());
    }
    options
}

fn report_sink(args: &RunArgs, config: &FileConfig) -> Arc<dyn ReportSink> {
    let path = args.report.as_ref().or(config.report.jsonl_path.as_ref());
    match path.and_then(JsonlReportWriter::new) {
        Some(writer) => {
            info!(path = %writer.path().display(), "Appending results to report");
            Arc::new(writer)
        }
        None => Arc::new(NoReportSink),
    }
}

/// `--input` paths in order, then `--input-glob` matches sorted by path.
fn expand_inputs(args: &RunArgs) -> Result<Vec<BatchItem>> {
    let mut items: Vec<BatchItem> = args.input.iter().map(|s| BatchItem::from(s.as_str())).collect();

    if let Some(pattern) = &args.input_glob {
        let mut matched: Vec<PathBuf> = glob::glob(pattern)
            .with_context(|| format!("Invalid glob pattern '{}'", pattern))?
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable glob match");
                    None
                }
            })
            .collect();
        matched.sort();
        items.extend(matched.into_iter().map(BatchItem::from));
    }

    Ok(items)
}
