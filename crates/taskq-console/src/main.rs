/*
[INPUT]:  CLI arguments, layered configuration, OS shutdown signals
[OUTPUT]: Operator TUI or one-shot command output
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, startup flow, or shutdown handling
*/

mod cli;
mod tui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use taskq_adapter::{Priority, TaskQueueApi, TaskqClient};
use taskq_console::ConsoleConfig;
use taskq_console::StatusFilter;
use taskq_console::logging::{LOG_BUFFER_CAPACITY, LogBuffer, LogTarget, init_tracing};

#[derive(Parser, Debug)]
#[command(
    name = "taskq-console",
    version,
    about = "Operator console for the taskq distributed task queue"
)]
struct Cli {
    /// YAML config file (default: <config_dir>/taskq/console.yaml)
    #[arg(long = "config", value_name = "PATH", global = true)]
    config_path: Option<PathBuf>,
    /// Backend base URL, overrides the config file
    #[arg(long = "base-url", value_name = "URL", global = true)]
    base_url: Option<String>,
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Interactive dashboard (default)
    Tui,
    /// Print the current queue metrics
    Metrics {
        #[arg(long)]
        json: bool,
    },
    /// List tasks, optionally filtered by status
    Tasks {
        /// ALL, PENDING, PROCESSING, COMPLETED or FAILED
        #[arg(long, default_value = "ALL")]
        status: StatusFilter,
        /// 0-based page
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long)]
        size: Option<u32>,
        #[arg(long)]
        json: bool,
    },
    /// Show one task by its full id
    Task {
        task_id: String,
        #[arg(long)]
        json: bool,
    },
    /// List task types and their payload fields
    Types,
    /// Submit a task
    Submit {
        #[arg(long = "type", value_name = "TASK_TYPE")]
        task_type: String,
        #[arg(long)]
        priority: Option<Priority>,
        /// Payload field, repeatable
        #[arg(long = "field", value_name = "KEY=VALUE", value_parser = cli::commands::parse_field)]
        fields: Vec<(String, String)>,
        #[arg(long)]
        max_retries: Option<u32>,
    },
    /// Write a starter config file
    Init {
        /// Output path (default: the --config path)
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let args = Cli::parse();
    let config_path = args.config_path.clone().or_else(ConsoleConfig::default_path);
    let command = args.command.clone().unwrap_or(Command::Tui);

    if let Command::Init { output, force } = &command {
        let target = output
            .clone()
            .or(config_path)
            .context("no output path given and no config directory found")?;
        return cli::init::run_init(&target, *force);
    }

    let mut config = ConsoleConfig::load(config_path.as_deref()).context("load config")?;
    if let Some(base_url) = args.base_url {
        config.api.base_url = base_url;
    }
    let log_level = args
        .log_level
        .unwrap_or_else(|| config.logging.level.clone());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;
    runtime.block_on(run(command, config, &log_level))
}

async fn run(command: Command, config: ConsoleConfig, log_level: &str) -> Result<()> {
    let client = TaskqClient::with_config(config.client_config()).context("create HTTP client")?;
    let api: Arc<dyn TaskQueueApi> = Arc::new(client);

    if let Command::Tui = command {
        let log_buffer = LogBuffer::handle(LOG_BUFFER_CAPACITY);
        let _guard = init_tracing(
            log_level,
            LogTarget::Buffer(log_buffer.clone()),
            config.logging.file.as_deref(),
        )?;
        info!(base_url = %config.api.base_url, "starting taskq-console");

        let shutdown = CancellationToken::new();
        setup_signal_handlers(shutdown.clone());
        return tui::run_tui(api, &config, log_buffer, shutdown).await;
    }

    let _guard = init_tracing(log_level, LogTarget::Stderr, config.logging.file.as_deref())?;
    match command {
        Command::Metrics { json } => cli::commands::show_metrics(api.as_ref(), json).await,
        Command::Tasks {
            status,
            page,
            size,
            json,
        } => cli::commands::list_tasks(api.as_ref(), &config, status, page, size, json).await,
        Command::Task { task_id, json } => {
            cli::commands::show_task(api.as_ref(), &task_id, json).await
        }
        Command::Types => cli::commands::list_types(api.as_ref(), &config).await,
        Command::Submit {
            task_type,
            priority,
            fields,
            max_retries,
        } => {
            cli::commands::submit(api, &config, &task_type, priority, &fields, max_retries).await
        }
        Command::Tui | Command::Init { .. } => Err(anyhow!("command already dispatched")),
    }
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        shutdown_clone.cancel();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown.cancel();
                }
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }
}
