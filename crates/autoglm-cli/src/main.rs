/*
[INPUT]:  CLI arguments, .env/environment, optional YAML settings, OS shutdown signals
[OUTPUT]: Task transcript on stdout, diagnostics on stderr, process exit code
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, startup flow, or shutdown handling
*/

mod cli;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::task::TaskArgs;

#[derive(Parser, Debug)]
#[command(name = "autoglm", version, about = "AutoGLM agent task client")]
struct Cli {
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send a task to AutoGLM and follow its progress
    Task(TaskArgs),
    /// Show AutoGLM API information
    Info,
    /// Write a settings file interactively
    Init {
        #[arg(long, value_name = "PATH", default_value = "autoglm.yaml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let code = match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", style("error:").red().bold());
            1
        }
    };
    // Exit without waiting on a blocked operator prompt thread.
    std::process::exit(code);
}

async fn run() -> Result<i32> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    match args.command {
        Command::Task(task_args) => {
            let shutdown = CancellationToken::new();
            setup_signal_handlers(shutdown.clone());
            cli::task::run_task(task_args, shutdown).await
        }
        Command::Info => {
            cli::info::print_info();
            Ok(0)
        }
        Command::Init { output } => {
            cli::init::run_init(output)?;
            Ok(0)
        }
    }
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
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

        let shutdown_clone = shutdown.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown_clone.cancel();
                }
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }
}
