#![forbid(unsafe_code)]

//! `ktrl` — daemon and interactive shell binary.
//!
//! Registers the built-in commands, then either serves them from a daemon,
//! drives them from the shell, or does both in one process.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use ktrl::server::listener::{run_daemon, DaemonHandle, ServerListener};
use ktrl::shell::history::History;
use ktrl::shell::Shell;
use ktrl::{
    CommandSpec, Dispatcher, FlagSource, FlagSpec, KtrlConfig, KtrlError, Registry,
    RegistryBuilder, Result, TransportConfig,
};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "ktrl", about = "Command-dispatch daemon and shell", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: PathBuf,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Serve registered commands until interrupted.
    Serve,
    /// Start the interactive shell against a running daemon.
    Shell,
    /// Start a daemon in-process unless one is already listening, then the shell.
    Run,
    /// Check whether a daemon is listening.
    Ping,
}

#[derive(Debug, Serialize)]
struct Stats {
    limit: i64,
    ratio: f64,
    args: Vec<String>,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| KtrlError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    let config = KtrlConfig::load_from_path(&args.config)?;
    let transport = config.transport()?;
    info!(?transport, "configuration loaded");

    let builder = RegistryBuilder::new();
    register_commands(&builder);
    let registry = builder.freeze();

    match args.mode {
        Mode::Serve => {
            let ct = CancellationToken::new();
            let signal_ct = ct.clone();
            tokio::spawn(async move {
                shutdown_signal().await;
                info!("shutdown signal received");
                signal_ct.cancel();
            });
            run_daemon(&transport, &registry, ct).await
        }
        Mode::Shell => {
            let dispatcher = Dispatcher::from_config(&transport)?;
            let mut shell = Shell::new(registry, dispatcher, open_history(&config))
                .with_banner("Welcome to ktrl!");
            shell.run().await
        }
        Mode::Run => run_with_daemon(&config, transport, registry).await,
        Mode::Ping => {
            Dispatcher::from_config(&transport)?.ping().await?;
            println!("daemon is running");
            Ok(())
        }
    }
}

/// Shell plus an in-process daemon, unless another daemon already answers
/// the liveness check.
async fn run_with_daemon(config: &KtrlConfig, transport: TransportConfig, registry: Registry) -> Result<()> {
    let dispatcher = Dispatcher::from_config(&transport)?;

    let daemon = if dispatcher.is_daemon_running().await {
        info!("daemon already running; attaching shell");
        None
    } else {
        let listener = ServerListener::bind(&transport).await?;
        Some(DaemonHandle::spawn(registry.clone(), listener))
    };

    let mut shell =
        Shell::new(registry, dispatcher, open_history(config)).with_banner("Welcome to ktrl!");
    let result = shell.run().await;

    if let Some(daemon) = daemon {
        if let Err(err) = daemon.shutdown().await {
            error!(%err, "daemon failed");
        }
    }
    result
}

fn open_history(config: &KtrlConfig) -> History {
    History::open_or_in_memory(config.history_file_path.as_deref(), config.max_history_lines)
}

fn register_commands(builder: &RegistryBuilder) {
    builder.register(
        CommandSpec::new("show")
            .help("Show info.")
            .flag(
                FlagSpec::bool("enable", false)
                    .short('e')
                    .help("Enable version output"),
            )
            .flag(
                FlagSpec::string("version", "v0.0.1")
                    .short('v')
                    .help("Version string to report"),
            )
            .run(|ctx| {
                println!("args: {:?}", ctx.args());
                println!("result from daemon: {}", ctx.result_text());
            })
            .handler(|ctx| {
                info!(
                    args = ?ctx.args(),
                    enable = ctx.get_bool("enable"),
                    version = %ctx.get_string("version"),
                    "show handled"
                );
                ctx.send_response("hello, ktrl!");
            }),
    );

    builder.register(
        CommandSpec::new("stats")
            .parent("show")
            .help("Show numeric flags as JSON.")
            .flag(FlagSpec::int("limit", 10).short('l').help("Row limit"))
            .flag(FlagSpec::float("ratio", 0.5).short('r').help("Sampling ratio"))
            .run(|ctx| println!("{}", ctx.result_text()))
            .handler(|ctx| {
                let stats = Stats {
                    limit: ctx.get_int("limit"),
                    ratio: ctx.get_float("ratio"),
                    args: ctx.args().to_vec(),
                };
                ctx.send_json(&stats);
            }),
    );
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| KtrlError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| KtrlError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
