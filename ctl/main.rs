#![forbid(unsafe_code)]

//! `ktrl-ctl` — one-shot companion for a running `ktrl` daemon.
//!
//! Sends a single command request over the configured transport and prints
//! the raw response body. Flag values are sent as text; the daemon parses
//! them with the types it declared.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use ktrl::{Dispatcher, FlagValue, FlagValues, KtrlConfig, KtrlError};

#[derive(Debug, Parser)]
#[command(
    name = "ktrl-ctl",
    about = "Send one command to a running ktrl daemon",
    version,
    long_about = None
)]
struct Cli {
    /// Path to the TOML configuration file (same as the daemon's).
    #[arg(long)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check whether the daemon is listening.
    Ping,

    /// Send a command request.
    Send {
        /// Command name.
        name: String,
        /// Parent command name for nested commands.
        #[arg(long, default_value = "")]
        parent: String,
        /// Flag value as `name=value`; repeatable.
        #[arg(long = "flag", value_parser = parse_flag)]
        flags: Vec<(String, String)>,
        /// Positional args forwarded to the handler.
        args: Vec<String>,
    },
}

fn parse_flag(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.to_owned(), value.to_owned()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))
}

fn main() {
    let args = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Failed to start runtime: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = runtime.block_on(execute(args)) {
        eprintln!("Error: {err}");
        if matches!(err, KtrlError::Transport(_)) {
            eprintln!("Is the ktrl daemon running?");
        }
        std::process::exit(1);
    }
}

async fn execute(args: Cli) -> ktrl::Result<()> {
    let config = KtrlConfig::load_from_path(&args.config)?;
    let dispatcher = Dispatcher::from_config(&config.transport()?)?;

    match args.command {
        Command::Ping => {
            dispatcher.ping().await?;
            println!("pong");
        }
        Command::Send {
            name,
            parent,
            flags,
            args,
        } => {
            let values: FlagValues = flags
                .into_iter()
                .map(|(flag, value)| (flag, FlagValue::String(value)))
                .collect();
            let body = dispatcher.send_values(&name, &parent, &values, &args).await?;
            let mut stdout = std::io::stdout();
            stdout.write_all(&body)?;
            if !body.ends_with(b"\n") {
                stdout.write_all(b"\n")?;
            }
        }
    }

    Ok(())
}
