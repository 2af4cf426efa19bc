//! Interactive console: reads command lines, parses them against the
//! registry and dispatches them to the daemon.

pub mod commands;
pub mod history;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use crate::client::dispatcher::Dispatcher;
use crate::models::context::ClientContext;
use crate::registry::Registry;
use crate::{KtrlError, Result};

use commands::{build_cli, resolve, split_line, ShellAction};
use history::History;

const DEFAULT_PROMPT: &str = "ktrl> ";

/// Result of executing one input line.
#[derive(Debug)]
pub enum Step {
    /// Blank line or a bare group name.
    Empty,
    /// The user asked to leave.
    Exit,
    /// A command was dispatched; its context after the run function.
    Ran(ClientContext),
    /// Text for the user: help output or a parse error.
    Message(String),
}

/// Line-oriented shell bound to one registry and one daemon.
pub struct Shell {
    registry: Registry,
    dispatcher: Dispatcher,
    history: History,
    cli: clap::Command,
    prompt: String,
    banner: Option<String>,
}

impl Shell {
    /// Shell exposing every runnable command in `registry`.
    #[must_use]
    pub fn new(registry: Registry, dispatcher: Dispatcher, history: History) -> Self {
        let cli = build_cli(&registry);
        Self {
            registry,
            dispatcher,
            history,
            cli,
            prompt: DEFAULT_PROMPT.to_owned(),
            banner: None,
        }
    }

    /// Replace the prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Text printed once when the shell starts.
    #[must_use]
    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = Some(banner.into());
        self
    }

    /// Recorded history.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Execute one input line.
    pub async fn execute(&mut self, line: &str) -> Step {
        if self.history.push(line) {
            if let Err(err) = self.history.save() {
                warn!(%err, "failed to persist history");
            }
        }

        let words = match split_line(line) {
            Ok(words) if words.is_empty() => return Step::Empty,
            Ok(words) => words,
            Err(err) => return Step::Message(err.to_string()),
        };

        let matches = match self.cli.try_get_matches_from_mut(words) {
            Ok(matches) => matches,
            Err(err) => return Step::Message(err.render().to_string().trim_end().to_owned()),
        };

        match resolve(&self.registry, &matches) {
            ShellAction::Exit => Step::Exit,
            ShellAction::Nothing => Step::Empty,
            ShellAction::Run { spec, flags } => Step::Ran(self.dispatcher.run(spec, flags).await),
        }
    }

    /// Run the prompt loop over `input`, writing prompts and messages to
    /// `output`, until `exit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns `KtrlError::Shell` if reading input or writing output fails.
    pub async fn run_with<R, W>(&mut self, input: R, mut output: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();

        if let Some(banner) = self.banner.clone() {
            write_text(&mut output, &format!("{banner}\n")).await?;
        }

        loop {
            let prompt = self.prompt.clone();
            write_text(&mut output, &prompt).await?;

            let Some(line) = lines
                .next_line()
                .await
                .map_err(|err| KtrlError::Shell(format!("failed to read input: {err}")))?
            else {
                break;
            };

            match self.execute(&line).await {
                Step::Exit => break,
                Step::Message(text) => write_text(&mut output, &format!("{text}\n")).await?,
                Step::Empty | Step::Ran(_) => {}
            }
        }

        info!("shell exiting");
        Ok(())
    }

    /// Run the prompt loop on stdin and stdout.
    ///
    /// # Errors
    ///
    /// Returns `KtrlError::Shell` if the terminal cannot be read or written.
    pub async fn run(&mut self) -> Result<()> {
        self.run_with(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }
}

async fn write_text<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output
        .write_all(text.as_bytes())
        .await
        .map_err(|err| KtrlError::Shell(format!("failed to write output: {err}")))?;
    output
        .flush()
        .await
        .map_err(|err| KtrlError::Shell(format!("failed to write output: {err}")))
}
