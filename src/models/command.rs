//! Command definitions shared by the shell and the daemon.

use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::context::{ClientContext, ServerContext};
use super::flag::FlagSpec;
use crate::client::dispatcher::Dispatcher;
use crate::route::format_route;

/// Server-side function producing the response for a bound route.
pub type Handler = Arc<dyn Fn(&mut ServerContext) + Send + Sync>;

/// Client-side function post-processing a dispatch's raw result.
pub type RunFunc = Arc<dyn Fn(&ClientContext) + Send + Sync>;

/// Future returned by a [`SenderRunFunc`]; resolves to the final context.
pub type RunFuture = Pin<Box<dyn Future<Output = ClientContext> + Send>>;

/// Client-side function handed a [`Dispatcher`] so it can send requests of
/// its own.
pub type SenderRunFunc = Arc<dyn Fn(ClientContext, Dispatcher) -> RunFuture + Send + Sync>;

/// One command, runnable in the shell, in the daemon, or both.
///
/// A command is only useful on a side when the matching function is set:
/// the daemon binds routes for commands with a [`Handler`], the shell
/// exposes commands with a [`RunFunc`] or a [`SenderRunFunc`].
///
/// With [`send_in_run`](Self::send_in_run) set the shell does not dispatch
/// the command itself; the sender function is expected to do it.
#[derive(Clone)]
pub struct CommandSpec {
    name: String,
    parent: String,
    help: String,
    long_help: String,
    flags: Vec<FlagSpec>,
    handler: Option<Handler>,
    run: Option<RunFunc>,
    sender_run: Option<SenderRunFunc>,
    send_in_run: bool,
}

impl CommandSpec {
    /// Top-level command named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: String::new(),
            help: String::new(),
            long_help: String::new(),
            flags: Vec::new(),
            handler: None,
            run: None,
            sender_run: None,
            send_in_run: false,
        }
    }

    /// Nest this command under `parent`.
    #[must_use]
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = parent.into();
        self
    }

    /// One-line help.
    #[must_use]
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Long help shown by `<command> --help`.
    #[must_use]
    pub fn long_help(mut self, long_help: impl Into<String>) -> Self {
        self.long_help = long_help.into();
        self
    }

    /// Append one flag.
    #[must_use]
    pub fn flag(mut self, flag: FlagSpec) -> Self {
        self.flags.push(flag);
        self
    }

    /// Set the daemon-side handler.
    #[must_use]
    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut ServerContext) + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Set the shell-side result consumer.
    #[must_use]
    pub fn run<F>(mut self, run: F) -> Self
    where
        F: Fn(&ClientContext) + Send + Sync + 'static,
    {
        self.run = Some(Arc::new(run));
        self
    }

    /// Set a shell-side function that receives the dispatcher.
    ///
    /// Runs after the plain run function, if both are set.
    #[must_use]
    pub fn run_with_sender<F, Fut>(mut self, run: F) -> Self
    where
        F: Fn(ClientContext, Dispatcher) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ClientContext> + Send + 'static,
    {
        self.sender_run = Some(Arc::new(
            move |ctx: ClientContext, dispatcher: Dispatcher| -> RunFuture {
                Box::pin(run(ctx, dispatcher))
            },
        ));
        self
    }

    /// Skip the automatic dispatch; the run functions send on their own.
    #[must_use]
    pub fn send_in_run(mut self, send_in_run: bool) -> Self {
        self.send_in_run = send_in_run;
        self
    }

    /// Command name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent command name; empty for top-level commands.
    #[must_use]
    pub fn parent_name(&self) -> &str {
        &self.parent
    }

    /// One-line help.
    #[must_use]
    pub fn help_text(&self) -> &str {
        &self.help
    }

    /// Long help.
    #[must_use]
    pub fn long_help_text(&self) -> &str {
        &self.long_help
    }

    /// Declared flags in declaration order.
    #[must_use]
    pub fn flags(&self) -> &[FlagSpec] {
        &self.flags
    }

    /// Daemon-side handler, if any.
    #[must_use]
    pub fn handler_fn(&self) -> Option<&Handler> {
        self.handler.as_ref()
    }

    /// Shell-side result consumer, if any.
    #[must_use]
    pub fn run_fn(&self) -> Option<&RunFunc> {
        self.run.as_ref()
    }

    /// Shell-side function receiving the dispatcher, if any.
    #[must_use]
    pub fn sender_run_fn(&self) -> Option<&SenderRunFunc> {
        self.sender_run.as_ref()
    }

    /// Whether the shell leaves dispatching to the run functions.
    #[must_use]
    pub fn sends_in_run(&self) -> bool {
        self.send_in_run
    }

    /// Whether the shell exposes this command.
    #[must_use]
    pub fn is_runnable(&self) -> bool {
        self.run.is_some() || self.sender_run.is_some()
    }

    /// Route this command is bound to and dispatched at.
    #[must_use]
    pub fn route(&self) -> String {
        format_route(&self.name, &self.parent)
    }
}

impl Debug for CommandSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("flags", &self.flags)
            .field("handler", &self.handler.is_some())
            .field("run", &self.is_runnable())
            .field("send_in_run", &self.send_in_run)
            .finish_non_exhaustive()
    }
}
