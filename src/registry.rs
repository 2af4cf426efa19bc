//! Command registry.
//!
//! Registration is two-phase: commands are appended to a
//! [`RegistryBuilder`] while the process starts up, then the builder is
//! frozen into an immutable [`Registry`] that the shell and the daemon share
//! without locking.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::models::command::CommandSpec;

/// Append-only, mutex-guarded collection used during startup.
///
/// Duplicate names are not rejected; route collisions resolve at bind time.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    commands: Mutex<Vec<CommandSpec>>,
}

impl RegistryBuilder {
    /// Empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one command. Safe to call from several threads.
    pub fn register(&self, spec: CommandSpec) {
        debug!(name = spec.name(), parent = spec.parent_name(), "command registered");
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(spec);
    }

    /// Copy of the commands registered so far, in registration order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CommandSpec> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// End the registration phase.
    #[must_use]
    pub fn freeze(self) -> Registry {
        let commands = self
            .commands
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        Registry {
            commands: commands.into(),
        }
    }
}

/// Immutable command list shared by the dispatcher, shell and server.
#[derive(Debug, Clone)]
pub struct Registry {
    commands: Arc<[CommandSpec]>,
}

impl Registry {
    /// Commands in registration order.
    #[must_use]
    pub fn commands(&self) -> &[CommandSpec] {
        &self.commands
    }

    /// Iterate in registration order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &CommandSpec> {
        self.commands.iter()
    }

    /// Number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether nothing was registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Last command registered under `name` and `parent`.
    #[must_use]
    pub fn find(&self, name: &str, parent: &str) -> Option<&CommandSpec> {
        self.iter()
            .rev()
            .find(|spec| spec.name() == name && spec.parent_name() == parent)
    }
}
