//! Builds the shell's `clap` command tree from the registry and resolves
//! parsed input back to a command.

use std::collections::BTreeMap;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

use crate::models::command::CommandSpec;
use crate::models::context::ParsedFlags;
use crate::models::flag::{FlagKind, FlagSpec, FlagValue, FlagValues};
use crate::registry::Registry;
use crate::wire::encode_value;
use crate::{KtrlError, Result};

/// Built-in command leaving the shell.
pub const EXIT_COMMAND: &str = "exit";

/// Argument id collecting positional args.
const POSITIONAL_ID: &str = "ktrl-positional";

/// What a parsed input line asks the shell to do.
#[derive(Debug)]
pub enum ShellAction<'a> {
    /// Leave the shell.
    Exit,
    /// Dispatch `spec` with `flags`.
    Run {
        /// Command to run.
        spec: &'a CommandSpec,
        /// Resolved flags and args.
        flags: ParsedFlags,
    },
    /// A group was named without a sub-command.
    Nothing,
}

fn flag_arg(spec: &FlagSpec) -> Arg {
    let mut arg = Arg::new(spec.name().to_owned())
        .long(spec.name().to_owned())
        .help(spec.help_text().to_owned())
        .default_value(encode_value(spec.default_value()));

    if let Some(short) = spec.short_alias() {
        arg = arg.short(short);
    }

    match spec.kind() {
        FlagKind::String => arg.value_parser(value_parser!(String)),
        FlagKind::Bool => arg
            .value_parser(value_parser!(bool))
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true"),
        FlagKind::Int => arg
            .value_parser(value_parser!(i64))
            .allow_negative_numbers(true),
        FlagKind::Float => arg
            .value_parser(value_parser!(f64))
            .allow_negative_numbers(true),
    }
}

fn leaf_command(spec: &CommandSpec) -> Command {
    let mut command = Command::new(spec.name().to_owned())
        .about(spec.help_text().to_owned())
        .arg(
            Arg::new(POSITIONAL_ID)
                .value_name("ARGS")
                .num_args(0..)
                .action(ArgAction::Append),
        );
    if !spec.long_help_text().is_empty() {
        command = command.long_about(spec.long_help_text().to_owned());
    }
    spec.flags()
        .iter()
        .fold(command, |command, flag| command.arg(flag_arg(flag)))
}

/// Build the shell command tree.
///
/// Only runnable commands appear. Nested commands attach under
/// their parent; when the parent itself is not runnable an empty group
/// command stands in for it. A repeated name keeps the last registration.
#[must_use]
pub fn build_cli(registry: &Registry) -> Command {
    let mut top: BTreeMap<&str, Command> = BTreeMap::new();
    let mut children: BTreeMap<&str, BTreeMap<&str, Command>> = BTreeMap::new();

    for spec in registry.iter().filter(|spec| spec.is_runnable()) {
        if spec.parent_name().is_empty() {
            top.insert(spec.name(), leaf_command(spec));
        } else {
            children
                .entry(spec.parent_name())
                .or_default()
                .insert(spec.name(), leaf_command(spec));
        }
    }

    for (parent, subs) in children {
        let group = top.remove(parent).map_or_else(
            || {
                Command::new(parent.to_owned())
                    .subcommand_required(true)
                    .arg_required_else_help(true)
            },
            |command| command.args_conflicts_with_subcommands(true),
        );
        top.insert(parent, group.subcommands(subs.into_values()));
    }

    Command::new("ktrl")
        .no_binary_name(true)
        .disable_version_flag(true)
        .subcommand_required(true)
        .subcommand(Command::new(EXIT_COMMAND).about("Exit the shell."))
        .subcommands(top.into_values())
}

/// Resolve each declared flag from `matches`, falling back to its default.
#[must_use]
pub fn parsed_flags(specs: &[FlagSpec], matches: &ArgMatches) -> ParsedFlags {
    let values: FlagValues = specs
        .iter()
        .map(|spec| {
            let name = spec.name();
            let value = match spec.kind() {
                FlagKind::String => matches
                    .try_get_one::<String>(name)
                    .ok()
                    .flatten()
                    .cloned()
                    .map(FlagValue::String),
                FlagKind::Bool => matches
                    .try_get_one::<bool>(name)
                    .ok()
                    .flatten()
                    .copied()
                    .map(FlagValue::Bool),
                FlagKind::Int => matches
                    .try_get_one::<i64>(name)
                    .ok()
                    .flatten()
                    .copied()
                    .map(FlagValue::Int),
                FlagKind::Float => matches
                    .try_get_one::<f64>(name)
                    .ok()
                    .flatten()
                    .copied()
                    .map(FlagValue::Float),
            };
            (
                name.to_owned(),
                value.unwrap_or_else(|| spec.default_value().clone()),
            )
        })
        .collect();

    let args = matches
        .try_get_many::<String>(POSITIONAL_ID)
        .ok()
        .flatten()
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    ParsedFlags::new(values, args)
}

fn find_runnable<'a>(registry: &'a Registry, name: &str, parent: &str) -> Option<&'a CommandSpec> {
    registry.iter().rev().find(|spec| {
        spec.name() == name && spec.parent_name() == parent && spec.is_runnable()
    })
}

/// Map matches produced by [`build_cli`] back to a registered command.
#[must_use]
pub fn resolve<'a>(registry: &'a Registry, matches: &ArgMatches) -> ShellAction<'a> {
    let Some((name, sub_matches)) = matches.subcommand() else {
        return ShellAction::Nothing;
    };

    if name == EXIT_COMMAND {
        return ShellAction::Exit;
    }

    let (spec, leaf_matches) = match sub_matches.subcommand() {
        Some((child, child_matches)) => (find_runnable(registry, child, name), child_matches),
        None => (find_runnable(registry, name, ""), sub_matches),
    };

    match spec {
        Some(spec) => ShellAction::Run {
            spec,
            flags: parsed_flags(spec.flags(), leaf_matches),
        },
        None => ShellAction::Nothing,
    }
}

/// Split an input line into words, honouring single and double quotes.
///
/// # Errors
///
/// Returns `KtrlError::Shell` on an unterminated quote.
pub fn split_line(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match quote {
            Some(open) if ch == open => quote = None,
            Some(_) => current.push(ch),
            None if ch == '\'' || ch == '"' => {
                quote = Some(ch);
                in_word = true;
            }
            None if ch.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(ch);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(KtrlError::Shell("unterminated quote".into()));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
