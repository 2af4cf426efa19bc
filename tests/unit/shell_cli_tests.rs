//! Unit tests for the shell command tree built from the registry.

use ktrl::shell::commands::{build_cli, resolve, ShellAction};
use ktrl::{CommandSpec, FlagSource, FlagSpec, Registry, RegistryBuilder};

fn registry() -> Registry {
    let builder = RegistryBuilder::new();
    builder.register(
        CommandSpec::new("show")
            .help("Show info.")
            .flag(FlagSpec::bool("enable", false).short('e'))
            .flag(FlagSpec::string("version", "v0.0.1").short('v'))
            .run(|_| {}),
    );
    builder.register(
        CommandSpec::new("stats")
            .parent("show")
            .flag(FlagSpec::int("limit", 10).short('l'))
            .flag(FlagSpec::float("ratio", 0.5))
            .run(|_| {}),
    );
    builder.register(CommandSpec::new("show").parent("test").run(|_| {}));
    builder.register(CommandSpec::new("daemon-only").handler(|_| {}));
    builder.freeze()
}

fn parse<'a>(registry: &'a Registry, line: &str) -> ShellAction<'a> {
    let mut cli = build_cli(registry);
    let matches = cli
        .try_get_matches_from_mut(line.split_whitespace())
        .expect("line parses");
    resolve(registry, &matches)
}

#[test]
fn flags_default_when_not_given() {
    let registry = registry();
    let ShellAction::Run { spec, flags } = parse(&registry, "show") else {
        panic!("expected a runnable command");
    };
    assert_eq!(spec.route(), "/show/");
    assert!(!flags.get_bool("enable"));
    assert_eq!(flags.get_string("version"), "v0.0.1");
    assert!(flags.args().is_empty());
}

#[test]
fn bool_switch_and_short_alias() {
    let registry = registry();
    let ShellAction::Run { flags, .. } = parse(&registry, "show -e -v v2 a b") else {
        panic!("expected a runnable command");
    };
    assert!(flags.get_bool("enable"));
    assert_eq!(flags.get_string("version"), "v2");
    assert_eq!(flags.args(), ["a".to_owned(), "b".to_owned()].as_slice());
}

#[test]
fn bool_accepts_explicit_value() {
    let registry = registry();
    let ShellAction::Run { flags, .. } = parse(&registry, "show --enable=false x") else {
        panic!("expected a runnable command");
    };
    assert!(!flags.get_bool("enable"));
    assert_eq!(flags.args(), ["x".to_owned()].as_slice());
}

#[test]
fn nested_command_under_runnable_parent() {
    let registry = registry();
    let ShellAction::Run { spec, flags } = parse(&registry, "show stats --limit -3 --ratio 0.25")
    else {
        panic!("expected a runnable command");
    };
    assert_eq!(spec.route(), "/show/stats/");
    assert_eq!(flags.get_int("limit"), -3);
    assert!((flags.get_float("ratio") - 0.25).abs() < f64::EPSILON);
}

#[test]
fn nested_command_under_implicit_group() {
    let registry = registry();
    let ShellAction::Run { spec, .. } = parse(&registry, "test show") else {
        panic!("expected a runnable command");
    };
    assert_eq!(spec.route(), "/test/show/");
}

#[test]
fn exit_is_builtin() {
    let registry = registry();
    assert!(matches!(parse(&registry, "exit"), ShellAction::Exit));
}

#[test]
fn daemon_only_commands_are_hidden() {
    let registry = registry();
    let mut cli = build_cli(&registry);
    assert!(cli.try_get_matches_from_mut(["daemon-only"]).is_err());
}

#[test]
fn bad_int_is_a_parse_error() {
    let registry = registry();
    let mut cli = build_cli(&registry);
    assert!(cli
        .try_get_matches_from_mut(["show", "stats", "--limit", "ten"])
        .is_err());
}

#[test]
fn unknown_flag_is_a_parse_error() {
    let registry = registry();
    let mut cli = build_cli(&registry);
    assert!(cli.try_get_matches_from_mut(["show", "--nope"]).is_err());
}

#[test]
fn repeated_registration_resolves_to_latest() {
    let builder = RegistryBuilder::new();
    builder.register(CommandSpec::new("show").help("first").run(|_| {}));
    builder.register(CommandSpec::new("show").help("second").run(|_| {}));
    let registry = builder.freeze();
    let ShellAction::Run { spec, .. } = parse(&registry, "show") else {
        panic!("expected a runnable command");
    };
    assert_eq!(spec.help_text(), "second");
}

#[test]
fn sender_only_command_is_runnable() {
    let builder = RegistryBuilder::new();
    builder.register(
        CommandSpec::new("relay")
            .send_in_run(true)
            .run_with_sender(|ctx, _dispatcher| async move { ctx }),
    );
    let registry = builder.freeze();
    let ShellAction::Run { spec, .. } = parse(&registry, "relay") else {
        panic!("expected a runnable command");
    };
    assert!(spec.sends_in_run());
}
