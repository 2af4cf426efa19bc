//! Shell sessions driven from in-memory input against a live daemon.

use std::sync::{Arc, Mutex};

use ktrl::shell::history::History;
use ktrl::shell::{Shell, Step};
use ktrl::Dispatcher;

use super::test_helpers::{spawn_tcp_daemon, test_registry};

fn shell_for(transport: &ktrl::TransportConfig) -> Shell {
    let dispatcher = Dispatcher::from_config(transport).expect("dispatcher");
    let registry = test_registry(&Arc::new(Mutex::new(None)));
    Shell::new(registry, dispatcher, History::in_memory(50))
}

#[tokio::test]
async fn execute_dispatches_parsed_line() {
    let daemon = spawn_tcp_daemon().await;
    let mut shell = shell_for(&daemon.transport);

    let Step::Ran(ctx) = shell.execute("show --enable a b").await else {
        panic!("expected the command to run");
    };
    assert_eq!(ctx.result_text(), "hello, ktrl!");

    let observed = daemon.observed.lock().expect("lock").clone().expect("handler ran");
    assert!(observed.enable);
    assert_eq!(observed.args, vec!["a".to_owned(), "b".to_owned()]);

    daemon.shutdown().await;
}

#[tokio::test]
async fn quoted_argument_stays_whole() {
    let daemon = spawn_tcp_daemon().await;
    let mut shell = shell_for(&daemon.transport);

    let Step::Ran(_) = shell.execute(r#"show "hello world""#).await else {
        panic!("expected the command to run");
    };
    let observed = daemon.observed.lock().expect("lock").clone().expect("handler ran");
    assert_eq!(observed.args, vec!["hello world".to_owned()]);

    daemon.shutdown().await;
}

#[tokio::test]
async fn parse_errors_become_messages() {
    let daemon = spawn_tcp_daemon().await;
    let mut shell = shell_for(&daemon.transport);

    assert!(matches!(shell.execute("show --bogus").await, Step::Message(_)));
    assert!(matches!(shell.execute("nope").await, Step::Message(_)));
    assert!(matches!(shell.execute("   ").await, Step::Empty));
    assert!(matches!(shell.execute("exit").await, Step::Exit));
    assert!(daemon.observed.lock().expect("lock").is_none());

    daemon.shutdown().await;
}

#[tokio::test]
async fn session_stops_at_exit_and_records_history() {
    let daemon = spawn_tcp_daemon().await;
    let mut shell = shell_for(&daemon.transport).with_prompt("> ");

    let input = "show -e x\n\nshow stats --limit 3\nexit\nshow never\n";
    let mut output = Vec::new();
    shell
        .run_with(input.as_bytes(), &mut output)
        .await
        .expect("session");

    let written = String::from_utf8(output).expect("utf8");
    assert_eq!(written.matches("> ").count(), 4);
    assert_eq!(
        shell.history().lines(),
        ["show -e x", "show stats --limit 3", "exit"].map(str::to_owned).as_slice()
    );

    let observed = daemon.observed.lock().expect("lock").clone().expect("handler ran");
    assert_eq!(observed.args, vec!["x".to_owned()]);

    daemon.shutdown().await;
}
