//! End-to-end dispatch over TCP.

use std::sync::{Arc, Mutex};

use ktrl::models::context::ParsedFlags;
use ktrl::{CommandSpec, Dispatcher, FlagSource, FlagSpec, FlagValues, RegistryBuilder};

use super::test_helpers::{spawn_tcp_daemon, spawn_tcp_daemon_with};

#[tokio::test]
async fn bool_and_string_flags_cross_tcp() {
    let daemon = spawn_tcp_daemon().await;
    let dispatcher = Dispatcher::from_config(&daemon.transport).expect("dispatcher");

    let mut values = FlagValues::new();
    values.insert("enable", true);
    values.insert("version", "v 1&2");
    let body = dispatcher
        .send_values("show", "", &values, &[])
        .await
        .expect("dispatch");

    assert_eq!(body, b"hello, ktrl!");
    let observed = daemon.observed.lock().expect("lock").clone().expect("handler ran");
    assert!(observed.enable);
    assert_eq!(observed.version, "v 1&2");
    assert!(observed.args.is_empty());

    daemon.shutdown().await;
}

#[tokio::test]
async fn numeric_flags_are_decoded_by_kind() {
    let daemon = spawn_tcp_daemon().await;
    let dispatcher = Dispatcher::from_config(&daemon.transport).expect("dispatcher");

    let mut values = FlagValues::new();
    values.insert("limit", -4_i64);
    values.insert("ratio", 2.5_f64);
    let body = dispatcher
        .send_values("stats", "show", &values, &["p".into(), "q".into()])
        .await
        .expect("dispatch");

    let parsed: serde_json::Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(
        parsed,
        serde_json::json!({ "limit": -4, "ratio": 2.5, "args": ["p", "q"] })
    );

    daemon.shutdown().await;
}

#[tokio::test]
async fn unknown_route_returns_not_found_body() {
    let daemon = spawn_tcp_daemon().await;
    let dispatcher = Dispatcher::from_config(&daemon.transport).expect("dispatcher");

    let body = dispatcher
        .dispatch("/nope/", &FlagValues::new(), &[])
        .await
        .expect("dispatch does not inspect status");
    assert!(body.is_empty());

    daemon.shutdown().await;
}

#[tokio::test]
async fn unroutable_names_are_skipped_not_fatal() {
    let builder = RegistryBuilder::new();
    for name in ["a{b", "{id}", ":id"] {
        builder.register(
            CommandSpec::new(name).handler(|ctx| ctx.send_response("captured")),
        );
    }
    builder.register(CommandSpec::new("show").handler(|ctx| ctx.send_response("shown")));

    let daemon = spawn_tcp_daemon_with(builder.freeze()).await;
    let dispatcher = Dispatcher::from_config(&daemon.transport).expect("dispatcher");

    let shown = dispatcher
        .send_values("show", "", &FlagValues::new(), &[])
        .await
        .expect("dispatch");
    assert_eq!(shown, b"shown");

    let other = dispatcher
        .dispatch("/anything/", &FlagValues::new(), &[])
        .await
        .expect("dispatch");
    assert!(other.is_empty(), "no capture route was bound");

    daemon.shutdown().await;
}

#[tokio::test]
async fn send_in_run_skips_automatic_dispatch() {
    let daemon = spawn_tcp_daemon().await;
    let dispatcher = Dispatcher::from_config(&daemon.transport).expect("dispatcher");

    let seen_by_run = Arc::new(Mutex::new(None));
    let seen = Arc::clone(&seen_by_run);
    let spec = CommandSpec::new("show")
        .send_in_run(true)
        .run(move |ctx| *seen.lock().expect("lock") = Some(ctx.result().to_vec()))
        .run_with_sender(|ctx, dispatcher| async move {
            let limit = [FlagSpec::int("limit", 7)];
            let body = dispatcher.send_msg("stats", "show", &limit, ctx.args()).await;
            ctx.with_result(body)
        });

    let ctx = dispatcher
        .run(&spec, ParsedFlags::new(FlagValues::new(), vec!["z".into()]))
        .await;

    assert_eq!(*seen_by_run.lock().expect("lock"), Some(Vec::new()));
    assert!(
        daemon.observed.lock().expect("lock").is_none(),
        "the show route was not requested"
    );
    let parsed: serde_json::Value = serde_json::from_slice(ctx.result()).expect("json body");
    assert_eq!(
        parsed,
        serde_json::json!({ "limit": 7, "ratio": 0.0, "args": ["z"] })
    );

    daemon.shutdown().await;
}
