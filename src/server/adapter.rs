//! Binds registered commands to HTTP routes.
//!
//! Every command carrying a handler is reachable with `GET <route>`. Query
//! parameters are decoded leniently (see [`crate::wire`]) and the handler
//! runs synchronously on the request task.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::extract::Query;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tracing::{debug, info_span, warn};

use crate::models::command::CommandSpec;
use crate::models::context::{Reply, ServerContext};
use crate::registry::Registry;
use crate::route::{is_bindable_route, PING_RESPONSE, PING_ROUTE};
use crate::wire::decode_query;

/// Handler for `GET /ping/`; answers regardless of registered commands.
async fn ping() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": PING_RESPONSE }))
}

/// Build the daemon router for `registry`.
///
/// When several commands resolve to the same route the last registration
/// wins. A command whose route equals the liveness route, or whose name
/// is not usable as a literal path segment, is skipped.
pub fn build_router(registry: &Registry) -> Router {
    let mut bound: BTreeMap<String, Arc<CommandSpec>> = BTreeMap::new();

    for spec in registry.iter().filter(|spec| spec.handler_fn().is_some()) {
        let route = spec.route();
        if route == PING_ROUTE {
            warn!(%route, "command route collides with the liveness route; skipped");
            continue;
        }
        if !is_bindable_route(&route) {
            warn!(%route, "command route is not a literal path; skipped");
            continue;
        }
        if bound.insert(route.clone(), Arc::new(spec.clone())).is_some() {
            warn!(%route, "route registered more than once; last registration wins");
        }
    }

    let mut router = Router::new();
    for (route, spec) in bound {
        debug!(%route, "binding command route");
        router = router.route(
            &route,
            get(move |Query(params): Query<HashMap<String, String>>| {
                let spec = Arc::clone(&spec);
                async move { handle_command(&spec, &params) }
            }),
        );
    }

    router.route(PING_ROUTE, get(ping))
}

/// Decode `params` for `spec`, run its handler and emit the reply.
fn handle_command(spec: &CommandSpec, params: &HashMap<String, String>) -> Response {
    let route = spec.route();
    let _span = info_span!("command", %route).entered();

    let mut ctx = ServerContext::new(route, decode_query(spec.flags(), params));
    if let Some(handler) = spec.handler_fn() {
        handler(&mut ctx);
    }

    let reply = ctx.into_reply();
    debug!(status = %reply.status, bytes = reply.body.len(), "command handled");
    into_response(reply)
}

fn into_response(reply: Reply) -> Response {
    (
        reply.status,
        [(header::CONTENT_TYPE, reply.content_type)],
        reply.body,
    )
        .into_response()
}
