//! Route derivation for commands.

/// Liveness route answered by every daemon regardless of registered commands.
pub const PING_ROUTE: &str = "/ping/";

/// Message carried by the liveness response.
pub const PING_RESPONSE: &str = "pong";

/// Map a command name and its parent to a route.
///
/// `("show", "")` becomes `/show/`, `("show", "test")` becomes `/test/show/`.
#[must_use]
pub fn format_route(name: &str, parent: &str) -> String {
    if parent.is_empty() {
        format!("/{name}/")
    } else {
        format!("/{parent}/{name}/")
    }
}

/// Whether `route` can be bound as a literal HTTP path.
///
/// Every segment must be non-empty and free of capture syntax (`{`, `}`, a
/// leading `:` or `*`) and of `?` or `#`, which a client URL would not
/// carry as part of the path.
#[must_use]
pub fn is_bindable_route(route: &str) -> bool {
    let Some(inner) = route.strip_prefix('/').and_then(|rest| rest.strip_suffix('/')) else {
        return false;
    };
    inner.split('/').all(|segment| {
        !segment.is_empty()
            && !segment.starts_with([':', '*'])
            && !segment.contains(['{', '}', '?', '#'])
    })
}
