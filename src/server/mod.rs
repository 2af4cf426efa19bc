//! Daemon side of the bridge: route binding and listener lifecycle.

pub mod adapter;
pub mod listener;
