//! Client side of the bridge: transport selection and request dispatch.

pub mod dispatcher;
pub mod transport;
