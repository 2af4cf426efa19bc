//! Domain model module declarations.

pub mod command;
pub mod context;
pub mod flag;
