//! Flutter-facing bindings for the Todoey core.

pub mod api;
