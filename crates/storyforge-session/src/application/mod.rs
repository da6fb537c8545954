//! Application-level command handlers for the session context.

pub mod controller;
