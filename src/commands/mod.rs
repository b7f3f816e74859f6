//! Command handlers for the subsync-cli application.
//!
//! This is a single-purpose CLI, so there is exactly one command.
pub mod sync_command;
