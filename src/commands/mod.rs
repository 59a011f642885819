//! Clipstack - Commands module

pub mod handlers;

pub use handlers::{handle_command, reply_line, CommandResult, Reply};
