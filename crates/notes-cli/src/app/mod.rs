//! Application-level utilities for the Notes CLI.
//!
//! This module provides:
//! - Settings resolution (flags, env, config file, XDG defaults)
//! - Directory construction over the SQLite topic log
//! - Body and password input

mod context;
mod input;
mod resolver;

pub use context::AppContext;
pub use input::{new_note_password, read_note_body, read_password_from_env, TerminalPrompt};
