//! Command handlers.

pub mod create;
pub mod list;
pub mod misc;
pub mod read;
pub mod watch;
