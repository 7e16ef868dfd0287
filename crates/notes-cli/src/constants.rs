//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells, clap usage errors)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Note not found on the topic.
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Wrong password, or an encrypted note read without one.
    pub const AUTH_FAILED: i32 = 5;
}

/// Environment variable consulted for a password before prompting.
pub const PASSWORD_ENV: &str = "NOTES_PASSWORD";

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "NOTES_CONFIG";

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "NOTES_LOG";
