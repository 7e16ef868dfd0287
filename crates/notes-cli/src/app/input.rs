//! Note body and password input.

use std::io::{self, IsTerminal, Read};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use dialoguer::Password;
use notes_core::PasswordPrompt;
use zeroize::Zeroizing;

use crate::constants::PASSWORD_ENV;
use crate::errors::CliError;
use crate::ui::short_id;

/// Read the password from NOTES_PASSWORD, if set and non-blank.
pub fn read_password_from_env() -> Option<Zeroizing<String>> {
    std::env::var(PASSWORD_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(Zeroizing::new)
}

/// Password for a new note: NOTES_PASSWORD, else a confirmed prompt.
pub fn new_note_password(interactive: bool) -> anyhow::Result<Zeroizing<String>> {
    if let Some(password) = read_password_from_env() {
        return Ok(password);
    }
    if !interactive {
        return Err(CliError::invalid_input(format!(
            "No password provided and no TTY available. Set {}.",
            PASSWORD_ENV
        ))
        .into());
    }
    Password::new()
        .with_prompt("Note password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .map(Zeroizing::new)
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))
}

/// Asks on the terminal when an encrypted note is read without a password.
pub struct TerminalPrompt;

impl PasswordPrompt for TerminalPrompt {
    fn password_for(&self, note_id: &str) -> Option<String> {
        Password::new()
            .with_prompt(format!("Password for note {}", short_id(note_id)))
            .interact()
            .ok()
    }
}

/// Read the note body from --body, stdin, or $EDITOR.
pub fn read_note_body(no_input: bool, body: Option<String>) -> anyhow::Result<String> {
    if let Some(value) = body {
        if value.trim().is_empty() {
            return Err(CliError::invalid_input("--body cannot be empty").into());
        }
        return Ok(value);
    }

    if !io::stdin().is_terminal() {
        let mut buffer = Vec::new();
        io::stdin()
            .read_to_end(&mut buffer)
            .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
        return body_from_bytes(buffer);
    }

    if no_input {
        return Err(
            CliError::invalid_input("--no-input requires --body or content on stdin").into(),
        );
    }

    read_body_from_editor()
}

fn body_from_bytes(bytes: Vec<u8>) -> anyhow::Result<String> {
    let text = String::from_utf8(bytes)
        .map_err(|_| CliError::invalid_input("Note body must be valid UTF-8"))?;
    let trimmed = text.trim_end().to_string();
    if trimmed.is_empty() {
        return Err(CliError::invalid_input("No input provided on stdin").into());
    }
    Ok(trimmed)
}

/// Open $EDITOR to compose the note body.
fn read_body_from_editor() -> anyhow::Result<String> {
    let editor = std::env::var("EDITOR").map_err(|_| {
        anyhow::anyhow!("$EDITOR is not set; use --body or pipe content via stdin")
    })?;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| anyhow::anyhow!("System time error: {}", e))?
        .as_nanos();
    let filename = format!("notes_body_{}_{}.txt", std::process::id(), nanos);
    let path = std::env::temp_dir().join(filename);

    std::fs::write(&path, "").map_err(|e| anyhow::anyhow!("Failed to create temp file: {}", e))?;

    let status = Command::new(editor)
        .arg(&path)
        .status()
        .map_err(|e| anyhow::anyhow!("Failed to launch editor: {}", e))?;
    if !status.success() {
        let _ = std::fs::remove_file(&path);
        return Err(anyhow::anyhow!("Editor exited with failure"));
    }

    let contents = std::fs::read(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read temp file: {}", e))?;
    let _ = std::fs::remove_file(&path);

    body_from_bytes(contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_flag_wins() {
        let body = read_note_body(true, Some("hello".to_string())).unwrap();
        assert_eq!(body, "hello");
    }

    #[test]
    fn test_blank_body_flag_rejected() {
        let err = read_note_body(true, Some("   ".to_string())).unwrap_err();
        assert!(err.downcast_ref::<CliError>().is_some());
    }

    #[test]
    fn test_body_bytes_trimmed() {
        assert_eq!(body_from_bytes(b"line\n\n".to_vec()).unwrap(), "line");
    }

    #[test]
    fn test_body_bytes_must_be_utf8() {
        let err = body_from_bytes(vec![0xff, 0xfe]).unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_empty_body_bytes_rejected() {
        assert!(body_from_bytes(b"\n".to_vec()).is_err());
    }
}
