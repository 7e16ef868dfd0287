use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread::sleep;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection};

const DEFAULT_TOPIC: &str = "/shared-notes/1/note/json";

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_notes"))
}

struct TestEnv {
    config_home: PathBuf,
    data_home: PathBuf,
    store: PathBuf,
}

impl TestEnv {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time")
            .as_nanos();
        let base = std::env::temp_dir().join(format!(
            "notes_{}_{}_{}",
            prefix,
            std::process::id(),
            nanos
        ));
        let config_home = base.join("config");
        let data_home = base.join("data");
        std::fs::create_dir_all(&config_home).expect("create config dir");
        std::fs::create_dir_all(&data_home).expect("create data dir");
        let store = base.join("notes.db");
        Self {
            config_home,
            data_home,
            store,
        }
    }

    /// Command with isolated XDG dirs and the test store.
    fn cmd(&self) -> Command {
        let mut cmd = self.bare_cmd();
        cmd.env("NOTES_STORE", &self.store);
        cmd
    }

    /// Command with isolated XDG dirs and no store override.
    fn bare_cmd(&self) -> Command {
        let mut cmd = Command::new(bin());
        cmd.env("XDG_CONFIG_HOME", &self.config_home)
            .env("XDG_DATA_HOME", &self.data_home)
            .env("NO_COLOR", "1")
            .env_remove("NOTES_STORE")
            .env_remove("NOTES_TOPIC")
            .env_remove("NOTES_CONFIG")
            .env_remove("NOTES_PASSWORD")
            .env_remove("NOTES_LOG");
        cmd
    }

    fn write_config(&self, contents: &str) {
        let path = self.config_home.join("notes").join("config.toml");
        std::fs::create_dir_all(path.parent().expect("config parent")).expect("create dir");
        std::fs::write(path, contents).expect("write config");
    }
}

fn run(mut cmd: Command, args: &[&str]) -> Output {
    cmd.args(args).output().expect("run notes")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "stdout: {}\nstderr: {}",
        stdout(output),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn create_json(env: &TestEnv, args: &[&str]) -> serde_json::Value {
    let mut full = vec!["create", "--json", "--no-input"];
    full.extend_from_slice(args);
    let output = run(env.cmd(), &full);
    assert_success(&output);
    serde_json::from_slice(&output.stdout).expect("create emits JSON")
}

#[test]
fn test_plaintext_create_then_read() {
    let env = TestEnv::new("plain");
    let created = create_json(&env, &["--body", "hello world"]);
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 32);
    assert!(created["password"].is_null());
    assert_eq!(created["topic"], DEFAULT_TOPIC);

    let output = run(env.cmd(), &["read", &id]);
    assert_success(&output);
    assert_eq!(stdout(&output).trim_end(), "hello world");
}

#[test]
fn test_encrypted_create_returns_token() {
    let env = TestEnv::new("token");
    let created = create_json(&env, &["--body", "secret", "--encrypt"]);
    let id = created["id"].as_str().unwrap().to_string();
    let password = created["password"].as_str().unwrap().to_string();
    assert_eq!(password.len(), 64);
    assert!(password.chars().all(|c| c.is_ascii_hexdigit()));

    let output = run(env.cmd(), &["read", &id, "--password", &password, "--json"]);
    assert_success(&output);
    let read: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(read["content"], "secret");

    let zeros = "0".repeat(64);
    let output = run(env.cmd(), &["read", &id, "--password", &zeros]);
    assert_ne!(stdout(&output).trim_end(), "secret");
}

#[test]
fn test_authenticated_wrong_password_exits_auth_failed() {
    let env = TestEnv::new("authfail");
    let created = create_json(&env, &["--body", "secret", "--encrypt", "--authenticate"]);
    let id = created["id"].as_str().unwrap().to_string();

    let output = run(env.cmd(), &["read", &id, "--password", "wrong"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_missing_password_exits_auth_failed() {
    let env = TestEnv::new("nopass");
    let created = create_json(&env, &["--body", "locked", "--encrypt"]);
    let id = created["id"].as_str().unwrap().to_string();

    let output = run(env.cmd(), &["read", &id, "--no-input"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(String::from_utf8_lossy(&output.stderr).contains("NOTES_PASSWORD"));
}

#[test]
fn test_unknown_note_exits_not_found() {
    let env = TestEnv::new("missing");
    let output = run(env.cmd(), &["read", "nonexistent-id"]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_password_from_env() {
    let env = TestEnv::new("envpass");
    let mut cmd = env.cmd();
    cmd.env("NOTES_PASSWORD", "correct horse");
    let output = run(
        cmd,
        &["create", "--json", "--no-input", "--password", "--body", "chosen"],
    );
    assert_success(&output);
    let created: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(created["password"].is_null());
    assert_eq!(created["encrypted"], true);
    let id = created["id"].as_str().unwrap().to_string();

    let mut cmd = env.cmd();
    cmd.env("NOTES_PASSWORD", "correct horse");
    let output = run(cmd, &["read", &id]);
    assert_success(&output);
    assert_eq!(stdout(&output).trim_end(), "chosen");
}

#[test]
fn test_create_password_without_tty_or_env_is_invalid_input() {
    let env = TestEnv::new("nopassenv");
    let output = run(env.cmd(), &["create", "--password", "--body", "x"]);
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_body_from_stdin() {
    let env = TestEnv::new("stdin");
    let mut child = env
        .cmd()
        .args(["create", "--json"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn notes");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"piped body\n")
        .expect("write stdin");
    let output = child.wait_with_output().expect("wait");
    assert_success(&output);
    let created: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    let output = run(env.cmd(), &["read", &id]);
    assert_eq!(stdout(&output).trim_end(), "piped body");
}

#[test]
fn test_list_reports_notes_and_skips_foreign_payloads() {
    let env = TestEnv::new("list");
    let plain = create_json(&env, &["--body", "one"]);
    let locked = create_json(&env, &["--body", "two", "--encrypt"]);

    let conn = Connection::open(&env.store).expect("open store");
    conn.execute(
        "INSERT INTO messages (topic, payload, timestamp) VALUES (?1, ?2, NULL)",
        params![DEFAULT_TOPIC, b"{not a note".to_vec()],
    )
    .expect("insert foreign payload");
    drop(conn);

    let output = run(env.cmd(), &["list", "--json"]);
    assert_success(&output);
    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["id"], plain["id"]);
    assert_eq!(listed[0]["encrypted"], false);
    assert_eq!(listed[1]["id"], locked["id"]);
    assert_eq!(listed[1]["encrypted"], true);

    let output = run(env.cmd(), &["list", "--encrypted-only"]);
    assert_success(&output);
    let text = stdout(&output);
    assert_eq!(text.lines().count(), 1);
    assert!(text.contains(locked["id"].as_str().unwrap()));
}

#[test]
fn test_topics_are_separate() {
    let env = TestEnv::new("topics");
    let created = create_json(&env, &["--body", "team only"]);
    let id = created["id"].as_str().unwrap().to_string();

    let mut cmd = env.cmd();
    cmd.env("NOTES_TOPIC", "/other/1/note/json");
    let output = run(cmd, &["read", &id]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_config_file_supplies_store_and_topic() {
    let env = TestEnv::new("config");
    let store = env.data_home.join("from-config.db");
    env.write_config(&format!(
        "[store]\npath = \"{}\"\n\n[topic]\nname = \"/team/1/note/json\"\n",
        store.display()
    ));

    let output = run(
        env.bare_cmd(),
        &["create", "--json", "--no-input", "--body", "configured"],
    );
    assert_success(&output);
    let created: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(created["topic"], "/team/1/note/json");
    assert!(store.exists());

    // Flag beats config.
    let output = run(
        env.bare_cmd(),
        &["list", "--json", "--topic", DEFAULT_TOPIC],
    );
    assert_success(&output);
    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(listed.as_array().unwrap().is_empty());
}

#[test]
fn test_default_store_under_xdg_data_home() {
    let env = TestEnv::new("xdg");
    let output = run(
        env.bare_cmd(),
        &["create", "--no-input", "--body", "default path"],
    );
    assert_success(&output);
    assert!(Path::new(&env.data_home).join("notes").join("notes.db").exists());
}

#[test]
fn test_quiet_create_prints_id_only() {
    let env = TestEnv::new("quiet");
    let output = run(env.cmd(), &["create", "-q", "--no-input", "--body", "q"]);
    assert_success(&output);
    let text = stdout(&output);
    assert_eq!(text.lines().count(), 1);
    assert_eq!(text.trim_end().len(), 32);
}

#[test]
fn test_completions() {
    let env = TestEnv::new("completions");
    let output = run(env.bare_cmd(), &["completions", "bash"]);
    assert_success(&output);
    assert!(stdout(&output).contains("notes"));
}

#[test]
fn test_watch_prints_new_notes() {
    let env = TestEnv::new("watch");
    create_json(&env, &["--body", "already there"]);

    let mut watcher = env
        .cmd()
        .args(["watch", "--limit", "1", "--json"])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn watch");

    sleep(Duration::from_millis(500));
    let created = create_json(&env, &["--body", "fresh"]);

    let deadline = Instant::now() + Duration::from_secs(20);
    let status = loop {
        if let Some(status) = watcher.try_wait().expect("poll watcher") {
            break Some(status);
        }
        if Instant::now() > deadline {
            let _ = watcher.kill();
            break None;
        }
        sleep(Duration::from_millis(50));
    };
    assert!(status.is_some_and(|s| s.success()), "watch did not finish");

    let mut out = String::new();
    watcher
        .stdout
        .take()
        .expect("stdout")
        .read_to_string(&mut out)
        .expect("read watch output");
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 1);
    let seen: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(seen["id"], created["id"]);
}
