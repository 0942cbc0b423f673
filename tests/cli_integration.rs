//! Integration tests for the pwvault CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.  The
//! master password comes from `PWVAULT_MASTER_PASSWORD` and item passwords
//! are piped on stdin, so nothing here needs a terminal.  Every project
//! directory gets a `.pwvault.toml` with a low iteration count to keep
//! the tests fast.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const MASTER: &str = "correcthorsebatterystaple";
const TOKEN_SECRET: &str = "integration-test-token-secret";

/// Helper: get a Command pointing at the pwvault binary.
fn pwvault() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("pwvault").expect("binary should exist");
    cmd.env_remove("PWVAULT_TOKEN")
        .env_remove("PWVAULT_TOKEN_SECRET")
        .env_remove("PWVAULT_MASTER_PASSWORD")
        .env_remove("PWVAULT_LOG");
    cmd
}

/// A project directory with a fast KDF config.
fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    tmp.child(".pwvault.toml")
        .write_str(&format!(
            "pbkdf2_iterations = 1000\ntoken_secret = \"{TOKEN_SECRET}\"\n"
        ))
        .unwrap();
    tmp
}

/// Run `pwvault add` and return the new item's id.
fn add_item(dir: &TempDir, owner: &str, title: &str, password: &str) -> String {
    let out = pwvault()
        .current_dir(dir.path())
        .env("PWVAULT_MASTER_PASSWORD", MASTER)
        .args(["--owner", owner, "add", "--title", title, "--username", "alice@example.com"])
        .write_stdin(format!("{password}\n"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let out = String::from_utf8(out).unwrap();
    let start = out.rfind('(').expect("id in output") + 1;
    let end = out.rfind(')').expect("id in output");
    out[start..end].to_string()
}

#[test]
fn help_flag_shows_usage() {
    pwvault()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Password vault"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("edit"))
        .stdout(predicate::str::contains("delete"))
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("rekey"))
        .stdout(predicate::str::contains("token"));
}

#[test]
fn version_flag_shows_version() {
    pwvault()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pwvault"));
}

#[test]
fn version_command_shows_default_kdf() {
    pwvault()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pbkdf2-sha256"));
}

#[test]
fn no_args_shows_help() {
    pwvault()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn add_then_list_and_get() {
    let dir = project();
    let id = add_item(&dir, "alice", "Gmail", "Sup3rS3cret!");

    dir.child(".pwvault/items.pwv").assert(predicate::path::exists());

    pwvault()
        .current_dir(dir.path())
        .env("PWVAULT_MASTER_PASSWORD", MASTER)
        .args(["--owner", "alice", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Gmail"))
        .stdout(predicate::str::contains(id.as_str()));

    pwvault()
        .current_dir(dir.path())
        .env("PWVAULT_MASTER_PASSWORD", MASTER)
        .args(["--owner", "alice", "get", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sup3rS3cret!"))
        .stdout(predicate::str::contains("alice@example.com"));
}

#[test]
fn store_file_holds_no_plaintext() {
    let dir = project();
    add_item(&dir, "alice", "Gmail", "Sup3rS3cret!");

    let raw = std::fs::read(dir.path().join(".pwvault/items.pwv")).unwrap();
    let raw = String::from_utf8_lossy(&raw);
    assert!(!raw.contains("Sup3rS3cret!"));
    assert!(!raw.contains("Gmail"));
    assert!(!raw.contains("alice@example.com"));
}

#[test]
fn get_with_wrong_master_password_fails() {
    let dir = project();
    let id = add_item(&dir, "alice", "Gmail", "Sup3rS3cret!");

    pwvault()
        .current_dir(dir.path())
        .env("PWVAULT_MASTER_PASSWORD", "not-the-right-one")
        .args(["--owner", "alice", "get", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Decryption failed"))
        .stdout(predicate::str::contains("Sup3rS3cret!").not());
}

#[test]
fn short_master_password_rejected() {
    let dir = project();

    pwvault()
        .current_dir(dir.path())
        .env("PWVAULT_MASTER_PASSWORD", "short")
        .args(["add", "--title", "Gmail"])
        .write_stdin("Sup3rS3cret!\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 8"));
}

#[test]
fn items_are_scoped_to_owner() {
    let dir = project();
    let id = add_item(&dir, "alice", "Gmail", "Sup3rS3cret!");

    pwvault()
        .current_dir(dir.path())
        .env("PWVAULT_MASTER_PASSWORD", MASTER)
        .args(["--owner", "bob", "get", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    pwvault()
        .current_dir(dir.path())
        .env("PWVAULT_MASTER_PASSWORD", MASTER)
        .args(["--owner", "bob", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Gmail").not());
}

#[test]
fn token_identifies_owner() {
    let dir = project();
    add_item(&dir, "carol", "Bank", "Sup3rS3cret!");

    let out = pwvault()
        .current_dir(dir.path())
        .args(["token", "issue", "carol"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let out = String::from_utf8(out).unwrap();
    let token = out.lines().next().unwrap().trim().to_string();
    assert!(token.starts_with("pwv1."));

    pwvault()
        .current_dir(dir.path())
        .env("PWVAULT_MASTER_PASSWORD", MASTER)
        .env("PWVAULT_TOKEN", &token)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Bank"));

    pwvault()
        .current_dir(dir.path())
        .args(["token", "verify", &token])
        .assert()
        .success()
        .stdout(predicate::str::contains("carol"));
}

#[test]
fn bad_token_is_rejected() {
    let dir = project();

    pwvault()
        .current_dir(dir.path())
        .env("PWVAULT_MASTER_PASSWORD", MASTER)
        .args(["--token", "pwv1.bogus.token", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unauthorized"));
}

#[test]
fn delete_with_force_removes_item() {
    let dir = project();
    let id = add_item(&dir, "alice", "Gmail", "Sup3rS3cret!");

    pwvault()
        .current_dir(dir.path())
        .args(["--owner", "alice", "delete", &id, "--force"])
        .assert()
        .success();

    pwvault()
        .current_dir(dir.path())
        .env("PWVAULT_MASTER_PASSWORD", MASTER)
        .args(["--owner", "alice", "get", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn edit_flags_update_fields() {
    let dir = project();
    let id = add_item(&dir, "alice", "Gmail", "Sup3rS3cret!");

    pwvault()
        .current_dir(dir.path())
        .env("PWVAULT_MASTER_PASSWORD", MASTER)
        .args(["--owner", "alice", "edit", &id, "--url", "https://mail.google.com"])
        .assert()
        .success();

    pwvault()
        .current_dir(dir.path())
        .env("PWVAULT_MASTER_PASSWORD", MASTER)
        .args(["--owner", "alice", "get", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://mail.google.com"))
        .stdout(predicate::str::contains("Sup3rS3cret!"));
}

#[test]
fn rekey_keeps_items_readable() {
    let dir = project();
    let id = add_item(&dir, "alice", "Gmail", "Sup3rS3cret!");

    // Switch new envelopes to a different iteration count.
    dir.child(".pwvault.toml")
        .write_str(&format!(
            "pbkdf2_iterations = 1200\ntoken_secret = \"{TOKEN_SECRET}\"\n"
        ))
        .unwrap();

    pwvault()
        .current_dir(dir.path())
        .env("PWVAULT_MASTER_PASSWORD", MASTER)
        .args(["--owner", "alice", "rekey"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 items re-encrypted"));

    pwvault()
        .current_dir(dir.path())
        .env("PWVAULT_MASTER_PASSWORD", MASTER)
        .args(["--owner", "alice", "get", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sup3rS3cret!"));
}

#[test]
fn generate_prints_password_of_requested_length() {
    let out = pwvault()
        .args(["generate", "--length", "24", "--no-symbols"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let out = String::from_utf8(out).unwrap();
    let pw = out.trim();
    assert_eq!(pw.chars().count(), 24);
    assert!(pw.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[test]
fn generate_rejects_short_length() {
    pwvault()
        .args(["generate", "--length", "4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("between 8 and 128"));
}

#[test]
fn list_on_missing_store_fails() {
    let dir = project();

    pwvault()
        .current_dir(dir.path())
        .env("PWVAULT_MASTER_PASSWORD", MASTER)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Store not found"));
}

#[cfg(feature = "audit-log")]
#[test]
fn audit_records_operations() {
    let dir = project();
    add_item(&dir, "alice", "Gmail", "Sup3rS3cret!");

    pwvault()
        .current_dir(dir.path())
        .args(["--owner", "alice", "audit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("Sup3rS3cret!").not());
}

#[test]
fn completions_bash() {
    pwvault()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pwvault"));
}
