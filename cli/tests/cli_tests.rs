//! Integration tests for help output, logging flags and the call command

use assert_cmd::prelude::*;
use predicates::prelude::*;

mod common;
use common::TestHome;

#[test]
fn test_help_lists_commands() {
    let home = TestHome::new();

    home.command()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("call"))
        .stdout(predicate::str::contains("balance"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_call_help_shows_options() {
    let home = TestHome::new();

    home.command()
        .args(["call", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--max-price"))
        .stdout(predicate::str::contains("--prefer-cheap"))
        .stdout(predicate::str::contains("--provider"))
        .stdout(predicate::str::contains("--confirm"));
}

#[test]
fn test_version() {
    let home = TestHome::new();

    home.command()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_command_is_usage_error() {
    let home = TestHome::new();
    home.command().assert().code(2);
}

#[test]
fn test_call_requires_params() {
    let home = TestHome::initialized("solana");
    home.command().args(["call", "weather"]).assert().code(2);
}

#[test]
fn test_call_without_config() {
    let home = TestHome::new();

    home.command()
        .args(["call", "weather", "{}"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("x402-router init"));
}

#[test]
fn test_call_registry_unreachable() {
    let home = TestHome::initialized("solana");

    home.command()
        .args(["call", "weather", "{\"city\":\"Lisbon\"}"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Call to 'weather' failed"))
        .stderr(predicate::str::contains("Failed to discover providers"));
}

#[test]
fn test_failures_are_logged_unless_quiet() {
    let home = TestHome::initialized("solana");

    home.command()
        .args(["call", "weather", "plain text"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("WARN"));

    home.command()
        .args(["-q", "call", "weather", "plain text"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("WARN").not());
}

#[test]
fn test_router_progress_follows_logging_setting() {
    let home = TestHome::initialized("solana");

    home.command()
        .args(["call", "weather", "{}"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("INFO"))
        .stderr(predicate::str::contains("discovering providers"));

    home.command()
        .args(["config", "set", "logging", "false"])
        .assert()
        .success();

    home.command()
        .args(["call", "weather", "{}"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("discovering providers").not());
}
