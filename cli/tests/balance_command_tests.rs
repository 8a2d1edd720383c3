//! Integration tests for the balance command

use assert_cmd::prelude::*;
use predicates::prelude::*;

mod common;
use common::TestHome;

#[test]
fn test_balance_no_config() {
    let home = TestHome::new();

    home.command()
        .arg("balance")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_balance_unsupported_chain_reads_zero() {
    let home = TestHome::initialized("ethereum");

    home.command()
        .arg("balance")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ethereum"))
        .stdout(predicate::str::contains(home.short_pubkey()))
        .stdout(predicate::str::contains("$0.0000 USDC"));
}

#[test]
fn test_balance_chain_without_wallet() {
    let home = TestHome::initialized("solana");

    home.command()
        .args(["balance", "--chain", "base"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No Base wallet configured"));
}

#[test]
fn test_balance_unknown_chain() {
    let home = TestHome::initialized("solana");

    home.command()
        .args(["balance", "--chain", "bitcoin"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown chain"));
}
