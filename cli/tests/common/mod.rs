//! Common test utilities for x402-router CLI tests

#![allow(dead_code)]

use solana_sdk::signature::{Keypair, Signer};
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// Registry that refuses connections, so commands fail fast without network
pub const UNREACHABLE_REGISTRY: &str = "http://127.0.0.1:1";

/// Scratch `$HOME` with a keypair file in it
pub struct TestHome {
    pub dir: TempDir,
    pub keypair_path: PathBuf,
    pub pubkey: String,
}

impl TestHome {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let keypair = Keypair::new();
        let keypair_path = dir.path().join("payer.json");
        let bytes = keypair.to_bytes().to_vec();
        fs::write(&keypair_path, serde_json_bytes(&bytes)).expect("Failed to write keypair");

        Self {
            dir,
            keypair_path,
            pubkey: keypair.pubkey().to_string(),
        }
    }

    /// Home with a config written by `init`
    pub fn initialized(chain: &str) -> Self {
        let home = Self::new();
        home.command()
            .args(["init", "--keypair"])
            .arg(&home.keypair_path)
            .args(["--chain", chain, "--registry", UNREACHABLE_REGISTRY])
            .status()
            .expect("init should run");
        home
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join(".x402-router").join("config.toml")
    }

    pub fn config_text(&self) -> String {
        fs::read_to_string(self.config_path()).expect("config should exist")
    }

    /// `abcd...wxyz` form of the wallet address
    pub fn short_pubkey(&self) -> String {
        let p = &self.pubkey;
        format!("{}...{}", &p[..4], &p[p.len() - 4..])
    }

    pub fn command(&self) -> Command {
        test_command(&self.dir)
    }
}

fn serde_json_bytes(bytes: &[u8]) -> String {
    let parts: Vec<String> = bytes.iter().map(|b| b.to_string()).collect();
    format!("[{}]", parts.join(","))
}

/// Create a test command isolated to `temp_dir`.
///
/// HOME points at the temp dir so the router uses `$HOME/.x402-router/`.
pub fn test_command(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("x402-router"));
    cmd.env("HOME", temp_dir.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("X402_ROUTER_CONFIRM");
    cmd
}
