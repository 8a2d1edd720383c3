//! Shared fakes for library integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::transaction::Transaction;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use x402_router_lib::constants::USDC_MINT;
use x402_router_lib::{
    FileSigner, HttpMethod, HttpRequest, HttpResponse, HttpTransport, Ledger, Provider,
    Result, RouterError, TransactionSigner,
};

pub const REGISTRY: &str = "https://registry.test";

pub fn provider(id: &str, price: f64) -> Provider {
    Provider {
        id: id.to_string(),
        url: format!("https://{id}.test"),
        wallet: Pubkey::new_unique().to_string(),
        price,
        reputation: 4.0,
        latency: 100.0,
    }
}

pub fn discovery_body(providers: &[Provider], ttl: u64) -> Value {
    json!({ "providers": providers, "cacheTTL": ttl })
}

pub fn discover_url() -> String {
    format!("{REGISTRY}/discover")
}

pub fn call_url(provider: &Provider) -> String {
    format!("{}/call", provider.url)
}

/// Canned reply for one route
#[derive(Debug, Clone)]
pub enum Reply {
    Json(u32, Value),
    Text(u32, String),
    /// Never answers
    Hang,
    /// Transport-level failure
    Fail(String),
}

struct AbortFlag(Arc<AtomicBool>);

impl Drop for AbortFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// In-memory transport keyed by method and URL. Unknown routes answer 404.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(HttpMethod, String), Reply>>,
    requests: Mutex<Vec<HttpRequest>>,
    aborted: Arc<AtomicBool>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn route(&self, method: HttpMethod, url: impl Into<String>, reply: Reply) {
        self.routes.lock().unwrap().insert((method, url.into()), reply);
    }

    pub fn registry(&self, providers: &[Provider], ttl: u64) {
        self.route(
            HttpMethod::Post,
            discover_url(),
            Reply::Json(200, discovery_body(providers, ttl)),
        );
    }

    pub fn provider_replies(&self, provider: &Provider, reply: Reply) {
        self.route(HttpMethod::Post, call_url(provider), reply);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, url: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.url == url)
            .collect()
    }

    pub fn count(&self, url: &str) -> usize {
        self.requests_to(url).len()
    }

    /// Whether a hanging request was dropped before it finished
    pub fn was_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let key = (request.method, request.url.clone());
        self.requests.lock().unwrap().push(request);
        let reply = self.routes.lock().unwrap().get(&key).cloned();

        match reply {
            Some(Reply::Json(status, body)) => Ok(HttpResponse {
                status_code: status,
                headers: HashMap::new(),
                body: serde_json::to_vec(&body)?,
            }),
            Some(Reply::Text(status, body)) => Ok(HttpResponse {
                status_code: status,
                headers: HashMap::new(),
                body: body.into_bytes(),
            }),
            Some(Reply::Hang) => {
                let _flag = AbortFlag(Arc::clone(&self.aborted));
                std::future::pending::<()>().await;
                unreachable!("pending future resolved")
            }
            Some(Reply::Fail(message)) => Err(RouterError::Http(message)),
            None => Ok(HttpResponse {
                status_code: 404,
                headers: HashMap::new(),
                body: br#"{"error":"not found"}"#.to_vec(),
            }),
        }
    }
}

/// In-memory ledger holding one token balance for the payer.
#[derive(Default)]
pub struct FakeLedger {
    balance: Mutex<Option<u64>>,
    balance_error: Mutex<Option<String>>,
    existing: Mutex<HashSet<Pubkey>>,
    send_error: Mutex<Option<String>>,
    submitted: Mutex<Vec<Transaction>>,
}

impl FakeLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Ledger where the payer holds `usdc` and every token account exists.
    pub fn funded(usdc: f64) -> Arc<Self> {
        let ledger = Self::default();
        ledger.set_balance(Some((usdc * 1_000_000.0).round() as u64));
        ledger.all_accounts_exist();
        Arc::new(ledger)
    }

    pub fn set_balance(&self, atomic: Option<u64>) {
        *self.balance.lock().unwrap() = atomic;
    }

    pub fn fail_balance(&self, message: &str) {
        *self.balance_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn fail_send(&self, message: &str) {
        *self.send_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn add_account(&self, address: &Pubkey) {
        self.existing.lock().unwrap().insert(*address);
    }

    /// Treat any account as existing
    pub fn all_accounts_exist(&self) {
        self.existing.lock().unwrap().insert(Pubkey::default());
    }

    pub fn submitted(&self) -> Vec<Transaction> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl Ledger for FakeLedger {
    async fn account_exists(&self, address: &Pubkey) -> Result<bool> {
        let existing = self.existing.lock().unwrap();
        Ok(existing.contains(&Pubkey::default()) || existing.contains(address))
    }

    async fn token_balance(&self, _token_account: &Pubkey) -> Result<Option<u64>> {
        if let Some(message) = self.balance_error.lock().unwrap().clone() {
            return Err(RouterError::payment(message));
        }
        Ok(*self.balance.lock().unwrap())
    }

    async fn latest_blockhash(&self) -> Result<Hash> {
        Ok(Hash::new_unique())
    }

    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature> {
        if let Some(message) = self.send_error.lock().unwrap().clone() {
            return Err(RouterError::payment(format!("Transaction failed: {message}")));
        }
        self.submitted.lock().unwrap().push(transaction.clone());
        Ok(transaction.signatures[0])
    }
}

/// Associated USDC account of `owner`
pub fn token_account(owner: &Pubkey) -> Pubkey {
    spl_associated_token_account::get_associated_token_address(owner, &USDC_MINT)
}

/// Local signer that counts how often it is asked to sign.
pub struct CountingSigner {
    inner: FileSigner,
    calls: AtomicUsize,
}

impl CountingSigner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: FileSigner::from_keypair(Keypair::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransactionSigner for CountingSigner {
    fn pubkey(&self) -> Pubkey {
        self.inner.pubkey()
    }

    async fn sign_transaction(&self, transaction: Transaction) -> Result<Transaction> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.sign_transaction(transaction).await
    }
}
