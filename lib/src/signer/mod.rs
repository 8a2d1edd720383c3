//! Transaction signing capability.
//!
//! The router never holds key material. Everything it needs from a wallet is
//! the [`TransactionSigner`] trait: a public identity and an asynchronous
//! signing call. [`FileSigner`] signs with a local keypair file and
//! [`WalletSigner`] hands each transaction to an external wallet loop.

mod file;
mod wallet;

pub use file::FileSigner;
pub use wallet::{SigningRequest, WalletRequests, WalletSigner};

use crate::error::Result;
use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;

/// A public identity that can authorize transactions.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// The identity paying for transfers. Stable for the signer's lifetime.
    fn pubkey(&self) -> Pubkey;

    /// Add this identity's signature to `transaction`.
    ///
    /// May wait indefinitely on user approval.
    async fn sign_transaction(&self, transaction: Transaction) -> Result<Transaction>;
}
