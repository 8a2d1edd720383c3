//! Ledger access needed to settle payments.

use crate::error::{Result, RouterError};
use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use spl_token::solana_program::program_pack::Pack;
use std::fmt;

/// Read and submit operations on the settlement ledger.
///
/// Errors carry the ledger's own detail and are reported as
/// [`RouterError::Payment`].
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn account_exists(&self, address: &Pubkey) -> Result<bool>;

    /// Token balance of a token account in base units, `None` if the account
    /// does not exist.
    async fn token_balance(&self, token_account: &Pubkey) -> Result<Option<u64>>;

    async fn latest_blockhash(&self) -> Result<Hash>;

    /// Submit a signed transaction and wait for confirmation.
    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature>;
}

/// Solana JSON-RPC ledger at `confirmed` commitment.
pub struct SolanaRpcLedger {
    client: RpcClient,
}

impl SolanaRpcLedger {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            client: RpcClient::new_with_commitment(rpc_url.into(), CommitmentConfig::confirmed()),
        }
    }
}

#[async_trait]
impl Ledger for SolanaRpcLedger {
    async fn account_exists(&self, address: &Pubkey) -> Result<bool> {
        let response = self
            .client
            .get_account_with_commitment(address, self.client.commitment())
            .await
            .map_err(|e| RouterError::payment(format!("Failed to fetch account {address}: {e}")))?;
        Ok(response.value.is_some())
    }

    async fn token_balance(&self, token_account: &Pubkey) -> Result<Option<u64>> {
        let response = self
            .client
            .get_account_with_commitment(token_account, self.client.commitment())
            .await
            .map_err(|e| {
                RouterError::payment(format!("Failed to fetch token account {token_account}: {e}"))
            })?;

        let Some(account) = response.value else {
            return Ok(None);
        };

        let state = spl_token::state::Account::unpack(&account.data).map_err(|e| {
            RouterError::payment(format!("Invalid token account {token_account}: {e}"))
        })?;
        Ok(Some(state.amount))
    }

    async fn latest_blockhash(&self) -> Result<Hash> {
        self.client
            .get_latest_blockhash()
            .await
            .map_err(|e| RouterError::payment(format!("Failed to fetch recent blockhash: {e}")))
    }

    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature> {
        self.client
            .send_and_confirm_transaction(transaction)
            .await
            .map_err(|e| RouterError::payment(format!("Transaction failed: {e}")))
    }
}

impl fmt::Debug for SolanaRpcLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolanaRpcLedger")
            .field("url", &self.client.url())
            .finish()
    }
}
