use super::TransactionSigner;
use crate::error::{Result, RouterError};
use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// Pending requests a connected wallet can hold before callers wait
const DEFAULT_QUEUE_DEPTH: usize = 16;

/// A transaction waiting for the wallet's decision.
#[derive(Debug)]
pub struct SigningRequest {
    transaction: Transaction,
    reply: oneshot::Sender<Result<Transaction>>,
}

impl SigningRequest {
    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    /// Take the transaction out to sign it. Answer with [`SigningRequest::approve`].
    pub fn into_parts(self) -> (Transaction, SigningReply) {
        (self.transaction, SigningReply { reply: self.reply })
    }

    /// Hand back the signed transaction.
    pub fn approve(self, signed: Transaction) {
        self.into_parts().1.approve(signed);
    }

    pub fn reject(self, reason: impl Into<String>) {
        self.into_parts().1.reject(reason);
    }
}

/// Answer channel for a request whose transaction has been taken out.
#[derive(Debug)]
pub struct SigningReply {
    reply: oneshot::Sender<Result<Transaction>>,
}

impl SigningReply {
    pub fn approve(self, signed: Transaction) {
        // The caller may have given up on the call; nothing to do then.
        let _ = self.reply.send(Ok(signed));
    }

    pub fn reject(self, reason: impl Into<String>) {
        let reason = reason.into();
        let _ = self
            .reply
            .send(Err(RouterError::wallet(format!("signing rejected: {reason}"))));
    }

    pub fn fail(self, error: RouterError) {
        let _ = self.reply.send(Err(error));
    }
}

/// The wallet side of a [`WalletSigner`]: a stream of signing requests.
#[derive(Debug)]
pub struct WalletRequests {
    rx: mpsc::Receiver<SigningRequest>,
}

impl WalletRequests {
    /// Next request, or `None` once every signer handle is dropped.
    pub async fn next(&mut self) -> Option<SigningRequest> {
        self.rx.recv().await
    }
}

/// Signer backed by an external, possibly interactive, wallet.
///
/// Each call to [`TransactionSigner::sign_transaction`] is forwarded to the
/// paired [`WalletRequests`] and waits until the wallet answers. Requests are
/// delivered one at a time in arrival order; callers beyond the queue depth
/// wait for room.
#[derive(Debug, Clone)]
pub struct WalletSigner {
    pubkey: Pubkey,
    requests: mpsc::Sender<SigningRequest>,
}

impl WalletSigner {
    /// Create a signer for `pubkey` and the wallet end that serves it.
    pub fn connect(pubkey: Pubkey) -> (Self, WalletRequests) {
        Self::with_queue_depth(pubkey, DEFAULT_QUEUE_DEPTH)
    }

    pub fn with_queue_depth(pubkey: Pubkey, depth: usize) -> (Self, WalletRequests) {
        let (tx, rx) = mpsc::channel(depth.max(1));
        (
            Self {
                pubkey,
                requests: tx,
            },
            WalletRequests { rx },
        )
    }
}

#[async_trait]
impl TransactionSigner for WalletSigner {
    fn pubkey(&self) -> Pubkey {
        self.pubkey
    }

    async fn sign_transaction(&self, transaction: Transaction) -> Result<Transaction> {
        let (reply, response) = oneshot::channel();
        debug!(pubkey = %self.pubkey, "requesting wallet signature");

        self.requests
            .send(SigningRequest { transaction, reply })
            .await
            .map_err(|_| RouterError::wallet("wallet is not connected"))?;

        response
            .await
            .map_err(|_| RouterError::wallet("wallet closed the signing request without answering"))?
    }
}
