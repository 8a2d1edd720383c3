//! Paying providers and reading the spendable balance.

mod ledger;

pub use ledger::{Ledger, SolanaRpcLedger};

use crate::chain::Chain;
use crate::constants::{FREE_CALL_TOKEN, USDC_MINT};
use crate::currency::currencies::USDC;
use crate::error::{Result, RouterError};
use crate::signer::TransactionSigner;
use crate::types::Payment;
use chrono::Utc;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;
use spl_associated_token_account::get_associated_token_address;
use spl_associated_token_account::instruction::create_associated_token_account;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Creates USDC transfers authorized by a [`TransactionSigner`].
///
/// Only Solana settles payments. On other chains [`PaymentClient::create_payment`]
/// fails and [`PaymentClient::get_balance`] reports zero.
pub struct PaymentClient {
    signer: Arc<dyn TransactionSigner>,
    chain: Chain,
    ledger: Option<Arc<dyn Ledger>>,
}

impl PaymentClient {
    pub fn new(
        signer: Arc<dyn TransactionSigner>,
        chain: Chain,
        ledger: Option<Arc<dyn Ledger>>,
    ) -> Self {
        Self {
            signer,
            chain,
            ledger,
        }
    }

    /// Client talking to a Solana RPC endpoint. No ledger is attached for other
    /// chains or when `rpc_url` is empty.
    pub fn with_rpc(signer: Arc<dyn TransactionSigner>, chain: Chain, rpc_url: &str) -> Self {
        let ledger = match chain {
            Chain::Solana if !rpc_url.trim().is_empty() => {
                Some(Arc::new(SolanaRpcLedger::new(rpc_url)) as Arc<dyn Ledger>)
            }
            _ => None,
        };
        Self::new(signer, chain, ledger)
    }

    pub fn chain(&self) -> Chain {
        self.chain
    }

    /// The paying identity
    pub fn payer(&self) -> Pubkey {
        self.signer.pubkey()
    }

    /// Pay `amount` USDC to `to` for `resource` and wait for confirmation.
    ///
    /// A zero amount returns a waived payment without building, signing or
    /// submitting anything.
    pub async fn create_payment(&self, to: &str, amount: f64, resource: &str) -> Result<Payment> {
        if amount == 0.0 {
            warn!(resource, "free call: no payment made, proof token carries no signature");
            return Ok(self.payment(FREE_CALL_TOKEN.to_string(), to, 0.0, resource));
        }

        if self.chain != Chain::Solana {
            return Err(RouterError::payment(format!(
                "Payment creation not implemented for chain: {}",
                self.chain
            )));
        }
        let ledger = self
            .ledger
            .as_ref()
            .ok_or_else(|| RouterError::payment("Solana connection not initialized"))?;

        let recipient = Pubkey::from_str(to).map_err(|e| {
            RouterError::payment(format!(
                "Failed to create payment: invalid recipient address '{to}': {e}"
            ))
        })?;
        let atomic = USDC
            .to_atomic(amount)
            .map_err(|e| RouterError::payment(format!("Failed to create payment: {e}")))?;

        let sender = self.signer.pubkey();
        let instructions = self
            .transfer_instructions(ledger.as_ref(), &sender, &recipient, atomic)
            .await?;

        let blockhash = ledger.latest_blockhash().await?;
        let message = Message::new_with_blockhash(&instructions, Some(&sender), &blockhash);
        let unsigned = Transaction::new_unsigned(message);

        debug!(payer = %sender, "requesting signature");
        let signed = self.signer.sign_transaction(unsigned).await?;

        info!(amount, to, "sending payment");
        let signature = ledger.send_and_confirm(&signed).await?;
        info!(%signature, "payment confirmed");

        Ok(self.payment(signature.to_string(), to, amount, resource))
    }

    /// Spendable USDC balance of the signer.
    ///
    /// Zero when the token account does not exist yet, on chains without a
    /// payment implementation, and when no ledger is attached.
    pub async fn get_balance(&self) -> Result<f64> {
        let ledger = match (&self.ledger, self.chain) {
            (Some(ledger), Chain::Solana) => ledger,
            _ => return Ok(0.0),
        };

        let account = get_associated_token_address(&self.signer.pubkey(), &USDC_MINT);
        let balance = ledger
            .token_balance(&account)
            .await
            .map_err(|e| match e {
                RouterError::Payment(detail) => {
                    RouterError::payment(format!("Failed to get balance: {detail}"))
                }
                other => other,
            })?;

        Ok(balance.map(|atomic| USDC.from_atomic(atomic)).unwrap_or(0.0))
    }

    /// Token account creation for whichever side lacks one, then the transfer.
    async fn transfer_instructions(
        &self,
        ledger: &dyn Ledger,
        sender: &Pubkey,
        recipient: &Pubkey,
        atomic: u64,
    ) -> Result<Vec<Instruction>> {
        let token_program = spl_token::id();
        let sender_account = get_associated_token_address(sender, &USDC_MINT);
        let recipient_account = get_associated_token_address(recipient, &USDC_MINT);

        let (sender_exists, recipient_exists) = tokio::join!(
            ledger.account_exists(&sender_account),
            ledger.account_exists(&recipient_account),
        );

        let mut instructions = Vec::with_capacity(3);
        if !sender_exists? {
            instructions.push(create_associated_token_account(
                sender,
                sender,
                &USDC_MINT,
                &token_program,
            ));
        }
        if !recipient_exists? {
            instructions.push(create_associated_token_account(
                sender,
                recipient,
                &USDC_MINT,
                &token_program,
            ));
        }

        let transfer = spl_token::instruction::transfer_checked(
            &token_program,
            &sender_account,
            &USDC_MINT,
            &recipient_account,
            sender,
            &[],
            atomic,
            USDC.decimals,
        )
        .map_err(|e| RouterError::payment(format!("Failed to build transfer: {e}")))?;
        instructions.push(transfer);

        Ok(instructions)
    }

    fn payment(&self, token: String, to: &str, amount: f64, resource: &str) -> Payment {
        Payment {
            token,
            to: to.to_string(),
            amount,
            resource: resource.to_string(),
            chain: self.chain,
            timestamp: Utc::now(),
        }
    }
}

impl std::fmt::Debug for PaymentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentClient")
            .field("payer", &self.signer.pubkey())
            .field("chain", &self.chain)
            .field("ledger", &self.ledger.is_some())
            .finish()
    }
}
