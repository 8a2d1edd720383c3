use super::TransactionSigner;
use crate::constants::SOLANA_KEYPAIR_BYTES;
use crate::error::{Result, RouterError};
use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::transaction::Transaction;
use std::fmt;
use std::path::Path;

/// Signs with a keypair loaded from a local JSON key file.
///
/// The file holds the 64-byte secret key as a JSON array of numbers, the
/// format written by `solana-keygen`.
pub struct FileSigner {
    keypair: Keypair,
}

impl FileSigner {
    /// Load the keypair at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let load = || -> Result<Keypair> {
            let content = std::fs::read_to_string(path)?;
            let bytes: Vec<u8> = serde_json::from_str(&content)?;
            if bytes.len() != SOLANA_KEYPAIR_BYTES {
                return Err(RouterError::wallet(format!(
                    "expected {SOLANA_KEYPAIR_BYTES} key bytes, found {}",
                    bytes.len()
                )));
            }
            Keypair::try_from(&bytes[..]).map_err(|e| RouterError::wallet(e.to_string()))
        };

        let keypair = load().map_err(|e| {
            RouterError::wallet(format!("Failed to load wallet from {}: {e}", path.display()))
        })?;
        Ok(Self { keypair })
    }

    pub fn from_keypair(keypair: Keypair) -> Self {
        Self { keypair }
    }
}

#[async_trait]
impl TransactionSigner for FileSigner {
    fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    async fn sign_transaction(&self, mut transaction: Transaction) -> Result<Transaction> {
        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_partial_sign(&[&self.keypair], blockhash)
            .map_err(|e| RouterError::signing(e.to_string()))?;
        Ok(transaction)
    }
}

impl fmt::Debug for FileSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSigner")
            .field("pubkey", &self.keypair.pubkey())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::hash::Hash;
    use solana_sdk::instruction::{AccountMeta, Instruction};
    use solana_sdk::message::Message;
    use std::io::Write;

    fn write_keypair(keypair: &Keypair) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let bytes = keypair.to_bytes().to_vec();
        write!(file, "{}", serde_json::to_string(&bytes).unwrap()).unwrap();
        file
    }

    #[test]
    fn test_from_file_loads_keypair() {
        let keypair = Keypair::new();
        let file = write_keypair(&keypair);
        let signer = FileSigner::from_file(file.path()).unwrap();
        assert_eq!(signer.pubkey(), keypair.pubkey());
    }

    #[test]
    fn test_from_file_missing_is_wallet_error() {
        let err = FileSigner::from_file("/nonexistent/id.json").unwrap_err();
        assert!(matches!(err, RouterError::Wallet(_)));
        assert!(err.to_string().contains("/nonexistent/id.json"));
    }

    #[test]
    fn test_from_file_rejects_wrong_length() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2, 3]").unwrap();
        let err = FileSigner::from_file(file.path()).unwrap_err();
        assert!(matches!(err, RouterError::Wallet(_)));
    }

    #[test]
    fn test_debug_hides_secret() {
        let keypair = Keypair::new();
        let secret = format!("{:?}", keypair.to_bytes());
        let signer = FileSigner::from_keypair(keypair);
        let debug = format!("{signer:?}");
        assert!(debug.contains("FileSigner"));
        assert!(!debug.contains(&secret));
    }

    #[tokio::test]
    async fn test_sign_transaction_adds_signature() {
        let signer = FileSigner::from_keypair(Keypair::new());
        let payer = signer.pubkey();
        let ix = Instruction::new_with_bytes(
            Pubkey::new_unique(),
            &[1],
            vec![AccountMeta::new(payer, true)],
        );
        let message = Message::new_with_blockhash(&[ix], Some(&payer), &Hash::new_unique());
        let unsigned = Transaction::new_unsigned(message);
        assert!(!unsigned.is_signed());

        let signed = signer.sign_transaction(unsigned).await.unwrap();
        assert!(signed.is_signed());
        assert!(signed.verify().is_ok());
    }
}
