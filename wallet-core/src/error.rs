// wallet-core/src/error.rs

use crate::sigs::SignatureScheme;
use crate::transfer::TransferStep;
use thiserror::Error;

pub type WalletResult<T> = std::result::Result<T, WalletError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("Mnemonic Error: {0}")]
    Mnemonic(#[from] MnemonicError),

    #[error("Cryptography Error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("RPC Error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Fee inversion: max fee per unit {max_fee} is below priority fee {priority_fee}")]
    FeeInversion { max_fee: u128, priority_fee: u128 },

    #[error("Not enough funds: {balance} < {required}")]
    InsufficientFunds { balance: u128, required: u128 },

    #[error("Validation Error: {0}")]
    Validation(String),

    #[error("Config Error: {0}")]
    Config(String),
}

impl WalletError {
    /// `true` for network or node-side failures. Everything else is a caller
    /// bug, a configuration problem or a business-rule rejection.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WalletError::Rpc(_))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MnemonicError {
    #[error("Invalid word count: {0}. Expected 12, 15, 18, 21 or 24 words.")]
    InvalidWordCount(usize),

    #[error("Word '{0}' not found in the BIP39 wordlist.")]
    UnknownWord(String),

    #[error("Checksum validation failed.")]
    ChecksumFailed,

    #[error("BIP39 internal error: {0}")]
    Bip39Error(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Invalid derivation path: {0}")]
    InvalidPath(String),

    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("No signature provider registered for scheme {0}")]
    UnsupportedScheme(SignatureScheme),

    #[error("A signature provider is already registered for scheme {0}")]
    DuplicateScheme(SignatureScheme),

    #[error("Signature did not match: expected {expected}, recovered {recovered}")]
    SignatureMismatch { expected: String, recovered: String },

    #[error("Signature recovery failed: {0}")]
    Recovery(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RpcError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("jsonrpc call {method}: code {code}: {message}")]
    Remote {
        method: String,
        code: i64,
        message: String,
    },

    #[error("failed to decode response of {method}: {reason}")]
    Decode { method: String, reason: String },

    #[error("timed out after {secs}s")]
    Timeout { secs: u64 },
}

/// Error surfaced by the transfer orchestrator. Carries the step that failed
/// so callers can tell "failed to estimate fee" from "failed to submit".
#[derive(Debug, Error, PartialEq, Eq)]
#[error("failed to {step}: {source}")]
pub struct TransferError {
    pub step: TransferStep,
    #[source]
    pub source: WalletError,
}

impl TransferError {
    pub fn new(step: TransferStep, source: impl Into<WalletError>) -> Self {
        Self {
            step,
            source: source.into(),
        }
    }

    /// Only RPC failures may be retried, and then only by re-running the whole
    /// orchestration (balance and nonce may have moved).
    pub fn is_retryable(&self) -> bool {
        self.source.is_retryable()
    }
}
