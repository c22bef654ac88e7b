// wallet-core/src/network/traits.rs
//
// Contracts between the transfer orchestrator and a chain family.
//
//   TransferAccount  builds and signs (pure, no I/O)
//   ChainRpc         estimates, reads balance/sequence, submits (async I/O)
//   TransferMessage  the draft both sides pass around
//
// Each chain module implements all three; the orchestrator is generic over
// them and never sees chain-specific types.

use crate::error::WalletResult;
use crate::network::models::{ChainFamily, FeeQuote, TransactionId};
use async_trait::async_trait;
use std::fmt;

// =============================================================================
// DRAFT MESSAGE
// =============================================================================

/// Unsigned transfer under construction.
pub trait TransferMessage: Clone + fmt::Debug + Send + Sync {
    /// What the node hands out to order a sender's transactions: an account
    /// nonce, or a recent blockhash on Solana.
    type Sequence: Clone + fmt::Debug + Send + Sync;

    /// Transferred value in atoms.
    fn value(&self) -> u128;

    /// Fee parameters currently set on the draft.
    fn fee_quote(&self) -> FeeQuote;

    fn assign_sequence(&mut self, sequence: Self::Sequence);
}

// =============================================================================
// ACCOUNT SIDE
// =============================================================================

/// The signing half of a transfer. Implemented by every chain account.
pub trait TransferAccount: Send + Sync {
    type Recipient: Clone + fmt::Debug + Send + Sync;
    type Message: TransferMessage;
    type Signed: Send + Sync;

    fn chain(&self) -> ChainFamily;

    /// Sender address string as the node expects it.
    fn address(&self) -> String;

    /// Parse and sanity-check a recipient. Fails with `InvalidRecipient`.
    fn parse_recipient(&self, recipient: &str) -> WalletResult<Self::Recipient>;

    /// Plain value transfer draft, no call payload.
    fn build_transfer(&self, to: Self::Recipient, value: u128) -> WalletResult<Self::Message>;

    fn sign_transfer(&self, message: Self::Message) -> WalletResult<Self::Signed>;
}

// =============================================================================
// NODE SIDE
// =============================================================================

/// RPC calls the orchestrator chains together. Reads (`get_balance`,
/// `next_sequence`) must not change any state.
#[async_trait]
pub trait ChainRpc<M: TransferMessage, S: Send + Sync>: Send + Sync {
    /// Fill in fee fields on `draft`.
    async fn estimate_fee(&self, draft: &M) -> WalletResult<M>;

    /// Spendable balance in atoms.
    async fn get_balance(&self, address: &str) -> WalletResult<u128>;

    async fn next_sequence(&self, address: &str) -> WalletResult<M::Sequence>;

    async fn submit(&self, signed: &S) -> WalletResult<TransactionId>;
}
