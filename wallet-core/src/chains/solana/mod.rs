// wallet-core/src/chains/solana/mod.rs

//! Solana Chain Support
//!
//! - **Address**: base58 Ed25519 public keys via [`SolanaAddress`].
//! - **Transactions**: legacy System Program transfers, base64 on the wire.
//! - **Account**: [`SolanaAccount`], derived at `m/44'/501'/0'/{index}'`.
//! - **RPC**: [`SolanaRpcClient`].

pub mod account;
pub mod address;
pub mod rpc;
pub mod transaction;

pub use account::SolanaAccount;
pub use address::SolanaAddress;
pub use rpc::SolanaRpcClient;
pub use transaction::{Blockhash, SignedTransfer, SolanaTransfer};
