// wallet-core/src/lib.rs

//! Multi-chain HD wallet core.
//!
//! - [`crypto`]: BIP-39 mnemonics, BIP-32 / SLIP-0010 derivation, paths, amounts.
//! - [`sigs`]: signature providers keyed by [`SignatureScheme`].
//! - [`wallet`]: a seed plus a registry; derives typed chain accounts.
//! - [`chains`]: EVM, Filecoin and Solana addresses, transactions, accounts and RPC clients.
//! - [`transfer`]: the estimate / check / sign / submit pipeline.
//!
//! ```no_run
//! use chainkit_core::chains::evm::{EvmAccount, EvmRpcClient};
//! use chainkit_core::config::EvmChainConfig;
//! use chainkit_core::crypto::DerivationPaths;
//! use chainkit_core::{TransferOrchestrator, Wallet};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let wallet = Wallet::from_phrase("tag volcano eight thank tide danger coast health above argue embrace heavy")?;
//! let config = EvmChainConfig::sepolia();
//! let account: EvmAccount = wallet
//!     .must_derive_account::<EvmAccount>(DerivationPaths::EVM_0)
//!     .with_chain_id(config.chain_id);
//! let rpc = EvmRpcClient::new(&config)?;
//! let tx_id = TransferOrchestrator::new(rpc)
//!     .transfer(&account, "0x70997970C51812dc3A010C7d01b50e0d17dc79C8", 1_000_000_000)
//!     .await?;
//! println!("{tx_id}");
//! # Ok(())
//! # }
//! ```

pub mod chains;
pub mod config;
pub mod crypto;
pub mod error;
pub mod network;
pub mod sigs;
pub mod transfer;
pub mod wallet;

pub use config::ChainKitConfig;
pub use error::{CryptoError, MnemonicError, RpcError, TransferError, WalletError, WalletResult};
pub use network::{ChainFamily, ChainRpc, FeeQuote, TransactionId, TransferAccount, TransferMessage};
pub use sigs::{Signature, SignatureProvider, SignatureRegistry, SignatureScheme};
pub use transfer::{TransferOrchestrator, TransferStep, TransferTimeouts};
pub use wallet::{ChainAccount, Wallet};
