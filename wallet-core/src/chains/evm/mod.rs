// wallet-core/src/chains/evm/mod.rs

//! Ethereum Virtual Machine (EVM) Chain Support
//!
//! Ethereum and EVM-compatible chains (BSC, Polygon, Base, ...).
//!
//! # Key Features
//! - **Address**: EIP-55 checksummed addresses via [`EvmAddress`].
//! - **Transactions**: EIP-1559 transfers and legacy EIP-155 transactions,
//!   signed through the signature registry.
//! - **Account**: [`EvmAccount`], derived at `m/44'/60'/{account}'/0/{index}`.
//! - **RPC**: [`EvmRpcClient`] over the `eth_` namespace.

pub mod account;
pub mod address;
pub mod rpc;
pub mod transaction;

pub use account::EvmAccount;
pub use address::EvmAddress;
pub use rpc::EvmRpcClient;
pub use transaction::{raw_transaction, recover_sender, EvmTransfer};
