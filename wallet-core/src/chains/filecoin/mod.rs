// wallet-core/src/chains/filecoin/mod.rs

//! Filecoin Chain Support
//!
//! - **Address**: f0/f1/f2/f3 (t-prefixed on testnets) via [`FilecoinAddress`].
//! - **Messages**: canonical CBOR, CIDv1 identifiers, Lotus JSON shape.
//! - **Account**: [`FilecoinAccount`], derived at `m/44'/461'/{account}'/0/{index}`.
//! - **RPC**: [`FilecoinRpcClient`] for a Lotus node.

pub mod account;
pub mod address;
mod cbor;
pub mod message;
pub mod rpc;

pub use account::FilecoinAccount;
pub use address::{FilecoinAddress, Network, Protocol};
pub use message::{Cid, Message, SignedMessage};
pub use rpc::{FilecoinRpcClient, MessageReceipt, MsgLookup};
