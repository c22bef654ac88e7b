// wallet-core/src/network/mod.rs
//
// Network Module - chain RPC contract and transport
//
// - traits:  what the orchestrator needs from an account and a node
// - models:  chain-agnostic values passed across that boundary
// - jsonrpc: JSON-RPC 2.0 over HTTP, used by every chain client

pub mod jsonrpc;
pub mod models;
pub mod traits;

pub use jsonrpc::{parse_response, JsonRpcClient, JsonRpcRequest};
pub use models::*;
pub use traits::*;
