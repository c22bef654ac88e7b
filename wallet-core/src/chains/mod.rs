// src/chains/mod.rs
//
// One module per chain family. Each provides an address type, its transaction
// or message model, a `ChainAccount` + `TransferAccount` implementation and a
// `ChainRpc` client.

pub mod evm;
pub mod filecoin;
pub mod solana;

use crate::network::ChainFamily;

/// Address predicate for `chain`, without building an account.
pub fn is_valid_address(chain: ChainFamily, address: &str) -> bool {
    match chain {
        ChainFamily::Evm => evm::EvmAddress::is_valid(address),
        ChainFamily::Filecoin => filecoin::FilecoinAddress::is_valid(address),
        ChainFamily::Solana => solana::SolanaAddress::is_valid(address),
    }
}
