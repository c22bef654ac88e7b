// wallet-core/src/network/models.rs
//
// Chain-agnostic data carried between the orchestrator and the chain clients.

use crate::crypto::Denomination;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// CHAIN IDENTIFICATION
// =============================================================================

/// Chain family, used to pick address/signing rules and to tag log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    /// Ethereum Virtual Machine (Ethereum, BSC, Polygon, Arbitrum, etc.)
    Evm,
    /// Filecoin actor chain
    Filecoin,
    /// Solana
    Solana,
}

impl ChainFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            ChainFamily::Evm => "evm",
            ChainFamily::Filecoin => "filecoin",
            ChainFamily::Solana => "solana",
        }
    }

    /// Native token of the family. EVM networks all use 18 decimals whatever
    /// their symbol.
    pub fn native_denomination(self) -> Denomination {
        match self {
            ChainFamily::Evm => Denomination::ETH,
            ChainFamily::Filecoin => Denomination::FIL,
            ChainFamily::Solana => Denomination::SOL,
        }
    }
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// TRANSACTION IDENTIFIER
// =============================================================================

/// Identifier a node hands back for an accepted transaction: a 0x-hex hash on
/// EVM, a CID on Filecoin, a base58 signature on Solana.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionId {
    pub chain: ChainFamily,
    pub id: String,
}

impl TransactionId {
    pub fn new(chain: ChainFamily, id: impl Into<String>) -> Self {
        Self {
            chain,
            id: id.into(),
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

// =============================================================================
// FEE QUOTE
// =============================================================================

/// Per-unit fee parameters the node filled into a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeQuote {
    /// Upper bound per gas unit (EVM maxFeePerGas, Filecoin GasFeeCap, Solana
    /// fee per message).
    pub max_fee_per_unit: u128,
    /// Tip per gas unit (EVM maxPriorityFeePerGas, Filecoin GasPremium, zero on
    /// Solana).
    pub priority_fee_per_unit: u128,
}

impl FeeQuote {
    /// `true` when the cap is at least the tip.
    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.max_fee_per_unit >= self.priority_fee_per_unit
    }
}
