// wallet-core/src/config.rs
//
// Network and timeout configuration. Nothing is read implicitly: callers
// build these by hand, from a preset, or from a TOML string they loaded.

use crate::chains::filecoin::Network;
use crate::error::{WalletError, WalletResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

// =============================================================================
// RPC ENDPOINT
// =============================================================================

/// One JSON-RPC endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub endpoint: String,
    /// Sent as `Authorization: Bearer <token>` when present.
    #[serde(default)]
    pub token: Option<String>,
    /// Whole-request timeout of the HTTP client.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl NetworkConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[inline]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> WalletResult<()> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(WalletError::Config(format!(
                "endpoint must be an http(s) URL, got '{}'",
                self.endpoint
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(WalletError::Config("request timeout must be non-zero".into()));
        }
        Ok(())
    }
}

// Token is a credential
impl fmt::Debug for NetworkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkConfig")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

// =============================================================================
// TRANSFER TIMEOUTS
// =============================================================================

/// Independent bound for each RPC-bound step of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferTimeouts {
    pub estimate_fee_secs: u64,
    pub balance_secs: u64,
    pub sequence_secs: u64,
    pub submit_secs: u64,
}

impl Default for TransferTimeouts {
    fn default() -> Self {
        Self {
            estimate_fee_secs: 10,
            balance_secs: 10,
            sequence_secs: 10,
            submit_secs: 20,
        }
    }
}

impl TransferTimeouts {
    pub fn estimate_fee(&self) -> Duration {
        Duration::from_secs(self.estimate_fee_secs)
    }

    pub fn balance(&self) -> Duration {
        Duration::from_secs(self.balance_secs)
    }

    pub fn sequence(&self) -> Duration {
        Duration::from_secs(self.sequence_secs)
    }

    pub fn submit(&self) -> Duration {
        Duration::from_secs(self.submit_secs)
    }

    /// A zero bound would fail its step before the node could answer.
    pub fn validate(&self) -> WalletResult<()> {
        let steps = [
            ("estimate_fee_secs", self.estimate_fee_secs),
            ("balance_secs", self.balance_secs),
            ("sequence_secs", self.sequence_secs),
            ("submit_secs", self.submit_secs),
        ];
        if let Some((name, _)) = steps.iter().find(|(_, secs)| *secs == 0) {
            return Err(WalletError::Config(format!("transfer timeout {} must be non-zero", name)));
        }
        Ok(())
    }
}

// =============================================================================
// CHAIN CONFIGS
// =============================================================================

/// EVM chain: id for EIP-155 replay protection plus native token metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmChainConfig {
    pub chain_id: u64,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub rpc: NetworkConfig,
}

impl EvmChainConfig {
    pub fn ethereum() -> Self {
        Self {
            chain_id: 1,
            name: "Ethereum Mainnet".to_string(),
            symbol: "ETH".to_string(),
            decimals: 18,
            rpc: NetworkConfig::new("https://eth.llamarpc.com"),
        }
    }

    pub fn sepolia() -> Self {
        Self {
            chain_id: 11155111,
            name: "Ethereum Sepolia".to_string(),
            symbol: "ETH".to_string(),
            decimals: 18,
            rpc: NetworkConfig::new("https://ethereum-sepolia-rpc.publicnode.com"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilecoinChainConfig {
    #[serde(default)]
    pub network: Network,
    pub rpc: NetworkConfig,
}

impl FilecoinChainConfig {
    pub fn mainnet() -> Self {
        Self {
            network: Network::Mainnet,
            rpc: NetworkConfig::new("https://api.node.glif.io/rpc/v1"),
        }
    }

    pub fn calibration() -> Self {
        Self {
            network: Network::Testnet,
            rpc: NetworkConfig::new("https://api.calibration.node.glif.io/rpc/v1"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolanaChainConfig {
    pub rpc: NetworkConfig,
}

impl SolanaChainConfig {
    pub fn mainnet() -> Self {
        Self {
            rpc: NetworkConfig::new("https://api.mainnet-beta.solana.com"),
        }
    }

    pub fn devnet() -> Self {
        Self {
            rpc: NetworkConfig::new("https://api.devnet.solana.com"),
        }
    }
}

// =============================================================================
// AGGREGATE
// =============================================================================

/// Everything a host needs to wire the chain clients, e.g.
///
/// ```toml
/// [timeouts]
/// submit_secs = 30
///
/// [filecoin]
/// network = "testnet"
/// rpc = { endpoint = "https://api.calibration.node.glif.io/rpc/v1" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainKitConfig {
    #[serde(default)]
    pub timeouts: TransferTimeouts,
    #[serde(default)]
    pub evm: Option<EvmChainConfig>,
    #[serde(default)]
    pub filecoin: Option<FilecoinChainConfig>,
    #[serde(default)]
    pub solana: Option<SolanaChainConfig>,
}

impl ChainKitConfig {
    /// Parse and validate.
    pub fn from_toml_str(input: &str) -> WalletResult<Self> {
        let config: ChainKitConfig =
            toml::from_str(input).map_err(|e| WalletError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> WalletResult<()> {
        if let Some(evm) = &self.evm {
            evm.rpc.validate()?;
            if evm.chain_id == 0 {
                return Err(WalletError::Config("EVM chain id must be non-zero".into()));
            }
        }
        if let Some(filecoin) = &self.filecoin {
            filecoin.rpc.validate()?;
        }
        if let Some(solana) = &self.solana {
            solana.rpc.validate()?;
        }
        self.timeouts.validate()
    }
}
