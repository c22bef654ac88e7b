// wallet-core/src/chains/solana/address.rs
//
// Solana Address = base58(ed25519 public key, 32 bytes)

use crate::error::{WalletError, WalletResult};
use std::fmt;
use std::str::FromStr;

pub const PUBKEY_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SolanaAddress([u8; PUBKEY_LEN]);

impl SolanaAddress {
    /// System program id, `11111111111111111111111111111111`.
    pub const SYSTEM_PROGRAM: SolanaAddress = SolanaAddress([0u8; PUBKEY_LEN]);

    pub fn from_public_key(public_key: &[u8]) -> WalletResult<Self> {
        let bytes: [u8; PUBKEY_LEN] = public_key.try_into().map_err(|_| {
            WalletError::InvalidAddress(format!(
                "ed25519 public key must be {} bytes, got {}",
                PUBKEY_LEN,
                public_key.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; PUBKEY_LEN] {
        &self.0
    }

    #[inline]
    pub fn is_valid(address: &str) -> bool {
        address.parse::<SolanaAddress>().is_ok()
    }
}

impl fmt::Display for SolanaAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl FromStr for SolanaAddress {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // 32 bytes encode to 32..=44 base58 characters
        if s.len() < 32 || s.len() > 44 {
            return Err(WalletError::InvalidAddress(format!(
                "bad length {} for base58 public key: '{}'",
                s.len(),
                s
            )));
        }
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| WalletError::InvalidAddress(format!("'{}': {}", s, e)))?;
        Self::from_public_key(&bytes)
    }
}
