// wallet-core/src/crypto/key_deriver/secp256k1.rs
//
// secp256k1 Key Derivation: BIP-32 / BIP-44
//
// Used by: Ethereum/EVM (coin 60), Filecoin (coin 461)
// Algorithm: HMAC-SHA512 hierarchical deterministic derivation
// Reference: https://github.com/bitcoin/bips/blob/master/bip-0032.mediawiki

use crate::crypto::paths::DerivationPath;
use crate::error::{CryptoError, WalletError, WalletResult};
use bip32::{ChildNumber, XPrv};
use zeroize::Zeroizing;

/// secp256k1 Key Deriver: BIP-32 Standard
///
/// Intermediate extended keys are dropped (and zeroized by `bip32`) as soon
/// as the next level is computed.
pub struct Secp256k1Deriver;

impl Secp256k1Deriver {
    /// Derive a single private key from seed + path.
    ///
    /// An invalid child (IL >= n or a zero key, probability ~2^-127) surfaces as
    /// `DerivationFailed`; callers pick the next index themselves.
    pub fn derive(seed: &[u8], path: &DerivationPath) -> WalletResult<Zeroizing<[u8; 32]>> {
        let root_xprv = XPrv::new(seed).map_err(|e| {
            WalletError::Crypto(CryptoError::DerivationFailed(format!(
                "Failed to create master key: {}",
                e
            )))
        })?;

        let mut child = root_xprv;
        for segment in path.segments() {
            let child_num = ChildNumber::new(segment.index(), segment.is_hardened()).map_err(|e| {
                WalletError::Crypto(CryptoError::InvalidPath(format!(
                    "Invalid index {}: {}",
                    segment, e
                )))
            })?;

            child = child.derive_child(child_num).map_err(|e| {
                WalletError::Crypto(CryptoError::DerivationFailed(format!(
                    "Child derivation failed at {}: {}",
                    segment, e
                )))
            })?;
        }

        let key_bytes: [u8; 32] = child.private_key().to_bytes().into();
        Ok(Zeroizing::new(key_bytes))
    }
}

// =============================================================================
// TESTS
// =============================================================================
