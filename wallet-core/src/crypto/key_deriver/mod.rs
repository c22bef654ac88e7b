// wallet-core/src/crypto/key_deriver/mod.rs
//
// Key Derivation Engine - Multi-Curve Support
//
// ┌─────────────────────────────────────────────────┐
// │  Seed (BIP-39, 64 bytes)                        │
// │                    │                            │
// │     ┌──────────────┴──────────────┐             │
// │     ▼                             ▼             │
// │  secp256k1 (BIP-32)        ed25519 (SLIP-0010)  │
// │  ├─ EVM (coin 60)          └─ Solana (coin 501) │
// │  └─ Filecoin (coin 461)                         │
// └─────────────────────────────────────────────────┘

pub mod ed25519;
pub mod secp256k1;

pub use ed25519::Ed25519Deriver;
pub use secp256k1::Secp256k1Deriver;

use crate::crypto::paths::{coin_type, DerivationPath};
use crate::error::{CryptoError, WalletError, WalletResult};
use zeroize::Zeroizing;

// =============================================================================
// COMMON TYPES
// =============================================================================
/// Curve type used for key derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurveType {
    /// secp256k1: Ethereum/EVM, Filecoin
    Secp256k1,
    /// Ed25519: Solana
    Ed25519,
}

/// Derived private key plus the inputs that produced it
pub struct DerivedKey {
    /// 32-byte private key, zeroized on drop
    pub private_key: Zeroizing<[u8; 32]>,
    pub curve: CurveType,
    pub path: DerivationPath,
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("curve", &self.curve)
            .field("path", &self.path.to_string())
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// UNIFIED DERIVER
// =============================================================================
/// Entry point for key derivation. Pure: the same (seed, path, curve) always
/// yields the same key.
pub struct KeyDeriver;

impl KeyDeriver {
    /// Derive a private key for `curve` at `path`.
    ///
    /// # Errors
    /// - `CryptoError::InvalidPath` if the path breaks the curve's conventions
    ///   (non-hardened level for ed25519, coin type registered for the other curve)
    /// - `CryptoError::DerivationFailed` if the seed is malformed or the EC math
    ///   rejects a child (no automatic retry with the next index)
    pub fn derive(seed: &[u8], path: &DerivationPath, curve: CurveType) -> WalletResult<DerivedKey> {
        Self::validate_seed(seed)?;
        Self::validate_path(path, curve)?;

        let private_key = match curve {
            CurveType::Secp256k1 => Secp256k1Deriver::derive(seed, path)?,
            CurveType::Ed25519 => Ed25519Deriver::derive(seed, path)?,
        };

        Ok(DerivedKey {
            private_key,
            curve,
            path: path.clone(),
        })
    }

    /// Check that `path` follows the conventions of `curve`.
    pub fn validate_path(path: &DerivationPath, curve: CurveType) -> WalletResult<()> {
        if let Some(coin) = path.coin_type() {
            let foreign = match curve {
                CurveType::Secp256k1 => coin_type::ED25519_CHAINS,
                CurveType::Ed25519 => coin_type::SECP256K1_CHAINS,
            };
            if foreign.contains(&coin.index()) {
                return Err(invalid_path(format!(
                    "coin type {} is not derived with {:?}",
                    coin.index(),
                    curve
                )));
            }
        }

        match curve {
            CurveType::Ed25519 => {
                if !path.all_hardened() {
                    return Err(invalid_path(format!(
                        "ed25519 SLIP-0010 requires all levels to be hardened: {}",
                        path
                    )));
                }
            }
            CurveType::Secp256k1 => {
                // BIP-44: purpose, coin type and account are hardened.
                if path.purpose().map(|p| p.index()) == Some(44) {
                    if let Some(seg) = path.segments().iter().take(3).find(|s| !s.is_hardened()) {
                        return Err(invalid_path(format!(
                            "BIP-44 level '{}' must be hardened: {}",
                            seg, path
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// BIP-32 accepts seeds of 128 to 512 bits.
    #[inline]
    fn validate_seed(seed: &[u8]) -> WalletResult<()> {
        if !(16..=64).contains(&seed.len()) {
            return Err(WalletError::Crypto(CryptoError::DerivationFailed(format!(
                "Invalid seed length: expected 16..=64 bytes, got {}",
                seed.len()
            ))));
        }
        Ok(())
    }
}

fn invalid_path(msg: String) -> WalletError {
    WalletError::Crypto(CryptoError::InvalidPath(msg))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::paths::DerivationPaths;

    const TEST_SEED: &str = "16270f7b026afe7a3746efbfcf43e083500951db9e2699d1e4f372515dabcc80459b9181c3937b5faa4b8f7602f886553d2c32c5f12f3331cef40153aead4de6";

    fn path(s: &str) -> DerivationPath {
        s.parse().unwrap()
    }

    #[test]
    fn test_unified_secp256k1() {
        let seed = hex::decode(TEST_SEED).unwrap();
        let key = KeyDeriver::derive(&seed, &path(DerivationPaths::EVM_0), CurveType::Secp256k1)
            .unwrap();
        assert_eq!(key.curve, CurveType::Secp256k1);
        assert_eq!(key.private_key.len(), 32);
        assert_eq!(key.path.to_string(), DerivationPaths::EVM_0);
    }

    #[test]
    fn test_unified_ed25519() {
        let seed = hex::decode(TEST_SEED).unwrap();
        let key = KeyDeriver::derive(&seed, &path(DerivationPaths::SOLANA_0), CurveType::Ed25519)
            .unwrap();
        assert_eq!(key.curve, CurveType::Ed25519);
    }

    #[test]
    fn test_invalid_seed() {
        let bad_seed = [0u8; 8];
        let result = KeyDeriver::derive(&bad_seed, &path(DerivationPaths::EVM_0), CurveType::Secp256k1);
        assert!(matches!(
            result,
            Err(WalletError::Crypto(CryptoError::DerivationFailed(_)))
        ));
    }

    #[test]
    fn test_determinism() {
        let seed = hex::decode(TEST_SEED).unwrap();
        for (p, curve) in [
            (DerivationPaths::EVM_0, CurveType::Secp256k1),
            (DerivationPaths::FILECOIN_0, CurveType::Secp256k1),
            (DerivationPaths::SOLANA_0, CurveType::Ed25519),
        ] {
            let k1 = KeyDeriver::derive(&seed, &path(p), curve).unwrap();
            let k2 = KeyDeriver::derive(&seed, &path(p), curve).unwrap();
            assert_eq!(&*k1.private_key, &*k2.private_key);
        }
    }

    #[test]
    fn test_coin_type_curve_mismatch() {
        let seed = hex::decode(TEST_SEED).unwrap();
        // Solana coin type with secp256k1
        let err = KeyDeriver::derive(&seed, &path("m/44'/501'/0'/0/0"), CurveType::Secp256k1)
            .unwrap_err();
        assert!(matches!(err, WalletError::Crypto(CryptoError::InvalidPath(_))));

        // EVM coin type with ed25519
        let err = KeyDeriver::derive(&seed, &path("m/44'/60'/0'/0'"), CurveType::Ed25519)
            .unwrap_err();
        assert!(matches!(err, WalletError::Crypto(CryptoError::InvalidPath(_))));
    }

    #[test]
    fn test_hardening_rules() {
        let seed = hex::decode(TEST_SEED).unwrap();
        // Unregistered coin type: valid for secp256k1, structurally invalid for ed25519
        let p = path("m/44'/9999'/0'/0/0");
        assert!(KeyDeriver::derive(&seed, &p, CurveType::Secp256k1).is_ok());
        assert!(matches!(
            KeyDeriver::derive(&seed, &p, CurveType::Ed25519),
            Err(WalletError::Crypto(CryptoError::InvalidPath(_)))
        ));

        // BIP-44 account level must be hardened
        assert!(matches!(
            KeyDeriver::derive(&seed, &path("m/44'/60'/0/0/0"), CurveType::Secp256k1),
            Err(WalletError::Crypto(CryptoError::InvalidPath(_)))
        ));
    }

    #[test]
    fn test_different_curves_produce_different_keys() {
        let seed = hex::decode(TEST_SEED).unwrap();
        let secp = KeyDeriver::derive(&seed, &path("m/44'/9999'/0'/0'"), CurveType::Secp256k1).unwrap();
        let ed = KeyDeriver::derive(&seed, &path("m/44'/9999'/0'/0'"), CurveType::Ed25519).unwrap();
        assert_ne!(&*secp.private_key, &*ed.private_key);
    }

    #[test]
    fn test_debug_redacts_key() {
        let seed = hex::decode(TEST_SEED).unwrap();
        let key = KeyDeriver::derive(&seed, &path(DerivationPaths::EVM_0), CurveType::Secp256k1)
            .unwrap();
        let debug = format!("{:?}", key);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains(&hex::encode(&*key.private_key)));
    }
}
