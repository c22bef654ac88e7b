// wallet-core/src/crypto/key_deriver/ed25519.rs
//
// Ed25519 Key Derivation: SLIP-0010 Standard
//
// Used by: Solana (coin 501)
// Algorithm: HMAC-SHA512, hardened children only
// Reference: https://github.com/satoshilabs/slips/blob/master/slip-0010.md
//
// m/44'/501'/0'/0' (OK)    m/44'/501'/0'/0 (INVALID)

use crate::crypto::paths::DerivationPath;
use crate::error::{CryptoError, WalletError, WalletResult};
use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::{Zeroize, Zeroizing};

type HmacSha512 = Hmac<Sha512>;

/// Ed25519 Key Deriver: SLIP-0010 Standard
///
/// # Differences from BIP-32
/// - Master key HMAC key is "ed25519 seed" instead of "Bitcoin seed"
/// - Only hardened derivation
/// - Any 32 bytes form a valid private key, so no range check
pub struct Ed25519Deriver;

impl Ed25519Deriver {
    const MASTER_SECRET: &'static [u8] = b"ed25519 seed";

    /// Derive a single ed25519 private key from seed + path.
    ///
    /// Every level of `path` must be hardened; a normal level is an
    /// `InvalidPath` error rather than being silently hardened.
    pub fn derive(seed: &[u8], path: &DerivationPath) -> WalletResult<Zeroizing<[u8; 32]>> {
        if let Some(seg) = path.segments().iter().find(|s| !s.is_hardened()) {
            return Err(WalletError::Crypto(CryptoError::InvalidPath(format!(
                "ed25519 SLIP-0010 requires all levels to be hardened, got '{}' in {}",
                seg, path
            ))));
        }

        let (mut key, mut chain_code) = Self::hmac_split(Self::MASTER_SECRET, &[seed])?;

        for segment in path.segments() {
            // Data = 0x00 || parent_key || ser32(index | 2^31)
            let (child_key, child_chain) = Self::hmac_split(
                &chain_code,
                &[&[0x00], &key, &segment.raw().to_be_bytes()],
            )?;
            key.zeroize();
            chain_code.zeroize();
            key = child_key;
            chain_code = child_chain;
        }

        chain_code.zeroize();
        Ok(Zeroizing::new(key))
    }

    /// I = HMAC-SHA512(hmac_key, data); returns (IL, IR).
    fn hmac_split(hmac_key: &[u8], data: &[&[u8]]) -> WalletResult<([u8; 32], [u8; 32])> {
        let mut mac = HmacSha512::new_from_slice(hmac_key).map_err(|e| {
            WalletError::Crypto(CryptoError::DerivationFailed(format!(
                "HMAC init failed: {}",
                e
            )))
        })?;
        for chunk in data {
            mac.update(chunk);
        }

        let mut buf = [0u8; 64];
        buf.copy_from_slice(&mac.finalize().into_bytes());

        let mut key = [0u8; 32];
        let mut chain_code = [0u8; 32];
        key.copy_from_slice(&buf[..32]);
        chain_code.copy_from_slice(&buf[32..]);
        buf.zeroize();

        Ok((key, chain_code))
    }
}

// =============================================================================
// TESTS
// =============================================================================
