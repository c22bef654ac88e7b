// wallet-core/src/chains/evm/address.rs
//
// EVM Address Module
// EIP-55 (Checksum), Keccak-256, secp256k1

use crate::error::{CryptoError, WalletError, WalletResult};
use alloy::primitives::Address;
use k256::{elliptic_curve::sec1::ToEncodedPoint, PublicKey};
use tiny_keccak::{Hasher, Keccak};
use zeroize::Zeroize;

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut hash = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut hash);
    hash
}

/// EVM Address Generator
///
/// # Flow:  Public Key (64B) → Keccak256 → Address (20B)
pub struct EvmAddress;

impl EvmAddress {
    // =========================================================================
    // DERIVATION
    // =========================================================================

    /// Address of a secp256k1 public key in SEC1 form (33 or 65 bytes).
    ///
    /// 1. decompress to 65 bytes, drop the 0x04 prefix
    /// 2. Keccak-256 over the remaining 64 bytes
    /// 3. last 20 bytes of the hash
    pub fn from_public_key(public_key: &[u8]) -> WalletResult<Address> {
        let public_key = PublicKey::from_sec1_bytes(public_key).map_err(|e| {
            WalletError::Crypto(CryptoError::InvalidKeyFormat(format!(
                "Invalid secp256k1 public key: {}",
                e
            )))
        })?;
        let encoded = public_key.to_encoded_point(false);
        let mut hash = keccak256(&encoded.as_bytes()[1..]);
        let address = Address::from_slice(&hash[12..]);
        hash.zeroize();
        Ok(address)
    }

    // =========================================================================
    // PARSING & VALIDATION
    // =========================================================================

    /// Parse a `0x`-prefixed hex address.
    ///
    /// All-lowercase and all-uppercase hex are accepted as-is. Mixed case must
    /// carry a valid EIP-55 checksum.
    pub fn parse(address: &str) -> WalletResult<Address> {
        let hex_part = address
            .strip_prefix("0x")
            .ok_or_else(|| WalletError::InvalidAddress(format!("missing 0x prefix: {}", address)))?;

        let has_lower = hex_part.bytes().any(|b| b.is_ascii_lowercase());
        let has_upper = hex_part.bytes().any(|b| b.is_ascii_uppercase());

        let parsed = if has_lower && has_upper {
            Address::parse_checksummed(address, None).map_err(|e| {
                WalletError::InvalidAddress(format!("bad EIP-55 checksum in {}: {}", address, e))
            })?
        } else {
            address
                .parse::<Address>()
                .map_err(|e| WalletError::InvalidAddress(format!("{}: {}", address, e)))?
        };
        Ok(parsed)
    }

    /// Well-formed hex with a valid checksum when mixed case is used.
    #[inline]
    pub fn is_valid(address: &str) -> bool {
        Self::parse(address).is_ok()
    }

}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use k256::SecretKey;

    fn address_of_key(hex_key: &str) -> Address {
        let secret = SecretKey::from_slice(&hex::decode(hex_key).unwrap()).unwrap();
        EvmAddress::from_public_key(secret.public_key().to_encoded_point(false).as_bytes()).unwrap()
    }

    const TEST_PRIVATE_KEY: &str =
        "501c797c4b1fdfa88fb7efdf7c9871b8e0f46dbc44259e3e270e0d4c938165f5";
    const TEST_ADDRESS: &str = "0xb611C31e4284BF7A7daD3296e62880F14b3b15DD";

    // Anvil/Hardhat account #0
    const ANVIL_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const ANVIL_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn test_derive_known_keys() {
        assert_eq!(address_of_key(TEST_PRIVATE_KEY).to_checksum(None), TEST_ADDRESS);
        assert_eq!(address_of_key(ANVIL_PRIVATE_KEY).to_checksum(None), ANVIL_ADDRESS);
    }

    #[test]
    fn test_compressed_and_uncompressed_agree() {
        let key = hex::decode(ANVIL_PRIVATE_KEY).unwrap();
        let secret = SecretKey::from_slice(&key).unwrap();
        let compressed = secret.public_key().to_encoded_point(true);
        let uncompressed = secret.public_key().to_encoded_point(false);
        assert_eq!(
            EvmAddress::from_public_key(compressed.as_bytes()).unwrap(),
            EvmAddress::from_public_key(uncompressed.as_bytes()).unwrap()
        );
    }

    #[test]
    fn test_is_valid() {
        assert!(EvmAddress::is_valid(TEST_ADDRESS));
        assert!(EvmAddress::is_valid(&TEST_ADDRESS.to_lowercase()));
        assert!(EvmAddress::is_valid("0xdead000000000000000000000000000000000000"));

        assert!(!EvmAddress::is_valid("0xinvalid"));
        assert!(!EvmAddress::is_valid("not an address"));
        assert!(!EvmAddress::is_valid("0x123"));
        assert!(!EvmAddress::is_valid(""));
        // no 0x prefix
        assert!(!EvmAddress::is_valid("b611C31e4284BF7A7daD3296e62880F14b3b15DD"));
        // checksum broken by flipping one letter's case
        assert!(!EvmAddress::is_valid("0xB611C31e4284BF7A7daD3296e62880F14b3b15DD"));
    }

    #[test]
    fn test_parse_normalizes_case() {
        let lower = EvmAddress::parse("0xb611c31e4284bf7a7dad3296e62880f14b3b15dd").unwrap();
        assert_eq!(lower.to_checksum(None), TEST_ADDRESS);
        assert_eq!(EvmAddress::parse(TEST_ADDRESS).unwrap(), lower);
    }

    #[test]
    fn test_invalid_public_key() {
        assert!(EvmAddress::from_public_key(&[0u8; 33]).is_err());
        assert!(EvmAddress::from_public_key(&[]).is_err());
        assert!(matches!(
            EvmAddress::from_public_key(&[4u8; 65]),
            Err(WalletError::Crypto(CryptoError::InvalidKeyFormat(_)))
        ));
    }
}
