// wallet-core/src/sigs/secp_evm.rs
//
// EVM secp256k1: keccak256 digest, signature r ‖ s ‖ (27 + recid)

use super::secp256k1::{expect_len, generate, public_key_uncompressed, recover, recovery, sign_prehash};
use super::{Signature, SignatureProvider, SignatureScheme};
use crate::chains::evm::address::{keccak256, EvmAddress};
use crate::error::{CryptoError, WalletError, WalletResult};
use zeroize::Zeroizing;

const V_OFFSET: u8 = 27;

#[derive(Debug, Clone, Copy, Default)]
pub struct EvmSecp256k1Provider;

impl EvmSecp256k1Provider {
    /// Split a 65-byte EVM signature into (r ‖ s, recovery id). Accepts v as
    /// 27/28 or as a bare 0/1.
    pub fn split(bytes: &[u8]) -> WalletResult<(&[u8], u8)> {
        expect_len(bytes, 65)?;
        let recid = match bytes[64] {
            v @ (0 | 1) => v,
            v @ (27 | 28) => v - V_OFFSET,
            v => return Err(recovery(format!("bad v value {}", v))),
        };
        Ok((&bytes[..64], recid))
    }

    /// Address of the key that produced `signature` over `message`.
    pub fn recover_address(bytes: &[u8], message: &[u8]) -> WalletResult<alloy::primitives::Address> {
        let (rs, recid) = Self::split(bytes)?;
        let public_key = recover(rs, recid, &keccak256(message))?;
        EvmAddress::from_public_key(&public_key)
    }
}

impl SignatureProvider for EvmSecp256k1Provider {
    fn scheme(&self) -> SignatureScheme {
        SignatureScheme::Secp256k1Evm
    }

    fn sign(&self, private_key: &[u8; 32], message: &[u8]) -> WalletResult<Signature> {
        let (rs, recid) = sign_prehash(private_key, &keccak256(message))?;
        let mut bytes = Vec::with_capacity(65);
        bytes.extend_from_slice(&rs);
        bytes.push(recid + V_OFFSET);
        Ok(Signature::new(self.scheme(), bytes))
    }

    fn verify(&self, signature: &Signature, address: &str, message: &[u8]) -> WalletResult<()> {
        let expected = EvmAddress::parse(address)?;
        let recovered = Self::recover_address(signature.as_bytes(), message)?;
        if recovered != expected {
            return Err(WalletError::Crypto(CryptoError::SignatureMismatch {
                expected: expected.to_checksum(None),
                recovered: recovered.to_checksum(None),
            }));
        }
        Ok(())
    }

    fn generate_key(&self) -> Zeroizing<[u8; 32]> {
        generate()
    }

    fn public_key(&self, private_key: &[u8; 32]) -> WalletResult<Vec<u8>> {
        public_key_uncompressed(private_key)
    }

    fn address_of(&self, public_key: &[u8]) -> WalletResult<String> {
        Ok(EvmAddress::from_public_key(public_key)?.to_checksum(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Anvil/Hardhat account #0
    const ANVIL_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const ANVIL_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn anvil_key() -> [u8; 32] {
        hex::decode(ANVIL_PRIVATE_KEY).unwrap().try_into().unwrap()
    }

    #[test]
    fn test_address_of_known_key() {
        let provider = EvmSecp256k1Provider;
        let pk = provider.public_key(&anvil_key()).unwrap();
        assert_eq!(pk.len(), 65);
        assert_eq!(provider.address_of(&pk).unwrap(), ANVIL_ADDRESS);
    }

    #[test]
    fn test_v_is_27_or_28() {
        let provider = EvmSecp256k1Provider;
        let sig = provider.sign(&anvil_key(), b"hello").unwrap();
        assert_eq!(sig.as_bytes().len(), 65);
        assert!(matches!(sig.as_bytes()[64], 27 | 28));
    }

    #[test]
    fn test_accepts_bare_recovery_id() {
        let provider = EvmSecp256k1Provider;
        let sig = provider.sign(&anvil_key(), b"hello").unwrap();
        let mut bytes = sig.into_bytes();
        bytes[64] -= 27;
        let bare = Signature::new(SignatureScheme::Secp256k1Evm, bytes);
        provider.verify(&bare, ANVIL_ADDRESS, b"hello").unwrap();
    }

    #[test]
    fn test_deterministic_rfc6979() {
        let provider = EvmSecp256k1Provider;
        let a = provider.sign(&anvil_key(), b"hello").unwrap();
        let b = provider.sign(&anvil_key(), b"hello").unwrap();
        assert_eq!(a, b);
    }
}
