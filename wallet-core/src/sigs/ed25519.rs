// wallet-core/src/sigs/ed25519.rs
//
// Ed25519 (Solana): message signed as-is, 64-byte signature.

use super::{Signature, SignatureProvider, SignatureScheme};
use crate::chains::solana::address::SolanaAddress;
use crate::error::{CryptoError, WalletError, WalletResult};
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroizing;

#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Provider;

impl SignatureProvider for Ed25519Provider {
    fn scheme(&self) -> SignatureScheme {
        SignatureScheme::Ed25519
    }

    fn sign(&self, private_key: &[u8; 32], message: &[u8]) -> WalletResult<Signature> {
        let key = SigningKey::from_bytes(private_key);
        Ok(Signature::new(self.scheme(), key.sign(message).to_bytes().to_vec()))
    }

    fn verify(&self, signature: &Signature, address: &str, message: &[u8]) -> WalletResult<()> {
        let expected: SolanaAddress = address.parse()?;
        let key = VerifyingKey::from_bytes(expected.as_bytes()).map_err(|e| {
            WalletError::Crypto(CryptoError::InvalidKeyFormat(format!(
                "{} is not an ed25519 point: {}",
                address, e
            )))
        })?;
        let sig = ed25519_dalek::Signature::from_slice(signature.as_bytes())
            .map_err(|e| WalletError::Crypto(CryptoError::Recovery(e.to_string())))?;

        key.verify(message, &sig).map_err(|_| {
            WalletError::Crypto(CryptoError::SignatureMismatch {
                expected: address.to_string(),
                recovered: "no matching key".to_string(),
            })
        })
    }

    fn generate_key(&self) -> Zeroizing<[u8; 32]> {
        let mut key = Zeroizing::new([0u8; 32]);
        OsRng.fill_bytes(key.as_mut());
        key
    }

    fn public_key(&self, private_key: &[u8; 32]) -> WalletResult<Vec<u8>> {
        Ok(SigningKey::from_bytes(private_key).verifying_key().to_bytes().to_vec())
    }

    fn address_of(&self, public_key: &[u8]) -> WalletResult<String> {
        Ok(SolanaAddress::from_public_key(public_key)?.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 8032 test 1
    const SECRET: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
    const PUBLIC: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";
    const SIGNATURE: &str = "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e065224901555fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b";

    fn secret() -> [u8; 32] {
        hex::decode(SECRET).unwrap().try_into().unwrap()
    }

    #[test]
    fn test_rfc8032_vector() {
        let provider = Ed25519Provider;
        assert_eq!(hex::encode(provider.public_key(&secret()).unwrap()), PUBLIC);

        let sig = provider.sign(&secret(), b"").unwrap();
        assert_eq!(hex::encode(sig.as_bytes()), SIGNATURE);

        let address = provider.address_of(&hex::decode(PUBLIC).unwrap()).unwrap();
        provider.verify(&sig, &address, b"").unwrap();
    }

    #[test]
    fn test_address_is_base58_public_key() {
        let provider = Ed25519Provider;
        let pk = provider.public_key(&secret()).unwrap();
        let address = provider.address_of(&pk).unwrap();
        assert_eq!(bs58::decode(&address).into_vec().unwrap(), pk);
    }
}
