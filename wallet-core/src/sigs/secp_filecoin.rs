// wallet-core/src/sigs/secp_filecoin.rs
//
// Filecoin secp256k1 signatures.
//
// Digest: blake2b-256 of the signing payload (the message CID bytes).
// Wire layout: r (32) ‖ s (32) ‖ recid (1). Nodes expect the recovery byte
// last and un-offset, unlike the leading 27 + recid of compact signatures.

use super::secp256k1::{expect_len, generate, public_key_uncompressed, recover, recovery, sign_prehash};
use super::{Signature, SignatureProvider, SignatureScheme};
use crate::chains::filecoin::address::{blake2b_256, FilecoinAddress, Network};
use crate::error::{CryptoError, WalletError, WalletResult};
use zeroize::Zeroizing;

const COMPACT_HEADER: u8 = 27;

#[derive(Debug, Clone, Copy, Default)]
pub struct FilecoinSecp256k1Provider {
    network: Network,
}

impl FilecoinSecp256k1Provider {
    pub fn new(network: Network) -> Self {
        Self { network }
    }

    /// Trailing-recid wire form -> leading compact form [27 + recid ‖ r ‖ s].
    fn to_compact(bytes: &[u8]) -> WalletResult<[u8; 65]> {
        expect_len(bytes, 65)?;
        let header = bytes[64]
            .checked_add(COMPACT_HEADER)
            .ok_or_else(|| recovery(format!("bad recovery byte {}", bytes[64])))?;

        let mut compact = [0u8; 65];
        compact[0] = header;
        compact[1..].copy_from_slice(&bytes[..64]);
        Ok(compact)
    }

    /// Uncompressed public key of the signer.
    pub fn recover_public_key(bytes: &[u8], message: &[u8]) -> WalletResult<[u8; 65]> {
        let compact = Self::to_compact(bytes)?;
        let recid = compact[0] - COMPACT_HEADER;
        recover(&compact[1..], recid, &blake2b_256(message))
    }
}

impl SignatureProvider for FilecoinSecp256k1Provider {
    fn scheme(&self) -> SignatureScheme {
        SignatureScheme::Secp256k1Filecoin
    }

    fn sign(&self, private_key: &[u8; 32], message: &[u8]) -> WalletResult<Signature> {
        let (rs, recid) = sign_prehash(private_key, &blake2b_256(message))?;
        let mut bytes = Vec::with_capacity(65);
        bytes.extend_from_slice(&rs);
        bytes.push(recid);
        Ok(Signature::new(self.scheme(), bytes))
    }

    fn verify(&self, signature: &Signature, address: &str, message: &[u8]) -> WalletResult<()> {
        let expected: FilecoinAddress = address.parse()?;
        let public_key = Self::recover_public_key(signature.as_bytes(), message)?;
        let recovered = FilecoinAddress::new_secp256k1(&public_key, expected.network())?;
        if !recovered.same_actor(&expected) {
            return Err(WalletError::Crypto(CryptoError::SignatureMismatch {
                expected: expected.to_string(),
                recovered: recovered.to_string(),
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
        Ok(FilecoinAddress::new_secp256k1(public_key, self.network)?.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::{RecoveryId, SigningKey};

    const KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn key() -> [u8; 32] {
        hex::decode(KEY).unwrap().try_into().unwrap()
    }

    #[test]
    fn test_recovery_byte_is_trailing_raw_id() {
        let provider = FilecoinSecp256k1Provider::default();
        let message = b"cid bytes stand-in";
        let sig = provider.sign(&key(), message).unwrap();
        let bytes = sig.as_bytes();
        assert_eq!(bytes.len(), 65);

        let (expected_sig, expected_recid): (k256::ecdsa::Signature, RecoveryId) =
            SigningKey::from_slice(&key())
                .unwrap()
                .sign_prehash_recoverable(&blake2b_256(message))
                .unwrap();
        assert_eq!(&bytes[..64], expected_sig.to_bytes().as_slice());
        assert_eq!(bytes[64], expected_recid.to_byte());
        assert!(bytes[64] <= 1);
    }

    #[test]
    fn test_compact_form_reconstruction() {
        let provider = FilecoinSecp256k1Provider::default();
        let sig = provider.sign(&key(), b"payload").unwrap();
        let compact = FilecoinSecp256k1Provider::to_compact(sig.as_bytes()).unwrap();
        assert_eq!(compact[0], 27 + sig.as_bytes()[64]);
        assert_eq!(&compact[1..], &sig.as_bytes()[..64]);
    }

    #[test]
    fn test_verify_ignores_network_prefix() {
        let main = FilecoinSecp256k1Provider::new(Network::Mainnet);
        let pk = main.public_key(&key()).unwrap();
        let test_address = FilecoinSecp256k1Provider::new(Network::Testnet)
            .address_of(&pk)
            .unwrap();
        assert!(test_address.starts_with("t1"));

        let sig = main.sign(&key(), b"payload").unwrap();
        main.verify(&sig, &test_address, b"payload").unwrap();
    }

    #[test]
    fn test_out_of_range_recovery_byte() {
        let provider = FilecoinSecp256k1Provider::default();
        let address = provider.address_of(&provider.public_key(&key()).unwrap()).unwrap();
        let mut bytes = provider.sign(&key(), b"payload").unwrap().into_bytes();
        bytes[64] = 0xff;
        let bad = Signature::new(SignatureScheme::Secp256k1Filecoin, bytes);
        assert!(matches!(
            provider.verify(&bad, &address, b"payload"),
            Err(WalletError::Crypto(CryptoError::Recovery(_)))
        ));
    }
}
