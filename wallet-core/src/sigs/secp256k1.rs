// wallet-core/src/sigs/secp256k1.rs
//
// Shared secp256k1 primitives for the EVM and Filecoin providers.

use crate::error::{CryptoError, WalletError, WalletResult};
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};
use k256::SecretKey;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

/// 65-byte SEC1 uncompressed public key.
pub(crate) type UncompressedPublicKey = [u8; 65];

pub(crate) fn signing_key(private_key: &[u8; 32]) -> WalletResult<SigningKey> {
    SigningKey::from_slice(private_key).map_err(|e| {
        WalletError::Crypto(CryptoError::InvalidKeyFormat(format!(
            "Invalid secp256k1 private key: {}",
            e
        )))
    })
}

pub(crate) fn generate() -> Zeroizing<[u8; 32]> {
    let secret = SecretKey::random(&mut OsRng);
    Zeroizing::new(secret.to_bytes().into())
}

pub(crate) fn public_key_uncompressed(private_key: &[u8; 32]) -> WalletResult<Vec<u8>> {
    let key = signing_key(private_key)?;
    Ok(key.verifying_key().to_encoded_point(false).as_bytes().to_vec())
}

/// Low-S compact signature over a 32-byte digest: (r ‖ s, raw recovery id).
pub(crate) fn sign_prehash(private_key: &[u8; 32], digest: &[u8; 32]) -> WalletResult<([u8; 64], u8)> {
    let key = signing_key(private_key)?;
    let (signature, recid) = key
        .sign_prehash_recoverable(digest)
        .map_err(|e| WalletError::Crypto(CryptoError::SigningFailed(e.to_string())))?;

    let mut rs = [0u8; 64];
    rs.copy_from_slice(&signature.to_bytes());
    Ok((rs, recid.to_byte()))
}

/// Recover the signer's uncompressed public key from r ‖ s and a raw recovery id.
pub(crate) fn recover(rs: &[u8], recid: u8, digest: &[u8; 32]) -> WalletResult<UncompressedPublicKey> {
    let recid = RecoveryId::from_byte(recid).ok_or_else(|| recovery(format!("bad recovery id {}", recid)))?;
    let signature = EcdsaSignature::from_slice(rs).map_err(|e| recovery(e.to_string()))?;
    let key = VerifyingKey::recover_from_prehash(digest, &signature, recid)
        .map_err(|e| recovery(e.to_string()))?;

    let mut out = [0u8; 65];
    out.copy_from_slice(key.to_encoded_point(false).as_bytes());
    Ok(out)
}

pub(crate) fn recovery(msg: String) -> WalletError {
    WalletError::Crypto(CryptoError::Recovery(msg))
}

pub(crate) fn expect_len(bytes: &[u8], len: usize) -> WalletResult<()> {
    if bytes.len() != len {
        return Err(recovery(format!(
            "signature must be {} bytes, got {}",
            len,
            bytes.len()
        )));
    }
    Ok(())
}
