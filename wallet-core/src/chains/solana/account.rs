// wallet-core/src/chains/solana/account.rs
//
// Solana account: Ed25519 key at m/44'/501'/0'/{index}' (SLIP-0010, all
// hardened) bound to its base58 address.

use super::address::SolanaAddress;
use super::transaction::{SignedTransfer, SolanaTransfer};
use crate::crypto::{coin_type, CurveType, DerivationPath, DerivedKey};
use crate::error::{WalletError, WalletResult};
use crate::network::{ChainFamily, TransferAccount};
use crate::sigs::{Signature, SignatureRegistry, SignatureScheme};
use crate::wallet::ChainAccount;
use std::fmt;
use std::sync::Arc;
use zeroize::Zeroizing;

pub struct SolanaAccount {
    private_key: Zeroizing<[u8; 32]>,
    address: SolanaAddress,
    path: DerivationPath,
    registry: Arc<SignatureRegistry>,
}

impl fmt::Debug for SolanaAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolanaAccount")
            .field("address", &self.address.to_string())
            .field("path", &self.path.to_string())
            .finish_non_exhaustive()
    }
}

impl ChainAccount for SolanaAccount {
    const CURVE: CurveType = CurveType::Ed25519;
    const COIN_TYPE: u32 = coin_type::SOLANA;
    const SCHEME: SignatureScheme = SignatureScheme::Ed25519;

    fn from_derived(key: DerivedKey, registry: Arc<SignatureRegistry>) -> WalletResult<Self> {
        let address = registry.address_of_private_key(Self::SCHEME, &key.private_key)?;
        Ok(Self {
            address: address.parse()?,
            private_key: key.private_key,
            path: key.path,
            registry,
        })
    }
}

impl SolanaAccount {
    #[inline]
    pub fn address(&self) -> SolanaAddress {
        self.address
    }

    #[inline]
    pub fn path(&self) -> &DerivationPath {
        &self.path
    }

    /// Ed25519 seed. Never log.
    #[inline]
    pub fn private_key(&self) -> &[u8; 32] {
        &self.private_key
    }

    /// Off-chain message signature.
    pub fn sign_message(&self, message: &[u8]) -> WalletResult<Signature> {
        self.registry.sign(Self::SCHEME, &self.private_key, message)
    }
}

impl TransferAccount for SolanaAccount {
    type Recipient = SolanaAddress;
    type Message = SolanaTransfer;
    type Signed = SignedTransfer;

    fn chain(&self) -> ChainFamily {
        ChainFamily::Solana
    }

    fn address(&self) -> String {
        self.address.to_string()
    }

    fn parse_recipient(&self, recipient: &str) -> WalletResult<SolanaAddress> {
        let to: SolanaAddress = recipient.trim().parse().map_err(|e| match e {
            WalletError::InvalidAddress(reason) => WalletError::InvalidRecipient(reason),
            other => other,
        })?;
        if to == SolanaAddress::SYSTEM_PROGRAM {
            return Err(WalletError::InvalidRecipient("system program id".into()));
        }
        Ok(to)
    }

    fn build_transfer(&self, to: SolanaAddress, value: u128) -> WalletResult<SolanaTransfer> {
        let lamports = u64::try_from(value).map_err(|_| {
            WalletError::InvalidAmount(format!("{} lamports exceeds u64", value))
        })?;
        Ok(SolanaTransfer::new(self.address, to, lamports))
    }

    fn sign_transfer(&self, message: SolanaTransfer) -> WalletResult<SignedTransfer> {
        if message.from != self.address {
            return Err(WalletError::Validation(format!(
                "transfer is from {}, account is {}",
                message.from, self.address
            )));
        }
        SignedTransfer::sign(&self.registry, &self.private_key, message)
    }
}
