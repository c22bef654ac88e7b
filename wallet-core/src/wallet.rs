// wallet-core/src/wallet.rs
//
// Wallet: owns the BIP-39 seed, hands out chain accounts.
//
//   mnemonic ──to_seed──▶ Wallet ──derive_account::<A>(path)──▶ A (EVM / Filecoin / Solana)
//
// Accounts are derived on demand and not cached. The seed is zeroized when the
// wallet drops and never appears in `Debug` output.

use crate::crypto::{CurveType, DerivationPath, DerivedKey, KeyDeriver, WalletMnemonic};
use crate::error::{CryptoError, WalletError, WalletResult};
use crate::sigs::{SignatureRegistry, SignatureScheme};
use std::fmt;
use std::sync::Arc;
use zeroize::Zeroizing;

const MIN_SEED_LEN: usize = 16;
const MAX_SEED_LEN: usize = 64;

/// A chain account that can be derived from a seed.
///
/// `from_derived` must compute the address from the key through the registry,
/// so the (key, address) pair is always consistent.
pub trait ChainAccount: Sized {
    const CURVE: CurveType;
    /// SLIP-44 coin type the derivation path must carry.
    const COIN_TYPE: u32;
    const SCHEME: SignatureScheme;

    fn from_derived(key: DerivedKey, registry: Arc<SignatureRegistry>) -> WalletResult<Self>;
}

pub struct Wallet {
    seed: Zeroizing<Vec<u8>>,
    registry: Arc<SignatureRegistry>,
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("seed", &"[REDACTED]")
            .field("registry", &self.registry)
            .finish()
    }
}

impl Wallet {
    // =========================================================================
    // CONSTRUCTORS
    // =========================================================================

    /// Wallet from a validated mnemonic, no passphrase, default registry.
    pub fn from_mnemonic(mnemonic: &WalletMnemonic) -> WalletResult<Self> {
        Self::from_mnemonic_with_passphrase(mnemonic, None)
    }

    pub fn from_mnemonic_with_passphrase(
        mnemonic: &WalletMnemonic,
        passphrase: Option<&str>,
    ) -> WalletResult<Self> {
        let seed = mnemonic.to_seed(passphrase)?;
        Self::from_seed(seed.as_ref())
    }

    /// Parse `phrase` and build the wallet in one go.
    pub fn from_phrase(phrase: &str) -> WalletResult<Self> {
        Self::from_mnemonic(&WalletMnemonic::from_phrase(phrase)?)
    }

    /// Raw seed of 16 to 64 bytes.
    pub fn from_seed(seed: &[u8]) -> WalletResult<Self> {
        if !(MIN_SEED_LEN..=MAX_SEED_LEN).contains(&seed.len()) {
            return Err(WalletError::Crypto(CryptoError::DerivationFailed(format!(
                "seed must be {}..={} bytes, got {}",
                MIN_SEED_LEN,
                MAX_SEED_LEN,
                seed.len()
            ))));
        }
        Ok(Self {
            seed: Zeroizing::new(seed.to_vec()),
            registry: Arc::new(SignatureRegistry::new()),
        })
    }

    /// Swap the signature registry shared by derived accounts, e.g. one built
    /// with `SignatureRegistry::with_filecoin_network(Network::Testnet)`.
    pub fn with_registry(mut self, registry: Arc<SignatureRegistry>) -> Self {
        self.registry = registry;
        self
    }

    #[inline]
    pub fn registry(&self) -> &Arc<SignatureRegistry> {
        &self.registry
    }

    // =========================================================================
    // DERIVATION
    // =========================================================================

    /// Raw key material at `path`.
    pub fn derive_key(&self, path: &DerivationPath, curve: CurveType) -> WalletResult<DerivedKey> {
        KeyDeriver::derive(&self.seed, path, curve)
    }

    /// Derive an account of type `A` at `path`.
    ///
    /// # Errors
    /// - `CryptoError::InvalidPath` when the path's coin type is not `A::COIN_TYPE`
    ///   or breaks the curve's hardening rules
    /// - `CryptoError::DerivationFailed` when the EC math rejects the key
    pub fn derive_account<A: ChainAccount>(&self, path: &DerivationPath) -> WalletResult<A> {
        let coin = path.coin_type().map(|c| c.index());
        if coin != Some(A::COIN_TYPE) {
            return Err(WalletError::Crypto(CryptoError::InvalidPath(format!(
                "{} does not use coin type {}",
                path,
                A::COIN_TYPE
            ))));
        }
        let key = self.derive_key(path, A::CURVE)?;
        A::from_derived(key, Arc::clone(&self.registry))
    }

    /// Derive from a trusted constant path such as `DerivationPaths::EVM_0`.
    ///
    /// # Panics
    /// Panics if `path` does not parse or derivation fails. Only for paths
    /// fixed at compile time; use [`Wallet::derive_account`] for anything
    /// user-supplied.
    pub fn must_derive_account<A: ChainAccount>(&self, path: &str) -> A {
        let derived = path
            .parse::<DerivationPath>()
            .and_then(|p| self.derive_account::<A>(&p));
        match derived {
            Ok(account) => account,
            Err(e) => panic!("derivation of trusted path {} failed: {}", path, e),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
