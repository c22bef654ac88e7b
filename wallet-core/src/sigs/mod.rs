// wallet-core/src/sigs/mod.rs

//! Signature Provider Registry
//!
//! One [`SignatureProvider`] per [`SignatureScheme`], looked up by tag. The
//! registry is filled once (`new()` registers every built-in scheme, or
//! `empty()` + [`SignatureRegistry::register`]) and is read-only once shared:
//! registration needs `&mut self`, so an `Arc<SignatureRegistry>` can no
//! longer change.
//!
//! | Scheme              | Digest                | Layout                          |
//! |---------------------|-----------------------|---------------------------------|
//! | `Secp256k1Evm`      | keccak256(message)    | r (32) ‖ s (32) ‖ v (27 + recid) |
//! | `Secp256k1Filecoin` | blake2b-256(message)  | r (32) ‖ s (32) ‖ recid          |
//! | `Ed25519`           | none (pure Ed25519)   | 64-byte signature               |

mod ed25519;
mod secp256k1;
mod secp_evm;
mod secp_filecoin;

pub use ed25519::Ed25519Provider;
pub use secp_evm::EvmSecp256k1Provider;
pub use secp_filecoin::FilecoinSecp256k1Provider;

use crate::chains::filecoin::Network;
use crate::crypto::CurveType;
use crate::error::{CryptoError, WalletError, WalletResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use zeroize::Zeroizing;

// =============================================================================
// SCHEME TAG
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureScheme {
    /// secp256k1 over keccak256, recovery byte last as 27/28
    Secp256k1Evm,
    /// secp256k1 over blake2b-256 of the message CID, raw recovery id last
    Secp256k1Filecoin,
    /// Ed25519 (Solana)
    Ed25519,
}

impl SignatureScheme {
    pub const ALL: [SignatureScheme; 3] = [
        SignatureScheme::Secp256k1Evm,
        SignatureScheme::Secp256k1Filecoin,
        SignatureScheme::Ed25519,
    ];

    pub fn curve(self) -> CurveType {
        match self {
            SignatureScheme::Secp256k1Evm | SignatureScheme::Secp256k1Filecoin => {
                CurveType::Secp256k1
            }
            SignatureScheme::Ed25519 => CurveType::Ed25519,
        }
    }
}

impl fmt::Display for SignatureScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SignatureScheme::Secp256k1Evm => "secp256k1-evm",
            SignatureScheme::Secp256k1Filecoin => "secp256k1-filecoin",
            SignatureScheme::Ed25519 => "ed25519",
        })
    }
}

// =============================================================================
// SIGNATURE
// =============================================================================

/// Signature bytes tagged with the scheme that produced them.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    scheme: SignatureScheme,
    bytes: Vec<u8>,
}

impl Signature {
    pub fn new(scheme: SignatureScheme, bytes: Vec<u8>) -> Self {
        Self { scheme, bytes }
    }

    #[inline]
    pub fn scheme(&self) -> SignatureScheme {
        self.scheme
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}, 0x{})", self.scheme, hex::encode(&self.bytes))
    }
}

// =============================================================================
// PROVIDER TRAIT
// =============================================================================

/// Capability set of one signature scheme.
///
/// `message` is always the scheme's canonical signing payload; providers apply
/// their own digest (see the module table).
pub trait SignatureProvider: Send + Sync {
    fn scheme(&self) -> SignatureScheme;

    fn sign(&self, private_key: &[u8; 32], message: &[u8]) -> WalletResult<Signature>;

    /// Check that `signature` over `message` was produced by the key behind
    /// `address`.
    ///
    /// # Errors
    /// - `CryptoError::SignatureMismatch` when the signature is well-formed but
    ///   belongs to another key
    /// - `CryptoError::Recovery` when the signature cannot be parsed or no key
    ///   can be recovered from it
    fn verify(&self, signature: &Signature, address: &str, message: &[u8]) -> WalletResult<()>;

    fn generate_key(&self) -> Zeroizing<[u8; 32]>;

    /// Public key in the scheme's native encoding (SEC1 uncompressed for
    /// secp256k1, 32 bytes for Ed25519).
    fn public_key(&self, private_key: &[u8; 32]) -> WalletResult<Vec<u8>>;

    /// Chain address string for a public key.
    fn address_of(&self, public_key: &[u8]) -> WalletResult<String>;
}

// =============================================================================
// REGISTRY
// =============================================================================

#[derive(Clone)]
pub struct SignatureRegistry {
    providers: HashMap<SignatureScheme, Arc<dyn SignatureProvider>>,
}

impl fmt::Debug for SignatureRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureRegistry")
            .field("schemes", &self.schemes())
            .finish()
    }
}

impl Default for SignatureRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SignatureRegistry {
    /// Registry with every built-in provider; Filecoin addresses use mainnet.
    pub fn new() -> Self {
        Self::with_filecoin_network(Network::Mainnet)
    }

    /// Registry with every built-in provider; Filecoin addresses are rendered
    /// with `network`'s prefix.
    pub fn with_filecoin_network(network: Network) -> Self {
        let mut providers: HashMap<SignatureScheme, Arc<dyn SignatureProvider>> = HashMap::new();
        providers.insert(SignatureScheme::Secp256k1Evm, Arc::new(EvmSecp256k1Provider));
        providers.insert(
            SignatureScheme::Secp256k1Filecoin,
            Arc::new(FilecoinSecp256k1Provider::new(network)),
        );
        providers.insert(SignatureScheme::Ed25519, Arc::new(Ed25519Provider));
        Self { providers }
    }

    /// Registry without providers, for custom or test setups.
    pub fn empty() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Add a provider. A second provider for the same scheme is rejected with
    /// `DuplicateScheme`; the first registration stays in place.
    pub fn register(&mut self, provider: Arc<dyn SignatureProvider>) -> WalletResult<()> {
        let scheme = provider.scheme();
        if self.providers.contains_key(&scheme) {
            return Err(WalletError::Crypto(CryptoError::DuplicateScheme(scheme)));
        }
        self.providers.insert(scheme, provider);
        Ok(())
    }

    pub fn get(&self, scheme: SignatureScheme) -> WalletResult<&dyn SignatureProvider> {
        self.providers
            .get(&scheme)
            .map(|p| p.as_ref())
            .ok_or(WalletError::Crypto(CryptoError::UnsupportedScheme(scheme)))
    }

    #[inline]
    pub fn supports(&self, scheme: SignatureScheme) -> bool {
        self.providers.contains_key(&scheme)
    }

    pub fn schemes(&self) -> Vec<SignatureScheme> {
        SignatureScheme::ALL
            .into_iter()
            .filter(|s| self.providers.contains_key(s))
            .collect()
    }

    // ---- dispatch helpers ----

    pub fn sign(
        &self,
        scheme: SignatureScheme,
        private_key: &[u8; 32],
        message: &[u8],
    ) -> WalletResult<Signature> {
        self.get(scheme)?.sign(private_key, message)
    }

    /// Verify with the provider named by the signature's own tag.
    pub fn verify(&self, signature: &Signature, address: &str, message: &[u8]) -> WalletResult<()> {
        self.get(signature.scheme())?.verify(signature, address, message)
    }

    pub fn generate_key(&self, scheme: SignatureScheme) -> WalletResult<Zeroizing<[u8; 32]>> {
        Ok(self.get(scheme)?.generate_key())
    }

    pub fn public_key(&self, scheme: SignatureScheme, private_key: &[u8; 32]) -> WalletResult<Vec<u8>> {
        self.get(scheme)?.public_key(private_key)
    }

    pub fn address_of(&self, scheme: SignatureScheme, public_key: &[u8]) -> WalletResult<String> {
        self.get(scheme)?.address_of(public_key)
    }

    /// Address of the key pair behind `private_key`.
    pub fn address_of_private_key(
        &self,
        scheme: SignatureScheme,
        private_key: &[u8; 32],
    ) -> WalletResult<String> {
        let provider = self.get(scheme)?;
        let public_key = provider.public_key(private_key)?;
        provider.address_of(&public_key)
    }
}

// =============================================================================
// TESTS
// =============================================================================
