// wallet-core/src/crypto/paths.rs
//
// Derivation Paths - parsed HD path value type + per-chain builders
// BIP-44 (Purpose), SLIP-44 (Coin Types), SLIP-0010 (ed25519, all hardened)

use crate::error::{CryptoError, WalletError, WalletResult};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// SLIP-44 COIN TYPES
// =============================================================================
/// SLIP-44 Registered Coin Types
/// Ref: https://github.com/satoshilabs/slips/blob/master/slip-0044.md
pub mod coin_type {
    // ---- secp256k1 chains ----
    pub const BITCOIN: u32 = 0;
    pub const ETHEREUM: u32 = 60; // EVM chains share coin_type 60
    pub const FILECOIN: u32 = 461;

    // ---- ed25519 chains ----
    pub const SOLANA: u32 = 501;
    pub const APTOS: u32 = 637;
    pub const SUI: u32 = 784;

    /// Coin types whose wallets derive with secp256k1 / BIP-32.
    pub const SECP256K1_CHAINS: &[u32] = &[BITCOIN, ETHEREUM, FILECOIN];

    /// Coin types whose wallets derive with ed25519 / SLIP-0010.
    pub const ED25519_CHAINS: &[u32] = &[SOLANA, APTOS, SUI];
}

pub const HARDENED_OFFSET: u32 = 0x8000_0000;

// =============================================================================
// PATH SEGMENT
// =============================================================================
/// One level of a derivation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChildIndex {
    index: u32,
    hardened: bool,
}

impl ChildIndex {
    pub fn normal(index: u32) -> WalletResult<Self> {
        Self::new(index, false)
    }

    pub fn hardened(index: u32) -> WalletResult<Self> {
        Self::new(index, true)
    }

    pub fn new(index: u32, hardened: bool) -> WalletResult<Self> {
        if index >= HARDENED_OFFSET {
            return Err(WalletError::Crypto(CryptoError::InvalidPath(format!(
                "index {} out of range (must be < 2^31)",
                index
            ))));
        }
        Ok(Self { index, hardened })
    }

    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    #[inline]
    pub fn is_hardened(&self) -> bool {
        self.hardened
    }

    /// Index as used on the wire by BIP-32 / SLIP-0010 (hardened bit set).
    #[inline]
    pub fn raw(&self) -> u32 {
        if self.hardened {
            self.index | HARDENED_OFFSET
        } else {
            self.index
        }
    }
}

impl fmt::Display for ChildIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hardened {
            write!(f, "{}'", self.index)
        } else {
            write!(f, "{}", self.index)
        }
    }
}

// =============================================================================
// DERIVATION PATH
// =============================================================================
/// Parsed, immutable hierarchical derivation path.
///
/// Accepts both `'` and `h` as hardened markers and always re-serializes with
/// `'`, so `m/44h/60h/0h/0/0` round-trips to `m/44'/60'/0'/0/0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivationPath {
    segments: Vec<ChildIndex>,
}

impl DerivationPath {
    pub fn from_segments(segments: Vec<ChildIndex>) -> Self {
        Self { segments }
    }

    #[inline]
    pub fn segments(&self) -> &[ChildIndex] {
        &self.segments
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// BIP-44 purpose level (`44` in `m/44'/...`).
    pub fn purpose(&self) -> Option<ChildIndex> {
        self.segments.first().copied()
    }

    /// SLIP-44 coin type (second level).
    pub fn coin_type(&self) -> Option<ChildIndex> {
        self.segments.get(1).copied()
    }

    pub fn all_hardened(&self) -> bool {
        self.segments.iter().all(ChildIndex::is_hardened)
    }

    /// Return a copy with one more level appended.
    pub fn child(&self, index: ChildIndex) -> Self {
        let mut segments = self.segments.clone();
        segments.push(index);
        Self { segments }
    }

    fn parse_segment(segment: &str) -> WalletResult<ChildIndex> {
        let segment = segment.trim();
        let (digits, hardened) = match segment.strip_suffix('\'') {
            Some(rest) => (rest, true),
            None => match segment.strip_suffix('h') {
                Some(rest) => (rest, true),
                None => (segment, false),
            },
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(WalletError::Crypto(CryptoError::InvalidPath(format!(
                "invalid segment '{}'",
                segment
            ))));
        }

        // "00" or "044" would print back as "0" / "44"
        if digits.len() > 1 && digits.starts_with('0') {
            return Err(WalletError::Crypto(CryptoError::InvalidPath(format!(
                "leading zero in segment '{}'",
                segment
            ))));
        }

        let index: u32 = digits.parse().map_err(|e| {
            WalletError::Crypto(CryptoError::InvalidPath(format!(
                "invalid index '{}': {}",
                digits, e
            )))
        })?;

        ChildIndex::new(index, hardened)
    }
}

impl FromStr for DerivationPath {
    type Err = WalletError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let path = path.trim();
        let rest = path.strip_prefix('m').ok_or_else(|| {
            WalletError::Crypto(CryptoError::InvalidPath(format!(
                "path must start with 'm': {}",
                path
            )))
        })?;

        if rest.is_empty() {
            return Ok(Self { segments: vec![] });
        }

        let rest = rest.strip_prefix('/').ok_or_else(|| {
            WalletError::Crypto(CryptoError::InvalidPath(format!(
                "expected '/' after 'm': {}",
                path
            )))
        })?;

        let segments = rest
            .split('/')
            .map(Self::parse_segment)
            .collect::<WalletResult<Vec<_>>>()?;

        Ok(Self { segments })
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

// =============================================================================
// PRE-BUILT PATHS
// =============================================================================
/// Pre-built Derivation Paths for the supported chains
///
/// # Conventions
/// - EVM:      `m/44'/60'/account'/0/index`  (secp256k1, BIP-44)
/// - Filecoin: `m/44'/461'/account'/0/index` (secp256k1, BIP-44)
/// - Solana:   `m/44'/501'/0'/index'`        (ed25519, SLIP-0010, all hardened)
pub struct DerivationPaths;

impl DerivationPaths {
    pub const EVM_0: &'static str = "m/44'/60'/0'/0/0";
    pub const FILECOIN_0: &'static str = "m/44'/461'/0'/0/0";
    pub const SOLANA_0: &'static str = "m/44'/501'/0'/0'";

    /// EVM path with custom account & index
    #[inline]
    pub fn evm(account: u32, index: u32) -> WalletResult<DerivationPath> {
        Self::bip44(coin_type::ETHEREUM, account, 0, index)
    }

    /// Filecoin path with custom account & index
    #[inline]
    pub fn filecoin(account: u32, index: u32) -> WalletResult<DerivationPath> {
        Self::bip44(coin_type::FILECOIN, account, 0, index)
    }

    /// Solana path; the address index sits in the hardened fourth level.
    #[inline]
    pub fn solana(index: u32) -> WalletResult<DerivationPath> {
        Self::ed25519_path(coin_type::SOLANA, 0, &[index])
    }

    /// BIP-44 path `m/44'/coin'/account'/change/index` (secp256k1 chains)
    pub fn bip44(
        coin_type: u32,
        account: u32,
        change: u32,
        index: u32,
    ) -> WalletResult<DerivationPath> {
        Ok(DerivationPath::from_segments(vec![
            ChildIndex::hardened(44)?,
            ChildIndex::hardened(coin_type)?,
            ChildIndex::hardened(account)?,
            ChildIndex::normal(change)?,
            ChildIndex::normal(index)?,
        ]))
    }

    /// SLIP-0010 path for ed25519 (every level hardened)
    ///
    /// - Solana: `ed25519_path(501, 0, &[0])` -> m/44'/501'/0'/0'
    /// - Aptos:  `ed25519_path(637, 0, &[0, 0])` -> m/44'/637'/0'/0'/0'
    pub fn ed25519_path(
        coin_type: u32,
        account: u32,
        sub_paths: &[u32],
    ) -> WalletResult<DerivationPath> {
        let mut path = DerivationPath::from_segments(vec![
            ChildIndex::hardened(44)?,
            ChildIndex::hardened(coin_type)?,
            ChildIndex::hardened(account)?,
        ]);
        for &idx in sub_paths {
            path = path.child(ChildIndex::hardened(idx)?);
        }
        Ok(path)
    }
}

// =============================================================================
// TESTS
// =============================================================================
