// wallet-core/src/crypto/mnemonic.rs
//
// Mnemonic Module - BIP-39 phrases and PBKDF2-HMAC-SHA512 seed derivation

use crate::error::{MnemonicError, WalletError, WalletResult};
use bip39::{Language, Mnemonic};
use rand::{rngs::OsRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Supported phrase lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordCount {
    Twelve = 12,
    Fifteen = 15,
    Eighteen = 18,
    TwentyOne = 21,
    TwentyFour = 24,
}

impl WordCount {
    #[inline]
    pub const fn entropy_bytes(self) -> usize {
        match self {
            WordCount::Twelve => 16,
            WordCount::Fifteen => 20,
            WordCount::Eighteen => 24,
            WordCount::TwentyOne => 28,
            WordCount::TwentyFour => 32,
        }
    }

    pub fn from_count(count: usize) -> Option<Self> {
        match count {
            12 => Some(WordCount::Twelve),
            15 => Some(WordCount::Fifteen),
            18 => Some(WordCount::Eighteen),
            21 => Some(WordCount::TwentyOne),
            24 => Some(WordCount::TwentyFour),
            _ => None,
        }
    }
}

/// Validated BIP-39 phrase.
///
/// The phrase is zeroized on drop and never printed by `Debug`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct WalletMnemonic {
    phrase: String,
    word_count: usize,
}

impl std::fmt::Debug for WalletMnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletMnemonic")
            .field("word_count", &self.word_count)
            .field("phrase", &"[REDACTED]")
            .finish()
    }
}

impl WalletMnemonic {
    // =========================================================================
    // CONSTRUCTORS
    // =========================================================================

    /// Generate a fresh phrase from `OsRng` entropy.
    pub fn generate(word_count: WordCount) -> WalletResult<Self> {
        let entropy_size = word_count.entropy_bytes();

        let mut entropy = [0u8; 32];
        OsRng.fill_bytes(&mut entropy[..entropy_size]);
        let mnemonic = Mnemonic::from_entropy(&entropy[..entropy_size]);
        entropy.zeroize();

        let mnemonic = mnemonic.map_err(map_bip39_error)?;
        Ok(Self {
            phrase: mnemonic.to_string(),
            word_count: word_count as usize,
        })
    }

    /// Parse and validate an existing phrase.
    ///
    /// Whitespace is normalized before validation. Checks word count,
    /// wordlist membership and checksum, in that order.
    pub fn from_phrase(phrase: &str) -> WalletResult<Self> {
        let words = phrase.split_whitespace().collect::<Vec<_>>();
        let count = words.len();

        if WordCount::from_count(count).is_none() {
            return Err(WalletError::Mnemonic(MnemonicError::InvalidWordCount(count)));
        }

        if let Some(unknown) = words.iter().find(|w| Language::English.find_word(w).is_none()) {
            return Err(WalletError::Mnemonic(MnemonicError::UnknownWord(
                (*unknown).to_string(),
            )));
        }

        let normalized = words.join(" ");
        Mnemonic::parse_in_normalized(Language::English, &normalized).map_err(map_bip39_error)?;

        Ok(Self {
            phrase: normalized,
            word_count: count,
        })
    }

    // =========================================================================
    // GETTERS
    // =========================================================================

    /// The phrase itself. Never log it.
    #[inline]
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    #[inline]
    pub fn word_count(&self) -> usize {
        self.word_count
    }

    // =========================================================================
    // SEED DERIVATION
    // =========================================================================

    /// 64-byte BIP-39 seed; `passphrase` is the optional "25th word".
    pub fn to_seed(&self, passphrase: Option<&str>) -> WalletResult<Zeroizing<[u8; 64]>> {
        let mnemonic = Mnemonic::parse_in_normalized(Language::English, &self.phrase)
            .map_err(map_bip39_error)?;
        Ok(Zeroizing::new(mnemonic.to_seed(passphrase.unwrap_or(""))))
    }

    // =========================================================================
    // VALIDATION
    // =========================================================================

    #[inline]
    pub fn validate(phrase: &str) -> bool {
        Self::from_phrase(phrase).is_ok()
    }

    pub fn is_valid_word(word: &str) -> bool {
        Language::English.find_word(word).is_some()
    }
}

fn map_bip39_error(e: bip39::Error) -> WalletError {
    match e {
        bip39::Error::BadWordCount(n) => WalletError::Mnemonic(MnemonicError::InvalidWordCount(n)),
        bip39::Error::InvalidChecksum => WalletError::Mnemonic(MnemonicError::ChecksumFailed),
        other => WalletError::Mnemonic(MnemonicError::Bip39Error(other.to_string())),
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_MNEMONIC_12: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_generate() {
        let m12 = WalletMnemonic::generate(WordCount::Twelve).unwrap();
        let m24 = WalletMnemonic::generate(WordCount::TwentyFour).unwrap();
        assert_eq!(m12.word_count(), 12);
        assert_eq!(m24.word_count(), 24);
        assert!(WalletMnemonic::validate(m12.phrase()));
        assert!(WalletMnemonic::validate(m24.phrase()));
        assert_ne!(m12.phrase(), WalletMnemonic::generate(WordCount::Twelve).unwrap().phrase());
    }

    #[test]
    fn test_from_phrase_normalizes_whitespace() {
        let messy =
            "  abandon  abandon   abandon abandon abandon abandon abandon abandon abandon abandon abandon about  ";
        let mnemonic = WalletMnemonic::from_phrase(messy).unwrap();
        assert_eq!(mnemonic.phrase(), TEST_MNEMONIC_12);
    }

    #[test]
    fn test_from_phrase_errors() {
        assert_eq!(
            WalletMnemonic::from_phrase("abandon abandon abandon").unwrap_err(),
            WalletError::Mnemonic(MnemonicError::InvalidWordCount(3))
        );
        assert_eq!(
            WalletMnemonic::from_phrase(
                "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon invalid"
            )
            .unwrap_err(),
            WalletError::Mnemonic(MnemonicError::UnknownWord("invalid".into()))
        );
        assert_eq!(
            WalletMnemonic::from_phrase(
                "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon"
            )
            .unwrap_err(),
            WalletError::Mnemonic(MnemonicError::ChecksumFailed)
        );
    }

    #[test]
    fn test_to_seed_trezor_vector() {
        let mnemonic = WalletMnemonic::from_phrase(TEST_MNEMONIC_12).unwrap();
        let seed = mnemonic.to_seed(Some("TREZOR")).unwrap();
        assert_eq!(
            hex::encode(&*seed),
            "c55257c360c07c72029aebc1b53c05ed0362ada38ead3e3e9efa3708e53495531f09a6987599d18264c1e1c92f2cf141630c7a3c4ab7c81b2f001698e7463b04"
        );
        assert_ne!(&*seed, &*mnemonic.to_seed(None).unwrap());
    }

    #[test]
    fn test_is_valid_word() {
        assert!(WalletMnemonic::is_valid_word("abandon"));
        assert!(WalletMnemonic::is_valid_word("zoo"));
        assert!(!WalletMnemonic::is_valid_word("invalidword"));
    }

    #[test]
    fn test_debug_does_not_leak_phrase() {
        let mnemonic = WalletMnemonic::from_phrase(TEST_MNEMONIC_12).unwrap();
        let debug_output = format!("{:?}", mnemonic);
        assert!(!debug_output.contains("abandon"));
        assert!(debug_output.contains("REDACTED"));
    }
}
