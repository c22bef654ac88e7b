// wallet-core/src/crypto/mod.rs

//! Core Cryptography Module
//!
//! - **Mnemonic**: BIP-39 phrases and seeds via [`WalletMnemonic`].
//! - **Key Derivation**: BIP-32 secp256k1 (EVM, Filecoin) and SLIP-0010 Ed25519 (Solana) via [`KeyDeriver`].
//! - **Derivation Paths**: parsed [`DerivationPath`] plus per-chain builders in [`DerivationPaths`].
//! - **Amounts**: fixed-point [`TokenAmount`] with a per-chain [`Denomination`].

pub mod amount;
pub mod key_deriver;
pub mod mnemonic;
pub mod paths;

pub use amount::{Denomination, TokenAmount};
pub use key_deriver::{CurveType, DerivedKey, KeyDeriver};
pub use mnemonic::{WalletMnemonic, WordCount};
pub use paths::{coin_type, ChildIndex, DerivationPath, DerivationPaths};
