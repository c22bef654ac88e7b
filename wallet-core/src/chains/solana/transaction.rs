// wallet-core/src/chains/solana/transaction.rs
//
// Legacy Solana transaction carrying one System Program transfer.
//
// Message
//   header            [num_required_signatures = 1, readonly_signed = 0, readonly_unsigned = 1]
//   account keys      compact-u16 len ‖ [from, to, system program]   (to omitted if == from)
//   recent blockhash  32 bytes
//   instructions      compact-u16 len ‖ [program_idx ‖ accounts ‖ data]
//     data = u32 LE 2 (Transfer) ‖ u64 LE lamports
//
// Transaction = compact-u16 1 ‖ ed25519 signature (64) ‖ message

use super::address::SolanaAddress;
use crate::error::{CryptoError, WalletError, WalletResult};
use crate::network::{FeeQuote, TransferMessage};
use crate::sigs::{Signature, SignatureRegistry, SignatureScheme};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::fmt;
use std::str::FromStr;

const SYSTEM_TRANSFER: u32 = 2;

// =============================================================================
// BLOCKHASH
// =============================================================================

/// Recent blockhash: orders a sender's transactions and bounds their lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Blockhash([u8; 32]);

impl Blockhash {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Blockhash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl FromStr for Blockhash {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| WalletError::Validation(format!("blockhash '{}': {}", s, e)))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| WalletError::Validation(format!("blockhash '{}' is not 32 bytes", s)))?;
        Ok(Self(bytes))
    }
}

// =============================================================================
// WIRE HELPERS
// =============================================================================

/// Solana's "shortvec" length prefix.
pub fn encode_compact_u16(mut value: u16, out: &mut Vec<u8>) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        byte |= 0x80;
        out.push(byte);
    }
}

// =============================================================================
// TRANSFER
// =============================================================================

/// System Program transfer draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolanaTransfer {
    pub from: SolanaAddress,
    pub to: SolanaAddress,
    pub lamports: u64,
    pub recent_blockhash: Blockhash,
    /// Lamports the node quoted for this message, zero until estimated.
    pub fee: u64,
}

impl SolanaTransfer {
    pub fn new(from: SolanaAddress, to: SolanaAddress, lamports: u64) -> Self {
        Self {
            from,
            to,
            lamports,
            recent_blockhash: Blockhash::default(),
            fee: 0,
        }
    }

    /// Serialized message, the exact bytes the fee payer signs.
    pub fn message_bytes(&self) -> Vec<u8> {
        let mut keys = vec![self.from];
        if self.to != self.from {
            keys.push(self.to);
        }
        keys.push(SolanaAddress::SYSTEM_PROGRAM);
        let to_index = if self.to == self.from { 0u8 } else { 1u8 };
        let program_index = (keys.len() - 1) as u8;

        let mut out = Vec::with_capacity(160);
        out.extend_from_slice(&[1, 0, 1]);

        encode_compact_u16(keys.len() as u16, &mut out);
        for key in &keys {
            out.extend_from_slice(key.as_bytes());
        }
        out.extend_from_slice(self.recent_blockhash.as_bytes());

        let mut data = Vec::with_capacity(12);
        data.extend_from_slice(&SYSTEM_TRANSFER.to_le_bytes());
        data.extend_from_slice(&self.lamports.to_le_bytes());

        encode_compact_u16(1, &mut out);
        out.push(program_index);
        encode_compact_u16(2, &mut out);
        out.extend_from_slice(&[0, to_index]);
        encode_compact_u16(data.len() as u16, &mut out);
        out.extend_from_slice(&data);
        out
    }

    /// Base64 message, the form `getFeeForMessage` expects.
    pub fn message_base64(&self) -> String {
        BASE64.encode(self.message_bytes())
    }
}

impl TransferMessage for SolanaTransfer {
    type Sequence = Blockhash;

    fn value(&self) -> u128 {
        u128::from(self.lamports)
    }

    /// Flat fee per message, no priority component.
    fn fee_quote(&self) -> FeeQuote {
        FeeQuote {
            max_fee_per_unit: u128::from(self.fee),
            priority_fee_per_unit: 0,
        }
    }

    fn assign_sequence(&mut self, sequence: Blockhash) {
        self.recent_blockhash = sequence;
    }
}

// =============================================================================
// SIGNED TRANSACTION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransfer {
    transfer: SolanaTransfer,
    signature: Signature,
}

impl SignedTransfer {
    pub fn sign(
        registry: &SignatureRegistry,
        private_key: &[u8; 32],
        transfer: SolanaTransfer,
    ) -> WalletResult<Self> {
        let signature = registry.sign(SignatureScheme::Ed25519, private_key, &transfer.message_bytes())?;
        if signature.as_bytes().len() != 64 {
            return Err(WalletError::Crypto(CryptoError::SigningFailed(format!(
                "ed25519 signature must be 64 bytes, got {}",
                signature.as_bytes().len()
            ))));
        }
        Ok(Self { transfer, signature })
    }

    #[inline]
    pub fn transfer(&self) -> &SolanaTransfer {
        &self.transfer
    }

    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Transaction id: base58 of the fee payer's signature.
    pub fn id(&self) -> String {
        bs58::encode(self.signature.as_bytes()).into_string()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let message = self.transfer.message_bytes();
        let mut out = Vec::with_capacity(1 + 64 + message.len());
        encode_compact_u16(1, &mut out);
        out.extend_from_slice(self.signature.as_bytes());
        out.extend_from_slice(&message);
        out
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(self.to_bytes())
    }

    pub fn verify(&self, registry: &SignatureRegistry) -> WalletResult<()> {
        registry.verify(
            &self.signature,
            &self.transfer.from.to_string(),
            &self.transfer.message_bytes(),
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================
