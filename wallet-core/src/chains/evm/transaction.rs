// wallet-core/src/chains/evm/transaction.rs
//
// EVM transaction signing over alloy's consensus types.
//
// Signing payload: `encoded_for_signing()` (EIP-155 RLP for legacy, 0x02 ‖ RLP
// for EIP-1559). The registry's EVM provider hashes it with keccak256, so the
// signature covers exactly the transaction's signature hash.
//
// Raw transaction: EIP-2718 envelope, ready for `eth_sendRawTransaction`.

use super::address::keccak256;
use crate::error::{CryptoError, WalletError, WalletResult};
use crate::network::{FeeQuote, TransferMessage};
use crate::sigs::{EvmSecp256k1Provider, Signature, SignatureRegistry, SignatureScheme};
use alloy::consensus::{SignableTransaction, TxEip1559, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{Address, Bytes, Signature as EcdsaSignature, TxKind, U256};

/// Gas used by a plain value transfer to an externally owned account.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

// =============================================================================
// TRANSFER DRAFT
// =============================================================================

/// EIP-1559 value transfer together with its sender. Fee fields stay zero until
/// the node quotes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvmTransfer {
    pub from: Address,
    pub tx: TxEip1559,
}

impl EvmTransfer {
    pub fn new(chain_id: u64, from: Address, to: Address, value: u128) -> Self {
        Self {
            from,
            tx: TxEip1559 {
                chain_id,
                nonce: 0,
                gas_limit: TRANSFER_GAS_LIMIT,
                max_fee_per_gas: 0,
                max_priority_fee_per_gas: 0,
                to: TxKind::Call(to),
                value: U256::from(value),
                access_list: Default::default(),
                input: Bytes::new(),
            },
        }
    }

    /// Recipient, `None` for contract creation.
    pub fn to(&self) -> Option<Address> {
        match self.tx.to {
            TxKind::Call(to) => Some(to),
            TxKind::Create => None,
        }
    }

    /// Worst-case fee: gas limit × max fee per gas.
    pub fn max_fee(&self) -> u128 {
        u128::from(self.tx.gas_limit).saturating_mul(self.tx.max_fee_per_gas)
    }
}

impl TransferMessage for EvmTransfer {
    type Sequence = u64;

    fn value(&self) -> u128 {
        self.tx.value.saturating_to::<u128>()
    }

    fn fee_quote(&self) -> FeeQuote {
        FeeQuote {
            max_fee_per_unit: self.tx.max_fee_per_gas,
            priority_fee_per_unit: self.tx.max_priority_fee_per_gas,
        }
    }

    fn assign_sequence(&mut self, sequence: u64) {
        self.tx.nonce = sequence;
    }
}

// =============================================================================
// SIGNING
// =============================================================================

/// 65-byte registry signature (r ‖ s ‖ v) -> alloy signature with y-parity.
fn to_ecdsa(signature: &Signature) -> WalletResult<EcdsaSignature> {
    if signature.scheme() != SignatureScheme::Secp256k1Evm {
        return Err(WalletError::Crypto(CryptoError::SigningFailed(format!(
            "EVM transactions need {} signatures, got {}",
            SignatureScheme::Secp256k1Evm,
            signature.scheme()
        ))));
    }
    let (rs, recid) = EvmSecp256k1Provider::split(signature.as_bytes())?;
    Ok(EcdsaSignature::new(
        U256::from_be_slice(&rs[..32]),
        U256::from_be_slice(&rs[32..]),
        recid == 1,
    ))
}

/// alloy signature -> r ‖ s ‖ (27 + parity).
fn from_ecdsa(signature: &EcdsaSignature) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(65);
    bytes.extend_from_slice(&signature.r().to_be_bytes::<32>());
    bytes.extend_from_slice(&signature.s().to_be_bytes::<32>());
    bytes.push(27 + u8::from(signature.v()));
    bytes
}

/// Sign an EIP-1559 transaction.
pub fn sign_eip1559(
    registry: &SignatureRegistry,
    private_key: &[u8; 32],
    tx: TxEip1559,
) -> WalletResult<TxEnvelope> {
    let signature = registry.sign(SignatureScheme::Secp256k1Evm, private_key, &tx.encoded_for_signing())?;
    Ok(tx.into_signed(to_ecdsa(&signature)?).into())
}

/// Sign a legacy transaction. With `chain_id` set the signature is EIP-155
/// replay protected (v = chain_id × 2 + 35 + parity on the wire).
pub fn sign_legacy(
    registry: &SignatureRegistry,
    private_key: &[u8; 32],
    tx: TxLegacy,
) -> WalletResult<TxEnvelope> {
    let signature = registry.sign(SignatureScheme::Secp256k1Evm, private_key, &tx.encoded_for_signing())?;
    Ok(tx.into_signed(to_ecdsa(&signature)?).into())
}

/// EIP-2718 bytes for `eth_sendRawTransaction`.
#[inline]
pub fn raw_transaction(envelope: &TxEnvelope) -> Vec<u8> {
    envelope.encoded_2718()
}

/// Transaction hash: keccak256 of the EIP-2718 encoding.
pub fn transaction_hash(envelope: &TxEnvelope) -> [u8; 32] {
    keccak256(&envelope.encoded_2718())
}

/// Signer address recovered from the envelope's signature.
pub fn recover_sender(envelope: &TxEnvelope) -> WalletResult<Address> {
    let (signature, payload) = match envelope {
        TxEnvelope::Legacy(signed) => (signed.signature(), signed.tx().encoded_for_signing()),
        TxEnvelope::Eip1559(signed) => (signed.signature(), signed.tx().encoded_for_signing()),
        _ => {
            return Err(WalletError::Validation(
                "only legacy and EIP-1559 transactions are supported".into(),
            ))
        }
    };
    EvmSecp256k1Provider::recover_address(&from_ecdsa(signature), &payload)
}

// =============================================================================
// TESTS
// =============================================================================
