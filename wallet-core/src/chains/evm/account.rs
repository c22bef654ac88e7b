// wallet-core/src/chains/evm/account.rs
//
// EVM account: secp256k1 key at m/44'/60'/... bound to its EIP-55 address.

use super::address::{keccak256, EvmAddress};
use super::transaction::{sign_eip1559, sign_legacy, EvmTransfer};
use crate::crypto::{coin_type, CurveType, DerivationPath, DerivedKey};
use crate::error::{WalletError, WalletResult};
use crate::network::{ChainFamily, TransferAccount};
use crate::sigs::{Signature, SignatureRegistry, SignatureScheme};
use crate::wallet::ChainAccount;
use alloy::consensus::{TxEip1559, TxEnvelope, TxLegacy};
use alloy::primitives::Address;
use std::fmt;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Chain id used until [`EvmAccount::with_chain_id`] picks another network.
pub const DEFAULT_CHAIN_ID: u64 = 1;

pub struct EvmAccount {
    private_key: Zeroizing<[u8; 32]>,
    address: Address,
    path: DerivationPath,
    chain_id: u64,
    registry: Arc<SignatureRegistry>,
}

// Never print the key
impl fmt::Debug for EvmAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvmAccount")
            .field("address", &self.address)
            .field("path", &self.path.to_string())
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}

impl ChainAccount for EvmAccount {
    const CURVE: CurveType = CurveType::Secp256k1;
    const COIN_TYPE: u32 = coin_type::ETHEREUM;
    const SCHEME: SignatureScheme = SignatureScheme::Secp256k1Evm;

    fn from_derived(key: DerivedKey, registry: Arc<SignatureRegistry>) -> WalletResult<Self> {
        let address = registry.address_of_private_key(Self::SCHEME, &key.private_key)?;
        Ok(Self {
            address: EvmAddress::parse(&address)?,
            private_key: key.private_key,
            path: key.path,
            chain_id: DEFAULT_CHAIN_ID,
            registry,
        })
    }
}

impl EvmAccount {
    /// Bind transfers built by this account to `chain_id` (EIP-155).
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    #[inline]
    pub fn address(&self) -> Address {
        self.address
    }

    #[inline]
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    #[inline]
    pub fn path(&self) -> &DerivationPath {
        &self.path
    }

    /// Raw private key. Handle with care, never log.
    #[inline]
    pub fn private_key(&self) -> &[u8; 32] {
        &self.private_key
    }

    // =========================================================================
    // SIGNING
    // =========================================================================

    /// Sign `keccak256(message)`.
    pub fn sign_message(&self, message: &[u8]) -> WalletResult<Signature> {
        self.registry.sign(Self::SCHEME, &self.private_key, message)
    }

    /// EIP-191 personal sign: prefix "\x19Ethereum Signed Message:\n{len}".
    pub fn sign_personal_message(&self, message: &[u8]) -> WalletResult<Signature> {
        self.sign_message(&personal_message(message))
    }

    /// Check a personal-sign signature against `address`.
    pub fn verify_personal_message(
        registry: &SignatureRegistry,
        signature: &Signature,
        address: &str,
        message: &[u8],
    ) -> WalletResult<()> {
        registry.verify(signature, address, &personal_message(message))
    }

    pub fn sign_transaction(&self, tx: TxEip1559) -> WalletResult<TxEnvelope> {
        sign_eip1559(&self.registry, &self.private_key, tx)
    }

    pub fn sign_legacy_transaction(&self, tx: TxLegacy) -> WalletResult<TxEnvelope> {
        sign_legacy(&self.registry, &self.private_key, tx)
    }
}

fn personal_message(message: &[u8]) -> Vec<u8> {
    let mut out = format!("\x19Ethereum Signed Message:\n{}", message.len()).into_bytes();
    out.extend_from_slice(message);
    out
}

/// EIP-191 hash of `message`, what wallets display as the signed digest.
pub fn hash_personal_message(message: &[u8]) -> [u8; 32] {
    keccak256(&personal_message(message))
}

impl TransferAccount for EvmAccount {
    type Recipient = Address;
    type Message = EvmTransfer;
    type Signed = TxEnvelope;

    fn chain(&self) -> ChainFamily {
        ChainFamily::Evm
    }

    fn address(&self) -> String {
        self.address.to_checksum(None)
    }

    fn parse_recipient(&self, recipient: &str) -> WalletResult<Address> {
        let to = EvmAddress::parse(recipient.trim()).map_err(|e| match e {
            WalletError::InvalidAddress(reason) => WalletError::InvalidRecipient(reason),
            other => other,
        })?;
        if to == Address::ZERO {
            return Err(WalletError::InvalidRecipient("zero address".into()));
        }
        Ok(to)
    }

    fn build_transfer(&self, to: Address, value: u128) -> WalletResult<EvmTransfer> {
        Ok(EvmTransfer::new(self.chain_id, self.address, to, value))
    }

    fn sign_transfer(&self, message: EvmTransfer) -> WalletResult<TxEnvelope> {
        if message.from != self.address {
            return Err(WalletError::Validation(format!(
                "transfer is from {}, account is {}",
                message.from, self.address
            )));
        }
        self.sign_transaction(message.tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::evm::transaction::recover_sender;
    use crate::crypto::DerivationPaths;
    use crate::wallet::Wallet;

    const PHRASE: &str =
        "tag volcano eight thank tide danger coast health above argue embrace heavy";

    fn account() -> EvmAccount {
        Wallet::from_phrase(PHRASE)
            .unwrap()
            .must_derive_account(DerivationPaths::EVM_0)
    }

    #[test]
    fn test_personal_sign_round_trip() {
        let acc = account();
        let sig = acc.sign_personal_message(b"login nonce 42").unwrap();
        let registry = SignatureRegistry::new();
        EvmAccount::verify_personal_message(&registry, &sig, &TransferAccount::address(&acc), b"login nonce 42")
            .unwrap();
        // raw keccak signature is not a personal signature
        assert!(EvmAccount::verify_personal_message(
            &registry,
            &acc.sign_message(b"login nonce 42").unwrap(),
            &TransferAccount::address(&acc),
            b"login nonce 42"
        )
        .is_err());
    }

    #[test]
    fn test_personal_message_prefix() {
        assert_eq!(personal_message(b"hi"), b"\x19Ethereum Signed Message:\n2hi".to_vec());
        // eth_sign("hello") digest
        assert_eq!(
            hex::encode(hash_personal_message(b"hello")),
            "50b2c43fd39106bafbba0da34fc430e1f91e3c96ea2acee2bc34119f92b37750"
        );
    }

    #[test]
    fn test_recipient_validation() {
        let acc = account();
        assert!(acc.parse_recipient("0x70997970C51812dc3A010C7d01b50e0d17dc79C8").is_ok());
        assert!(matches!(
            acc.parse_recipient(""),
            Err(WalletError::InvalidRecipient(_))
        ));
        assert!(matches!(
            acc.parse_recipient("0x0000000000000000000000000000000000000000"),
            Err(WalletError::InvalidRecipient(_))
        ));
        assert!(matches!(
            acc.parse_recipient("0x70997970c51812dc3A010C7d01b50e0d17dc79C8"),
            Err(WalletError::InvalidRecipient(_))
        ));
    }

    #[test]
    fn test_transfer_signed_by_account() {
        let acc = account().with_chain_id(11155111);
        let to = acc.parse_recipient("0x70997970C51812dc3A010C7d01b50e0d17dc79C8").unwrap();
        let draft = acc.build_transfer(to, 1).unwrap();
        assert_eq!(draft.tx.chain_id, 11155111);
        let envelope = acc.sign_transfer(draft).unwrap();
        assert_eq!(recover_sender(&envelope).unwrap(), acc.address());
    }

    #[test]
    fn test_rejects_foreign_draft() {
        let acc = account();
        let mut draft = acc.build_transfer(Address::repeat_byte(1), 1).unwrap();
        draft.from = Address::repeat_byte(2);
        assert!(matches!(acc.sign_transfer(draft), Err(WalletError::Validation(_))));
    }

    #[test]
    fn test_debug_hides_key() {
        let acc = account();
        let debug = format!("{:?}", acc);
        assert!(!debug.contains(&hex::encode(acc.private_key())));
    }
}
