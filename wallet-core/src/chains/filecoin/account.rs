// wallet-core/src/chains/filecoin/account.rs
//
// Filecoin account: secp256k1 key at m/44'/461'/... bound to its f1/t1 address.
// The network prefix follows the registry's Filecoin provider.

use super::address::FilecoinAddress;
use super::message::{Message, SignedMessage};
use crate::crypto::{coin_type, CurveType, DerivationPath, DerivedKey};
use crate::error::{WalletError, WalletResult};
use crate::network::{ChainFamily, TransferAccount};
use crate::sigs::{SignatureRegistry, SignatureScheme};
use crate::wallet::ChainAccount;
use std::fmt;
use std::sync::Arc;
use zeroize::Zeroizing;

pub struct FilecoinAccount {
    private_key: Zeroizing<[u8; 32]>,
    address: FilecoinAddress,
    path: DerivationPath,
    registry: Arc<SignatureRegistry>,
}

impl fmt::Debug for FilecoinAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilecoinAccount")
            .field("address", &self.address.to_string())
            .field("path", &self.path.to_string())
            .finish_non_exhaustive()
    }
}

impl ChainAccount for FilecoinAccount {
    const CURVE: CurveType = CurveType::Secp256k1;
    const COIN_TYPE: u32 = coin_type::FILECOIN;
    const SCHEME: SignatureScheme = SignatureScheme::Secp256k1Filecoin;

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

impl FilecoinAccount {
    #[inline]
    pub fn address(&self) -> &FilecoinAddress {
        &self.address
    }

    #[inline]
    pub fn path(&self) -> &DerivationPath {
        &self.path
    }

    /// Raw private key. Never log.
    #[inline]
    pub fn private_key(&self) -> &[u8; 32] {
        &self.private_key
    }

    /// Sign the message CID.
    pub fn sign_message(&self, message: Message) -> WalletResult<SignedMessage> {
        if !message.from.same_actor(&self.address) {
            return Err(WalletError::Validation(format!(
                "message is from {}, account is {}",
                message.from, self.address
            )));
        }
        let signature = self
            .registry
            .sign(Self::SCHEME, &self.private_key, &message.signing_bytes())?;
        SignedMessage::new(message, signature)
    }
}

impl TransferAccount for FilecoinAccount {
    type Recipient = FilecoinAddress;
    type Message = Message;
    type Signed = SignedMessage;

    fn chain(&self) -> ChainFamily {
        ChainFamily::Filecoin
    }

    fn address(&self) -> String {
        self.address.to_string()
    }

    fn parse_recipient(&self, recipient: &str) -> WalletResult<FilecoinAddress> {
        let recipient = recipient.trim();
        if recipient.is_empty() {
            return Err(WalletError::InvalidRecipient("empty address".into()));
        }
        let to: FilecoinAddress = recipient.parse().map_err(|e| match e {
            WalletError::InvalidAddress(reason) => WalletError::InvalidRecipient(reason),
            other => other,
        })?;
        if to.network() != self.address.network() {
            return Err(WalletError::InvalidRecipient(format!(
                "{} is on another network than {}",
                to, self.address
            )));
        }
        Ok(to)
    }

    fn build_transfer(&self, to: FilecoinAddress, value: u128) -> WalletResult<Message> {
        Ok(Message::transfer(self.address.clone(), to, value))
    }

    fn sign_transfer(&self, message: Message) -> WalletResult<SignedMessage> {
        self.sign_message(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::filecoin::address::{Network, Protocol};
    use crate::crypto::DerivationPaths;
    use crate::wallet::Wallet;

    const PHRASE: &str =
        "tag volcano eight thank tide danger coast health above argue embrace heavy";

    fn wallet() -> Wallet {
        Wallet::from_phrase(PHRASE).unwrap()
    }

    fn account() -> FilecoinAccount {
        wallet().must_derive_account(DerivationPaths::FILECOIN_0)
    }

    #[test]
    fn test_address_is_f1_on_mainnet() {
        let acc = account();
        assert_eq!(acc.address().protocol(), Protocol::Secp256k1);
        assert!(acc.address().to_string().starts_with("f1"));
    }

    #[test]
    fn test_testnet_registry_gives_t1() {
        let registry = Arc::new(SignatureRegistry::with_filecoin_network(Network::Testnet));
        let acc: FilecoinAccount = wallet()
            .with_registry(registry)
            .must_derive_account(DerivationPaths::FILECOIN_0);
        assert!(acc.address().to_string().starts_with("t1"));
        assert!(acc.address().same_actor(account().address()));
    }

    #[test]
    fn test_signed_message_verifies() {
        let acc = account();
        let to = acc.parse_recipient("f01024").unwrap();
        let mut msg = acc.build_transfer(to, 10).unwrap();
        msg.nonce = 3;
        let signed = acc.sign_transfer(msg).unwrap();
        assert_eq!(signed.signature().as_bytes().len(), 65);
        signed.verify(&SignatureRegistry::new()).unwrap();
        assert_ne!(signed.cid(), signed.message().cid());
    }

    #[test]
    fn test_tampered_message_fails_verification() {
        let acc = account();
        let to = acc.parse_recipient("f01024").unwrap();
        let signed = acc.sign_transfer(acc.build_transfer(to, 10).unwrap()).unwrap();

        let mut tampered = signed.message().clone();
        tampered.value = 11;
        let forged = SignedMessage::new(tampered, signed.signature().clone()).unwrap();
        assert!(forged.verify(&SignatureRegistry::new()).is_err());
    }

    #[test]
    fn test_recipient_checks() {
        let acc = account();
        assert!(matches!(acc.parse_recipient(""), Err(WalletError::InvalidRecipient(_))));
        assert!(matches!(acc.parse_recipient("f9abc"), Err(WalletError::InvalidRecipient(_))));
        assert!(matches!(acc.parse_recipient("t01024"), Err(WalletError::InvalidRecipient(_))));
    }
}
