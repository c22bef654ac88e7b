// wallet-core/src/chains/filecoin/message.rs
//
// Filecoin Message Model
//
// Message (CBOR tuple, 10 fields)
//   [Version, To, From, Nonce, Value, GasLimit, GasFeeCap, GasPremium, Method, Params]
// Cid = CIDv1(dag-cbor, blake2b-256(cbor))        -> what the sender signs
// SignedMessage (CBOR tuple) = [Message, Signature(type ‖ data)]
//
// The node speaks Lotus JSON (PascalCase fields, bigints as decimal strings,
// bytes as base64), see `LotusMessage`.

use super::address::{blake2b_256, FilecoinAddress};
use super::cbor::CborWriter;
use crate::error::{WalletError, WalletResult};
use crate::network::{FeeQuote, TransferMessage};
use crate::sigs::{Signature, SignatureRegistry, SignatureScheme};
use base32::Alphabet;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Method number of a plain value transfer.
pub const METHOD_SEND: u64 = 0;

/// Lotus signature type of secp256k1 signatures.
pub const SIG_TYPE_SECP256K1: u8 = 1;

// =============================================================================
// CID
// =============================================================================

/// CIDv1 ‖ dag-cbor ‖ blake2b-256 multihash code (varint 0xb220) ‖ digest length.
const CID_PREFIX: [u8; 6] = [0x01, 0x71, 0xa0, 0xe4, 0x02, 0x20];
const CID_BASE32: Alphabet = Alphabet::RFC4648 { padding: false };

/// Content identifier of a CBOR object.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Cid(Vec<u8>);

impl Cid {
    /// dag-cbor / blake2b-256 CID of `cbor`.
    pub fn of_cbor(cbor: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(CID_PREFIX.len() + 32);
        bytes.extend_from_slice(&CID_PREFIX);
        bytes.extend_from_slice(&blake2b_256(cbor));
        Self(bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Cid {
    /// Multibase base32 lower ("b" prefix), e.g. `bafy2bz...`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", base32::encode(CID_BASE32, &self.0).to_ascii_lowercase())
    }
}

impl fmt::Debug for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cid({})", self)
    }
}

impl FromStr for Cid {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .strip_prefix('b')
            .ok_or_else(|| WalletError::Validation(format!("unsupported multibase in CID '{}'", s)))?;
        let bytes = base32::decode(CID_BASE32, &body.to_ascii_uppercase())
            .ok_or_else(|| WalletError::Validation(format!("CID '{}' is not base32", s)))?;
        if bytes.len() < 2 || bytes[0] != 0x01 {
            return Err(WalletError::Validation(format!("CID '{}' is not CIDv1", s)));
        }
        Ok(Self(bytes))
    }
}

/// Lotus encodes CIDs as `{"/": "<cid>"}`.
#[derive(Serialize, Deserialize)]
struct CidJson {
    #[serde(rename = "/")]
    cid: String,
}

impl Serialize for Cid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        CidJson { cid: self.to_string() }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Cid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = CidJson::deserialize(deserializer)?;
        json.cid.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// MESSAGE
// =============================================================================

/// Unsigned Filecoin message. Gas fields stay zero until the node fills them
/// in via `GasEstimateMessageGas`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub version: u64,
    pub to: FilecoinAddress,
    pub from: FilecoinAddress,
    pub nonce: u64,
    /// attoFIL
    pub value: u128,
    pub gas_limit: i64,
    pub gas_fee_cap: u128,
    pub gas_premium: u128,
    pub method: u64,
    pub params: Vec<u8>,
}

impl Message {
    /// Plain value transfer (`METHOD_SEND`, no params).
    pub fn transfer(from: FilecoinAddress, to: FilecoinAddress, value: u128) -> Self {
        Self {
            version: 0,
            to,
            from,
            nonce: 0,
            value,
            gas_limit: 0,
            gas_fee_cap: 0,
            gas_premium: 0,
            method: METHOD_SEND,
            params: Vec::new(),
        }
    }

    /// Canonical CBOR tuple encoding.
    pub fn to_cbor(&self) -> Vec<u8> {
        CborWriter::new()
            .array(10)
            .u64(self.version)
            .bytes(&self.to.to_bytes())
            .bytes(&self.from.to_bytes())
            .u64(self.nonce)
            .big_uint(self.value)
            .i64(self.gas_limit)
            .big_uint(self.gas_fee_cap)
            .big_uint(self.gas_premium)
            .u64(self.method)
            .bytes(&self.params)
            .finish()
    }

    pub fn cid(&self) -> Cid {
        Cid::of_cbor(&self.to_cbor())
    }

    /// Bytes handed to the signature provider: the message CID.
    pub fn signing_bytes(&self) -> Vec<u8> {
        self.cid().0
    }

    /// Upper bound on the fee this message can burn: GasFeeCap × GasLimit.
    pub fn max_fee(&self) -> u128 {
        self.gas_fee_cap
            .saturating_mul(u128::try_from(self.gas_limit.max(0)).unwrap_or(0))
    }
}

impl TransferMessage for Message {
    type Sequence = u64;

    fn value(&self) -> u128 {
        self.value
    }

    fn fee_quote(&self) -> FeeQuote {
        FeeQuote {
            max_fee_per_unit: self.gas_fee_cap,
            priority_fee_per_unit: self.gas_premium,
        }
    }

    fn assign_sequence(&mut self, sequence: u64) {
        self.nonce = sequence;
    }
}

// =============================================================================
// SIGNED MESSAGE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedMessage {
    message: Message,
    signature: Signature,
}

impl SignedMessage {
    pub fn new(message: Message, signature: Signature) -> WalletResult<Self> {
        if signature.scheme() != SignatureScheme::Secp256k1Filecoin {
            return Err(WalletError::Validation(format!(
                "Filecoin messages carry secp256k1 signatures, got {}",
                signature.scheme()
            )));
        }
        Ok(Self { message, signature })
    }

    #[inline]
    pub fn message(&self) -> &Message {
        &self.message
    }

    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// `[Message, Signature]`, the signature encoded as type byte ‖ data.
    pub fn to_cbor(&self) -> Vec<u8> {
        let mut sig = Vec::with_capacity(1 + self.signature.as_bytes().len());
        sig.push(SIG_TYPE_SECP256K1);
        sig.extend_from_slice(self.signature.as_bytes());

        CborWriter::new()
            .array(2)
            .raw(&self.message.to_cbor())
            .bytes(&sig)
            .finish()
    }

    /// CID the mempool reports for a secp256k1-signed message.
    pub fn cid(&self) -> Cid {
        Cid::of_cbor(&self.to_cbor())
    }

    /// Check the signature against the message's `from` address.
    pub fn verify(&self, registry: &SignatureRegistry) -> WalletResult<()> {
        registry.verify(
            &self.signature,
            &self.message.from.to_string(),
            &self.message.signing_bytes(),
        )
    }
}

// =============================================================================
// LOTUS JSON
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LotusMessage {
    pub version: u64,
    pub to: FilecoinAddress,
    pub from: FilecoinAddress,
    pub nonce: u64,
    #[serde(with = "u128_string")]
    pub value: u128,
    pub gas_limit: i64,
    #[serde(with = "u128_string")]
    pub gas_fee_cap: u128,
    #[serde(with = "u128_string")]
    pub gas_premium: u128,
    pub method: u64,
    #[serde(with = "base64_opt")]
    pub params: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LotusSignature {
    #[serde(rename = "Type")]
    pub sig_type: u8,
    #[serde(with = "base64_opt")]
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LotusSignedMessage {
    pub message: LotusMessage,
    pub signature: LotusSignature,
}

impl From<&Message> for LotusMessage {
    fn from(m: &Message) -> Self {
        Self {
            version: m.version,
            to: m.to.clone(),
            from: m.from.clone(),
            nonce: m.nonce,
            value: m.value,
            gas_limit: m.gas_limit,
            gas_fee_cap: m.gas_fee_cap,
            gas_premium: m.gas_premium,
            method: m.method,
            params: m.params.clone(),
        }
    }
}

impl From<LotusMessage> for Message {
    fn from(m: LotusMessage) -> Self {
        Self {
            version: m.version,
            to: m.to,
            from: m.from,
            nonce: m.nonce,
            value: m.value,
            gas_limit: m.gas_limit,
            gas_fee_cap: m.gas_fee_cap,
            gas_premium: m.gas_premium,
            method: m.method,
            params: m.params,
        }
    }
}

impl From<&SignedMessage> for LotusSignedMessage {
    fn from(sm: &SignedMessage) -> Self {
        Self {
            message: LotusMessage::from(&sm.message),
            signature: LotusSignature {
                sig_type: SIG_TYPE_SECP256K1,
                data: sm.signature.as_bytes().to_vec(),
            },
        }
    }
}

mod u128_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Bytes as base64, with `null` standing for empty.
pub(super) mod base64_opt {
    use super::{Engine, BASE64};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_empty() {
            serializer.serialize_none()
        } else {
            serializer.serialize_str(&BASE64.encode(value))
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(Vec::new()),
            Some(s) => BASE64.decode(s).map_err(serde::de::Error::custom),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::filecoin::address::Network;

    fn sample() -> Message {
        let to = FilecoinAddress::new_id(1024, Network::Mainnet);
        let from = FilecoinAddress::new_id(1001, Network::Mainnet);
        let mut msg = Message::transfer(from, to, 1_000_000_000_000_000_000);
        msg.nonce = 7;
        msg.gas_limit = 1_000_000;
        msg.gas_fee_cap = 100_000;
        msg.gas_premium = 50_000;
        msg
    }

    #[test]
    fn test_cbor_layout() {
        let expected = concat!(
            "8a",                   // array(10)
            "00",                   // version
            "43008008",             // to f01024
            "4300e907",             // from f01001
            "07",                   // nonce
            "49000de0b6b3a7640000", // value 1 FIL
            "1a000f4240",           // gas limit 1_000_000
            "44000186a0",           // gas fee cap 100_000
            "4300c350",             // gas premium 50_000
            "00",                   // method send
            "40",                   // params
        );
        assert_eq!(hex::encode(sample().to_cbor()), expected);
    }

    #[test]
    fn test_cid_shape() {
        let cid = sample().cid();
        assert_eq!(&cid.as_bytes()[..6], &CID_PREFIX);
        assert_eq!(cid.as_bytes().len(), 38);
        let s = cid.to_string();
        assert!(s.starts_with("bafy2bzace"));
        assert_eq!(s.parse::<Cid>().unwrap(), cid);
    }

    #[test]
    fn test_cid_changes_with_nonce() {
        let a = sample();
        let mut b = sample();
        b.nonce += 1;
        assert_ne!(a.cid(), b.cid());
    }

    #[test]
    fn test_max_fee() {
        let mut msg = sample();
        assert_eq!(msg.max_fee(), 100_000_000_000);
        msg.gas_limit = -1;
        assert_eq!(msg.max_fee(), 0);
    }

    #[test]
    fn test_lotus_json_shape() {
        let json = serde_json::to_value(LotusMessage::from(&sample())).unwrap();
        assert_eq!(json["To"], "f01024");
        assert_eq!(json["From"], "f01001");
        assert_eq!(json["Value"], "1000000000000000000");
        assert_eq!(json["GasLimit"], 1_000_000);
        assert_eq!(json["GasFeeCap"], "100000");
        assert_eq!(json["Method"], 0);
        assert!(json["Params"].is_null());

        let back: LotusMessage = serde_json::from_value(json).unwrap();
        assert_eq!(Message::from(back), sample());
    }

    #[test]
    fn test_lotus_json_ignores_cid_field() {
        let json = serde_json::json!({
            "Version": 0, "To": "f01024", "From": "f01001", "Nonce": 0,
            "Value": "1", "GasLimit": 100, "GasFeeCap": "3", "GasPremium": "2",
            "Method": 0, "Params": "AQI=",
            "CID": {"/": "bafy2bzacea"}
        });
        let msg: Message = serde_json::from_value::<LotusMessage>(json).unwrap().into();
        assert_eq!(msg.params, vec![1, 2]);
        assert_eq!(msg.gas_premium, 2);
    }

    #[test]
    fn test_cid_json() {
        let cid = sample().cid();
        let json = serde_json::to_value(&cid).unwrap();
        assert_eq!(json["/"], cid.to_string());
        let back: Cid = serde_json::from_value(json).unwrap();
        assert_eq!(back, cid);
    }

    #[test]
    fn test_signed_message_rejects_foreign_scheme() {
        let sig = Signature::new(SignatureScheme::Ed25519, vec![0u8; 64]);
        assert!(SignedMessage::new(sample(), sig).is_err());
    }
}
