// wallet-core/src/chains/filecoin/address.rs
//
// Filecoin Address Module
// Protocols: 0 (ID), 1 (secp256k1), 2 (actor), 3 (BLS)
// String form: <network><protocol><payload>, payload = base32(payload || checksum)
// except ID addresses, which carry the decimal actor id.

use crate::error::{WalletError, WalletResult};
use base32::Alphabet;
use blake2::digest::consts::{U20, U32, U4};
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

type Blake2b32 = Blake2b<U4>;
type Blake2b160 = Blake2b<U20>;
type Blake2b256 = Blake2b<U32>;

const BASE32: Alphabet = Alphabet::RFC4648 { padding: false };
const CHECKSUM_LEN: usize = 4;
const PAYLOAD_HASH_LEN: usize = 20;
const BLS_PUBLIC_KEY_LEN: usize = 48;
const MAX_ID_DIGITS: usize = 20;

/// blake2b with a 256-bit digest, the hash Filecoin signs and addresses content with.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    Blake2b256::digest(data).into()
}

fn blake2b_160(data: &[u8]) -> [u8; 20] {
    Blake2b160::digest(data).into()
}

fn checksum(protocol: Protocol, payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let mut hasher = Blake2b32::new();
    hasher.update([protocol as u8]);
    hasher.update(payload);
    hasher.finalize().into()
}

// =============================================================================
// NETWORK / PROTOCOL
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    pub fn prefix(self) -> char {
        match self {
            Network::Mainnet => 'f',
            Network::Testnet => 't',
        }
    }

    fn from_prefix(c: char) -> Option<Self> {
        match c {
            'f' => Some(Network::Mainnet),
            't' => Some(Network::Testnet),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Protocol {
    Id = 0,
    Secp256k1 = 1,
    Actor = 2,
    Bls = 3,
}

impl Protocol {
    fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Protocol::Id),
            1 => Some(Protocol::Secp256k1),
            2 => Some(Protocol::Actor),
            3 => Some(Protocol::Bls),
            _ => None,
        }
    }

    fn payload_len(self) -> Option<usize> {
        match self {
            Protocol::Id => None,
            Protocol::Secp256k1 | Protocol::Actor => Some(PAYLOAD_HASH_LEN),
            Protocol::Bls => Some(BLS_PUBLIC_KEY_LEN),
        }
    }
}

// =============================================================================
// ADDRESS
// =============================================================================

/// Filecoin address. The network prefix only affects the string form; two
/// addresses with the same protocol and payload name the same actor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilecoinAddress {
    network: Network,
    protocol: Protocol,
    payload: Vec<u8>,
}

impl FilecoinAddress {
    /// f1 address of a 65-byte uncompressed secp256k1 public key.
    pub fn new_secp256k1(public_key: &[u8], network: Network) -> WalletResult<Self> {
        if public_key.len() != 65 || public_key[0] != 0x04 {
            return Err(WalletError::InvalidAddress(format!(
                "expected 65-byte uncompressed public key, got {} bytes",
                public_key.len()
            )));
        }
        Ok(Self {
            network,
            protocol: Protocol::Secp256k1,
            payload: blake2b_160(public_key).to_vec(),
        })
    }

    /// f0 address of an actor id.
    pub fn new_id(id: u64, network: Network) -> Self {
        Self {
            network,
            protocol: Protocol::Id,
            payload: encode_uvarint(id),
        }
    }

    /// Decode the binary form used inside messages: protocol byte || payload.
    pub fn from_bytes(bytes: &[u8], network: Network) -> WalletResult<Self> {
        let (&first, payload) = bytes
            .split_first()
            .ok_or_else(|| WalletError::InvalidAddress("empty address bytes".to_string()))?;
        let protocol = Protocol::from_byte(first)
            .ok_or_else(|| WalletError::InvalidAddress(format!("unknown protocol {}", first)))?;
        Self::from_parts(network, protocol, payload.to_vec())
    }

    fn from_parts(network: Network, protocol: Protocol, payload: Vec<u8>) -> WalletResult<Self> {
        match protocol.payload_len() {
            Some(len) if payload.len() != len => {
                return Err(WalletError::InvalidAddress(format!(
                    "protocol {} payload must be {} bytes, got {}",
                    protocol as u8,
                    len,
                    payload.len()
                )));
            }
            None => {
                decode_uvarint(&payload)?;
            }
            _ => {}
        }
        Ok(Self {
            network,
            protocol,
            payload,
        })
    }

    #[inline]
    pub fn network(&self) -> Network {
        self.network
    }

    #[inline]
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Actor id for f0 addresses.
    pub fn id(&self) -> Option<u64> {
        match self.protocol {
            Protocol::Id => decode_uvarint(&self.payload).ok(),
            _ => None,
        }
    }

    /// Binary form: protocol byte || payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.payload.len());
        out.push(self.protocol as u8);
        out.extend_from_slice(&self.payload);
        out
    }

    /// Same actor, regardless of network prefix.
    pub fn same_actor(&self, other: &FilecoinAddress) -> bool {
        self.protocol == other.protocol && self.payload == other.payload
    }

    /// Any well-formed address of protocol 0..=3 on either network.
    pub fn is_valid(address: &str) -> bool {
        address.parse::<FilecoinAddress>().is_ok()
    }
}

impl fmt::Display for FilecoinAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.network.prefix(), self.protocol as u8)?;
        match self.protocol {
            Protocol::Id => write!(f, "{}", decode_uvarint(&self.payload).unwrap_or_default()),
            _ => {
                let mut data = self.payload.clone();
                data.extend_from_slice(&checksum(self.protocol, &self.payload));
                f.write_str(&base32::encode(BASE32, &data).to_ascii_lowercase())
            }
        }
    }
}

impl FromStr for FilecoinAddress {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| WalletError::InvalidAddress(format!("{}: '{}'", reason, s));

        let mut chars = s.chars();
        let network = chars
            .next()
            .and_then(Network::from_prefix)
            .ok_or_else(|| invalid("unknown network prefix"))?;
        let protocol = chars
            .next()
            .and_then(|c| c.to_digit(10))
            .and_then(|d| Protocol::from_byte(d as u8))
            .ok_or_else(|| invalid("unknown protocol"))?;
        let raw = chars.as_str();

        if raw.is_empty() {
            return Err(invalid("empty payload"));
        }

        if protocol == Protocol::Id {
            if raw.len() > MAX_ID_DIGITS || !raw.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid("bad actor id"));
            }
            let id: u64 = raw.parse().map_err(|_| invalid("actor id out of range"))?;
            return Ok(Self::new_id(id, network));
        }

        if !raw.bytes().all(|b| matches!(b, b'a'..=b'z' | b'2'..=b'7')) {
            return Err(invalid("payload is not lowercase base32"));
        }
        let decoded = base32::decode(BASE32, &raw.to_ascii_uppercase())
            .ok_or_else(|| invalid("payload is not base32"))?;
        if decoded.len() <= CHECKSUM_LEN {
            return Err(invalid("payload too short"));
        }

        if base32::encode(BASE32, &decoded).to_ascii_lowercase() != raw {
            return Err(invalid("non-canonical base32"));
        }

        let (payload, sum) = decoded.split_at(decoded.len() - CHECKSUM_LEN);
        if sum != checksum(protocol, payload) {
            return Err(invalid("checksum mismatch"));
        }
        Self::from_parts(network, protocol, payload.to_vec())
    }
}

impl Serialize for FilecoinAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for FilecoinAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// UVARINT
// =============================================================================

fn encode_uvarint(mut value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(10);
    while value >= 0x80 {
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
    out
}

fn decode_uvarint(bytes: &[u8]) -> WalletResult<u64> {
    let mut value: u64 = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if i >= 10 || (i == 9 && b > 1) {
            return Err(WalletError::InvalidAddress("uvarint overflows u64".to_string()));
        }
        value |= u64::from(b & 0x7f) << (7 * i);
        if b & 0x80 == 0 {
            if i + 1 != bytes.len() {
                return Err(WalletError::InvalidAddress("trailing bytes after uvarint".to_string()));
            }
            return Ok(value);
        }
    }
    Err(WalletError::InvalidAddress("truncated uvarint".to_string()))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use k256::{elliptic_curve::sec1::ToEncodedPoint, SecretKey};

    fn secp_address(network: Network) -> FilecoinAddress {
        let key = hex::decode("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80").unwrap();
        let secret = SecretKey::from_slice(&key).unwrap();
        let public = secret.public_key().to_encoded_point(false);
        FilecoinAddress::new_secp256k1(public.as_bytes(), network).unwrap()
    }

    #[test]
    fn test_secp256k1_string_round_trip() {
        let addr = secp_address(Network::Mainnet);
        let s = addr.to_string();
        assert!(s.starts_with("f1"));
        // 20-byte payload + 4-byte checksum = 24 bytes -> 39 base32 chars
        assert_eq!(s.len(), 2 + 39);
        let parsed: FilecoinAddress = s.parse().unwrap();
        assert_eq!(parsed, addr);
    }

    #[test]
    fn test_network_prefix_only_changes_string() {
        let main = secp_address(Network::Mainnet);
        let test = secp_address(Network::Testnet);
        assert!(test.to_string().starts_with("t1"));
        assert_eq!(&main.to_string()[1..], &test.to_string()[1..]);
        assert!(main.same_actor(&test));
        assert_ne!(main, test);
    }

    #[test]
    fn test_id_address() {
        let addr: FilecoinAddress = "f01024".parse().unwrap();
        assert_eq!(addr.protocol(), Protocol::Id);
        assert_eq!(addr.id(), Some(1024));
        assert_eq!(addr.to_bytes(), vec![0x00, 0x80, 0x08]);
        assert_eq!(addr.to_string(), "f01024");

        let zero = FilecoinAddress::new_id(0, Network::Testnet);
        assert_eq!(zero.to_string(), "t00");
    }

    #[test]
    fn test_bytes_round_trip() {
        let addr = secp_address(Network::Mainnet);
        let bytes = addr.to_bytes();
        assert_eq!(bytes.len(), 21);
        assert_eq!(bytes[0], 1);
        assert_eq!(FilecoinAddress::from_bytes(&bytes, Network::Mainnet).unwrap(), addr);
    }

    #[test]
    fn test_rejects_corrupted_strings() {
        let good = secp_address(Network::Mainnet).to_string();

        // change one payload character
        let mut chars: Vec<char> = good.chars().collect();
        chars[10] = if chars[10] == 'a' { 'q' } else { 'a' };
        let bad: String = chars.into_iter().collect();
        assert!(!FilecoinAddress::is_valid(&bad));

        // last character only differs in its unused low bits
        let mut padded = good.clone();
        let last = padded.pop().unwrap();
        padded.push(if last == 'a' { 'b' } else { 'a' });
        assert!(!FilecoinAddress::is_valid(&padded));

        assert!(!FilecoinAddress::is_valid(&good.to_uppercase()));
        assert!(!FilecoinAddress::is_valid(&good.replacen('f', "x", 1)));
        assert!(!FilecoinAddress::is_valid(&good.replacen("f1", "f9", 1)));
        assert!(!FilecoinAddress::is_valid("f1"));
        assert!(!FilecoinAddress::is_valid(""));
        assert!(!FilecoinAddress::is_valid("f0abc"));
        assert!(!FilecoinAddress::is_valid("f099999999999999999999"));
    }

    #[test]
    fn test_protocol_mismatch_detected_by_checksum() {
        // same payload re-labelled as an actor address fails the checksum
        let good = secp_address(Network::Mainnet).to_string();
        let relabelled = good.replacen("f1", "f2", 1);
        assert!(!FilecoinAddress::is_valid(&relabelled));
    }

    #[test]
    fn test_uvarint() {
        for v in [0u64, 1, 127, 128, 300, u32::MAX as u64, u64::MAX] {
            assert_eq!(decode_uvarint(&encode_uvarint(v)).unwrap(), v);
        }
        assert!(decode_uvarint(&[0x80]).is_err());
        assert!(decode_uvarint(&[0x01, 0x00]).is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let addr = secp_address(Network::Testnet);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr));
        let back: FilecoinAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
