// wallet-core/src/chains/filecoin/rpc.rs
//
// Lotus JSON-RPC client, namespace `Filecoin.`. Addresses travel as strings,
// token amounts as decimal strings, CIDs as {"/": "..."}.

use super::address::FilecoinAddress;
use super::message::{Cid, LotusMessage, LotusSignedMessage, Message, SignedMessage};
use crate::config::FilecoinChainConfig;
use crate::error::{RpcError, WalletError, WalletResult};
use crate::network::{ChainFamily, ChainRpc, JsonRpcClient, TransactionId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

const NAMESPACE: &str = "Filecoin";

fn parse_atto(method: &str, value: &str) -> WalletResult<u128> {
    value.parse().map_err(|e| {
        WalletError::Rpc(RpcError::Decode {
            method: method.to_string(),
            reason: format!("'{}' is not an attoFIL amount: {}", value, e),
        })
    })
}

/// Head of the chain, reduced to what callers look at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TipSet {
    pub height: i64,
    #[serde(default)]
    pub cids: Vec<Cid>,
}

/// On-chain actor state.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Actor {
    pub code: Cid,
    pub head: Cid,
    pub nonce: u64,
    #[serde(deserialize_with = "atto_string")]
    pub balance: u128,
}

fn atto_string<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NodeVersion {
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "APIVersion")]
    pub api_version: u32,
    #[serde(rename = "BlockDelay")]
    pub block_delay: u64,
}

/// Result of an executed message. Exit code 0 is success.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageReceipt {
    pub exit_code: i64,
    #[serde(rename = "Return", with = "super::message::base64_opt", default)]
    pub return_data: Vec<u8>,
    pub gas_used: i64,
}

impl MessageReceipt {
    #[inline]
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Where a message landed: its receipt plus the tipset that executed it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MsgLookup {
    pub message: Cid,
    pub receipt: MessageReceipt,
    #[serde(default)]
    pub tip_set: Vec<Cid>,
    pub height: i64,
}

#[derive(Debug)]
pub struct FilecoinRpcClient {
    rpc: JsonRpcClient,
}

impl FilecoinRpcClient {
    pub fn new(config: &FilecoinChainConfig) -> WalletResult<Self> {
        Ok(Self {
            rpc: JsonRpcClient::new(&config.rpc)?,
        })
    }

    fn method(name: &str) -> String {
        format!("{}.{}", NAMESPACE, name)
    }

    /// Fill GasLimit, GasFeeCap and GasPremium for unset fields.
    pub async fn gas_estimate_message_gas(&self, message: &Message) -> WalletResult<Message> {
        let params = json!([LotusMessage::from(message), null, null]);
        let filled: LotusMessage = self
            .rpc
            .call(&Self::method("GasEstimateMessageGas"), params)
            .await?;
        Ok(filled.into())
    }

    pub async fn wallet_balance(&self, address: &str) -> WalletResult<u128> {
        let method = Self::method("WalletBalance");
        let balance: String = self.rpc.call(&method, json!([address])).await?;
        parse_atto(&method, &balance)
    }

    /// Next nonce for `address`, counting messages already in the mempool.
    pub async fn mpool_get_nonce(&self, address: &str) -> WalletResult<u64> {
        self.rpc.call(&Self::method("MpoolGetNonce"), json!([address])).await
    }

    pub async fn mpool_push(&self, signed: &SignedMessage) -> WalletResult<Cid> {
        let params = json!([LotusSignedMessage::from(signed)]);
        self.rpc.call(&Self::method("MpoolPush"), params).await
    }

    pub async fn chain_head(&self) -> WalletResult<TipSet> {
        self.rpc.call(&Self::method("ChainHead"), json!([])).await
    }

    /// Actor state at the current head; `None` if the actor does not exist.
    pub async fn state_get_actor(&self, address: &FilecoinAddress) -> WalletResult<Option<Actor>> {
        self.rpc
            .call(&Self::method("StateGetActor"), json!([address, null]))
            .await
    }

    pub async fn chain_get_message(&self, cid: &Cid) -> WalletResult<Message> {
        let message: LotusMessage = self
            .rpc
            .call(&Self::method("ChainGetMessage"), json!([cid]))
            .await?;
        Ok(message.into())
    }

    /// Lookup of a submitted message; `None` while it has not been executed.
    pub async fn state_search_msg(&self, cid: &Cid) -> WalletResult<Option<MsgLookup>> {
        let lookup: Option<MsgLookup> = self
            .rpc
            .call(&Self::method("StateSearchMsg"), json!([cid]))
            .await?;
        if let Some(found) = &lookup {
            debug!(chain = "filecoin", %cid, height = found.height, exit_code = found.receipt.exit_code, "message found");
        }
        Ok(lookup)
    }

    /// Receipt of `cid` as of the current head.
    pub async fn state_get_receipt(&self, cid: &Cid) -> WalletResult<Option<MessageReceipt>> {
        self.rpc
            .call(&Self::method("StateGetReceipt"), json!([cid, null]))
            .await
    }

    pub async fn version(&self) -> WalletResult<NodeVersion> {
        self.rpc.call(&Self::method("Version"), json!([])).await
    }
}

#[async_trait]
impl ChainRpc<Message, SignedMessage> for FilecoinRpcClient {
    async fn estimate_fee(&self, draft: &Message) -> WalletResult<Message> {
        let filled = self.gas_estimate_message_gas(draft).await?;
        debug!(
            chain = "filecoin",
            gas_limit = filled.gas_limit,
            gas_fee_cap = filled.gas_fee_cap,
            gas_premium = filled.gas_premium,
            max_fee = %filled.max_fee(),
            "fee estimated"
        );
        Ok(filled)
    }

    async fn get_balance(&self, address: &str) -> WalletResult<u128> {
        self.wallet_balance(address).await
    }

    async fn next_sequence(&self, address: &str) -> WalletResult<u64> {
        self.mpool_get_nonce(address).await
    }

    async fn submit(&self, signed: &SignedMessage) -> WalletResult<TransactionId> {
        let cid = self.mpool_push(signed).await?;
        Ok(TransactionId::new(ChainFamily::Filecoin, cid.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::parse_response;

    #[test]
    fn test_method_namespace() {
        assert_eq!(FilecoinRpcClient::method("MpoolPush"), "Filecoin.MpoolPush");
    }

    #[test]
    fn test_balance_is_decimal_string() {
        assert_eq!(parse_atto("Filecoin.WalletBalance", "1000000000000000000").unwrap(), 10u128.pow(18));
        assert!(parse_atto("Filecoin.WalletBalance", "0x10").is_err());
    }

    #[test]
    fn test_tipset_response() {
        let body = json!({
            "id": 1, "jsonrpc": "2.0",
            "result": {
                "Cids": [{"/": "bafy2bzacedbz5rxxkhrxmkqgncuqbt6ff2dkzokrucchjbevrjglnzkzqncsq"}],
                "Blocks": [],
                "Height": 3456789
            }
        });
        let head: TipSet = parse_response("Filecoin.ChainHead", body).unwrap();
        assert_eq!(head.height, 3_456_789);
        assert_eq!(head.cids.len(), 1);
    }

    #[test]
    fn test_actor_response() {
        let body = json!({
            "id": 1, "jsonrpc": "2.0",
            "result": {
                "Code": {"/": "bafk2bzacecz7y4u2lsxsmvnujkb3jcxbnlu4y3szhp3ynhejnmdo3kgnpkpqy"},
                "Head": {"/": "bafy2bzaceb5wygzlfxvnxo3qtmd2fcpkeriqbhyaazk3rsrdhnzf7ke7tdz6c"},
                "Nonce": 12,
                "Balance": "2500000000000000000"
            }
        });
        let actor: Option<Actor> = parse_response("Filecoin.StateGetActor", body).unwrap();
        let actor = actor.unwrap();
        assert_eq!(actor.nonce, 12);
        assert_eq!(actor.balance, 2_500_000_000_000_000_000);
    }

    #[test]
    fn test_search_msg_response() {
        let body = json!({
            "id": 1, "jsonrpc": "2.0",
            "result": {
                "Message": {"/": "bafy2bzacedbz5rxxkhrxmkqgncuqbt6ff2dkzokrucchjbevrjglnzkzqncsq"},
                "Receipt": {"ExitCode": 0, "Return": null, "GasUsed": 488_261},
                "TipSet": [{"/": "bafy2bzacedbz5rxxkhrxmkqgncuqbt6ff2dkzokrucchjbevrjglnzkzqncsq"}],
                "Height": 3456790
            }
        });
        let lookup: Option<MsgLookup> = parse_response("Filecoin.StateSearchMsg", body).unwrap();
        let lookup = lookup.unwrap();
        assert_eq!(lookup.height, 3_456_790);
        assert!(lookup.receipt.is_success());
        assert!(lookup.receipt.return_data.is_empty());
        assert_eq!(lookup.tip_set.len(), 1);
    }

    #[test]
    fn test_search_msg_pending_is_none() {
        let body = json!({"id": 1, "jsonrpc": "2.0", "result": null});
        let lookup: Option<MsgLookup> = parse_response("Filecoin.StateSearchMsg", body).unwrap();
        assert!(lookup.is_none());
    }

    #[test]
    fn test_failed_receipt() {
        let body = json!({
            "id": 1, "jsonrpc": "2.0",
            "result": {"ExitCode": 6, "Return": "gg==", "GasUsed": 1200}
        });
        let receipt: Option<MessageReceipt> = parse_response("Filecoin.StateGetReceipt", body).unwrap();
        let receipt = receipt.unwrap();
        assert!(!receipt.is_success());
        assert_eq!(receipt.return_data, vec![0x82]);
    }

    #[test]
    fn test_push_returns_cid() {
        let body = json!({
            "id": 1, "jsonrpc": "2.0",
            "result": {"/": "bafy2bzacedbz5rxxkhrxmkqgncuqbt6ff2dkzokrucchjbevrjglnzkzqncsq"}
        });
        let cid: Cid = parse_response("Filecoin.MpoolPush", body).unwrap();
        assert!(cid.to_string().starts_with("bafy2bzace"));
    }
}
