// wallet-core/src/chains/evm/rpc.rs
//
// EVM node client over the standard `eth_` JSON-RPC namespace.
//
// Fee model (EIP-1559):
//   priority = eth_maxPriorityFeePerGas
//   max fee  = 2 × latest baseFeePerGas + priority
// which keeps a transaction valid through several consecutive full blocks.

use super::transaction::{raw_transaction, EvmTransfer};
use crate::config::EvmChainConfig;
use crate::error::{RpcError, WalletError, WalletResult};
use crate::network::{ChainFamily, ChainRpc, JsonRpcClient, TransactionId};
use alloy::consensus::TxEnvelope;
use alloy::primitives::TxKind;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

/// Parse an `0x`-prefixed hex quantity.
pub fn parse_quantity(method: &str, value: &str) -> WalletResult<u128> {
    let digits = value.strip_prefix("0x").ok_or_else(|| decode(method, format!("'{}' is not a hex quantity", value)))?;
    if digits.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(digits, 16).map_err(|e| decode(method, format!("'{}': {}", value, e)))
}

fn quantity(value: u128) -> String {
    format!("0x{:x}", value)
}

fn decode(method: &str, reason: String) -> WalletError {
    WalletError::Rpc(RpcError::Decode {
        method: method.to_string(),
        reason,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockHeader {
    #[serde(default)]
    base_fee_per_gas: Option<String>,
}

#[derive(Debug)]
pub struct EvmRpcClient {
    rpc: JsonRpcClient,
    chain_id: u64,
}

impl EvmRpcClient {
    pub fn new(config: &EvmChainConfig) -> WalletResult<Self> {
        Ok(Self {
            rpc: JsonRpcClient::new(&config.rpc)?,
            chain_id: config.chain_id,
        })
    }

    #[inline]
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn quantity_call(&self, method: &str, params: Value) -> WalletResult<u128> {
        let hex: String = self.rpc.call(method, params).await?;
        parse_quantity(method, &hex)
    }

    /// Chain id reported by the node.
    pub async fn remote_chain_id(&self) -> WalletResult<u64> {
        let id = self.quantity_call("eth_chainId", json!([])).await?;
        u64::try_from(id).map_err(|e| decode("eth_chainId", e.to_string()))
    }

    pub async fn block_number(&self) -> WalletResult<u64> {
        let n = self.quantity_call("eth_blockNumber", json!([])).await?;
        u64::try_from(n).map_err(|e| decode("eth_blockNumber", e.to_string()))
    }

    pub async fn estimate_gas(&self, draft: &EvmTransfer) -> WalletResult<u64> {
        let mut call = json!({
            "from": draft.from.to_checksum(None),
            "value": quantity(draft.tx.value.saturating_to::<u128>()),
        });
        if let TxKind::Call(to) = draft.tx.to {
            call["to"] = json!(to.to_checksum(None));
        }
        if !draft.tx.input.is_empty() {
            call["data"] = json!(format!("0x{}", hex::encode(&draft.tx.input)));
        }
        let gas = self.quantity_call("eth_estimateGas", json!([call])).await?;
        u64::try_from(gas).map_err(|e| decode("eth_estimateGas", e.to_string()))
    }

    pub async fn max_priority_fee_per_gas(&self) -> WalletResult<u128> {
        self.quantity_call("eth_maxPriorityFeePerGas", json!([])).await
    }

    /// Base fee of the latest block; pre-London chains report none.
    pub async fn base_fee_per_gas(&self) -> WalletResult<u128> {
        let method = "eth_getBlockByNumber";
        let header: Option<BlockHeader> = self.rpc.call(method, json!(["latest", false])).await?;
        let base_fee = header
            .and_then(|h| h.base_fee_per_gas)
            .ok_or_else(|| decode(method, "latest block has no baseFeePerGas".into()))?;
        parse_quantity(method, &base_fee)
    }

    pub async fn send_raw_transaction(&self, raw: &[u8]) -> WalletResult<String> {
        self.rpc
            .call("eth_sendRawTransaction", json!([format!("0x{}", hex::encode(raw))]))
            .await
    }
}

#[async_trait]
impl ChainRpc<EvmTransfer, TxEnvelope> for EvmRpcClient {
    async fn estimate_fee(&self, draft: &EvmTransfer) -> WalletResult<EvmTransfer> {
        // the signature commits to the chain id; a draft for another chain
        // would be replayable there and rejected here
        if draft.tx.chain_id != self.chain_id {
            return Err(WalletError::Config(format!(
                "draft is for chain {}, client is connected to chain {}",
                draft.tx.chain_id, self.chain_id
            )));
        }
        let gas_limit = self.estimate_gas(draft).await?;
        let priority = self.max_priority_fee_per_gas().await?;
        let base_fee = self.base_fee_per_gas().await?;

        let mut filled = draft.clone();
        filled.tx.gas_limit = gas_limit;
        filled.tx.max_priority_fee_per_gas = priority;
        filled.tx.max_fee_per_gas = base_fee.saturating_mul(2).saturating_add(priority);
        debug!(
            chain = "evm",
            gas_limit,
            base_fee = %base_fee,
            priority = %priority,
            max_fee = %filled.max_fee(),
            "fee estimated"
        );
        Ok(filled)
    }

    async fn get_balance(&self, address: &str) -> WalletResult<u128> {
        self.quantity_call("eth_getBalance", json!([address, "latest"])).await
    }

    async fn next_sequence(&self, address: &str) -> WalletResult<u64> {
        let method = "eth_getTransactionCount";
        let nonce = self.quantity_call(method, json!([address, "pending"])).await?;
        u64::try_from(nonce).map_err(|e| decode(method, e.to_string()))
    }

    async fn submit(&self, signed: &TxEnvelope) -> WalletResult<TransactionId> {
        let hash = self.send_raw_transaction(&raw_transaction(signed)).await?;
        Ok(TransactionId::new(ChainFamily::Evm, hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("m", "0x0").unwrap(), 0);
        assert_eq!(parse_quantity("m", "0x").unwrap(), 0);
        assert_eq!(parse_quantity("m", "0x5208").unwrap(), 21_000);
        assert_eq!(parse_quantity("m", "0xde0b6b3a7640000").unwrap(), 1_000_000_000_000_000_000);
        assert!(matches!(
            parse_quantity("m", "5208"),
            Err(WalletError::Rpc(RpcError::Decode { .. }))
        ));
        assert!(parse_quantity("m", "0xzz").is_err());
    }

    #[test]
    fn test_quantity_encoding() {
        assert_eq!(quantity(0), "0x0");
        assert_eq!(quantity(21_000), "0x5208");
    }

    #[test]
    fn test_block_header_shape() {
        let header: BlockHeader =
            serde_json::from_value(json!({"number": "0x10", "baseFeePerGas": "0x3b9aca00"})).unwrap();
        assert_eq!(header.base_fee_per_gas.as_deref(), Some("0x3b9aca00"));
        let legacy: BlockHeader = serde_json::from_value(json!({"number": "0x10"})).unwrap();
        assert!(legacy.base_fee_per_gas.is_none());
    }

    // ---- against a local node ----

    use crate::chains::evm::account::EvmAccount;
    use crate::chains::evm::transaction::recover_sender;
    use crate::config::NetworkConfig;
    use crate::crypto::DerivationPaths;
    use crate::transfer::{TransferOrchestrator, TransferStep};
    use crate::wallet::Wallet;
    use alloy::eips::eip2718::Decodable2718;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    const PHRASE: &str =
        "tag volcano eight thank tide danger coast health above argue embrace heavy";
    const RECIPIENT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

    type CallLog = Arc<Mutex<Vec<(String, Value)>>>;

    fn node_result(method: &str) -> Value {
        match method {
            "eth_estimateGas" => json!("0x5208"),
            "eth_maxPriorityFeePerGas" => json!("0x3b9aca00"),
            "eth_getBlockByNumber" => json!({"number": "0x10", "baseFeePerGas": "0x77359400"}),
            "eth_getBalance" => json!("0xde0b6b3a7640000"),
            "eth_getTransactionCount" => json!("0x7"),
            "eth_sendRawTransaction" => {
                json!("0x2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a")
            }
            _ => Value::Null,
        }
    }

    async fn read_body(socket: &mut TcpStream) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return Vec::new();
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
                let len = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                let start = end + 4;
                while buf.len() < start + len {
                    let n = socket.read(&mut chunk).await.unwrap();
                    buf.extend_from_slice(&chunk[..n]);
                }
                return buf[start..start + len].to_vec();
            }
        }
    }

    /// Minimal JSON-RPC node on a random local port. Returns its URL and the
    /// calls it received.
    async fn spawn_node() -> (String, CallLog) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        let calls: CallLog = Arc::default();
        let log = calls.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let log = log.clone();
                tokio::spawn(async move {
                    let body = read_body(&mut socket).await;
                    let request: Value = serde_json::from_slice(&body).unwrap();
                    let method = request["method"].as_str().unwrap_or_default().to_string();
                    let result = node_result(&method);
                    log.lock().unwrap().push((method, request["params"].clone()));
                    let reply = json!({"jsonrpc": "2.0", "id": request["id"], "result": result}).to_string();
                    let response = format!(
                        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        reply.len(),
                        reply
                    );
                    socket.write_all(response.as_bytes()).await.unwrap();
                });
            }
        });
        (endpoint, calls)
    }

    fn sepolia_at(endpoint: String) -> EvmChainConfig {
        EvmChainConfig {
            rpc: NetworkConfig::new(endpoint),
            ..EvmChainConfig::sepolia()
        }
    }

    fn methods(calls: &CallLog) -> Vec<String> {
        calls.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
    }

    #[tokio::test]
    async fn test_transfer_signs_for_the_client_chain() {
        let (endpoint, calls) = spawn_node().await;
        let config = sepolia_at(endpoint);
        let account = Wallet::from_phrase(PHRASE)
            .unwrap()
            .must_derive_account::<EvmAccount>(DerivationPaths::EVM_0)
            .with_chain_id(config.chain_id);
        let orchestrator = TransferOrchestrator::new(EvmRpcClient::new(&config).unwrap());

        let id = orchestrator.transfer(&account, RECIPIENT, 1_000).await.unwrap();
        assert_eq!(id.chain, ChainFamily::Evm);
        assert!(id.as_str().starts_with("0x2a2a"));

        assert_eq!(
            methods(&calls),
            vec![
                "eth_estimateGas",
                "eth_maxPriorityFeePerGas",
                "eth_getBlockByNumber",
                "eth_getBalance",
                "eth_getTransactionCount",
                "eth_sendRawTransaction",
            ]
        );

        let calls = calls.lock().unwrap();
        let sender = account.address().to_checksum(None);
        assert_eq!(calls[0].1[0]["from"], json!(sender));
        assert_eq!(calls[3].1[0], json!(sender));

        let raw = hex::decode(calls[5].1[0].as_str().unwrap().trim_start_matches("0x")).unwrap();
        let envelope = TxEnvelope::decode_2718(&mut raw.as_slice()).unwrap();
        assert_eq!(recover_sender(&envelope).unwrap(), account.address());
        match &envelope {
            TxEnvelope::Eip1559(signed) => {
                let tx = signed.tx();
                assert_eq!(tx.chain_id, 11155111);
                assert_eq!(tx.nonce, 7);
                assert_eq!(tx.gas_limit, 21_000);
                assert_eq!(tx.max_priority_fee_per_gas, 1_000_000_000);
                // 2 × 2 gwei base fee + 1 gwei tip
                assert_eq!(tx.max_fee_per_gas, 5_000_000_000);
            }
            other => panic!("expected an EIP-1559 envelope, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_draft_for_another_chain_is_rejected_before_any_call() {
        let (endpoint, calls) = spawn_node().await;
        let config = sepolia_at(endpoint);
        // still bound to mainnet
        let account: EvmAccount = Wallet::from_phrase(PHRASE)
            .unwrap()
            .must_derive_account(DerivationPaths::EVM_0);
        let orchestrator = TransferOrchestrator::new(EvmRpcClient::new(&config).unwrap());

        let err = orchestrator.transfer(&account, RECIPIENT, 1_000).await.unwrap_err();
        assert_eq!(err.step, TransferStep::EstimateFee);
        assert!(matches!(err.source, WalletError::Config(_)));
        assert!(!err.is_retryable());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_client_from_preset() {
        let client = EvmRpcClient::new(&EvmChainConfig::sepolia()).unwrap();
        assert_eq!(client.chain_id(), 11155111);
    }
}
