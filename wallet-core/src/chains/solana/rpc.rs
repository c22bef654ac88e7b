// wallet-core/src/chains/solana/rpc.rs
//
// Solana JSON-RPC client.
//
// Solana has no account nonce: a transaction is ordered and expires by its
// recent blockhash, so the "sequence" handed to the orchestrator is the
// latest finalized blockhash. Fees are flat per message (no priority part).

use super::transaction::{Blockhash, SignedTransfer, SolanaTransfer};
use crate::config::SolanaChainConfig;
use crate::error::{RpcError, WalletError, WalletResult};
use crate::network::{ChainFamily, ChainRpc, JsonRpcClient, TransactionId};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

const COMMITMENT: &str = "finalized";

/// `{"context": {...}, "value": T}` wrapper of most Solana results.
#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestBlockhash {
    pub blockhash: String,
    pub last_valid_block_height: u64,
}

#[derive(Debug)]
pub struct SolanaRpcClient {
    rpc: JsonRpcClient,
}

impl SolanaRpcClient {
    pub fn new(config: &SolanaChainConfig) -> WalletResult<Self> {
        Ok(Self {
            rpc: JsonRpcClient::new(&config.rpc)?,
        })
    }

    pub async fn get_latest_blockhash(&self) -> WalletResult<LatestBlockhash> {
        let result: WithContext<LatestBlockhash> = self
            .rpc
            .call("getLatestBlockhash", json!([{ "commitment": COMMITMENT }]))
            .await?;
        Ok(result.value)
    }

    async fn latest_blockhash(&self) -> WalletResult<Blockhash> {
        let latest = self.get_latest_blockhash().await?;
        latest.blockhash.parse().map_err(|e: WalletError| {
            WalletError::Rpc(RpcError::Decode {
                method: "getLatestBlockhash".into(),
                reason: e.to_string(),
            })
        })
    }

    /// Fee in lamports for `message_base64`. The node answers null once the
    /// message's blockhash has expired.
    pub async fn get_fee_for_message(&self, message_base64: &str) -> WalletResult<u64> {
        let method = "getFeeForMessage";
        let result: WithContext<Option<u64>> = self
            .rpc
            .call(method, json!([message_base64, { "commitment": "processed" }]))
            .await?;
        result.value.ok_or_else(|| {
            WalletError::Rpc(RpcError::Decode {
                method: method.into(),
                reason: "no fee quoted, blockhash expired".into(),
            })
        })
    }

    /// `getBalance`, in lamports.
    pub async fn balance_lamports(&self, address: &str) -> WalletResult<u64> {
        let result: WithContext<u64> = self
            .rpc
            .call("getBalance", json!([address, { "commitment": COMMITMENT }]))
            .await?;
        Ok(result.value)
    }

    /// Returns the transaction signature (base58).
    pub async fn send_transaction(&self, signed: &SignedTransfer) -> WalletResult<String> {
        self.rpc
            .call(
                "sendTransaction",
                json!([signed.to_base64(), { "encoding": "base64", "preflightCommitment": COMMITMENT }]),
            )
            .await
    }

    pub async fn get_block_height(&self) -> WalletResult<u64> {
        self.rpc
            .call("getBlockHeight", json!([{ "commitment": "confirmed" }]))
            .await
    }
}

#[async_trait]
impl ChainRpc<SolanaTransfer, SignedTransfer> for SolanaRpcClient {
    async fn estimate_fee(&self, draft: &SolanaTransfer) -> WalletResult<SolanaTransfer> {
        // the quote needs a live blockhash; the sequence step replaces it later
        let mut filled = draft.clone();
        filled.recent_blockhash = self.latest_blockhash().await?;
        filled.fee = self.get_fee_for_message(&filled.message_base64()).await?;
        debug!(chain = "solana", fee = filled.fee, "fee estimated");
        Ok(filled)
    }

    async fn get_balance(&self, address: &str) -> WalletResult<u128> {
        Ok(u128::from(self.balance_lamports(address).await?))
    }

    async fn next_sequence(&self, _address: &str) -> WalletResult<Blockhash> {
        self.latest_blockhash().await
    }

    async fn submit(&self, signed: &SignedTransfer) -> WalletResult<TransactionId> {
        let signature = self.send_transaction(signed).await?;
        Ok(TransactionId::new(ChainFamily::Solana, signature))
    }
}
