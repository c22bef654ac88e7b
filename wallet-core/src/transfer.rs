// wallet-core/src/transfer.rs
//
// Transfer Orchestrator
//
//   validate inputs ─▶ build draft ─▶ estimate fee ─▶ check balance ─▶ fetch nonce ─▶ sign ─▶ submit
//                                     (RPC, gated)   (RPC, gated)      (RPC)                 (RPC)
//
// Steps run strictly in order. Any failure aborts the transfer and comes back
// as a `TransferError` naming the step. Nothing irreversible happens before
// submit, so an aborted transfer needs no cleanup.
//
// Concurrency: two transfers from the same sender may fetch the same nonce and
// the node will reject the second. Callers that need ordering must run one
// transfer per sender at a time.
//
// The fee gate only checks that max fee >= priority fee. It does not check
// that balance covers value + fee; the node rejects unaffordable transactions.

use crate::crypto::TokenAmount;
use crate::error::{RpcError, TransferError, WalletError, WalletResult};
use crate::network::{ChainRpc, TransactionId, TransferAccount, TransferMessage};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

pub use crate::config::TransferTimeouts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferStep {
    ValidateInputs,
    BuildDraft,
    EstimateFee,
    CheckBalance,
    FetchSequence,
    Sign,
    Submit,
}

impl TransferStep {
    pub fn as_str(self) -> &'static str {
        match self {
            TransferStep::ValidateInputs => "validate inputs",
            TransferStep::BuildDraft => "build draft",
            TransferStep::EstimateFee => "estimate fee",
            TransferStep::CheckBalance => "check balance",
            TransferStep::FetchSequence => "fetch nonce",
            TransferStep::Sign => "sign",
            TransferStep::Submit => "submit",
        }
    }
}

impl fmt::Display for TransferStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs transfers against one chain client. Holds no per-transfer state, so
/// one orchestrator can drive concurrent transfers from different senders.
#[derive(Debug, Clone)]
pub struct TransferOrchestrator<R> {
    rpc: R,
    timeouts: TransferTimeouts,
}

async fn bounded<T, F>(step: TransferStep, limit: Duration, call: F) -> Result<T, TransferError>
where
    F: Future<Output = WalletResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(TransferError::new(step, e)),
        Err(_) => Err(TransferError::new(
            step,
            RpcError::Timeout {
                secs: limit.as_secs(),
            },
        )),
    }
}

impl<R> TransferOrchestrator<R> {
    pub fn new(rpc: R) -> Self {
        Self {
            rpc,
            timeouts: TransferTimeouts::default(),
        }
    }

    /// Replace the per-step bounds. Zero is rejected with `WalletError::Config`.
    pub fn with_timeouts(mut self, timeouts: TransferTimeouts) -> WalletResult<Self> {
        timeouts.validate()?;
        self.timeouts = timeouts;
        Ok(self)
    }

    #[inline]
    pub fn rpc(&self) -> &R {
        &self.rpc
    }

    #[inline]
    pub fn timeouts(&self) -> &TransferTimeouts {
        &self.timeouts
    }

    /// Send `amount` atoms from `account` to `to`.
    ///
    /// # Errors
    /// A `TransferError` whose `step` names where it stopped:
    /// - validate inputs: `InvalidRecipient`, `InvalidAmount` (no RPC call made)
    /// - estimate fee: RPC failure or timeout, `FeeInversion`
    /// - check balance: RPC failure or timeout, `InsufficientFunds`
    /// - fetch nonce / submit: RPC failure or timeout
    /// - sign: signing failure
    pub async fn transfer<A>(&self, account: &A, to: &str, amount: u128) -> Result<TransactionId, TransferError>
    where
        A: TransferAccount,
        R: ChainRpc<A::Message, A::Signed>,
    {
        let chain = account.chain();
        let from = account.address();

        let result = self.run(account, &from, to, amount).await;
        match &result {
            Ok(id) => info!(%chain, %from, tx_id = %id, "transfer submitted"),
            Err(e) => warn!(%chain, %from, step = %e.step, error = %e.source, "transfer aborted"),
        }
        result
    }

    /// [`transfer`](Self::transfer) with a human-unit amount, e.g.
    /// `TokenAmount::parse("0.25", Denomination::SOL)`. The amount must use the
    /// scale of the account's native token.
    pub async fn transfer_amount<A>(
        &self,
        account: &A,
        to: &str,
        amount: &TokenAmount,
    ) -> Result<TransactionId, TransferError>
    where
        A: TransferAccount,
        R: ChainRpc<A::Message, A::Signed>,
    {
        let chain = account.chain();
        let native = chain.native_denomination();
        let denom = amount.denomination();
        if denom.decimals != native.decimals {
            return Err(TransferError::new(
                TransferStep::ValidateInputs,
                WalletError::InvalidAmount(format!(
                    "{} has {} decimals, {} native token has {}",
                    denom.symbol, denom.decimals, chain, native.decimals
                )),
            ));
        }
        debug!(%chain, %amount, "transfer in human units");
        self.transfer(account, to, amount.atoms()).await
    }

    async fn run<A>(&self, account: &A, from: &str, to: &str, amount: u128) -> Result<TransactionId, TransferError>
    where
        A: TransferAccount,
        R: ChainRpc<A::Message, A::Signed>,
    {
        let chain = account.chain();

        // 1. validate inputs
        let step = TransferStep::ValidateInputs;
        if amount == 0 {
            return Err(TransferError::new(
                step,
                WalletError::InvalidAmount("amount must be positive".into()),
            ));
        }
        let recipient = account
            .parse_recipient(to)
            .map_err(|e| TransferError::new(step, e))?;

        // 2. build draft
        let step = TransferStep::BuildDraft;
        debug!(%chain, %step, amount = %amount, "building draft");
        let draft = account
            .build_transfer(recipient, amount)
            .map_err(|e| TransferError::new(step, e))?;

        // 3. estimate fee
        let step = TransferStep::EstimateFee;
        debug!(%chain, %step);
        let mut message = bounded(step, self.timeouts.estimate_fee(), self.rpc.estimate_fee(&draft)).await?;
        let quote = message.fee_quote();
        if !quote.is_consistent() {
            return Err(TransferError::new(
                step,
                WalletError::FeeInversion {
                    max_fee: quote.max_fee_per_unit,
                    priority_fee: quote.priority_fee_per_unit,
                },
            ));
        }

        // 4. check balance
        let step = TransferStep::CheckBalance;
        debug!(%chain, %step);
        let balance = bounded(step, self.timeouts.balance(), self.rpc.get_balance(from)).await?;
        let required = message.value();
        if balance < required {
            return Err(TransferError::new(
                step,
                WalletError::InsufficientFunds { balance, required },
            ));
        }

        // 5. fetch nonce
        let step = TransferStep::FetchSequence;
        debug!(%chain, %step);
        let sequence = bounded(step, self.timeouts.sequence(), self.rpc.next_sequence(from)).await?;
        debug!(%chain, ?sequence, "sequence assigned");
        message.assign_sequence(sequence);

        // 6. sign
        let step = TransferStep::Sign;
        debug!(%chain, %step);
        let signed = account
            .sign_transfer(message)
            .map_err(|e| TransferError::new(step, e))?;

        // 7. submit
        let step = TransferStep::Submit;
        debug!(%chain, %step);
        bounded(step, self.timeouts.submit(), self.rpc.submit(&signed)).await
    }
}

// =============================================================================
// TESTS
// =============================================================================
