//! Converts a logical relay message into one or more destination transactions: signing,
//! fragment sequencing, pool-overflow retry and result polling (§4.2).

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use btp_relay_queue::Queue;
use btp_relay_types::{BmcLinkStatus, RelayMessage, RelayOutcome, RelayResult};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

use crate::{
    constants::{
        self, DUPLICATE_TRANSACTION_CODE, EXPIRED_TRANSACTION_CODE, FAILURE_CODE_END,
        FAILURE_CODE_REVERT,
    },
    errors::{SenderError, SenderResult, SubmitError, TxResultError},
    rpc::{RpcClient, SignedTx, TxResult, TxStatus, Wallet},
    wire::{plan_fragments, Fragment, UnsignedTx},
};

/// Static configuration for a [`RpcSender`].
#[derive(Debug, Clone)]
pub struct SenderConfig {
    pub step_limit: u64,
    pub src_address: String,
    pub dst_address: String,
    pub network_id: String,
    pub relay_resend_interval: Duration,
    pub get_result_interval: Duration,
    /// Subtracted from [`Sender::tx_size_limit`] by the Link to compute its working budget.
    pub limit_margin: i64,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            step_limit: constants::DEFAULT_STEP_LIMIT,
            src_address: String::new(),
            dst_address: String::new(),
            network_id: "0x1".to_string(),
            relay_resend_interval: constants::DEFAULT_RELAY_RESEND_INTERVAL,
            get_result_interval: constants::DEFAULT_GET_RELAY_RESULT_INTERVAL,
            limit_margin: 0,
        }
    }
}

/// The Sender contract consumed by the Link coordinator.
#[async_trait]
pub trait Sender: Send + Sync {
    /// Payload byte budget before base64 expansion.
    fn tx_size_limit(&self) -> i64;

    /// Margin the Link should further subtract from `tx_size_limit` when sizing its builder.
    fn get_margin_for_limit(&self) -> i64;

    /// Synchronous RPC to the destination's BMC contract for the current link status.
    async fn get_status(&self) -> SenderResult<BmcLinkStatus>;

    /// Accepts one logical relay message, fragmenting and submitting it as needed. Returns
    /// its id, or fails with [`SenderError::InvalidState`] if the in-flight queue is full.
    async fn relay(&self, rm: RelayMessage) -> SenderResult<u64>;

    /// Stops accepting new result notifications; in-flight polling loops exit on their next
    /// iteration.
    async fn stop(&self);
}

/// Concrete [`Sender`] backed by a chain RPC client and wallet.
pub struct RpcSender<C, W> {
    rpc: Arc<C>,
    wallet: Arc<W>,
    config: SenderConfig,
    queue: Arc<Mutex<Queue>>,
    result_tx: mpsc::Sender<RelayResult>,
}

impl<C, W> RpcSender<C, W>
where
    C: RpcClient + 'static,
    W: Wallet + 'static,
{
    /// Builds a new Sender and its result stream.
    pub fn spawn(
        rpc: Arc<C>,
        wallet: Arc<W>,
        config: SenderConfig,
    ) -> (Self, mpsc::Receiver<RelayResult>) {
        let (result_tx, result_rx) = mpsc::channel(256);
        let sender = Self {
            rpc,
            wallet,
            config,
            queue: Arc::new(Mutex::new(Queue::new())),
            result_tx,
        };
        (sender, result_rx)
    }

    fn build_unsigned_tx(&self, prev: &str, fragment: &Fragment) -> UnsignedTx {
        UnsignedTx::for_fragment(
            self.config.src_address.clone(),
            self.config.dst_address.clone(),
            self.config.network_id.clone(),
            self.config.step_limit,
            prev.to_string(),
            fragment,
        )
    }

    /// Signs and submits a single fragment, retrying on transient conditions. Returns the
    /// transaction hash once the node has accepted it (or treated it as a duplicate).
    async fn sign_and_submit(&self, fragment: &Fragment) -> SenderResult<String> {
        'resign: loop {
            let unsigned = self.build_unsigned_tx(&self.config.src_address, fragment);
            let signed: SignedTx = self
                .wallet
                .sign(&unsigned)
                .await
                .map_err(|e| SenderError::Sign(e.to_string()))?;

            loop {
                match self.rpc.send_transaction(&signed).await {
                    Ok(()) => return Ok(signed.hash),
                    Err(SubmitError::PoolOverflow) => {
                        debug!(hash = %signed.hash, "tx pool overflow, retrying without re-signing");
                        tokio::time::sleep(self.config.relay_resend_interval).await;
                        continue;
                    }
                    Err(SubmitError::System { sub_code })
                        if sub_code == DUPLICATE_TRANSACTION_CODE =>
                    {
                        debug!(hash = %signed.hash, "duplicate transaction, treating as success");
                        return Ok(signed.hash);
                    }
                    Err(SubmitError::System { sub_code }) if sub_code == EXPIRED_TRANSACTION_CODE => {
                        debug!("transaction expired, re-signing");
                        continue 'resign;
                    }
                    Err(SubmitError::System { sub_code }) => {
                        return Err(SenderError::Rpc(format!("system error, sub-code {sub_code}")));
                    }
                    Err(SubmitError::Other(msg)) => return Err(SenderError::Rpc(msg)),
                }
            }
        }
    }
}

#[async_trait]
impl<C, W> Sender for RpcSender<C, W>
where
    C: RpcClient + 'static,
    W: Wallet + 'static,
{
    fn tx_size_limit(&self) -> i64 {
        constants::tx_size_limit()
    }

    fn get_margin_for_limit(&self) -> i64 {
        self.config.limit_margin
    }

    async fn get_status(&self) -> SenderResult<BmcLinkStatus> {
        self.rpc.get_status(&self.config.src_address).await
    }

    async fn relay(&self, rm: RelayMessage) -> SenderResult<u64> {
        {
            let mut q = self.queue.lock().await;
            if q.is_full() {
                return Err(SenderError::InvalidState);
            }
            q.enqueue(rm.id, String::new())
                .expect("queue was just checked to have room");
        }

        let limit = self.tx_size_limit();
        let fragments = plan_fragments(&rm.bytes, limit);
        info!(id = %rm.id, size = rm.len(), fragments = fragments.len(), "submitting relay message");

        let mut last_hash = String::new();
        for fragment in &fragments {
            match self.sign_and_submit(fragment).await {
                Ok(hash) => last_hash = hash,
                Err(e) => {
                    let mut q = self.queue.lock().await;
                    q.dequeue(rm.id);
                    error!(id = %rm.id, err = %e, "relay fragment submission aborted");
                    return Err(e);
                }
            }
        }

        {
            let mut q = self.queue.lock().await;
            q.dequeue(rm.id);
            q.enqueue(rm.id, last_hash.clone())
                .expect("slot was reserved for this id");
        }

        let rpc = self.rpc.clone();
        let queue = self.queue.clone();
        let result_tx = self.result_tx.clone();
        let interval = self.config.get_result_interval;
        let id = rm.id;
        tokio::spawn(async move {
            poll_result(rpc, queue, result_tx, id, last_hash, interval).await;
        });

        Ok(rm.id)
    }

    async fn stop(&self) {
        // Dropping the sender side of `result_tx` (by letting this struct go out of scope)
        // is what actually closes the stream; nothing further to do while `self` is alive.
    }
}

async fn poll_result<C: RpcClient>(
    rpc: Arc<C>,
    queue: Arc<Mutex<Queue>>,
    result_tx: mpsc::Sender<RelayResult>,
    id: u64,
    tx_hash: String,
    interval: Duration,
) {
    loop {
        match rpc.get_transaction_result(&tx_hash).await {
            Ok(result) => {
                let outcome = classify_result(result);
                debug!(%id, ?outcome, "relay result finalized");
                let _ = result_tx
                    .send(RelayResult {
                        id,
                        outcome,
                        finalized: true,
                    })
                    .await;
                break;
            }
            Err(TxResultError::Pending | TxResultError::Executing | TxResultError::NotFound) => {
                tokio::time::sleep(interval).await;
                continue;
            }
            Err(TxResultError::Other(msg)) => {
                warn!(%id, err = %msg, "error polling transaction result");
                let _ = result_tx
                    .send(RelayResult {
                        id,
                        outcome: RelayOutcome::Failure(-1),
                        finalized: true,
                    })
                    .await;
                break;
            }
        }
    }
    queue.lock().await.dequeue(id);
}

fn classify_result(result: TxResult) -> RelayOutcome {
    match result.status {
        TxStatus::Success => RelayOutcome::Success,
        TxStatus::Failure => {
            let fc = result.failure_code.unwrap_or_default();
            if (FAILURE_CODE_REVERT..=FAILURE_CODE_END).contains(&fc) {
                RelayOutcome::Revert(fc - FAILURE_CODE_REVERT)
            } else {
                RelayOutcome::Failure(fc)
            }
        }
    }
}
