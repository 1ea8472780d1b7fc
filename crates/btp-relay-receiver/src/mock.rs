//! A deterministic, channel-driven `Receiver` test double.
//!
//! Tests script block updates, block proofs and message proofs ahead of time, then drive
//! the event stream by hand with [`MockReceiver::push_event`]/[`push_error`]. Nothing here
//! talks to a real chain; it exists to exercise the Link FSM against the scenarios a real
//! receiver would eventually produce.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use btp_relay_types::{BlockProof, BlockUpdate, BmcLinkStatus, MessageProof, ReceiveStatus};
use tokio::sync::{mpsc, Mutex};
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::{Receiver, ReceiverError, ReceiverEventStream, ReceiverResult};

#[derive(Default)]
struct MockState {
    block_updates: VecDeque<BlockUpdate>,
    block_proofs: HashMap<i64, BlockProof>,
    message_proofs: VecDeque<MessageProof>,
    height_for_seq: HashMap<u64, i64>,
    event_tx: Option<mpsc::UnboundedSender<Result<ReceiveStatus, ReceiverError>>>,
}

/// An in-memory `Receiver` double, scripted by the test that owns it.
pub struct MockReceiver {
    state: Mutex<MockState>,
    finalized_tx: mpsc::Sender<BmcLinkStatus>,
    finalized_rx: Mutex<Option<mpsc::Receiver<BmcLinkStatus>>>,
}

impl Default for MockReceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockReceiver {
    pub fn new() -> Self {
        let (finalized_tx, finalized_rx) = mpsc::channel(64);
        Self {
            state: Mutex::new(MockState::default()),
            finalized_tx,
            finalized_rx: Mutex::new(Some(finalized_rx)),
        }
    }

    /// Takes ownership of the finalized-status channel, for a test to assert on what the
    /// Link forwards to the status synchronizer.
    pub async fn take_finalized_receiver(&self) -> Option<mpsc::Receiver<BmcLinkStatus>> {
        self.finalized_rx.lock().await.take()
    }

    pub async fn queue_block_update(&self, bu: BlockUpdate) {
        self.state.lock().await.block_updates.push_back(bu);
    }

    pub async fn queue_block_proof(&self, height: i64, bp: BlockProof) {
        self.state.lock().await.block_proofs.insert(height, bp);
    }

    pub async fn queue_message_proof(&self, mp: MessageProof) {
        self.state.lock().await.message_proofs.push_back(mp);
    }

    pub async fn set_height_for_seq(&self, seq: u64, height: i64) {
        self.state.lock().await.height_for_seq.insert(seq, height);
    }

    /// Pushes a new receiver event onto the stream returned by `start`.
    ///
    /// Panics if `start` has not been called yet; tests are expected to call `start`
    /// before driving events.
    pub async fn push_event(&self, ev: ReceiveStatus) {
        let state = self.state.lock().await;
        let tx = state
            .event_tx
            .as_ref()
            .expect("push_event called before start");
        let _ = tx.send(Ok(ev));
    }

    pub async fn push_error(&self, err: ReceiverError) {
        let state = self.state.lock().await;
        let tx = state
            .event_tx
            .as_ref()
            .expect("push_error called before start");
        let _ = tx.send(Err(err));
    }
}

#[async_trait]
impl Receiver for MockReceiver {
    async fn start(&self, _initial_status: BmcLinkStatus) -> ReceiverResult<ReceiverEventStream> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.lock().await.event_tx = Some(tx);
        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }

    async fn stop(&self) {
        self.state.lock().await.event_tx = None;
    }

    async fn get_height_for_seq(&self, seq: u64) -> i64 {
        self.state
            .lock()
            .await
            .height_for_seq
            .get(&seq)
            .copied()
            .unwrap_or(0)
    }

    async fn build_block_update(
        &self,
        _bls: &BmcLinkStatus,
        budget: i64,
    ) -> ReceiverResult<Vec<BlockUpdate>> {
        let mut state = self.state.lock().await;
        let mut out = Vec::new();
        let mut used = 0i64;
        while let Some(front) = state.block_updates.front() {
            if used > 0 && used + front.payload_len > budget {
                break;
            }
            if front.payload_len > budget && used == 0 {
                // Always make progress with at least one item even if it alone exceeds
                // budget; the caller (builder) is responsible for flushing before asking
                // for more.
                out.push(state.block_updates.pop_front().expect("front checked"));
                break;
            }
            used += front.payload_len;
            out.push(state.block_updates.pop_front().expect("front checked"));
        }
        Ok(out)
    }

    async fn build_block_proof(
        &self,
        _bls: &BmcLinkStatus,
        height: i64,
    ) -> ReceiverResult<Option<BlockProof>> {
        Ok(self.state.lock().await.block_proofs.get(&height).cloned())
    }

    async fn build_message_proof(
        &self,
        _bls: &BmcLinkStatus,
        budget: i64,
    ) -> ReceiverResult<Option<MessageProof>> {
        let mut state = self.state.lock().await;
        match state.message_proofs.front() {
            Some(front) if front.payload_len <= budget => {
                Ok(state.message_proofs.pop_front())
            }
            _ => Ok(None),
        }
    }

    async fn build_relay_message(
        &self,
        items: &[btp_relay_types::RelayMessageItem],
    ) -> ReceiverResult<Vec<u8>> {
        let total: i64 = items.iter().map(|i| i.len()).sum();
        Ok(vec![0xAB; total.max(0) as usize])
    }

    fn finalized_status_sender(&self) -> mpsc::Sender<BmcLinkStatus> {
        self.finalized_tx.clone()
    }
}
