//! The Link coordinator: reconciles what the source chain has produced against what the
//! destination has accepted, driving the Sender and observing its results (§4.3).

use std::sync::Arc;

use btp_relay_receiver::Receiver;
use btp_relay_sender::{SenderError, SenderResult};
use btp_relay_types::{
    BlockUpdate, BmcLinkStatus, RelayMessage, RelayMessageItem, RelayOutcome, RelayResult,
};
use tokio::sync::{mpsc, Mutex};
use tokio_stream::StreamExt;
use tracing::{debug, error, info, warn};

use crate::{
    errors::{LinkError, LinkResult},
    state::{drain_through, drain_through_covered, LinkState, RelayState},
    verifier::VerifierError,
};

/// A cap on how many times `buildRelayMessage` retries `Receiver.BuildBlockUpdate` before
/// giving up. The source retries unconditionally; any concrete chain adapter that is
/// consulted here is assumed to have data once `rss` says a taller block exists, so a bound
/// this generous only ever triggers against a misbehaving `Receiver`.
const MAX_BUILD_BLOCK_UPDATE_ATTEMPTS: u32 = 64;

/// A cap on `undelivered-recovery`'s catch-up loop, for the same reason.
const MAX_RECOVERY_ATTEMPTS: u32 = 64;

/// Coordinator configuration (§6, configuration surface).
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkConfig {
    /// When true, `successFlow` runs on every success result, not just finalized ones.
    pub latest_result: bool,
}

/// Reconciles source-chain state (via [`Receiver`]) against destination-chain acceptance
/// (via [`btp_relay_sender::Sender`]), one Link per BTP address pair.
pub struct Link {
    sender: Arc<dyn btp_relay_sender::Sender>,
    receiver: Arc<dyn Receiver>,
    state: Mutex<LinkState>,
    config: LinkConfig,
}

impl Link {
    /// Fetches the initial link status from the destination and builds a Link at rest.
    pub async fn new(
        sender: Arc<dyn btp_relay_sender::Sender>,
        receiver: Arc<dyn Receiver>,
        config: LinkConfig,
    ) -> SenderResult<Arc<Self>> {
        let bls = sender.get_status().await?;
        Ok(Arc::new(Self {
            sender,
            receiver,
            state: Mutex::new(LinkState::new(bls)),
            config,
        }))
    }

    /// Starts the Receiver and spawns the two long-lived consumer tasks (§5). Returns once
    /// either task stops — on a fatal error, or because its upstream channel/stream closed.
    pub async fn start(self: Arc<Self>, result_rx: mpsc::Receiver<RelayResult>) -> LinkResult<()> {
        let initial_status = self.state.lock().await.bls.clone();
        let mut events = self
            .receiver
            .start(initial_status)
            .await
            .map_err(LinkError::Receiver)?;

        let result_link = self.clone();
        let mut result_rx = result_rx;
        let result_task = tokio::spawn(async move {
            while let Some(result) = result_rx.recv().await {
                result_link.on_result(result).await?;
            }
            Ok::<(), LinkError>(())
        });

        let event_link = self.clone();
        let event_task = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                let ev = event.map_err(LinkError::Receiver)?;
                event_link.on_receiver_event(ev).await?;
            }
            Ok::<(), LinkError>(())
        });

        tokio::select! {
            r = result_task => r.expect("result consumer task panicked"),
            r = event_task => r.expect("receiver event consumer task panicked"),
        }
    }

    pub async fn stop(&self) {
        self.sender.stop().await;
        self.receiver.stop().await;
    }

    // ---- §4.3 steady-state ----------------------------------------------------------

    async fn on_receiver_event(&self, e: btp_relay_types::ReceiveStatus) -> LinkResult<()> {
        let first_event = {
            let mut state = self.state.lock().await;
            let msg_cnt = match state.rss.last() {
                None => e.seq,
                Some(last) => last.seq - e.seq,
            };
            state
                .rss
                .push(btp_relay_types::ReceiveStatus::new(e.height, e.seq, msg_cnt));
            let first = !state.recovered;
            state.recovered = true;
            first
        };

        if first_event {
            self.undelivered_recovery().await?;
            self.handle_relay_message().await?;
            self.state.lock().await.relay_state = RelayState::Pending;
        }
        self.handle_relay_message().await
    }

    /// §4.3.1. Rebuilds in-memory state for anything the destination received partially (or
    /// not at all) across a restart.
    async fn undelivered_recovery(&self) -> LinkResult<()> {
        let mut state = self.state.lock().await;
        let last_seq = state.bls.rx_seq;
        let mut attempts = 0u32;
        loop {
            let h = self.receiver.get_height_for_seq(last_seq).await;
            if h == 0 {
                break;
            }
            if h == state.bls.verifier.height {
                let budget = self.limit_size() - state.builder.size;
                if let Some(mp) = self
                    .receiver
                    .build_message_proof(&state.bls, budget)
                    .await
                    .map_err(LinkError::Receiver)?
                {
                    let before = state.bls.rx_seq;
                    let item = RelayMessageItem::MessageProof(mp);
                    item.update_bmc_link_status(&mut state.bls);
                    if state.bls.rx_seq > before {
                        state.builder.push(item);
                    }
                }
                break;
            } else if h < state.bls.verifier.height {
                self.build_proof(&mut state, None).await?;
                attempts += 1;
                if attempts >= MAX_RECOVERY_ATTEMPTS {
                    warn!("undelivered-recovery exceeded retry budget, deferring to steady state");
                    break;
                }
                continue;
            } else {
                break;
            }
        }
        if state.builder.size > 0 {
            self.append_relay_message(&mut state).await?;
        }
        Ok(())
    }

    /// §4.3.2. The main driver: submits anything buildable, then advances `bls` block by
    /// block while the destination hasn't caught up to the tip `rss` has observed.
    async fn handle_relay_message(&self) -> LinkResult<()> {
        let mut state = self.state.lock().await;
        if state.relay_state != RelayState::Running {
            return Ok(());
        }
        if let Err(e) = self.send_relay_message(&mut state).await {
            return Self::absorb_queue_full(&mut state, e);
        }

        while state.relay_state == RelayState::Running
            && state
                .rss
                .last()
                .is_some_and(|last| state.bls.verifier.height < last.height)
        {
            self.build_relay_message(&mut state).await?;
            if let Err(e) = self.send_relay_message(&mut state).await {
                return Self::absorb_queue_full(&mut state, e);
            }
        }
        Ok(())
    }

    fn absorb_queue_full(state: &mut LinkState, e: LinkError) -> LinkResult<()> {
        match e {
            LinkError::QueueFull => {
                state.relay_state = RelayState::Pending;
                Ok(())
            }
            other => Err(other),
        }
    }

    /// Submits every not-yet-sent `rms` entry, in order, stopping (and signalling
    /// [`LinkError::QueueFull`]) the moment the Sender reports its queue is full.
    async fn send_relay_message(&self, state: &mut LinkState) -> LinkResult<()> {
        for rm in state.rms.iter_mut().filter(|m| !m.sending) {
            match self.sender.relay(rm.clone()).await {
                Ok(_id) => rm.sending = true,
                Err(SenderError::InvalidState) => return Err(LinkError::QueueFull),
                Err(e) => return Err(LinkError::Sender(e)),
            }
        }
        Ok(())
    }

    fn limit_size(&self) -> i64 {
        self.sender.tx_size_limit() - self.sender.get_margin_for_limit()
    }

    /// §4.3.3.
    async fn build_relay_message(&self, state: &mut LinkState) -> LinkResult<()> {
        state.builder.ensure_group();
        let updates = self.next_block_updates(state).await?;
        for bu in updates {
            let item = RelayMessageItem::BlockUpdate(bu.clone());
            item.update_bmc_link_status(&mut state.bls);
            state.builder.push(item);
            self.build_proof(state, Some(&bu)).await?;
            self.append_relay_message(state).await?;
        }
        Ok(())
    }

    async fn next_block_updates(&self, state: &LinkState) -> LinkResult<Vec<BlockUpdate>> {
        for _ in 0..MAX_BUILD_BLOCK_UPDATE_ATTEMPTS {
            let budget = self.limit_size() - state.builder.size;
            let updates = self
                .receiver
                .build_block_update(&state.bls, budget)
                .await
                .map_err(LinkError::Receiver)?;
            if !updates.is_empty() {
                return Ok(updates);
            }
            tokio::task::yield_now().await;
        }
        Err(LinkError::BuildBlockUpdateExhausted)
    }

    /// §4.3.4.
    async fn build_proof(
        &self,
        state: &mut LinkState,
        bu: Option<&BlockUpdate>,
    ) -> LinkResult<()> {
        let target_height = state.bls.verifier.height;
        let Some(rs_idx) = state.rss.iter().position(|rs| rs.height == target_height) else {
            return Ok(());
        };

        loop {
            let rs = state.rss[rs_idx];
            if rs.seq <= state.bls.rx_seq as i64 {
                break;
            }

            let hard_limit = self.sender.tx_size_limit();
            if state.builder.size > hard_limit {
                self.append_relay_message(state).await?;
                self.build_block_proof(state).await?;
            } else if bu.is_none() || bu.map_or(true, |b| b.proof_height == -1) {
                self.build_block_proof(state).await?;
            }

            let progressed = self.build_message_proof(state).await?;
            if !progressed {
                break;
            }
        }
        Ok(())
    }

    async fn build_message_proof(&self, state: &mut LinkState) -> LinkResult<bool> {
        let budget = self.limit_size() - state.builder.size;
        match self
            .receiver
            .build_message_proof(&state.bls, budget)
            .await
            .map_err(LinkError::Receiver)?
        {
            Some(mp) => {
                let item = RelayMessageItem::MessageProof(mp);
                item.update_bmc_link_status(&mut state.bls);
                state.builder.push(item);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn build_block_proof(&self, state: &mut LinkState) -> LinkResult<()> {
        let height = self.receiver.get_height_for_seq(state.bls.rx_seq).await;
        if let Some(bp) = self
            .receiver
            .build_block_proof(&state.bls, height)
            .await
            .map_err(LinkError::Receiver)?
        {
            state.builder.push(RelayMessageItem::BlockProof(bp));
        }
        Ok(())
    }

    /// §4.3.5.
    async fn append_relay_message(&self, state: &mut LinkState) -> LinkResult<()> {
        let groups = state.builder.take_groups();
        for group in groups {
            if group.is_empty() {
                continue;
            }
            let bytes = self
                .receiver
                .build_relay_message(&group)
                .await
                .map_err(LinkError::Receiver)?;
            let bp_height = self.receiver.get_height_for_seq(state.bls.rx_seq).await;
            let rm = RelayMessage::new(state.bls.clone(), bp_height, bytes, group);
            info!(id = rm.id, size = rm.len(), "relay message built");
            state.rms.push(rm);
        }
        Ok(())
    }

    // ---- §4.3.6 result handling -------------------------------------------------------

    async fn on_result(&self, result: RelayResult) -> LinkResult<()> {
        match result.outcome {
            RelayOutcome::Success => {
                if self.config.latest_result || result.finalized {
                    self.success_flow(result.id).await?;
                }
                Ok(())
            }
            RelayOutcome::Revert(code) => self.on_revert(result.id, code, result.finalized).await,
            RelayOutcome::Failure(code) => {
                error!(id = result.id, code, "fatal sender failure, aborting");
                Err(LinkError::Fatal(format!("sender failure code {code}")))
            }
        }
    }

    async fn on_revert(&self, id: u64, code: i64, finalized: bool) -> LinkResult<()> {
        match VerifierError::from_code(code) {
            VerifierError::Unknown => {
                error!(id, "BMVUnknown, aborting");
                Err(LinkError::Fatal("BMVUnknown".to_string()))
            }
            VerifierError::NotVerifiable => {
                if !finalized {
                    self.state.lock().await.relay_state = RelayState::Pending;
                    Ok(())
                } else {
                    {
                        let mut state = self.state.lock().await;
                        state.bls = self.sender.get_status().await?;
                        let bls = state.bls.clone();
                        prune_covered(&mut state, &bls);
                        state.relay_state = RelayState::Running;
                    }
                    self.handle_relay_message().await
                }
            }
            VerifierError::AlreadyVerified => {
                let mut state = self.state.lock().await;
                drain_through(&mut state.rms, |m| m.id == id);
                Ok(())
            }
            VerifierError::RevertInvalidBlockWitnessOld => {
                let mut state = self.state.lock().await;
                if let Some(pos) = state.rms.iter().position(|m| m.id == id) {
                    let rm = state.rms.remove(pos);
                    state.bls = rm.bls;
                    self.build_proof(&mut state, None).await?;
                    self.append_relay_message(&mut state).await?;
                }
                Ok(())
            }
            VerifierError::Other(other) => {
                error!(id, code = other, "unrecognized verifier error, aborting");
                Err(LinkError::Fatal(format!("unrecognized verifier code {other}")))
            }
        }
    }

    /// successFlow(id) (§4.3.6): prunes everything the applied status now covers, resumes
    /// `RUNNING`, and forwards the applied status to the Receiver's status synchronizer.
    async fn success_flow(&self, id: u64) -> LinkResult<()> {
        let applied = {
            let mut state = self.state.lock().await;
            let Some(rm) = state.rms.iter().find(|m| m.id == id) else {
                debug!(id, "success for an already-pruned message, ignoring");
                return Ok(());
            };
            let bls = rm.bls.clone();
            prune_covered(&mut state, &bls);
            state.relay_state = RelayState::Running;
            bls
        };
        self.handle_relay_message().await?;
        let status_tx = self.receiver.finalized_status_sender();
        let _ = status_tx.send(applied).await;
        Ok(())
    }
}

/// Drops every `rms`/`rss` entry whose status is already covered by `applied` (§4.3.6,
/// §9 `clearRelayMessage` semantics): both lists are height-ordered, so "covered" matches a
/// whole prefix, and draining through the *last* covered entry is what removes all of them.
fn prune_covered(state: &mut LinkState, applied: &BmcLinkStatus) {
    drain_through_covered(&mut state.rms, |m| {
        m.bls.verifier.height <= applied.verifier.height && m.bls.rx_seq <= applied.rx_seq
    });
    drain_through_covered(&mut state.rss, |rs| {
        rs.height <= applied.verifier.height && (rs.seq as u64) <= applied.rx_seq
    });
}
