//! The source-chain adapter consumed by the Link coordinator.
//!
//! This crate defines only the `Receiver` contract (§6 of the design): block scanning and
//! proof construction for any concrete chain are out of scope here. [`mock`] provides a
//! deterministic, channel-driven test double used to exercise the Link FSM.

mod error;
pub mod mock;

use std::pin::Pin;

use async_trait::async_trait;
use btp_relay_types::{BlockProof, BlockUpdate, BmcLinkStatus, MessageProof, ReceiveStatus};
pub use error::{ReceiverError, ReceiverResult};
use tokio::sync::mpsc;
use tokio_stream::Stream;

/// Lazy sequence of source-chain observations, in height-ascending order.
pub type ReceiverEventStream =
    Pin<Box<dyn Stream<Item = Result<ReceiveStatus, ReceiverError>> + Send>>;

/// Chain-specific adapter: block scanning and proof construction for a source chain.
///
/// Implementations are expected to serialize internally (the Link only ever calls one
/// method at a time, awaiting each before issuing the next).
#[async_trait]
pub trait Receiver: Send + Sync {
    /// Starts the receiver's internal scanning loop and returns its event stream.
    async fn start(&self, initial_status: BmcLinkStatus) -> ReceiverResult<ReceiverEventStream>;

    /// Stops the receiver's internal scanning loop.
    async fn stop(&self);

    /// Maps a `rxSeq` value to the source-chain height it was last seen at, or `0` if
    /// unknown.
    async fn get_height_for_seq(&self, seq: u64) -> i64;

    /// Builds as many block updates as fit within `budget` bytes, starting just after
    /// `bls`. May return an empty vector; the caller loops until it sees data or gives up.
    async fn build_block_update(
        &self,
        bls: &BmcLinkStatus,
        budget: i64,
    ) -> ReceiverResult<Vec<BlockUpdate>>;

    /// Builds a block proof witnessing `height`, if one is obtainable.
    async fn build_block_proof(
        &self,
        bls: &BmcLinkStatus,
        height: i64,
    ) -> ReceiverResult<Option<BlockProof>>;

    /// Builds a message proof bounded by `budget` bytes, if any new messages are provable.
    async fn build_message_proof(
        &self,
        bls: &BmcLinkStatus,
        budget: i64,
    ) -> ReceiverResult<Option<MessageProof>>;

    /// Serializes a group of items into the wire bytes of one relay message.
    async fn build_relay_message(
        &self,
        items: &[btp_relay_types::RelayMessageItem],
    ) -> ReceiverResult<Vec<u8>>;

    /// Registers the status synchronizer: the Link forwards every finalized link status
    /// here so the receiver can prune whatever proof material it no longer needs.
    fn finalized_status_sender(&self) -> mpsc::Sender<BmcLinkStatus>;
}
