//! Synthetic source-chain activity, standing in for a concrete chain-specific `Receiver`
//! (out of scope for this crate, §1). Periodically manufactures a block update so the
//! binary has something to relay end to end against the in-memory test doubles.

use std::time::Duration;

use btp_relay_receiver::mock::MockReceiver;
use btp_relay_types::{BlockUpdate, ReceiveStatus};
use tracing::info;

/// Drives `receiver` forever, producing one block update (and the receiver event that
/// announces it) every `interval`.
pub async fn run(receiver: &MockReceiver, interval: Duration) {
    let mut height: i64 = 0;
    let mut seq: i64 = 0;
    loop {
        tokio::time::sleep(interval).await;
        height += 1;
        seq += 1;

        receiver
            .queue_block_update(BlockUpdate {
                next_height: height,
                next_extra: height.to_be_bytes().to_vec(),
                rx_seq_delta: 1,
                payload_len: 256,
                proof_height: -1,
            })
            .await;
        receiver.set_height_for_seq(seq as u64, height).await;

        info!(height, seq, "synthetic source-chain update observed");
        receiver.push_event(ReceiveStatus::new(height, seq, 1)).await;
    }
}
