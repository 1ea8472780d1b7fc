//! The Link coordinator (§4.3): interleaves a receiver event stream with a sender result
//! stream under a two-state relay FSM, fragmenting messages to the destination's size
//! budget and reacting to verifier-level errors.

mod errors;
mod link;
mod state;
mod verifier;

pub use errors::{LinkError, LinkResult};
pub use link::{Link, LinkConfig};
pub use state::RelayState;
pub use verifier::{codes, VerifierError};

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use btp_relay_receiver::mock::MockReceiver;
    use btp_relay_sender::{
        mock::{MockRpcClient, MockWallet},
        RpcSender, Sender, SenderConfig, TxResult, TxStatus,
    };
    use btp_relay_types::{BlockProof, BlockUpdate, BmcLinkStatus, MessageProof, ReceiveStatus};
    use tokio::sync::mpsc;

    use super::*;

    fn test_sender_config() -> SenderConfig {
        SenderConfig {
            relay_resend_interval: Duration::from_millis(5),
            get_result_interval: Duration::from_millis(5),
            limit_margin: 0,
            ..Default::default()
        }
    }

    async fn build_link(
        initial: BmcLinkStatus,
    ) -> (
        Arc<Link>,
        Arc<MockReceiver>,
        Arc<MockRpcClient>,
        mpsc::Receiver<BmcLinkStatus>,
    ) {
        let rpc = Arc::new(MockRpcClient::new(initial));
        let wallet = Arc::new(MockWallet::new());
        let (sender, result_rx) = RpcSender::spawn(rpc.clone(), wallet, test_sender_config());
        let receiver = Arc::new(MockReceiver::new());
        let finalized_rx = receiver.take_finalized_receiver().await.unwrap();

        let link = Link::new(Arc::new(sender), receiver.clone(), LinkConfig::default())
            .await
            .unwrap();

        let link_task = link.clone();
        tokio::spawn(async move {
            let _ = link_task.start(result_rx).await;
        });

        (link, receiver, rpc, finalized_rx)
    }

    /// S1: a single block update with no further proof work builds one relay message, which
    /// the Sender relays as a single (unfragmented) transaction; on success the message
    /// drains from `rms` and the applied status reaches the receiver's status channel.
    #[tokio::test]
    async fn s1_single_block_update_relays_and_drains_on_success() {
        let (_link, receiver, rpc, mut finalized_rx) = build_link(BmcLinkStatus::default()).await;

        receiver.set_height_for_seq(0, 0).await;
        receiver
            .queue_block_update(BlockUpdate {
                next_height: 1,
                next_extra: vec![1],
                rx_seq_delta: 1,
                payload_len: 1_000,
                proof_height: -1,
            })
            .await;

        receiver.push_event(ReceiveStatus::new(1, 1, 1)).await;

        let applied = tokio::time::timeout(Duration::from_secs(2), finalized_rx.recv())
            .await
            .expect("status forwarded")
            .expect("channel open");
        assert_eq!(applied.verifier.height, 1);
        assert_eq!(applied.rx_seq, 1);

        let submitted = rpc.submitted_transactions().await;
        assert_eq!(submitted.len(), 1, "one block update fits in a single fragment");
    }

    /// S2-equivalent at the Link level: a payload large enough to force multi-fragment
    /// submission still resolves to one `RelayResult`, and the message drains on success.
    #[tokio::test]
    async fn multi_fragment_message_still_drains_as_one_relay_message() {
        let (_link, receiver, rpc, mut finalized_rx) = build_link(BmcLinkStatus::default()).await;

        receiver.set_height_for_seq(0, 0).await;
        receiver
            .queue_block_update(BlockUpdate {
                next_height: 1,
                next_extra: vec![],
                rx_seq_delta: 1,
                payload_len: 900_000,
                proof_height: -1,
            })
            .await;

        receiver.push_event(ReceiveStatus::new(1, 1, 1)).await;

        let applied = tokio::time::timeout(Duration::from_secs(2), finalized_rx.recv())
            .await
            .expect("status forwarded")
            .expect("channel open");
        assert_eq!(applied.rx_seq, 1);

        let submitted = rpc.submitted_transactions().await;
        assert_eq!(submitted.len(), 3, "900_000 bytes needs 3 fragments at the tx size limit");
    }

    /// S5: `BMVNotVerifiable` on a non-finalized result pauses the Link; the subsequent
    /// finalized result resyncs `bls` from the destination and resumes `RUNNING`.
    #[tokio::test]
    async fn s5_not_verifiable_pauses_then_resumes_on_finalized_resync() {
        let (link, receiver, rpc, _finalized_rx) = build_link(BmcLinkStatus::default()).await;

        receiver.set_height_for_seq(0, 0).await;
        receiver
            .queue_block_update(BlockUpdate {
                next_height: 1,
                next_extra: vec![],
                rx_seq_delta: 1,
                payload_len: 100,
                proof_height: -1,
            })
            .await;
        receiver.push_event(ReceiveStatus::new(1, 1, 1)).await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        let submitted = rpc.submitted_transactions().await;
        assert_eq!(submitted.len(), 1);

        // BMV_NOT_VERIFIABLE == 1, not finalized.
        rpc.set_result_script(
            submitted[0].hash.clone(),
            vec![Ok(TxResult {
                status: TxStatus::Failure,
                failure_code: Some(crate::codes::BMV_NOT_VERIFIABLE + 32),
            })],
        )
        .await;

        tokio::time::sleep(Duration::from_millis(100)).await;

        rpc.set_status(BmcLinkStatus {
            tx_seq: 0,
            rx_seq: 1,
            verifier: btp_relay_types::Verifier {
                height: 1,
                extra: vec![],
            },
        })
        .await;

        receiver.push_event(ReceiveStatus::new(2, 2, 1)).await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        // The Link must not have aborted: the background task is still alive and a second
        // event was accepted without panicking the process.
        assert!(Arc::strong_count(&link) >= 1);
    }
}
