//! End-to-end Sender scenarios (S1-S4 of the design's testable properties).

use std::time::Duration;

use btp_relay_sender::{
    mock::{MockRpcClient, MockWallet},
    RpcSender, Sender, SenderConfig, SubmitError, TxResult, TxResultError, TxStatus,
};
use btp_relay_types::{BmcLinkStatus, RelayMessage, RelayOutcome};
use std::sync::Arc;

fn test_config() -> SenderConfig {
    SenderConfig {
        relay_resend_interval: Duration::from_millis(5),
        get_result_interval: Duration::from_millis(5),
        ..Default::default()
    }
}

fn make_message(bytes: Vec<u8>) -> RelayMessage {
    RelayMessage::new(BmcLinkStatus::default(), 0, bytes, Vec::new())
}

#[tokio::test]
async fn s1_single_fragment_relay_succeeds() {
    let rpc = Arc::new(MockRpcClient::new(BmcLinkStatus::default()));
    let wallet = Arc::new(MockWallet::new());
    let (sender, mut results) = RpcSender::spawn(rpc.clone(), wallet, test_config());

    let rm = make_message(vec![7u8; 100_000]);
    let id = sender.relay(rm).await.unwrap();

    let submitted = rpc.submitted_transactions().await;
    assert_eq!(submitted.len(), 1, "N == 1 means exactly one Relay call");

    rpc.set_result_script(
        submitted[0].hash.clone(),
        vec![Ok(TxResult {
            status: TxStatus::Success,
            failure_code: None,
        })],
    )
    .await;

    let result = tokio::time::timeout(Duration::from_secs(2), results.recv())
        .await
        .expect("result arrives")
        .expect("channel open");
    assert_eq!(result.id, id);
    assert_eq!(result.outcome, RelayOutcome::Success);
    assert!(result.finalized);
}

#[tokio::test]
async fn s2_three_fragment_relay_aborts_on_middle_failure() {
    let rpc = Arc::new(MockRpcClient::new(BmcLinkStatus::default()));
    rpc.set_submit_script(vec![
        Ok(()),
        Err(SubmitError::Other("node rejected fragment".to_string())),
    ])
    .await;
    let wallet = Arc::new(MockWallet::new());
    let (sender, mut results) = RpcSender::spawn(rpc.clone(), wallet, test_config());

    let rm = make_message(vec![9u8; 900_000]);
    let err = sender.relay(rm).await.unwrap_err();
    assert!(matches!(err, btp_relay_sender::SenderError::Rpc(_)));

    let submitted = rpc.submitted_transactions().await;
    assert_eq!(submitted.len(), 2, "submission stops after the failing fragment");

    let nothing = tokio::time::timeout(Duration::from_millis(50), results.recv()).await;
    assert!(nothing.is_err(), "no result should be emitted on abort");
}

#[tokio::test]
async fn s3_tx_pool_overflow_retries_without_resigning() {
    let rpc = Arc::new(MockRpcClient::new(BmcLinkStatus::default()));
    rpc.set_submit_script(vec![Err(SubmitError::PoolOverflow), Ok(())])
        .await;
    let wallet = Arc::new(MockWallet::new());
    let (sender, mut results) = RpcSender::spawn(rpc.clone(), wallet.clone(), test_config());

    let rm = make_message(vec![3u8; 1_000]);
    let id = sender.relay(rm).await.unwrap();

    assert_eq!(wallet.sign_call_count().await, 1, "no re-sign on pool overflow");
    let submitted = rpc.submitted_transactions().await;
    assert_eq!(submitted.len(), 2, "same signed tx resubmitted once");
    assert_eq!(submitted[0].hash, submitted[1].hash);

    rpc.set_result_script(
        submitted[0].hash.clone(),
        vec![Ok(TxResult {
            status: TxStatus::Success,
            failure_code: None,
        })],
    )
    .await;

    let result = tokio::time::timeout(Duration::from_secs(2), results.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.id, id);
    assert_eq!(result.outcome, RelayOutcome::Success);
}

#[tokio::test]
async fn s4_expired_then_duplicate_is_treated_as_success() {
    let rpc = Arc::new(MockRpcClient::new(BmcLinkStatus::default()));
    rpc.set_submit_script(vec![
        Err(SubmitError::System { sub_code: 10 }),
        Err(SubmitError::System { sub_code: 4 }),
    ])
    .await;
    let wallet = Arc::new(MockWallet::new());
    let (sender, mut results) = RpcSender::spawn(rpc.clone(), wallet.clone(), test_config());

    let rm = make_message(vec![1u8; 1_000]);
    let id = sender.relay(rm).await.unwrap();

    assert_eq!(
        wallet.sign_call_count().await,
        2,
        "expired transaction triggers a re-sign"
    );

    let submitted = rpc.submitted_transactions().await;
    let last_hash = submitted.last().unwrap().hash.clone();
    rpc.set_result_script(
        last_hash,
        vec![Ok(TxResult {
            status: TxStatus::Success,
            failure_code: None,
        })],
    )
    .await;

    let result = tokio::time::timeout(Duration::from_secs(2), results.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.id, id);
    assert_eq!(result.outcome, RelayOutcome::Success);
}

#[tokio::test]
async fn revert_result_is_mapped_to_normalized_code() {
    let rpc = Arc::new(MockRpcClient::new(BmcLinkStatus::default()));
    let wallet = Arc::new(MockWallet::new());
    let (sender, mut results) = RpcSender::spawn(rpc.clone(), wallet, test_config());

    let rm = make_message(vec![1u8; 10]);
    sender.relay(rm).await.unwrap();

    let submitted = rpc.submitted_transactions().await;
    rpc.set_result_script(
        submitted[0].hash.clone(),
        vec![Ok(TxResult {
            status: TxStatus::Failure,
            failure_code: Some(34),
        })],
    )
    .await;

    let result = tokio::time::timeout(Duration::from_secs(2), results.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.outcome, RelayOutcome::Revert(2));
}

#[tokio::test]
async fn pending_then_notfound_then_executing_keep_polling_until_final() {
    let rpc = Arc::new(MockRpcClient::new(BmcLinkStatus::default()));
    let wallet = Arc::new(MockWallet::new());
    let (sender, mut results) = RpcSender::spawn(rpc.clone(), wallet, test_config());

    let rm = make_message(vec![1u8; 10]);
    sender.relay(rm).await.unwrap();
    let submitted = rpc.submitted_transactions().await;
    rpc.set_result_script(
        submitted[0].hash.clone(),
        vec![
            Err(TxResultError::Pending),
            Err(TxResultError::Executing),
            Err(TxResultError::NotFound),
            Ok(TxResult {
                status: TxStatus::Success,
                failure_code: None,
            }),
        ],
    )
    .await;

    let result = tokio::time::timeout(Duration::from_secs(2), results.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.outcome, RelayOutcome::Success);
}

#[tokio::test]
async fn queue_full_returns_invalid_state() {
    let rpc = Arc::new(MockRpcClient::new(BmcLinkStatus::default()));
    let wallet = Arc::new(MockWallet::new());
    // No result script is registered for any hash, so every poll sees `NotFound` and keeps
    // retrying — the in-flight queue never drains.
    let (sender, _results) = RpcSender::spawn(rpc.clone(), wallet, test_config());

    for _ in 0..100 {
        sender.relay(make_message(vec![1u8; 10])).await.unwrap();
    }

    let err = sender.relay(make_message(vec![1u8; 10])).await.unwrap_err();
    assert_eq!(err, btp_relay_sender::SenderError::InvalidState);
}
