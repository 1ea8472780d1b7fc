//! Deterministic `RpcClient`/`Wallet` test doubles, scripted response-by-response.

use std::collections::HashMap;

use async_trait::async_trait;
use btp_relay_types::BmcLinkStatus;
use tokio::sync::Mutex;

use crate::{
    errors::{SenderError, SubmitError, TxResultError},
    rpc::{RpcClient, SignedTx, TxResult, Wallet},
    wire::UnsignedTx,
};

/// A wallet that signs deterministically, incrementing a call counter each time so tests can
/// assert how many times (re-)signing actually happened.
#[derive(Default)]
pub struct MockWallet {
    sign_calls: Mutex<u64>,
}

impl MockWallet {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sign_call_count(&self) -> u64 {
        *self.sign_calls.lock().await
    }
}

#[async_trait]
impl Wallet for MockWallet {
    async fn sign(&self, tx: &UnsignedTx) -> Result<SignedTx, SenderError> {
        let mut calls = self.sign_calls.lock().await;
        *calls += 1;
        let hash = format!(
            "0x{:016x}{:04x}",
            simple_hash(&tx.messages_b64url, tx.index_hex.as_deref()),
            *calls
        );
        Ok(SignedTx {
            hash,
            raw: tx.messages_b64url.clone().into_bytes(),
        })
    }
}

fn simple_hash(payload: &str, index_hex: Option<&str>) -> u64 {
    let mut h: u64 = 1469598103934665603;
    for b in payload.bytes().chain(index_hex.unwrap_or("").bytes()) {
        h ^= b as u64;
        h = h.wrapping_mul(1099511628211);
    }
    h
}

/// A script of responses to replay in order, repeating the last entry once exhausted.
struct Script<T> {
    entries: Vec<T>,
    next: usize,
}

impl<T: Clone> Script<T> {
    fn new(entries: Vec<T>) -> Self {
        Self { entries, next: 0 }
    }

    fn take(&mut self) -> T {
        let idx = self.next.min(self.entries.len() - 1);
        self.next += 1;
        self.entries[idx].clone()
    }
}

/// A scripted RPC client test double.
pub struct MockRpcClient {
    status: Mutex<BmcLinkStatus>,
    submit_script: Mutex<Script<Result<(), SubmitError>>>,
    submitted: Mutex<Vec<SignedTx>>,
    result_scripts: Mutex<HashMap<String, Script<Result<TxResult, TxResultError>>>>,
}

impl MockRpcClient {
    pub fn new(status: BmcLinkStatus) -> Self {
        Self {
            status: Mutex::new(status),
            submit_script: Mutex::new(Script::new(vec![Ok(())])),
            submitted: Mutex::new(Vec::new()),
            result_scripts: Mutex::new(HashMap::new()),
        }
    }

    /// Replaces the scripted sequence of `send_transaction` responses.
    pub async fn set_submit_script(&self, entries: Vec<Result<(), SubmitError>>) {
        *self.submit_script.lock().await = Script::new(entries);
    }

    /// Registers the scripted sequence of `get_transaction_result` responses for a hash.
    pub async fn set_result_script(
        &self,
        tx_hash: impl Into<String>,
        entries: Vec<Result<TxResult, TxResultError>>,
    ) {
        self.result_scripts
            .lock()
            .await
            .insert(tx_hash.into(), Script::new(entries));
    }

    pub async fn set_status(&self, status: BmcLinkStatus) {
        *self.status.lock().await = status;
    }

    pub async fn submitted_transactions(&self) -> Vec<SignedTx> {
        self.submitted.lock().await.clone()
    }
}

#[async_trait]
impl RpcClient for MockRpcClient {
    async fn get_status(&self, _target: &str) -> Result<BmcLinkStatus, SenderError> {
        Ok(self.status.lock().await.clone())
    }

    async fn send_transaction(&self, tx: &SignedTx) -> Result<(), SubmitError> {
        self.submitted.lock().await.push(tx.clone());
        self.submit_script.lock().await.take()
    }

    async fn get_transaction_result(&self, tx_hash: &str) -> Result<TxResult, TxResultError> {
        let mut scripts = self.result_scripts.lock().await;
        match scripts.get_mut(tx_hash) {
            Some(script) => script.take(),
            None => Err(TxResultError::NotFound),
        }
    }
}
