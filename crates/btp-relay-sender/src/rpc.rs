//! Typed interfaces to the out-of-scope RPC client and wallet (§6 external interfaces).
//!
//! Neither has a concrete chain-specific implementation in this crate; [`mock`](crate::mock)
//! provides deterministic test doubles.

use async_trait::async_trait;
use btp_relay_types::BmcLinkStatus;

use crate::{
    errors::{SenderError, SubmitError, TxResultError},
    wire::UnsignedTx,
};

/// A transaction that has been signed and is ready to submit.
///
/// `hash` is computed by the wallet from the signed bytes, so it is already known before
/// the node ever sees the transaction — which is what lets the Sender treat a
/// `DuplicateTransaction` response as success using the hash it already has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTx {
    pub hash: String,
    pub raw: Vec<u8>,
}

/// Final status of a previously submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    Success,
    Failure,
}

/// The result of a completed transaction, as returned by `GetTransactionResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxResult {
    pub status: TxStatus,
    /// Present only when `status == Failure`.
    pub failure_code: Option<i64>,
}

/// Wallet abstraction: produces a signed transaction from an unsigned one.
#[async_trait]
pub trait Wallet: Send + Sync {
    async fn sign(&self, tx: &UnsignedTx) -> Result<SignedTx, SenderError>;
}

/// RPC client abstraction for the destination chain.
#[async_trait]
pub trait RpcClient: Send + Sync {
    /// `BMCGetStatusMethod`: queries the current link status for `target`.
    async fn get_status(&self, target: &str) -> Result<BmcLinkStatus, SenderError>;

    /// Submits an already-signed transaction.
    async fn send_transaction(&self, tx: &SignedTx) -> Result<(), SubmitError>;

    /// Polls the result of a previously submitted transaction.
    async fn get_transaction_result(&self, tx_hash: &str) -> Result<TxResult, TxResultError>;
}
