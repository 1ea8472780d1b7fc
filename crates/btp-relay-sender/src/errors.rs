use thiserror::Error;

/// Errors the Sender surfaces to the Link.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SenderError {
    /// The in-flight queue is at capacity; the Link should transition to `PENDING`.
    #[error("invalid state: in-flight queue is full")]
    InvalidState,

    /// Transport-level RPC failure that is not one of the recognized transient conditions.
    #[error("rpc error: {0}")]
    Rpc(String),

    /// The wallet failed to produce a signature.
    #[error("signing error: {0}")]
    Sign(String),
}

pub type SenderResult<T> = Result<T, SenderError>;

/// Errors returned by [`crate::RpcClient::send_transaction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The destination's transaction pool is full; retry the same signed transaction later.
    PoolOverflow,
    /// A system-level revert, carrying the sub-code parsed from the error message.
    System { sub_code: i32 },
    /// Anything else; propagated to the caller as a mapped [`SenderError::Rpc`].
    Other(String),
}

/// Errors returned by [`crate::RpcClient::get_transaction_result`] while a result is not yet
/// final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxResultError {
    Pending,
    Executing,
    NotFound,
    Other(String),
}
