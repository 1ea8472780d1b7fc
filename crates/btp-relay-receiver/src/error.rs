use thiserror::Error;

/// Errors surfaced by a `Receiver` implementation.
///
/// These propagate to the Link's receiver-event consumer and, per the error design, are
/// treated as fatal: the process exits rather than silently continuing with a possibly
/// inconsistent view of the source chain.
#[derive(Debug, Error, Clone)]
pub enum ReceiverError {
    #[error("source chain RPC failed: {0}")]
    Rpc(String),

    #[error("failed to build block update: {0}")]
    BuildBlockUpdate(String),

    #[error("failed to build block proof: {0}")]
    BuildBlockProof(String),

    #[error("failed to build message proof: {0}")]
    BuildMessageProof(String),

    #[error("failed to serialize relay message: {0}")]
    BuildRelayMessage(String),

    #[error("receiver event stream closed unexpectedly")]
    StreamClosed,
}

pub type ReceiverResult<T> = Result<T, ReceiverError>;
