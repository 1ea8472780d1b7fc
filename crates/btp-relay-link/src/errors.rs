use btp_relay_receiver::ReceiverError;
use btp_relay_sender::SenderError;
use thiserror::Error;

/// Errors surfaced out of the Link coordinator.
///
/// [`LinkError::Fatal`] mirrors the source's "any other BMV code aborts the process" rule:
/// the binary is expected to log it and exit rather than attempt to recover.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("sender error: {0}")]
    Sender(#[from] SenderError),

    #[error("receiver error: {0}")]
    Receiver(#[from] ReceiverError),

    /// Sentinel used internally to unwind out of `sendRelayMessage` on queue-full; never
    /// escapes the coordinator.
    #[error("relay queue is full")]
    QueueFull,

    #[error("receiver produced no block update after repeated attempts")]
    BuildBlockUpdateExhausted,

    #[error("fatal verifier error: {0}")]
    Fatal(String),
}

pub type LinkResult<T> = Result<T, LinkError>;
