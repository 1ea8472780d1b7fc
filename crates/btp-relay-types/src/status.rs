//! The link status shared between the destination chain and the local relay state.

use serde::{Deserialize, Serialize};

/// Verifier-side view of the source chain, as tracked by the destination's BMV.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Verifier {
    /// Last block height the verifier has accepted.
    pub height: i64,

    /// Opaque verifier extra data (e.g. MTA state), carried forward by block updates.
    pub extra: Vec<u8>,
}

/// Authoritative link status as reported by the destination's BMC contract.
///
/// `rx_seq` is monotonically non-decreasing over the life of a link; every
/// [`RelayMessageItem`](crate::RelayMessageItem) advances it by a well-defined amount.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BmcLinkStatus {
    pub tx_seq: u64,
    pub rx_seq: u64,
    pub verifier: Verifier,
}

/// A receiver-side observation of newly visible source-chain state.
///
/// Produced in height-ascending order by the `Receiver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiveStatus {
    pub height: i64,
    pub seq: i64,
    /// Magnitude of messages that became visible since the previous observation.
    ///
    /// The sign of the underlying subtraction is an artifact of the receiver's cursor
    /// convention; callers use this as a count, never as a signed delta.
    pub msg_cnt: i64,
}

impl ReceiveStatus {
    pub fn new(height: i64, seq: i64, msg_cnt: i64) -> Self {
        Self {
            height,
            seq,
            msg_cnt,
        }
    }
}
