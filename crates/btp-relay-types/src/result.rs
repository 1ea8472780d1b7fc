//! Outcomes reported back by the Sender for a previously submitted relay message.

/// Semantic outcome of a relay message, as reported by the Sender's result stream.
///
/// `Revert` carries the BMV failure code already normalized into the revert range
/// (`fc - failureCodeRevert`); `Failure` carries a raw, non-revert failure code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    Success,
    Revert(i64),
    Failure(i64),
}

/// A terminal (or near-terminal) observation about one previously submitted relay message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayResult {
    pub id: u64,
    pub outcome: RelayOutcome,
    pub finalized: bool,
}

impl RelayResult {
    pub fn success(id: u64, finalized: bool) -> Self {
        Self {
            id,
            outcome: RelayOutcome::Success,
            finalized,
        }
    }
}

/// A record of a submitted-but-not-yet-terminal transaction.
///
/// Present in the Sender's in-flight [`Queue`](crate) from successful submission until a
/// terminal [`RelayResult`] arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InflightRecord {
    pub id: u64,
    pub tx_hash: String,
}
