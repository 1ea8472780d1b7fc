//! The unit of work submitted to the destination chain.

use rand::Rng;

use crate::{item::RelayMessageItem, status::BmcLinkStatus};

/// A relay message ready for (or already undergoing) submission.
///
/// Once built, everything but `sending` is immutable: `bls` is the *post-apply* status the
/// destination is expected to report once it has accepted this message.
#[derive(Debug, Clone)]
pub struct RelayMessage {
    pub id: u64,
    pub bls: BmcLinkStatus,
    pub bp_height: i64,
    pub bytes: Vec<u8>,
    pub items: Vec<RelayMessageItem>,
    pub sending: bool,
}

impl RelayMessage {
    pub fn new(bls: BmcLinkStatus, bp_height: i64, bytes: Vec<u8>, items: Vec<RelayMessageItem>) -> Self {
        Self {
            id: rand::thread_rng().gen(),
            bls,
            bp_height,
            bytes,
            items,
            sending: false,
        }
    }

    /// Total serialized size of the relay message's payload.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
