//! The three kinds of payload composed into a relay message.

use crate::status::BmcLinkStatus;

/// A new block header (and whatever witness the verifier needs to accept it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockUpdate {
    /// Height this update advances the verifier to.
    pub next_height: i64,
    /// Opaque verifier extra data after applying this update.
    pub next_extra: Vec<u8>,
    /// `rxSeq` delta this update carries (messages it proves, if any are bundled in).
    pub rx_seq_delta: u64,
    /// Serialized size, in bytes, once this item is encoded into a relay message.
    pub payload_len: i64,
    /// Height a block proof is still required for, or `-1` if this update already proves
    /// itself.
    pub proof_height: i64,
}

/// A proof witnessing a specific height, without advancing the verifier height itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockProof {
    pub height: i64,
    pub payload_len: i64,
}

/// A cross-chain message with inclusion evidence, advancing `rxSeq`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageProof {
    pub rx_seq_delta: u64,
    pub payload_len: i64,
}

/// One of the three payload kinds a relay message is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayMessageItem {
    BlockUpdate(BlockUpdate),
    BlockProof(BlockProof),
    MessageProof(MessageProof),
}

impl RelayMessageItem {
    /// Serialized length of this item, in bytes.
    pub fn len(&self) -> i64 {
        match self {
            RelayMessageItem::BlockUpdate(bu) => bu.payload_len,
            RelayMessageItem::BlockProof(bp) => bp.payload_len,
            RelayMessageItem::MessageProof(mp) => mp.payload_len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Height a block proof is still outstanding for, or `-1` if none (only block updates
    /// carry this; other item kinds never require a follow-up proof).
    pub fn proof_height(&self) -> i64 {
        match self {
            RelayMessageItem::BlockUpdate(bu) => bu.proof_height,
            _ => -1,
        }
    }

    /// Applies this item's effect to a link status, advancing height/rxSeq/extra in place.
    pub fn update_bmc_link_status(&self, status: &mut BmcLinkStatus) {
        match self {
            RelayMessageItem::BlockUpdate(bu) => {
                status.verifier.height = bu.next_height;
                status.verifier.extra = bu.next_extra.clone();
                status.rx_seq += bu.rx_seq_delta;
            }
            RelayMessageItem::BlockProof(_) => {}
            RelayMessageItem::MessageProof(mp) => {
                status.rx_seq += mp.rx_seq_delta;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_update_advances_height_extra_and_rx_seq() {
        let item = RelayMessageItem::BlockUpdate(BlockUpdate {
            next_height: 42,
            next_extra: vec![1, 2, 3],
            rx_seq_delta: 5,
            payload_len: 128,
            proof_height: -1,
        });

        let mut bls = BmcLinkStatus::default();
        item.update_bmc_link_status(&mut bls);

        assert_eq!(bls.verifier.height, 42);
        assert_eq!(bls.verifier.extra, vec![1, 2, 3]);
        assert_eq!(bls.rx_seq, 5);
    }

    #[test]
    fn block_proof_does_not_advance_rx_seq_or_height() {
        let item = RelayMessageItem::BlockProof(BlockProof {
            height: 10,
            payload_len: 64,
        });

        let mut bls = BmcLinkStatus {
            tx_seq: 0,
            rx_seq: 3,
            verifier: super::super::status::Verifier {
                height: 9,
                extra: vec![],
            },
        };
        let before = bls.clone();
        item.update_bmc_link_status(&mut bls);
        assert_eq!(bls, before);
    }

    #[test]
    fn message_proof_advances_only_rx_seq() {
        let item = RelayMessageItem::MessageProof(MessageProof {
            rx_seq_delta: 2,
            payload_len: 32,
        });
        let mut bls = BmcLinkStatus::default();
        item.update_bmc_link_status(&mut bls);
        assert_eq!(bls.rx_seq, 2);
        assert_eq!(bls.verifier.height, 0);
    }
}
