use btp_relay_types::{BmcLinkStatus, ReceiveStatus, RelayMessage, RelayMessageBuilder};

/// Coordinator run state (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Running,
    Pending,
}

/// Everything guarded by [`crate::Link`]'s single lock: `rms`, `rss`, `builder`, `bls` and
/// `relayState`, held at the granularity of `HandleRelayMessage` and `result` (§5).
pub struct LinkState {
    pub relay_state: RelayState,
    pub bls: BmcLinkStatus,
    pub rms: Vec<RelayMessage>,
    pub rss: Vec<ReceiveStatus>,
    pub builder: RelayMessageBuilder,
    /// Set once the first receiver event has run undelivered-recovery.
    pub recovered: bool,
}

impl LinkState {
    pub fn new(bls: BmcLinkStatus) -> Self {
        Self {
            relay_state: RelayState::Running,
            bls,
            rms: Vec::new(),
            rss: Vec::new(),
            builder: RelayMessageBuilder::new(),
            recovered: false,
        }
    }
}

/// Drops every entry up to and including the first one matched by `pred`.
///
/// `removeRelayMessage` (BMVAlreadyVerified) resolves to this shape: `pred` identifies a
/// single message by id, so its first (and only) match is the entry to drop, along with
/// every height-ordered predecessor (§9 design notes).
pub fn drain_through<T>(items: &mut Vec<T>, pred: impl Fn(&T) -> bool) {
    if let Some(idx) = items.iter().position(pred) {
        items.drain(0..=idx);
    }
}

/// Drops every entry up to and including the *last* one matched by `pred`.
///
/// `clearRelayMessage` (successFlow / `BMVNotVerifiable` resync pruning) resolves to this
/// shape instead: `pred` is "covered by the applied status," which can match a whole prefix
/// of `rms`/`rss` when one applied status covers several outstanding entries. Draining
/// through only the first match would leave every covered entry after it stuck forever
/// (§3's lifecycle, §4.3.6, §9 design notes).
pub fn drain_through_covered<T>(items: &mut Vec<T>, pred: impl Fn(&T) -> bool) {
    if let Some(idx) = items.iter().rposition(pred) {
        items.drain(0..=idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_through_removes_up_to_first_match_only() {
        let mut ids = vec![1, 2, 3, 4, 5];
        drain_through(&mut ids, |id| *id == 3);
        assert_eq!(ids, vec![4, 5]);
    }

    #[test]
    fn drain_through_covered_removes_up_to_last_match() {
        // A single applied status can cover several outstanding entries at once; the first
        // three are all "covered", not just the oldest one.
        let covered = [true, true, true, false, false];
        let mut items: Vec<usize> = (0..covered.len()).collect();
        drain_through_covered(&mut items, |&i| covered[i]);
        assert_eq!(items, vec![3, 4]);
    }

    #[test]
    fn drain_through_covered_is_noop_when_nothing_matches() {
        let mut items = vec![1, 2, 3];
        drain_through_covered(&mut items, |_| false);
        assert_eq!(items, vec![1, 2, 3]);
    }
}
