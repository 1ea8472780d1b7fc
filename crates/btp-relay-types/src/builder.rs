//! Accumulates items into size-bounded groups, one group per eventual relay message.

use crate::item::RelayMessageItem;

/// Partitions items into groups whenever appending would exceed a caller-supplied budget.
///
/// `size` always reflects the current (last) group's accumulated size; earlier groups are
/// already flushed to their own relay message by the time a new group is opened.
#[derive(Debug, Default)]
pub struct RelayMessageBuilder {
    pub groups: Vec<Vec<RelayMessageItem>>,
    pub size: i64,
}

impl RelayMessageBuilder {
    pub fn new() -> Self {
        Self {
            groups: vec![Vec::new()],
            size: 0,
        }
    }

    /// Re-initializes the builder with a single empty group, if it currently has none.
    pub fn ensure_group(&mut self) {
        if self.groups.is_empty() {
            self.groups.push(Vec::new());
        }
    }

    pub fn push(&mut self, item: RelayMessageItem) {
        self.ensure_group();
        self.size += item.len();
        self.groups
            .last_mut()
            .expect("ensure_group guarantees at least one group")
            .push(item);
    }

    /// Takes ownership of all accumulated groups and resets the builder to a single empty
    /// group with zero size, ready for the next relay message.
    pub fn take_groups(&mut self) -> Vec<Vec<RelayMessageItem>> {
        let groups = std::mem::replace(&mut self.groups, vec![Vec::new()]);
        self.size = 0;
        groups
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0 && self.groups.iter().all(|g| g.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::MessageProof;

    #[test]
    fn push_accumulates_size_in_current_group() {
        let mut b = RelayMessageBuilder::new();
        b.push(RelayMessageItem::MessageProof(MessageProof {
            rx_seq_delta: 1,
            payload_len: 10,
        }));
        b.push(RelayMessageItem::MessageProof(MessageProof {
            rx_seq_delta: 1,
            payload_len: 20,
        }));
        assert_eq!(b.size, 30);
        assert_eq!(b.groups.len(), 1);
        assert_eq!(b.groups[0].len(), 2);
    }

    #[test]
    fn take_groups_resets_builder() {
        let mut b = RelayMessageBuilder::new();
        b.push(RelayMessageItem::MessageProof(MessageProof {
            rx_seq_delta: 1,
            payload_len: 10,
        }));
        let groups = b.take_groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 1);
        assert!(b.is_empty());
        assert_eq!(b.size, 0);
    }
}
