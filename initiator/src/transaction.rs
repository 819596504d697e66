use common::constants::RESERVED_TRANSACTION_ID;

/// Allocates the per-operation transaction ids: starts at 0, strictly
/// increases, never yields the reserved all-ones value, and wraps
/// `0xFFFF_FFFE -> 0`.
#[derive(Debug, Clone)]
pub struct TransactionSequencer {
    next: u32,
}

impl Default for TransactionSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionSequencer {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(id: u32) -> Self {
        Self {
            next: if id == RESERVED_TRANSACTION_ID { 0 } else { id },
        }
    }

    pub fn next(&mut self) -> u32 {
        let id = self.next;
        self.next = match id.wrapping_add(1) {
            RESERVED_TRANSACTION_ID => 0,
            next => next,
        };
        id
    }
}
