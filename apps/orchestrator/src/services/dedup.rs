// [apps/orchestrator/src/services/dedup.rs]
//! Per-subscriber dedup window (§4.1, §6.2): a bounded FIFO set
//! of event ids an SSE subscriber has already forwarded to its
//! client, so an event delivered twice (once from replay, once from
//! the live broadcast catching up) is only written to the wire once.

use std::collections::{HashSet, VecDeque};
use uuid::Uuid;

pub struct DedupWindow {
    capacity: usize,
    order: VecDeque<Uuid>,
    seen: HashSet<Uuid>,
}

impl DedupWindow {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, order: VecDeque::with_capacity(capacity), seen: HashSet::with_capacity(capacity) }
    }

    /// Returns `true` the first time `event_id` is seen, `false` on
    /// every subsequent call for the same id until it ages out.
    pub fn insert(&mut self, event_id: Uuid) -> bool {
        if !self.seen.insert(event_id) {
            return false;
        }
        self.order.push_back(event_id);
        if self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.seen.remove(&evicted);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sighting_passes_repeat_is_suppressed() {
        let mut window = DedupWindow::new(8);
        let id = Uuid::new_v4();
        assert!(window.insert(id));
        assert!(!window.insert(id));
    }

    #[test]
    fn eviction_makes_room_for_new_entries_past_capacity() {
        let mut window = DedupWindow::new(2);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        assert!(window.insert(a));
        assert!(window.insert(b));
        assert!(window.insert(c));
        // `a` aged out, so it is treated as unseen again.
        assert!(window.insert(a));
    }
}
