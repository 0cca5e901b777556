/// Misuse of a [`RingCursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RingError {
    #[error("ring capacity must be at least 2, got {0}")]
    CapacityTooSmall(usize),
    #[error("cannot reclaim from an empty ring")]
    Empty,
}

/// Storage-agnostic circular slot allocator.
///
/// Tracks only the oldest used slot and the next free slot; callers keep any
/// parallel arrays indexed by the slots it hands out. `used == None` means the
/// ring is empty and `free == None` means it is full; both never hold at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingCursor {
    capacity: usize,
    used: Option<usize>,
    free: Option<usize>,
}

impl RingCursor {
    /// Rings smaller than two slots are rejected.
    pub fn new(capacity: usize) -> Result<Self, RingError> {
        if capacity < 2 {
            return Err(RingError::CapacityTooSmall(capacity));
        }
        Ok(Self {
            capacity,
            used: None,
            free: Some(0),
        })
    }

    /// Fixed slot count.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest live slot, or `None` when empty.
    pub fn oldest(&self) -> Option<usize> {
        self.used
    }

    /// Slot the next claim will return, or `None` when full.
    pub fn first_free(&self) -> Option<usize> {
        self.free
    }

    /// No slot is claimed.
    pub fn is_empty(&self) -> bool {
        self.used.is_none()
    }

    /// Every slot is claimed.
    pub fn is_full(&self) -> bool {
        self.free.is_none()
    }

    /// Number of claimed slots.
    pub fn len(&self) -> usize {
        match (self.used, self.free) {
            (None, _) => 0,
            (Some(_), None) => self.capacity,
            (Some(used), Some(free)) => (free + self.capacity - used) % self.capacity,
        }
    }

    fn wrap(&self, slot: usize) -> usize {
        (slot + 1) % self.capacity
    }

    /// Claim the next slot in FIFO order; `None` when the ring is full.
    pub fn claim(&mut self) -> Option<usize> {
        let slot = self.free?;
        if self.used.is_none() {
            self.used = Some(slot);
        }
        let next = self.wrap(slot);
        self.free = if Some(next) == self.used { None } else { Some(next) };
        Some(slot)
    }

    /// Release the oldest live slot. Returns the new oldest slot, `None` once the ring drains.
    pub fn reclaim_oldest(&mut self) -> Result<Option<usize>, RingError> {
        let oldest = self.used.ok_or(RingError::Empty)?;
        if self.free.is_none() {
            self.free = Some(oldest);
        }
        let next = self.wrap(oldest);
        self.used = if Some(next) == self.free { None } else { Some(next) };
        Ok(self.used)
    }

    /// Forget every live slot, restarting allocation at slot 0.
    pub fn clear(&mut self) {
        self.used = None;
        self.free = Some(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiny_capacities_are_rejected() {
        assert_eq!(RingCursor::new(0), Err(RingError::CapacityTooSmall(0)));
        assert_eq!(RingCursor::new(1), Err(RingError::CapacityTooSmall(1)));
        assert!(RingCursor::new(2).is_ok());
    }

    #[test]
    fn capacity_three_claims_then_reports_full() {
        let mut r = RingCursor::new(3).unwrap();
        assert_eq!(r.claim(), Some(0));
        assert_eq!(r.claim(), Some(1));
        assert_eq!(r.claim(), Some(2));
        assert!(r.is_full());
        assert_eq!(r.claim(), None);
        assert_eq!(r.len(), 3);
    }

    #[test]
    fn reclaim_walks_oldest_forward_until_empty() {
        let mut r = RingCursor::new(3).unwrap();
        for _ in 0..3 {
            r.claim();
        }
        assert_eq!(r.reclaim_oldest(), Ok(Some(1)));
        assert_eq!(r.reclaim_oldest(), Ok(Some(2)));
        assert_eq!(r.reclaim_oldest(), Ok(None));
        assert!(r.is_empty());
        assert_eq!(r.reclaim_oldest(), Err(RingError::Empty));
    }

    #[test]
    fn drained_ring_wraps_instead_of_growing() {
        let mut r = RingCursor::new(3).unwrap();
        for _ in 0..3 {
            r.claim();
        }
        while r.reclaim_oldest().unwrap().is_some() {}
        assert_eq!(r.claim(), Some(0));
    }

    #[test]
    fn never_empty_and_full_at_once() {
        let mut r = RingCursor::new(4).unwrap();
        for round in 0..20 {
            if round % 3 == 2 {
                let _ = r.reclaim_oldest();
            } else {
                r.claim();
            }
            assert!(!(r.is_empty() && r.is_full()));
        }
    }

    #[test]
    fn claims_continue_after_partial_reclaim() {
        let mut r = RingCursor::new(4).unwrap();
        for _ in 0..4 {
            r.claim();
        }
        assert_eq!(r.reclaim_oldest(), Ok(Some(1)));
        // The freed slot 0 becomes the next claim.
        assert_eq!(r.first_free(), Some(0));
        assert_eq!(r.claim(), Some(0));
        assert!(r.is_full());
        assert_eq!(r.oldest(), Some(1));
    }

    #[test]
    fn len_tracks_wrapped_layouts() {
        let mut r = RingCursor::new(4).unwrap();
        for _ in 0..3 {
            r.claim();
        }
        r.reclaim_oldest().unwrap();
        r.reclaim_oldest().unwrap();
        r.claim();
        r.claim();
        // used = 2, free = 1
        assert_eq!(r.oldest(), Some(2));
        assert_eq!(r.first_free(), Some(1));
        assert_eq!(r.len(), 3);
        r.clear();
        assert!(r.is_empty());
        assert_eq!(r.claim(), Some(0));
    }
}
