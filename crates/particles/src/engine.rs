use glam::Vec3;
use std::ops::Range;
use std::time::Duration;
use voxcast_common::{Color, Timestamp};

use crate::ring::{RingCursor, RingError};

/// Payload of one particle: it travels from `start` to `end` over its lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub start: Vec3,
    pub end: Vec3,
    pub color: Color,
}

impl Particle {
    const PARKED: Particle = Particle {
        start: Vec3::ZERO,
        end: Vec3::ZERO,
        color: Color::WHITE,
    };
}

/// Live slots to draw, in slot order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveSpans {
    Empty,
    Contiguous(Range<usize>),
    /// Live slots wrap past the end of the pool: draw `tail` then `head`.
    Wrapped { tail: Range<usize>, head: Range<usize> },
}

impl LiveSpans {
    /// Total live slots across both spans.
    pub fn len(&self) -> usize {
        match self {
            LiveSpans::Empty => 0,
            LiveSpans::Contiguous(r) => r.len(),
            LiveSpans::Wrapped { tail, head } => tail.len() + head.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slot indices in draw order.
    pub fn slots(&self) -> impl Iterator<Item = usize> + '_ {
        let (first, second) = match self {
            LiveSpans::Empty => (0..0, 0..0),
            LiveSpans::Contiguous(r) => (r.clone(), 0..0),
            LiveSpans::Wrapped { tail, head } => (tail.clone(), head.clone()),
        };
        first.chain(second)
    }
}

/// What the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleFrame {
    /// Shared animation phase in `[0, 1)`, cycling once per particle lifetime.
    pub phase: f32,
    pub spans: LiveSpans,
}

/// Fixed-capacity pool of short-lived particles.
///
/// Backing storage is allocated once at construction; spawning writes into the
/// slot handed out by the ring and pruning only moves cursors.
#[derive(Debug, Clone)]
pub struct ParticleEngine {
    ring: RingCursor,
    lifetime: Duration,
    epoch: Timestamp,
    expiries: Vec<Timestamp>,
    particles: Vec<Particle>,
    last_expiry: Timestamp,
}

impl ParticleEngine {
    /// Create a pool of `capacity` slots. `epoch` anchors the shared animation phase.
    pub fn new(capacity: usize, lifetime: Duration, epoch: Timestamp) -> Result<Self, RingError> {
        let ring = RingCursor::new(capacity)?;
        Ok(Self {
            ring,
            lifetime,
            epoch,
            expiries: vec![Timestamp::ZERO; capacity],
            particles: vec![Particle::PARKED; capacity],
            last_expiry: Timestamp::ZERO,
        })
    }

    /// Maximum number of live particles.
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// How long each particle lives.
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Particles admitted and not yet pruned.
    pub fn live_count(&self) -> usize {
        self.ring.len()
    }

    /// Payload stored in `slot`. Only meaningful for slots listed by [`ParticleEngine::present`].
    pub fn slot(&self, slot: usize) -> Option<&Particle> {
        self.particles.get(slot)
    }

    /// Entire backing storage, indexed by slot.
    pub fn slots(&self) -> &[Particle] {
        &self.particles
    }

    /// Admit a particle. Returns its slot, or `None` when the pool is full.
    ///
    /// Expiry is clamped to never precede the previous admission's, so a
    /// timestamp arriving out of order cannot break FIFO aging.
    pub fn spawn(&mut self, start: Vec3, end: Vec3, color: Color, now: Timestamp) -> Option<usize> {
        let slot = self.ring.claim()?;
        let expiry = (now + self.lifetime).max(self.last_expiry);
        self.last_expiry = expiry;
        self.expiries[slot] = expiry;
        self.particles[slot] = Particle { start, end, color };
        Some(slot)
    }

    /// Reclaim every particle whose expiry is at or before `now`. Returns how many were removed.
    pub fn prune(&mut self, now: Timestamp) -> usize {
        let mut removed = 0;
        while let Some(oldest) = self.ring.oldest() {
            if self.expiries[oldest] > now {
                break;
            }
            if self.ring.reclaim_oldest().is_err() {
                break;
            }
            removed += 1;
        }
        if removed > 0 {
            tracing::trace!(removed, live = self.ring.len(), "particles pruned");
        }
        removed
    }

    /// Phase and live slot spans for the current frame.
    pub fn present(&self, now: Timestamp) -> ParticleFrame {
        let lifetime_ms = self.lifetime.as_millis().max(1);
        let elapsed_ms = now.saturating_since(self.epoch).as_millis();
        let phase = (elapsed_ms % lifetime_ms) as f32 / lifetime_ms as f32;

        let capacity = self.ring.capacity();
        let spans = match (self.ring.oldest(), self.ring.first_free()) {
            (None, _) => LiveSpans::Empty,
            // Every slot is live wherever the oldest sits.
            (Some(_), None) => LiveSpans::Contiguous(0..capacity),
            (Some(used), Some(free)) if used < free => LiveSpans::Contiguous(used..free),
            (Some(used), Some(0)) => LiveSpans::Contiguous(used..capacity),
            (Some(used), Some(free)) => LiveSpans::Wrapped {
                tail: used..capacity,
                head: 0..free,
            },
        };
        ParticleFrame { phase, spans }
    }

    /// Drop every live particle.
    pub fn clear(&mut self) {
        self.ring.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIFE: Duration = Duration::from_millis(500);

    fn engine(capacity: usize) -> ParticleEngine {
        ParticleEngine::new(capacity, LIFE, Timestamp::ZERO).unwrap()
    }

    fn spawn_at(e: &mut ParticleEngine, ms: u64) -> Option<usize> {
        e.spawn(Vec3::ZERO, Vec3::Z, Color::WHITE, Timestamp(ms))
    }

    #[test]
    fn rejects_tiny_pools() {
        assert!(ParticleEngine::new(1, LIFE, Timestamp::ZERO).is_err());
    }

    #[test]
    fn full_pool_drops_silently() {
        let mut e = engine(2);
        assert_eq!(spawn_at(&mut e, 0), Some(0));
        assert_eq!(spawn_at(&mut e, 0), Some(1));
        assert_eq!(spawn_at(&mut e, 0), None);
        assert_eq!(e.live_count(), 2);
    }

    #[test]
    fn spawn_writes_payload_into_slot() {
        let mut e = engine(4);
        let slot = e
            .spawn(Vec3::ONE, Vec3::splat(2.0), Color::EMBER, Timestamp(10))
            .unwrap();
        let p = e.slot(slot).unwrap();
        assert_eq!(p.start, Vec3::ONE);
        assert_eq!(p.end, Vec3::splat(2.0));
        assert_eq!(p.color, Color::EMBER);
    }

    #[test]
    fn particles_expire_in_admission_order() {
        let mut e = engine(8);
        spawn_at(&mut e, 0);
        spawn_at(&mut e, 100);
        spawn_at(&mut e, 200);

        assert_eq!(e.prune(Timestamp(499)), 0);
        assert_eq!(e.prune(Timestamp(500)), 1);
        assert_eq!(e.live_count(), 2);
        assert_eq!(e.prune(Timestamp(650)), 1);
        assert_eq!(e.prune(Timestamp(700)), 1);
        assert_eq!(e.live_count(), 0);
        assert_eq!(e.prune(Timestamp(10_000)), 0);
    }

    #[test]
    fn out_of_order_timestamps_keep_fifo_aging() {
        let mut e = engine(4);
        spawn_at(&mut e, 300);
        spawn_at(&mut e, 100);
        // The second particle inherits the first one's expiry.
        assert_eq!(e.prune(Timestamp(600)), 0);
        assert_eq!(e.prune(Timestamp(800)), 2);
    }

    #[test]
    fn pruning_frees_capacity() {
        let mut e = engine(2);
        spawn_at(&mut e, 0);
        spawn_at(&mut e, 0);
        assert_eq!(spawn_at(&mut e, 0), None);
        e.prune(Timestamp(500));
        assert_eq!(spawn_at(&mut e, 600), Some(0));
    }

    #[test]
    fn present_empty_pool() {
        let e = engine(4);
        assert_eq!(e.present(Timestamp(0)).spans, LiveSpans::Empty);
    }

    #[test]
    fn present_full_pool_is_one_span() {
        let mut e = engine(3);
        for _ in 0..3 {
            spawn_at(&mut e, 0);
        }
        assert_eq!(e.present(Timestamp(0)).spans, LiveSpans::Contiguous(0..3));
    }

    #[test]
    fn present_partial_pool_before_wrap() {
        let mut e = engine(4);
        spawn_at(&mut e, 0);
        spawn_at(&mut e, 10);
        spawn_at(&mut e, 20);
        e.prune(Timestamp(500));
        assert_eq!(e.present(Timestamp(500)).spans, LiveSpans::Contiguous(1..3));
    }

    #[test]
    fn present_wrapped_pool_splits_tail_then_head() {
        let mut e = engine(4);
        for ms in [0, 10, 20] {
            spawn_at(&mut e, ms);
        }
        e.prune(Timestamp(510));
        // used = 2, free = 3
        spawn_at(&mut e, 600);
        spawn_at(&mut e, 600);
        // used = 2, free = 1
        let spans = e.present(Timestamp(600)).spans;
        assert_eq!(
            spans,
            LiveSpans::Wrapped {
                tail: 2..4,
                head: 0..1,
            }
        );
        assert_eq!(spans.slots().collect::<Vec<_>>(), vec![2, 3, 0]);
        assert_eq!(spans.len(), e.live_count());
    }

    #[test]
    fn present_wrapped_with_empty_head_is_contiguous() {
        let mut e = engine(4);
        for ms in [0, 10, 20, 30] {
            spawn_at(&mut e, ms);
        }
        e.prune(Timestamp(510));
        // used = 2, free = 0
        assert_eq!(e.present(Timestamp(510)).spans, LiveSpans::Contiguous(2..4));
    }

    #[test]
    fn full_pool_starting_mid_ring_is_one_span() {
        let mut e = engine(3);
        for ms in [0, 10, 20] {
            spawn_at(&mut e, ms);
        }
        e.prune(Timestamp(500));
        spawn_at(&mut e, 600);
        // used = 1, full
        assert_eq!(e.ring.oldest(), Some(1));
        assert_eq!(e.present(Timestamp(600)).spans, LiveSpans::Contiguous(0..3));
    }

    #[test]
    fn phase_cycles_with_lifetime() {
        let e = ParticleEngine::new(4, LIFE, Timestamp(1000)).unwrap();
        assert_eq!(e.present(Timestamp(1000)).phase, 0.0);
        assert_eq!(e.present(Timestamp(1250)).phase, 0.5);
        assert_eq!(e.present(Timestamp(1500)).phase, 0.0);
        assert_eq!(e.present(Timestamp(500)).phase, 0.0);
    }
}
