use glam::Vec3;
use std::collections::BTreeMap;
use std::time::Duration;
use voxcast_cache::WorldCache;
use voxcast_common::{Entity, EntityId, Passive, PassiveId, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GhostError {
    #[error("{0} is not cached")]
    UnknownEntity(EntityId),
    #[error("{0} is not cached")]
    UnknownPassive(PassiveId),
}

#[derive(Debug, Clone)]
struct Ghost<T> {
    state: T,
    origin: Vec3,
    target: Vec3,
    started: Timestamp,
    ends: Timestamp,
}

/// Where a ghost should be drawn at some instant. Look its terminal state up
/// through [`GhostSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhostView<K> {
    pub id: K,
    pub position: Vec3,
    /// Fraction of the decay window elapsed, in `[0, 1)`.
    pub progress: f32,
}

/// Time-windowed set of decaying stand-ins, keyed by id.
#[derive(Debug, Clone)]
pub struct DecaySet<K, T> {
    window: Duration,
    ghosts: BTreeMap<K, Ghost<T>>,
}

impl<K: Ord + Copy, T> DecaySet<K, T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            ghosts: BTreeMap::new(),
        }
    }

    /// Length of the decay window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Number of ghosts still held, including any already past their window.
    pub fn len(&self) -> usize {
        self.ghosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ghosts.is_empty()
    }

    /// Start decaying `state` from `origin` toward `target`. Replaces any ghost with the same id.
    pub fn insert(&mut self, id: K, state: T, origin: Vec3, target: Vec3, now: Timestamp) {
        self.ghosts.insert(
            id,
            Ghost {
                state,
                origin,
                target,
                started: now,
                ends: now + self.window,
            },
        );
    }

    /// Terminal state captured for `id`.
    pub fn state(&self, id: K) -> Option<&T> {
        self.ghosts.get(&id).map(|g| &g.state)
    }

    /// Drop ghosts whose window has elapsed and refill `out` with the survivors
    /// interpolated at `now`, in id order.
    ///
    /// Apart from eviction this is read-only: the same `now` yields the same views.
    /// `out` keeps its capacity, so a warm buffer does not allocate.
    pub fn prune_into(&mut self, now: Timestamp, out: &mut Vec<GhostView<K>>) {
        self.ghosts.retain(|_, g| now < g.ends);
        let window_ms = self.window.as_millis().max(1) as f32;
        out.clear();
        out.extend(self.ghosts.iter().map(|(&id, g)| {
            let progress = now.saturating_since(g.started).as_millis() as f32 / window_ms;
            GhostView {
                id,
                position: g.origin.lerp(g.target, progress),
                progress,
            }
        }));
    }
}

/// Both ghost sets interpolated at one instant.
#[derive(Debug, Clone, Copy)]
pub struct GhostSnapshot<'a> {
    pub passives: &'a [GhostView<PassiveId>],
    pub entities: &'a [GhostView<EntityId>],
    passive_states: &'a DecaySet<PassiveId, Passive>,
    entity_states: &'a DecaySet<EntityId, Entity>,
}

impl<'a> GhostSnapshot<'a> {
    /// Last known state of a picked-up passive.
    pub fn passive_state(&self, id: PassiveId) -> Option<&'a Passive> {
        self.passive_states.state(id)
    }

    /// Last known state of a killed entity.
    pub fn entity_state(&self, id: EntityId) -> Option<&'a Entity> {
        self.entity_states.state(id)
    }
}

/// Keeps picked-up passives and killed entities visible while they animate out.
#[derive(Debug, Clone)]
pub struct GhostManager {
    passives: DecaySet<PassiveId, Passive>,
    entities: DecaySet<EntityId, Entity>,
    passive_views: Vec<GhostView<PassiveId>>,
    entity_views: Vec<GhostView<EntityId>>,
    settle_fraction: f32,
}

impl GhostManager {
    /// `settle_fraction` is how much of its own height a dead entity sinks by.
    pub fn new(pickup_window: Duration, death_window: Duration, settle_fraction: f32) -> Self {
        Self {
            passives: DecaySet::new(pickup_window),
            entities: DecaySet::new(death_window),
            passive_views: Vec::new(),
            entity_views: Vec::new(),
            settle_fraction,
        }
    }

    /// Snapshot a passive being picked up; it flies toward the picker's centroid.
    ///
    /// Must run before the cache drops the passive.
    pub fn on_passive_picked_up(
        &mut self,
        cache: &WorldCache,
        now: Timestamp,
        passive: PassiveId,
        picker: EntityId,
    ) -> Result<(), GhostError> {
        let state = cache
            .passive(passive)
            .ok_or(GhostError::UnknownPassive(passive))?;
        let target = cache
            .centre_of_entity(picker)
            .ok_or(GhostError::UnknownEntity(picker))?;
        tracing::debug!(%passive, %picker, "passive ghost started");
        self.passives
            .insert(passive, state.clone(), state.position, target, now);
        Ok(())
    }

    /// Snapshot an entity being killed; it sinks into the ground in place.
    ///
    /// Must run before the cache drops the entity.
    pub fn on_entity_killed(
        &mut self,
        cache: &WorldCache,
        now: Timestamp,
        entity: EntityId,
    ) -> Result<(), GhostError> {
        let state = cache
            .any_entity(entity)
            .ok_or(GhostError::UnknownEntity(entity))?;
        let origin = state.position;
        let target = origin - Vec3::Z * (state.volume().z * self.settle_fraction);
        tracing::debug!(%entity, "entity ghost started");
        self.entities.insert(entity, state.clone(), origin, target, now);
        Ok(())
    }

    pub fn passive_ghosts(&mut self, now: Timestamp) -> &[GhostView<PassiveId>] {
        self.passives.prune_into(now, &mut self.passive_views);
        &self.passive_views
    }

    pub fn entity_ghosts(&mut self, now: Timestamp) -> &[GhostView<EntityId>] {
        self.entities.prune_into(now, &mut self.entity_views);
        &self.entity_views
    }

    /// Prune both sets and interpolate the survivors at `now` into reused buffers.
    pub fn prune_and_snapshot(&mut self, now: Timestamp) -> GhostSnapshot<'_> {
        self.passives.prune_into(now, &mut self.passive_views);
        self.entities.prune_into(now, &mut self.entity_views);
        GhostSnapshot {
            passives: &self.passive_views,
            entities: &self.entity_views,
            passive_states: &self.passives,
            entity_states: &self.entities,
        }
    }

    /// Ghosts held in both sets.
    pub fn ghost_count(&self) -> usize {
        self.passives.len() + self.entities.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxcast_common::{EntityKind, PassiveKind};

    const PICKUP: Duration = Duration::from_millis(300);
    const DEATH: Duration = Duration::from_millis(1000);

    fn approx_eq(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    fn manager() -> GhostManager {
        GhostManager::new(PICKUP, DEATH, 0.5)
    }

    /// Cache holding an item at the origin and a picker whose centroid is (1.2, 1.2, 1.86).
    fn pickup_cache() -> WorldCache {
        let local = Entity::new(EntityId(1), EntityKind::Player, Vec3::new(0.8, 0.8, 0.96));
        let mut cache = WorldCache::new(local);
        cache
            .add_passive(Passive::new(PassiveId(5), PassiveKind::ItemSlot, Vec3::ZERO, None))
            .unwrap();
        cache
    }

    #[test]
    fn pickup_ghost_flies_to_picker_and_expires() {
        let cache = pickup_cache();
        let mut g = manager();
        g.on_passive_picked_up(&cache, Timestamp(0), PassiveId(5), EntityId(1))
            .unwrap();

        let start = g.passive_ghosts(Timestamp(0));
        assert_eq!(start.len(), 1);
        assert_eq!(start[0].position, Vec3::ZERO);

        let half = g.passive_ghosts(Timestamp(150))[0];
        assert!(approx_eq(half.position, Vec3::new(0.6, 0.6, 0.93)));
        assert!((half.progress - 0.5).abs() < 1e-6);

        assert!(g.passive_ghosts(Timestamp(300)).is_empty());
        assert_eq!(g.ghost_count(), 0);
    }

    #[test]
    fn snapshot_is_repeatable_for_the_same_instant() {
        let cache = pickup_cache();
        let mut g = manager();
        g.on_passive_picked_up(&cache, Timestamp(0), PassiveId(5), EntityId(1))
            .unwrap();
        let first = g.passive_ghosts(Timestamp(100))[0].position;
        let second = g.passive_ghosts(Timestamp(100))[0].position;
        assert_eq!(first, second);
    }

    #[test]
    fn killed_entity_settles_into_the_ground() {
        let mut cache = pickup_cache();
        cache
            .add_entity(Entity::new(EntityId(7), EntityKind::Zombie, Vec3::ONE))
            .unwrap();
        let mut g = manager();
        g.on_entity_killed(&cache, Timestamp(1000), EntityId(7)).unwrap();

        let half = g.entity_ghosts(Timestamp(1500));
        assert_eq!(half.len(), 1);
        assert_eq!(half[0].id, EntityId(7));
        assert!(approx_eq(half[0].position, Vec3::new(1.0, 1.0, 0.5)));

        assert!(g.entity_ghosts(Timestamp(2000)).is_empty());
    }

    #[test]
    fn combined_snapshot_covers_both_sets() {
        let mut cache = pickup_cache();
        cache
            .add_entity(Entity::new(EntityId(7), EntityKind::Cow, Vec3::ZERO))
            .unwrap();
        let mut g = manager();
        g.on_passive_picked_up(&cache, Timestamp(0), PassiveId(5), EntityId(7))
            .unwrap();
        g.on_entity_killed(&cache, Timestamp(0), EntityId(7)).unwrap();

        let snap = g.prune_and_snapshot(Timestamp(100));
        assert_eq!(snap.passives.len(), 1);
        assert_eq!(snap.entities.len(), 1);
        assert_eq!(snap.entity_state(EntityId(7)).map(|e| e.kind), Some(EntityKind::Cow));
        assert_eq!(
            snap.passive_state(PassiveId(5)).map(|p| p.kind),
            Some(PassiveKind::ItemSlot)
        );
        assert!(snap.entity_state(EntityId(8)).is_none());
    }

    #[test]
    fn windows_are_independent() {
        let mut cache = pickup_cache();
        cache
            .add_entity(Entity::new(EntityId(7), EntityKind::Pig, Vec3::ZERO))
            .unwrap();
        let mut g = manager();
        g.on_passive_picked_up(&cache, Timestamp(0), PassiveId(5), EntityId(7))
            .unwrap();
        g.on_entity_killed(&cache, Timestamp(0), EntityId(7)).unwrap();

        assert!(g.passive_ghosts(Timestamp(400)).is_empty());
        assert_eq!(g.entity_ghosts(Timestamp(400)).len(), 1);
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let cache = pickup_cache();
        let mut g = manager();
        assert_eq!(
            g.on_passive_picked_up(&cache, Timestamp(0), PassiveId(99), EntityId(1)),
            Err(GhostError::UnknownPassive(PassiveId(99)))
        );
        assert_eq!(
            g.on_passive_picked_up(&cache, Timestamp(0), PassiveId(5), EntityId(42)),
            Err(GhostError::UnknownEntity(EntityId(42)))
        );
        assert_eq!(
            g.on_entity_killed(&cache, Timestamp(0), EntityId(42)),
            Err(GhostError::UnknownEntity(EntityId(42)))
        );
        assert_eq!(g.ghost_count(), 0);
    }

    #[test]
    fn decay_set_orders_by_id() {
        let mut set: DecaySet<u32, ()> = DecaySet::new(Duration::from_millis(100));
        set.insert(3, (), Vec3::ZERO, Vec3::ONE, Timestamp(0));
        set.insert(1, (), Vec3::ZERO, Vec3::ONE, Timestamp(50));
        let mut views = Vec::new();
        set.prune_into(Timestamp(60), &mut views);
        let ids: Vec<u32> = views.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![1, 3]);
        set.prune_into(Timestamp(100), &mut views);
        assert_eq!(views.len(), 1);
        set.prune_into(Timestamp(150), &mut views);
        assert!(views.is_empty());
    }

    #[test]
    fn snapshot_buffers_are_reused_across_frames() {
        let cache = pickup_cache();
        let mut g = manager();
        g.on_passive_picked_up(&cache, Timestamp(0), PassiveId(5), EntityId(1))
            .unwrap();
        let first = g.prune_and_snapshot(Timestamp(10)).passives.as_ptr();
        let second = g.prune_and_snapshot(Timestamp(20)).passives.as_ptr();
        assert_eq!(first, second);
        assert!(g.passive_views.capacity() >= 1);
    }
}
