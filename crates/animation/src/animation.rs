use glam::Vec3;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use voxcast_cache::WorldCache;
use voxcast_common::{
    BlockAddress, BlockKind, ChunkAddress, Color, Entity, EntityId, FaceMask, Passive, PassiveId,
    PassiveKind, Timestamp,
};
use voxcast_particles::ParticleEngine;

use crate::vfx::{BurstKind, flame_particle, spawn_burst};

/// Length of the damage flash after a hit.
pub const DAMAGE_FLASH: Duration = Duration::from_millis(1000);
/// Minimum wall time between two walk-cycle frame steps.
pub const FRAME_STEP_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnimationError {
    #[error("{0} is not cached")]
    UnknownEntity(EntityId),
}

/// Extrapolated positions of every cached passive, grouped by kind.
///
/// Reused across frames; refilling it does not allocate once warm.
#[derive(Debug, Clone, Default)]
pub struct TweenedPositions {
    pub item_slots: Vec<(PassiveId, Vec3)>,
    pub falling_blocks: Vec<(PassiveId, Vec3)>,
    pub projectiles: Vec<(PassiveId, Vec3)>,
}

impl TweenedPositions {
    /// Positions for one passive kind, in id order.
    pub fn of(&self, kind: PassiveKind) -> &[(PassiveId, Vec3)] {
        match kind {
            PassiveKind::ItemSlot => &self.item_slots,
            PassiveKind::FallingBlock => &self.falling_blocks,
            PassiveKind::Projectile => &self.projectiles,
        }
    }

    fn of_mut(&mut self, kind: PassiveKind) -> &mut Vec<(PassiveId, Vec3)> {
        match kind {
            PassiveKind::ItemSlot => &mut self.item_slots,
            PassiveKind::FallingBlock => &mut self.falling_blocks,
            PassiveKind::Projectile => &mut self.projectiles,
        }
    }

    /// Passives across all kinds.
    pub fn len(&self) -> usize {
        self.item_slots.len() + self.falling_blocks.len() + self.projectiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Derives per-frame animation state from per-tick world updates.
///
/// Walk-cycle phase offsets live in two generations: `active` is read while
/// rendering, `building` collects offsets for entities that moved during the
/// current tick. At end of tick the two are swapped and the new `building`
/// generation starts empty, so an entity that stops moving falls back to
/// "unanimated" one tick later.
#[derive(Debug, Clone)]
pub struct AnimationManager {
    damage_until: HashMap<EntityId, Timestamp>,
    active_offsets: HashMap<EntityId, i8>,
    building_offsets: HashMap<EntityId, i8>,
    frame_step: i8,
    last_step_at: Option<Timestamp>,
    tick_mark: Timestamp,
    burning: BTreeMap<BlockAddress, FaceMask>,
    flame_interval: Duration,
    last_flame_at: Option<Timestamp>,
}

impl Default for AnimationManager {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

impl AnimationManager {
    /// `flame_interval` is the period of the burning-face flame pass.
    pub fn new(flame_interval: Duration) -> Self {
        Self {
            damage_until: HashMap::new(),
            active_offsets: HashMap::new(),
            building_offsets: HashMap::new(),
            frame_step: 0,
            last_step_at: None,
            tick_mark: Timestamp::ZERO,
            burning: BTreeMap::new(),
            flame_interval,
            last_flame_at: None,
        }
    }

    // --- Frame step ---

    /// Current walk-cycle clock.
    pub fn frame_step(&self) -> i8 {
        self.frame_step
    }

    /// Advance the walk-cycle clock by at most one step. The first call only
    /// records the reference time. Returns whether a step was taken.
    pub fn advance_frame_step(&mut self, now: Timestamp) -> bool {
        match self.last_step_at {
            Some(last) if now.saturating_since(last) >= FRAME_STEP_INTERVAL => {
                self.frame_step = self.frame_step.wrapping_add(1);
                self.last_step_at = Some(now);
                true
            }
            Some(_) => false,
            None => {
                self.last_step_at = Some(now);
                false
            }
        }
    }

    // --- Walk cycle ---

    /// Record an incoming update for a remote entity before the cache applies it.
    ///
    /// Horizontal movement keeps (or starts) the entity's walk cycle for the next
    /// generation; vertical-only movement and standing still do not.
    pub fn on_other_entity_will_update(
        &mut self,
        cache: &WorldCache,
        incoming: &Entity,
    ) -> Result<(), AnimationError> {
        let previous = cache
            .entity(incoming.id)
            .ok_or(AnimationError::UnknownEntity(incoming.id))?;
        let moved = previous.position.x != incoming.position.x
            || previous.position.y != incoming.position.y;
        if moved {
            let offset = self
                .building_offsets
                .get(&incoming.id)
                .or_else(|| self.active_offsets.get(&incoming.id))
                .copied()
                // Starts the cycle so the next walk_frame evaluates to exactly 0.
                .unwrap_or_else(|| self.frame_step.wrapping_neg());
            self.building_offsets.insert(incoming.id, offset);
        } else {
            self.building_offsets.remove(&incoming.id);
        }
        Ok(())
    }

    /// Walk-cycle pose for an entity: a triangle wave over the frame step, 0 when not walking.
    pub fn walk_frame(&self, id: EntityId) -> i8 {
        match self.active_offsets.get(&id) {
            Some(offset) => offset
                .wrapping_add(self.frame_step)
                .wrapping_add(64)
                .wrapping_abs()
                .wrapping_sub(64),
            None => 0,
        }
    }

    /// Whether `id` has an active walk offset.
    pub fn is_walking(&self, id: EntityId) -> bool {
        self.active_offsets.contains_key(&id)
    }

    /// Promote the building generation and mark `now` as the tweening zero point.
    pub fn on_end_of_tick(&mut self, now: Timestamp) {
        std::mem::swap(&mut self.active_offsets, &mut self.building_offsets);
        self.building_offsets.clear();
        self.tick_mark = now;
    }

    /// Time of the last end of tick; tweening starts here.
    pub fn tick_mark(&self) -> Timestamp {
        self.tick_mark
    }

    // --- Tweening ---

    /// Position of `passive` extrapolated at constant velocity since the last end of tick.
    pub fn tween(&self, passive: &Passive, now: Timestamp) -> Vec3 {
        match passive.velocity {
            Some(velocity) => {
                let elapsed = now.saturating_since(self.tick_mark).as_secs_f32();
                passive.position + velocity * elapsed
            }
            None => passive.position,
        }
    }

    /// Refill `out` with the tweened position of every cached passive.
    pub fn tweened_positions(&self, cache: &WorldCache, now: Timestamp, out: &mut TweenedPositions) {
        for kind in PassiveKind::ALL {
            let list = out.of_mut(kind);
            list.clear();
            list.extend(
                cache
                    .passives(kind)
                    .values()
                    .map(|p| (p.id, self.tween(p, now))),
            );
        }
    }

    // --- Damage flash ---

    /// Drop all per-entity state for an entity that left the world.
    pub fn forget_entity(&mut self, id: EntityId) {
        self.damage_until.remove(&id);
        self.active_offsets.remove(&id);
        self.building_offsets.remove(&id);
    }

    /// Start (or restart) the damage flash for `id`.
    pub fn on_entity_hurt(&mut self, id: EntityId, now: Timestamp) {
        self.damage_until.insert(id, now + DAMAGE_FLASH);
    }

    /// 1.0 right after a hit, falling linearly to 0.0 when the flash ends.
    /// Expired flashes are forgotten here.
    pub fn damage_freshness(&mut self, id: EntityId, now: Timestamp) -> f32 {
        let Some(&until) = self.damage_until.get(&id) else {
            return 0.0;
        };
        if now >= until {
            self.damage_until.remove(&id);
            return 0.0;
        }
        let left = until.saturating_since(now).as_secs_f32();
        (left / DAMAGE_FLASH.as_secs_f32()).min(1.0)
    }

    // --- World event reactions ---

    /// React to a block changing state; returns how many particles were admitted.
    pub fn on_block_changed(
        &mut self,
        block: BlockAddress,
        old: BlockKind,
        new: BlockKind,
        now: Timestamp,
        particles: &mut ParticleEngine,
    ) -> usize {
        use BlockKind::*;
        let burst = match (old, new) {
            (Furnace, FurnaceLit) | (FurnaceLit, Furnace) => BurstKind::Furnace,
            (EnchantingTable, EnchantingTableActive) | (EnchantingTableActive, EnchantingTable) => {
                BurstKind::Enchanting
            }
            _ => return 0,
        };
        spawn_burst(particles, burst, block.top_centre(), now)
    }

    /// Crafting finished in an entity's inventory: burst at the crafter's centroid.
    pub fn on_craft_in_inventory(
        &mut self,
        cache: &WorldCache,
        crafter: EntityId,
        now: Timestamp,
        particles: &mut ParticleEngine,
    ) -> Result<usize, AnimationError> {
        let anchor = cache
            .centre_of_entity(crafter)
            .ok_or(AnimationError::UnknownEntity(crafter))?;
        Ok(spawn_burst(particles, BurstKind::Crafting, anchor, now))
    }

    pub fn on_craft_in_block(
        &mut self,
        block: BlockAddress,
        now: Timestamp,
        particles: &mut ParticleEngine,
    ) -> usize {
        spawn_burst(particles, BurstKind::Crafting, block.top_centre(), now)
    }

    pub fn on_enchant_complete(
        &mut self,
        block: BlockAddress,
        now: Timestamp,
        particles: &mut ParticleEngine,
    ) -> usize {
        spawn_burst(particles, BurstKind::Enchanting, block.top_centre(), now)
    }

    // --- Burning faces ---

    /// Replace the burning faces of a block; an empty mask stops the burn.
    pub fn set_burning(&mut self, block: BlockAddress, faces: FaceMask) {
        if faces.is_empty() {
            self.burning.remove(&block);
        } else {
            self.burning.insert(block, faces);
        }
    }

    /// Stop any burn on `block`, e.g. once the block itself is gone.
    pub fn forget_burning(&mut self, block: BlockAddress) {
        self.burning.remove(&block);
    }

    /// Stop every burn inside an unloaded chunk. Returns how many blocks were dropped.
    pub fn forget_burning_in(&mut self, chunk: ChunkAddress) -> usize {
        let before = self.burning.len();
        self.burning.retain(|block, _| block.chunk() != chunk);
        before - self.burning.len()
    }

    /// Currently burning blocks and their burning faces.
    pub fn burning(&self) -> &BTreeMap<BlockAddress, FaceMask> {
        &self.burning
    }

    /// Emit one flame per burning face, at most once per flame interval.
    pub fn emit_flames(&mut self, now: Timestamp, particles: &mut ParticleEngine) -> usize {
        if let Some(last) = self.last_flame_at
            && now.saturating_since(last) < self.flame_interval
        {
            return 0;
        }
        self.last_flame_at = Some(now);

        let mut admitted = 0;
        for (&block, &faces) in &self.burning {
            for face in faces.faces() {
                let (start, end) = flame_particle(block, face);
                if particles.spawn(start, end, Color::FLAME, now).is_some() {
                    admitted += 1;
                }
            }
        }
        admitted
    }
}
