use glam::Vec3;
use voxcast_animation::{
    AnimationError, AnimationManager, GhostError, GhostManager, GhostSnapshot, TweenedPositions,
};
use voxcast_cache::{CacheError, TickBatch, WorldCache, WorldDelta, WorldEvent};
use voxcast_common::{Entity, EntityId, Timestamp};
use voxcast_particles::{ParticleEngine, ParticleFrame, RingError};

use crate::config::ProjectionConfig;
use crate::target::{PointerTarget, pointer_target};

/// Failures of the projection. Everything except the config variants means
/// the session layer broke its delivery contract and the projection must be
/// rebuilt from a fresh world state.
#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("config parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("particle pool: {0}")]
    Particles(#[from] RingError),
    #[error("cache desync: {0}")]
    Cache(#[from] CacheError),
    #[error("animation desync: {0}")]
    Animation(#[from] AnimationError),
    #[error("ghost desync: {0}")]
    Ghost(#[from] GhostError),
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone)]
pub struct FrameSnapshot<'a> {
    pub now: Timestamp,
    pub frame_step: i8,
    pub tweened: &'a TweenedPositions,
    pub ghosts: GhostSnapshot<'a>,
    pub particles: ParticleFrame,
    pub flames_emitted: usize,
    pub particles_pruned: usize,
}

/// Owns the world cache and every presentation component, and sequences them
/// per tick and per frame.
#[derive(Debug)]
pub struct ClientProjection {
    config: ProjectionConfig,
    cache: WorldCache,
    animation: AnimationManager,
    ghosts: GhostManager,
    particles: ParticleEngine,
    tweened: TweenedPositions,
    ticks_applied: u64,
}

impl ClientProjection {
    /// `epoch` anchors the shared particle animation phase.
    pub fn new(config: ProjectionConfig, local: Entity, epoch: Timestamp) -> Result<Self, ProjectionError> {
        config.validate()?;
        let particles = ParticleEngine::new(config.particle_capacity, config.particle_lifetime(), epoch)?;
        Ok(Self {
            animation: AnimationManager::new(config.flame_interval()),
            ghosts: GhostManager::new(config.pickup_window(), config.death_window(), config.settle_fraction),
            cache: WorldCache::new(local),
            particles,
            tweened: TweenedPositions::default(),
            ticks_applied: 0,
            config,
        })
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Last applied world state.
    pub fn cache(&self) -> &WorldCache {
        &self.cache
    }

    pub fn animation(&self) -> &AnimationManager {
        &self.animation
    }

    /// Particle pool, for the render collaborator.
    pub fn particles(&self) -> &ParticleEngine {
        &self.particles
    }

    /// Ticks applied since construction.
    pub fn ticks_applied(&self) -> u64 {
        self.ticks_applied
    }

    /// Apply one server tick.
    ///
    /// Events run first so ghosts and bursts see objects before their removal,
    /// then deltas in order, then the end-of-tick rollover. Animation state tied
    /// to a removed entity, a cleared block or an unloaded chunk is dropped with it.
    pub fn apply_tick(&mut self, batch: &TickBatch, now: Timestamp) -> Result<(), ProjectionError> {
        let _span = tracing::info_span!("apply_tick", tick = self.ticks_applied + 1).entered();

        for event in &batch.events {
            self.handle_event(event, now)?;
        }
        for delta in &batch.deltas {
            match delta {
                WorldDelta::UpdateEntity { entity } => {
                    self.animation.on_other_entity_will_update(&self.cache, entity)?;
                }
                WorldDelta::SetBlock { address, kind } => {
                    if let Some(old) = self.cache.block_at(*address) {
                        self.animation
                            .on_block_changed(*address, old, *kind, now, &mut self.particles);
                    }
                }
                _ => {}
            }
            self.cache.apply(delta)?;
            match delta {
                WorldDelta::RemoveEntity { id } => self.animation.forget_entity(*id),
                WorldDelta::SetBlock { address, kind } if !kind.is_solid() => {
                    self.animation.forget_burning(*address);
                }
                WorldDelta::RemoveChunk { address } => {
                    self.animation.forget_burning_in(*address);
                }
                _ => {}
            }
        }
        self.animation.on_end_of_tick(now);
        self.ticks_applied += 1;

        tracing::debug!(
            events = batch.events.len(),
            deltas = batch.deltas.len(),
            entities = self.cache.entities().len(),
            passives = self.cache.passive_count(),
            "tick applied"
        );
        Ok(())
    }

    fn handle_event(&mut self, event: &WorldEvent, now: Timestamp) -> Result<(), ProjectionError> {
        match event {
            WorldEvent::EntityHurt { id } => self.animation.on_entity_hurt(*id, now),
            WorldEvent::EntityKilled { id } => self.ghosts.on_entity_killed(&self.cache, now, *id)?,
            WorldEvent::PassivePickedUp { passive, picker } => {
                self.ghosts
                    .on_passive_picked_up(&self.cache, now, *passive, *picker)?;
            }
            WorldEvent::CraftedInInventory { crafter } => {
                self.animation
                    .on_craft_in_inventory(&self.cache, *crafter, now, &mut self.particles)?;
            }
            WorldEvent::CraftedInBlock { block } => {
                self.animation
                    .on_craft_in_block(*block, now, &mut self.particles);
            }
            WorldEvent::EnchantComplete { block } => {
                self.animation
                    .on_enchant_complete(*block, now, &mut self.particles);
            }
            WorldEvent::BurningChanged { block, faces } => self.animation.set_burning(*block, *faces),
        }
        Ok(())
    }

    /// Advance presentation state to `now` and collect what to draw.
    pub fn frame(&mut self, now: Timestamp) -> FrameSnapshot<'_> {
        let _span = tracing::info_span!("frame").entered();

        self.animation.advance_frame_step(now);
        let flames_emitted = self.animation.emit_flames(now, &mut self.particles);
        let particles_pruned = self.particles.prune(now);
        self.animation
            .tweened_positions(&self.cache, now, &mut self.tweened);
        let particles = self.particles.present(now);

        tracing::trace!(
            passives = self.tweened.len(),
            particles = particles.spans.len(),
            flames_emitted,
            particles_pruned,
            "frame computed"
        );

        FrameSnapshot {
            now,
            frame_step: self.animation.frame_step(),
            tweened: &self.tweened,
            ghosts: self.ghosts.prune_and_snapshot(now),
            particles,
            flames_emitted,
            particles_pruned,
        }
    }

    /// Nearest block or remote entity under the pointer ray.
    pub fn pointer_target(&self, start: Vec3, end: Vec3) -> PointerTarget {
        pointer_target(&self.cache, start, end)
    }

    /// Walk-cycle pose of a remote entity (0 when it is not walking).
    pub fn walk_frame(&self, id: EntityId) -> i8 {
        self.animation.walk_frame(id)
    }

    /// Damage flash intensity in `[0, 1]`.
    pub fn damage_freshness(&mut self, id: EntityId, now: Timestamp) -> f32 {
        self.animation.damage_freshness(id, now)
    }
}
