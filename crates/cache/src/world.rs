use glam::Vec3;
use std::collections::BTreeMap;
use voxcast_common::{
    BlockAddress, BlockKind, ChunkAddress, Entity, EntityId, Passive, PassiveId, PassiveKind,
};

use crate::chunk::{BlockRef, Chunk};
use crate::delta::WorldDelta;

/// Cache invariant violations. Every variant means the session layer
/// delivered a change the cache cannot reconcile; none are recoverable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CacheError {
    #[error("{0} is already cached")]
    DuplicateEntity(EntityId),
    #[error("{0} is not cached")]
    UnknownEntity(EntityId),
    #[error("{0} is the local entity and cannot be tracked as a remote one")]
    LocalEntityConflict(EntityId),
    #[error("local entity update carries {actual}, expected {expected}")]
    LocalIdMismatch { expected: EntityId, actual: EntityId },
    #[error("{0} is already cached")]
    DuplicatePassive(PassiveId),
    #[error("{id} is not cached as {kind:?}")]
    UnknownPassive { kind: PassiveKind, id: PassiveId },
    #[error("chunk {0:?} is already loaded")]
    DuplicateChunk(ChunkAddress),
    #[error("chunk {0:?} is not loaded")]
    ChunkNotLoaded(ChunkAddress),
    #[error("chunk {0:?} does not hold a full block volume")]
    MalformedChunk(ChunkAddress),
}

/// The client's last-known snapshot of the authoritative world.
///
/// Uses BTreeMap for deterministic iteration order, so per-frame passes over
/// the cache visit objects in the same order on every run.
#[derive(Debug, Clone)]
pub struct WorldCache {
    local: Entity,
    entities: BTreeMap<EntityId, Entity>,
    item_slots: BTreeMap<PassiveId, Passive>,
    falling_blocks: BTreeMap<PassiveId, Passive>,
    projectiles: BTreeMap<PassiveId, Passive>,
    chunks: BTreeMap<ChunkAddress, Chunk>,
}

impl WorldCache {
    /// Create a cache around the local player. The local entity's id is fixed from here on.
    pub fn new(local: Entity) -> Self {
        Self {
            local,
            entities: BTreeMap::new(),
            item_slots: BTreeMap::new(),
            falling_blocks: BTreeMap::new(),
            projectiles: BTreeMap::new(),
            chunks: BTreeMap::new(),
        }
    }

    /// The local player.
    pub fn local(&self) -> &Entity {
        &self.local
    }

    /// Remote entities currently visible.
    pub fn entities(&self) -> &BTreeMap<EntityId, Entity> {
        &self.entities
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Resolve either the local entity or a remote one.
    pub fn any_entity(&self, id: EntityId) -> Option<&Entity> {
        if id == self.local.id {
            Some(&self.local)
        } else {
            self.entities.get(&id)
        }
    }

    /// Centroid of the collision volume of the local or a remote entity.
    pub fn centre_of_entity(&self, id: EntityId) -> Option<Vec3> {
        self.any_entity(id).map(Entity::centre)
    }

    pub fn passives(&self, kind: PassiveKind) -> &BTreeMap<PassiveId, Passive> {
        match kind {
            PassiveKind::ItemSlot => &self.item_slots,
            PassiveKind::FallingBlock => &self.falling_blocks,
            PassiveKind::Projectile => &self.projectiles,
        }
    }

    /// Dropped item stacks.
    pub fn item_slots(&self) -> &BTreeMap<PassiveId, Passive> {
        &self.item_slots
    }

    /// Blocks currently falling.
    pub fn falling_blocks(&self) -> &BTreeMap<PassiveId, Passive> {
        &self.falling_blocks
    }

    /// Projectiles in flight.
    pub fn projectiles(&self) -> &BTreeMap<PassiveId, Passive> {
        &self.projectiles
    }

    /// Look a passive up across all three kinds.
    pub fn passive(&self, id: PassiveId) -> Option<&Passive> {
        PassiveKind::ALL
            .into_iter()
            .find_map(|kind| self.passives(kind).get(&id))
    }

    /// Passives of every kind.
    pub fn passive_count(&self) -> usize {
        self.item_slots.len() + self.falling_blocks.len() + self.projectiles.len()
    }

    /// Loaded chunks.
    pub fn chunks(&self) -> &BTreeMap<ChunkAddress, Chunk> {
        &self.chunks
    }

    /// Loaded chunk at `address`.
    pub fn chunk(&self, address: ChunkAddress) -> Option<&Chunk> {
        self.chunks.get(&address)
    }

    /// Read accessor for the block at an absolute address; `None` when its chunk is not loaded.
    pub fn block(&self, address: BlockAddress) -> Option<BlockRef<'_>> {
        self.chunks
            .get(&address.chunk())
            .map(|chunk| BlockRef::new(chunk, address))
    }

    pub fn block_at(&self, address: BlockAddress) -> Option<BlockKind> {
        self.block(address).map(|b| b.kind())
    }

    // --- Local entity ---

    pub fn update_local(&mut self, entity: Entity) -> Result<(), CacheError> {
        if entity.id != self.local.id {
            return Err(CacheError::LocalIdMismatch {
                expected: self.local.id,
                actual: entity.id,
            });
        }
        self.local = entity;
        Ok(())
    }

    // --- Remote entities ---

    pub fn add_entity(&mut self, entity: Entity) -> Result<(), CacheError> {
        if entity.id == self.local.id {
            return Err(CacheError::LocalEntityConflict(entity.id));
        }
        if self.entities.contains_key(&entity.id) {
            return Err(CacheError::DuplicateEntity(entity.id));
        }
        self.entities.insert(entity.id, entity);
        Ok(())
    }

    /// Replace a tracked entity; returns the state it had before.
    pub fn update_entity(&mut self, entity: Entity) -> Result<Entity, CacheError> {
        match self.entities.get_mut(&entity.id) {
            Some(slot) => Ok(std::mem::replace(slot, entity)),
            None => Err(CacheError::UnknownEntity(entity.id)),
        }
    }

    pub fn remove_entity(&mut self, id: EntityId) -> Result<Entity, CacheError> {
        self.entities
            .remove(&id)
            .ok_or(CacheError::UnknownEntity(id))
    }

    // --- Passives ---

    pub fn add_passive(&mut self, passive: Passive) -> Result<(), CacheError> {
        if self.passive(passive.id).is_some() {
            return Err(CacheError::DuplicatePassive(passive.id));
        }
        self.passives_mut(passive.kind).insert(passive.id, passive);
        Ok(())
    }

    /// Replace a tracked passive of the same kind; returns the state it had before.
    pub fn update_passive(&mut self, passive: Passive) -> Result<Passive, CacheError> {
        let (kind, id) = (passive.kind, passive.id);
        match self.passives_mut(kind).get_mut(&id) {
            Some(slot) => Ok(std::mem::replace(slot, passive)),
            None => Err(CacheError::UnknownPassive { kind, id }),
        }
    }

    pub fn remove_passive(&mut self, kind: PassiveKind, id: PassiveId) -> Result<Passive, CacheError> {
        self.passives_mut(kind)
            .remove(&id)
            .ok_or(CacheError::UnknownPassive { kind, id })
    }

    fn passives_mut(&mut self, kind: PassiveKind) -> &mut BTreeMap<PassiveId, Passive> {
        match kind {
            PassiveKind::ItemSlot => &mut self.item_slots,
            PassiveKind::FallingBlock => &mut self.falling_blocks,
            PassiveKind::Projectile => &mut self.projectiles,
        }
    }

    // --- Chunks ---

    pub fn add_chunk(&mut self, chunk: Chunk) -> Result<(), CacheError> {
        let address = chunk.address();
        if !chunk.is_well_formed() {
            return Err(CacheError::MalformedChunk(address));
        }
        if self.chunks.contains_key(&address) {
            return Err(CacheError::DuplicateChunk(address));
        }
        tracing::debug!(?address, "chunk loaded");
        self.chunks.insert(address, chunk);
        Ok(())
    }

    pub fn remove_chunk(&mut self, address: ChunkAddress) -> Result<Chunk, CacheError> {
        let chunk = self
            .chunks
            .remove(&address)
            .ok_or(CacheError::ChunkNotLoaded(address))?;
        tracing::debug!(?address, "chunk unloaded");
        Ok(chunk)
    }

    /// Overwrite one block of a loaded chunk; returns the previous kind.
    pub fn set_block(&mut self, address: BlockAddress, kind: BlockKind) -> Result<BlockKind, CacheError> {
        let chunk_address = address.chunk();
        self.chunks
            .get_mut(&chunk_address)
            .and_then(|chunk| chunk.set(address, kind))
            .ok_or(CacheError::ChunkNotLoaded(chunk_address))
    }

    // --- Delta ingestion ---

    /// Apply a single authoritative change.
    pub fn apply(&mut self, delta: &WorldDelta) -> Result<(), CacheError> {
        match delta {
            WorldDelta::AddEntity { entity } => self.add_entity(entity.clone()),
            WorldDelta::UpdateEntity { entity } => self.update_entity(entity.clone()).map(drop),
            WorldDelta::RemoveEntity { id } => self.remove_entity(*id).map(drop),
            WorldDelta::UpdateLocal { entity } => self.update_local(entity.clone()),
            WorldDelta::AddPassive { passive } => self.add_passive(passive.clone()),
            WorldDelta::UpdatePassive { passive } => self.update_passive(passive.clone()).map(drop),
            WorldDelta::RemovePassive { kind, id } => self.remove_passive(*kind, *id).map(drop),
            WorldDelta::AddChunk { chunk } => self.add_chunk(chunk.clone()),
            WorldDelta::RemoveChunk { address } => self.remove_chunk(*address).map(drop),
            WorldDelta::SetBlock { address, kind } => self.set_block(*address, *kind).map(drop),
        }
    }

    /// Apply deltas in order, stopping at the first violation.
    pub fn apply_batch(&mut self, deltas: &[WorldDelta]) -> Result<(), CacheError> {
        for delta in deltas {
            self.apply(delta)?;
        }
        tracing::trace!(
            count = deltas.len(),
            entities = self.entities.len(),
            passives = self.passive_count(),
            "delta batch applied"
        );
        Ok(())
    }
}
