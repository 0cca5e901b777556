use serde::{Deserialize, Serialize};
use voxcast_common::{
    BlockAddress, BlockKind, ChunkAddress, Entity, EntityId, FaceMask, Passive, PassiveId,
    PassiveKind,
};

use crate::chunk::Chunk;

/// One authoritative change to the cached world state.
///
/// The session layer delivers each logical change exactly once; replaying a
/// delta twice is a desync and is reported as an error by the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum WorldDelta {
    AddEntity { entity: Entity },
    UpdateEntity { entity: Entity },
    RemoveEntity { id: EntityId },
    /// Replace the local player's state.
    UpdateLocal { entity: Entity },
    AddPassive { passive: Passive },
    UpdatePassive { passive: Passive },
    RemovePassive { kind: PassiveKind, id: PassiveId },
    AddChunk { chunk: Chunk },
    RemoveChunk { address: ChunkAddress },
    SetBlock { address: BlockAddress, kind: BlockKind },
}

/// A notification that does not change cached state on its own but drives
/// presentation (ghosts, particle bursts, damage flashes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WorldEvent {
    EntityHurt { id: EntityId },
    /// Sent alongside the entity's removal.
    EntityKilled { id: EntityId },
    /// Sent alongside the passive's removal.
    PassivePickedUp { passive: PassiveId, picker: EntityId },
    CraftedInInventory { crafter: EntityId },
    CraftedInBlock { block: BlockAddress },
    EnchantComplete { block: BlockAddress },
    /// Replace the set of burning faces of a block; an empty mask stops the burn.
    BurningChanged { block: BlockAddress, faces: FaceMask },
}

/// Everything the server reported for one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickBatch {
    #[serde(default)]
    pub events: Vec<WorldEvent>,
    #[serde(default)]
    pub deltas: Vec<WorldDelta>,
}

impl TickBatch {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.deltas.is_empty()
    }
}
