use glam::Vec3;
use voxcast_cache::WorldCache;
use voxcast_common::{Aabb, BlockKind};
use voxcast_raycast::{EntityHit, VoxelHit, select_entity, walk_voxels};

/// What the pointer ray is resting on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerTarget {
    Nothing,
    Block(VoxelHit),
    Entity(EntityHit),
}

/// Nearest solid block or remote entity along `start..end`.
///
/// Unloaded chunks are treated as empty space. When a block and an entity are
/// equally close the block wins.
pub(crate) fn pointer_target(cache: &WorldCache, start: Vec3, end: Vec3) -> PointerTarget {
    let block = walk_voxels(start, end, |b| {
        cache.block_at(b).is_some_and(BlockKind::is_solid)
    });
    let entity = select_entity(start, end, cache.entities().values());
    match (block, entity) {
        (None, None) => PointerTarget::Nothing,
        (Some(b), None) => PointerTarget::Block(b),
        (None, Some(e)) => PointerTarget::Entity(e),
        (Some(b), Some(e)) => {
            let block_distance = Aabb::unit(b.block.corner()).distance_to(start);
            if e.distance < block_distance {
                PointerTarget::Entity(e)
            } else {
                PointerTarget::Block(b)
            }
        }
    }
}
