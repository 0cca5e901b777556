use serde::{Deserialize, Serialize};
use voxcast_common::{BlockAddress, BlockKind, CHUNK_VOLUME, ChunkAddress};

/// Block storage for one 16×16×16 chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    address: ChunkAddress,
    blocks: Vec<BlockKind>,
}

impl Chunk {
    /// A chunk full of air.
    pub fn empty(address: ChunkAddress) -> Self {
        Self::filled(address, BlockKind::Air)
    }

    pub fn filled(address: ChunkAddress, kind: BlockKind) -> Self {
        Self {
            address,
            blocks: vec![kind; CHUNK_VOLUME],
        }
    }

    /// Build a chunk from raw storage. Returns `None` unless exactly
    /// [`CHUNK_VOLUME`] blocks are supplied.
    pub fn from_blocks(address: ChunkAddress, blocks: Vec<BlockKind>) -> Option<Self> {
        (blocks.len() == CHUNK_VOLUME).then_some(Self { address, blocks })
    }

    pub fn address(&self) -> ChunkAddress {
        self.address
    }

    /// Whether `block` falls inside this chunk.
    pub fn owns(&self, block: BlockAddress) -> bool {
        block.chunk() == self.address
    }

    /// Block at an absolute address owned by this chunk.
    pub fn get(&self, block: BlockAddress) -> Option<BlockKind> {
        self.owns(block).then(|| self.blocks[block.local_index()])
    }

    /// Overwrite a block; returns the previous kind, or `None` if the chunk does not own it.
    pub fn set(&mut self, block: BlockAddress, kind: BlockKind) -> Option<BlockKind> {
        if !self.owns(block) {
            return None;
        }
        let slot = &mut self.blocks[block.local_index()];
        Some(std::mem::replace(slot, kind))
    }

    pub fn solid_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_solid()).count()
    }

    pub(crate) fn is_well_formed(&self) -> bool {
        self.blocks.len() == CHUNK_VOLUME
    }
}

/// Read accessor for one block inside its loaded chunk.
#[derive(Debug, Clone, Copy)]
pub struct BlockRef<'a> {
    chunk: &'a Chunk,
    address: BlockAddress,
}

impl<'a> BlockRef<'a> {
    pub(crate) fn new(chunk: &'a Chunk, address: BlockAddress) -> Self {
        Self { chunk, address }
    }

    pub fn address(&self) -> BlockAddress {
        self.address
    }

    pub fn kind(&self) -> BlockKind {
        self.chunk.blocks[self.address.local_index()]
    }

    /// The chunk that owns this block.
    pub fn chunk(&self) -> &'a Chunk {
        self.chunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_inside_chunk() {
        let mut c = Chunk::empty(ChunkAddress::new(1, 0, 0));
        let b = BlockAddress::new(17, 3, 4);
        assert_eq!(c.get(b), Some(BlockKind::Air));
        assert_eq!(c.set(b, BlockKind::Stone), Some(BlockKind::Air));
        assert_eq!(c.get(b), Some(BlockKind::Stone));
        assert_eq!(c.solid_count(), 1);
    }

    #[test]
    fn foreign_blocks_are_rejected() {
        let mut c = Chunk::empty(ChunkAddress::new(0, 0, 0));
        let outside = BlockAddress::new(16, 0, 0);
        assert_eq!(c.get(outside), None);
        assert_eq!(c.set(outside, BlockKind::Stone), None);
    }

    #[test]
    fn from_blocks_checks_length() {
        assert!(Chunk::from_blocks(ChunkAddress::new(0, 0, 0), vec![BlockKind::Air; 3]).is_none());
        let full = vec![BlockKind::Dirt; CHUNK_VOLUME];
        let c = Chunk::from_blocks(ChunkAddress::new(0, 0, 0), full).unwrap();
        assert_eq!(c.solid_count(), CHUNK_VOLUME);
    }
}
