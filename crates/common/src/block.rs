use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Blocks along one edge of a chunk.
pub const CHUNK_EDGE: i32 = 16;
/// Blocks stored per chunk.
pub const CHUNK_VOLUME: usize = (CHUNK_EDGE * CHUNK_EDGE * CHUNK_EDGE) as usize;

/// Absolute integer coordinate of a unit block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockAddress {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockAddress {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The block containing a world-space point.
    pub fn containing(p: Vec3) -> Self {
        Self {
            x: p.x.floor() as i32,
            y: p.y.floor() as i32,
            z: p.z.floor() as i32,
        }
    }

    pub fn chunk(self) -> ChunkAddress {
        ChunkAddress {
            x: self.x.div_euclid(CHUNK_EDGE),
            y: self.y.div_euclid(CHUNK_EDGE),
            z: self.z.div_euclid(CHUNK_EDGE),
        }
    }

    /// Index of this block inside its chunk's storage (x fastest, then y, then z).
    pub fn local_index(self) -> usize {
        let lx = self.x.rem_euclid(CHUNK_EDGE);
        let ly = self.y.rem_euclid(CHUNK_EDGE);
        let lz = self.z.rem_euclid(CHUNK_EDGE);
        (lx + ly * CHUNK_EDGE + lz * CHUNK_EDGE * CHUNK_EDGE) as usize
    }

    /// Minimum corner of the block in world space.
    pub fn corner(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }

    /// Centre of the block's upper face.
    pub fn top_centre(self) -> Vec3 {
        self.corner() + Vec3::new(0.5, 0.5, 1.0)
    }

    pub fn offset(self, face: Face) -> Self {
        let n = face.normal();
        Self {
            x: self.x + n[0],
            y: self.y + n[1],
            z: self.z + n[2],
        }
    }

    pub fn manhattan(self, other: BlockAddress) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs() + (self.z - other.z).abs()
    }
}

/// Coordinate of a 16×16×16 chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkAddress {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ChunkAddress {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Block address of this chunk's minimum corner.
    pub fn origin(self) -> BlockAddress {
        BlockAddress::new(self.x * CHUNK_EDGE, self.y * CHUNK_EDGE, self.z * CHUNK_EDGE)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    #[default]
    Air,
    Stone,
    Dirt,
    Grass,
    Log,
    Planks,
    Sand,
    CraftingTable,
    Furnace,
    /// A furnace with fabrication in progress.
    FurnaceLit,
    EnchantingTable,
    EnchantingTableActive,
}

impl BlockKind {
    pub fn is_solid(self) -> bool {
        !matches!(self, BlockKind::Air)
    }
}

/// One of the six faces of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    NegX,
    PosX,
    NegY,
    PosY,
    NegZ,
    PosZ,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::NegX,
        Face::PosX,
        Face::NegY,
        Face::PosY,
        Face::NegZ,
        Face::PosZ,
    ];

    pub fn normal(self) -> [i32; 3] {
        match self {
            Face::NegX => [-1, 0, 0],
            Face::PosX => [1, 0, 0],
            Face::NegY => [0, -1, 0],
            Face::PosY => [0, 1, 0],
            Face::NegZ => [0, 0, -1],
            Face::PosZ => [0, 0, 1],
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Set of block faces, one bit per [`Face`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceMask(pub u8);

impl FaceMask {
    pub const NONE: FaceMask = FaceMask(0);
    pub const ALL: FaceMask = FaceMask(0b11_1111);

    pub fn with(self, face: Face) -> Self {
        Self(self.0 | face.bit())
    }

    pub fn contains(self, face: Face) -> bool {
        self.0 & face.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 & Self::ALL.0 == 0
    }

    pub fn faces(self) -> impl Iterator<Item = Face> {
        Face::ALL.into_iter().filter(move |f| self.contains(*f))
    }
}

impl FromIterator<Face> for FaceMask {
    fn from_iter<I: IntoIterator<Item = Face>>(iter: I) -> Self {
        iter.into_iter().fold(FaceMask::NONE, FaceMask::with)
    }
}
