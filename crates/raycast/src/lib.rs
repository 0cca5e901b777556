//! Pointer targeting geometry.
//!
//! Both algorithms take a segment from `start` to `end` in world space and
//! operate on caller-supplied geometry; neither touches the world cache.
//!
//! # Invariants
//! - The voxel walk visits face-adjacent cells only (Manhattan step of exactly 1),
//!   in traversal order, and always visits the start cell.
//! - Entity selection only reports boxes entered inside the segment (`0 <= t <= 1`).

mod select;
mod walk;

pub use select::{EntityHit, segment_entry, select_entity};
pub use walk::{VoxelHit, walk_voxels};

pub fn crate_info() -> &'static str {
    concat!("voxcast-raycast v", env!("CARGO_PKG_VERSION"))
}
