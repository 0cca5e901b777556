//! Shared value types: identifiers, timestamps, volumes, world records.
//!
//! # Conventions
//! - X and Y are horizontal, Z is vertical.
//! - An entity's `position` is the minimum corner of its collision volume.
//! - Time is always supplied by the caller; nothing here samples a clock.

mod block;
mod entity;
mod geometry;
mod types;

pub use block::{BlockAddress, BlockKind, CHUNK_EDGE, CHUNK_VOLUME, ChunkAddress, Face, FaceMask};
pub use entity::{Entity, EntityKind, Passive, PassiveKind};
pub use geometry::{Aabb, Color};
pub use types::{EntityId, PassiveId, Timestamp};
