//! World cache: the client's last-known copy of the authoritative world.
//!
//! # Invariants
//! - Adds fail if the key is already present; updates and removals fail if it is absent.
//!   Either failure means the session layer has desynchronized from the server.
//! - Entries are replaced wholesale, never patched in place.
//! - All mutation flows through explicit operations or [`WorldDelta`]s.

mod chunk;
mod delta;
mod world;

pub use chunk::{BlockRef, Chunk};
pub use delta::{TickBatch, WorldDelta, WorldEvent};
pub use world::{CacheError, WorldCache};

pub fn crate_info() -> &'static str {
    concat!("voxcast-cache v", env!("CARGO_PKG_VERSION"))
}
