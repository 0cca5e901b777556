//! Particle pool with a hard capacity and O(1) expiry.
//!
//! # Invariants
//! - Slots are claimed and reclaimed strictly in FIFO order; there is no arbitrary free.
//! - Expiry times are non-decreasing in admission order, so pruning stops at the
//!   first live slot instead of scanning the pool.
//! - A full pool drops new particles silently; nothing here allocates after construction.

mod engine;
mod ring;

pub use engine::{LiveSpans, Particle, ParticleEngine, ParticleFrame};
pub use ring::{RingCursor, RingError};

pub fn crate_info() -> &'static str {
    concat!("voxcast-particles v", env!("CARGO_PKG_VERSION"))
}
