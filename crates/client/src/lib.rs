//! Client projection: drives the world cache, animation, ghosts and particles
//! from server ticks and render frames.
//!
//! # Invariants
//! - Runs on one thread; every operation is synchronous and bounded.
//! - A tick is fully applied before any frame query reads the cache.
//! - Time comes from the caller. Nothing here samples a clock.

mod config;
mod projection;
mod target;

pub use config::ProjectionConfig;
pub use projection::{ClientProjection, FrameSnapshot, ProjectionError};
pub use target::PointerTarget;

pub fn crate_info() -> &'static str {
    concat!("voxcast-client v", env!("CARGO_PKG_VERSION"))
}
